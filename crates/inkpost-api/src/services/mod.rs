// Services layer for business logic
// Services own business logic and resource semantics, calling storage directly

pub mod category;
pub mod post;
pub mod user;

pub use category::CategoryService;
pub use post::PostService;
pub use user::UserService;

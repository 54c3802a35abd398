// Domain types for the Inkpost blog platform
//
// This crate is DB-agnostic: the entity types here are what the API serves
// and what the storage layer maps its rows into. Derivation logic that the
// data model needs (slug generation, publish transitions) lives here as
// plain functions invoked by the service layer, not as hooks on the model.

pub mod category;
pub mod post;
pub mod slug;
pub mod user;

pub use category::Category;
pub use post::{CategoryRef, Post, PostAuthor, PostStatus};
pub use slug::slugify;
pub use user::{Role, User};

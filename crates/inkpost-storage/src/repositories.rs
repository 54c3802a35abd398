// Repository layer for Postgres-backed storage

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::*;

const POST_WITH_REFS_COLUMNS: &str = r#"
    p.id, p.title, p.content, p.slug, p.author_id, p.category_id, p.tags,
    p.status, p.views, p.likes, p.featured_image, p.published, p.published_at,
    p.created_at, p.updated_at,
    u.username AS author_username, u.email AS author_email,
    u.first_name AS author_first_name, u.last_name AS author_last_name,
    u.avatar AS author_avatar,
    c.name AS category_name, c.slug AS category_slug
"#;

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, first_name, last_name, avatar, role,
                      is_active, password_hash, created_at, updated_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, avatar, role,
                   is_active, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, avatar, role,
                   is_active, password_hash, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, first_name, last_name, avatar, role,
                   is_active, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUser) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                avatar = COALESCE($4, avatar),
                role = COALESCE($5, role),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, first_name, last_name, avatar, role,
                      is_active, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.avatar)
        .bind(&input.role)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Posts
    // ============================================

    pub async fn create_post(&self, input: CreatePostRow) -> Result<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (title, content, slug, author_id, category_id, tags, featured_image)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, content, slug, author_id, category_id, tags, status,
                      views, likes, featured_image, published, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.slug)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(&input.tags)
        .bind(&input.featured_image)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<PostWithRefsRow>> {
        let query = format!(
            r#"
            SELECT {POST_WITH_REFS_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#
        );
        let row = sqlx::query_as::<_, PostWithRefsRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<Option<PostWithRefsRow>> {
        let query = format!(
            r#"
            SELECT {POST_WITH_REFS_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            JOIN categories c ON c.id = p.category_id
            WHERE p.slug = $1
            "#
        );
        let row = sqlx::query_as::<_, PostWithRefsRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Fetch the bare post row without joined references
    pub async fn get_post_row(&self, id: Uuid) -> Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, title, content, slug, author_id, category_id, tags, status,
                   views, likes, featured_image, published, published_at,
                   created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_posts(
        &self,
        filter: &PostFilter,
        sort: PostSort,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PostWithRefsRow>> {
        // Sort clause comes from a fixed whitelist, never from user input
        let query = format!(
            r#"
            SELECT {POST_WITH_REFS_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            JOIN categories c ON c.id = p.category_id
            WHERE ($1::text IS NULL OR p.status = $1)
              AND ($2::uuid IS NULL OR p.category_id = $2)
              AND ($3::uuid IS NULL OR p.author_id = $3)
            ORDER BY p.{}
            LIMIT $4 OFFSET $5
            "#,
            sort.order_by()
        );
        let rows = sqlx::query_as::<_, PostWithRefsRow>(&query)
            .bind(&filter.status)
            .bind(filter.category_id)
            .bind(filter.author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn count_posts(&self, filter: &PostFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
              AND ($3::uuid IS NULL OR author_id = $3)
            "#,
        )
        .bind(&filter.status)
        .bind(filter.category_id)
        .bind(filter.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn update_post(&self, id: Uuid, input: UpdatePost) -> Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                category_id = COALESCE($4, category_id),
                tags = COALESCE($5, tags),
                status = COALESCE($6, status),
                featured_image = COALESCE($7, featured_image),
                published = COALESCE($8, published),
                published_at = COALESCE($9, published_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, slug, author_id, category_id, tags, status,
                      views, likes, featured_image, published, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.category_id)
        .bind(&input.tags)
        .bind(&input.status)
        .bind(&input.featured_image)
        .bind(input.published)
        .bind(input.published_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Increment the view counter, returning the new count
    pub async fn increment_post_views(&self, id: Uuid) -> Result<Option<i64>> {
        let views: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE posts
            SET views = views + 1
            WHERE id = $1
            RETURNING views
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(views)
    }

    /// Toggle a user's like on a post in a single atomic update
    pub async fn toggle_post_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET likes = CASE
                    WHEN $2 = ANY(likes) THEN array_remove(likes, $2)
                    ELSE array_append(likes, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, slug, author_id, category_id, tags, status,
                      views, likes, featured_image, published, published_at,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn post_slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    // ============================================
    // Categories
    // ============================================

    pub async fn create_category(&self, input: CreateCategoryRow) -> Result<CategoryRow> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, slug, description, icon, color)
            VALUES ($1, $2, $3, $4, COALESCE($5, '#007bff'))
            RETURNING id, name, slug, description, icon, color, is_active,
                      created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.color)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, icon, color, is_active,
                   created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<CategoryRow>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, icon, color, is_active,
                   created_at, updated_at
            FROM categories
            WHERE lower(name) = lower($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_categories(&self) -> Result<Vec<CategoryRow>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, name, slug, description, icon, color, is_active,
                   created_at, updated_at
            FROM categories
            WHERE is_active = TRUE
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn category_slug_exists(&self, slug: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE slug = $1)")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}

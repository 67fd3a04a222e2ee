use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{
    NewPost, Pagination, PostModeration, PostPatch, PostQuery, PostRepository, PostSearch,
};
use crate::domain::error::DomainError;
use crate::domain::post::{AnnotatedPost, CategoryRef, LocationRef, Post, PostFields};
use crate::domain::visibility::Visibility;

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str =
    "id, title, text, pub_date, author_id, location_id, category_id, is_published, created_at";

const ANNOTATED_SELECT: &str = r#"
    SELECT
        p.id,
        p.title,
        p.text,
        p.pub_date,
        p.author_id,
        p.location_id,
        p.category_id,
        p.is_published,
        p.created_at,
        u.username AS author_username,
        c.title AS category_title,
        c.slug AS category_slug,
        c.is_published AS category_is_published,
        l.name AS location_name,
        l.is_published AS location_is_published,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const ANNOTATED_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    location_id: Option<i64>,
    category_id: Option<i64>,
    is_published: bool,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct AnnotatedPostRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_username: String,
    category_title: Option<String>,
    category_slug: Option<String>,
    category_is_published: Option<bool>,
    location_name: Option<String>,
    location_is_published: Option<bool>,
    comment_count: i64,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, location_id, category_id, is_published)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.title)
            .bind(input.text)
            .bind(input.pub_date)
            .bind(input.author_id)
            .bind(input.location_id)
            .bind(input.category_id)
            .bind(input.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<AnnotatedPost>, DomainError> {
        let sql = format!("{ANNOTATED_SELECT} WHERE p.id = $1");
        let row = sqlx::query_as::<_, AnnotatedPostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_annotated).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET title = $3,
                text = $4,
                pub_date = $5,
                location_id = $6,
                category_id = $7,
                is_published = $8
            WHERE id = $1 AND author_id = $2
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(patch.title)
            .bind(patch.text)
            .bind(patch.pub_date)
            .bind(patch.location_id)
            .bind(patch.category_id)
            .bind(patch.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post_owned(&self, post_id: i64, owner_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        query: &PostQuery,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(ANNOTATED_SELECT);
        push_post_query(&mut builder, query);
        builder
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = builder
            .build_query_as::<AnnotatedPostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_annotated).collect()
    }

    async fn count_posts(&self, query: &PostQuery) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(ANNOTATED_COUNT);
        push_post_query(&mut builder, query);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn search_posts(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<AnnotatedPost>, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(ANNOTATED_SELECT);
        push_post_search(&mut builder, search);
        builder
            .push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = builder
            .build_query_as::<AnnotatedPostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_annotated).collect()
    }

    async fn count_search(&self, search: &PostSearch) -> Result<i64, DomainError> {
        let mut builder = QueryBuilder::<Postgres>::new(ANNOTATED_COUNT);
        push_post_search(&mut builder, search);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn moderate_post(
        &self,
        post_id: i64,
        moderation: PostModeration,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            UPDATE posts
            SET is_published = $2,
                category_id = $3
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(moderation.is_published)
            .bind(moderation.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }
}

/// SQL rendering of [`Visibility`]; must stay in line with
/// `domain::visibility::is_publicly_visible`.
fn push_post_query(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
    builder.push(" WHERE ");
    match query.visibility {
        Visibility::Public => {
            push_publicly_visible(builder, query.now);
        }
        Visibility::PublicOrOwnedBy(user_id) => {
            builder.push("((");
            push_publicly_visible(builder, query.now);
            builder.push(") OR p.author_id = ").push_bind(user_id).push(")");
        }
    }

    if let Some(slug) = &query.category_slug {
        builder.push(" AND c.slug = ").push_bind(slug.clone());
    }
    if let Some(username) = &query.author_username {
        builder.push(" AND u.username = ").push_bind(username.clone());
    }
}

fn push_publicly_visible(builder: &mut QueryBuilder<'_, Postgres>, now: DateTime<Utc>) {
    builder
        .push("p.is_published AND p.pub_date <= ")
        .push_bind(now)
        .push(" AND (p.category_id IS NULL OR c.is_published)");
}

fn push_post_search(builder: &mut QueryBuilder<'_, Postgres>, search: &PostSearch) {
    builder.push(" WHERE TRUE");
    if let Some(needle) = &search.title_contains {
        builder
            .push(" AND p.title ILIKE ")
            .push_bind(format!("%{}%", escape_like(needle)));
    }
    if let Some(after) = search.created_after {
        builder.push(" AND p.created_at >= ").push_bind(after);
    }
    if let Some(before) = search.created_before {
        builder.push(" AND p.created_at <= ").push_bind(before);
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    Post::new(PostFields {
        id: row.id,
        title: row.title,
        text: row.text,
        pub_date: row.pub_date,
        author_id: row.author_id,
        location_id: row.location_id,
        category_id: row.category_id,
        is_published: row.is_published,
        created_at: row.created_at,
    })
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_annotated(row: AnnotatedPostRow) -> Result<AnnotatedPost, DomainError> {
    let category = match (
        row.post.category_id,
        row.category_title,
        row.category_slug,
        row.category_is_published,
    ) {
        (Some(id), Some(title), Some(slug), Some(is_published)) => Some(CategoryRef {
            id,
            title,
            slug,
            is_published,
        }),
        _ => None,
    };
    let location = match (
        row.post.location_id,
        row.location_name,
        row.location_is_published,
    ) {
        (Some(id), Some(name), Some(is_published)) => Some(LocationRef {
            id,
            name,
            is_published,
        }),
        _ => None,
    };

    Ok(AnnotatedPost {
        post: map_row_to_post(row.post)?,
        author_username: row.author_username,
        category,
        location,
        comment_count: row.comment_count,
    })
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_category_id_fkey") => "category",
            Some("posts_location_id_fkey") => "location",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use sqlx::{Postgres, QueryBuilder};

    use super::{escape_like, push_post_query, push_post_search};
    use crate::data::post_repository::{PostQuery, PostSearch};
    use crate::domain::visibility::Visibility;

    fn render(query: &PostQuery) -> String {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM posts p");
        push_post_query(&mut builder, query);
        builder.sql().to_string()
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn public_query_checks_flags_date_and_category() {
        let sql = render(&PostQuery::new(Visibility::Public, now()));
        assert!(sql.contains("p.is_published AND p.pub_date <= $1"));
        assert!(sql.contains("(p.category_id IS NULL OR c.is_published)"));
        assert!(!sql.contains("p.author_id"));
    }

    #[test]
    fn owner_query_adds_author_union() {
        let sql = render(&PostQuery::new(Visibility::PublicOrOwnedBy(3), now()));
        assert!(sql.contains(") OR p.author_id = $2)"));
    }

    #[test]
    fn category_and_author_filters_are_appended() {
        let query = PostQuery::new(Visibility::Public, now())
            .in_category("travel")
            .by_author("leo");
        let sql = render(&query);
        assert!(sql.contains("AND c.slug = $2"));
        assert!(sql.contains("AND u.username = $3"));
    }

    #[test]
    fn search_combines_title_and_creation_bounds() {
        let search = PostSearch {
            title_contains: Some("trip".to_string()),
            created_after: Some(now()),
            created_before: Some(now()),
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM posts p");
        push_post_search(&mut builder, &search);
        let sql = builder.sql().to_string();
        assert!(sql.contains("WHERE TRUE AND p.title ILIKE $1"));
        assert!(sql.contains("AND p.created_at >= $2"));
        assert!(sql.contains("AND p.created_at <= $3"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}

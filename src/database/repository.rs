use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{
    Comment, NewComment, NewReview, NewTerm, NewTitle, NewUser, Review, ReviewChanges, Term, TermKind, Title,
    TitleChanges, TitleFilter, TitleRow, User, UserChanges,
};
use super::store::Store;
use crate::filter::PageRequest;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, bio, role, is_superuser, confirmation_code";

const TITLE_SELECT: &str = r#"
    SELECT t.id, t.name, t.year, t.description,
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
           (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

const TITLE_WHERE: &str = r#"
    WHERE ($1::text IS NULL OR c.slug = $1)
      AND ($2::text IS NULL OR EXISTS (
            SELECT 1 FROM title_genres tg JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = t.id AND g.slug = $2))
      AND ($3::text IS NULL OR strpos(lower(t.name), lower($3)) > 0)
      AND ($4::int IS NULL OR t.year = $4)
"#;

const REVIEW_SELECT: &str = r#"
    SELECT r.id, r.title_id AS title, r.text, u.username AS author, r.author_id, r.score, r.pub_date
    FROM reviews r
    JOIN users u ON u.id = r.author_id
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.review_id AS review, c.text, u.username AS author, c.author_id, c.pub_date
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

#[derive(Debug, FromRow)]
struct TitleGenreRow {
    title_id: i64,
    id: i64,
    name: String,
    slug: String,
}

/// PostgreSQL-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn genres_for(&self, title_ids: &[i64]) -> Result<HashMap<i64, Vec<Term>>, DatabaseError> {
        let mut by_title: HashMap<i64, Vec<Term>> = HashMap::new();
        if title_ids.is_empty() {
            return Ok(by_title);
        }

        let rows = sqlx::query_as::<_, TitleGenreRow>(
            r#"
            SELECT tg.title_id, g.id, g.name, g.slug
            FROM title_genres tg
            JOIN genres g ON g.id = tg.genre_id
            WHERE tg.title_id = ANY($1)
            ORDER BY g.name
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in rows {
            by_title
                .entry(row.title_id)
                .or_default()
                .push(Term { id: row.id, name: row.name, slug: row.slug });
        }
        Ok(by_title)
    }

    async fn with_genres(&self, rows: Vec<TitleRow>) -> Result<Vec<Title>, DatabaseError> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut genres = self.genres_for(&ids).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let genre = genres.remove(&row.id).unwrap_or_default();
                row.into_title(genre)
            })
            .collect())
    }

    async fn load_title(&self, id: i64) -> Result<Title, DatabaseError> {
        self.title_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Title {} not found", id)))
    }
}

/// Translate constraint violations on writes into field-keyed conflicts
fn map_write_error(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let (field, message) = match db.constraint() {
                Some("users_email_key") => ("email", "A user with this email already exists"),
                Some("users_username_key") => ("username", "A user with this username already exists"),
                Some("categories_slug_key") | Some("genres_slug_key") => ("slug", "This slug is already in use"),
                Some("reviews_title_author_key") => ("non_field_errors", "Only one review per title is allowed"),
                _ => ("non_field_errors", "Duplicate value"),
            };
            return DatabaseError::conflict(field, message);
        }
        if db.is_foreign_key_violation() {
            return DatabaseError::QueryError(format!("Referenced row does not exist: {}", db.message()));
        }
    }
    DatabaseError::Sqlx(err)
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO users (email, username, first_name, last_name, bio, role, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.bio)
            .bind(user.role.as_str())
            .bind(user.is_superuser)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = lower($1)", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?)
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(&self.pool).await?)
    }

    async fn list_users(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let where_clause = "WHERE ($1::text IS NULL OR strpos(lower(username), lower($1)) > 0)";
        let sql = format!(
            "SELECT {} FROM users {} ORDER BY username {}",
            USER_COLUMNS,
            where_clause,
            page.to_sql()
        );
        let users = sqlx::query_as::<_, User>(&sql).bind(search).fetch_all(&self.pool).await?;

        let count_sql = format!("SELECT COUNT(*) FROM users {}", where_clause);
        let (count,): (i64,) = sqlx::query_as(&count_sql).bind(search).fetch_one(&self.pool).await?;
        Ok((users, count))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let sql = format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                username = COALESCE($3, username),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = COALESCE($6, bio),
                role = COALESCE($7, role)
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email)
            .bind(changes.username)
            .bind(changes.first_name)
            .bind(changes.last_name)
            .bind(changes.bio)
            .bind(changes.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_confirmation_code(&self, id: i64, code_hash: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE users SET confirmation_code = $2 WHERE id = $1")
            .bind(id)
            .bind(code_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn list_terms(
        &self,
        kind: TermKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Term>, i64), DatabaseError> {
        let where_clause = "WHERE ($1::text IS NULL OR strpos(lower(name), lower($1)) > 0)";
        let sql = format!(
            "SELECT id, name, slug FROM {} {} ORDER BY name, id {}",
            kind.table(),
            where_clause,
            page.to_sql()
        );
        let terms = sqlx::query_as::<_, Term>(&sql).bind(search).fetch_all(&self.pool).await?;

        let count_sql = format!("SELECT COUNT(*) FROM {} {}", kind.table(), where_clause);
        let (count,): (i64,) = sqlx::query_as(&count_sql).bind(search).fetch_one(&self.pool).await?;
        Ok((terms, count))
    }

    async fn term_by_slug(&self, kind: TermKind, slug: &str) -> Result<Option<Term>, DatabaseError> {
        let sql = format!("SELECT id, name, slug FROM {} WHERE slug = $1", kind.table());
        Ok(sqlx::query_as::<_, Term>(&sql).bind(slug).fetch_optional(&self.pool).await?)
    }

    async fn create_term(&self, kind: TermKind, term: NewTerm) -> Result<Term, DatabaseError> {
        let sql = format!(
            "INSERT INTO {} (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
            kind.table()
        );
        sqlx::query_as::<_, Term>(&sql)
            .bind(&term.name)
            .bind(&term.slug)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_term(&self, kind: TermKind, slug: &str) -> Result<bool, DatabaseError> {
        // Titles referencing a category fall back to NULL via ON DELETE SET NULL
        let sql = format!("DELETE FROM {} WHERE slug = $1", kind.table());
        let result = sqlx::query(&sql).bind(slug).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest) -> Result<(Vec<Title>, i64), DatabaseError> {
        let sql = format!("{} {} ORDER BY t.id DESC {}", TITLE_SELECT, TITLE_WHERE, page.to_sql());
        let rows = sqlx::query_as::<_, TitleRow>(&sql)
            .bind(filter.category.as_deref())
            .bind(filter.genre.as_deref())
            .bind(filter.name.as_deref())
            .bind(filter.year)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM titles t LEFT JOIN categories c ON c.id = t.category_id {}",
            TITLE_WHERE
        );
        let (count,): (i64,) = sqlx::query_as(&count_sql)
            .bind(filter.category.as_deref())
            .bind(filter.genre.as_deref())
            .bind(filter.name.as_deref())
            .bind(filter.year)
            .fetch_one(&self.pool)
            .await?;

        Ok((self.with_genres(rows).await?, count))
    }

    async fn title_by_id(&self, id: i64) -> Result<Option<Title>, DatabaseError> {
        let sql = format!("{} WHERE t.id = $1", TITLE_SELECT);
        let row = sqlx::query_as::<_, TitleRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
        match row {
            Some(row) => Ok(self.with_genres(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_title(&self, title: NewTitle) -> Result<Title, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO titles (name, year, description, category_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&title.name)
        .bind(title.year)
        .bind(&title.description)
        .bind(title.category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        sqlx::query(
            "INSERT INTO title_genres (title_id, genre_id) SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&title.genre_ids)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await?;
        self.load_title(id).await
    }

    async fn update_title(&self, id: i64, changes: TitleChanges) -> Result<Option<Title>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = COALESCE($4, description),
                category_id = CASE WHEN $5 THEN $6 ELSE category_id END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.year)
        .bind(changes.description)
        .bind(changes.category_id.is_some())
        .bind(changes.category_id.flatten())
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(genre_ids) = changes.genre_ids {
            sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            sqlx::query(
                "INSERT INTO title_genres (title_id, genre_id) SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
            )
            .bind(id)
            .bind(&genre_ids)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;
        self.title_by_id(id).await
    }

    async fn delete_title(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> Result<(Vec<Review>, i64), DatabaseError> {
        let sql = format!(
            "{} WHERE r.title_id = $1 ORDER BY r.pub_date DESC, r.id DESC {}",
            REVIEW_SELECT,
            page.to_sql()
        );
        let reviews = sqlx::query_as::<_, Review>(&sql).bind(title_id).fetch_all(&self.pool).await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE title_id = $1")
            .bind(title_id)
            .fetch_one(&self.pool)
            .await?;
        Ok((reviews, count))
    }

    async fn review_by_id(&self, title_id: i64, review_id: i64) -> Result<Option<Review>, DatabaseError> {
        let sql = format!("{} WHERE r.title_id = $1 AND r.id = $2", REVIEW_SELECT);
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(title_id)
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn review_by_author(&self, title_id: i64, author_id: i64) -> Result<Option<Review>, DatabaseError> {
        let sql = format!("{} WHERE r.title_id = $1 AND r.author_id = $2", REVIEW_SELECT);
        Ok(sqlx::query_as::<_, Review>(&sql)
            .bind(title_id)
            .bind(author_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let sql = r#"
            WITH r AS (
                INSERT INTO reviews (title_id, author_id, text, score)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT r.id, r.title_id AS title, r.text, u.username AS author, r.author_id, r.score, r.pub_date
            FROM r JOIN users u ON u.id = r.author_id
        "#;
        sqlx::query_as::<_, Review>(sql)
            .bind(review.title_id)
            .bind(review.author_id)
            .bind(&review.text)
            .bind(review.score)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update_review(&self, review_id: i64, changes: ReviewChanges) -> Result<Option<Review>, DatabaseError> {
        let sql = r#"
            WITH r AS (
                UPDATE reviews SET text = COALESCE($2, text), score = COALESCE($3, score)
                WHERE id = $1
                RETURNING *
            )
            SELECT r.id, r.title_id AS title, r.text, u.username AS author, r.author_id, r.score, r.pub_date
            FROM r JOIN users u ON u.id = r.author_id
        "#;
        sqlx::query_as::<_, Review>(sql)
            .bind(review_id)
            .bind(changes.text)
            .bind(changes.score)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_review(&self, review_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, review_id: i64, page: PageRequest) -> Result<(Vec<Comment>, i64), DatabaseError> {
        let sql = format!(
            "{} WHERE c.review_id = $1 ORDER BY c.pub_date DESC, c.id DESC {}",
            COMMENT_SELECT,
            page.to_sql()
        );
        let comments = sqlx::query_as::<_, Comment>(&sql).bind(review_id).fetch_all(&self.pool).await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE review_id = $1")
            .bind(review_id)
            .fetch_one(&self.pool)
            .await?;
        Ok((comments, count))
    }

    async fn comment_by_id(&self, review_id: i64, comment_id: i64) -> Result<Option<Comment>, DatabaseError> {
        let sql = format!("{} WHERE c.review_id = $1 AND c.id = $2", COMMENT_SELECT);
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(review_id)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let sql = r#"
            WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT c.id, c.review_id AS review, c.text, u.username AS author, c.author_id, c.pub_date
            FROM c JOIN users u ON u.id = c.author_id
        "#;
        sqlx::query_as::<_, Comment>(sql)
            .bind(comment.review_id)
            .bind(comment.author_id)
            .bind(&comment.text)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update_comment(&self, comment_id: i64, text: Option<String>) -> Result<Option<Comment>, DatabaseError> {
        let sql = r#"
            WITH c AS (
                UPDATE comments SET text = COALESCE($2, text)
                WHERE id = $1
                RETURNING *
            )
            SELECT c.id, c.review_id AS review, c.text, u.username AS author, c.author_id, c.pub_date
            FROM c JOIN users u ON u.id = c.author_id
        "#;
        Ok(sqlx::query_as::<_, Comment>(sql)
            .bind(comment_id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

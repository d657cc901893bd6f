use async_trait::async_trait;

use super::manager::DatabaseError;
use super::models::{
    Comment, NewComment, NewReview, NewTerm, NewTitle, NewUser, Review, ReviewChanges, Term, TermKind, Title,
    TitleChanges, TitleFilter, User, UserChanges,
};
use crate::filter::PageRequest;

/// Persistence operations behind the HTTP handlers.
///
/// List methods return the requested window together with the total number of
/// matching rows. Lookups return `Ok(None)` for missing rows; deletes return
/// whether a row was removed. Unique collisions surface as
/// [`DatabaseError::Conflict`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;

    // Users
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;
    async fn list_users(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError>;
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DatabaseError>;
    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError>;
    async fn set_confirmation_code(&self, id: i64, code_hash: &str) -> Result<(), DatabaseError>;

    // Categories and genres
    async fn list_terms(
        &self,
        kind: TermKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Term>, i64), DatabaseError>;
    async fn term_by_slug(&self, kind: TermKind, slug: &str) -> Result<Option<Term>, DatabaseError>;
    async fn create_term(&self, kind: TermKind, term: NewTerm) -> Result<Term, DatabaseError>;
    async fn delete_term(&self, kind: TermKind, slug: &str) -> Result<bool, DatabaseError>;

    // Titles
    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest) -> Result<(Vec<Title>, i64), DatabaseError>;
    async fn title_by_id(&self, id: i64) -> Result<Option<Title>, DatabaseError>;
    async fn create_title(&self, title: NewTitle) -> Result<Title, DatabaseError>;
    async fn update_title(&self, id: i64, changes: TitleChanges) -> Result<Option<Title>, DatabaseError>;
    async fn delete_title(&self, id: i64) -> Result<bool, DatabaseError>;

    // Reviews
    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> Result<(Vec<Review>, i64), DatabaseError>;
    async fn review_by_id(&self, title_id: i64, review_id: i64) -> Result<Option<Review>, DatabaseError>;
    async fn review_by_author(&self, title_id: i64, author_id: i64) -> Result<Option<Review>, DatabaseError>;
    async fn create_review(&self, review: NewReview) -> Result<Review, DatabaseError>;
    async fn update_review(&self, review_id: i64, changes: ReviewChanges) -> Result<Option<Review>, DatabaseError>;
    async fn delete_review(&self, review_id: i64) -> Result<bool, DatabaseError>;

    // Comments
    async fn list_comments(&self, review_id: i64, page: PageRequest) -> Result<(Vec<Comment>, i64), DatabaseError>;
    async fn comment_by_id(&self, review_id: i64, comment_id: i64) -> Result<Option<Comment>, DatabaseError>;
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError>;
    async fn update_comment(&self, comment_id: i64, text: Option<String>) -> Result<Option<Comment>, DatabaseError>;
    async fn delete_comment(&self, comment_id: i64) -> Result<bool, DatabaseError>;
}

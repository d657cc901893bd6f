use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::models::{
    Comment, NewComment, NewReview, NewTerm, NewTitle, NewUser, Review, ReviewChanges, Term, TermKind, Title,
    TitleChanges, TitleFilter, User, UserChanges,
};
use crate::database::{DatabaseError, Store};
use crate::filter::PageRequest;
use crate::rating;

#[derive(Debug, Clone)]
struct TitleRecord {
    id: i64,
    name: String,
    year: i32,
    description: String,
    category_id: Option<i64>,
    genre_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
struct ReviewRecord {
    id: i64,
    title_id: i64,
    author_id: i64,
    text: String,
    score: i32,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    id: i64,
    review_id: i64,
    author_id: i64,
    text: String,
    pub_date: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Term>,
    genres: BTreeMap<i64, Term>,
    titles: BTreeMap<i64, TitleRecord>,
    reviews: BTreeMap<i64, ReviewRecord>,
    comments: BTreeMap<i64, CommentRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn terms(&self, kind: TermKind) -> &BTreeMap<i64, Term> {
        match kind {
            TermKind::Category => &self.categories,
            TermKind::Genre => &self.genres,
        }
    }

    fn terms_mut(&mut self, kind: TermKind) -> &mut BTreeMap<i64, Term> {
        match kind {
            TermKind::Category => &mut self.categories,
            TermKind::Genre => &mut self.genres,
        }
    }

    fn username(&self, user_id: i64) -> String {
        self.users.get(&user_id).map(|u| u.username.clone()).unwrap_or_default()
    }

    fn title_view(&self, record: &TitleRecord) -> Title {
        let mut genre: Vec<Term> = record
            .genre_ids
            .iter()
            .filter_map(|id| self.genres.get(id).cloned())
            .collect();
        genre.sort_by(|a, b| a.name.cmp(&b.name));

        let scores: Vec<i32> = self
            .reviews
            .values()
            .filter(|r| r.title_id == record.id)
            .map(|r| r.score)
            .collect();

        Title {
            id: record.id,
            name: record.name.clone(),
            year: record.year,
            description: record.description.clone(),
            category: record.category_id.and_then(|id| self.categories.get(&id).cloned()),
            genre,
            rating: rating::average(&scores),
        }
    }

    fn review_view(&self, record: &ReviewRecord) -> Review {
        Review {
            id: record.id,
            title: record.title_id,
            text: record.text.clone(),
            author: self.username(record.author_id),
            author_id: record.author_id,
            score: record.score,
            pub_date: record.pub_date,
        }
    }

    fn comment_view(&self, record: &CommentRecord) -> Comment {
        Comment {
            id: record.id,
            review: record.review_id,
            text: record.text.clone(),
            author: self.username(record.author_id),
            author_id: record.author_id,
            pub_date: record.pub_date,
        }
    }

    fn check_user_unique(&self, skip_id: Option<i64>, email: Option<&str>, username: Option<&str>) -> Result<(), DatabaseError> {
        for user in self.users.values().filter(|u| Some(u.id) != skip_id) {
            if email.is_some_and(|e| user.email.eq_ignore_ascii_case(e)) {
                return Err(DatabaseError::conflict("email", "A user with this email already exists"));
            }
            if username.is_some_and(|n| user.username == n) {
                return Err(DatabaseError::conflict("username", "A user with this username already exists"));
            }
        }
        Ok(())
    }

    fn remove_review_cascade(&mut self, review_id: i64) {
        self.reviews.remove(&review_id);
        self.comments.retain(|_, c| c.review_id != review_id);
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

/// In-memory [`Store`] with the same constraints and cascades as the schema
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(None, Some(&user.email), Some(&user.username))?;
        let id = tables.next_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
            is_superuser: user.is_superuser,
            confirmation_code: String::new(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, search: Option<&str>, page: PageRequest) -> Result<(Vec<User>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| search.map_or(true, |s| contains_ci(&u.username, s)))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok((page.apply(&users), users.len() as i64))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Ok(None);
        }
        tables.check_user_unique(Some(id), changes.email.as_deref(), changes.username.as_deref())?;

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.username {
            user.username = v;
        }
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.bio {
            user.bio = v;
        }
        if let Some(v) = changes.role {
            user.role = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let authored: Vec<i64> = tables.reviews.values().filter(|r| r.author_id == id).map(|r| r.id).collect();
        for review_id in authored {
            tables.remove_review_cascade(review_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
        Ok(true)
    }

    async fn set_confirmation_code(&self, id: i64, code_hash: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("User {} not found", id)))?;
        user.confirmation_code = code_hash.to_string();
        Ok(())
    }

    async fn list_terms(
        &self,
        kind: TermKind,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Term>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let mut terms: Vec<Term> = tables
            .terms(kind)
            .values()
            .filter(|t| search.map_or(true, |s| contains_ci(&t.name, s)))
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok((page.apply(&terms), terms.len() as i64))
    }

    async fn term_by_slug(&self, kind: TermKind, slug: &str) -> Result<Option<Term>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.terms(kind).values().find(|t| t.slug == slug).cloned())
    }

    async fn create_term(&self, kind: TermKind, term: NewTerm) -> Result<Term, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.terms(kind).values().any(|t| t.slug == term.slug) {
            return Err(DatabaseError::conflict("slug", "This slug is already in use"));
        }
        let id = tables.next_id();
        let created = Term { id, name: term.name, slug: term.slug };
        tables.terms_mut(kind).insert(id, created.clone());
        Ok(created)
    }

    async fn delete_term(&self, kind: TermKind, slug: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(id) = tables.terms(kind).values().find(|t| t.slug == slug).map(|t| t.id) else {
            return Ok(false);
        };
        tables.terms_mut(kind).remove(&id);
        for title in tables.titles.values_mut() {
            match kind {
                TermKind::Category => {
                    if title.category_id == Some(id) {
                        title.category_id = None;
                    }
                }
                TermKind::Genre => title.genre_ids.retain(|g| *g != id),
            }
        }
        Ok(true)
    }

    async fn list_titles(&self, filter: &TitleFilter, page: PageRequest) -> Result<(Vec<Title>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let mut titles: Vec<Title> = tables
            .titles
            .values()
            .map(|record| tables.title_view(record))
            .filter(|t| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |slug| t.category.as_ref().is_some_and(|c| c.slug == slug))
                    && filter.genre.as_deref().map_or(true, |slug| t.genre.iter().any(|g| g.slug == slug))
                    && filter.name.as_deref().map_or(true, |name| contains_ci(&t.name, name))
                    && filter.year.map_or(true, |year| t.year == year)
            })
            .collect();
        titles.sort_by(|a, b| b.id.cmp(&a.id));
        Ok((page.apply(&titles), titles.len() as i64))
    }

    async fn title_by_id(&self, id: i64) -> Result<Option<Title>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.titles.get(&id).map(|record| tables.title_view(record)))
    }

    async fn create_title(&self, title: NewTitle) -> Result<Title, DatabaseError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let record = TitleRecord {
            id,
            name: title.name,
            year: title.year,
            description: title.description,
            category_id: title.category_id,
            genre_ids: title.genre_ids,
        };
        let view = tables.title_view(&record);
        tables.titles.insert(id, record);
        Ok(view)
    }

    async fn update_title(&self, id: i64, changes: TitleChanges) -> Result<Option<Title>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.titles.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.name {
            record.name = v;
        }
        if let Some(v) = changes.year {
            record.year = v;
        }
        if let Some(v) = changes.description {
            record.description = v;
        }
        if let Some(v) = changes.category_id {
            record.category_id = v;
        }
        if let Some(v) = changes.genre_ids {
            record.genre_ids = v;
        }
        let record = record.clone();
        Ok(Some(tables.title_view(&record)))
    }

    async fn delete_title(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.titles.remove(&id).is_none() {
            return Ok(false);
        }
        let reviews: Vec<i64> = tables.reviews.values().filter(|r| r.title_id == id).map(|r| r.id).collect();
        for review_id in reviews {
            tables.remove_review_cascade(review_id);
        }
        Ok(true)
    }

    async fn list_reviews(&self, title_id: i64, page: PageRequest) -> Result<(Vec<Review>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let mut reviews: Vec<Review> = tables
            .reviews
            .values()
            .filter(|r| r.title_id == title_id)
            .map(|r| tables.review_view(r))
            .collect();
        newest_first(&mut reviews, |r| (r.pub_date, r.id));
        Ok((page.apply(&reviews), reviews.len() as i64))
    }

    async fn review_by_id(&self, title_id: i64, review_id: i64) -> Result<Option<Review>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .get(&review_id)
            .filter(|r| r.title_id == title_id)
            .map(|r| tables.review_view(r)))
    }

    async fn review_by_author(&self, title_id: i64, author_id: i64) -> Result<Option<Review>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .reviews
            .values()
            .find(|r| r.title_id == title_id && r.author_id == author_id)
            .map(|r| tables.review_view(r)))
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.titles.contains_key(&review.title_id) {
            return Err(DatabaseError::QueryError(format!("Title {} does not exist", review.title_id)));
        }
        if tables
            .reviews
            .values()
            .any(|r| r.title_id == review.title_id && r.author_id == review.author_id)
        {
            return Err(DatabaseError::conflict("non_field_errors", "Only one review per title is allowed"));
        }
        let id = tables.next_id();
        let record = ReviewRecord {
            id,
            title_id: review.title_id,
            author_id: review.author_id,
            text: review.text,
            score: review.score,
            pub_date: Utc::now(),
        };
        let view = tables.review_view(&record);
        tables.reviews.insert(id, record);
        Ok(view)
    }

    async fn update_review(&self, review_id: i64, changes: ReviewChanges) -> Result<Option<Review>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.reviews.get_mut(&review_id) else {
            return Ok(None);
        };
        if let Some(v) = changes.text {
            record.text = v;
        }
        if let Some(v) = changes.score {
            record.score = v;
        }
        let record = record.clone();
        Ok(Some(tables.review_view(&record)))
    }

    async fn delete_review(&self, review_id: i64) -> Result<bool, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.reviews.contains_key(&review_id) {
            return Ok(false);
        }
        tables.remove_review_cascade(review_id);
        Ok(true)
    }

    async fn list_comments(&self, review_id: i64, page: PageRequest) -> Result<(Vec<Comment>, i64), DatabaseError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.review_id == review_id)
            .map(|c| tables.comment_view(c))
            .collect();
        newest_first(&mut comments, |c| (c.pub_date, c.id));
        Ok((page.apply(&comments), comments.len() as i64))
    }

    async fn comment_by_id(&self, review_id: i64, comment_id: i64) -> Result<Option<Comment>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .get(&comment_id)
            .filter(|c| c.review_id == review_id)
            .map(|c| tables.comment_view(c)))
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.reviews.contains_key(&comment.review_id) {
            return Err(DatabaseError::QueryError(format!("Review {} does not exist", comment.review_id)));
        }
        let id = tables.next_id();
        let record = CommentRecord {
            id,
            review_id: comment.review_id,
            author_id: comment.author_id,
            text: comment.text,
            pub_date: Utc::now(),
        };
        let view = tables.comment_view(&record);
        tables.comments.insert(id, record);
        Ok(view)
    }

    async fn update_comment(&self, comment_id: i64, text: Option<String>) -> Result<Option<Comment>, DatabaseError> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.comments.get_mut(&comment_id) else {
            return Ok(None);
        };
        if let Some(v) = text {
            record.text = v;
        }
        let record = record.clone();
        Ok(Some(tables.comment_view(&record)))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.tables.write().await.comments.remove(&comment_id).is_some())
    }
}

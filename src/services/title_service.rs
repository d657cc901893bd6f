use std::sync::Arc;

use crate::database::models::TermKind;
use crate::database::Store;

use super::ServiceError;

/// Resolves category and genre slugs submitted with title writes
pub struct TitleService {
    store: Arc<dyn Store>,
}

impl TitleService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn resolve_category(&self, slug: &str) -> Result<i64, ServiceError> {
        self.store
            .term_by_slug(TermKind::Category, slug)
            .await?
            .map(|term| term.id)
            .ok_or_else(|| ServiceError::validation("category", format!("Category '{}' does not exist", slug)))
    }

    pub async fn resolve_genres(&self, slugs: &[String]) -> Result<Vec<i64>, ServiceError> {
        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let term = self
                .store
                .term_by_slug(TermKind::Genre, slug)
                .await?
                .ok_or_else(|| ServiceError::validation("genre", format!("Genre '{}' does not exist", slug)))?;
            if !ids.contains(&term.id) {
                ids.push(term.id);
            }
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MemoryStore};

    #[tokio::test]
    async fn resolves_known_slugs_and_dedupes() {
        let store = Arc::new(MemoryStore::new());
        let drama = fixtures::term(&store, TermKind::Genre, "Drama", "drama").await;
        let service = TitleService::new(store);

        let ids = service
            .resolve_genres(&["drama".to_string(), "drama".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, vec![drama.id]);
    }

    #[tokio::test]
    async fn unknown_slug_is_keyed_by_field() {
        let store = Arc::new(MemoryStore::new());
        let service = TitleService::new(store);

        let err = service.resolve_category("films").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "category"));
        let err = service.resolve_genres(&["noir".to_string()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { ref field, .. } if field == "genre"));
    }
}

use serde::Deserialize;

use super::error::FilterError;

/// Query-string parameters shared by the list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page_request(&self) -> Result<PageRequest, FilterError> {
        PageRequest::new(self.limit, self.offset)
    }

    /// Search term with surrounding whitespace removed; blank means no search
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Validated limit/offset window. No limit means every row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageRequest {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl PageRequest {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, FilterError> {
        if let Some(l) = limit {
            if l < 0 {
                return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
            }
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
        }

        // Apply max page size from config
        let max_limit = crate::config::CONFIG.api.max_page_size.unwrap_or(i64::MAX);
        let limit = limit.map(|l| {
            if l > max_limit {
                tracing::debug!("Limit {} exceeds max {}, capping to max", l, max_limit);
                max_limit
            } else {
                l
            }
        });

        Ok(Self { limit, offset })
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// Slice an already ordered collection to this window
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = (self.offset as usize).min(items.len());
        let end = match self.limit {
            Some(l) => start.saturating_add(l as usize).min(items.len()),
            None => items.len(),
        };
        items[start..end].to_vec()
    }

    /// SQL `LIMIT ... OFFSET ...` suffix; `LIMIT ALL` when unbounded
    pub fn to_sql(&self) -> String {
        match self.limit {
            Some(l) => format!("LIMIT {} OFFSET {}", l, self.offset),
            None => format!("LIMIT ALL OFFSET {}", self.offset),
        }
    }
}

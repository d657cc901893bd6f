pub mod collection;
pub mod record;

pub use collection::get as titles_get;
pub use collection::post as titles_post;
pub use record::delete as title_delete;
pub use record::get as title_get;
pub use record::patch as title_patch;

use chrono::{Datelike, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::TitleFilter;
use crate::error::ApiError;
use crate::filter::{FilterError, PageRequest};
use crate::handlers::double_option;

/// Query string of the title listing: pagination plus filters
#[derive(Debug, Default, Deserialize)]
pub struct TitleQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Category slug
    pub category: Option<String>,
    /// Genre slug
    pub genre: Option<String>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl TitleQuery {
    pub fn page_request(&self) -> Result<PageRequest, FilterError> {
        PageRequest::new(self.limit, self.offset)
    }

    pub fn filter(&self) -> TitleFilter {
        let non_blank = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        TitleFilter {
            category: non_blank(&self.category),
            genre: non_blank(&self.genre),
            name: non_blank(&self.name),
            year: self.year,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTitle {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub description: String,
    /// Category slug
    pub category: Option<String>,
    /// Genre slugs
    #[serde(default)]
    pub genre: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTitle {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// `null` clears the category
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

/// Release year may not lie in the future
pub(crate) fn check_year(year: i32) -> Result<(), ApiError> {
    let current = Utc::now().year();
    if year > current {
        return Err(ApiError::field("year", format!("Year cannot be later than {}", current)));
    }
    Ok(())
}

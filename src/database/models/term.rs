use serde::Serialize;
use sqlx::FromRow;

/// Categories and genres share one shape and differ only by table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Genre,
}

impl TermKind {
    pub fn table(&self) -> &'static str {
        match self {
            TermKind::Category => "categories",
            TermKind::Genre => "genres",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TermKind::Category => "Category",
            TermKind::Genre => "Genre",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Term {
    #[serde(skip_serializing)]
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone)]
pub struct NewTerm {
    pub name: String,
    pub slug: String,
}

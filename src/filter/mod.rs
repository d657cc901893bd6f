pub mod error;
pub mod page;
pub mod types;

pub use error::FilterError;
pub use page::Page;
pub use types::*;

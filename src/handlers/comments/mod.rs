pub mod collection;
pub mod record;

pub use collection::get as comments_get;
pub use collection::post as comments_post;
pub use record::delete as comment_delete;
pub use record::get as comment_get;
pub use record::patch as comment_patch;

use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub text: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateComment {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub text: Option<String>,
}

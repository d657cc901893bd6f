pub mod collection;
pub mod record;

pub use collection::get as reviews_get;
pub use collection::post as reviews_post;
pub use record::delete as review_delete;
pub use record::get as review_get;
pub use record::patch as review_patch;

use serde::Deserialize;
use validator::Validate;

use crate::database::models::ReviewChanges;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReview {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub text: String,
    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReview {
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub text: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Score must be between 1 and 10"))]
    pub score: Option<i32>,
}

impl From<UpdateReview> for ReviewChanges {
    fn from(body: UpdateReview) -> Self {
        ReviewChanges { text: body.text, score: body.score }
    }
}

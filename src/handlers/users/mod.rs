pub mod collection;
pub mod me;
pub mod record;

pub use collection::get as users_get;
pub use collection::post as users_post;
pub use me::get as me_get;
pub use me::patch as me_patch;
pub use record::delete as user_delete;
pub use record::get as user_get;
pub use record::patch as user_patch;

use serde::Deserialize;
use validator::Validate;

use crate::database::models::{NewUser, Role, UserChanges};
use crate::handlers::validate_username;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(email(message = "Enter a valid email address"), length(max = 100, message = "Email must be at most 100 characters"))]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"), custom(function = "validate_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub role: Role,
}

impl From<CreateUser> for NewUser {
    fn from(body: CreateUser) -> Self {
        NewUser {
            email: body.email.to_lowercase(),
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            bio: body.bio,
            role: body.role,
            is_superuser: false,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(email(message = "Enter a valid email address"), length(max = 100, message = "Email must be at most 100 characters"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Username must be between 1 and 100 characters"), custom(function = "validate_username"))]
    pub username: Option<String>,
    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
}

impl From<UpdateUser> for UserChanges {
    fn from(body: UpdateUser) -> Self {
        UserChanges {
            email: body.email.map(|e| e.to_lowercase()),
            username: body.username,
            first_name: body.first_name,
            last_name: body.last_name,
            bio: body.bio,
            role: body.role,
        }
    }
}

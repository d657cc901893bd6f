pub mod email;
pub mod token;

pub use email::post as email_post;
pub use token::post as token_post;

pub mod comment;
pub mod review;
pub mod term;
pub mod title;
pub mod user;

pub use comment::{Comment, NewComment};
pub use review::{NewReview, Review, ReviewChanges};
pub use term::{NewTerm, Term, TermKind};
pub use title::{NewTitle, Title, TitleChanges, TitleFilter, TitleRow};
pub use user::{NewUser, Role, User, UserChanges};

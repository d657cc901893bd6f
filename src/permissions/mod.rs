//! Composable access predicates.
//!
//! A [`Rule`] answers two questions for a request: whether the principal may
//! reach the endpoint at all ([`Rule::has_permission`]) and, once the target
//! row is loaded, whether they may act on that row
//! ([`Rule::has_object_permission`]). Rules combine with `&` and `|`:
//!
//! ```ignore
//! let policy = Rule::IsAuthenticatedOrReadOnly
//!     & (Rule::IsAdmin | Rule::IsModer | Rule::IsAuthor | Rule::ReadOnly);
//! ```

use axum::http::Method;
use std::ops::{BitAnd, BitOr};

use crate::database::models::{Role, User};
use crate::error::ApiError;

/// Who is making the request, reduced to what the rules need
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
    pub is_superuser: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_superuser
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role, is_superuser: user.is_superuser }
    }
}

/// Ownership facts about the row a request acts on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Target {
    /// A user profile, by user id
    Profile(i64),
    /// A review or comment, by author id
    Authored { author_id: i64 },
}

/// Request facts the rules are evaluated against
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub principal: Option<Principal>,
    pub method: Method,
}

impl AccessContext {
    pub fn new(principal: Option<Principal>, method: Method) -> Self {
        Self { principal, method }
    }

    pub fn is_safe_method(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    AllowAny,
    IsAuthenticated,
    IsAuthenticatedOrReadOnly,
    IsAdmin,
    IsModer,
    IsOwner,
    IsAuthor,
    ReadOnly,
    And(Box<Rule>, Box<Rule>),
    Or(Box<Rule>, Box<Rule>),
}

impl Rule {
    pub fn has_permission(&self, ctx: &AccessContext) -> bool {
        match self {
            Rule::AllowAny => true,
            Rule::IsAuthenticated => ctx.is_authenticated(),
            Rule::IsAuthenticatedOrReadOnly => ctx.is_safe_method() || ctx.is_authenticated(),
            Rule::IsAdmin => ctx.principal.as_ref().is_some_and(Principal::is_admin),
            Rule::IsModer => ctx.principal.as_ref().is_some_and(Principal::is_moderator),
            // Ownership is only decidable once the row is loaded
            Rule::IsOwner | Rule::IsAuthor => true,
            Rule::ReadOnly => ctx.is_safe_method(),
            Rule::And(a, b) => a.has_permission(ctx) && b.has_permission(ctx),
            Rule::Or(a, b) => a.has_permission(ctx) || b.has_permission(ctx),
        }
    }

    pub fn has_object_permission(&self, ctx: &AccessContext, target: &Target) -> bool {
        match self {
            Rule::IsOwner => match (&ctx.principal, target) {
                (Some(p), Target::Profile(user_id)) => p.id == *user_id,
                _ => false,
            },
            Rule::IsAuthor => match (&ctx.principal, target) {
                (Some(p), Target::Authored { author_id }) => p.id == *author_id,
                _ => false,
            },
            Rule::And(a, b) => a.has_object_permission(ctx, target) && b.has_object_permission(ctx, target),
            // A branch only grants object access if it also granted endpoint access
            Rule::Or(a, b) => {
                (a.has_permission(ctx) && a.has_object_permission(ctx, target))
                    || (b.has_permission(ctx) && b.has_object_permission(ctx, target))
            }
            other => other.has_permission(ctx),
        }
    }

    /// Endpoint-level check, mapped to 401 for anonymous and 403 otherwise
    pub fn check(&self, ctx: &AccessContext) -> Result<(), ApiError> {
        if self.has_permission(ctx) {
            Ok(())
        } else {
            Err(denied(ctx))
        }
    }

    /// Row-level check; callers run it after the row lookup so missing rows stay 404
    pub fn check_object(&self, ctx: &AccessContext, target: &Target) -> Result<(), ApiError> {
        if self.has_permission(ctx) && self.has_object_permission(ctx, target) {
            Ok(())
        } else {
            Err(denied(ctx))
        }
    }
}

fn denied(ctx: &AccessContext) -> ApiError {
    if ctx.is_authenticated() {
        ApiError::forbidden("You do not have permission to perform this action")
    } else {
        ApiError::unauthorized("Authentication credentials were not provided")
    }
}

impl BitAnd for Rule {
    type Output = Rule;

    fn bitand(self, rhs: Rule) -> Rule {
        Rule::And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for Rule {
    type Output = Rule;

    fn bitor(self, rhs: Rule) -> Rule {
        Rule::Or(Box::new(self), Box::new(rhs))
    }
}

/// Policies attached to each resource
pub mod policy {
    use super::Rule;

    /// User administration: admins only
    pub fn users() -> Rule {
        Rule::IsAuthenticated & Rule::IsAdmin
    }

    /// `/users/me`: any signed-in user, on their own profile
    pub fn own_profile() -> Rule {
        Rule::IsAuthenticated & Rule::IsOwner
    }

    /// Titles, categories and genres: everyone reads, admins write
    pub fn catalog() -> Rule {
        Rule::IsAdmin | Rule::ReadOnly
    }

    /// Reviews and comments: everyone reads, signed-in users post,
    /// authors, moderators and admins edit
    pub fn discussion() -> Rule {
        Rule::IsAuthenticatedOrReadOnly & (Rule::IsAdmin | Rule::IsModer | Rule::IsAuthor | Rule::ReadOnly)
    }
}

//! Bearer-token principals and the elevated-permission route guard.

mod guard;
mod principal;

pub use guard::{require_role, Audience, RoleGuard};
pub use principal::{AuthError, Principal, TokenRegistry};

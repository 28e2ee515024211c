//! User accounts: signup, login, and session resolution.

pub mod domain;
pub mod router;
pub mod service;

pub use domain::{SignupRequest, User};
pub use router::auth_router;
pub use service::{AccountService, AuthError, Authenticator};

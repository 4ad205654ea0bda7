//! # pfy-auth
//!
//! Stateless HS256 JWT authentication for Projectify.
//!
//! Tokens carry the user id and role. The HTTP layer verifies them with
//! [`verify_token`] on every `/api` request and once per WebSocket
//! connection, before the socket is bound to its user room.

pub mod bearer;
pub mod claims;
pub mod error;
pub mod jwt;

pub use bearer::{bearer_token, require_role};
pub use claims::PfyClaims;
pub use error::AuthError;
pub use jwt::{issue_token, issue_token_at, verify_token};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated: missing bearer token")]
    NotAuthenticated,

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("forbidden: role '{role}' may not perform this action")]
    Forbidden { role: String },

    #[error("signing secret is not configured")]
    MissingSecret,

    #[error("{0}")]
    Other(String),
}

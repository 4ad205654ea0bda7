use chrono::{DateTime, Utc};
use pfy_core::enums::UserRole;
use serde::{Deserialize, Serialize};

/// Claims as they appear on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireClaims {
    pub user_id: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

/// Verified token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PfyClaims {
    pub user_id: String,
    pub role: UserRole,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_uses_camel_case() {
        let wire = WireClaims {
            user_id: "usr-1".into(),
            role: UserRole::SuperAdmin,
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_string(&wire).unwrap();
        assert!(json.contains("\"userId\":\"usr-1\""));
        assert!(json.contains("\"role\":\"super_admin\""));
    }
}

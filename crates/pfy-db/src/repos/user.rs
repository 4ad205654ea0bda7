//! User repository. Accounts only; credentials live elsewhere.

use pfy_core::entities::User;
use pfy_core::enums::UserRole;
use pfy_core::ids::PREFIX_USER;
use pfy_core::views::UserSummary;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_bool, get_opt_string, now, opt_value, parse_datetime, parse_enum,
    unique_violation,
};
use crate::service::PfyService;

const SELECT_COLS: &str =
    "id, full_name, email, role, status, profile_image, created_at, updated_at";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        role: parse_enum(&row.get::<String>(3)?)?,
        status: get_bool(row, 4)?,
        profile_image: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl PfyService {
    /// # Errors
    ///
    /// `Validation` on a blank name or malformed email, `Conflict` if the
    /// email is already registered.
    pub async fn create_user(
        &self,
        full_name: &str,
        email: &str,
        role: UserRole,
        profile_image: Option<&str>,
    ) -> Result<User, DatabaseError> {
        let full_name = full_name.trim();
        let email = email.trim();
        if full_name.is_empty() {
            return Err(DatabaseError::Validation("full name is required".into()));
        }
        if !email.contains('@') {
            return Err(DatabaseError::Validation(format!("invalid email '{email}'")));
        }

        let now = now();
        let ts = format_datetime(&now);
        let id = self.db().generate_id(PREFIX_USER).await?;

        self.db()
            .execute_with(
                &format!("INSERT INTO users ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?6)"),
                || {
                    libsql::params_from_iter(vec![
                        libsql::Value::from(id.clone()),
                        full_name.into(),
                        email.into(),
                        role.as_str().into(),
                        opt_value(profile_image),
                        ts.clone().into(),
                    ])
                },
            )
            .await
            .map_err(|e| unique_violation(e, "email"))?;

        Ok(User {
            id,
            full_name: full_name.to_string(),
            email: email.to_string(),
            role,
            status: true,
            profile_image: profile_image.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let mut rows = self
            .db()
            .query_with(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), || [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_user(&row)
    }

    /// Public projection of a user: no role, status, or timestamps.
    pub async fn user_summary(&self, id: &str) -> Result<UserSummary, DatabaseError> {
        let user = self.get_user(id).await?;
        Ok(UserSummary {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            profile_image: user.profile_image,
        })
    }

    /// Whether a user row exists for `id`.
    pub async fn user_exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .db()
            .query_with("SELECT 1 FROM users WHERE id = ?1", || [id])
            .await?;
        Ok(rows.next().await?.is_some())
    }
}

//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. Timestamps are written by [`format_datetime`] in a fixed-width
//! form so that TEXT comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::error::DatabaseError;

/// Current time truncated to the precision stored in the database.
///
/// Entities returned from create/update calls compare equal to the same
/// entity read back later.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Truncate a caller-supplied timestamp to stored precision.
#[must_use]
pub fn to_stored(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.trunc_subsecs(6)
}

/// Format a timestamp for storage: `2026-10-18T12:00:00.000000Z`.
#[must_use]
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Accepts RFC 3339 as well as `SQLite`'s `datetime('now')` format.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all pfy-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER 0/1 column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Read a non-negative INTEGER column (e.g. a `COUNT(*)`) as `u64`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_count(row: &libsql::Row, idx: i32) -> Result<u64, DatabaseError> {
    let n = row.get::<i64>(idx)?;
    u64::try_from(n).map_err(|_| DatabaseError::InvalidState(format!("negative count {n}")))
}

/// Deserialize a JSON TEXT column into `T`. NULL and empty map to `None`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json<T: serde::de::DeserializeOwned>(
    s: Option<&str>,
) -> Result<Option<T>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let val = serde_json::from_str(s)
                .map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))?;
            Ok(Some(val))
        }
        _ => Ok(None),
    }
}

/// Map a libSQL constraint failure on a UNIQUE column to `Conflict`.
pub(crate) fn unique_violation(e: DatabaseError, what: &str) -> DatabaseError {
    match e {
        DatabaseError::LibSql(ref inner)
            if inner.to_string().contains("UNIQUE constraint failed") =>
        {
            DatabaseError::Conflict(format!("{what} already exists"))
        }
        other => other,
    }
}

/// Optional string as a libSQL value (`NULL` for `None`).
pub(crate) fn opt_value(v: Option<&str>) -> libsql::Value {
    v.map_or(libsql::Value::Null, |s| libsql::Value::Text(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pfy_core::enums::TaskStatus;

    #[test]
    fn stored_format_is_fixed_width_and_sortable() {
        let a = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(1);
        let sa = format_datetime(&a);
        let sb = format_datetime(&b);
        assert_eq!(sa, "2026-01-01T09:00:00.000000Z");
        assert_eq!(sa.len(), sb.len());
        assert!(sa < sb);
    }

    #[test]
    fn stored_roundtrip_is_lossless() {
        let t = now();
        assert_eq!(parse_datetime(&format_datetime(&t)).unwrap(), t);
    }

    #[test]
    fn parses_sqlite_default_format() {
        let dt = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2026, 2, 9, 14, 30, 0).unwrap());
    }

    #[test]
    fn parse_enum_uses_snake_case() {
        let s: TaskStatus = parse_enum("in_progress").unwrap();
        assert_eq!(s, TaskStatus::InProgress);
        assert!(parse_enum::<TaskStatus>("done").is_err());
    }

    #[test]
    fn optional_json_maps_empty_to_none() {
        assert_eq!(parse_optional_json::<Vec<String>>(None).unwrap(), None);
        assert_eq!(parse_optional_json::<Vec<String>>(Some("")).unwrap(), None);
        assert_eq!(
            parse_optional_json::<Vec<String>>(Some(r#"["a"]"#)).unwrap(),
            Some(vec!["a".to_string()])
        );
    }
}

//! Category slug normalisation.
//!
//! Uniqueness is resolved by the database layer, which tries
//! [`with_suffix`] candidates until one is free.

/// Lowercase ASCII slug. Non-ASCII text is transliterated first
/// (`Café` becomes `cafe`), then every run of other characters becomes a
/// single `-` with leading and trailing dashes trimmed.
///
/// Returns `"item"` when nothing usable remains, so a slug is never empty.
#[must_use]
pub fn slugify(text: &str) -> String {
    let slug = ::slug::slugify(text);
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug
    }
}

/// The `n`-th collision candidate: `base` for 0, `base-n` otherwise.
#[must_use]
pub fn with_suffix(base: &str, n: u32) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{base}-{n}")
    }
}

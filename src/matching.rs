//! Name normalization for boundary-file compatibility.
//!
//! Boundary files disagree with the registry on formatting ("Coimbatore"
//! vs "Coimbatore District", mixed case), so all name comparison goes
//! through these two functions rather than being inlined at call sites.

/// Case-insensitive exact match, ignoring surrounding whitespace. Used for
/// registry lookups by display name.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Case-insensitive substring match: does `haystack` contain `needle`?
/// Deliberately lenient so that "Coimbatore District" still matches the
/// registry name "Coimbatore". Used by the constituency subset filter.
pub fn name_contains(haystack: &str, needle: &str) -> bool {
    haystack.trim().to_lowercase().contains(&needle.trim().to_lowercase())
}

//! # SKU Derivation
//!
//! Items created without a SKU get one derived from their name. Uniqueness
//! is resolved by the catalog, which walks [`sku_candidate`] until it finds
//! a free value.
//!
//! ```text
//! "Tusker Lager 500ml"  ──► "TUSKERLAGER500ML"
//!   taken?              ──► "TUSKERLAGER500M1", "TUSKERLAGER500M2", ...
//!   9999 taken?         ──► "TUSKERLAGER500ML" + last 4 digits of now (ms)
//! ```

use crate::MAX_SKU_LENGTH;

/// Prefix length kept when a numeric suffix is appended.
pub const SKU_SUFFIX_BASE_LENGTH: usize = 15;

/// Highest numeric suffix tried before falling back to a timestamp.
pub const SKU_SUFFIX_LIMIT: u32 = 9999;

/// Derives a SKU from an item name.
///
/// Uppercases, keeps ASCII letters and digits only (spaces and punctuation
/// are dropped), and truncates to [`MAX_SKU_LENGTH`]. Returns `None` when
/// nothing usable is left.
///
/// ## Example
/// ```rust
/// use venue_core::sku::derive_sku;
///
/// assert_eq!(derive_sku("Coca-Cola 330ml").as_deref(), Some("COCACOLA330ML"));
/// assert_eq!(derive_sku("  ").as_deref(), None);
/// ```
pub fn derive_sku(name: &str) -> Option<String> {
    let sku: String = name
        .to_ascii_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_SKU_LENGTH)
        .collect();

    if sku.is_empty() {
        None
    } else {
        Some(sku)
    }
}

/// The `attempt`-th candidate for a derived SKU.
///
/// Attempt 0 is the base itself, attempts `1..=SKU_SUFFIX_LIMIT` append the
/// attempt number to the first 15 characters, anything beyond appends the
/// last four digits of `now_millis` to the full base.
pub fn sku_candidate(base: &str, attempt: u32, now_millis: i64) -> String {
    if attempt == 0 {
        return base.to_string();
    }

    if attempt <= SKU_SUFFIX_LIMIT {
        let prefix: String = base.chars().take(SKU_SUFFIX_BASE_LENGTH).collect();
        return format!("{prefix}{attempt}");
    }

    let millis = now_millis.unsigned_abs().to_string();
    let tail = &millis[millis.len().saturating_sub(4)..];
    format!("{base}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_strips_and_truncates() {
        assert_eq!(derive_sku("Tusker Lager").as_deref(), Some("TUSKERLAGER"));
        assert_eq!(derive_sku("gin & tonic!").as_deref(), Some("GINTONIC"));
        assert_eq!(
            derive_sku("Johnnie Walker Black Label 750ml").as_deref(),
            Some("JOHNNIEWALKERBLACKLA")
        );
        assert_eq!(derive_sku("!!!"), None);
        assert_eq!(derive_sku(""), None);
    }

    #[test]
    fn test_candidates() {
        let base = "JOHNNIEWALKERBLACKLA";
        assert_eq!(sku_candidate(base, 0, 0), base);
        assert_eq!(sku_candidate(base, 1, 0), "JOHNNIEWALKERBL1");
        assert_eq!(sku_candidate("GIN", 42, 0), "GIN42");
        assert_eq!(sku_candidate("GIN", 10_000, 1_718_000_001_234), "GIN1234");
    }
}

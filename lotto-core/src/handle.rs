//! Handle normalization and cookie-name derivation.
//!
//! A handle is the caller-supplied name of one lottery. Before it touches the
//! cookie store it is canonicalized into a lowercase token with `_` inserted
//! at case boundaries, so `MyFeature` and `my_feature` address the same
//! record.

/// Prefix for every lottery cookie name.
pub const COOKIE_PREFIX: &str = "lotto_";

/// Canonical storage token for a handle.
///
/// Inserts `_` before every non-leading uppercase letter, then lowercases.
/// The rule only fires on uppercase input, so the function is idempotent:
/// `canonicalize("my_feature") == "my_feature"`.
pub fn canonicalize(handle: &str) -> String {
    let mut out = String::with_capacity(handle.len() + 4);
    for (i, ch) in handle.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Cookie name under which a handle's decision is persisted.
///
/// `cookie_name("Checkout")` is `"lotto_checkout"`.
pub fn cookie_name(handle: &str) -> String {
    format!("{}{}", COOKIE_PREFIX, canonicalize(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inserts_separators_at_case_boundaries() {
        assert_eq!(canonicalize("MyFeatureFlag"), "my_feature_flag");
        assert_eq!(canonicalize("Beta"), "beta");
    }

    #[test]
    fn test_snake_case_is_a_fixpoint() {
        assert_eq!(canonicalize("already_snake"), "already_snake");
        let once = canonicalize("MyFeatureFlag");
        assert_eq!(canonicalize(&once), once);
    }

    #[test]
    fn test_consecutive_uppercase_each_get_a_separator() {
        assert_eq!(canonicalize("HTTPApi"), "h_t_t_p_api");
    }

    #[test]
    fn test_cookie_name_uses_prefix() {
        assert_eq!(cookie_name("Checkout"), "lotto_checkout");
        assert_eq!(cookie_name("promo"), "lotto_promo");
    }
}

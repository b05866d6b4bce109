//! Detection hints.
//!
//! Hints can be set in code or picked up from the environment:
//! `QR_TRY_HARDER=1` turns on the exhaustive row scan.

use std::sync::OnceLock;

fn parse_env_bool_u8(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map(|v| v != 0)
        .unwrap_or(default)
}

static TRY_HARDER: OnceLock<bool> = OnceLock::new();

fn try_harder_from_env() -> bool {
    *TRY_HARDER.get_or_init(|| parse_env_bool_u8("QR_TRY_HARDER", false))
}

/// Options that trade speed for recall
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeHints {
    /// Scan every third row regardless of image size
    pub try_harder: bool,
}

impl DecodeHints {
    /// Hints with `try_harder` enabled
    pub fn try_harder() -> Self {
        Self { try_harder: true }
    }

    /// Hints read from the environment (cached after the first call)
    pub fn from_env() -> Self {
        Self {
            try_harder: try_harder_from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_bool() {
        assert!(!parse_env_bool_u8("QR_LOCATE_TEST_UNSET_VARIABLE", false));
        assert!(parse_env_bool_u8("QR_LOCATE_TEST_UNSET_VARIABLE", true));
    }

    #[test]
    fn test_defaults() {
        assert!(!DecodeHints::default().try_harder);
        assert!(DecodeHints::try_harder().try_harder);
    }
}

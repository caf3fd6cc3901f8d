//! Account name validation.

use regex::Regex;
use shared_types::{WalletError, WalletResult};

/// Allowed account names, checked after trimming.
pub const ACCOUNT_NAME_PATTERN: &str = r"^[A-Za-z0-9 _-]{1,16}$";

static ACCOUNT_NAME: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(ACCOUNT_NAME_PATTERN).expect("invalid account name pattern")
});

/// Trim `name` and check it against [`ACCOUNT_NAME_PATTERN`].
///
/// Returns the trimmed name.
pub fn validate_account_name(name: &str) -> WalletResult<String> {
    let trimmed = name.trim();
    if ACCOUNT_NAME.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(WalletError::InvalidName)
    }
}

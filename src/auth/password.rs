//! Password strength meter shown on the signup form.

use std::sync::LazyLock;

use regex::Regex;

/// Highest score [`password_strength`] can return.
pub const MAX_STRENGTH: u8 = 5;

static UPPERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static LOWERCASE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]").unwrap());
static DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d").unwrap());
static SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[@$!%*?&#^()_+\-=\[\]{};':"\\|,.<>/]"#).unwrap());

/// Score a password from 0 to 5: one point each for length of at least 8,
/// an upper case letter, a lower case letter, a digit, and a symbol.
pub fn password_strength(password: &str) -> u8 {
    let checks = [
        password.chars().count() >= 8,
        UPPERCASE.is_match(password),
        LOWERCASE.is_match(password),
        DIGIT.is_match(password),
        SYMBOL.is_match(password),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

/// Label for a strength score.
pub fn strength_label(score: u8) -> &'static str {
    match score {
        0 | 1 => "Very weak",
        2 => "Weak",
        3 => "Fair",
        4 => "Good",
        _ => "Strong",
    }
}

//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;

use regex::Regex;

/// Longest username accepted for an account
pub const MAX_USERNAME_LENGTH: usize = 150;

fn username_regex() -> &'static Regex {
    static USERNAME: OnceLock<Regex> = OnceLock::new();
    USERNAME.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"))
}

/// Normalize an email address by trimming it and lowercasing the domain part.
///
/// The local part is kept as given, since mail servers may treat it as
/// case-sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Domains accepted without a dot
const DOTLESS_EMAIL_DOMAINS: &[&str] = &["localhost"];

/// Validate email format: a non-empty local part, no whitespace, and a dotted
/// domain or one of the allowed dotless domains
pub fn is_valid_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            let dotted = domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.');
            !local.is_empty()
                && (dotted || DOTLESS_EMAIL_DOMAINS.contains(&domain))
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Usernames are letters, digits and `@ . + - _`, at most 150 characters
pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= MAX_USERNAME_LENGTH
        && username_regex().is_match(username)
}

/// Row offset of a 1-based page; `None` when it does not fit a SQL OFFSET
pub fn calculate_offset(page: usize, page_size: usize) -> Option<i64> {
    page.saturating_sub(1)
        .checked_mul(page_size)
        .and_then(|offset| i64::try_from(offset).ok())
}

/// Number of pages needed to show `total_items`
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Silva@Escola.EDU.br "), "Ana.Silva@escola.edu.br");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ana@escola.edu.br"));
        assert!(is_valid_email("ana@localhost"));
        assert!(!is_valid_email("ana@intranet"));
        assert!(!is_valid_email("ana@escola."));
        assert!(!is_valid_email("@escola.br"));
        assert!(!is_valid_email("ana silva@escola.br"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_is_valid_username() {
        assert!(is_valid_username("ana.silva+1@x"));
        assert!(is_valid_username("joão_2024"));
        assert!(!is_valid_username("ana silva"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username(&"a".repeat(151)));
    }

    #[test]
    fn test_pagination() {
        assert_eq!(calculate_offset(1, 25), Some(0));
        assert_eq!(calculate_offset(3, 25), Some(50));
        assert_eq!(calculate_offset(0, 25), Some(0));
        assert_eq!(calculate_offset(usize::MAX, 25), None);
        assert_eq!(calculate_offset(1 << 62, 2), None);
        assert_eq!(total_pages(0, 25), 0);
        assert_eq!(total_pages(26, 25), 2);
        assert_eq!(total_pages(10, 0), 0);
    }
}

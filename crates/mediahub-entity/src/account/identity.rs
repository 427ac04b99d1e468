//! Canonical forms of the two unique account keys.

/// Canonical username: trimmed and lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Canonical email: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_case_folded() {
        assert_eq!(normalize_username("  ChaiAurCode "), "chaiaurcode");
    }

    #[test]
    fn test_email_is_case_folded() {
        assert_eq!(normalize_email("Dev@Example.COM"), "dev@example.com");
    }
}

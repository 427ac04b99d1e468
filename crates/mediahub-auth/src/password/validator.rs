//! Password policy enforcement for new passwords.

use mediahub_core::config::AuthConfig;
use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;

/// Validates new passwords against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Whether to require a zxcvbn score of at least three.
    require_strong: bool,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            require_strong: config.password_require_strong,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// Returns the first violation found.
    pub fn validate(&self, password: &str) -> AppResult<()> {
        if password.trim().is_empty() {
            return Err(AppError::validation("Password is required"));
        }

        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.require_strong {
            let estimate = zxcvbn::zxcvbn(password, &[]);
            if estimate.score() < zxcvbn::Score::Three {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> AppResult<()> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(require_strong: bool) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_require_strong: require_strong,
            ..Default::default()
        })
    }

    #[test]
    fn test_rejects_blank_and_short() {
        let v = validator(false);
        assert!(v.validate("").is_err());
        assert!(v.validate("        ").is_err());
        assert!(v.validate("short").is_err());
        assert!(v.validate("long enough").is_ok());
    }

    #[test]
    fn test_strength_check_is_opt_in() {
        assert!(validator(false).validate("password").is_ok());
        assert!(validator(true).validate("password").is_err());
        assert!(validator(true).validate("violet-harbor-kettle-91").is_ok());
    }

    #[test]
    fn test_not_same() {
        let v = validator(false);
        assert!(v.validate_not_same("old secret", "old secret").is_err());
        assert!(v.validate_not_same("old secret", "new secret").is_ok());
    }
}

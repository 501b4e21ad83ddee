//! User accounts and credential validation.
//!
//! Passwords are stored and compared as given; hardening the credential
//! scheme is explicitly out of scope for this service.

use serde::{Deserialize, Serialize};

/// A user account with a unique username.
///
/// Accounts are created once and never mutated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns true if both the username and password match exactly.
    pub fn matches_credentials(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Checks that a username is legal: non-empty, no spaces, ASCII only.
pub fn validate_username(username: &str) -> bool {
    validate_credential_field(username)
}

/// Checks that a password is legal: non-empty, no spaces, ASCII only.
pub fn validate_password(password: &str) -> bool {
    validate_credential_field(password)
}

/// Exact equality check used by the "confirm password" flow.
pub fn passwords_match(password: &str, re_entered: &str) -> bool {
    password == re_entered
}

fn validate_credential_field(value: &str) -> bool {
    !value.is_empty() && !value.contains(' ') && value.chars().all(|c| (c as u32) <= 127)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_credentials() {
        let account = Account::new("alice", "hunter2");
        assert!(account.matches_credentials("alice", "hunter2"));
        assert!(!account.matches_credentials("alice", "hunter3"));
        assert!(!account.matches_credentials("Alice", "hunter2"));
    }

    #[test]
    fn test_validate_username_rejects_empty() {
        assert!(!validate_username(""));
    }

    #[test]
    fn test_validate_username_rejects_spaces() {
        assert!(!validate_username("my user"));
        assert!(!validate_username(" leading"));
    }

    #[test]
    fn test_validate_username_rejects_non_ascii() {
        assert!(!validate_username("usér"));
        assert!(!validate_username("名前"));
    }

    #[test]
    fn test_validate_username_accepts_plain_ascii() {
        assert!(validate_username("alice_99"));
        assert!(validate_username("a"));
    }

    #[test]
    fn test_validate_password_same_rules() {
        assert!(validate_password("s3cret!"));
        assert!(!validate_password(""));
        assert!(!validate_password("pass word"));
        assert!(!validate_password("pässword"));
    }

    #[test]
    fn test_passwords_match_is_exact() {
        assert!(passwords_match("abc", "abc"));
        assert!(!passwords_match("abc", "ABC"));
        assert!(!passwords_match("abc", "abc "));
    }

    #[test]
    fn test_account_json_round_trip() {
        let account = Account::new("alice", "hunter2");
        let json = serde_json::to_string(&account).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(account, back);
    }
}

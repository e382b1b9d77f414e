//! Accounts module - credentials, saved sessions, admin flags
//!
//! Login is create-or-verify: an unknown username registers a profile on
//! the spot, a known one must match the stored digest. The digest is the
//! classic 32-bit rolling string hash rendered as hex, which is all the
//! protection a local single-user store needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::player::profile::{Profile, ProfileBook};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 4;

/// Saved sessions expire after a day
pub const SESSION_TTL_MS: u64 = 24 * 60 * 60 * 1000;

const ADMIN_USERNAMES: [&str; 3] = ["admin", "moderator", "chaincrush_admin"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("username and password are both required")]
    MissingCredentials,
    #[error("username must be at least {0} characters")]
    UsernameTooShort(usize),
    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),
    #[error("wrong password for this username")]
    WrongPassword,
}

/// 32-bit rolling hash (h*31 + byte with wrapping arithmetic), rendered
/// as lowercase hex of the absolute value.
pub fn digest(input: &str) -> String {
    let mut hash: i32 = 0;
    for byte in input.bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(byte as i32);
    }
    format!("{:x}", hash.unsigned_abs())
}

/// Stable ledger identity for a local profile
pub fn player_id(username: &str) -> String {
    format!("cc-{}", digest(username.trim()))
}

/// Admin check: trimmed, ASCII case-insensitive
pub fn is_admin(username: &str) -> bool {
    let username = username.trim();
    ADMIN_USERNAMES
        .iter()
        .any(|admin| username.eq_ignore_ascii_case(admin))
}

/// Validate credentials and return the matching profile, registering a
/// new one for an unknown username.
pub fn login(
    book: &mut ProfileBook,
    username: &str,
    password: &str,
    now_ms: u64,
) -> Result<Profile, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    if username.chars().count() < USERNAME_MIN_CHARS {
        return Err(AuthError::UsernameTooShort(USERNAME_MIN_CHARS));
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::PasswordTooShort(PASSWORD_MIN_CHARS));
    }

    let password_digest = digest(password);
    match book.find(username) {
        Some(profile) => {
            if profile.password_digest != password_digest {
                return Err(AuthError::WrongPassword);
            }
            Ok(profile.clone())
        }
        None => {
            let profile = Profile::new(username, &password_digest, now_ms);
            book.insert(profile.clone());
            Ok(profile)
        }
    }
}

/// On-disk session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub username: String,
    #[serde(rename = "created_at_ms")]
    pub created_at_ms: u64,
}

impl SavedSession {
    pub fn new(username: &str, now_ms: u64) -> Self {
        Self {
            username: username.trim().to_string(),
            created_at_ms: now_ms,
        }
    }

    /// Valid while younger than the session TTL
    pub fn is_valid(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) < SESSION_TTL_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_hex() {
        let a = digest("hunter22");
        let b = digest("hunter22");
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(digest("hunter22"), digest("hunter23"));
    }

    #[test]
    fn test_digest_of_empty_input_is_zero() {
        assert_eq!(digest(""), "0");
    }

    #[test]
    fn test_player_id_trims_and_prefixes() {
        assert_eq!(player_id("  ada  "), player_id("ada"));
        assert!(player_id("ada").starts_with("cc-"));
    }

    #[test]
    fn test_is_admin_matches_known_names() {
        assert!(is_admin("admin"));
        assert!(is_admin("  Moderator "));
        assert!(is_admin("CHAINCRUSH_ADMIN"));
        assert!(!is_admin("administrator"));
        assert!(!is_admin("ada"));
    }

    #[test]
    fn test_login_rejects_short_credentials() {
        let mut book = ProfileBook::default();

        assert_eq!(
            login(&mut book, "", "longpass", 0),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            login(&mut book, "ada", "", 0),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            login(&mut book, "ab", "longpass", 0),
            Err(AuthError::UsernameTooShort(USERNAME_MIN_CHARS))
        );
        assert_eq!(
            login(&mut book, "ada", "abc", 0),
            Err(AuthError::PasswordTooShort(PASSWORD_MIN_CHARS))
        );
        assert!(book.profiles.is_empty(), "failed logins must not register");
    }

    #[test]
    fn test_login_registers_then_verifies() {
        let mut book = ProfileBook::default();

        let created = login(&mut book, "ada", "lovelace", 1_000).unwrap();
        assert_eq!(created.username, "ada");
        assert_eq!(book.profiles.len(), 1);

        // Same password logs in; a different one is rejected.
        assert!(login(&mut book, "ada", "lovelace", 2_000).is_ok());
        assert_eq!(
            login(&mut book, "ada", "babbage1", 2_000),
            Err(AuthError::WrongPassword)
        );
        assert_eq!(book.profiles.len(), 1, "no duplicate profiles");
    }

    #[test]
    fn test_login_trims_the_username() {
        let mut book = ProfileBook::default();
        login(&mut book, "  ada ", "lovelace", 0).unwrap();
        assert!(login(&mut book, "ada", "lovelace", 0).is_ok());
        assert_eq!(book.profiles.len(), 1);
    }

    #[test]
    fn test_session_expires_after_a_day() {
        let session = SavedSession::new("ada", 1_000);
        assert!(session.is_valid(1_000));
        assert!(session.is_valid(1_000 + SESSION_TTL_MS - 1));
        assert!(!session.is_valid(1_000 + SESSION_TTL_MS));
    }

    #[test]
    fn test_session_from_the_future_is_valid() {
        // Clock skew: a session stamped later than "now" still counts.
        let session = SavedSession::new("ada", 5_000);
        assert!(session.is_valid(1_000));
    }
}

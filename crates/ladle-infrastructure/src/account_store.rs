//! The persistent account store.

use std::path::PathBuf;
use std::sync::Mutex;

use ladle_core::Result;
use ladle_core::account::{self, Account};

use crate::persistent_list::PersistentList;

/// Accounts mirrored to a JSON database file.
///
/// The internal mutex makes each operation atomic with respect to the
/// in-memory list and the file rewrite; concurrent request handlers share
/// one store.
pub struct AccountStore {
    inner: Mutex<PersistentList<Account>>,
}

impl AccountStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Mutex::new(PersistentList::open(path)),
        }
    }

    /// Adds an account unless the username is already taken
    /// (case-sensitive). Returns true if the account was created.
    pub fn add(&self, username: &str, password: &str) -> Result<bool> {
        let mut list = self.inner.lock().expect("account store lock poisoned");
        if list.items().iter().any(|a| a.username == username) {
            return Ok(false);
        }
        list.add(Account::new(username, password))?;
        Ok(true)
    }

    /// True iff an account exists whose username and password both match
    /// exactly.
    pub fn login(&self, username: &str, password: &str) -> bool {
        self.inner
            .lock()
            .expect("account store lock poisoned")
            .items()
            .iter()
            .any(|a| a.matches_credentials(username, password))
    }

    /// The full record for matching credentials, used by clients that
    /// persist a "remember me" login.
    pub fn account_record(&self, username: &str, password: &str) -> Option<Account> {
        self.inner
            .lock()
            .expect("account store lock poisoned")
            .items()
            .iter()
            .find(|a| a.matches_credentials(username, password))
            .cloned()
    }

    // Validation is deliberately not enforced inside `add`; the wire
    // handlers run these checks as a separate workflow step.
    pub fn validate_username(&self, username: &str) -> bool {
        account::validate_username(username)
    }

    pub fn validate_password(&self, password: &str) -> bool {
        account::validate_password(password)
    }

    pub fn passwords_match(&self, password: &str, re_entered: &str) -> bool {
        account::passwords_match(password, re_entered)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("account store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Passwords supplied by the caller while a session is running.

use core::fmt::{self, Debug, Formatter};

/// A password that never shows up in logs.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Password {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str("Password(<redacted>)")
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single-slot promise for the session password.
///
/// The session [`request`](Self::request)s a password and suspends; the
/// caller [`resolve`](Self::resolve)s it whenever it likes. Resolving while
/// nobody waits only stores the value.
#[derive(Debug, Default)]
pub struct CredentialSlot {
    password: Option<Password>,
    awaiting: bool,
}

impl CredentialSlot {
    /// A password is cached and non-empty.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.password.as_ref().is_some_and(|password| !password.is_empty())
    }

    #[must_use]
    pub const fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    /// Start waiting for the caller to provide a password.
    pub const fn request(&mut self) {
        self.awaiting = true;
    }

    /// Stop waiting without a password, e.g. after a cancel.
    pub const fn abandon(&mut self) {
        self.awaiting = false;
    }

    /// Store `password`, returning `true` if a waiter should now continue.
    ///
    /// The slot is closed after the first waiting resolution; later calls
    /// replace the cached value and return `false`.
    pub fn resolve(&mut self, password: Password) -> bool {
        self.password = Some(password);
        std::mem::take(&mut self.awaiting)
    }

    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_ref().map_or("", Password::expose)
    }
}

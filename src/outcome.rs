//! Terminal results of a submission session.
//!
//! Whatever the transport reports, and however many times it reports it, a
//! session ends with exactly one [`Outcome`]. The [`OutcomeLatch`] is the
//! single place where that rule is enforced: the first terminal write wins
//! and every later one is dropped.

use core::fmt::{self, Display, Formatter};

/// Reported when the caller cancels the session.
pub const CANCELLED: &str = "Sending of the message was cancelled";

/// Reported when the transport fails without giving a reason.
pub const SEND_FAILED: &str = "Sending of the message failed.";

/// Reported when the session has no usable transfer mode.
pub const UNKNOWN_MODE: &str = "Unknown SMTP mode";

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Socket level errors, including failing to connect.
    Transport,
    /// TLS negotiation or certificate validation failed.
    Encryption,
    /// The server rejected the submission.
    Rejected,
    /// The session was driven incorrectly; this is a bug, not a runtime
    /// condition.
    Internal,
}

impl Display for FailureKind {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Transport => "transport",
            Self::Encryption => "encryption",
            Self::Rejected => "rejected",
            Self::Internal => "internal",
        })
    }
}

/// A failed submission and the message to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The server rejected the message; `detail` is the transport's error
    /// text, which may be empty.
    #[must_use]
    pub fn rejected(detail: &str) -> Self {
        if detail.is_empty() {
            Self::new(FailureKind::Rejected, SEND_FAILED)
        } else {
            Self::new(
                FailureKind::Rejected,
                format!("Sending of the message failed with the following error: {detail}"),
            )
        }
    }
}

impl Display for Failure {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(&self.message)
    }
}

/// The terminal result of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Failed(Failure),
    Cancelled,
}

impl Outcome {
    /// The human readable text for this outcome, if it is not a success.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Sent => None,
            Self::Failed(failure) => Some(&failure.message),
            Self::Cancelled => Some(CANCELLED),
        }
    }

    #[must_use]
    pub const fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

impl Display for Outcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => fmt.write_str("sent"),
            Self::Failed(failure) => write!(fmt, "failed ({}): {failure}", failure.kind),
            Self::Cancelled => fmt.write_str(CANCELLED),
        }
    }
}

/// Holds the first terminal outcome of a session and refuses all others.
#[derive(Debug, Default)]
pub struct OutcomeLatch {
    outcome: Option<Outcome>,
}

impl OutcomeLatch {
    /// Record `outcome` if nothing has been recorded yet.
    ///
    /// Returns the stored outcome when this call set the latch, so the caller
    /// knows it is responsible for reporting it, and `None` when the latch
    /// was already closed.
    pub fn set(&mut self, outcome: Outcome) -> Option<&Outcome> {
        if self.outcome.is_some() {
            return None;
        }

        self.outcome = Some(outcome);
        self.outcome.as_ref()
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub const fn get(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latch_first_write_wins() {
        let mut latch = OutcomeLatch::default();
        assert!(!latch.is_set());

        assert_eq!(latch.set(Outcome::Cancelled), Some(&Outcome::Cancelled));
        assert_eq!(latch.set(Outcome::Sent), None);
        assert_eq!(
            latch.set(Outcome::Failed(Failure::rejected(""))),
            None
        );

        assert!(latch.is_set());
        assert_eq!(latch.get(), Some(&Outcome::Cancelled));
    }

    #[test]
    fn test_rejected_messages() {
        assert_eq!(Failure::rejected("").message, "Sending of the message failed.");
        assert_eq!(
            Failure::rejected("550 No such user").message,
            "Sending of the message failed with the following error: 550 No such user"
        );
        assert_eq!(Failure::rejected("x").kind, FailureKind::Rejected);
    }

    #[test]
    fn test_outcome_message() {
        assert_eq!(Outcome::Sent.message(), None);
        assert_eq!(
            Outcome::Cancelled.message(),
            Some("Sending of the message was cancelled")
        );
        assert_eq!(
            Outcome::Failed(Failure::new(FailureKind::Transport, "connection refused")).message(),
            Some("connection refused")
        );
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Sent.to_string(), "sent");
        assert_eq!(
            Outcome::Failed(Failure::new(FailureKind::Internal, UNKNOWN_MODE)).to_string(),
            "failed (internal): Unknown SMTP mode"
        );
    }
}

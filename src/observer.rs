//! Events a session reports to whoever started it.

use core::fmt::{self, Display, Formatter};

use tokio::sync::mpsc;

/// Direction of raw protocol traffic passed through for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogDirection {
    Read,
    Written,
}

impl Display for LogDirection {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Read => "read",
            Self::Written => "written",
        })
    }
}

/// Receiver of a session's outward events.
///
/// Every method has an empty default so observers only implement what they
/// display. `sent`, `failed` and `cancelled` are terminal and at most one of
/// them is ever called per session.
pub trait SessionObserver {
    fn connecting(&mut self) {}

    fn sending(&mut self) {}

    fn progress_max(&mut self, _total: usize) {}

    fn progress(&mut self, _current: usize) {}

    /// The session is suspended until a password is supplied.
    fn credential_requested(&mut self, _username: &str, _host: &str) {}

    fn sent(&mut self) {}

    fn failed(&mut self, _message: &str) {}

    /// Cancellation is reported as a failure with a fixed reason unless the
    /// observer distinguishes it.
    fn cancelled(&mut self, reason: &str) {
        self.failed(reason);
    }

    fn logged(&mut self, _direction: LogDirection, _source: &str, _text: &str) {}
}

/// An owned copy of an observer callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connecting,
    Sending,
    ProgressMax(usize),
    Progress(usize),
    CredentialRequested { username: String, host: String },
    Sent,
    Failed(String),
    Cancelled(String),
    Logged {
        direction: LogDirection,
        source: String,
        text: String,
    },
}

impl SessionEvent {
    /// `Sent`, `Failed` or `Cancelled`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed(_) | Self::Cancelled(_))
    }
}

/// Anything that can take ownership of an event can observe a session.
trait Sink {
    fn push_event(&mut self, event: SessionEvent);
}

impl Sink for Vec<SessionEvent> {
    fn push_event(&mut self, event: SessionEvent) {
        self.push(event);
    }
}

impl Sink for mpsc::UnboundedSender<SessionEvent> {
    fn push_event(&mut self, event: SessionEvent) {
        // The receiver may already be gone.
        let _ = self.send(event);
    }
}

macro_rules! sink_observer {
    ($($sink:ty),*) => {$(
        impl SessionObserver for $sink {
            fn connecting(&mut self) {
                self.push_event(SessionEvent::Connecting);
            }

            fn sending(&mut self) {
                self.push_event(SessionEvent::Sending);
            }

            fn progress_max(&mut self, total: usize) {
                self.push_event(SessionEvent::ProgressMax(total));
            }

            fn progress(&mut self, current: usize) {
                self.push_event(SessionEvent::Progress(current));
            }

            fn credential_requested(&mut self, username: &str, host: &str) {
                self.push_event(SessionEvent::CredentialRequested {
                    username: username.to_string(),
                    host: host.to_string(),
                });
            }

            fn sent(&mut self) {
                self.push_event(SessionEvent::Sent);
            }

            fn failed(&mut self, message: &str) {
                self.push_event(SessionEvent::Failed(message.to_string()));
            }

            fn cancelled(&mut self, reason: &str) {
                self.push_event(SessionEvent::Cancelled(reason.to_string()));
            }

            fn logged(&mut self, direction: LogDirection, source: &str, text: &str) {
                self.push_event(SessionEvent::Logged {
                    direction,
                    source: source.to_string(),
                    text: text.to_string(),
                });
            }
        }
    )*};
}

sink_observer!(Vec<SessionEvent>, mpsc::UnboundedSender<SessionEvent>);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FailuresOnly(Vec<String>);

    impl SessionObserver for FailuresOnly {
        fn failed(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
    }

    #[test]
    fn test_cancelled_defaults_to_failed() {
        let mut observer = FailuresOnly::default();
        observer.connecting();
        observer.cancelled("stop");
        assert_eq!(observer.0, ["stop"]);
    }

    #[test]
    fn test_vec_records_events() {
        let mut events: Vec<SessionEvent> = Vec::new();
        events.progress_max(3);
        events.logged(LogDirection::Read, "SMTP", "220 ok");
        events.sent();

        assert_eq!(
            events,
            vec![
                SessionEvent::ProgressMax(3),
                SessionEvent::Logged {
                    direction: LogDirection::Read,
                    source: "SMTP".to_string(),
                    text: "220 ok".to_string(),
                },
                SessionEvent::Sent,
            ]
        );
        assert!(events[2].is_terminal());
        assert!(!events[0].is_terminal());
    }

    #[test]
    fn test_channel_ignores_closed_receiver() {
        let (mut sender, receiver) = mpsc::unbounded_channel::<SessionEvent>();
        drop(receiver);
        sender.failed("nobody hears this");
    }
}

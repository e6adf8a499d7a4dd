use std::sync::Arc;

use crate::{
    config::SessionConfig,
    observer::SessionObserver,
    session::{MailSubmission, SmtpSession},
    transport::Transport,
};

/// Produces a fresh session for every outbound message.
pub trait SubmissionFactory<T, O> {
    type Session: MailSubmission;

    fn create(&self, transport: T, observer: O) -> Self::Session;
}

/// Holds the endpoint configuration shared by all sessions it creates.
#[derive(Debug, Clone)]
pub struct SmtpFactory {
    config: Arc<SessionConfig>,
}

impl SmtpFactory {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

impl<T: Transport, O: SessionObserver> SubmissionFactory<T, O> for SmtpFactory {
    type Session = SmtpSession<T, O>;

    fn create(&self, transport: T, observer: O) -> Self::Session {
        SmtpSession::new(Arc::clone(&self.config), transport, observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{observer::SessionEvent, session::SessionState, transport::test::TestTransport};

    #[test]
    fn test_sessions_are_independent() {
        let factory = SmtpFactory::new(SessionConfig::new("smtp.example.com", 587));

        let mut first = factory.create(TestTransport::new(), Vec::<SessionEvent>::new());
        let second = factory.create(TestTransport::new(), Vec::<SessionEvent>::new());

        first
            .send_data(b"a@x".to_vec(), vec![b"b@y".to_vec()], b"hi".to_vec())
            .unwrap();

        assert_eq!(first.state(), SessionState::Sending);
        assert_eq!(second.state(), SessionState::Idle);
        assert!(second.transport().operations().is_empty());
        assert_eq!(first.config(), factory.config());
    }
}

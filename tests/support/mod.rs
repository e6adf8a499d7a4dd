//! Shared helpers for the session integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use empath_msa::{
    SessionConfig, SessionEvent, SmtpSession,
    transport::test::{Operation, TestTransport},
};

pub type RecordingSession = SmtpSession<TestTransport, Vec<SessionEvent>>;

pub const HOST: &str = "smtp.example.com";

pub fn plain() -> SessionConfig {
    SessionConfig::new(HOST, 587)
}

pub fn authenticated() -> SessionConfig {
    plain().with_authentication("alice")
}

pub fn session(config: SessionConfig) -> RecordingSession {
    SmtpSession::new(Arc::new(config), TestTransport::new(), Vec::new())
}

pub fn from() -> Vec<u8> {
    b"alice@example.com".to_vec()
}

pub fn recipients() -> Vec<Vec<u8>> {
    vec![
        b"bob@example.com".to_vec(),
        b"carol@example.com".to_vec(),
        b"bob@example.com".to_vec(),
    ]
}

/// Only the events that end a session.
pub fn terminal(session: &RecordingSession) -> Vec<SessionEvent> {
    session
        .observer()
        .iter()
        .filter(|event| event.is_terminal())
        .cloned()
        .collect()
}

/// Events other than raw protocol logging and progress.
pub fn milestones(session: &RecordingSession) -> Vec<SessionEvent> {
    session
        .observer()
        .iter()
        .filter(|event| {
            !matches!(
                event,
                SessionEvent::Logged { .. } | SessionEvent::Progress(_) | SessionEvent::ProgressMax(_)
            )
        })
        .cloned()
        .collect()
}

pub fn connects(session: &RecordingSession) -> usize {
    session
        .transport()
        .operations()
        .iter()
        .filter(|operation| matches!(operation, Operation::Connect { .. }))
        .count()
}

//! Drive a session from a single tokio task.
//!
//! Caller operations and transport callbacks may come from anywhere, but a
//! session must only ever see one of them at a time. [`channel`] creates the
//! queue they all go through; the [`Reactor`] owns the session and applies
//! each input in order.
//!
//! ```no_run
//! # async fn example() -> Result<(), empath_msa::SessionError> {
//! use empath_msa::{SessionConfig, SmtpFactory, SubmissionFactory, reactor, transport::test::TestTransport};
//!
//! let (reactor, handle, events) = reactor::channel();
//! let (observer, mut updates) = tokio::sync::mpsc::unbounded_channel::<empath_msa::SessionEvent>();
//!
//! // A real transport would keep `events` and report through it.
//! let session = SmtpFactory::new(SessionConfig::new("smtp.example.com", 587))
//!     .create(TestTransport::new(), observer);
//! let task = reactor.spawn(session);
//!
//! handle
//!     .send_data(b"alice@example.com".to_vec(), vec![b"bob@example.com".to_vec()], b"Hi".to_vec())
//!     .await?;
//! events.send(empath_msa::TransportEvent::Completed(true))?;
//!
//! while let Some(update) = updates.recv().await {
//!     println!("{update:?}");
//! }
//! # let _ = task;
//! # Ok(())
//! # }
//! ```

use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    credential::Password,
    error::SessionError,
    internal,
    observer::SessionObserver,
    outcome::Outcome,
    session::{MailSubmission, SmtpSession},
    transport::{Transport, TransportEvent},
};

type Reply = oneshot::Sender<Result<(), SessionError>>;

#[derive(Debug)]
enum Input {
    SendData {
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        data: Vec<u8>,
        reply: Reply,
    },
    SendRelay {
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        url: Vec<u8>,
        reply: Reply,
    },
    Credential(Password),
    Cancel,
    Transport(TransportEvent),
}

/// Create the input queue for one session.
#[must_use]
pub fn channel() -> (Reactor, SessionHandle, TransportEventSender) {
    let (sender, receiver) = mpsc::unbounded_channel();

    (
        Reactor { receiver },
        SessionHandle {
            sender: sender.clone(),
        },
        TransportEventSender { sender },
    )
}

/// Caller side of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<Input>,
}

impl SessionHandle {
    /// See [`MailSubmission::send_data`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session was already used, or is no longer
    /// running.
    pub async fn send_data(
        &self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        data: Vec<u8>,
    ) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.push(Input::SendData {
            from,
            recipients,
            data,
            reply,
        })?;

        response.await.map_err(|_| SessionError::Closed)?
    }

    /// See [`MailSubmission::send_relay`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session was already used, or is no longer
    /// running.
    pub async fn send_relay(
        &self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        url: Vec<u8>,
    ) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();
        self.push(Input::SendRelay {
            from,
            recipients,
            url,
            reply,
        })?;

        response.await.map_err(|_| SessionError::Closed)?
    }

    /// See [`MailSubmission::supply_credential`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session is no longer running.
    pub fn supply_credential(&self, password: impl Into<Password>) -> Result<(), SessionError> {
        self.push(Input::Credential(password.into()))
    }

    /// See [`MailSubmission::cancel`].
    ///
    /// # Errors
    ///
    /// Returns an error if the session is no longer running.
    pub fn cancel(&self) -> Result<(), SessionError> {
        self.push(Input::Cancel)
    }

    fn push(&self, input: Input) -> Result<(), SessionError> {
        self.sender.send(input).map_err(|_| SessionError::Closed)
    }
}

/// Transport side of a running session.
#[derive(Debug, Clone)]
pub struct TransportEventSender {
    sender: mpsc::UnboundedSender<Input>,
}

impl TransportEventSender {
    /// Queue `event` for the session.
    ///
    /// # Errors
    ///
    /// Returns an error once the session has finished; the event is dropped.
    pub fn send(&self, event: TransportEvent) -> Result<(), SessionError> {
        self.sender
            .send(Input::Transport(event))
            .map_err(|_| SessionError::Closed)
    }
}

/// Owns the receiving end of the queue until it is given a session.
#[derive(Debug)]
pub struct Reactor {
    receiver: mpsc::UnboundedReceiver<Input>,
}

impl Reactor {
    /// Apply queued inputs to `session` one at a time.
    ///
    /// Returns once the session has an outcome, or when every handle and
    /// event sender has been dropped, whichever happens first.
    pub async fn run<T: Transport, O: SessionObserver>(
        mut self,
        mut session: SmtpSession<T, O>,
    ) -> Option<Outcome> {
        internal!("Reactor running");

        while let Some(input) = self.receiver.recv().await {
            match input {
                Input::SendData {
                    from,
                    recipients,
                    data,
                    reply,
                } => {
                    let _ = reply.send(session.send_data(from, recipients, data));
                }
                Input::SendRelay {
                    from,
                    recipients,
                    url,
                    reply,
                } => {
                    let _ = reply.send(session.send_relay(from, recipients, url));
                }
                Input::Credential(password) => session.supply_credential(password),
                Input::Cancel => session.cancel(),
                Input::Transport(event) => event.dispatch(&mut session),
            }

            if session.is_terminated() {
                break;
            }
        }

        internal!("Reactor finished in state {}", session.state());

        session.outcome().cloned()
    }

    /// Run `session` on its own task.
    pub fn spawn<T, O>(self, session: SmtpSession<T, O>) -> JoinHandle<Option<Outcome>>
    where
        T: Transport + Send + 'static,
        O: SessionObserver + Send + 'static,
    {
        tokio::spawn(self.run(session))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{config::SessionConfig, observer::SessionEvent, transport::test::TestTransport};

    fn session() -> SmtpSession<TestTransport, Vec<SessionEvent>> {
        SmtpSession::new(
            Arc::new(SessionConfig::new("smtp.example.com", 25)),
            TestTransport::new(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_run_stops_when_senders_drop() {
        let (reactor, handle, events) = channel();
        drop(handle);
        drop(events);

        assert_eq!(reactor.run(session()).await, None);
    }

    #[tokio::test]
    async fn test_run_stops_at_outcome() {
        let (reactor, handle, events) = channel();

        handle.cancel().unwrap();
        events.send(TransportEvent::Completed(true)).unwrap();

        assert_eq!(reactor.run(session()).await, Some(Outcome::Cancelled));
    }

    #[tokio::test]
    async fn test_handle_reports_closed_session() {
        let (reactor, handle, events) = channel();
        drop(events);
        drop(reactor);

        assert_eq!(handle.cancel(), Err(SessionError::Closed));
        assert_eq!(
            handle.send_data(vec![], vec![], vec![]).await,
            Err(SessionError::Closed)
        );
    }
}

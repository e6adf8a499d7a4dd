//! The submission session controller.
//!
//! A [`SmtpSession`] is single use: it accepts one send call, drives the
//! transport through connect, optional TLS and authentication, and the
//! transfer itself, and reports one [`Outcome`]. If a password is needed and
//! not yet known the session suspends in
//! [`SessionState::AwaitingCredential`] until
//! [`MailSubmission::supply_credential`] is called.
//!
//! ```text
//! Idle --send--> AwaitingCredential --password--> Connecting --> Sending --> Terminated
//! Idle --send (no password needed)--> Connecting --> Sending --> Terminated
//! any --cancel--> Terminated
//! ```

use core::fmt::{self, Display, Formatter};
use std::{io, sync::Arc};

use tokio_rustls::rustls;

use crate::{
    config::SessionConfig,
    credential::{CredentialSlot, Password},
    error::SessionError,
    incoming, internal,
    observer::{LogDirection, SessionObserver},
    outcome::{CANCELLED, Failure, FailureKind, Outcome, OutcomeLatch, UNKNOWN_MODE},
    outgoing,
    payload::{Payload, SubmissionRequest, dot_stuff},
    tls,
    transport::{AuthMechanism, Transport, TransportEvents},
};

/// Label used for raw protocol traffic passed to [`SessionObserver::logged`].
pub const LOG_SOURCE: &str = "SMTP";

/// Where a session is in its single pass from idle to terminated.
///
/// States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingCredential,
    Connecting,
    Sending,
    Terminated,
}

impl Display for SessionState {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Idle => "Idle",
            Self::AwaitingCredential => "AwaitingCredential",
            Self::Connecting => "Connecting",
            Self::Sending => "Sending",
            Self::Terminated => "Terminated",
        })
    }
}

/// One attempt to submit one message.
pub trait MailSubmission {
    /// Submit `data` with `DATA`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyStarted`] if this session was already
    /// used for a submission.
    fn send_data(
        &mut self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        data: Vec<u8>,
    ) -> Result<(), SessionError>;

    /// Ask the server to submit the message found at `url` with `BURL`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyStarted`] if this session was already
    /// used for a submission.
    fn send_relay(
        &mut self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        url: Vec<u8>,
    ) -> Result<(), SessionError>;

    /// Whether [`send_relay`](Self::send_relay) may be used.
    fn supports_relay(&self) -> bool;

    /// Provide the password. Continues a suspended session, otherwise the
    /// password is only remembered.
    fn supply_credential(&mut self, password: Password);

    /// Abort the session. Only the first call has an effect.
    fn cancel(&mut self);
}

/// SMTP submission session over a [`Transport`], reporting to a
/// [`SessionObserver`].
pub struct SmtpSession<T, O> {
    config: Arc<SessionConfig>,
    transport: T,
    observer: O,
    state: SessionState,
    request: Option<SubmissionRequest>,
    credential: CredentialSlot,
    outcome: OutcomeLatch,
}

impl<T: Transport, O: SessionObserver> SmtpSession<T, O> {
    pub fn new(config: Arc<SessionConfig>, transport: T, observer: O) -> Self {
        Self {
            config,
            transport,
            observer,
            state: SessionState::Idle,
            request: None,
            credential: CredentialSlot::default(),
            outcome: OutcomeLatch::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// The terminal outcome, once there is one.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        self.outcome.get()
    }

    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.outcome.is_set()
    }

    /// The submission this session was given. For `DATA` this holds the
    /// dot-stuffed body once it has been handed to the transport.
    #[must_use]
    pub const fn request(&self) -> Option<&SubmissionRequest> {
        self.request.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub const fn observer(&self) -> &O {
        &self.observer
    }

    pub const fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    fn start(&mut self, request: SubmissionRequest) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted { state: self.state });
        }

        internal!(
            level = DEBUG,
            "Submitting {:?} from {} to {} recipient(s) via {}:{}",
            request.payload,
            String::from_utf8_lossy(&request.from),
            request.recipients.len(),
            self.config.host,
            self.config.port
        );

        let total = request.payload.progress_max();
        self.request = Some(request);

        self.observer.progress_max(total);
        self.observer.progress(0);
        self.observer.connecting();

        if !self.config.authenticate || self.credential.is_available() {
            self.proceed();
        } else {
            internal!("Waiting for the password of {}", self.config.username);
            self.state = SessionState::AwaitingCredential;
            self.credential.request();
            self.observer
                .credential_requested(&self.config.username, &self.config.host);
        }

        Ok(())
    }

    /// Issue the whole conversation to the transport. Runs at most once.
    fn proceed(&mut self) {
        if !matches!(
            self.state,
            SessionState::Idle | SessionState::AwaitingCredential
        ) {
            return;
        }

        self.state = SessionState::Connecting;

        let config = Arc::clone(&self.config);
        self.transport
            .connect(&config.host, config.port, config.encrypted_connect);

        if config.starttls {
            self.transport.upgrade_to_tls();
        }

        if config.authenticate {
            self.transport.authenticate(
                &config.username,
                self.credential.password(),
                AuthMechanism::Any,
            );
        }

        self.observer.sending();
        self.state = SessionState::Sending;

        if let Some(request) = self.request.as_mut() {
            internal!("Dispatching {} transfer", request.payload.mode());

            match &mut request.payload {
                Payload::Data(data) => {
                    *data = dot_stuff(data);
                    self.transport
                        .submit_data(&request.from, &request.recipients, data);
                }
                Payload::RelayUrl(url) => {
                    self.transport
                        .submit_by_reference(&request.from, &request.recipients, url);
                }
            }
        } else {
            internal!(level = ERROR, "Session continued without a submission");
            self.finish(Outcome::Failed(Failure::new(
                FailureKind::Internal,
                UNKNOWN_MODE,
            )));
        }

        // The transport's completion event decides the outcome, not this.
        self.transport.disconnect();
    }

    /// Report `outcome` unless the session already has one.
    fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_set() {
            internal!(level = DEBUG, "Session already finished, dropping {outcome:?}");
            return;
        }

        let Some(outcome) = self.outcome.set(outcome) else {
            return;
        };

        self.state = SessionState::Terminated;
        self.credential.abandon();

        internal!(
            level = INFO,
            "Submission via {}:{} {outcome}",
            self.config.host,
            self.config.port
        );

        match outcome {
            Outcome::Sent => self.observer.sent(),
            Outcome::Failed(failure) => self.observer.failed(&failure.message),
            Outcome::Cancelled => self.observer.cancelled(CANCELLED),
        }
    }
}

impl<T: Transport, O: SessionObserver> MailSubmission for SmtpSession<T, O> {
    fn send_data(
        &mut self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        data: Vec<u8>,
    ) -> Result<(), SessionError> {
        self.start(SubmissionRequest::new(from, recipients, Payload::Data(data)))
    }

    fn send_relay(
        &mut self,
        from: Vec<u8>,
        recipients: Vec<Vec<u8>>,
        url: Vec<u8>,
    ) -> Result<(), SessionError> {
        self.start(SubmissionRequest::new(
            from,
            recipients,
            Payload::RelayUrl(url),
        ))
    }

    fn supports_relay(&self) -> bool {
        true
    }

    fn supply_credential(&mut self, password: Password) {
        if self.credential.resolve(password) {
            internal!("Password supplied, continuing");
            self.proceed();
        }
    }

    fn cancel(&mut self) {
        if self.is_terminated() {
            return;
        }

        internal!(level = DEBUG, "Cancelling submission in state {}", self.state);
        self.transport.disconnect();
        self.finish(Outcome::Cancelled);
    }
}

impl<T: Transport, O: SessionObserver> TransportEvents for SmtpSession<T, O> {
    fn on_connected(&mut self) {
        internal!(
            level = DEBUG,
            "Connected to {}:{}",
            self.config.host,
            self.config.port
        );

        if self.state == SessionState::Connecting {
            self.state = SessionState::Sending;
        }
    }

    fn on_completed(&mut self, success: bool) {
        if self.is_terminated() {
            internal!(
                level = DEBUG,
                "Ignoring duplicate completion (success: {success})"
            );
            return;
        }

        if success {
            self.finish(Outcome::Sent);
        } else {
            let detail = self.transport.error_string();
            self.finish(Outcome::Failed(Failure::rejected(&detail)));
        }
    }

    fn on_socket_error(&mut self, kind: io::ErrorKind, message: &str) {
        internal!(level = DEBUG, "Socket error ({kind:?}): {message}");

        let message = if message.is_empty() {
            io::Error::from(kind).to_string()
        } else {
            message.to_string()
        };

        self.finish(Outcome::Failed(Failure::new(FailureKind::Transport, message)));
    }

    fn on_encryption_errors(&mut self, errors: &[rustls::Error]) {
        for error in errors {
            internal!(level = WARN, "TLS error: {error}");
        }

        self.finish(Outcome::Failed(Failure::new(
            FailureKind::Encryption,
            tls::error_report(errors),
        )));
    }

    fn on_bytes_read(&mut self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        incoming!("{text}");
        self.observer.logged(LogDirection::Read, LOG_SOURCE, &text);
    }

    fn on_bytes_written(&mut self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        outgoing!("{text}");
        self.observer.logged(LogDirection::Written, LOG_SOURCE, &text);
    }
}

//! The boundary between a session and the engine that speaks SMTP.
//!
//! A [`Transport`] performs the actual conversation: connecting, TLS, `AUTH`,
//! and the `MAIL`/`RCPT`/`DATA` (or `BURL`) sequence. Every operation is fire
//! and forget. Results come back later through [`TransportEvents`], which the
//! session implements, always on the same execution context as the calls
//! that caused them.


use core::fmt::{self, Display, Formatter};
use std::io;

use tokio_rustls::rustls;

/// SASL mechanism selection for [`Transport::authenticate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AuthMechanism {
    /// Let the transport pick the best mechanism the server offers.
    #[default]
    Any,
    Plain,
    Login,
}

impl Display for AuthMechanism {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Any => "ANY",
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        })
    }
}

/// Operations a session issues against the SMTP engine.
///
/// Implementations queue the work and return immediately. Each session owns
/// its transport exclusively.
pub trait Transport {
    /// Open a connection, with TLS from the first byte if `encrypted`.
    fn connect(&mut self, host: &str, port: u16, encrypted: bool);

    /// Issue `STARTTLS`. Problems surface as
    /// [`TransportEvents::on_encryption_errors`].
    fn upgrade_to_tls(&mut self);

    /// Authenticate; a failure surfaces as an unsuccessful completion.
    fn authenticate(&mut self, username: &str, password: &str, mechanism: AuthMechanism);

    /// Submit `data`, which the caller has already dot-stuffed.
    fn submit_data(&mut self, from: &[u8], recipients: &[Vec<u8>], data: &[u8]);

    /// Submit a message the server can fetch from `url` (`BURL`).
    fn submit_by_reference(&mut self, from: &[u8], recipients: &[Vec<u8>], url: &[u8]);

    /// Close the connection once queued work is done.
    fn disconnect(&mut self);

    /// The last error the engine recorded, empty if none.
    fn error_string(&self) -> String;
}

/// Callbacks from the engine back into the session.
pub trait TransportEvents {
    fn on_connected(&mut self);

    /// The queued conversation finished.
    ///
    /// Engines have been seen to report this more than once with
    /// contradicting results; only the first terminal signal counts.
    fn on_completed(&mut self, success: bool);

    fn on_socket_error(&mut self, kind: io::ErrorKind, message: &str);

    fn on_encryption_errors(&mut self, errors: &[rustls::Error]);

    fn on_bytes_read(&mut self, data: &[u8]);

    fn on_bytes_written(&mut self, data: &[u8]);
}

/// An engine callback captured as a value, for delivery across tasks.
#[derive(Debug)]
pub enum TransportEvent {
    Connected,
    Completed(bool),
    SocketError(io::ErrorKind, String),
    EncryptionErrors(Vec<rustls::Error>),
    BytesRead(Vec<u8>),
    BytesWritten(Vec<u8>),
}

impl TransportEvent {
    /// Deliver this event to `target`.
    pub fn dispatch(self, target: &mut impl TransportEvents) {
        match self {
            Self::Connected => target.on_connected(),
            Self::Completed(success) => target.on_completed(success),
            Self::SocketError(kind, message) => target.on_socket_error(kind, &message),
            Self::EncryptionErrors(errors) => target.on_encryption_errors(&errors),
            Self::BytesRead(data) => target.on_bytes_read(&data),
            Self::BytesWritten(data) => target.on_bytes_written(&data),
        }
    }
}

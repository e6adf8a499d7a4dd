//! Mail submission for empath.
//!
//! This crate drives a single outbound message over SMTP submission, either
//! as a classic `DATA` transfer or by reference (`BURL`). The byte-level
//! conversation is delegated to a [`Transport`] implementation; the
//! [`SmtpSession`] decides when to start it, escapes the payload, and turns
//! whatever the transport reports into exactly one [`Outcome`].
//!
//! ```
//! use empath_msa::{
//!     MailSubmission, Outcome, SessionConfig, SmtpFactory, SubmissionFactory,
//!     observer::SessionEvent, transport::{TransportEvents, test::TestTransport},
//! };
//!
//! let factory = SmtpFactory::new(SessionConfig::new("mail.example.com", 587));
//! let mut session = factory.create(TestTransport::default(), Vec::<SessionEvent>::new());
//!
//! session
//!     .send_data(b"alice@example.com".to_vec(), vec![b"bob@example.com".to_vec()], b"Hi".to_vec())
//!     .unwrap();
//! session.on_completed(true);
//!
//! assert_eq!(session.outcome(), Some(&Outcome::Sent));
//! ```

pub mod config;
pub mod credential;
pub mod error;
pub mod factory;
pub mod logging;
pub mod observer;
pub mod outcome;
pub mod payload;
pub mod reactor;
pub mod session;
pub mod tls;
pub mod transport;

pub use config::SessionConfig;
pub use error::{ConfigError, SessionError};
pub use factory::{SmtpFactory, SubmissionFactory};
pub use observer::{LogDirection, SessionEvent, SessionObserver};
pub use outcome::{Failure, FailureKind, Outcome};
pub use session::{MailSubmission, SessionState, SmtpSession};
pub use tracing;
pub use transport::{AuthMechanism, Transport, TransportEvent, TransportEvents};

#[macro_export]
macro_rules! log {
    ($level:expr, $span:expr, $($msg:expr),*) => {{
        let span = $crate::tracing::span!($level, $span);
        let _enter = span.enter();

        $crate::tracing::event!($level, $($msg),*)
    }};
}

#[macro_export]
macro_rules! outgoing {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::log!($crate::tracing::Level::$level, "outgoing", $($msg),*)
    };

    ($($msg:expr),*) => {
        $crate::outgoing!(level = TRACE, $($msg),*)
    };
}

#[macro_export]
macro_rules! incoming {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::log!($crate::tracing::Level::$level, "incoming", $($msg),*)
    };

    ($($msg:expr),*) => {
        $crate::incoming!(level = TRACE, $($msg),*)
    };
}

#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:expr),*) => {
        $crate::log!($crate::tracing::Level::$level, "internal", $($msg),*)
    };

    ($($msg:expr),*) => {
        $crate::internal!(level = TRACE, $($msg),*)
    };
}

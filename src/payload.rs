//! The message a session submits, and the escaping it needs on the wire.

use core::fmt::{self, Display, Formatter};

/// How the message reaches the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferMode {
    /// The full message is transmitted after `DATA`.
    Data,
    /// The server fetches a message it already has, via `BURL`.
    RelayUrl,
}

impl Display for TransferMode {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        fmt.write_str(match self {
            Self::Data => "DATA",
            Self::RelayUrl => "BURL",
        })
    }
}

/// What gets handed to the transport.
#[derive(Clone, PartialEq, Eq)]
pub enum Payload {
    /// Raw message bytes, not yet dot-stuffed.
    Data(Vec<u8>),
    /// An opaque reference (e.g. an IMAP URL) the server resolves itself.
    RelayUrl(Vec<u8>),
}

impl Payload {
    #[must_use]
    pub const fn mode(&self) -> TransferMode {
        match self {
            Self::Data(_) => TransferMode::Data,
            Self::RelayUrl(_) => TransferMode::RelayUrl,
        }
    }

    /// Upper bound for progress reporting: bytes for `DATA`, one unit for a
    /// relay.
    #[must_use]
    pub fn progress_max(&self) -> usize {
        match self {
            Self::Data(data) => data.len(),
            Self::RelayUrl(_) => 1,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(fmt, "Data({} bytes)", data.len()),
            Self::RelayUrl(url) => write!(fmt, "RelayUrl({})", String::from_utf8_lossy(url)),
        }
    }
}

/// One outbound message: envelope plus payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub from: Vec<u8>,
    /// Recipients in the order given; duplicates are kept.
    pub recipients: Vec<Vec<u8>>,
    pub payload: Payload,
}

impl SubmissionRequest {
    #[must_use]
    pub const fn new(from: Vec<u8>, recipients: Vec<Vec<u8>>, payload: Payload) -> Self {
        Self {
            from,
            recipients,
            payload,
        }
    }
}

/// Escape lines starting with `.` by doubling the dot (RFC 5321, 4.5.2).
///
/// Applied once to a message body before transmission, so that no line of
/// the body can be mistaken for the end-of-data marker.
///
/// ```
/// use empath_msa::payload::dot_stuff;
///
/// assert_eq!(dot_stuff(b"Hello\n.\nWorld"), b"Hello\n..\nWorld");
/// assert_eq!(dot_stuff(b".Start"), b"..Start");
/// ```
#[must_use]
pub fn dot_stuff(data: &[u8]) -> Vec<u8> {
    let extra = data
        .iter()
        .enumerate()
        .filter(|&(i, &b)| b == b'.' && (i == 0 || data[i - 1] == b'\n'))
        .count();

    let mut stuffed = Vec::with_capacity(data.len() + extra);
    let mut line_start = true;

    for &byte in data {
        if line_start && byte == b'.' {
            stuffed.push(b'.');
        }
        stuffed.push(byte);
        line_start = byte == b'\n';
    }

    stuffed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_stuff_lone_dot_line() {
        assert_eq!(dot_stuff(b"Hello\n.\nWorld"), b"Hello\n..\nWorld");
    }

    #[test]
    fn test_dot_stuff_leading_dot() {
        assert_eq!(dot_stuff(b".Start"), b"..Start");
    }

    #[test]
    fn test_dot_stuff_untouched() {
        let body = b"Subject: Test\r\n\r\nNothing to see. Really.\r\n";
        assert_eq!(dot_stuff(body), body.to_vec());
        assert_eq!(dot_stuff(b""), b"".to_vec());
    }

    #[test]
    fn test_dot_stuff_crlf_and_repeated_dots() {
        assert_eq!(
            dot_stuff(b"a\r\n.\r\n..b\r\n.c"),
            b"a\r\n..\r\n...b\r\n..c".to_vec()
        );
    }

    #[test]
    fn test_dot_stuff_is_not_idempotent() {
        let once = dot_stuff(b".x");
        assert_eq!(dot_stuff(&once), b"...x".to_vec());
    }

    #[test]
    fn test_progress_max() {
        assert_eq!(Payload::Data(vec![0; 42]).progress_max(), 42);
        assert_eq!(Payload::RelayUrl(b"imap://x".to_vec()).progress_max(), 1);
    }

    #[test]
    fn test_payload_debug_hides_body() {
        assert_eq!(format!("{:?}", Payload::Data(b"secret".to_vec())), "Data(6 bytes)");
        assert_eq!(
            format!("{:?}", Payload::RelayUrl(b"imap://h/m".to_vec())),
            "RelayUrl(imap://h/m)"
        );
    }
}

//! Reporting of TLS failures.
//!
//! Trust decisions belong to the transport; the session only turns the list
//! of problems it was handed into something a user can read.

use core::fmt::Write as _;

use tokio_rustls::rustls;

/// Build the HTML report shown when encryption could not be established.
#[must_use]
pub fn error_report(errors: &[rustls::Error]) -> String {
    let mut report = String::from("<p>Cannot send message due to an SSL/TLS error</p>\n");

    if errors.is_empty() {
        return report;
    }

    report.push_str("<ul>");
    for error in errors {
        let _ = write!(report, "<li>{}</li>", escape(&error.to_string()));
    }
    report.push_str("</ul>\n");

    report
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

#[cfg(test)]
mod tests {
    use tokio_rustls::rustls::{CertificateError, Error};

    use super::*;

    #[test]
    fn test_report_lists_every_error() {
        let errors = [
            Error::InvalidCertificate(CertificateError::Expired),
            Error::General("<bad> & worse".to_string()),
        ];

        let report = error_report(&errors);

        assert!(report.starts_with("<p>Cannot send message due to an SSL/TLS error</p>\n<ul>"));
        assert_eq!(report.matches("<li>").count(), 2);
        assert!(report.contains("&lt;bad&gt; &amp; worse"));
        assert!(report.ends_with("</ul>\n"));
    }

    #[test]
    fn test_report_without_errors() {
        assert_eq!(
            error_report(&[]),
            "<p>Cannot send message due to an SSL/TLS error</p>\n"
        );
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"a<b>"c"&'d'"#), "a&lt;b&gt;&quot;c&quot;&amp;&#39;d&#39;");
    }
}

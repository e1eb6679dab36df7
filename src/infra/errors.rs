// src/infra/errors.rs — Error types for mirrors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MirrorsError {
    // Request errors (terminal for the current review)
    #[error("Invalid endpoint URL '{0}'")]
    InvalidUrl(String),

    #[error("Request failed: {message}")]
    RequestFailed { message: String, timeout: bool },

    #[error("Invalid response{}: {message}", status_suffix(.status))]
    InvalidResponse { status: Option<u16>, message: String },

    #[error("Could not decode review: {message}")]
    Decoding { message: String, raw: String },

    #[error("Could not convert image: {0}")]
    DataConversion(String),

    // Ledger
    #[error("No snaps remaining")]
    NoSnapsRemaining,

    #[error("Ledger storage error: {0}")]
    Ledger(String),

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl MirrorsError {
    pub(crate) fn decoding(message: impl Into<String>, raw: impl Into<String>) -> Self {
        MirrorsError::Decoding {
            message: message.into(),
            raw: raw.into(),
        }
    }

    /// Offending text kept for diagnostics when decoding failed.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            MirrorsError::Decoding { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Short message suitable for showing to the person who took the photo.
    pub fn user_message(&self) -> String {
        match self {
            MirrorsError::NoSnapsRemaining => "No snaps remaining.".into(),
            MirrorsError::DataConversion(_) => "Could not process the image.".into(),
            MirrorsError::RequestFailed { timeout: true, .. } => {
                "The review service took too long to answer. Try again.".into()
            }
            MirrorsError::RequestFailed { .. } => {
                "Could not reach the review service. Check your connection and try again.".into()
            }
            other => format!("Error getting review: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_response_display_with_status() {
        let e = MirrorsError::InvalidResponse {
            status: Some(500),
            message: "boom".into(),
        };
        assert_eq!(e.to_string(), "Invalid response (HTTP 500): boom");
    }

    #[test]
    fn test_invalid_response_display_without_status() {
        let e = MirrorsError::InvalidResponse {
            status: None,
            message: "no choices".into(),
        };
        assert_eq!(e.to_string(), "Invalid response: no choices");
    }

    #[test]
    fn test_raw_text_only_on_decoding() {
        let e = MirrorsError::decoding("bad", "{oops");
        assert_eq!(e.raw_text(), Some("{oops"));
        assert!(MirrorsError::NoSnapsRemaining.raw_text().is_none());
    }

    #[test]
    fn test_user_message_no_snaps() {
        assert_eq!(
            MirrorsError::NoSnapsRemaining.user_message(),
            "No snaps remaining."
        );
    }

    #[test]
    fn test_user_message_wraps_other_errors() {
        let e = MirrorsError::InvalidUrl("::".into());
        assert!(e.user_message().starts_with("Error getting review:"));
    }
}

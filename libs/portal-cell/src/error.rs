use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to message. Rebuilt from scratch on every validation pass.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Please correct the highlighted fields")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Please sign in again: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Local storage error: {0}")]
    Storage(String),
}

impl PortalError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 => PortalError::Rejected(message),
            401 => PortalError::Unauthorized(message),
            403 => PortalError::Forbidden(message),
            404 => PortalError::NotFound(message),
            _ => PortalError::Server { status, message },
        }
    }

    /// Whether the session has to be re-established.
    pub fn requires_login(&self) -> bool {
        matches!(self, PortalError::Unauthorized(_))
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_status_mapping() {
        assert_matches!(PortalError::from_status(400, "bad".into()), PortalError::Rejected(_));
        assert_matches!(PortalError::from_status(401, "expired".into()), PortalError::Unauthorized(_));
        assert_matches!(PortalError::from_status(403, "no".into()), PortalError::Forbidden(_));
        assert_matches!(PortalError::from_status(404, "gone".into()), PortalError::NotFound(_));
        assert_matches!(
            PortalError::from_status(500, "boom".into()),
            PortalError::Server { status: 500, .. }
        );
    }

    #[test]
    fn test_only_unauthorized_requires_login() {
        assert!(PortalError::Unauthorized("expired".into()).requires_login());
        assert!(!PortalError::Forbidden("admin only".into()).requires_login());
    }
}

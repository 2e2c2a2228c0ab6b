//! Operator session injected into the HTTP store
//!
//! Holds the bearer token explicitly instead of reading it from process-wide state.

use std::fmt;

use crate::config::SessionConfig;
use crate::infrastructure::{InfraError, InfraResult};

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Session {
    /// Session without credentials; requests go out without `Authorization`.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Blank tokens count as no token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into().trim().to_string();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    /// Inline token wins over `token_file`.
    pub fn from_config(config: &SessionConfig) -> InfraResult<Self> {
        if let Some(token) = &config.token {
            return Ok(Self::with_token(token.as_str()));
        }
        match &config.token_file {
            Some(path) => {
                let token = std::fs::read_to_string(path)
                    .map_err(|e| InfraError::io(format!("read token file {}", path.display()), e))?;
                Ok(Self::with_token(token))
            }
            None => Ok(Self::anonymous()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_blank_token_when_creating_session_then_anonymous() {
        assert!(!Session::with_token("  \n").is_authenticated());
        assert_eq!(Session::with_token(" abc\n").token(), Some("abc"));
    }

    #[test]
    fn given_token_file_when_loading_then_trimmed_contents_used() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "secret-token\n").unwrap();

        let session = Session::from_config(&SessionConfig {
            token: None,
            token_file: Some(path),
        })
        .unwrap();

        assert_eq!(session.token(), Some("secret-token"));
    }

    #[test]
    fn given_missing_token_file_when_loading_then_io_error() {
        let result = Session::from_config(&SessionConfig {
            token: None,
            token_file: Some(PathBuf::from("/nonexistent/catreorder/token")),
        });
        assert!(matches!(result, Err(InfraError::Io { .. })));
    }

    #[test]
    fn given_session_when_debug_printed_then_token_redacted() {
        let printed = format!("{:?}", Session::with_token("secret"));
        assert!(!printed.contains("secret"));
    }
}

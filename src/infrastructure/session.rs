use crate::domain::ports::SessionStore;
use crate::error::Result;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "RAILBOOK_TOKEN";

/// Token from the environment, else from a token file.
///
/// Both are consulted on every call, so logging in from another shell takes
/// effect without restarting anything.
#[derive(Debug, Clone)]
pub struct TokenFileSession {
    env_var: String,
    file: Option<PathBuf>,
}

impl TokenFileSession {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            env_var: TOKEN_ENV_VAR.to_string(),
            file,
        }
    }

    pub fn with_env_var(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = env_var.into();
        self
    }
}

impl SessionStore for TokenFileSession {
    fn token(&self) -> Result<Option<String>> {
        if let Ok(token) = std::env::var(&self.env_var) {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(Some(token.to_string()));
            }
        }

        let Some(path) = &self.file else {
            return Ok(None);
        };
        match std::fs::read_to_string(path) {
            Ok(raw) => {
                let token = raw.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_is_read_on_every_call() {
        let mut file = NamedTempFile::new().unwrap();
        let session = TokenFileSession::new(Some(file.path().to_path_buf()))
            .with_env_var("RAILBOOK_TEST_TOKEN_UNSET");

        assert_eq!(session.token().unwrap(), None);

        writeln!(file, "  tok_1  ").unwrap();
        file.flush().unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("tok_1"));
    }

    #[test]
    fn test_missing_file_means_logged_out() {
        let session = TokenFileSession::new(Some(PathBuf::from("/nonexistent/railbook-token")))
            .with_env_var("RAILBOOK_TEST_TOKEN_UNSET");
        assert_eq!(session.token().unwrap(), None);
    }
}

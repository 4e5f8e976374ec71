//! Bearer-token loading.
//!
//! The token is looked up once at startup, first in the environment and then
//! in a YAML secrets file. Not finding one is not an error: the session simply
//! runs without inference.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable and secrets-file key holding the token.
pub const TOKEN_VARIABLE: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Secrets file consulted when no path is given explicitly.
pub const DEFAULT_SECRETS_PATH: &str = ".hfchat/secrets.yaml";

/// An opaque bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Blank tokens are rejected.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// The raw token, for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Looks the token up in `HUGGINGFACEHUB_API_TOKEN`, then in the secrets
    /// file at `secrets_path` (or [`DEFAULT_SECRETS_PATH`]).
    pub fn from_environment(secrets_path: Option<&Path>) -> Result<Option<Self>> {
        let secrets_path = secrets_path.unwrap_or_else(|| Path::new(DEFAULT_SECRETS_PATH));
        Self::resolve(std::env::var(TOKEN_VARIABLE).ok(), secrets_path)
    }

    /// Picks the first usable token from an environment value and a secrets file.
    pub fn resolve(env_value: Option<String>, secrets_path: &Path) -> Result<Option<Self>> {
        if let Some(credential) = env_value.and_then(Credential::new) {
            tracing::debug!(source = TOKEN_VARIABLE, "loaded API token from environment");
            return Ok(Some(credential));
        }
        let credential = read_secrets_file(secrets_path)?;
        if credential.is_some() {
            tracing::debug!(path = %secrets_path.display(), "loaded API token from secrets file");
        }
        Ok(credential)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Deserialize)]
struct SecretsFile {
    #[serde(rename = "HUGGINGFACEHUB_API_TOKEN", default)]
    token: Option<String>,
}

fn read_secrets_file(path: &Path) -> Result<Option<Credential>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(Error::io(
                format!("failed to read secrets file {}", path.display()),
                err,
            ));
        }
    };
    if content.trim().is_empty() {
        return Ok(None);
    }
    let secrets: SecretsFile = serde_yaml::from_str(&content).map_err(|err| {
        Error::configuration(format!(
            "secrets file {} is not valid YAML: {err}",
            path.display()
        ))
    })?;
    Ok(secrets.token.and_then(Credential::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn secrets(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn blank_tokens_are_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
        assert_eq!(Credential::new(" hf_abc ").unwrap().expose(), "hf_abc");
    }

    #[test]
    fn debug_is_redacted() {
        let credential = Credential::new("hf_secret").unwrap();
        assert!(!format!("{credential:?}").contains("hf_secret"));
    }

    #[test]
    fn environment_wins() {
        let file = secrets("HUGGINGFACEHUB_API_TOKEN: hf_file\n");
        let credential = Credential::resolve(Some("hf_env".to_string()), file.path())
            .unwrap()
            .unwrap();
        assert_eq!(credential.expose(), "hf_env");
    }

    #[test]
    fn secrets_file_fallback() {
        let file = secrets("OTHER: 1\nHUGGINGFACEHUB_API_TOKEN: hf_file\n");
        let credential = Credential::resolve(Some(" ".to_string()), file.path())
            .unwrap()
            .unwrap();
        assert_eq!(credential.expose(), "hf_file");
    }

    #[test]
    fn missing_everything_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        assert!(Credential::resolve(None, &path).unwrap().is_none());

        let file = secrets("OTHER: 1\n");
        assert!(Credential::resolve(None, file.path()).unwrap().is_none());

        let file = secrets("");
        assert!(Credential::resolve(None, file.path()).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let file = secrets("HUGGINGFACEHUB_API_TOKEN: [unterminated\n");
        let err = Credential::resolve(None, file.path()).unwrap_err();
        assert!(err.is_configuration());
    }
}

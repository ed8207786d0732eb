//! Login credentials
//!
//! Two plain-text files read verbatim (trailing newline stripped) and typed
//! into the login form. Never logged above debug verbosity.

use std::path::Path;

use super::{settings::CredentialPaths, ConfigError};

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Hand-written so a stray `{:?}` can never print the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(paths: &CredentialPaths) -> Result<Self, ConfigError> {
        let username = read_credential(&paths.username_file)?;
        let password = read_credential(&paths.password_file)?;
        log::debug!("loaded credentials for user {username}");
        Ok(Self { username, password })
    }
}

fn read_credential(path: &Path) -> Result<String, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(text.trim_end_matches(['\r', '\n']).to_string())
}

//! Read-only access to the credentials saved by `serverless login`.
//!
//! Credentials live in a JSON "rc" file, `$HOME/.serverlessrc`:
//!
//! ```json
//! {
//!   "userId": "user-1",
//!   "users": {
//!     "user-1": { "auth": { "id_token": "<jwt>" } }
//!   }
//! }
//! ```
//!
//! A project may carry its own `.serverlessrc` whose `userId` takes
//! precedence over the global one.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub static RC_FILE_NAME: &str = ".serverlessrc";

/// Something that knows who is logged in, and with which token.
pub trait CredentialStore {
    /// The id of the currently logged in user.
    fn current_user_id(&self) -> Option<String>;

    /// The ID token issued to `user_id`.
    fn auth_token(&self, user_id: &str) -> Option<String>;
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RcConfig {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct UserRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub auth: Option<AuthRecord>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthRecord {
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

impl RcConfig {
    /// `$HOME/.serverlessrc`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(RC_FILE_NAME))
    }

    /// Parse a single rc file. A missing file is an empty config.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read '{}'", path.display()))
            }
        };

        serde_json::from_str(&raw).with_context(|| format!("failed to parse '{}'", path.display()))
    }

    /// Load the global rc file and apply the `userId` of a project-local one.
    ///
    /// Unreadable files are reported and treated as empty, which means
    /// "nobody is logged in".
    pub fn load(global: &Path, local: Option<&Path>) -> Self {
        let mut config = Self::from_file(global).unwrap_or_else(|err| {
            tracing::warn!(error=&*err, "Ignoring unreadable credentials file");
            Self::default()
        });

        if let Some(local) = local {
            match Self::from_file(local) {
                Ok(RcConfig {
                    user_id: Some(user_id),
                    ..
                }) => {
                    tracing::debug!(%user_id, path=%local.display(), "Using project-local user id");
                    config.user_id = Some(user_id);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error=&*err, "Ignoring unreadable project credentials file");
                }
            }
        }

        config
    }
}

impl CredentialStore for RcConfig {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone().filter(|id| !id.is_empty())
    }

    fn auth_token(&self, user_id: &str) -> Option<String> {
        self.users
            .get(user_id)?
            .auth
            .as_ref()?
            .id_token
            .clone()
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const SERVERLESSRC: &str = r#"
    {
      "userId": "user-1",
      "trackingDisabled": false,
      "users": {
        "user-1": {
          "name": "Jane",
          "email": "jane@example.com",
          "auth": { "id_token": "token-1", "expires_at": 1500000000 }
        },
        "user-2": {
          "auth": { "id_token": "token-2" }
        },
        "user-3": {
          "name": "Logged out"
        }
      }
    }
    "#;

    #[test]
    fn token_is_looked_up_by_user_id() {
        let config: RcConfig = serde_json::from_str(SERVERLESSRC).unwrap();

        assert_eq!(config.current_user_id().as_deref(), Some("user-1"));
        assert_eq!(config.auth_token("user-1").as_deref(), Some("token-1"));
        assert_eq!(config.auth_token("user-2").as_deref(), Some("token-2"));
        assert_eq!(config.auth_token("user-3"), None);
        assert_eq!(config.auth_token("unknown"), None);
    }

    #[test]
    fn missing_files_mean_nobody_is_logged_in() {
        let temp = TempDir::new().unwrap();

        let config = RcConfig::load(&temp.path().join(RC_FILE_NAME), None);

        assert_eq!(config, RcConfig::default());
        assert_eq!(config.current_user_id(), None);
    }

    #[test]
    fn malformed_global_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join(RC_FILE_NAME);
        std::fs::write(&global, "{ not json").unwrap();

        assert!(RcConfig::from_file(&global).is_err());
        assert_eq!(RcConfig::load(&global, None), RcConfig::default());
    }

    #[test]
    fn local_user_id_takes_precedence() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join(RC_FILE_NAME);
        std::fs::write(&global, SERVERLESSRC).unwrap();
        let project = temp.path().join("project");
        std::fs::create_dir(&project).unwrap();
        let local = project.join(RC_FILE_NAME);
        std::fs::write(&local, r#"{ "userId": "user-2" }"#).unwrap();

        let config = RcConfig::load(&global, Some(&local));

        assert_eq!(config.current_user_id().as_deref(), Some("user-2"));
        assert_eq!(config.auth_token("user-2").as_deref(), Some("token-2"));
    }

    #[test]
    fn local_file_without_user_id_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join(RC_FILE_NAME);
        std::fs::write(&global, SERVERLESSRC).unwrap();
        let local = temp.path().join("local-rc");
        std::fs::write(&local, r#"{ "users": {} }"#).unwrap();

        let config = RcConfig::load(&global, Some(&local));

        assert_eq!(config.current_user_id().as_deref(), Some("user-1"));
    }
}

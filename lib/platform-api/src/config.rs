use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

pub static PLATFORM_CONFIG_FILE_NAME: &str = "platform.toml";

/// Where the platform lives, and how to reach it.
///
/// Defaults to the production platform. Every field can be overridden from
/// a TOML file, see [`PlatformConfig::from_file`].
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct PlatformConfig {
    /// Base URL of the web dashboard, used for the "available at" link.
    pub frontend_base_url: String,
    /// The GraphQL endpoint manifests are published to.
    pub graphql_endpoint: String,
    pub auth0_client_id: String,
    pub auth0_url: String,
    pub auth0_callback_url: String,

    /// The proxy to use when connecting to the Internet.
    pub proxy: Proxy,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct Proxy {
    pub url: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        PlatformConfig {
            frontend_base_url: crate::PLATFORM_FRONTEND_BASE_URL.to_string(),
            graphql_endpoint: crate::GRAPHQL_ENDPOINT_URL.to_string(),
            auth0_client_id: "09L1JPT2LSv8x0VKHdrs4p85FXpoIB6w".to_string(),
            auth0_url: "https://serverlessdev.auth0.com".to_string(),
            auth0_callback_url: "https://platform.serverless-dev.com/cli-authentication"
                .to_string(),
            proxy: Proxy::default(),
        }
    }
}

impl PlatformConfig {
    /// Load the config from a TOML file.
    ///
    /// A missing file yields the defaults, a malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        if !path.is_file() {
            tracing::debug!(path=%path.display(), "No platform config found, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read platform config at '{}'", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse platform config at '{}'", path.display()))?;
        Ok(config)
    }

    /// `$HOME/.serverless/platform.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".serverless").join(PLATFORM_CONFIG_FILE_NAME))
    }

    /// Override the GraphQL endpoint.
    pub fn with_graphql_endpoint(self, graphql_endpoint: impl Into<String>) -> Self {
        Self {
            graphql_endpoint: graphql_endpoint.into(),
            ..self
        }
    }

    /// Override the dashboard base URL.
    pub fn with_frontend_base_url(self, frontend_base_url: impl Into<String>) -> Self {
        Self {
            frontend_base_url: frontend_base_url.into(),
            ..self
        }
    }

    /// Get the GraphQL endpoint used to publish services.
    pub fn graphql_url(&self) -> Result<Url, anyhow::Error> {
        let url = format_graphql(&self.graphql_endpoint)
            .parse()
            .with_context(|| format!("invalid GraphQL endpoint '{}'", self.graphql_endpoint))?;
        Ok(url)
    }

    /// The dashboard page of a service owned by `nickname`.
    pub fn dashboard_url(&self, nickname: &str, service: &str) -> String {
        let base = self.frontend_base_url.trim_end_matches('/');
        format!("{base}/services/{nickname}/{service}")
    }
}

/// Normalize a user supplied GraphQL endpoint.
///
/// `https://example.com/` becomes `https://example.com/graphql`, anything with
/// an explicit path is left alone.
pub fn format_graphql(endpoint: &str) -> String {
    if let Ok(mut url) = Url::parse(endpoint) {
        // Looks like we've got a valid URL. Let's try to use it as-is.
        if url.has_host() {
            if url.path() == "/" {
                url.set_path("/graphql");
            }

            return url.to_string();
        }
    }

    if !endpoint.contains("://") && !endpoint.contains('/') {
        return endpoint_from_domain_name(endpoint);
    }

    // looks like we've received something we can't deal with. Just pass it
    // through as-is and hopefully it'll either work or the end user can figure
    // it out
    endpoint.to_string()
}

/// By convention, something like `"serverless.com"` should be converted to
/// `"https://api.serverless.com/graphql"`.
fn endpoint_from_domain_name(domain_name: &str) -> String {
    if domain_name.contains("localhost") {
        return format!("http://{domain_name}/graphql");
    }

    format!("https://api.{domain_name}/graphql")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn format_endpoint_urls() {
        let inputs = [
            // Domain names work
            ("serverless.com", "https://api.serverless.com/graphql"),
            // Plain URLs
            (
                crate::GRAPHQL_ENDPOINT_URL,
                crate::GRAPHQL_ENDPOINT_URL,
            ),
            (
                "https://api.serverless.com/something/else",
                "https://api.serverless.com/something/else",
            ),
            // "/" gets turned into "/graphql"
            ("https://serverless.com/", "https://serverless.com/graphql"),
            ("https://serverless.com", "https://serverless.com/graphql"),
            // local development
            (
                "http://localhost:4000/graphql",
                "http://localhost:4000/graphql",
            ),
            ("localhost:4000", "http://localhost:4000/graphql"),
        ];

        for (input, expected) in inputs {
            let url = format_graphql(input);
            assert_eq!(url, expected);
        }
    }

    #[test]
    fn dashboard_url_tolerates_missing_trailing_slash() {
        let config = PlatformConfig::default();
        assert_eq!(
            config.dashboard_url("jane", "orders-api"),
            "https://platform.serverless-dev.com/services/jane/orders-api"
        );

        let config = config.with_frontend_base_url("http://localhost:3000");
        assert_eq!(
            config.dashboard_url("jane", "orders-api"),
            "http://localhost:3000/services/jane/orders-api"
        );
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = PlatformConfig::from_file(&temp.path().join("platform.toml")).unwrap();
        assert_eq!(config, PlatformConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("platform.toml");
        std::fs::write(
            &path,
            r#"
            graphql_endpoint = "http://localhost:4000/graphql"

            [proxy]
            url = "http://localhost:3128"
            "#,
        )
        .unwrap();

        let config = PlatformConfig::from_file(&path).unwrap();

        assert_eq!(config.graphql_endpoint, "http://localhost:4000/graphql");
        assert_eq!(config.proxy.url.as_deref(), Some("http://localhost:3128"));
        assert_eq!(
            config.frontend_base_url,
            PlatformConfig::default().frontend_base_url
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("platform.toml");
        std::fs::write(&path, "graphql_endpoint = [").unwrap();

        assert!(PlatformConfig::from_file(&path).is_err());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("platform.toml");
        std::fs::write(&path, "graphql_endpoint = \"localhost:4000\"\n").unwrap();

        let config = PlatformConfig::from_file(&path).unwrap();

        assert_eq!(
            config,
            PlatformConfig::default().with_graphql_endpoint("localhost:4000")
        );
        assert_eq!(
            config.graphql_url().unwrap().as_str(),
            "http://localhost:4000/graphql"
        );
    }
}

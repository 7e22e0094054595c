use std::path::{Path, PathBuf};

use anyhow::Context;
use serverless_platform_api::{credentials::RC_FILE_NAME, PlatformConfig, RcConfig};

use crate::service::{DeployContext, ServiceDefinition};

/// Flags locating the deployed service.
#[derive(clap::Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOpts {
    /// The service definition [default: <service-path>/serverless.yml]
    #[clap(long)]
    pub config: Option<PathBuf>,
    /// The stage that was deployed (defaults to `provider.stage`, then "dev")
    #[clap(short, long)]
    pub stage: Option<String>,
    /// The region that was deployed to (defaults to `provider.region`, then "us-east-1")
    #[clap(short, long)]
    pub region: Option<String>,
    /// The service directory [default: current directory]
    #[clap(long)]
    pub service_path: Option<PathBuf>,
}

impl DeployOpts {
    pub fn service_path(&self) -> Result<PathBuf, anyhow::Error> {
        match &self.service_path {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().context("unable to determine the current directory"),
        }
    }

    pub fn config_path(&self, service_path: &Path) -> PathBuf {
        match &self.config {
            Some(config) => service_path.join(config),
            None => service_path.join(ServiceDefinition::CANONICAL_FILE_NAME),
        }
    }

    /// Load the service definition and resolve stage and region.
    pub fn context(&self) -> Result<DeployContext, anyhow::Error> {
        let service_path = self.service_path()?;
        let definition = ServiceDefinition::from_file(&self.config_path(&service_path))?;
        Ok(DeployContext::new(
            definition,
            self.stage.clone(),
            self.region.clone(),
            service_path,
        ))
    }
}

/// Flags for reaching the platform and finding the logged in user.
#[derive(clap::Parser, Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformOpts {
    /// The credentials file written by `serverless login` [default: ~/.serverlessrc]
    #[clap(long, env = "SERVERLESS_RC_FILE")]
    pub rc_file: Option<PathBuf>,
    /// The platform configuration file [default: ~/.serverless/platform.toml]
    #[clap(long, env = "SERVERLESS_PLATFORM_CONFIG")]
    pub platform_config: Option<PathBuf>,
    /// Override the GraphQL endpoint
    #[clap(long, env = "SERVERLESS_PLATFORM_GRAPHQL_URL")]
    pub graphql_endpoint: Option<String>,
    /// Override the dashboard base URL
    #[clap(long, env = "SERVERLESS_PLATFORM_FRONTEND_URL")]
    pub frontend_url: Option<String>,
}

impl PlatformOpts {
    /// Load the platform config, then apply the overrides.
    pub fn config(&self) -> Result<PlatformConfig, anyhow::Error> {
        let mut config = match self.platform_config.clone().or_else(PlatformConfig::default_path)
        {
            Some(path) => PlatformConfig::from_file(&path)?,
            None => PlatformConfig::default(),
        };

        if let Some(endpoint) = &self.graphql_endpoint {
            config = config.with_graphql_endpoint(endpoint.as_str());
        }
        if let Some(url) = &self.frontend_url {
            config = config.with_frontend_base_url(url.as_str());
        }

        Ok(config)
    }

    /// The logged in user, with a project-local `.serverlessrc` taking
    /// precedence when `service_path` has one.
    pub fn credentials(&self, service_path: Option<&Path>) -> RcConfig {
        let Some(global) = self.rc_file.clone().or_else(RcConfig::default_path) else {
            tracing::warn!("Unable to determine the home directory");
            return RcConfig::default();
        };

        let local = service_path.map(|dir| dir.join(RC_FILE_NAME));
        RcConfig::load(&global, local.as_deref())
    }
}

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use serverless_platform_api::{types::ServiceManifest, PlatformClient, RcConfig};

use crate::{
    commands::AsyncCliCommand,
    opts::{DeployOpts, PlatformOpts},
    provider::AwsProvider,
    publisher::{announce, report, resolve_auth, PlatformPublisher, PublishError, PublishOutcome},
};

/// Publish a deployed service to the Serverless Platform.
///
/// Meant to run right after `serverless deploy`. Unless `--strict` is given,
/// a failed publish is reported but does not fail the command.
#[derive(clap::Parser, Debug)]
pub struct CmdPublish {
    #[clap(flatten)]
    deploy: DeployOpts,
    #[clap(flatten)]
    platform: PlatformOpts,
    /// Build the manifest and print it instead of publishing
    #[clap(long)]
    dry_run: bool,
    /// Also write the manifest to this file, as JSON
    #[clap(long)]
    manifest_out: Option<PathBuf>,
    /// Exit with an error when publishing fails
    #[clap(long)]
    strict: bool,
}

impl CmdPublish {
    /// Looked up before anything else is loaded.
    fn credentials(&self) -> RcConfig {
        let service_path = self.deploy.service_path().ok();
        self.platform.credentials(service_path.as_deref())
    }

    async fn publisher(&self, credentials: RcConfig) -> Result<PlatformPublisher, PublishError> {
        let context = self.deploy.context().map_err(PublishError::Config)?;
        let config = self.platform.config().map_err(PublishError::Config)?;
        let client = PlatformClient::from_config(&config).map_err(PublishError::Config)?;
        let provider = AwsProvider::from_env(&context.region).await;

        Ok(PlatformPublisher::new(
            config,
            context,
            Arc::new(provider),
            Arc::new(client),
            Arc::new(credentials),
        )
        .with_dry_run(self.dry_run))
    }

    fn write_manifest(&self, manifest: &ServiceManifest) -> Result<(), anyhow::Error> {
        let Some(path) = &self.manifest_out else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(manifest)?;
        std::fs::write(path, json)
            .with_context(|| format!("unable to write the manifest to '{}'", path.display()))?;
        tracing::info!(path=%path.display(), "Wrote the service manifest");
        Ok(())
    }
}

#[async_trait::async_trait]
impl AsyncCliCommand for CmdPublish {
    type Output = ();

    async fn run_async(self) -> Result<(), anyhow::Error> {
        announce();

        let credentials = self.credentials();
        if let Err(not_logged_in) = resolve_auth(&credentials) {
            report(&Ok(not_logged_in));
            return Ok(());
        }

        let result = match self.publisher(credentials).await {
            Ok(publisher) => publisher.publish().await,
            Err(e) => Err(e),
        };
        report(&result);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) if self.strict => return Err(e.into()),
            Err(_) => return Ok(()),
        };

        if let Some(manifest) = outcome.manifest() {
            self.write_manifest(manifest)?;
        }
        if let PublishOutcome::DryRun { manifest } = &outcome {
            println!("{}", serde_json::to_string_pretty(manifest)?);
        }

        Ok(())
    }
}

//! Publishing a completed deployment to the platform.
//!
//! The pipeline is strictly sequential:
//!
//! 1. look up the auth token of the current user,
//! 2. query the account id,
//! 3. describe the stack and resolve the service endpoint,
//! 4. build the manifest,
//! 5. publish it,
//! 6. report the dashboard URL.
//!
//! Nothing is retried. A missing token ends the pipeline before any network
//! call is made.

use std::sync::Arc;

use serverless_platform_api::{
    token,
    types::{PublishedService, ServiceManifest},
    CredentialStore, PlatformConfig, ServicePublisher,
};
use thiserror::Error;

use crate::{
    endpoint::fetch_endpoint, manifest::build_service_manifest, provider::CloudProvider,
    service::DeployContext,
};

/// Used in the dashboard URL when the token carries no nickname.
const UNKNOWN_NICKNAME: &str = "unknown";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid configuration")]
    Config(#[source] anyhow::Error),
    #[error("could not determine the cloud account id")]
    AccountId(#[source] anyhow::Error),
    #[error("could not describe stack '{stack}'")]
    DescribeStack {
        stack: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("the platform rejected service '{service}'")]
    Publish {
        service: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nobody is logged in, nothing was done.
    NotLoggedIn { user_id: Option<String> },
    /// The manifest was built but, as requested, not sent.
    DryRun { manifest: ServiceManifest },
    Published {
        service: PublishedService,
        manifest: ServiceManifest,
        /// Dashboard page of the service.
        url: String,
    },
}

impl PublishOutcome {
    pub fn manifest(&self) -> Option<&ServiceManifest> {
        match self {
            PublishOutcome::NotLoggedIn { .. } => None,
            PublishOutcome::DryRun { manifest } | PublishOutcome::Published { manifest, .. } => {
                Some(manifest)
            }
        }
    }
}

/// Publishes a deployment, with every collaborator injected.
pub struct PlatformPublisher {
    config: PlatformConfig,
    context: DeployContext,
    provider: Arc<dyn CloudProvider>,
    publisher: Arc<dyn ServicePublisher>,
    credentials: Arc<dyn CredentialStore + Send + Sync>,
    dry_run: bool,
}

impl PlatformPublisher {
    pub fn new(
        config: PlatformConfig,
        context: DeployContext,
        provider: Arc<dyn CloudProvider>,
        publisher: Arc<dyn ServicePublisher>,
        credentials: Arc<dyn CredentialStore + Send + Sync>,
    ) -> Self {
        Self {
            config,
            context,
            provider,
            publisher,
            credentials,
            dry_run: false,
        }
    }

    /// Stop after building the manifest.
    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }

    pub fn context(&self) -> &DeployContext {
        &self.context
    }

    /// Entry point after a successful deployment.
    ///
    /// Reports progress and failures on the console. Failures are returned
    /// for callers that want to act on them, but never panic or retry.
    pub async fn publish_service(&self) -> Result<PublishOutcome, PublishError> {
        announce();
        let result = self.publish().await;
        report(&result);
        result
    }

    /// Run the pipeline without console output.
    pub async fn publish(&self) -> Result<PublishOutcome, PublishError> {
        let token = match resolve_auth(self.credentials.as_ref()) {
            Ok(token) => token,
            Err(not_logged_in) => return Ok(not_logged_in),
        };

        let manifest = self.build_manifest().await?;
        if self.dry_run {
            return Ok(PublishOutcome::DryRun { manifest });
        }

        tracing::debug!(manifest = ?manifest, "Publishing manifest");
        let service = self
            .publisher
            .publish(&token, &manifest)
            .await
            .map_err(|source| PublishError::Publish {
                service: manifest.name.clone(),
                source,
            })?;

        let url = self.dashboard_url(&token);
        Ok(PublishOutcome::Published {
            service,
            manifest,
            url,
        })
    }

    /// Query the provider and build the manifest.
    pub async fn build_manifest(&self) -> Result<ServiceManifest, PublishError> {
        let account_id = self
            .provider
            .account_id()
            .await
            .map_err(PublishError::AccountId)?;

        let stack = self.context.stack_name();
        let endpoint = fetch_endpoint(self.provider.as_ref(), &stack)
            .await
            .map_err(|source| PublishError::DescribeStack {
                stack: stack.clone(),
                source,
            })?;

        Ok(build_service_manifest(
            &self.context,
            &account_id,
            endpoint.as_deref(),
        ))
    }

    fn dashboard_url(&self, auth_token: &str) -> String {
        let nickname = token::nickname(auth_token).unwrap_or_else(|e| {
            tracing::warn!(
                error = &e as &dyn std::error::Error,
                "Unable to read the nickname from the auth token"
            );
            UNKNOWN_NICKNAME.to_string()
        });
        self.config
            .dashboard_url(&nickname, self.context.service_name())
    }
}

/// The auth token of the logged in user.
///
/// Without one the pipeline ends here, before any network call.
pub fn resolve_auth(credentials: &dyn CredentialStore) -> Result<String, PublishOutcome> {
    let user_id = credentials.current_user_id();
    match user_id
        .as_deref()
        .and_then(|id| credentials.auth_token(id))
    {
        Some(token) => Ok(token),
        None => {
            tracing::info!(user_id = ?user_id, "No auth token found");
            Err(PublishOutcome::NotLoggedIn { user_id })
        }
    }
}

pub fn announce() {
    println!("Publishing service to the Serverless Platform...");
}

/// Print the result of a publish the way the deploy hook reports it.
pub fn report(result: &Result<PublishOutcome, PublishError>) {
    match result {
        Ok(PublishOutcome::NotLoggedIn { user_id: Some(user_id) }) => {
            println!("no auth token found for {user_id}");
        }
        Ok(PublishOutcome::NotLoggedIn { user_id: None }) => {
            println!("no user is logged in, skipping publish");
        }
        Ok(PublishOutcome::DryRun { .. }) => {
            println!("Dry run, the service was not published");
        }
        Ok(PublishOutcome::Published { url, .. }) => {
            println!("Your service is available at");
            println!("{url}");
        }
        Err(e) => report_failure(e),
    }
}

/// Print a failed publish.
pub fn report_failure(err: &PublishError) {
    tracing::debug!(error = err as &dyn std::error::Error, "Publishing failed");
    println!(
        "Couldn't publish this deploy information to the Serverless Platform due: \n{}",
        error_chain(err)
    );
}

/// `outer: inner: innermost`
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        msg.push_str(": ");
        msg.push_str(&e.to_string());
        source = e.source();
    }
    msg
}

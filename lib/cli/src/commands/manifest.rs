use crate::{
    commands::AsyncCliCommand,
    endpoint::fetch_endpoint,
    manifest::build_service_manifest,
    opts::DeployOpts,
    provider::{AwsProvider, CloudProvider},
};

/// Build the service manifest and print it, without publishing.
///
/// Needs no platform credentials. Cloud queries are skipped for the values
/// given on the command line.
#[derive(clap::Parser, Debug)]
pub struct CmdManifest {
    #[clap(flatten)]
    deploy: DeployOpts,
    /// Use this account id instead of asking the cloud provider
    #[clap(long)]
    account_id: Option<String>,
    /// Use this service endpoint instead of describing the stack
    #[clap(long)]
    endpoint: Option<String>,
}

#[async_trait::async_trait]
impl AsyncCliCommand for CmdManifest {
    type Output = ();

    async fn run_async(self) -> Result<(), anyhow::Error> {
        let context = self.deploy.context()?;
        // Credentials are only resolved on the first query.
        let provider = AwsProvider::from_env(&context.region).await;

        let account_id = match self.account_id {
            Some(account_id) => account_id,
            None => provider.account_id().await?,
        };
        let endpoint = match self.endpoint {
            Some(endpoint) => Some(endpoint),
            None => fetch_endpoint(&provider, &context.stack_name()).await?,
        };

        let manifest = build_service_manifest(&context, &account_id, endpoint.as_deref());
        println!("{}", serde_json::to_string_pretty(&manifest)?);

        Ok(())
    }
}

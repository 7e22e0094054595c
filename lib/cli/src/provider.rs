//! Access to the cloud the service was deployed to.

use std::sync::LazyLock;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use regex::Regex;

/// Outputs of the stack holding the HTTP endpoint are named `ServiceEndpoint*`.
static AWS_SERVICE_ENDPOINT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^ServiceEndpoint").expect("valid regex"));

/// A named value exported by a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutput {
    pub output_key: String,
    pub output_value: String,
}

impl StackOutput {
    pub fn new(output_key: impl Into<String>, output_value: impl Into<String>) -> Self {
        Self {
            output_key: output_key.into(),
            output_value: output_value.into(),
        }
    }
}

/// The provider-side queries needed to describe a deployment.
#[async_trait::async_trait]
pub trait CloudProvider: Send + Sync {
    /// Naming convention of the stack output holding the service endpoint.
    fn service_endpoint_regex(&self) -> &Regex {
        &AWS_SERVICE_ENDPOINT_REGEX
    }

    /// The account the credentials in use belong to.
    async fn account_id(&self) -> Result<String, anyhow::Error>;

    /// The declared outputs of a stack, in the order the provider lists them.
    async fn stack_outputs(&self, stack_name: &str) -> Result<Vec<StackOutput>, anyhow::Error>;
}

/// [`CloudProvider`] backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct AwsProvider {
    cloudformation: aws_sdk_cloudformation::Client,
    sts: aws_sdk_sts::Client,
}

impl AwsProvider {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(config),
            sts: aws_sdk_sts::Client::new(config),
        }
    }

    /// Load credentials from the environment, targeting `region`.
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(&config)
    }
}

#[async_trait::async_trait]
impl CloudProvider for AwsProvider {
    async fn account_id(&self) -> Result<String, anyhow::Error> {
        let identity = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("{}", aws_sdk_sts::error::DisplayErrorContext(&e)))
            .context("GetCallerIdentity failed")?;

        let account = identity
            .account()
            .context("GetCallerIdentity did not return an account id")?;
        Ok(account.to_string())
    }

    async fn stack_outputs(&self, stack_name: &str) -> Result<Vec<StackOutput>, anyhow::Error> {
        let res = self
            .cloudformation
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!("{}", aws_sdk_cloudformation::error::DisplayErrorContext(&e))
            })
            .with_context(|| format!("DescribeStacks failed for '{stack_name}'"))?;

        let Some(stack) = res.stacks().first() else {
            tracing::warn!(stack_name, "DescribeStacks returned no stack");
            return Ok(Vec::new());
        };

        let outputs = stack
            .outputs()
            .iter()
            .filter_map(|output| match (output.output_key(), output.output_value()) {
                (Some(key), Some(value)) => Some(StackOutput::new(key, value)),
                _ => None,
            })
            .collect();
        Ok(outputs)
    }
}

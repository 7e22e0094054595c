use anyhow::Context;
use graphql_client::GraphQLQuery;
use url::Url;

use crate::{
    graphql::{self, mutations::PublishServiceMutation},
    types::{PublishedService, ServiceManifest},
    GraphQLApiFailure, PlatformConfig,
};

/// Something that can transmit a [`ServiceManifest`] to the platform.
#[async_trait::async_trait]
pub trait ServicePublisher: Send + Sync {
    /// Publish `manifest` on behalf of the user owning `token`.
    async fn publish(
        &self,
        token: &str,
        manifest: &ServiceManifest,
    ) -> Result<PublishedService, anyhow::Error>;
}

/// API client for the Serverless Platform.
#[derive(Clone, Debug)]
pub struct PlatformClient {
    client: reqwest::Client,
    endpoint: Url,
    token: Option<String>,
}

impl PlatformClient {
    /// Construct a new client.
    pub fn new(
        endpoint: Url,
        token: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Self, anyhow::Error> {
        Self::with_proxy(endpoint, token, user_agent, None)
    }

    /// Construct a client from a [`PlatformConfig`], honoring its proxy.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, anyhow::Error> {
        let endpoint = config.graphql_url()?;
        Self::with_proxy(endpoint, None, None, config.proxy.url.as_deref())
    }

    fn with_proxy(
        endpoint: Url,
        token: Option<String>,
        user_agent: Option<String>,
        proxy: Option<&str>,
    ) -> Result<Self, anyhow::Error> {
        let user_agent = user_agent.unwrap_or_else(Self::default_user_agent);
        let builder = reqwest::Client::builder().user_agent(user_agent);
        let client = graphql::proxy::maybe_set_up_proxy(builder, proxy)?
            .build()
            .context("could not construct the HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn default_user_agent() -> String {
        format!(
            "serverless-platform/{} {} {}",
            crate::VERSION,
            whoami::platform(),
            graphql::whoami_distro(),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Set the authentication token.
    pub fn with_token(self, token: String) -> Self {
        Self {
            token: Some(token),
            ..self
        }
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        vars: Q::Variables,
    ) -> Result<graphql_client::Response<Q::ResponseData>, reqwest::Error> {
        let body = Q::build_query(vars);

        let req = self.client.post(self.endpoint.as_str());

        let req = if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        };
        req.json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<graphql_client::Response<Q::ResponseData>>()
            .await
    }

    /// Execute a GraphQL query, and convert a response with errors to a Rust error.
    async fn execute_checked<Q: GraphQLQuery>(
        &self,
        vars: Q::Variables,
    ) -> Result<Q::ResponseData, anyhow::Error> {
        let res = self
            .execute::<Q>(vars)
            .await
            .with_context(|| format!("request to '{}' failed", self.endpoint))?;
        extract_data(res)
    }

    /// Publish a service manifest.
    ///
    /// Creates the service on the platform, or updates the existing one with
    /// the same name and stage.
    pub async fn publish_service(
        &self,
        manifest: &ServiceManifest,
    ) -> Result<PublishedService, anyhow::Error> {
        let vars = graphql::mutations::publish_service_mutation::Variables {
            service: serde_json::to_value(manifest)?,
        };

        let service = self
            .execute_checked::<PublishServiceMutation>(vars)
            .await?
            .publish_service
            .context("Query did not return data")?;

        tracing::debug!(id=%service.id, name=%service.name, stage=%service.stage, "Service published");

        Ok(PublishedService {
            id: service.id,
            name: service.name,
            stage: service.stage,
        })
    }
}

#[async_trait::async_trait]
impl ServicePublisher for PlatformClient {
    async fn publish(
        &self,
        token: &str,
        manifest: &ServiceManifest,
    ) -> Result<PublishedService, anyhow::Error> {
        self.clone()
            .with_token(token.to_string())
            .publish_service(manifest)
            .await
    }
}

fn extract_data<T>(res: graphql_client::Response<T>) -> Result<T, anyhow::Error> {
    match res.data {
        Some(data) if res.errors.as_ref().map_or(true, |errs| errs.is_empty()) => Ok(data),
        _ => Err(GraphQLApiFailure::from_errors(
            "GraphQL request failed",
            res.errors,
        )),
    }
}

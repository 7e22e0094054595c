use graphql_client::GraphQLQuery;

/// Opaque JSON payload, used for the manifest argument.
#[allow(clippy::upper_case_acronyms)]
pub(crate) type JSON = serde_json::Value;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/schema.graphql",
    query_path = "graphql/mutations/publish_service.graphql",
    response_derives = "Debug"
)]
pub(crate) struct PublishServiceMutation;

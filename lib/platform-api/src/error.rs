/// One or multiple errors returned by the GraphQL API.
// Mainly exists to implement [`std::error::Error`].
#[derive(Debug)]
pub struct GraphQLApiFailure {
    pub errors: Vec<graphql_client::Error>,
}

impl GraphQLApiFailure {
    pub fn from_errors(
        msg: impl Into<String>,
        errors: Option<Vec<graphql_client::Error>>,
    ) -> anyhow::Error {
        let msg = msg.into();
        if let Some(errs) = errors {
            if !errs.is_empty() {
                let err = GraphQLApiFailure { errors: errs };
                return anyhow::Error::new(err).context(msg);
            }
        }
        anyhow::anyhow!("{msg} - query did not return any data")
    }
}

impl std::fmt::Display for GraphQLApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let errs = self
            .errors
            .iter()
            .map(|err| err.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "GraphQL API failure: {errs}")
    }
}

impl std::error::Error for GraphQLApiFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(message: &str) -> graphql_client::Error {
        graphql_client::Error {
            message: message.to_string(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    #[test]
    fn errors_are_joined_and_keep_context() {
        let err = GraphQLApiFailure::from_errors(
            "could not publish service",
            Some(vec![error("not authorized"), error("stage is required")]),
        );

        assert_eq!(err.to_string(), "could not publish service");
        let failure = err.downcast_ref::<GraphQLApiFailure>().unwrap();
        assert_eq!(
            failure.to_string(),
            "GraphQL API failure: not authorized, stage is required"
        );
    }

    #[test]
    fn missing_errors_mean_missing_data() {
        let err = GraphQLApiFailure::from_errors("could not publish service", Some(Vec::new()));
        assert_eq!(
            err.to_string(),
            "could not publish service - query did not return any data"
        );
        assert!(err.downcast_ref::<GraphQLApiFailure>().is_none());
    }
}

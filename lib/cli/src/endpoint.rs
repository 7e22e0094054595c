//! Locating the public HTTP endpoint of a deployed service.

use regex::Regex;

use crate::provider::{CloudProvider, StackOutput};

/// Pick the value of the output whose key matches `pattern`.
///
/// When several outputs match, the last one wins.
pub fn resolve_endpoint(outputs: &[StackOutput], pattern: &Regex) -> Option<String> {
    let mut matches = outputs
        .iter()
        .filter(|output| pattern.is_match(&output.output_key))
        .collect::<Vec<_>>();

    if matches.len() > 1 {
        tracing::warn!(
            pattern = pattern.as_str(),
            keys = ?matches.iter().map(|o| o.output_key.as_str()).collect::<Vec<_>>(),
            "Multiple stack outputs match the service endpoint pattern, using the last one",
        );
    }

    matches.pop().map(|output| output.output_value.clone())
}

/// Describe `stack_name` and resolve its service endpoint.
pub async fn fetch_endpoint(
    provider: &dyn CloudProvider,
    stack_name: &str,
) -> Result<Option<String>, anyhow::Error> {
    let outputs = provider.stack_outputs(stack_name).await?;
    let endpoint = resolve_endpoint(&outputs, provider.service_endpoint_regex());
    tracing::debug!(stack_name, endpoint = ?endpoint, "Resolved service endpoint");
    Ok(endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> Regex {
        Regex::new("^ServiceEndpoint").unwrap()
    }

    #[test]
    fn no_matching_output() {
        let outputs = [
            StackOutput::new("ServerlessDeploymentBucketName", "orders-api-dev-bucket"),
            StackOutput::new("CreateLambdaFunctionQualifiedArn", "arn:aws:lambda:..."),
            StackOutput::new("MyServiceEndpoint", "https://not.anchored"),
        ];
        assert_eq!(resolve_endpoint(&outputs, &pattern()), None);
        assert_eq!(resolve_endpoint(&[], &pattern()), None);
    }

    #[test]
    fn single_matching_output() {
        let outputs = [
            StackOutput::new("ServerlessDeploymentBucketName", "orders-api-dev-bucket"),
            StackOutput::new(
                "ServiceEndpoint",
                "https://abc.execute-api.us-east-1.amazonaws.com/dev",
            ),
        ];
        assert_eq!(
            resolve_endpoint(&outputs, &pattern()).as_deref(),
            Some("https://abc.execute-api.us-east-1.amazonaws.com/dev")
        );
    }

    #[test]
    fn last_match_wins() {
        let outputs = [
            StackOutput::new("ServiceEndpoint", "https://first.example.com/dev"),
            StackOutput::new("Unrelated", "value"),
            StackOutput::new("ServiceEndpointWebsocket", "wss://second.example.com/dev"),
        ];
        assert_eq!(
            resolve_endpoint(&outputs, &pattern()).as_deref(),
            Some("wss://second.example.com/dev")
        );

        let reversed = [outputs[2].clone(), outputs[1].clone(), outputs[0].clone()];
        assert_eq!(
            resolve_endpoint(&reversed, &pattern()).as_deref(),
            Some("https://first.example.com/dev")
        );
    }
}

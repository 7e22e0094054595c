//! Assembly of the [`ServiceManifest`] sent to the platform.

use std::path::{Path, PathBuf};

use serverless_platform_api::types::{Endpoint, FunctionDescriptor, ServiceManifest};

use crate::service::{DeployContext, HttpRoute};

/// File names tried, in order, when looking for the service readme.
pub const README_FILE_NAMES: &[&str] = &[
    "README.md",
    "readme.md",
    "Readme.md",
    "README.markdown",
    "README",
];

/// Everything known about one deployed function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAttributes {
    pub name: String,
    pub runtime: String,
    pub memory: u32,
    pub timeout: u32,
    pub provider: String,
    pub origin_id: String,
    pub routes: Vec<HttpRoute>,
    pub readme_path: Option<PathBuf>,
}

impl FunctionAttributes {
    /// Compute the attributes of function `key` as deployed in `account_id`.
    pub fn from_context(ctx: &DeployContext, key: &str, account_id: &str) -> Option<Self> {
        let function = ctx.function(key)?;
        let deployed_name = ctx.deployed_name(key, function);

        Some(Self {
            name: key.to_string(),
            runtime: ctx.runtime(function),
            memory: ctx.memory_size(function),
            timeout: ctx.timeout(function),
            provider: ctx.provider_name().to_string(),
            origin_id: ctx.function_arn(account_id, &deployed_name),
            routes: function
                .events
                .iter()
                .filter_map(|event| event.http.as_ref())
                .map(|http| http.route())
                .collect(),
            readme_path: function.readme.as_deref().map(|p| ctx.resolve_path(p)),
        })
    }
}

/// Bind each route to the service endpoint. Without an endpoint there are no
/// HTTP bindings.
pub fn function_endpoints(routes: &[HttpRoute], endpoint: Option<&str>) -> Vec<Endpoint> {
    let Some(base) = endpoint else {
        return Vec::new();
    };
    let base = base.trim_end_matches('/');

    routes
        .iter()
        .map(|route| Endpoint {
            method: route.method.clone(),
            path: route.path.clone(),
            url: format!("{base}{}", route.path),
        })
        .collect()
}

pub fn build_function_descriptor(
    attributes: FunctionAttributes,
    endpoint: Option<&str>,
) -> FunctionDescriptor {
    let endpoints = function_endpoints(&attributes.routes, endpoint);
    let readme = attributes.readme_path.as_deref().and_then(read_readme);

    FunctionDescriptor {
        name: attributes.name,
        runtime: attributes.runtime,
        memory: attributes.memory,
        timeout: attributes.timeout,
        provider: attributes.provider,
        origin_id: attributes.origin_id,
        endpoints,
        readme,
    }
}

/// Build the manifest of a deployment: one descriptor per function, in
/// definition order, plus the service readme.
pub fn build_service_manifest(
    ctx: &DeployContext,
    account_id: &str,
    endpoint: Option<&str>,
) -> ServiceManifest {
    let functions = ctx
        .function_names()
        .filter_map(|key| FunctionAttributes::from_context(ctx, key, account_id))
        .map(|attributes| build_function_descriptor(attributes, endpoint))
        .collect();

    ServiceManifest {
        name: ctx.service_name().to_string(),
        stage: ctx.stage.clone(),
        functions,
        readme: find_service_readme(&ctx.service_path).as_deref().and_then(read_readme),
    }
}

/// The first readme found in `service_path`.
pub fn find_service_readme(service_path: &Path) -> Option<PathBuf> {
    README_FILE_NAMES
        .iter()
        .map(|name| service_path.join(name))
        .find(|path| path.is_file())
}

/// Read a readme, treating a missing or unreadable file as no readme.
pub fn read_readme(path: &Path) -> Option<String> {
    if !path.is_file() {
        tracing::debug!(path=%path.display(), "No readme found");
        return None;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path=%path.display(), error=&e as &dyn std::error::Error, "Unable to read the readme");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::service::ServiceDefinition;

    const SERVERLESS_YML: &str = r#"
service: orders-api
provider:
  name: aws
  runtime: nodejs6.10
functions:
  create:
    handler: handler.create
    memorySize: 512
    timeout: 10
    readme: docs/create.md
    events:
      - http: POST orders
  list:
    handler: handler.list
    readme: docs/missing.md
    events:
      - http:
          method: get
          path: /
"#;

    const ENDPOINT: &str = "https://abc.execute-api.us-east-1.amazonaws.com/dev";

    fn context(dir: &Path) -> DeployContext {
        DeployContext::new(
            ServiceDefinition::parse_yaml(SERVERLESS_YML).unwrap(),
            Some("dev".to_string()),
            None,
            dir.to_path_buf(),
        )
    }

    #[test]
    fn manifest_follows_function_order() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        let manifest = build_service_manifest(&ctx, "123456789012", Some(ENDPOINT));

        assert_eq!(manifest.name, "orders-api");
        assert_eq!(manifest.stage, "dev");
        assert_eq!(manifest.functions.len(), 2);
        assert_eq!(
            manifest
                .functions
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>(),
            ["create", "list"]
        );
        assert_eq!(manifest.readme, None);
    }

    #[test]
    fn function_descriptor_attributes() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        let manifest = build_service_manifest(&ctx, "123456789012", Some(ENDPOINT));

        assert_eq!(
            manifest.functions[0],
            FunctionDescriptor {
                name: "create".to_string(),
                runtime: "nodejs6.10".to_string(),
                memory: 512,
                timeout: 10,
                provider: "aws".to_string(),
                origin_id: "arn:aws:lambda:us-east-1:123456789012:function:orders-api-dev-create"
                    .to_string(),
                endpoints: vec![Endpoint {
                    method: "POST".to_string(),
                    path: "/orders".to_string(),
                    url: format!("{ENDPOINT}/orders"),
                }],
                readme: None,
            }
        );
        assert_eq!(
            manifest.functions[1].endpoints,
            [Endpoint {
                method: "GET".to_string(),
                path: String::new(),
                url: ENDPOINT.to_string(),
            }]
        );
    }

    #[test]
    fn no_endpoint_means_no_http_bindings() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());

        let manifest = build_service_manifest(&ctx, "123456789012", None);

        assert!(manifest.functions.iter().all(|f| f.endpoints.is_empty()));
    }

    #[test]
    fn trailing_slash_on_the_endpoint_is_ignored() {
        let routes = [HttpRoute {
            method: "GET".to_string(),
            path: "/orders".to_string(),
        }];
        let endpoints = function_endpoints(&routes, Some("https://example.com/dev/"));
        assert_eq!(endpoints[0].url, "https://example.com/dev/orders");
    }

    #[test]
    fn function_readme_is_attached_when_present() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("docs")).unwrap();
        std::fs::write(
            temp.path().join("docs/create.md"),
            "# Create\n\nCreates an order. ✓\n",
        )
        .unwrap();
        let ctx = context(temp.path());

        let manifest = build_service_manifest(&ctx, "123456789012", None);

        assert_eq!(
            manifest.functions[0].readme.as_deref(),
            Some("# Create\n\nCreates an order. ✓\n")
        );
        // Configured, but missing on disk.
        assert_eq!(manifest.functions[1].readme, None);
    }

    #[test]
    fn function_without_readme_path_has_no_readme() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path());
        let mut attributes = FunctionAttributes::from_context(&ctx, "create", "1").unwrap();
        attributes.readme_path = None;

        assert_eq!(build_function_descriptor(attributes, None).readme, None);
    }

    #[test]
    fn service_readme_is_attached_when_present() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("README.md"), "# Orders API\n").unwrap();
        let ctx = context(temp.path());

        let manifest = build_service_manifest(&ctx, "123456789012", None);

        assert_eq!(manifest.readme.as_deref(), Some("# Orders API\n"));
    }

    #[test]
    fn readme_name_variants() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_service_readme(temp.path()), None);

        std::fs::write(temp.path().join("README"), "plain").unwrap();
        assert_eq!(
            find_service_readme(temp.path()),
            Some(temp.path().join("README"))
        );

        std::fs::write(temp.path().join("README.markdown"), "markdown").unwrap();
        assert_eq!(
            find_service_readme(temp.path()),
            Some(temp.path().join("README.markdown"))
        );
    }

    #[test]
    fn directories_are_not_readmes() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("README.md")).unwrap();
        assert_eq!(read_readme(&temp.path().join("README.md")), None);
    }
}

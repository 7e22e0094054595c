//! The service definition (`serverless.yml`) and the deployment it describes.

use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_STAGE: &str = "dev";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_RUNTIME: &str = "nodejs6.10";
pub const DEFAULT_MEMORY_SIZE: u32 = 1024;
pub const DEFAULT_TIMEOUT: u32 = 6;

/// The parts of `serverless.yml` needed to describe a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDefinition {
    pub service: ServiceName,
    #[serde(default, deserialize_with = "null_as_default")]
    pub provider: ProviderConfig,
    /// Functions in definition order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub functions: IndexMap<String, FunctionConfig>,
}

/// `service: name` or `service: { name: name }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServiceName {
    Name(String),
    Object { name: String },
}

impl ServiceName {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceName::Name(name) | ServiceName::Object { name } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderConfig {
    pub name: String,
    pub runtime: Option<String>,
    pub memory_size: Option<u32>,
    pub timeout: Option<u32>,
    pub stage: Option<String>,
    pub region: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "aws".to_string(),
            runtime: None,
            memory_size: None,
            timeout: None,
            stage: None,
            region: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    #[serde(default)]
    pub handler: Option<String>,
    /// Overrides the generated `<service>-<stage>-<function>` name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub memory_size: Option<u32>,
    #[serde(default)]
    pub timeout: Option<u32>,
    /// Path to a readme, relative to the service directory.
    #[serde(default)]
    pub readme: Option<PathBuf>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<FunctionEvent>,
}

/// A single entry of a function's `events`. Only `http` events matter here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FunctionEvent {
    #[serde(default)]
    pub http: Option<HttpEvent>,
}

/// `http: GET users/{id}` or `http: { method: get, path: users/{id} }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum HttpEvent {
    Shorthand(String),
    Detailed { method: String, path: String },
}

/// A normalized HTTP route of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRoute {
    /// Upper-cased method.
    pub method: String,
    /// Either empty or a `/`-prefixed path without empty segments.
    pub path: String,
}

impl HttpEvent {
    pub fn route(&self) -> HttpRoute {
        let (method, path) = match self {
            HttpEvent::Shorthand(raw) => {
                let mut parts = raw.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some(method), Some(path)) => (method, path),
                    (Some(path), None) => ("ANY", path),
                    _ => ("ANY", ""),
                }
            }
            HttpEvent::Detailed { method, path } => (method.as_str(), path.as_str()),
        };

        HttpRoute {
            method: method.to_uppercase(),
            path: normalize_path(path),
        }
    }
}

/// `users//{id}/` becomes `/users/{id}`, `/` becomes the empty string.
pub fn normalize_path(path: &str) -> String {
    let segments = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>();
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ServiceDefinition {
    pub const CANONICAL_FILE_NAME: &'static str = "serverless.yml";

    pub fn parse_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read file: '{}'", path.display()))?;
        Self::parse_yaml(&raw)
            .with_context(|| format!("Could not parse service definition: '{}'", path.display()))
    }

    pub fn name(&self) -> &str {
        self.service.as_str()
    }
}

/// Everything known about a completed deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContext {
    pub service: ServiceDefinition,
    pub stage: String,
    pub region: String,
    /// Directory containing the service definition.
    pub service_path: PathBuf,
}

impl DeployContext {
    /// Resolve stage and region: explicit value, then the provider's, then the default.
    pub fn new(
        service: ServiceDefinition,
        stage: Option<String>,
        region: Option<String>,
        service_path: PathBuf,
    ) -> Self {
        let stage = stage
            .or_else(|| service.provider.stage.clone())
            .unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let region = region
            .or_else(|| service.provider.region.clone())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        Self {
            service,
            stage,
            region,
            service_path,
        }
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn provider_name(&self) -> &str {
        &self.service.provider.name
    }

    /// Name of the CloudFormation stack holding the deployment.
    pub fn stack_name(&self) -> String {
        format!("{}-{}", self.service_name(), self.stage)
    }

    /// Function keys in definition order.
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.service.functions.keys().map(String::as_str)
    }

    pub fn function(&self, key: &str) -> Option<&FunctionConfig> {
        self.service.functions.get(key)
    }

    pub fn runtime(&self, function: &FunctionConfig) -> String {
        function
            .runtime
            .clone()
            .or_else(|| self.service.provider.runtime.clone())
            .unwrap_or_else(|| DEFAULT_RUNTIME.to_string())
    }

    pub fn memory_size(&self, function: &FunctionConfig) -> u32 {
        function
            .memory_size
            .or(self.service.provider.memory_size)
            .unwrap_or(DEFAULT_MEMORY_SIZE)
    }

    pub fn timeout(&self, function: &FunctionConfig) -> u32 {
        function
            .timeout
            .or(self.service.provider.timeout)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// The name the function is deployed under.
    pub fn deployed_name(&self, key: &str, function: &FunctionConfig) -> String {
        match &function.name {
            Some(name) => name.clone(),
            None => format!("{}-{}-{}", self.service_name(), self.stage, key),
        }
    }

    /// ARN of a deployed function.
    pub fn function_arn(&self, account_id: &str, deployed_name: &str) -> String {
        format!(
            "arn:aws:lambda:{}:{}:function:{}",
            self.region, account_id, deployed_name
        )
    }

    /// Resolve a path from the service definition against the service directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.service_path.join(path)
        }
    }
}

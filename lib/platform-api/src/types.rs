use serde::{Deserialize, Serialize};

/// The document describing a deployed service, sent to the platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceManifest {
    /// The service name.
    pub name: String,
    /// The deployment stage (e.g. `dev`).
    pub stage: String,
    /// One record per deployed function, in definition order.
    pub functions: Vec<FunctionDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

/// Identity and runtime attributes of a single deployed function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    pub name: String,
    pub runtime: String,
    /// Memory size in megabytes.
    pub memory: u32,
    /// Timeout in seconds.
    pub timeout: u32,
    /// Name of the cloud provider (e.g. `aws`).
    pub provider: String,
    /// Fully qualified resource identifier of the live function.
    pub origin_id: String,
    pub endpoints: Vec<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
}

/// An HTTP binding of a function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Normalized path, either empty or starting with `/`.
    pub path: String,
    /// The service endpoint joined with [`Self::path`].
    pub url: String,
}

/// Data returned by the platform for a published service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedService {
    pub id: String,
    pub name: String,
    pub stage: String,
}

//! Service and operation definitions.

use crate::error::ClientFault;
use crate::operation::{
    parse_header_list, DefaultResponse, ResponseBody, DEFAULT_CONTENT_TYPE, DEFAULT_STATUS_CODE,
};
use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Protocol a mocked service speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ServiceType {
    #[serde(rename = "SOAP")]
    Soap,
    #[serde(rename = "REST")]
    Rest,
}

impl ServiceType {
    /// Name as used in configuration and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Soap => "SOAP",
            ServiceType::Rest => "REST",
        }
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SOAP" => Ok(ServiceType::Soap),
            "REST" => Ok(ServiceType::Rest),
            _ => Err(format!("Unknown service type: {s}")),
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    /// REST only: accept multi-segment resource paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_resource_paths: Option<bool>,
    #[serde(default)]
    pub operations: Vec<OperationConfig>,
}

impl ServiceConfig {
    pub fn resource_paths_enabled(&self) -> bool {
        self.enable_resource_paths.unwrap_or(false)
    }
}

/// Default response headers, either `"K:V,K2:V2"` or a YAML map
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HeaderSpec {
    List(String),
    Map(BTreeMap<String, String>),
}

impl Default for HeaderSpec {
    fn default() -> Self {
        HeaderSpec::Map(BTreeMap::new())
    }
}

impl HeaderSpec {
    pub fn to_map(&self) -> Result<HashMap<String, String>, ClientFault> {
        match self {
            HeaderSpec::List(list) => parse_header_list(list),
            HeaderSpec::Map(map) => Ok(map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    /// SOAP request element name, or HTTP method for REST services
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_response: Option<String>,
    /// Relative paths resolve against the configuration file's directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_response_file: Option<PathBuf>,
    #[serde(default = "default_response_code")]
    pub default_response_code: u16,
    #[serde(default = "default_response_content_type")]
    pub default_response_content_type: String,
    #[serde(default)]
    pub default_response_headers: HeaderSpec,
    /// SOAP only: comma-separated namespace allow-list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<String>,
    /// Serve `default_response_file` as raw bytes
    #[serde(default)]
    pub binary: bool,
}

fn default_response_code() -> u16 {
    DEFAULT_STATUS_CODE
}

fn default_response_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl OperationConfig {
    /// Build the operation's default response, reading the response file if
    /// one is configured.
    pub fn load_default_response(&self, base_dir: &Path) -> Result<DefaultResponse, anyhow::Error> {
        let headers = self
            .default_response_headers
            .to_map()
            .with_context(|| format!("Operation '{}'", self.name))?;

        let (body, file_name) = match (&self.default_response, &self.default_response_file) {
            (Some(text), _) => (ResponseBody::Text(text.clone()), None),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                let body = if self.binary {
                    let bytes = std::fs::read(&path).with_context(|| {
                        format!("Failed to read response file {}", path.display())
                    })?;
                    ResponseBody::Binary(Bytes::from(bytes))
                } else {
                    let text = std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read response file {}", path.display())
                    })?;
                    ResponseBody::Text(text)
                };
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned());
                (body, file_name)
            }
            (None, None) => (ResponseBody::Empty, None),
        };

        Ok(DefaultResponse {
            body,
            status_code: self.default_response_code,
            content_type: self.default_response_content_type.clone(),
            headers,
            file_name,
        })
    }
}

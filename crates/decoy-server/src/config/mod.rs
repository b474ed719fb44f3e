//! Configuration types for the Decoy mock server.

mod server;
mod service;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

pub use server::ServerConfig;
pub use service::{HeaderSpec, OperationConfig, ServiceConfig, ServiceType};

use crate::identify::{is_rest_method, rest_operation_key};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
    /// Directory relative response files are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        info!(
            path = %path.display(),
            services = config.services.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Parse and validate YAML. Relative paths resolve against the working directory.
    pub fn from_yaml(contents: &str) -> Result<Self, anyhow::Error> {
        let mut config: Config = serde_yaml::from_str(contents)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Upper-case REST operation names so they match request methods
    fn normalize(&mut self) {
        for service in &mut self.services {
            if service.service_type == ServiceType::Rest {
                for operation in &mut service.operations {
                    operation.name = rest_operation_key(&operation.name);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut service_names = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                anyhow::bail!("Service name must not be empty");
            }
            if !service_names.insert(service.name.as_str()) {
                anyhow::bail!("Duplicate service name: '{}'", service.name);
            }
            if service.service_type == ServiceType::Soap && service.enable_resource_paths.is_some() {
                anyhow::bail!(
                    "Service '{}': enableResourcePaths is only supported on REST services",
                    service.name
                );
            }
            Self::validate_operations(service)?;
        }
        Ok(())
    }

    fn validate_operations(service: &ServiceConfig) -> Result<(), anyhow::Error> {
        let mut operation_names = HashSet::new();
        for operation in &service.operations {
            if operation.name.trim().is_empty() {
                anyhow::bail!("Service '{}': operation name must not be empty", service.name);
            }
            if !operation_names.insert(operation.name.as_str()) {
                anyhow::bail!(
                    "Service '{}': duplicate operation '{}'",
                    service.name,
                    operation.name
                );
            }
            if service.service_type == ServiceType::Rest && !is_rest_method(&operation.name) {
                anyhow::bail!(
                    "Service '{}': REST operation '{}' must be one of GET, POST, PUT, DELETE",
                    service.name,
                    operation.name
                );
            }
            if operation.default_response.is_some() && operation.default_response_file.is_some() {
                anyhow::bail!(
                    "Operation '{}/{}': defaultResponse and defaultResponseFile are mutually exclusive",
                    service.name,
                    operation.name
                );
            }
            if operation.binary && operation.default_response_file.is_none() {
                anyhow::bail!(
                    "Operation '{}/{}': binary responses require defaultResponseFile",
                    service.name,
                    operation.name
                );
            }
            if service.service_type == ServiceType::Rest && operation.namespaces.is_some() {
                anyhow::bail!(
                    "Operation '{}/{}': namespaces are only supported on SOAP services",
                    service.name,
                    operation.name
                );
            }
            operation
                .default_response_headers
                .to_map()
                .with_context(|| format!("Operation '{}/{}'", service.name, operation.name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const SAMPLE: &str = r#"
server:
  host: 127.0.0.1
  port: 9090
services:
  - name: hello-soap
    type: SOAP
    operations:
      - name: sayHello
        defaultResponse: "<hello/>"
        defaultResponseHeaders: "X-A:1,X-B:2"
        namespaces: "urn:examples:helloservice"
  - name: dummy-rest
    type: REST
    enableResourcePaths: true
    operations:
      - name: get
        defaultResponse: "<get_response/>"
        defaultResponseCode: 201
        defaultResponseContentType: application/xml
        defaultResponseHeaders:
          Header1: Value1
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.services.len(), 2);

        let soap = &config.services[0];
        assert_eq!(soap.service_type, ServiceType::Soap);
        assert_eq!(soap.operations[0].default_response_code, 200);
        assert_eq!(soap.operations[0].default_response_content_type, "text/xml");
        assert_eq!(
            soap.operations[0].default_response_headers,
            HeaderSpec::List("X-A:1,X-B:2".to_string())
        );

        let rest = &config.services[1];
        assert!(rest.resource_paths_enabled());
        assert_eq!(rest.operations[0].name, "GET");
        assert_eq!(rest.operations[0].default_response_code, 201);
        let headers = rest.operations[0].default_response_headers.to_map().unwrap();
        assert_eq!(headers["Header1"], "Value1");
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = Config::from_yaml("services: []").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.socket_addr().is_ok());
    }

    #[test]
    fn test_invalid_host_rejected() {
        let server = ServerConfig {
            host: "not an ip".to_string(),
            port: 1,
        };
        assert!(server.socket_addr().is_err());
    }

    fn rejects(yaml: &str, needle: &str) {
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(
            format!("{err:#}").contains(needle),
            "expected '{needle}' in '{err:#}'"
        );
    }

    #[test]
    fn test_duplicate_service_rejected() {
        rejects(
            "services:\n  - {name: a, type: SOAP}\n  - {name: a, type: REST}\n",
            "Duplicate service name",
        );
    }

    #[test]
    fn test_duplicate_operation_rejected() {
        rejects(
            "services:\n  - name: a\n    type: REST\n    operations:\n      - {name: get}\n      - {name: GET}\n",
            "duplicate operation",
        );
    }

    #[test]
    fn test_rest_operation_must_be_method() {
        rejects(
            "services:\n  - name: a\n    type: REST\n    operations:\n      - {name: PATCH}\n",
            "must be one of",
        );
    }

    #[test]
    fn test_inline_and_file_are_exclusive() {
        rejects(
            "services:\n  - name: a\n    type: SOAP\n    operations:\n      - {name: op, defaultResponse: x, defaultResponseFile: y.xml}\n",
            "mutually exclusive",
        );
    }

    #[test]
    fn test_binary_requires_file() {
        rejects(
            "services:\n  - name: a\n    type: REST\n    operations:\n      - {name: GET, binary: true}\n",
            "require defaultResponseFile",
        );
    }

    #[test]
    fn test_namespaces_only_on_soap() {
        rejects(
            "services:\n  - name: a\n    type: REST\n    operations:\n      - {name: GET, namespaces: 'urn:a'}\n",
            "only supported on SOAP",
        );
    }

    #[test]
    fn test_resource_paths_only_on_rest() {
        rejects(
            "services:\n  - {name: a, type: SOAP, enableResourcePaths: true}\n",
            "only supported on REST",
        );
    }

    #[test]
    fn test_bad_header_list_rejected() {
        rejects(
            "services:\n  - name: a\n    type: SOAP\n    operations:\n      - {name: op, defaultResponseHeaders: 'broken'}\n",
            "Invalid header definition",
        );
    }

    #[test]
    fn test_unknown_service_type_rejected() {
        assert!(Config::from_yaml("services:\n  - {name: a, type: GRPC}\n").is_err());
    }

    #[test]
    fn test_from_file_resolves_response_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hello.xml"), "<hello>from file</hello>").unwrap();
        std::fs::write(dir.path().join("image.gif"), [0x47u8, 0x49, 0x46, 0x00, 0xff]).unwrap();
        let config_path = dir.path().join("decoy.yaml");
        std::fs::write(
            &config_path,
            r#"
services:
  - name: hello-soap
    type: SOAP
    operations:
      - name: sayHello
        defaultResponseFile: hello.xml
  - name: images
    type: REST
    operations:
      - name: GET
        defaultResponseFile: image.gif
        defaultResponseContentType: image/gif
        binary: true
"#,
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.base_dir, dir.path());

        let text = config.services[0].operations[0]
            .load_default_response(&config.base_dir)
            .unwrap();
        assert_eq!(text.body.as_text(), Some("<hello>from file</hello>"));
        assert!(!text.is_binary());

        let binary = config.services[1].operations[0]
            .load_default_response(&config.base_dir)
            .unwrap();
        assert!(binary.is_binary());
        assert_eq!(binary.body.len(), 5);
        assert_eq!(binary.file_name.as_deref(), Some("image.gif"));
        assert_eq!(binary.content_type, "image/gif");
    }

    #[test]
    fn test_missing_response_file_reported() {
        let dir = TempDir::new().unwrap();
        let operation: OperationConfig =
            serde_yaml::from_str("{name: op, defaultResponseFile: missing.xml}").unwrap();
        let err = operation.load_default_response(dir.path()).unwrap_err();
        assert!(err.to_string().contains("missing.xml"));
    }

    #[test]
    fn test_from_file_reports_yaml_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "services: [unclosed").unwrap();
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_missing_file_reported() {
        assert!(Config::from_file("/nonexistent/decoy.yaml").is_err());
    }
}

//! Namespace allow-list for SOAP operations.

use crate::error::ClientFault;
use std::fmt;

/// Sorted allow-list of request element namespaces.
///
/// An empty list disables validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRules {
    allowed: Vec<String>,
}

impl NamespaceRules {
    /// Parse a comma-separated list such as `urn:a,urn:b`.
    pub fn parse(list: &str) -> Self {
        let mut allowed: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string)
            .collect();
        allowed.sort();
        allowed.dedup();
        Self { allowed }
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Check the namespace URI of a request element against the list.
    pub fn validate(&self, namespace: Option<&str>) -> Result<(), ClientFault> {
        if self.allowed.is_empty() {
            return Ok(());
        }
        let namespace = match namespace {
            Some(ns) if !ns.is_empty() => ns,
            _ => return Err(ClientFault::MissingNamespace),
        };
        if self.allowed.iter().any(|allowed| allowed == namespace) {
            Ok(())
        } else {
            Err(ClientFault::NamespaceMismatch)
        }
    }
}

impl fmt::Display for NamespaceRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.allowed.join(","))
    }
}

//! Node endpoint registry
//!
//! Provisioning is an external collaborator; the harness only sees the set
//! of reachable endpoints it produced, keyed by stable node id.

use crate::error::{DispatchError, Result, TransportError};
use sensegrid_core::Topology;
use std::collections::HashMap;

/// A single node's remote address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: String,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a service path, e.g. `url("/query")`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Node id → endpoint mapping for one run
#[derive(Debug, Clone, Default)]
pub struct EndpointMap {
    endpoints: HashMap<String, Endpoint>,
}

impl EndpointMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: impl Into<String>, base_url: impl Into<String>) {
        self.endpoints.insert(node_id.into(), Endpoint::new(base_url));
    }

    pub fn get(&self, node_id: &str) -> Option<&Endpoint> {
        self.endpoints.get(node_id)
    }

    /// Lookup that surfaces an unknown node as a transport error
    pub fn require(&self, node_id: &str) -> std::result::Result<&Endpoint, TransportError> {
        self.endpoints
            .get(node_id)
            .ok_or_else(|| TransportError::UnknownNode(node_id.to_string()))
    }

    /// Verify every topology node has an endpoint
    ///
    /// A node without an address cannot receive any unit of work, so this
    /// is the one fatal configuration check before dispatch starts.
    pub fn validate_for(&self, topology: &Topology) -> Result<()> {
        for node_id in topology.node_ids() {
            if !self.endpoints.contains_key(node_id) {
                return Err(DispatchError::MissingEndpoint(node_id.to_string()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Endpoint)> {
        self.endpoints.iter().map(|(id, ep)| (id.as_str(), ep))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensegrid_core::{build_topology, NodeRecord, NodeType};

    #[test]
    fn test_endpoint_url_joining() {
        let ep = Endpoint::new("http://10.0.0.5:5000/");
        assert_eq!(ep.base_url(), "http://10.0.0.5:5000");
        assert_eq!(ep.url("/query"), "http://10.0.0.5:5000/query");
    }

    #[test]
    fn test_require_unknown_node() {
        let map = EndpointMap::new();
        let err = map.require("ghost").unwrap_err();
        assert!(matches!(err, TransportError::UnknownNode(id) if id == "ghost"));
    }

    #[test]
    fn test_validate_for_topology() {
        let topology = build_topology(vec![
            NodeRecord::new("n1", NodeType::Highway, Default::default()),
            NodeRecord::new("n2", NodeType::Default, Default::default()),
        ]);

        let mut map = EndpointMap::new();
        map.insert("n1", "http://localhost:5001");

        let err = map.validate_for(&topology).unwrap_err();
        assert!(matches!(err, DispatchError::MissingEndpoint(id) if id == "n2"));

        map.insert("n2", "http://localhost:5002");
        assert!(map.validate_for(&topology).is_ok());
    }
}

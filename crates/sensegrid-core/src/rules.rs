//! Static edge-rule policy
//!
//! Maps a node's type to the edge specifications it emits toward every
//! other node. The table is total: unknown node types resolve to the
//! fallback row at deserialization time, so lookup can never fail.

use crate::types::{EdgeSpec, NodeType, OneOrMany};

/// Edge specifications for a node type
pub fn rules_for(node_type: NodeType) -> OneOrMany<EdgeSpec> {
    match node_type {
        NodeType::Highway => OneOrMany::One(EdgeSpec::new("emergency", &["emergency_cars"])),
        NodeType::TrainDetector => {
            OneOrMany::One(EdgeSpec::new("train_alert", &["train_detection"]))
        }
        NodeType::SmallCrossroad => OneOrMany::Many(vec![
            EdgeSpec::new("emergency", &["emergency_cars"]),
            EdgeSpec::new("CO2", &["CO2"]),
        ]),
        NodeType::Default => OneOrMany::One(EdgeSpec::new("default_edge", &[])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highway_rule() {
        let rules = rules_for(NodeType::Highway);
        assert_eq!(
            rules.as_slice(),
            &[EdgeSpec::new("emergency", &["emergency_cars"])]
        );
    }

    #[test]
    fn test_train_detector_rule() {
        let rules = rules_for(NodeType::TrainDetector);
        assert_eq!(
            rules.as_slice(),
            &[EdgeSpec::new("train_alert", &["train_detection"])]
        );
    }

    #[test]
    fn test_small_crossroad_emits_two_specs() {
        let rules = rules_for(NodeType::SmallCrossroad);
        assert_eq!(
            rules.as_slice(),
            &[
                EdgeSpec::new("emergency", &["emergency_cars"]),
                EdgeSpec::new("CO2", &["CO2"]),
            ]
        );
    }

    #[test]
    fn test_fallback_rule() {
        let rules = rules_for(NodeType::Default);
        assert_eq!(rules.as_slice(), &[EdgeSpec::new("default_edge", &[])]);
        assert!(rules.as_slice()[0].data_fields.is_empty());
    }

    #[test]
    fn test_unknown_type_string_hits_fallback() {
        // Unknown strings deserialize to NodeType::Default, which resolves
        // to the fallback row rather than an error.
        let t: NodeType = serde_json::from_str("\"weather_balloon\"").unwrap();
        let rules = rules_for(t);
        assert_eq!(rules.as_slice(), &[EdgeSpec::new("default_edge", &[])]);
    }
}

//! Core data types for the SenseGrid sensor network

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier of a simulated node
pub type NodeId = String;

/// A single telemetry field value
///
/// Serialized untagged so records look like plain JSON objects on the wire
/// (`{"emergency_cars": true, "CO2": 412.73}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Boolean flag
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Text(String),
    /// Absent or unsupported value
    Null,
}

impl FieldValue {
    /// Get the type name of this field value
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::Null => "null",
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to convert to i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Try to convert to f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Compare two values of compatible types
    ///
    /// Integers and floats compare numerically against each other; strings
    /// and booleans only compare against their own kind. Incompatible or
    /// null operands yield `None`.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            _ => {
                let a = self.as_f64()?;
                let b = other.as_f64()?;
                a.partial_cmp(&b)
            }
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

/// Node types recognized by the edge-rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Highway,
    TrainDetector,
    SmallCrossroad,
    Default,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Highway => "highway",
            NodeType::TrainDetector => "train_detector",
            NodeType::SmallCrossroad => "small_crossroad",
            NodeType::Default => "default",
        }
    }

    /// Derive the node type from a schema title
    ///
    /// Case-insensitive substring match: "highway" wins over "train" wins
    /// over "small"; anything else is `Default`.
    pub fn from_title(title: &str) -> Self {
        let title = title.to_lowercase();
        if title.contains("highway") {
            NodeType::Highway
        } else if title.contains("train") {
            NodeType::TrainDetector
        } else if title.contains("small") {
            NodeType::SmallCrossroad
        } else {
            NodeType::Default
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Unknown type strings resolve to Default so rule lookup stays total.
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "highway" => NodeType::Highway,
            "train_detector" => NodeType::TrainDetector,
            "small_crossroad" => NodeType::SmallCrossroad,
            _ => NodeType::Default,
        })
    }
}

/// One simulated node: identity, type, and generated telemetry fields
///
/// Created once at simulation start; immutable thereafter. Fields are
/// flattened on the wire so a record serializes to the flat JSON object the
/// node service ingests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(flatten)]
    pub fields: IndexMap<String, FieldValue>,
}

impl NodeRecord {
    pub fn new(
        id: impl Into<NodeId>,
        node_type: NodeType,
        fields: IndexMap<String, FieldValue>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            fields,
        }
    }

    /// Look up a telemetry field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// One outgoing-edge specification from the rule table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    #[serde(rename = "type")]
    pub edge_type: String,
    pub data_fields: Vec<String>,
}

impl EdgeSpec {
    pub fn new(edge_type: impl Into<String>, data_fields: &[&str]) -> Self {
        Self {
            edge_type: edge_type.into(),
            data_fields: data_fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

/// A single spec or an ordered list of specs
///
/// The rule table maps some node types to one spec and others to several;
/// this variant makes that shape explicit while callers always iterate a
/// slice. Untagged serde keeps the original single-or-list config shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item),
            OneOrMany::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

/// A computed directed edge carrying a subset of the source's fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub edge_type: String,
    pub data_fields: IndexMap<String, FieldValue>,
}

/// Immutable node + edge snapshot for one simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<Edge>,
    /// ISO-8601 generation timestamp
    pub generated_at: DateTime<Utc>,
}

impl Topology {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterate node ids in topology order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_untagged_serde() {
        let values = vec![
            (FieldValue::Boolean(true), "true"),
            (FieldValue::Integer(42), "42"),
            (FieldValue::Float(3.25), "3.25"),
            (FieldValue::Text("example".to_string()), "\"example\""),
            (FieldValue::Null, "null"),
        ];

        for (value, expected) in values {
            let json = serde_json::to_string(&value).unwrap();
            assert_eq!(json, expected);
            let back: FieldValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, value);
        }
    }

    #[test]
    fn test_field_value_compare() {
        use std::cmp::Ordering;

        assert_eq!(
            FieldValue::Integer(5).compare(&FieldValue::Float(5.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            FieldValue::Float(1.5).compare(&FieldValue::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            FieldValue::Text("b".to_string()).compare(&FieldValue::Text("a".to_string())),
            Some(Ordering::Greater)
        );
        assert_eq!(
            FieldValue::Boolean(true).compare(&FieldValue::Boolean(true)),
            Some(Ordering::Equal)
        );

        // Incompatible kinds do not compare
        assert_eq!(
            FieldValue::Text("1".to_string()).compare(&FieldValue::Integer(1)),
            None
        );
        assert_eq!(FieldValue::Null.compare(&FieldValue::Integer(1)), None);
    }

    #[test]
    fn test_node_type_from_title() {
        assert_eq!(NodeType::from_title("Highway Sensor"), NodeType::Highway);
        assert_eq!(NodeType::from_title("TRAIN detector v2"), NodeType::TrainDetector);
        assert_eq!(NodeType::from_title("Small Crossroad"), NodeType::SmallCrossroad);
        assert_eq!(NodeType::from_title("weather station"), NodeType::Default);
        assert_eq!(NodeType::from_title(""), NodeType::Default);
    }

    #[test]
    fn test_node_type_unknown_string_deserializes_to_default() {
        let t: NodeType = serde_json::from_str("\"highway\"").unwrap();
        assert_eq!(t, NodeType::Highway);

        let t: NodeType = serde_json::from_str("\"made_up_type\"").unwrap();
        assert_eq!(t, NodeType::Default);
    }

    #[test]
    fn test_node_record_flat_wire_shape() {
        let mut fields = IndexMap::new();
        fields.insert("emergency_cars".to_string(), FieldValue::Boolean(true));
        fields.insert("CO2".to_string(), FieldValue::Float(410.5));
        let record = NodeRecord::new("Node1", NodeType::Highway, fields);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "Node1");
        assert_eq!(json["type"], "highway");
        assert_eq!(json["emergency_cars"], true);
        assert_eq!(json["CO2"], 410.5);

        let back: NodeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_one_or_many_serde_shapes() {
        let one: OneOrMany<EdgeSpec> =
            OneOrMany::One(EdgeSpec::new("emergency", &["emergency_cars"]));
        let json = serde_json::to_value(&one).unwrap();
        assert!(json.is_object());

        let many: OneOrMany<EdgeSpec> = OneOrMany::Many(vec![
            EdgeSpec::new("emergency", &["emergency_cars"]),
            EdgeSpec::new("CO2", &["CO2"]),
        ]);
        let json = serde_json::to_value(&many).unwrap();
        assert!(json.is_array());

        let back: OneOrMany<EdgeSpec> = serde_json::from_value(json).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_one_or_many_iteration() {
        let one = OneOrMany::One(1);
        assert_eq!(one.iter().copied().collect::<Vec<_>>(), vec![1]);

        let many = OneOrMany::Many(vec![1, 2, 3]);
        assert_eq!(many.len(), 3);
        assert_eq!((&many).into_iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}

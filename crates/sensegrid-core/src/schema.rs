//! Declarative field schemas and synthetic telemetry generation
//!
//! A schema is a JSON document with a `title` (drives node-type detection)
//! and a `properties` map from field name to a type tag plus optional
//! numeric bounds. Property order is preserved so a fixed seed and a fixed
//! clock replay the exact same record.

use crate::error::{Result, SchemaError};
use crate::types::{FieldValue, NodeType};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rand::Rng;
use serde::Deserialize;
use std::path::Path;

/// Meta-keys that may appear in `properties` but never generate a field.
const META_KEYS: &[&str] = &["$schema", "title"];

/// Field name that receives the current wall-clock time instead of a
/// placeholder string.
const TIMESTAMP_FIELD: &str = "timestamp";

/// A declarative telemetry schema for one node
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSchema {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub properties: IndexMap<String, FieldSpec>,
}

/// One declared field: type tag plus optional bounds for numeric types
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
}

impl FieldSchema {
    /// Parse a schema from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a schema from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Node type derived from the schema title
    pub fn node_type(&self) -> NodeType {
        NodeType::from_title(&self.title)
    }

    /// Declared field names, excluding reserved meta-keys
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .keys()
            .map(String::as_str)
            .filter(|name| !META_KEYS.contains(name))
    }
}

/// Generate one synthetic telemetry record from a schema
///
/// The RNG and the clock are the only external inputs; injecting both makes
/// generation reproducible. Unrecognized type tags degrade to
/// `FieldValue::Null` rather than failing.
pub fn generate_fields<R: Rng>(
    schema: &FieldSchema,
    rng: &mut R,
    now: DateTime<Utc>,
) -> IndexMap<String, FieldValue> {
    let mut fields = IndexMap::with_capacity(schema.properties.len());

    for (name, spec) in &schema.properties {
        if META_KEYS.contains(&name.as_str()) {
            continue;
        }

        let value = match spec.type_tag.as_deref() {
            Some("boolean") => FieldValue::Boolean(rng.gen()),
            Some("integer") => {
                let lo = spec.minimum.map_or(0, |m| m as i64);
                let hi = spec.maximum.map_or(100, |m| m as i64).max(lo);
                FieldValue::Integer(rng.gen_range(lo..=hi))
            }
            Some("number") => {
                let lo = spec.minimum.unwrap_or(0.0);
                let hi = spec.maximum.unwrap_or(1000.0).max(lo);
                let v: f64 = rng.gen_range(lo..=hi);
                FieldValue::Float((v * 100.0).round() / 100.0)
            }
            Some("string") if name == TIMESTAMP_FIELD => {
                FieldValue::Text(now.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Some("string") => FieldValue::Text("example".to_string()),
            _ => FieldValue::Null,
        };

        fields.insert(name.clone(), value);
    }

    fields
}

//! Wire contract between the dispatch harness and node endpoints
//!
//! Four remote operations exist: ingest telemetry, ingest edge, run query,
//! health check. Query expressions are structured predicates bound at the
//! boundary; no query text is ever assembled by string concatenation.

use crate::types::{Edge, FieldValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote operation outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::Error => write!(f, "error"),
        }
    }
}

/// Acknowledgment returned by ingest operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub status: Status,
    pub message: String,
}

impl Ack {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// Comparison operator of a query predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Field is present and non-null; ignores `value`
    Exists,
}

impl QueryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOp::Eq => "eq",
            QueryOp::Ne => "ne",
            QueryOp::Gt => "gt",
            QueryOp::Gte => "gte",
            QueryOp::Lt => "lt",
            QueryOp::Lte => "lte",
            QueryOp::Exists => "exists",
        }
    }
}

/// A parameter-bound query predicate
///
/// Forwarded verbatim by the harness to every (source, target) pair; the
/// node side evaluates it against stored telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryExpr {
    pub field: String,
    pub op: QueryOp,
    #[serde(default)]
    pub value: FieldValue,
}

impl QueryExpr {
    pub fn new(field: impl Into<String>, op: QueryOp, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            QueryOp::Exists => write!(f, "{} exists", self.field),
            _ => write!(
                f,
                "{} {} {}",
                self.field,
                self.op.as_str(),
                serde_json::to_string(&self.value).unwrap_or_else(|_| "null".to_string())
            ),
        }
    }
}

impl FromStr for QueryExpr {
    type Err = String;

    /// Parse the operator-facing form `FIELD OP [VALUE]`, e.g.
    /// `emergency_cars eq true` or `timestamp exists`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let field = parts
            .next()
            .ok_or_else(|| "empty query expression".to_string())?;
        let op_str = parts
            .next()
            .ok_or_else(|| format!("query expression '{}' is missing an operator", s))?;

        let op = match op_str {
            "eq" | "==" => QueryOp::Eq,
            "ne" | "!=" => QueryOp::Ne,
            "gt" | ">" => QueryOp::Gt,
            "gte" | ">=" => QueryOp::Gte,
            "lt" | "<" => QueryOp::Lt,
            "lte" | "<=" => QueryOp::Lte,
            "exists" => QueryOp::Exists,
            other => return Err(format!("unknown query operator '{}'", other)),
        };

        let rest: Vec<&str> = parts.collect();
        let value = if rest.is_empty() {
            if op != QueryOp::Exists {
                return Err(format!("operator '{}' requires a value", op_str));
            }
            FieldValue::Null
        } else {
            let raw = rest.join(" ");
            // Bare words read as strings; everything else as JSON.
            serde_json::from_str(&raw).unwrap_or(FieldValue::Text(raw))
        };

        Ok(QueryExpr::new(field, op, value))
    }
}

/// Body of the node `/query` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub expression: QueryExpr,
}

/// Response of the node `/query` operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: Status,
    /// Matching rows as opaque records; empty on error
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl QueryResponse {
    pub fn success(rows: Vec<serde_json::Value>) -> Self {
        Self {
            status: Status::Success,
            rows,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            rows: Vec::new(),
            message: Some(message.into()),
        }
    }
}

/// Instruct a node to deliver an edge to a peer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEdgeRequest {
    /// Base URL of the peer that should receive the edge
    pub target: String,
    pub edge: Edge,
}

/// Instruct a node to run a query against a peer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayQueryRequest {
    /// Base URL of the peer to query
    pub target: String,
    pub expression: QueryExpr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_expr_from_str() {
        let expr: QueryExpr = "emergency_cars eq true".parse().unwrap();
        assert_eq!(expr.field, "emergency_cars");
        assert_eq!(expr.op, QueryOp::Eq);
        assert_eq!(expr.value, FieldValue::Boolean(true));

        let expr: QueryExpr = "CO2 > 400".parse().unwrap();
        assert_eq!(expr.op, QueryOp::Gt);
        assert_eq!(expr.value, FieldValue::Integer(400));

        let expr: QueryExpr = "timestamp exists".parse().unwrap();
        assert_eq!(expr.op, QueryOp::Exists);
        assert_eq!(expr.value, FieldValue::Null);

        let expr: QueryExpr = "label eq example".parse().unwrap();
        assert_eq!(expr.value, FieldValue::Text("example".to_string()));
    }

    #[test]
    fn test_query_expr_from_str_rejects_malformed() {
        assert!("".parse::<QueryExpr>().is_err());
        assert!("field".parse::<QueryExpr>().is_err());
        assert!("field between 1 2".parse::<QueryExpr>().is_err());
        assert!("field eq".parse::<QueryExpr>().is_err());
    }

    #[test]
    fn test_query_expr_wire_shape() {
        let expr = QueryExpr::new("CO2", QueryOp::Gte, FieldValue::Float(400.0));
        let json = serde_json::to_value(&expr).unwrap();
        assert_eq!(json["field"], "CO2");
        assert_eq!(json["op"], "gte");
        assert_eq!(json["value"], 400.0);

        let back: QueryExpr = serde_json::from_value(json).unwrap();
        assert_eq!(back, expr);
    }

    #[test]
    fn test_query_response_shapes() {
        let ok = QueryResponse::success(vec![serde_json::json!({"id": "Node1"})]);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert!(json.get("message").is_none());

        let err = QueryResponse::error("boom");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_ack_constructors() {
        assert!(Ack::success("stored").is_success());
        assert!(!Ack::error("nope").is_success());
    }
}

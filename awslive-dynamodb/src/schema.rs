//! Table configuration and data model

use std::collections::HashMap;
use std::fmt;

/// Position of an attribute within the table's primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Partition,
    Sort,
}

/// Scalar type tag for a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    S,
    N,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchemaEntry {
    pub attribute_name: String,
    pub role: KeyRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub attribute_name: String,
    pub scalar_type: ScalarType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Everything table creation needs: key schema, attribute definitions, and
/// provisioned throughput. Supplied once at lifecycle construction and reused
/// verbatim for the remote create call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub key_schema: Vec<KeySchemaEntry>,
    pub attributes: Vec<AttributeSpec>,
    pub throughput: Throughput,
}

impl TableSpec {
    /// Build a spec from simple named parameters: one partition key, one
    /// sort key, and read/write capacity.
    pub fn with_keys(
        partition_key_name: &str,
        partition_key_type: ScalarType,
        sort_key_name: &str,
        sort_key_type: ScalarType,
        read_capacity_units: i64,
        write_capacity_units: i64,
    ) -> Self {
        Self {
            key_schema: vec![
                KeySchemaEntry {
                    attribute_name: partition_key_name.to_string(),
                    role: KeyRole::Partition,
                },
                KeySchemaEntry {
                    attribute_name: sort_key_name.to_string(),
                    role: KeyRole::Sort,
                },
            ],
            attributes: vec![
                AttributeSpec {
                    attribute_name: partition_key_name.to_string(),
                    scalar_type: partition_key_type,
                },
                AttributeSpec {
                    attribute_name: sort_key_name.to_string(),
                    scalar_type: sort_key_type,
                },
            ],
            throughput: Throughput {
                read_capacity_units,
                write_capacity_units,
            },
        }
    }
}

impl Default for TableSpec {
    /// String partition key `string_key`, numeric sort key `numeric_key`,
    /// 1/1 capacity.
    fn default() -> Self {
        Self::with_keys("string_key", ScalarType::S, "numeric_key", ScalarType::N, 1, 1)
    }
}

/// Remote table status, as reported by the service.
///
/// `Deleted` is synthesized for a table the service no longer knows about;
/// statuses outside the recognized set are preserved in `Other` so the
/// lifecycle can refuse to act on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Updating,
    Active,
    Deleting,
    Deleted,
    Other(String),
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableStatus::Creating => "CREATING",
            TableStatus::Updating => "UPDATING",
            TableStatus::Active => "ACTIVE",
            TableStatus::Deleting => "DELETING",
            TableStatus::Deleted => "DELETED",
            TableStatus::Other(status) => status,
        })
    }
}

/// A stored item keyed by attribute name.
pub type Item = HashMap<String, AttrValue>;

/// Simplified attribute value: the scalar shapes the test tables use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    S(String),
    N(String),
    Bool(bool),
}

impl AttrValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttrValue::S(value.into())
    }

    pub fn number(value: impl ToString) -> Self {
        AttrValue::N(value.to_string())
    }

    /// The string value, if this is an S attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::S(value) => Some(value),
            _ => None,
        }
    }
}

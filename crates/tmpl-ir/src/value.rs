//! Literal values.

use crate::types::TypeName;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Value {
    Boolean {
        value: bool,
    },
    Float64 {
        #[serde(
            serialize_with = "serialize_float",
            deserialize_with = "deserialize_float"
        )]
        value: f64,
    },
    Int {
        value: i32,
    },
    Int64 {
        value: i64,
    },
    String {
        value: String,
    },
    Null,
    /// Symbols only label arguments; they never reach the target.
    Symbol {
        text: String,
    },
    Type {
        name: TypeName,
    },
    Void,
    /// A runtime object the frontend folded into a constant (a class, a
    /// closure record, a list...). Backends cannot express these.
    Opaque {
        type_tag: String,
    },
}

impl Value {
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Boolean { .. } => "Boolean",
            Value::Float64 { .. } => "Float64",
            Value::Int { .. } => "Int",
            Value::Int64 { .. } => "Int64",
            Value::String { .. } => "String",
            Value::Null => "Null",
            Value::Symbol { .. } => "Symbol",
            Value::Type { .. } => "Type",
            Value::Void => "Void",
            Value::Opaque { type_tag } => type_tag,
        }
    }
}

/// JSON has no spelling for non-finite numbers, so they travel as strings.
fn serialize_float<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        serializer.serialize_f64(*value)
    }
}

fn deserialize_float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatOrText {
        Float(f64),
        Text(String),
    }

    match FloatOrText::deserialize(deserializer)? {
        FloatOrText::Float(f) => Ok(f),
        FloatOrText::Text(text) => match text.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("not a float: {other:?}"))),
        },
    }
}

//! Reading TmpL from JSON.
//!
//! An input document is either a single module object, an array of modules,
//! or an object with a `modules` array.

use crate::tree::Module;
use serde::Deserialize;
use std::fmt;

#[derive(Debug)]
pub struct DecodeError {
    source: serde_json::Error,
}

impl DecodeError {
    pub fn line(&self) -> usize {
        self.source.line()
    }

    pub fn column(&self) -> usize {
        self.source.column()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed TmpL: {}", self.source)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(source: serde_json::Error) -> Self {
        DecodeError { source }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Many(Vec<Module>),
    Wrapped { modules: Vec<Module> },
    One(Box<Module>),
}

pub fn decode_module(text: &str) -> Result<Module, DecodeError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_modules(text: &str) -> Result<Vec<Module>, DecodeError> {
    // Untagged errors say nothing useful, so retry the likely shape for the
    // message.
    match serde_json::from_str::<Document>(text) {
        Ok(Document::Many(modules)) | Ok(Document::Wrapped { modules }) => Ok(modules),
        Ok(Document::One(module)) => Ok(vec![*module]),
        Err(untagged) => {
            let value: serde_json::Value = serde_json::from_str(text)?;
            let err = match &value {
                serde_json::Value::Array(_) => serde_json::from_value::<Vec<Module>>(value).err(),
                serde_json::Value::Object(map) if map.contains_key("modules") => {
                    serde_json::from_value::<Vec<Module>>(map["modules"].clone()).err()
                }
                _ => serde_json::from_value::<Module>(value).err(),
            };
            Err(err.unwrap_or(untagged).into())
        }
    }
}

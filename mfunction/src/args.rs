//! Typed extraction helpers over parsed argument maps.
//!
//! ```rust
//! use mfunction::required_str;
//! use mmessage::ArgumentMap;
//! use serde_json::json;
//!
//! let mut args = ArgumentMap::new();
//! args.insert("query".to_string(), json!("rust"));
//!
//! let query = required_str(&args, "query").expect("query should be present");
//! assert_eq!(query, "rust");
//! ```

use mmessage::ArgumentMap;
use serde_json::Value;

use crate::FunctionError;

pub fn required_str<'a>(args: &'a ArgumentMap, key: &str) -> Result<&'a str, FunctionError> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        FunctionError::invalid_arguments(format!("missing required string argument: '{key}'"))
    })
}

pub fn optional_str<'a>(args: &'a ArgumentMap, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

pub fn required_u64(args: &ArgumentMap, key: &str) -> Result<u64, FunctionError> {
    args.get(key).and_then(Value::as_u64).ok_or_else(|| {
        FunctionError::invalid_arguments(format!("missing required integer argument: '{key}'"))
    })
}

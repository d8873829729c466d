//! Typed access to marshaled call arguments.

use serde_json::Value;

use crate::error::{Error, Result};

/// Arguments after marshaling, in declaration order. A tool with a single
/// object parameter receives one element holding the whole argument object;
/// otherwise each declared parameter occupies its own position, with `Null`
/// standing in for absent optionals without a default.
#[derive(Debug, Clone)]
pub struct CallArgs {
    values: Vec<Value>,
}

impl CallArgs {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at a position, `Null` when out of range.
    pub fn get(&self, position: usize) -> &Value {
        self.values.get(position).unwrap_or(&Value::Null)
    }

    /// String argument at a position.
    pub fn get_str(&self, position: usize) -> Result<&str> {
        self.get(position)
            .as_str()
            .ok_or_else(|| Error::validation(format!("argument {position} is not a string")))
    }

    /// Integer argument at a position.
    pub fn get_i64(&self, position: usize) -> Result<i64> {
        self.get(position)
            .as_i64()
            .ok_or_else(|| Error::validation(format!("argument {position} is not an integer")))
    }

    /// Float argument at a position.
    pub fn get_f64(&self, position: usize) -> Result<f64> {
        self.get(position)
            .as_f64()
            .ok_or_else(|| Error::validation(format!("argument {position} is not a number")))
    }

    /// Boolean argument at a position.
    pub fn get_bool(&self, position: usize) -> Result<bool> {
        self.get(position)
            .as_bool()
            .ok_or_else(|| Error::validation(format!("argument {position} is not a boolean")))
    }

    /// Deserialize the value at a position into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self, position: usize) -> Result<T> {
        serde_json::from_value(self.get(position).clone()).map_err(|e| {
            Error::validation(format!("argument {position} failed to deserialize: {e}"))
        })
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let args = CallArgs::new(vec![json!("alpha"), json!(3), json!(true)]);
        assert_eq!(args.get_str(0).unwrap(), "alpha");
        assert_eq!(args.get_i64(1).unwrap(), 3);
        assert!(args.get_bool(2).unwrap());
        assert!(args.get_str(1).is_err());
    }

    #[test]
    fn out_of_range_position_reads_as_null() {
        let args = CallArgs::new(Vec::new());
        assert!(args.get(5).is_null());
        assert!(args.get_f64(0).is_err());
    }

    #[test]
    fn deserialize_object_argument() {
        #[derive(serde::Deserialize)]
        struct Params {
            city: String,
        }

        let args = CallArgs::new(vec![json!({ "city": "Oslo" })]);
        let params: Params = args.deserialize(0).unwrap();
        assert_eq!(params.city, "Oslo");
    }
}

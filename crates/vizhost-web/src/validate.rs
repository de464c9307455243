//! Schema validation of inbound content.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;

/// Turns raw inbound JSON into a typed payload or a formatted error.
pub trait Validator {
    type Output;

    fn validate(&self, content: &Value) -> Result<Self::Output, ValidationError>;
}

/// Validates by deserializing into `T`. Unknown fields are ignored.
pub struct JsonValidator<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonValidator<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonValidator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonValidator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonValidator")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> JsonValidator<T> {
    /// Parse and validate payload text.
    pub fn validate_str(&self, text: &str) -> Result<T, ValidationError> {
        serde_json::from_str(text).map_err(|e| ValidationError::from_serde(&e))
    }
}

impl<T: DeserializeOwned> Validator for JsonValidator<T> {
    type Output = T;

    fn validate(&self, content: &Value) -> Result<T, ValidationError> {
        T::deserialize(content).map_err(|e| ValidationError::from_serde(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TextInput;
    use serde_json::json;

    #[test]
    fn accepts_open_objects() {
        let input = JsonValidator::<TextInput>::new()
            .validate(&json!({"source": "abc", "extra": 1}))
            .unwrap();
        assert_eq!(input.source.text(), "abc");
    }

    #[test]
    fn rejects_missing_field() {
        let err = JsonValidator::<TextInput>::new()
            .validate(&json!({"fileName": "a.rs"}))
            .unwrap_err();
        assert!(err.message.contains("source"), "{err}");
    }

    #[test]
    fn text_errors_carry_location() {
        let err = JsonValidator::<TextInput>::new()
            .validate_str("{\n\"source\": 3}")
            .unwrap_err();
        assert_eq!(err.location.map(|(line, _)| line), Some(2));
    }
}

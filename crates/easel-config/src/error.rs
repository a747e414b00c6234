use thiserror::Error;

/// Failures while decoding configuration text or reading typed properties.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed configuration: {0}")]
    Malformed(String),
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{name}` expected {expected} value but found {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("`{0}` is reserved by the configuration format")]
    ReservedField(String),
}

impl CodecError {
    pub(crate) fn mismatch(name: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        CodecError::TypeMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, CodecError::Malformed(_))
    }
}

use thiserror::Error;

/// Top-level error type for the ClinVox system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates convert
/// into `ClinVoxError` so the `?` operator works across crate boundaries.
/// Note that safety warnings are NOT errors: a warning is a first-class
/// outcome that pauses an order, never a failure path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClinVoxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ClinVoxError {
    fn from(err: toml::de::Error) -> Self {
        ClinVoxError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ClinVoxError {
    fn from(err: toml::ser::Error) -> Self {
        ClinVoxError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ClinVoxError {
    fn from(err: serde_json::Error) -> Self {
        ClinVoxError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for ClinVox operations.
pub type Result<T> = std::result::Result<T, ClinVoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClinVoxError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");

        let err = ClinVoxError::Catalog("unknown key".to_string());
        assert_eq!(err.to_string(), "Catalog error: unknown key");

        let err = ClinVoxError::Storage("disk full".to_string());
        assert_eq!(err.to_string(), "Storage error: disk full");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ClinVoxError = io_err.into();
        assert!(matches!(err, ClinVoxError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let bad_json = "{ invalid json }";
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        let err: ClinVoxError = parse.unwrap_err().into();
        assert!(matches!(err, ClinVoxError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let bad_toml = "invalid = [[[";
        let parse: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        let err: ClinVoxError = parse.unwrap_err().into();
        assert!(matches!(err, ClinVoxError::Config(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }
}

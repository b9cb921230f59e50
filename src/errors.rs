use thiserror::Error;

/// A request parameter that failed validation. Only the first failing
/// parameter of a request is ever reported.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("{field} parameter is missing")]
    MissingParameter { field: &'static str },

    #[error("{field} parameter must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{field} parameter must not be empty")]
    EmptyParameter { field: &'static str },

    #[error("{field} parameter is not valid JSON: {reason}")]
    InvalidContent { field: &'static str, reason: String },
}

impl RequestError {
    /// Name of the offending parameter
    pub fn field(&self) -> &'static str {
        match self {
            RequestError::MissingParameter { field }
            | RequestError::InvalidType { field, .. }
            | RequestError::EmptyParameter { field }
            | RequestError::InvalidContent { field, .. } => field,
        }
    }
}

pub type RequestResult<T> = Result<T, RequestError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = RequestError::MissingParameter { field: "to" };
        assert_eq!(err.to_string(), "to parameter is missing");
        assert_eq!(err.field(), "to");

        let err = RequestError::InvalidType {
            field: "resourceType",
            expected: "an integer number",
        };
        assert_eq!(
            err.to_string(),
            "resourceType parameter must be an integer number"
        );

        let err = RequestError::EmptyParameter {
            field: "requestIdentifier",
        };
        assert_eq!(
            err.to_string(),
            "requestIdentifier parameter must not be empty"
        );
    }
}

use std::fmt::{self, Debug, Display, Formatter};
use std::io;

/// The error type returned by fallible operations in this crate.
///
/// External failures (file IO, serialization) wrap their source error;
/// rule violations detected by the simulation itself carry a message in
/// the `OutbreakError` variant.
#[allow(clippy::module_name_repetitions)]
pub enum OutbreakError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
    OutbreakError(String),
}

impl From<io::Error> for OutbreakError {
    fn from(error: io::Error) -> Self {
        OutbreakError::IoError(error)
    }
}

impl From<serde_json::Error> for OutbreakError {
    fn from(error: serde_json::Error) -> Self {
        OutbreakError::JsonError(error)
    }
}

impl From<csv::Error> for OutbreakError {
    fn from(error: csv::Error) -> Self {
        OutbreakError::CsvError(error)
    }
}

impl From<String> for OutbreakError {
    fn from(message: String) -> Self {
        OutbreakError::OutbreakError(message)
    }
}

impl From<&str> for OutbreakError {
    fn from(message: &str) -> Self {
        OutbreakError::OutbreakError(message.to_string())
    }
}

impl Display for OutbreakError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OutbreakError::IoError(error) => write!(f, "IO error: {error}"),
            OutbreakError::JsonError(error) => write!(f, "JSON error: {error}"),
            OutbreakError::CsvError(error) => write!(f, "CSV error: {error}"),
            OutbreakError::OutbreakError(message) => write!(f, "{message}"),
        }
    }
}

impl Debug for OutbreakError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for OutbreakError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutbreakError::IoError(error) => Some(error),
            OutbreakError::JsonError(error) => Some(error),
            OutbreakError::CsvError(error) => Some(error),
            OutbreakError::OutbreakError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_violations_display_their_message_verbatim() {
        let error = OutbreakError::OutbreakError(String::from("population must be positive"));
        assert_eq!(error.to_string(), "population must be positive");
    }

    #[test]
    fn wrapped_errors_name_their_source() {
        let error: OutbreakError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(error.to_string().starts_with("IO error:"));
    }

    #[test]
    fn string_conversions_build_the_rule_variant() {
        let from_str: OutbreakError = "bad input".into();
        let from_string: OutbreakError = String::from("bad input").into();
        assert_eq!(from_str.to_string(), from_string.to_string());
    }
}

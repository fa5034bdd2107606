use serde::Serialize;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Kind of a thrown or captured error, named after the classic
/// dynamic-language error hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    #[serde(rename = "URIError")]
    UriError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::UriError => "URIError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error value with a kind and a message.
///
/// Group bodies return it to fail with a specific kind, and it doubles as the
/// error-like case of [`crate::Value`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ErrorValue {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorValue {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SyntaxError, message)
    }
}

/// Misuse of the chaining API. These are returned to the caller and never
/// recorded in the result tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("{operation} can only be used in a testit chain")]
    NoChain { operation: &'static str },

    #[error("groups do not return arguments")]
    NotATest,

    #[error("no group named `{name}` in the current group")]
    GroupNotFound { name: String },
}

impl UsageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UsageError::NoChain { .. } | UsageError::GroupNotFound { .. } => {
                ErrorKind::ReferenceError
            }
            UsageError::NotATest => ErrorKind::TypeError,
        }
    }
}

/// A panic caught at a group boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("panicked: {message}")]
pub struct PanicError {
    pub message: String,
    /// Backtrace rendered when the panic was raised, if the panic hook saw it.
    pub trace: Option<String>,
}

impl PanicError {
    pub fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "(non-string panic)".to_string()
        };
        Self {
            message,
            trace: None,
        }
    }

    pub fn with_trace(mut self, trace: Option<String>) -> Self {
        self.trace = trace;
        self
    }
}

/// Maps an error onto the [`ErrorKind`] reported in captured-error records.
pub fn classify_error(error: &anyhow::Error) -> ErrorKind {
    if let Some(value) = error.downcast_ref::<ErrorValue>() {
        return value.kind;
    }
    if let Some(usage) = error.downcast_ref::<UsageError>() {
        return usage.kind();
    }
    if error.is::<std::num::ParseIntError>()
        || error.is::<std::num::ParseFloatError>()
        || error.is::<serde_json::Error>()
        || error.is::<regex::Error>()
        || error.is::<chrono::ParseError>()
    {
        return ErrorKind::SyntaxError;
    }
    if error.is::<std::num::TryFromIntError>() {
        return ErrorKind::RangeError;
    }
    if error.is::<std::str::Utf8Error>() || error.is::<std::string::FromUtf8Error>() {
        return ErrorKind::UriError;
    }
    ErrorKind::Error
}

/// The message part of an error, without the kind prefix an [`ErrorValue`]
/// carries in its `Display`.
pub fn error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ErrorValue>() {
        Some(value) => value.message.clone(),
        None => format!("{:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_classify_error_value_kind() {
        let err = anyhow::Error::new(ErrorValue::range("out of bounds"));
        assert_eq!(classify_error(&err), ErrorKind::RangeError);
    }

    #[test]
    fn test_classify_through_context() {
        let err = Err::<(), _>(ErrorValue::type_error("bad"))
            .context("while running body")
            .unwrap_err();
        assert_eq!(classify_error(&err), ErrorKind::TypeError);
    }

    #[test]
    fn test_classify_usage_error() {
        let err = anyhow::Error::new(UsageError::NoChain {
            operation: "comment",
        });
        assert_eq!(classify_error(&err), ErrorKind::ReferenceError);

        let err = anyhow::Error::new(UsageError::NotATest);
        assert_eq!(classify_error(&err), ErrorKind::TypeError);
    }

    #[test]
    fn test_classify_parse_errors_as_syntax() {
        let err = anyhow::Error::new("abc".parse::<i32>().unwrap_err());
        assert_eq!(classify_error(&err), ErrorKind::SyntaxError);

        let err = anyhow::Error::new(serde_json::from_str::<serde_json::Value>("{").unwrap_err());
        assert_eq!(classify_error(&err), ErrorKind::SyntaxError);
    }

    #[test]
    fn test_classify_try_from_as_range() {
        let err = anyhow::Error::new(u8::try_from(300i32).unwrap_err());
        assert_eq!(classify_error(&err), ErrorKind::RangeError);
    }

    #[test]
    fn test_plain_and_syntax_error_values() {
        let err = anyhow::Error::new(ErrorValue::syntax("unexpected token"));
        assert_eq!(classify_error(&err), ErrorKind::SyntaxError);
        assert_eq!(error_message(&err), "unexpected token");

        let err = anyhow::Error::new(ErrorValue::error("plain"));
        assert_eq!(classify_error(&err), ErrorKind::Error);
        assert_eq!(ErrorValue::error("plain").to_string(), "Error: plain");
    }

    #[test]
    fn test_classify_generic() {
        let err = anyhow::anyhow!("something broke");
        assert_eq!(classify_error(&err), ErrorKind::Error);
    }

    #[test]
    fn test_error_message_strips_kind() {
        let err = anyhow::Error::new(ErrorValue::range("too big"));
        assert_eq!(error_message(&err), "too big");

        let err = anyhow::anyhow!("inner").context("outer");
        assert_eq!(error_message(&err), "outer: inner");
    }

    #[test]
    fn test_panic_payload_message() {
        let payload = std::panic::catch_unwind(|| {
            panic!("boom {}", 1);
        })
        .unwrap_err();
        let panic = PanicError::from_payload(payload);
        assert_eq!(panic.message, "boom 1");
        assert_eq!(panic.trace, None);
        assert_eq!(
            panic.with_trace(Some("frame".to_string())).trace.as_deref(),
            Some("frame")
        );

        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(
            PanicError::from_payload(payload).message,
            "(non-string panic)"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::UriError.to_string(), "URIError");
        assert_eq!(
            ErrorValue::reference("x").to_string(),
            "ReferenceError: x"
        );
    }
}

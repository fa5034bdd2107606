use crate::errors::ErrorValue;
use crate::result::Status;
use crate::value::{deep_equal, Value};

pub const EXISTS: &str = "argument exists and is not false";
pub const NOT_DEFINED: &str = "argument is not defined";
pub const NOT_TRUE: &str = "argument is not true";
pub const DIFFERENT_TYPES: &str = "arguments have different types";
pub const EQUAL: &str = "arguments are equal";
pub const NOT_EQUAL: &str = "arguments are not equal";

/// Verdict for one assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub status: Status,
    pub description: Option<&'static str>,
    pub error: Option<ErrorValue>,
}

impl Classification {
    fn verdict(passed: bool, pass: &'static str, fail: &'static str) -> Self {
        Self {
            status: if passed { Status::Pass } else { Status::Fail },
            description: Some(if passed { pass } else { fail }),
            error: None,
        }
    }

    fn error(error: ErrorValue) -> Self {
        Self {
            status: Status::Error,
            description: None,
            error: Some(error),
        }
    }
}

/// Judges an assertion by its argument count: one argument is a truthiness
/// check, two an equality check, anything else an error.
pub fn classify_test(args: &[Value]) -> Classification {
    match args {
        [] => Classification::error(ErrorValue::reference("at least one argument expected")),
        [a] => {
            if a.is_truthy() {
                Classification::verdict(true, EXISTS, EXISTS)
            } else if a.is_undefined() {
                Classification::verdict(false, EXISTS, NOT_DEFINED)
            } else {
                Classification::verdict(false, EXISTS, NOT_TRUE)
            }
        }
        [a, b] => {
            if a.type_tag() != b.type_tag() {
                Classification::verdict(false, EQUAL, DIFFERENT_TYPES)
            } else {
                Classification::verdict(deep_equal(a, b), EQUAL, NOT_EQUAL)
            }
        }
        _ => Classification::error(ErrorValue::range("too many arguments")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_no_arguments_is_error() {
        let c = classify_test(&[]);
        assert_eq!(c.status, Status::Error);
        assert_eq!(c.description, None);
        let err = c.error.unwrap();
        assert_eq!(err.kind, ErrorKind::ReferenceError);
        assert_eq!(err.message, "at least one argument expected");
    }

    #[test]
    fn test_single_truthy() {
        let c = classify_test(&[Value::from(1)]);
        assert_eq!(c.status, Status::Pass);
        assert_eq!(c.description, Some(EXISTS));
    }

    #[test]
    fn test_single_zero_is_not_true() {
        let c = classify_test(&[Value::from(0)]);
        assert_eq!(c.status, Status::Fail);
        assert_eq!(c.description, Some(NOT_TRUE));
    }

    #[test]
    fn test_single_undefined_is_not_defined() {
        let c = classify_test(&[Value::Undefined]);
        assert_eq!(c.status, Status::Fail);
        assert_eq!(c.description, Some(NOT_DEFINED));

        let c = classify_test(&[Value::Null]);
        assert_eq!(c.description, Some(NOT_TRUE));
    }

    #[test]
    fn test_equal_objects() {
        let c = classify_test(&[Value::from(json!({"a": 1})), Value::from(json!({"a": 1}))]);
        assert_eq!(c.status, Status::Pass);
        assert_eq!(c.description, Some(EQUAL));

        let c = classify_test(&[Value::from(json!({"a": 1})), Value::from(json!({"a": 2}))]);
        assert_eq!(c.status, Status::Fail);
        assert_eq!(c.description, Some(NOT_EQUAL));
    }

    #[test]
    fn test_different_types_fail_before_comparison() {
        let c = classify_test(&[Value::from(1), Value::from("1")]);
        assert_eq!(c.status, Status::Fail);
        assert_eq!(c.description, Some(DIFFERENT_TYPES));

        let c = classify_test(&[Value::from(f64::NAN), Value::from(1)]);
        assert_eq!(c.description, Some(DIFFERENT_TYPES));

        let c = classify_test(&[Value::from(json!([])), Value::from(json!({}))]);
        assert_eq!(c.description, Some(DIFFERENT_TYPES));
    }

    #[test]
    fn test_nan_pair_is_equal() {
        let c = classify_test(&[Value::from(f64::NAN), Value::from(f64::NAN)]);
        assert_eq!(c.status, Status::Pass);
    }

    #[test]
    fn test_too_many_arguments() {
        let c = classify_test(&[Value::from(1), Value::from(1), Value::from(1)]);
        assert_eq!(c.status, Status::Error);
        assert_eq!(c.error.unwrap().kind, ErrorKind::RangeError);
    }
}

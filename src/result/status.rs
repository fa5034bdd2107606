use serde::Serialize;
use std::fmt;

/// Outcome of a test or group. Variants are declared in ascending severity,
/// so the derived ordering is the rollup order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Unset,
    Pass,
    Fail,
    Error,
}

impl Status {
    /// Worst-case-wins join. `Unset` is the identity.
    pub fn combine(self, other: Status) -> Status {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unset => "unset",
            Status::Pass => "pass",
            Status::Fail => "fail",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn combine(old: Status, new: Status) -> Status {
    old.combine(new)
}

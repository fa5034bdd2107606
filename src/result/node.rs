use crate::errors::ErrorKind;
use crate::result::Status;
use crate::value::Value;
use serde::Serialize;
use std::time::Duration;

/// Per-status counts of direct children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub error: usize,
    pub total: usize,
}

impl Tally {
    pub fn record(&mut self, status: Status) {
        match status {
            Status::Pass => self.passed += 1,
            Status::Fail => self.failed += 1,
            Status::Error => self.error += 1,
            Status::Unset => {}
        }
        self.total += 1;
    }

    /// Undoes a previous `record` of the same status.
    pub fn retract(&mut self, status: Status) {
        let bucket = match status {
            Status::Pass => Some(&mut self.passed),
            Status::Fail => Some(&mut self.failed),
            Status::Error => Some(&mut self.error),
            Status::Unset => None,
        };
        if let Some(bucket) = bucket {
            *bucket = bucket.saturating_sub(1);
        }
        self.total = self.total.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub tests: Tally,
    pub groups: Tally,
}

/// What went wrong when a group body raised, or why a test could not be
/// classified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedError {
    pub kind: ErrorKind,
    pub message: String,
    pub trace: String,
}

#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub status: Status,
    pub comment: Option<String>,
    pub error: Option<CapturedError>,
    pub elapsed: Duration,
    pub counters: Counters,
    pub children: Vec<NodeId>,
}

impl GroupNode {
    /// A fresh group starts out passing; its children can only make it worse.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Pass,
            comment: None,
            error: None,
            elapsed: Duration::ZERO,
            counters: Counters::default(),
            children: Vec::new(),
        }
    }

    pub(crate) fn root(name: impl Into<String>) -> Self {
        Self {
            status: Status::Unset,
            ..Self::new(name)
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestNode {
    pub status: Status,
    pub comment: Option<String>,
    pub description: Option<String>,
    pub error: Option<CapturedError>,
    pub elapsed: Duration,
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Test,
    Group,
}

#[derive(Debug, Clone)]
pub enum ResultNode {
    Group(GroupNode),
    Test(TestNode),
}

impl ResultNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ResultNode::Group(_) => NodeKind::Group,
            ResultNode::Test(_) => NodeKind::Test,
        }
    }

    pub fn status(&self) -> Status {
        match self {
            ResultNode::Group(g) => g.status,
            ResultNode::Test(t) => t.status,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            ResultNode::Group(g) => g.comment.as_deref(),
            ResultNode::Test(t) => t.comment.as_deref(),
        }
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        let comment = Some(text.into());
        match self {
            ResultNode::Group(g) => g.comment = comment,
            ResultNode::Test(t) => t.comment = comment,
        }
    }

    pub fn error(&self) -> Option<&CapturedError> {
        match self {
            ResultNode::Group(g) => g.error.as_ref(),
            ResultNode::Test(t) => t.error.as_ref(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            ResultNode::Group(g) => g.elapsed,
            ResultNode::Test(t) => t.elapsed,
        }
    }

    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            ResultNode::Group(g) => Some(g),
            ResultNode::Test(_) => None,
        }
    }

    pub fn as_test(&self) -> Option<&TestNode> {
        match self {
            ResultNode::Test(t) => Some(t),
            ResultNode::Group(_) => None,
        }
    }
}

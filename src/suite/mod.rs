mod chain;

pub use chain::{Arguments, Callback, Callbacks, Chain};

use crate::errors::{classify_error, error_message, UsageError};
use crate::reporter::{render_node, ReportOptions, Reporter, TextReporter};
use crate::result::{
    classify_test, CapturedError, GroupNode, Handle, NodeId, NodeKind, ResultNode, ResultTree,
    Status, TestNode,
};
use crate::trace::{catch_panic, BacktraceCapture, TraceCapture};
use crate::value::{TypeTag, Value};
use std::time::Instant;
use tracing::{debug, warn};

pub const ROOT_NAME: &str = "root";

/// Records tests and groups into a [`ResultTree`].
///
/// The suite owns the cursor pointing at the group new nodes are added to,
/// and the handle of the most recently produced node, which the metadata
/// operations (`comment`, `callback`, `result`, `arguments`) act on.
pub struct Suite {
    tree: ResultTree,
    cursor: NodeId,
    last: Option<Handle>,
    started: Instant,
    finished: bool,
    trace: Box<dyn TraceCapture>,
    reporter: Option<Box<dyn Reporter>>,
}

impl Suite {
    /// A suite that reports as text on stdout.
    pub fn new() -> Self {
        Self::with_reporter(TextReporter::stdout(ReportOptions::default()))
    }

    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self::build(Some(Box::new(reporter)))
    }

    pub fn with_boxed_reporter(reporter: Box<dyn Reporter>) -> Self {
        Self::build(Some(reporter))
    }

    /// A suite without a reporter; `done` only finalizes the tree.
    pub fn silent() -> Self {
        Self::build(None)
    }

    fn build(reporter: Option<Box<dyn Reporter>>) -> Self {
        let tree = ResultTree::new(ROOT_NAME);
        let cursor = tree.root_id();
        Self {
            tree,
            cursor,
            last: None,
            started: Instant::now(),
            finished: false,
            trace: Box::new(BacktraceCapture),
            reporter,
        }
    }

    pub fn trace_with(mut self, trace: impl TraceCapture + 'static) -> Self {
        self.trace = Box::new(trace);
        self
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn root(&self) -> &GroupNode {
        self.tree.root()
    }

    pub fn into_tree(self) -> ResultTree {
        self.tree
    }

    /// Handle of the most recently produced node.
    pub fn last(&self) -> Option<Handle> {
        self.last
    }

    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// Records one assertion in the current group.
    pub fn test(&mut self, arguments: Vec<Value>) -> Chain<'_> {
        let handle = self.record_test(arguments);
        Chain::new(self, handle)
    }

    /// Runs `body` inside the group `name`, creating the group or merging into
    /// an existing sibling of the same name.
    ///
    /// An error returned by the body, or a panic inside it, marks the group as
    /// `Error` and is recorded on it; it never reaches the caller.
    pub fn group<F>(&mut self, name: impl Into<String>, body: F) -> Chain<'_>
    where
        F: FnOnce(&mut Suite) -> anyhow::Result<()>,
    {
        let handle = self.enter_group(name.into(), body);
        Chain::new(self, handle)
    }

    /// Chain handle for an existing group of the current group, without
    /// running anything.
    pub fn lookup(&mut self, name: &str) -> Result<Chain<'_>, UsageError> {
        let id = self
            .tree
            .find_group(self.cursor, name)
            .ok_or_else(|| UsageError::GroupNotFound {
                name: name.to_string(),
            })?;
        let handle = Handle {
            kind: NodeKind::Group,
            id,
        };
        self.last = Some(handle);
        Ok(Chain::new(self, handle))
    }

    pub fn comment(&mut self, text: impl Into<String>) -> Result<(), UsageError> {
        let handle = self.require_last("comment")?;
        self.comment_on(handle, text);
        Ok(())
    }

    pub fn comment_on(&mut self, handle: Handle, text: impl Into<String>) {
        if let Some(node) = self.tree.get_mut(handle.id) {
            node.set_comment(text);
        }
    }

    /// Runs the callable matching the last node's status. Errors from the
    /// callable are returned as-is.
    pub fn callback(&mut self, callbacks: Callbacks<'_>) -> anyhow::Result<()> {
        let handle = self.require_last("callback")?;
        self.callback_on(handle, callbacks)
    }

    pub fn callback_on(&mut self, handle: Handle, callbacks: Callbacks<'_>) -> anyhow::Result<()> {
        let status = self.status_of(handle);
        match callbacks.select(status) {
            Some(callable) => callable(self),
            None => Ok(()),
        }
    }

    /// Whether the last node passed; `None` before any test or group.
    pub fn result(&self) -> Option<bool> {
        self.last.map(|handle| self.result_of(handle))
    }

    pub fn result_of(&self, handle: Handle) -> bool {
        self.status_of(handle) == Status::Pass
    }

    /// Arguments of the last test; `Ok(None)` before any test or group.
    pub fn arguments(&self) -> Result<Option<Arguments>, UsageError> {
        self.last
            .map(|handle| self.arguments_of(handle))
            .transpose()
    }

    pub fn arguments_of(&self, handle: Handle) -> Result<Arguments, UsageError> {
        let test = self.tree.test(handle.id).ok_or(UsageError::NotATest)?;
        Ok(Arguments::from_slice(&test.arguments))
    }

    /// Finalizes the root group and hands the tree to the reporter. Only the
    /// first call has an effect.
    pub fn done(&mut self) -> anyhow::Result<()> {
        if self.finished {
            warn!("done() called again; the report was already produced");
            return Ok(());
        }
        self.finished = true;

        let elapsed = self.started.elapsed();
        let root_id = self.tree.root_id();
        if let Some(root) = self.tree.group_mut(root_id) {
            root.elapsed = elapsed;
            if root.status == Status::Unset {
                root.status = Status::Pass;
            }
        }
        debug!(
            status = %self.tree.root().status,
            elapsed_ms = elapsed.as_millis() as u64,
            "suite finished"
        );

        if let Some(reporter) = self.reporter.as_mut() {
            reporter.report(&self.tree, self.trace.as_ref())?;
        }
        Ok(())
    }

    /// Type classification used to decide whether two arguments are
    /// comparable.
    pub fn type_tag(value: &Value) -> TypeTag {
        value.type_tag()
    }

    /// Current call-frame listing, or the one recorded in `error`.
    pub fn trace(&self, error: Option<&anyhow::Error>) -> String {
        self.trace.capture(error)
    }

    /// Text rendering of one node and its subtree.
    pub fn print(&self, handle: Handle, options: &ReportOptions) -> String {
        render_node(&self.tree, handle.id, options)
    }

    fn record_test(&mut self, arguments: Vec<Value>) -> Handle {
        let started = Instant::now();
        let classification = classify_test(&arguments);
        let error = classification.error.map(|e| CapturedError {
            kind: e.kind,
            message: e.message,
            trace: self.trace.capture(None),
        });
        let status = classification.status;
        let node = TestNode {
            status,
            comment: None,
            description: classification.description.map(str::to_string),
            error,
            elapsed: started.elapsed(),
            arguments,
        };

        let parent = self.cursor;
        let id = self.attach(parent, ResultNode::Test(node));
        if let Some(group) = self.tree.group_mut(parent) {
            group.counters.tests.record(status);
            group.status = group.status.combine(status);
        }
        debug!(%status, "recorded test");

        let handle = Handle {
            kind: NodeKind::Test,
            id,
        };
        self.last = Some(handle);
        handle
    }

    fn enter_group<F>(&mut self, name: String, body: F) -> Handle
    where
        F: FnOnce(&mut Suite) -> anyhow::Result<()>,
    {
        let started = Instant::now();
        let parent = self.cursor;
        let (target, previous) = match self.tree.find_group(parent, &name) {
            Some(id) => (id, self.tree.group(id).map(|g| g.status)),
            None => {
                let id = self.attach(parent, ResultNode::Group(GroupNode::new(name.as_str())));
                (id, None)
            }
        };
        debug!(group = %name, merged = previous.is_some(), "entering group");

        self.cursor = target;
        let outcome = catch_panic(|| body(&mut *self));
        self.cursor = parent;

        let failure = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err),
            Err(panic) => Some(anyhow::Error::new(panic)),
        };
        let captured = failure.map(|err| CapturedError {
            kind: classify_error(&err),
            message: error_message(&err),
            trace: self.trace.capture(Some(&err)),
        });

        let mut status = Status::Unset;
        if let Some(group) = self.tree.group_mut(target) {
            if let Some(captured) = captured {
                debug!(group = %name, kind = %captured.kind, "group body raised");
                group.status = Status::Error;
                group.error = Some(captured);
            }
            group.elapsed += started.elapsed();
            status = group.status;
        }

        if let Some(parent_group) = self.tree.group_mut(parent) {
            parent_group.status = parent_group.status.combine(status);
            if let Some(previous) = previous {
                parent_group.counters.groups.retract(previous);
            }
            parent_group.counters.groups.record(status);
        }
        debug!(group = %name, %status, "leaving group");

        let handle = Handle {
            kind: NodeKind::Group,
            id: target,
        };
        self.last = Some(handle);
        handle
    }

    fn attach(&mut self, parent: NodeId, node: ResultNode) -> NodeId {
        match self.tree.push(parent, node) {
            Some(id) => id,
            None => unreachable!("the cursor always points at a group"),
        }
    }

    fn require_last(&self, operation: &'static str) -> Result<Handle, UsageError> {
        self.last.ok_or(UsageError::NoChain { operation })
    }

    fn status_of(&self, handle: Handle) -> Status {
        self.tree
            .get(handle.id)
            .map(ResultNode::status)
            .unwrap_or_default()
    }
}

impl Default for Suite {
    fn default() -> Self {
        Self::new()
    }
}

/// Records one assertion: `it!(suite, value)` checks truthiness,
/// `it!(suite, a, b)` checks equality.
#[macro_export]
macro_rules! it {
    ($suite:expr $(, $arg:expr)* $(,)?) => {
        $suite.test(vec![$($crate::Value::from($arg)),*])
    };
}

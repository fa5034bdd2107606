mod json;
mod text;

pub use json::JsonReporter;
pub use text::{render_node, TextReporter};

use crate::result::{NodeId, ResultNode, ResultTree, Status};
use crate::trace::TraceCapture;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub output_format: OutputFormat,
    /// Expand passing groups and tests instead of collapsing them.
    pub verbose: bool,
    pub color: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            verbose: false,
            color: true,
        }
    }
}

/// Consumes a finished result tree.
pub trait Reporter {
    fn report(&mut self, tree: &ResultTree, trace: &dyn TraceCapture) -> anyhow::Result<()>;
}

/// Builds the reporter matching `options.output_format`.
pub fn reporter_for(options: ReportOptions, out: Box<dyn Write>) -> Box<dyn Reporter> {
    match options.output_format {
        OutputFormat::Text => Box::new(TextReporter::new(out, options)),
        OutputFormat::Json => Box::new(JsonReporter::new(out)),
    }
}

/// Totals over the whole tree, not only the root's direct children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub groups: usize,
    pub status: Status,
    pub duration_ms: u64,
}

impl Summary {
    pub fn from_tree(tree: &ResultTree) -> Self {
        let root = tree.root();
        let mut summary = Summary {
            status: root.status,
            duration_ms: root.elapsed.as_millis() as u64,
            ..Summary::default()
        };
        summary.visit(tree, tree.root_id());
        summary
    }

    fn visit(&mut self, tree: &ResultTree, id: NodeId) {
        for (child, node) in tree.children(id) {
            match node {
                ResultNode::Test(test) => {
                    self.tests += 1;
                    match test.status {
                        Status::Pass => self.passed += 1,
                        Status::Fail => self.failed += 1,
                        Status::Error => self.errors += 1,
                        Status::Unset => {}
                    }
                }
                ResultNode::Group(_) => {
                    self.groups += 1;
                    self.visit(tree, child);
                }
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.status != Status::Pass
    }
}

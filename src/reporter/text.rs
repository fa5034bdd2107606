use crate::reporter::{ReportOptions, Reporter, Summary};
use crate::result::{CapturedError, NodeId, ResultNode, ResultTree, Status};
use crate::trace::TraceCapture;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Renders the tree as an indented outline:
///
/// ```text
/// root - fail - 2/1/0 (3 ms)
///   pass: passed test
///   fail: failed test
///     argument is not true
///     [false]
///   first group - pass - 2/0/0 (0 ms) consist one test and one group
/// ```
///
/// Passing groups and tests are collapsed to their header line unless
/// `verbose` is set.
pub struct TextReporter<W: Write> {
    out: W,
    options: ReportOptions,
}

impl TextReporter<io::Stdout> {
    pub fn stdout(options: ReportOptions) -> Self {
        Self::new(io::stdout(), options)
    }
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self { out, options }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, tree: &ResultTree, _trace: &dyn TraceCapture) -> anyhow::Result<()> {
        let mut text = render_node(tree, tree.root_id(), &self.options);
        text.push('\n');
        text.push_str(&render_summary(&Summary::from_tree(tree), &self.options));
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Outline of one node and, when expanded, its subtree.
pub fn render_node(tree: &ResultTree, id: NodeId, options: &ReportOptions) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, id, 0, options);
    finish(out, options)
}

fn render_summary(summary: &Summary, options: &ReportOptions) -> String {
    let groups_text = if summary.groups == 1 {
        "group"
    } else {
        "groups"
    };
    let line = if summary.has_failures() {
        format!(
            "{} Failed {} and errored {} of {} tests in {} {} ({} ms)",
            "✗".red(),
            summary.failed,
            summary.errors,
            summary.tests,
            summary.groups,
            groups_text,
            summary.duration_ms
        )
    } else {
        format!(
            "{} Passed {}/{} tests in {} {} ({} ms)",
            "✓".green(),
            summary.passed,
            summary.tests,
            summary.groups,
            groups_text,
            summary.duration_ms
        )
    };
    finish(line, options)
}

fn finish(text: String, options: &ReportOptions) -> String {
    if options.color {
        text
    } else {
        strip_ansi_escapes::strip_str(&text)
    }
}

fn paint(status: Status) -> String {
    match status {
        Status::Pass => status.green().to_string(),
        Status::Fail => status.red().to_string(),
        Status::Error => status.yellow().to_string(),
        Status::Unset => status.dimmed().to_string(),
    }
}

fn is_expanded(status: Status, depth: usize, options: &ReportOptions) -> bool {
    depth == 0 || options.verbose || status != Status::Pass
}

fn write_node(
    out: &mut String,
    tree: &ResultTree,
    id: NodeId,
    depth: usize,
    options: &ReportOptions,
) {
    let indent = "  ".repeat(depth);
    match tree.get(id) {
        Some(ResultNode::Group(group)) => {
            if group.status == Status::Unset {
                out.push_str(&format!("{}{} - {}\n", indent, group.name, "no status".red()));
                return;
            }
            let counters = &group.counters;
            out.push_str(&format!(
                "{}{} - {} - {}/{}/{} ({} ms)",
                indent,
                group.name,
                paint(group.status),
                (counters.tests.passed + counters.groups.passed).green(),
                (counters.tests.failed + counters.groups.failed).red(),
                (counters.tests.error + counters.groups.error).yellow(),
                group.elapsed.as_millis().blue()
            ));
            if let Some(comment) = &group.comment {
                out.push(' ');
                out.push_str(comment);
            }
            out.push('\n');

            if !is_expanded(group.status, depth, options) {
                return;
            }
            for &child in &group.children {
                write_node(out, tree, child, depth + 1, options);
            }
            if let Some(error) = &group.error {
                write_error(out, error, depth + 1);
            }
        }
        Some(ResultNode::Test(test)) => {
            out.push_str(&format!(
                "{}{}: {}\n",
                indent,
                paint(test.status),
                test.comment.as_deref().unwrap_or_default()
            ));
            if !is_expanded(test.status, depth, options) {
                return;
            }
            let inner = "  ".repeat(depth + 1);
            if let Some(description) = &test.description {
                out.push_str(&format!("{}{}\n", inner, description));
            }
            if let Some(error) = &test.error {
                write_error(out, error, depth + 1);
            }
            let arguments = test
                .arguments
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("{}[{}]\n", inner, arguments));
        }
        None => {}
    }
}

fn write_error(out: &mut String, error: &CapturedError, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&format!(
        "{}{}: {}\n",
        indent,
        error.kind.yellow(),
        error.message
    ));
    for frame in error.trace.lines() {
        out.push_str(&format!("{}  {}\n", indent, frame.dimmed()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorValue;
    use crate::suite::Suite;
    use crate::trace::NoTrace;
    use crate::value::Value;

    fn plain(verbose: bool) -> ReportOptions {
        ReportOptions {
            verbose,
            color: false,
            ..ReportOptions::default()
        }
    }

    fn sample_suite() -> Suite {
        let mut suite = Suite::silent().trace_with(NoTrace);
        suite.test(vec![Value::from(true)]).comment("passed test");
        suite.test(vec![Value::from(false)]).comment("failed test");
        suite
            .group("first group", |s| {
                s.test(vec![Value::from(1), Value::from(1)]);
                Ok(())
            })
            .comment("one passing test");
        suite.done().unwrap();
        suite
    }

    fn report(suite: &Suite, options: ReportOptions) -> String {
        let mut reporter = TextReporter::new(Vec::new(), options);
        reporter.report(suite.tree(), &NoTrace).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_collapses_passing_nodes() {
        let text = report(&sample_suite(), plain(false));
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("root - fail - 2/1/0 ("));
        assert_eq!(lines[1], "  pass: passed test");
        assert_eq!(lines[2], "  fail: failed test");
        assert_eq!(lines[3], "    argument is not true");
        assert_eq!(lines[4], "    [false]");
        assert!(lines[5].starts_with("  first group - pass - 1/0/0 ("));
        assert!(lines[5].ends_with("ms) one passing test"));
        assert!(lines[6].is_empty());
        assert!(lines[7].starts_with("✗ Failed 1 and errored 0 of 3 tests in 1 group"));
    }

    #[test]
    fn test_verbose_expands_everything() {
        let text = report(&sample_suite(), plain(true));
        assert!(text.contains("    argument exists and is not false\n    [true]\n"));
        assert!(text.contains("    pass: \n      arguments are equal\n      [1, 1]\n"));
    }

    #[test]
    fn test_group_error_is_rendered() {
        let mut suite = Suite::silent().trace_with(NoTrace);
        suite.group("broken", |_| Err(ErrorValue::type_error("not callable").into()));
        suite.done().unwrap();

        let text = report(&suite, plain(false));
        assert!(text.contains("  broken - error - 0/0/0 ("));
        assert!(text.contains("    TypeError: not callable\n"));
    }

    #[test]
    fn test_render_node_subtree() {
        let suite = sample_suite();
        let handle = suite.tree().handle(suite.tree().root_id()).unwrap();
        let text = suite.print(handle, &plain(false));
        assert!(text.starts_with("root - fail"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_color_output_has_ansi() {
        let text = report(&sample_suite(), ReportOptions::default());
        assert!(text.contains('\u{1b}'));
    }

    #[test]
    fn test_unset_group_has_no_status() {
        let tree = ResultTree::new("root");
        let text = render_node(&tree, tree.root_id(), &plain(false));
        assert_eq!(text, "root - no status\n");
    }

    #[test]
    fn test_passing_summary() {
        let mut suite = Suite::silent();
        suite.test(vec![Value::from(1)]);
        suite.done().unwrap();
        let text = report(&suite, plain(false));
        assert!(text.contains("✓ Passed 1/1 tests in 0 groups ("));
    }
}

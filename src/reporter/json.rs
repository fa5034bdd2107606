use crate::reporter::{Reporter, Summary};
use crate::result::{CapturedError, Counters, NodeId, ResultNode, ResultTree, Status};
use crate::trace::TraceCapture;
use serde::Serialize;
use std::io::Write;

/// Writes the whole tree as pretty-printed JSON.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    tool: Tool,
    summary: Summary,
    root: NodeReport<'a>,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum NodeReport<'a> {
    Group {
        name: &'a str,
        status: Status,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a CapturedError>,
        time_ms: u64,
        result: Counters,
        stack: Vec<NodeReport<'a>>,
    },
    Test {
        status: Status,
        #[serde(skip_serializing_if = "Option::is_none")]
        comment: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<&'a CapturedError>,
        time_ms: u64,
        arguments: Vec<serde_json::Value>,
    },
}

impl<'a> NodeReport<'a> {
    fn build(tree: &'a ResultTree, id: NodeId) -> Option<Self> {
        let report = match tree.get(id)? {
            ResultNode::Group(group) => NodeReport::Group {
                name: &group.name,
                status: group.status,
                comment: group.comment.as_deref(),
                error: group.error.as_ref(),
                time_ms: group.elapsed.as_millis() as u64,
                result: group.counters,
                stack: group
                    .children
                    .iter()
                    .filter_map(|&child| NodeReport::build(tree, child))
                    .collect(),
            },
            ResultNode::Test(test) => NodeReport::Test {
                status: test.status,
                comment: test.comment.as_deref(),
                description: test.description.as_deref(),
                error: test.error.as_ref(),
                time_ms: test.elapsed.as_millis() as u64,
                arguments: test.arguments.iter().map(|v| v.to_json()).collect(),
            },
        };
        Some(report)
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, tree: &ResultTree, _trace: &dyn TraceCapture) -> anyhow::Result<()> {
        let root = NodeReport::build(tree, tree.root_id())
            .ok_or_else(|| anyhow::anyhow!("result tree has no root"))?;
        let report = Report {
            tool: Tool {
                name: "testit",
                version: env!("CARGO_PKG_VERSION"),
            },
            summary: Summary::from_tree(tree),
            root,
        };
        serde_json::to_writer_pretty(&mut self.out, &report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorValue;
    use crate::suite::Suite;
    use crate::trace::NoTrace;
    use crate::value::Value;
    use serde_json::json;

    fn report(suite: &Suite) -> serde_json::Value {
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(suite.tree(), &NoTrace).unwrap();
        serde_json::from_slice(&reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_json_tree_shape() {
        let mut suite = Suite::silent().trace_with(NoTrace);
        suite.test(vec![Value::from("a"), Value::from("a")]).comment("same");
        suite.group("g", |s| {
            s.test(vec![Value::from(0)]);
            Ok(())
        });
        suite.done().unwrap();

        let json = report(&suite);
        assert_eq!(json["tool"]["name"], "testit");
        assert_eq!(json["summary"]["tests"], 2);
        assert_eq!(json["summary"]["status"], "fail");

        let root = &json["root"];
        assert_eq!(root["type"], "group");
        assert_eq!(root["name"], "root");
        assert_eq!(root["result"]["tests"]["passed"], 1);
        assert_eq!(root["result"]["groups"]["failed"], 1);

        let first = &root["stack"][0];
        assert_eq!(first["type"], "test");
        assert_eq!(first["comment"], "same");
        assert_eq!(first["description"], "arguments are equal");
        assert_eq!(first["arguments"], json!(["a", "a"]));

        let group = &root["stack"][1];
        assert_eq!(group["name"], "g");
        assert_eq!(group["status"], "fail");
        assert_eq!(group["stack"][0]["description"], "argument is not true");
        assert!(group.get("comment").is_none());
    }

    #[test]
    fn test_json_captured_error() {
        let mut suite = Suite::silent().trace_with(NoTrace);
        suite.group("boom", |_| Err(ErrorValue::range("index 9").into()));
        suite.test(vec![]);
        suite.done().unwrap();

        let json = report(&suite);
        let group = &json["root"]["stack"][0];
        assert_eq!(group["status"], "error");
        assert_eq!(
            group["error"],
            json!({"kind": "RangeError", "message": "index 9", "trace": ""})
        );

        let test = &json["root"]["stack"][1];
        assert_eq!(test["error"]["kind"], "ReferenceError");
        assert!(test.get("description").is_none());
    }
}

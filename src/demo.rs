use crate::it;
use crate::suite::Suite;

/// The walkthrough suite run by the `testit` binary: one passing, one failing
/// and one erroring test, then a group nested four levels deep.
pub fn walkthrough(suite: &mut Suite) {
    it!(suite, true).comment("passed test");
    it!(suite, false).comment("failed test");
    it!(suite).comment("error test");

    suite
        .group("first group", |s| {
            it!(s, true).comment("single test");
            s.group("nested group", |s| {
                s.group("deep nested group", |s| {
                    s.group("very deep nested group", |s| {
                        it!(s, true).comment("another simple test");
                        Ok(())
                    });
                    Ok(())
                });
                Ok(())
            });
            Ok(())
        })
        .comment("consist one test and one group");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{reporter_for, OutputFormat, ReportOptions};
    use crate::result::Status;
    use crate::trace::NoTrace;
    use std::fs::{self, File};

    #[test]
    fn test_walkthrough_tree() {
        let mut suite = Suite::silent().trace_with(NoTrace);
        walkthrough(&mut suite);
        suite.done().unwrap();

        let root = suite.root();
        assert_eq!(root.status, Status::Error);
        assert_eq!(root.children.len(), 4);
        assert_eq!(root.counters.tests.passed, 1);
        assert_eq!(root.counters.tests.failed, 1);
        assert_eq!(root.counters.tests.error, 1);
        assert_eq!(root.counters.groups.passed, 1);

        let tree = suite.tree();
        let first = tree.find_group(tree.root_id(), "first group").unwrap();
        let group = tree.group(first).unwrap();
        assert_eq!(group.comment.as_deref(), Some("consist one test and one group"));
        assert_eq!(group.counters.tests.total, 1);
        assert_eq!(group.counters.groups.total, 1);

        let nested = tree.find_group(first, "nested group").unwrap();
        let deep = tree.find_group(nested, "deep nested group").unwrap();
        let very_deep = tree.find_group(deep, "very deep nested group").unwrap();
        assert_eq!(tree.group(very_deep).unwrap().status, Status::Pass);
    }

    #[test]
    fn test_walkthrough_json_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let options = ReportOptions {
            output_format: OutputFormat::Json,
            ..ReportOptions::default()
        };
        let out = File::create(&path).unwrap();

        let mut suite =
            Suite::with_boxed_reporter(reporter_for(options, Box::new(out))).trace_with(NoTrace);
        walkthrough(&mut suite);
        suite.done().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["summary"]["tests"], 5);
        assert_eq!(json["summary"]["groups"], 4);
        assert_eq!(json["summary"]["status"], "error");
        assert_eq!(json["root"]["stack"][2]["error"]["kind"], "ReferenceError");
        assert_eq!(
            json["root"]["stack"][3]["comment"],
            "consist one test and one group"
        );
    }
}

pub mod demo;
pub mod errors;
pub mod reporter;
pub mod result;
pub mod suite;
pub mod trace;
pub mod value;

pub use errors::{ErrorKind, ErrorValue, UsageError};
pub use reporter::{
    reporter_for, JsonReporter, OutputFormat, ReportOptions, Reporter, Summary, TextReporter,
};
pub use result::{Handle, ResultTree, Status};
pub use suite::{Arguments, Callbacks, Chain, Suite};
pub use trace::{BacktraceCapture, NoTrace, TraceCapture};
pub use value::{deep_equal, TypeTag, Value};

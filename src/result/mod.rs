mod classify;
mod node;
mod status;
mod tree;

pub use classify::{classify_test, Classification};
pub use node::{
    CapturedError, Counters, GroupNode, NodeId, NodeKind, ResultNode, Tally, TestNode,
};
pub use status::{combine, Status};
pub use tree::{Handle, ResultTree};

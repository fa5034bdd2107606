use crate::errors::UsageError;
use crate::result::{Handle, Status};
use crate::suite::Suite;
use crate::value::Value;

pub type Callback<'a> = Box<dyn FnOnce(&mut Suite) -> anyhow::Result<()> + 'a>;

/// Callables for `callback`; at most one runs, picked by status.
#[derive(Default)]
pub struct Callbacks<'a> {
    on_pass: Option<Callback<'a>>,
    on_fail: Option<Callback<'a>>,
    on_error: Option<Callback<'a>>,
}

impl<'a> Callbacks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_pass(mut self, f: impl FnOnce(&mut Suite) -> anyhow::Result<()> + 'a) -> Self {
        self.on_pass = Some(Box::new(f));
        self
    }

    pub fn on_fail(mut self, f: impl FnOnce(&mut Suite) -> anyhow::Result<()> + 'a) -> Self {
        self.on_fail = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&mut Suite) -> anyhow::Result<()> + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub(crate) fn select(self, status: Status) -> Option<Callback<'a>> {
        match status {
            Status::Pass => self.on_pass,
            Status::Fail => self.on_fail,
            Status::Error => self.on_error,
            Status::Unset => None,
        }
    }
}

/// Raw arguments of a test: the value itself when exactly one was given.
#[derive(Debug, Clone, PartialEq)]
pub enum Arguments {
    Single(Value),
    Many(Vec<Value>),
}

impl Arguments {
    pub(crate) fn from_slice(args: &[Value]) -> Self {
        match args {
            [one] => Arguments::Single(one.clone()),
            _ => Arguments::Many(args.to_vec()),
        }
    }

    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Arguments::Single(v) => vec![v],
            Arguments::Many(vs) => vs,
        }
    }
}

/// The node just produced by `test`/`group`/`lookup`, borrowed together with
/// its suite so metadata calls can be chained.
pub struct Chain<'a> {
    suite: &'a mut Suite,
    handle: Handle,
}

impl<'a> Chain<'a> {
    pub(crate) fn new(suite: &'a mut Suite, handle: Handle) -> Self {
        Self { suite, handle }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn status(&self) -> Status {
        self.suite
            .tree()
            .get(self.handle.id)
            .map(|node| node.status())
            .unwrap_or_default()
    }

    pub fn comment(self, text: impl Into<String>) -> Self {
        self.suite.comment_on(self.handle, text);
        self
    }

    pub fn callback(self, callbacks: Callbacks<'_>) -> anyhow::Result<Self> {
        self.suite.callback_on(self.handle, callbacks)?;
        Ok(self)
    }

    pub fn result(&self) -> bool {
        self.suite.result_of(self.handle)
    }

    pub fn arguments(&self) -> Result<Arguments, UsageError> {
        self.suite.arguments_of(self.handle)
    }
}

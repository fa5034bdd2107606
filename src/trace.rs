use crate::errors::PanicError;
use regex::Regex;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Once, OnceLock};

/// Produces the call-frame listing stored in captured-error records.
pub trait TraceCapture {
    fn capture(&self, error: Option<&anyhow::Error>) -> String;
}

/// Frames whose symbol, or whose self type in `<T as Trait>` form, starts with
/// one of these belong to the runtime or to the assertion engine itself.
const NOISE_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "anyhow::",
    "test::",
    "__rust",
    "rust_begin_unwind",
    "__libc_start",
    "_start",
    "start_thread",
    "clone3",
    "__clone",
    "<unknown>",
    "testit::trace::",
    "testit::suite::Suite",
    "testit::suite::chain::",
];

/// Closure call shims; the closure's own frame is listed separately.
const CALL_SHIM_TRAIT: &str = "core::ops::function::Fn";

/// Trace capture backed by `std::backtrace`.
///
/// For a panic caught at a group boundary the listing is the one taken when
/// the panic was raised, so it points at the panic location. Otherwise the
/// error's own backtrace is used when one was captured (`RUST_BACKTRACE` or
/// `RUST_LIB_BACKTRACE` set), and failing that a capture is forced at the
/// call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceCapture;

impl TraceCapture for BacktraceCapture {
    fn capture(&self, error: Option<&anyhow::Error>) -> String {
        let panic_trace = error
            .and_then(|err| err.downcast_ref::<PanicError>())
            .and_then(|panic| panic.trace.clone());
        let rendered = match (panic_trace, error) {
            (Some(trace), _) => trace,
            (None, Some(err)) if err.backtrace().status() == BacktraceStatus::Captured => {
                err.backtrace().to_string()
            }
            _ => Backtrace::force_capture().to_string(),
        };
        clean_backtrace(&rendered)
    }
}

/// Trace capture that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl TraceCapture for NoTrace {
    fn capture(&self, _error: Option<&anyhow::Error>) -> String {
        String::new()
    }
}

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Chains a hook in front of the current panic hook that records a backtrace
/// while a [`catch_panic`] guard is active on the panicking thread.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                let trace = Backtrace::force_capture().to_string();
                PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            }
            previous(info);
        }));
    });
}

/// Runs `f`, turning a panic into a [`PanicError`] that carries the
/// backtrace of the panic location.
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> R) -> Result<R, PanicError> {
    install_panic_hook();
    PANIC_TRACE.with(|slot| slot.borrow_mut().take());
    GUARD_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let outcome = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|depth| depth.set(depth.get() - 1));

    outcome.map_err(|payload| {
        let trace = PANIC_TRACE.with(|slot| slot.borrow_mut().take());
        PanicError::from_payload(payload).with_trace(trace)
    })
}

/// Turns a rendered backtrace into one `symbol (location)` line per frame,
/// dropping runtime and engine frames.
pub fn clean_backtrace(rendered: &str) -> String {
    static FRAME_RE: OnceLock<Regex> = OnceLock::new();
    static LOCATION_RE: OnceLock<Regex> = OnceLock::new();
    let frame_re = FRAME_RE.get_or_init(|| {
        Regex::new(r"^\s*\d+:\s+(.+?)\s*$").expect("frame regex should be valid")
    });
    let location_re = LOCATION_RE.get_or_init(|| {
        Regex::new(r"^\s+at\s+(.+?)\s*$").expect("location regex should be valid")
    });

    let mut frames: Vec<(String, Option<String>)> = Vec::new();
    for line in rendered.lines() {
        if let Some(caps) = frame_re.captures(line) {
            frames.push((caps[1].to_string(), None));
        } else if let Some(caps) = location_re.captures(line) {
            if let Some(last) = frames.last_mut() {
                if last.1.is_none() {
                    last.1 = Some(caps[1].to_string());
                }
            }
        }
    }

    frames
        .into_iter()
        .filter(|(symbol, _)| !is_noise(symbol))
        .map(|(symbol, location)| match location {
            Some(location) => format!("{} ({})", symbol, location),
            None => symbol,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_noise(symbol: &str) -> bool {
    if has_noise_prefix(symbol) {
        return true;
    }
    let (self_type, trait_path) = split_qualified(symbol);
    let self_type = strip_decorations(self_type);
    if has_noise_prefix(self_type) {
        return true;
    }
    // `<usize as core::..>` and closure shims are runtime plumbing; a user type
    // implementing a std trait is not.
    match trait_path {
        Some(path) => {
            has_noise_prefix(path)
                && (!self_type.contains("::") || path.starts_with(CALL_SHIM_TRAIT))
        }
        None => false,
    }
}

fn has_noise_prefix(symbol: &str) -> bool {
    NOISE_PREFIXES
        .iter()
        .any(|prefix| symbol.starts_with(prefix))
}

/// Splits `<Self as Trait>::item` into its self type and trait path, and
/// `<Self>::item` into its self type.
fn split_qualified(symbol: &str) -> (&str, Option<&str>) {
    let Some(inner) = symbol.strip_prefix('<') else {
        return (symbol, None);
    };
    let mut depth = 0usize;
    let mut previous = ' ';
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            // `->` in fn signatures
            '>' if previous == '-' => {}
            '>' if depth == 0 => return (&inner[..i], None),
            '>' => depth -= 1,
            ' ' if depth == 0 && inner[i..].starts_with(" as ") => {
                return (&inner[..i], Some(&inner[i + 4..]));
            }
            _ => {}
        }
        previous = c;
    }
    (inner, None)
}

fn strip_decorations(mut ty: &str) -> &str {
    loop {
        let trimmed = ty.trim_start_matches(['<', '&', '*', '(', '[']);
        let trimmed = ["dyn ", "mut ", "const ", "impl "]
            .iter()
            .find_map(|keyword| trimmed.strip_prefix(keyword))
            .unwrap_or(trimmed);
        if trimmed.len() == ty.len() {
            return ty;
        }
        ty = trimmed;
    }
}

//! Capturing errors and panics raised by user code
//!
//! A process-wide panic hook is installed the first time anything runs
//! under [`run_captured`]. While a thread is capturing, the hook records the
//! panic location and, when backtraces are enabled, a backtrace with the
//! panic machinery and the engine's own dispatch frames removed. Panics on
//! threads that are not capturing go to the previous hook unchanged.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;
use serde::Serialize;

/// An error or panic that is not an assertion failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnexpectedError {
    pub message: String,
    pub location: Option<String>,
    pub backtrace: Option<String>,
}

impl UnexpectedError {
    pub fn new(message: impl Into<String>) -> Self {
        UnexpectedError {
            message: message.into(),
            location: None,
            backtrace: None,
        }
    }

    fn from_error(error: &anyhow::Error) -> Self {
        UnexpectedError::new(format!("{:#}", error))
    }
}

impl fmt::Display for UnexpectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " at {}", location)?;
        }
        if let Some(backtrace) = &self.backtrace {
            write!(f, "\n{}", backtrace)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct PanicDetails {
    location: Option<String>,
    backtrace: Option<String>,
}

thread_local! {
    static CAPTURING: Cell<usize> = Cell::new(0);
    static LAST_PANIC: RefCell<Option<PanicDetails>> = RefCell::new(None);
}

static HOOK: OnceCell<()> = OnceCell::new();

fn install_hook() {
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CAPTURING.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let backtrace = Backtrace::capture();
            let details = PanicDetails {
                location: info.location().map(ToString::to_string),
                backtrace: match backtrace.status() {
                    BacktraceStatus::Captured => Some(trim_engine_frames(&backtrace.to_string())),
                    _ => None,
                },
            };
            LAST_PANIC.with(|last| *last.borrow_mut() = Some(details));
        }));
    });
}

/// Run `f`, turning an error it returns or a panic it raises into an
/// [`UnexpectedError`]
pub(crate) fn run_captured<T>(
    f: impl FnOnce() -> anyhow::Result<T>,
) -> Result<T, UnexpectedError> {
    install_hook();
    CAPTURING.with(|depth| depth.set(depth.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    CAPTURING.with(|depth| depth.set(depth.get() - 1));

    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(UnexpectedError::from_error(&error)),
        Err(payload) => {
            let details = LAST_PANIC
                .with(|last| last.borrow_mut().take())
                .unwrap_or_default();
            Err(UnexpectedError {
                message: panic_message(payload.as_ref()),
                location: details.location,
                backtrace: details.backtrace,
            })
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}

const MACHINERY: &[&str] = &[
    "std::backtrace",
    "std::panicking",
    "std::panic",
    "std::sys",
    "std::rt",
    "core::panicking",
    "core::result::unwrap_failed",
    "core::option::unwrap_failed",
    "core::option::expect_failed",
    "rust_begin_unwind",
    "__rust",
    "<alloc::boxed::Box<F,A> as core::ops::function::Fn",
    "bspec_engine::",
];

const DISPATCH: &[&str] = &[
    "bspec_engine::",
    "std::panicking::try",
    "std::panic::catch_unwind",
    "__rust_try",
];

struct Frame<'t> {
    symbol: &'t str,
    lines: Vec<&'t str>,
}

fn split_frames(backtrace: &str) -> Vec<Frame<'_>> {
    let mut frames: Vec<Frame<'_>> = Vec::new();
    for line in backtrace.lines() {
        let trimmed = line.trim_start();
        let header = trimmed
            .split_once(": ")
            .filter(|(index, _)| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()));
        match header {
            Some((_, symbol)) => frames.push(Frame {
                symbol,
                lines: vec![line],
            }),
            None => {
                if let Some(frame) = frames.last_mut() {
                    frame.lines.push(line);
                }
            }
        }
    }
    frames
}

/// Keep only the frames between the panic machinery on top and the
/// engine's dispatch below, so the backtrace starts and ends in user code
pub fn trim_engine_frames(backtrace: &str) -> String {
    let frames = split_frames(backtrace);
    let start = frames
        .iter()
        .position(|frame| !starts_with_any(frame.symbol, MACHINERY))
        .unwrap_or(frames.len());
    let mut end = frames[start..]
        .iter()
        .position(|frame| starts_with_any(frame.symbol, DISPATCH))
        .map_or(frames.len(), |offset| start + offset);
    while end > start && frames[end - 1].symbol.starts_with("core::ops::function::") {
        end -= 1;
    }

    frames[start..end]
        .iter()
        .flat_map(|frame| frame.lines.iter().copied())
        .collect::<Vec<_>>()
        .join("\n")
}

fn starts_with_any(symbol: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| symbol.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKTRACE: &str = "\
   0: bspec_engine::capture::install_hook::{{closure}}
             at ./bspec-engine/src/capture.rs:70:29
   1: std::panicking::rust_panic_with_hook
   2: std::panicking::begin_panic_handler::{{closure}}
   3: core::panicking::panic_fmt
   4: my_specs::fixtures::load
             at ./tests/fixtures.rs:12:9
   5: my_specs::list_spec::{{closure}}
             at ./tests/list_spec.rs:30:13
   6: core::ops::function::FnOnce::call_once
   7: std::panicking::try::do_call
   8: std::panic::catch_unwind
   9: bspec_engine::capture::run_captured
  10: bspec_engine::behavior::Behavior::should
  11: rayon_core::registry::WorkerThread::wait_until_cold";

    #[test]
    fn test_trim_keeps_user_frames_only() {
        let trimmed = trim_engine_frames(BACKTRACE);
        assert_eq!(
            trimmed,
            "   4: my_specs::fixtures::load
             at ./tests/fixtures.rs:12:9
   5: my_specs::list_spec::{{closure}}
             at ./tests/list_spec.rs:30:13"
        );
    }

    #[test]
    fn test_trim_without_engine_frames_keeps_everything_after_machinery() {
        let backtrace = "   0: core::panicking::panic_fmt\n   1: app::main\n   2: app::start";
        assert_eq!(trim_engine_frames(backtrace), "   1: app::main\n   2: app::start");
        assert_eq!(trim_engine_frames(""), "");
    }

    #[test]
    fn test_returned_error_is_captured() {
        let error = run_captured(|| -> anyhow::Result<()> {
            Err(anyhow::anyhow!("disk full").context("writing fixture"))
        })
        .unwrap_err();
        assert_eq!(error, UnexpectedError::new("writing fixture: disk full"));
    }

    #[test]
    fn test_panic_is_captured_with_location() {
        let error = run_captured(|| -> anyhow::Result<()> { panic!("boom {}", 7) }).unwrap_err();
        assert_eq!(error.message, "boom 7");
        let location = error.location.unwrap();
        assert!(location.contains("capture.rs"), "{}", location);
    }

    #[test]
    fn test_value_passes_through() {
        assert_eq!(run_captured(|| Ok(3)).unwrap(), 3);
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&3_u8), "panic with a non-string payload");
    }
}

//! Process-wide crash capture.
//!
//! When crash logging is enabled and a file-backed destination exists, a
//! panic hook is installed that writes a Fatal record before the previous
//! hook (and the unwind itself) proceeds. The hook chains: whatever hook
//! was registered before installation still runs afterwards.

use crate::core::config::CrashVerbosity;
use crate::core::dispatcher::FlexLogger;
use crate::core::level::LogLevel;
use crate::core::record::get_thread_name;
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);
static HOOK_LOGGER: Mutex<Option<Arc<FlexLogger>>> = Mutex::new(None);

thread_local! {
    // A destination panicking inside the hook must not re-enter it.
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

/// Point the crash hook at `logger`, installing it on first use.
///
/// Subsequent calls only swap the logger; the hook itself is registered
/// once per process so reconfiguration never stacks duplicate hooks.
pub(crate) fn install(logger: Arc<FlexLogger>) {
    *HOOK_LOGGER.lock() = Some(logger);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        handle_panic(info);
        previous(info);
    }));
}

fn handle_panic(info: &PanicHookInfo<'_>) {
    if IN_HOOK.with(|flag| flag.replace(true)) {
        return;
    }

    let logger = HOOK_LOGGER.lock().clone();
    if let Some(logger) = logger {
        let config = logger.snapshot();
        if config.enabled && config.crash_logging {
            let message = payload_message(info);
            let location = info.location().map(|l| l.to_string());
            let backtrace = match config.crash_verbosity {
                CrashVerbosity::Large => Some(Backtrace::force_capture().to_string()),
                _ => None,
            };
            let crash_message = build_crash_message(
                config.crash_verbosity,
                &message,
                &get_thread_name(),
                location.as_deref(),
                backtrace.as_deref(),
            );

            logger.log(LogLevel::Fatal, Some("CRASH"), crash_message.clone(), None);
            logger.flush();

            // Detached: the previous hook and the unwind itself must never
            // wait on the network call.
            #[cfg(feature = "ai-assist")]
            if let Some(ai_config) = config.ai.clone() {
                let _ = crate::ai::spawn_report(logger, ai_config, crash_message);
            }
        }
    }

    IN_HOOK.with(|flag| flag.set(false));
}

fn payload_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Render the crash report at the configured verbosity.
pub(crate) fn build_crash_message(
    verbosity: CrashVerbosity,
    message: &str,
    thread_name: &str,
    location: Option<&str>,
    backtrace: Option<&str>,
) -> String {
    match verbosity {
        CrashVerbosity::Small => format!("App crashed: {}", message),
        CrashVerbosity::Medium => format!(
            "App crashed: {}\nThread: {}\nTop Stack Trace: {}",
            message,
            thread_name,
            location.unwrap_or("unknown")
        ),
        CrashVerbosity::Large => format!(
            "App crashed: {}\nThread: {}\nStack Trace:\n{}",
            message,
            thread_name,
            backtrace.unwrap_or("unavailable")
        ),
    }
}

use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|e| e.into_inner())
}

/// Start holding diagnostics back. Used while the TUI owns the terminal.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Stop buffering and return everything collected since `activate`.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a diagnostic line. Stored while buffering is active, otherwise
/// printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Like `eprintln!`, but routed through the stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::warn(format!($($arg)*))
    };
}

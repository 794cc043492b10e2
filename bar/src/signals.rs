//! Exit-signal handling.
//!
//! Ctrl+C, console close, and SIGTERM must go through the same orderly
//! shutdown as the tray Exit action, otherwise the work-area reservation
//! leaks. The handlers only flip a flag; the main loop observes it and
//! drives the teardown itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use tracing::warn;

static EXIT: LazyLock<Arc<AtomicBool>> = LazyLock::new(|| Arc::new(AtomicBool::new(false)));

/// True once any exit signal has arrived.
pub fn exit_requested() -> bool {
    EXIT.load(Ordering::SeqCst)
}

#[cfg(target_os = "windows")]
pub fn install() {
    use windows::Win32::System::Console::SetConsoleCtrlHandler;

    unsafe {
        if let Err(e) = SetConsoleCtrlHandler(Some(console_handler), true) {
            warn!("failed to install console ctrl handler: {}", e);
        }
    }
}

#[cfg(target_os = "windows")]
unsafe extern "system" fn console_handler(_ctrl_type: u32) -> windows::Win32::Foundation::BOOL {
    EXIT.store(true, Ordering::SeqCst);
    true.into()
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn install() {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::flag;

    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = flag::register(signal, Arc::clone(&EXIT)) {
            warn!(signal, "failed to register signal handler: {}", e);
        }
    }
}

#[cfg(not(any(target_os = "windows", all(unix, not(target_os = "macos")))))]
pub fn install() {
    warn!("no exit-signal handling on this platform");
}

//! Cooperative shutdown between work units

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Request shutdown (signal handlers and tests)
pub fn request_shutdown() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Register SIGINT/SIGTERM to request a cooperative stop.
///
/// The driver checks the flag between work units, finishes the unit in
/// flight, and exits with code 130; the unit being processed is either
/// fully checkpointed or replayed on the next run.
pub fn install_signal_handlers() -> io::Result<()> {
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        unsafe {
            signal_hook::low_level::register(signal, request_shutdown)?;
        }
    }
    Ok(())
}

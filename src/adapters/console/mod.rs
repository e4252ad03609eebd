//! Console messenger transport and startup banner.

pub mod banner;
pub mod transport;

pub use transport::ConsoleMessenger;

/// Prints the welcome banner. Call once at startup, after tracing init.
pub fn init_ui() {
    banner::print_welcome();
}

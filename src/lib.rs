//! PTY session management, a byte-driven VT/ANSI parser, and a stateful
//! terminal screen emulator — the headless core behind a terminal UI.
//! Rendering, AI features, window chrome, and key-event capture live above
//! this crate.

pub mod attrs;
pub mod color;
pub mod config;
pub mod cursor;
pub mod emulator;
pub mod error;
pub mod grid;
pub mod key_encoder;
pub mod modes;
pub mod parser;
pub mod pty;
pub mod shell;
pub mod state;

pub use emulator::Emulator;
pub use error::{Result, TerminalError};
pub use pty::{PtyManager, Session};
pub use state::State;

/// Installs a `tracing-subscriber` formatter honoring `RUST_LOG`, defaulting
/// to `info` for this crate if unset. Call once from the hosting
/// application's entry point; the core itself never initializes global
/// logging on its own (a library has no business doing that for its host).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "harborterm_core=info".into()),
        )
        .init();
}

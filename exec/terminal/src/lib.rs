//! Stateful terminal sessions shared across tool calls.
//!
//! A [`SessionMultiplexer`] owns every live session. Each session wraps one
//! terminal process, buffers its output with absolute offsets, and runs the
//! commands submitted to it one at a time in submission order. Sessions that
//! stay idle past the configured TTL are evicted.

mod backend;
mod buffer;
pub mod error;
mod marker;
mod multiplexer;
mod pty;
mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use backend::LaunchSpec;
pub use backend::SpawnedTerminal;
pub use backend::TerminalBackend;
pub use backend::TerminalProcess;
pub use error::Result;
pub use error::TerminalError;
pub use marker::strip_markers;
pub use multiplexer::OpenOptions;
pub use multiplexer::SessionMultiplexer;
pub use pty::PtyBackend;
pub use session::CommandOutput;
pub use session::ReadResult;
pub use session::Session;
pub use session::SessionInfo;

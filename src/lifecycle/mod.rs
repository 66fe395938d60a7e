//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → Validate → Register downstreams → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → broadcast signal → server drains → Exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;

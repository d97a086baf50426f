//! Githerd daemon runtime: scan scheduler + interactive command loop.
//!
//! Owns the "at most one scan cycle in flight" guarantee: every trigger
//! (startup, keyboard, periodic timer) funnels through a single capacity-1
//! job queue drained by one processor task.

mod error;
pub mod restart;
mod runtime;

pub use error::DaemonError;
pub use runtime::{run, start_blocking, ExitAction};

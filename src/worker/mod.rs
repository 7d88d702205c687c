//! Concurrent execution of invocations
//!
//! One OS thread per dispatched invocation, no pooling. Cancellation is
//! global and cooperative through a shared [`CancelFlag`].

pub mod cancel;
pub mod manager;

pub use cancel::CancelFlag;
pub use manager::{StopReport, WorkerId, WorkerManager};

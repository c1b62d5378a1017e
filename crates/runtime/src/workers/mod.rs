//! Background worker tasks owned by the runtime.

mod sweeper;

pub use sweeper::SweepWorker;

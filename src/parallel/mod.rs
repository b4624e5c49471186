pub mod batch;
pub mod pool;

pub use batch::{solve_batch, BatchError, BatchItem};
pub use pool::WorkerPool;

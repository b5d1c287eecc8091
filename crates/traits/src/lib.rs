//! Seams between the renderer and its collaborators.

pub mod executor;
pub mod seal;

pub use executor::{Executor, SyncExecutor};
pub use seal::{NoSealExtractor, SealError, SealExtractor};

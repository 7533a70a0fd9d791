//! @ai:module:intent Task corpus definitions and loading
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkTask, GroundTruth, CorpusLoader

pub mod loader;
pub mod task;

pub use loader::{CorpusLoader, CorpusLoaderTrait};
pub use task::{BenchmarkTask, GroundTruth};

pub mod joiner;
pub mod normalizer;
pub mod pipeline;

pub use joiner::DataJoiner;
pub use normalizer::{DateErrorPolicy, Normalizer};
pub use pipeline::Pipeline;

pub mod aggregator;
pub mod dedup;
pub mod providers;
pub mod ranker;
pub mod recorder;

pub use aggregator::Aggregator;
pub use ranker::Ranker;
pub use recorder::InteractionRecorder;

pub mod aggregator;
pub mod byte_counter;
pub mod progress;
pub mod ranking;

pub use aggregator::{analyze_stream, Aggregates, ContextAggregator, StreamAnalysis};
pub use byte_counter::CountingReader;
pub use progress::{format_status, ProgressReporter};
pub use ranking::{rank, top_n};

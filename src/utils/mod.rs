pub mod size_format;

pub use size_format::{nanos_to_millis, to_mib};

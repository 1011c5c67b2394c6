pub mod archive_pipe;
pub mod context_builder;
pub mod disk_walker;
pub mod ignore_rules;

pub use archive_pipe::ContextArchive;
pub use context_builder::{canonical_archive_name, ContextBuilder};
pub use disk_walker::DiskWalker;
pub use ignore_rules::{IgnoreRule, IgnoreRules};

pub mod archive_entry;
pub mod context_report;

pub use archive_entry::{directory_of, extension_of, ArchiveEntry, EntryTotals};
pub use context_report::{ContextReport, RankedEntry};

//! Run transcripts: the JSONL oracle log and the plain-text grouping report.

mod grouping_report;
mod jsonl_logger;

pub use grouping_report::GroupingReportWriter;
pub use jsonl_logger::JsonlConversationLogger;

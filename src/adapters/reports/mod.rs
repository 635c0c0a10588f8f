//! Report adapters - rendering resolved documents.

mod file_report_sink;

pub use file_report_sink::FileReportSink;

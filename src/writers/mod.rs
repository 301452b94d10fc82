pub mod report_writer;

pub use report_writer::{month_label, ReportFormat, ReportWriter};

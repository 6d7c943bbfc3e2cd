mod notes;

pub use notes::{ReportPaths, build_report, write_report};

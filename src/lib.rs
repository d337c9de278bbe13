pub mod approx;
pub mod format;
pub mod opts;
pub mod report;
pub mod runtime;
pub mod targets;
pub mod utils;

pub mod rational;
pub mod samples;

mod conversion;
mod rounding;

pub use conversion::{exact, FixedPoint};
pub use rounding::RoundBinary;

//! Built-in target functions.

use std::f64::consts::FRAC_PI_2;

use strum::VariantNames;
use strum_macros::{EnumString, IntoStaticStr, VariantNames};

use crate::approx::{Domain, DomainError, FitOptions, TableSpec};
use crate::format::Format;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, VariantNames,
)]
pub enum Target {
    /// Sine over the first quadrant, addressed by binary angle.
    #[strum(to_string = "sin")]
    Sin,
    /// Cosine over the first quadrant.
    #[strum(to_string = "cos")]
    Cos,
    /// Base-2 logarithm over `[1, 2)`.
    #[strum(to_string = "log2")]
    Log2,
    /// Base-2 exponential over `[0, 1)`.
    #[strum(to_string = "exp2")]
    Exp2,
    /// The mantissa value itself over `[1, 2)`, for float scaling.
    #[strum(to_string = "mantissa")]
    Mantissa,
}

/// Generation parameters that suit a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Defaults {
    pub segments: usize,
    pub degree: u32,
    pub grid_size: usize,
    pub index_bits: u32,
}

impl Target {
    pub const NAMES: &[&str] = <Self as VariantNames>::VARIANTS;

    pub fn eval(self, x: f64) -> f64 {
        match self {
            Target::Sin => x.sin(),
            Target::Cos => x.cos(),
            Target::Log2 => x.log2(),
            Target::Exp2 => x.exp2(),
            Target::Mantissa => x,
        }
    }

    pub fn domain(self) -> Domain {
        let (lo, hi) = match self {
            Target::Sin | Target::Cos => (0.0, FRAC_PI_2),
            Target::Log2 | Target::Mantissa => (1.0, 2.0),
            Target::Exp2 => (0.0, 1.0),
        };

        Domain { lo, hi }
    }

    pub fn defaults(self) -> Defaults {
        match self {
            Target::Sin | Target::Cos => Defaults {
                segments: 32,
                degree: 5,
                grid_size: 8192,
                index_bits: 14,
            },
            Target::Log2 | Target::Exp2 => Defaults {
                segments: 16,
                degree: 3,
                grid_size: 4096,
                index_bits: 16,
            },
            Target::Mantissa => Defaults {
                segments: 32,
                degree: 1,
                grid_size: 4096,
                index_bits: 23,
            },
        }
    }

    /// A table specification with this target's defaults.
    pub fn spec(self, format: Format) -> Result<TableSpec, DomainError> {
        let defaults = self.defaults();
        let domain = self.domain();

        Ok(TableSpec {
            domain: Domain::new(domain.lo, domain.hi)?,
            segments: defaults.segments,
            index_bits: defaults.index_bits,
            delta_bits: 16,
            format,
            fit: FitOptions {
                degree: defaults.degree,
                grid_size: defaults.grid_size,
                ..Default::default()
            },
            accept_partial: false,
        })
    }
}

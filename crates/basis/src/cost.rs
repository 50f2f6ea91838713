//! Additive cost functionals over coefficient arrays.

use crate::error::BasisError;

/// Additive cost functional measuring coefficient concentration.
///
/// All variants are additive: the cost of a vector is a sum over its
/// coordinates, so a parent's cost is directly comparable to the combined
/// cost of its children — the property the best-basis recursion relies on.
/// Zero coordinates contribute nothing, so degenerate inputs (including the
/// all-zero vector) always yield a finite value.
///
/// # Example
///
/// ```
/// use apollo_basis::CostFunction;
///
/// let cost = CostFunction::LpNorm { p: 1.0 };
/// assert_eq!(cost.evaluate(&[3.0, -4.0]), 7.0);
/// assert_eq!(cost.evaluate(&[0.0, 0.0]), 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CostFunction {
    /// Shannon-style entropy in its unnormalized additive form:
    /// `-sum x^2 ln(x^2)` over non-zero coordinates.
    ShannonEntropy,
    /// Log-energy entropy: `sum ln(x^2)` over non-zero coordinates.
    LogEnergy,
    /// `l^p` concentration: `sum |x|^p`.
    LpNorm {
        /// Norm exponent; must be finite and positive.
        p: f64,
    },
    /// Number of coordinates with magnitude above the threshold.
    Threshold {
        /// Magnitude threshold; must be finite and non-negative.
        t: f64,
    },
}

impl Default for CostFunction {
    /// Returns [`CostFunction::ShannonEntropy`].
    fn default() -> Self {
        Self::ShannonEntropy
    }
}

impl CostFunction {
    /// Evaluates the cost of a coefficient array.
    pub fn evaluate(&self, coeffs: &[f64]) -> f64 {
        match self {
            // Squares that underflow to zero are skipped along with exact
            // zeros so ln never sees a zero argument.
            Self::ShannonEntropy => coeffs
                .iter()
                .map(|x| x * x)
                .filter(|e| *e != 0.0)
                .map(|e| -e * e.ln())
                .sum(),
            Self::LogEnergy => coeffs
                .iter()
                .map(|x| x * x)
                .filter(|e| *e != 0.0)
                .map(|e| e.ln())
                .sum(),
            Self::LpNorm { p } => coeffs.iter().map(|x| x.abs().powf(*p)).sum(),
            Self::Threshold { t } => coeffs.iter().filter(|x| x.abs() > *t).count() as f64,
        }
    }

    /// Parses a cost functional from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Functional |
    /// |-------|------------|
    /// | `"shannon"`, `"shannon-entropy"` | [`CostFunction::ShannonEntropy`] |
    /// | `"log-energy"`, `"log-energy-entropy"` | [`CostFunction::LogEnergy`] |
    /// | `"norm"`, `"l1"` | [`CostFunction::LpNorm`] with `p = 1` |
    ///
    /// # Errors
    ///
    /// Returns [`BasisError::UnknownCost`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, BasisError> {
        match name.to_lowercase().as_str() {
            "shannon" | "shannon-entropy" => Ok(Self::ShannonEntropy),
            "log-energy" | "log-energy-entropy" => Ok(Self::LogEnergy),
            "norm" | "l1" => Ok(Self::LpNorm { p: 1.0 }),
            _ => Err(BasisError::UnknownCost(name.to_string())),
        }
    }

    /// Validates functional parameters.
    ///
    /// # Errors
    ///
    /// Returns [`BasisError::InvalidCostParameter`] if `p` is non-finite or
    /// non-positive, or `t` is non-finite or negative.
    pub fn validate(&self) -> Result<(), BasisError> {
        match self {
            Self::LpNorm { p } => {
                if !p.is_finite() || *p <= 0.0 {
                    return Err(BasisError::InvalidCostParameter {
                        name: "p",
                        value: *p,
                    });
                }
            }
            Self::Threshold { t } => {
                if !t.is_finite() || *t < 0.0 {
                    return Err(BasisError::InvalidCostParameter {
                        name: "t",
                        value: *t,
                    });
                }
            }
            Self::ShannonEntropy | Self::LogEnergy => {}
        }
        Ok(())
    }
}

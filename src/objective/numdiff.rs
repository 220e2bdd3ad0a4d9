//! Centered finite-difference gradient checks.

use super::ObjectiveError;

/// Analytic and numeric derivative of one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientCheck {
    /// Coordinate index.
    pub index: usize,
    /// Analytic gradient entry.
    pub analytic: f64,
    /// Centered difference `(f(x + e) - f(x - e)) / 2e`.
    pub numeric: f64,
}

impl GradientCheck {
    /// `|analytic - numeric| / max(1, |analytic|, |numeric|)`.
    pub fn relative_error(&self) -> f64 {
        let scale = 1f64.max(self.analytic.abs()).max(self.numeric.abs());
        (self.analytic - self.numeric).abs() / scale
    }
}

/// Compare `analytic` with centered differences of `objective` at `x` for
/// each of `indices`.
pub fn check_gradient<F>(
    mut objective: F,
    x: &[f64],
    analytic: &[f64],
    indices: &[usize],
    epsilon: f64,
) -> Result<Vec<GradientCheck>, ObjectiveError>
where
    F: FnMut(&[f64]) -> Result<f64, ObjectiveError>,
{
    if analytic.len() != x.len() {
        return Err(ObjectiveError::InvalidInput(format!(
            "gradient has {} entries, parameters have {}",
            analytic.len(),
            x.len()
        )));
    }
    if !(epsilon.is_finite() && epsilon > 0.0) {
        return Err(ObjectiveError::InvalidInput(format!(
            "step size must be positive, got {epsilon}"
        )));
    }

    let mut probe = x.to_vec();
    let mut checks = Vec::with_capacity(indices.len());
    for &index in indices {
        let Some(&x0) = x.get(index) else {
            return Err(ObjectiveError::InvalidInput(format!(
                "index {index} out of range for {} parameters",
                x.len()
            )));
        };
        probe[index] = x0 + epsilon;
        let f_plus = objective(&probe)?;
        probe[index] = x0 - epsilon;
        let f_minus = objective(&probe)?;
        probe[index] = x0;

        checks.push(GradientCheck {
            index,
            analytic: analytic[index],
            numeric: (f_plus - f_minus) / (2.0 * epsilon),
        });
    }
    Ok(checks)
}

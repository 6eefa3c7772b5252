//! Minimizer configuration.

/// Tolerances and budgets handed to the minimization backends.
///
/// # Examples
///
/// ```
/// use u_formulate::nlp::NlpConfig;
///
/// let config = NlpConfig::default()
///     .with_constraint_tol(1e-9)
///     .with_max_evaluations(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NlpConfig {
    /// Relative change in the objective below which the backend stops.
    pub f_tol: f64,

    /// Relative change in the design vector below which the backend stops.
    pub x_tol: f64,

    /// Largest constraint violation accepted as feasible.
    pub constraint_tol: f64,

    /// Objective evaluation budget.
    pub max_evaluations: usize,

    /// Initial trust-region radius for COBYLA.
    pub rho_begin: f64,

    /// Relative step for finite-difference gradients.
    pub gradient_step: f64,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            f_tol: 1e-10,
            x_tol: 1e-10,
            constraint_tol: 1e-8,
            max_evaluations: 2_000,
            rho_begin: 0.5,
            gradient_step: 1.5e-8,
        }
    }
}

impl NlpConfig {
    pub fn with_f_tol(mut self, tol: f64) -> Self {
        self.f_tol = tol;
        self
    }

    pub fn with_x_tol(mut self, tol: f64) -> Self {
        self.x_tol = tol;
        self
    }

    pub fn with_constraint_tol(mut self, tol: f64) -> Self {
        self.constraint_tol = tol;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_rho_begin(mut self, rho: f64) -> Self {
        self.rho_begin = rho;
        self
    }

    pub fn with_gradient_step(mut self, step: f64) -> Self {
        self.gradient_step = step;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, tol) in [
            ("f_tol", self.f_tol),
            ("x_tol", self.x_tol),
            ("constraint_tol", self.constraint_tol),
        ] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(format!("{name} must be finite and non-negative, got {tol}"));
            }
        }
        for (name, value) in [
            ("rho_begin", self.rho_begin),
            ("gradient_step", self.gradient_step),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and positive, got {value}"));
            }
        }
        if self.max_evaluations == 0 {
            return Err("max_evaluations must be at least 1".into());
        }
        if u32::try_from(self.max_evaluations).is_err() {
            return Err(format!(
                "max_evaluations must fit in 32 bits, got {}",
                self.max_evaluations
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NlpConfig::default();
        assert_eq!(config.max_evaluations, 2_000);
        assert_eq!(config.rho_begin, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_tolerance() {
        assert!(NlpConfig::default().with_f_tol(-1.0).validate().is_err());
        assert!(NlpConfig::default().with_x_tol(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_validate_bad_step() {
        assert!(NlpConfig::default().with_rho_begin(0.0).validate().is_err());
        assert!(NlpConfig::default()
            .with_gradient_step(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_budget() {
        assert!(NlpConfig::default().with_max_evaluations(0).validate().is_err());
        assert!(NlpConfig::default()
            .with_max_evaluations(usize::MAX)
            .validate()
            .is_err());
    }
}

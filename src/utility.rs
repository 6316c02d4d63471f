//! Period utility functions over consumption.

use std::fmt;
use std::sync::Arc;

/// Shared, thread-safe period utility `u(c)`.
#[derive(Clone)]
pub struct Utility {
    name: String,
    func: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
}

impl Utility {
    /// Wraps an arbitrary utility function. `name` is only used for diagnostics.
    pub fn new<S, F>(name: S, func: F) -> Self
    where
        S: Into<String>,
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// `u(c) = ln(c)`.
    pub fn log() -> Self {
        Self::new("log", f64::ln)
    }

    /// `u(c) = √c`.
    pub fn sqrt() -> Self {
        Self::new("sqrt", f64::sqrt)
    }

    /// Constant relative risk aversion utility `c^(1-γ) / (1-γ)`, log when `γ = 1`.
    pub fn crra(gamma: f64) -> Self {
        if (gamma - 1.0).abs() < f64::EPSILON {
            return Self::new("crra(1)", f64::ln);
        }
        Self::new(format!("crra({gamma})"), move |c: f64| {
            c.powf(1.0 - gamma) / (1.0 - gamma)
        })
    }

    /// Evaluates `u(c)`.
    pub fn eval(&self, consumption: f64) -> f64 {
        (self.func)(consumption)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Utility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Utility").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn crra_with_unit_gamma_is_log() {
        let u = Utility::crra(1.0);
        assert_relative_eq!(u.eval(2.0), 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn crra_half_is_scaled_sqrt() {
        let u = Utility::crra(0.5);
        assert_relative_eq!(u.eval(4.0), 4.0, epsilon = 1e-12);
        assert_eq!(u.name(), "crra(0.5)");
    }

    #[test]
    fn custom_utility_is_callable() {
        let u = Utility::new("linear", |c| 3.0 * c);
        assert_eq!(u.eval(2.0), 6.0);
        assert!(format!("{u:?}").contains("linear"));
    }
}

use num_traits::Float;

/// Straight line through two samples, `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit<T> {
    pub slope: T,
    pub intercept: T,
}

impl<T: Float> LinearFit<T> {
    /// Fits the line through `(x1, y1)` and `(x2, y2)`. Returns `None` when `x1 == x2`.
    pub fn through(x1: T, y1: T, x2: T, y2: T) -> Option<Self> {
        if x1 == x2 {
            return None;
        }
        let slope = (y1 - y2) / (x1 - x2);
        let intercept = y1 - slope * x1;
        Some(Self { slope, intercept })
    }

    /// Evaluates the line at `x`. No clamping: values outside `[x1, x2]` extrapolate.
    pub fn eval(&self, x: T) -> T {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_reproduces_endpoints_and_midpoint() {
        let fit = LinearFit::through(20.0f32, 15.0, 30.0, 25.0).unwrap();
        assert_eq!(fit.slope, 1.0);
        assert_eq!(fit.intercept, -5.0);
        assert_eq!(fit.eval(25.0), 20.0);
    }

    #[test]
    fn fit_extrapolates_without_clamping() {
        let fit = LinearFit::through(0.0f64, 0.0, 10.0, 5.0).unwrap();
        assert_eq!(fit.eval(20.0), 10.0);
        assert_eq!(fit.eval(-10.0), -5.0);
    }

    #[test]
    fn fit_rejects_equal_abscissae() {
        assert!(LinearFit::through(3.0f32, 1.0, 3.0, 2.0).is_none());
    }
}

//! Interpolating cubic spline on a uniform grid
//!
//! Uses the not-a-knot end condition, so an exact (zero smoothing) fit
//! through cubic data reproduces the cubic. Evaluation outside the knot
//! span extrapolates the end polynomials.

use nalgebra::{DMatrix, DVector};

use crate::domain::{DpdError, DpdResult};

/// Cubic spline through `(x0 + i·step, values[i])`
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x0: f64,
    step: f64,
    values: Vec<f64>,
    /// Second derivative at each knot
    curvature: Vec<f64>,
}

impl CubicSpline {
    pub fn uniform(x0: f64, step: f64, values: Vec<f64>) -> DpdResult<Self> {
        let n = values.len();
        if n < 4 {
            return Err(DpdError::InvalidArgument(format!(
                "cubic spline needs at least 4 knots, got {n}"
            )));
        }
        if !(step > 0.0) {
            return Err(DpdError::InvalidArgument(format!(
                "spline knot spacing must be positive, got {step}"
            )));
        }

        let mut system = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // Third derivative continuous across the second and second-to-last knots
        system[(0, 0)] = 1.0;
        system[(0, 1)] = -2.0;
        system[(0, 2)] = 1.0;
        system[(n - 1, n - 3)] = 1.0;
        system[(n - 1, n - 2)] = -2.0;
        system[(n - 1, n - 1)] = 1.0;

        let scale = 6.0 / (step * step);
        for i in 1..n - 1 {
            system[(i, i - 1)] = 1.0;
            system[(i, i)] = 4.0;
            system[(i, i + 1)] = 1.0;
            rhs[i] = scale * (values[i + 1] - 2.0 * values[i] + values[i - 1]);
        }

        let curvature = system
            .lu()
            .solve(&rhs)
            .ok_or_else(|| DpdError::NumericDegeneracy("singular spline system".to_string()))?;

        Ok(Self {
            x0,
            step,
            values,
            curvature: curvature.iter().copied().collect(),
        })
    }

    /// Second derivative at knot `i`
    pub fn knot_curvature(&self, i: usize) -> f64 {
        self.curvature[i]
    }

    fn segment(&self, x: f64) -> usize {
        let last = self.values.len() - 2;
        let i = ((x - self.x0) / self.step).floor();
        if i < 0.0 {
            0
        } else {
            (i as usize).min(last)
        }
    }

    /// Polynomial coefficients `(y, slope, c2, c3)` of segment `i` in `t = x - x_i`
    fn coefficients(&self, i: usize) -> (f64, f64, f64, f64) {
        let h = self.step;
        let (y0, y1) = (self.values[i], self.values[i + 1]);
        let (m0, m1) = (self.curvature[i], self.curvature[i + 1]);
        let slope = (y1 - y0) / h - h * (2.0 * m0 + m1) / 6.0;
        (y0, slope, m0 / 2.0, (m1 - m0) / (6.0 * h))
    }

    fn knot(&self, i: usize) -> f64 {
        self.x0 + self.step * i as f64
    }

    pub fn eval(&self, x: f64) -> f64 {
        let i = self.segment(x);
        let t = x - self.knot(i);
        let (y, slope, c2, c3) = self.coefficients(i);
        y + t * (slope + t * (c2 + t * c3))
    }

    /// Local maximum of the spline in the neighbourhood of `guess`
    ///
    /// Examines the segment holding `guess` and its two neighbours, taking
    /// the best of their end knots and interior stationary points.
    pub fn peak_near(&self, guess: f64) -> (f64, f64) {
        let centre = self.segment(guess);
        let first = centre.saturating_sub(1);
        let last = (centre + 1).min(self.values.len() - 2);

        let mut best = (guess, self.eval(guess));
        let mut consider = |x: f64| {
            let value = self.eval(x);
            if value > best.1 {
                best = (x, value);
            }
        };

        for i in first..=last {
            let start = self.knot(i);
            consider(start);
            consider(start + self.step);

            // S'(t) = slope + 2·c2·t + 3·c3·t²
            let (_, slope, c2, c3) = self.coefficients(i);
            for t in quadratic_roots(3.0 * c3, 2.0 * c2, slope) {
                if (0.0..=self.step).contains(&t) {
                    consider(start + t);
                }
            }
        }
        best
    }
}

/// Real roots of `a·t² + b·t + c`
fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= 1e-12 * scale {
        return if b != 0.0 { vec![-c / b] } else { Vec::new() };
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // Numerically stable form
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let mut roots = vec![q / a];
    if q != 0.0 {
        roots.push(c / q);
    }
    roots
}

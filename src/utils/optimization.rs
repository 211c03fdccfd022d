//! Bounded Nelder-Mead search used to estimate smoothing parameters by SSE.

use std::cmp::Ordering;

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The optimal point found.
    pub optimal_point: Vec<f64>,
    /// The objective function value at the optimal point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on both objective spread and simplex size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Relative step used to build the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
        }
    }
}

/// Simplex vertices with their cached objective values.
struct Simplex<'a, F> {
    vertices: Vec<Vec<f64>>,
    values: Vec<f64>,
    objective: F,
    bounds: Option<&'a [(f64, f64)]>,
}

impl<'a, F> Simplex<'a, F>
where
    F: Fn(&[f64]) -> f64,
{
    fn new(initial: &[f64], step: f64, bounds: Option<&'a [(f64, f64)]>, objective: F) -> Self {
        let mut vertices = vec![clamp_to(initial, bounds)];
        for i in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[i] += if initial[i].abs() > 1e-10 {
                step * initial[i].abs()
            } else {
                step
            };
            vertices.push(clamp_to(&vertex, bounds));
        }
        let values = vertices.iter().map(|v| objective(v)).collect();
        Self {
            vertices,
            values,
            objective,
            bounds,
        }
    }

    /// Evaluate a candidate after projecting it into the bounds.
    fn evaluate(&self, point: Vec<f64>) -> (Vec<f64>, f64) {
        let point = clamp_to(&point, self.bounds);
        let value = (self.objective)(&point);
        (point, value)
    }

    fn replace(&mut self, index: usize, candidate: (Vec<f64>, f64)) {
        self.vertices[index] = candidate.0;
        self.values[index] = candidate.1;
    }

    /// Vertex indices ordered from best to worst.
    fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.values.len()).collect();
        order.sort_by(|&a, &b| {
            self.values[a]
                .partial_cmp(&self.values[b])
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    fn centroid_without(&self, excluded: usize) -> Vec<f64> {
        let dims = self.vertices[0].len();
        let count = (self.vertices.len() - 1) as f64;
        let mut centroid = vec![0.0; dims];
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i == excluded {
                continue;
            }
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / count;
            }
        }
        centroid
    }

    fn shrink_towards(&mut self, best: usize, sigma: f64) {
        let anchor = self.vertices[best].clone();
        for i in 0..self.vertices.len() {
            if i == best {
                continue;
            }
            let moved = along(&anchor, &self.vertices[i], sigma);
            let candidate = self.evaluate(moved);
            self.replace(i, candidate);
        }
    }
}

/// Minimize `objective` with the Nelder-Mead simplex method.
///
/// When `bounds` are given every trial point is clamped into them, so the
/// objective is never evaluated outside the admissible box.
///
/// # Example
/// ```
/// use smoothcast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 0.3).powi(2),
///     &[0.5],
///     Some(&[(0.0001, 0.9999)]),
///     NelderMeadConfig::default(),
/// );
/// assert!((result.optimal_point[0] - 0.3).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    if initial.is_empty() {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let mut simplex = Simplex::new(initial, config.initial_step, bounds, objective);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let order = simplex.ranking();
        let best = order[0];
        let worst = order[order.len() - 1];
        let second_worst = order[order.len() - 2];

        let centroid = simplex.centroid_without(worst);
        let spread = simplex.values[worst] - simplex.values[best];
        let size = simplex
            .vertices
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if spread < config.tolerance || size < config.tolerance {
            converged = true;
            break;
        }

        let reflected = simplex.evaluate(along(&centroid, &simplex.vertices[worst], -config.alpha));

        if reflected.1 < simplex.values[best] {
            let expanded = simplex.evaluate(along(&centroid, &reflected.0, config.gamma));
            if expanded.1 < reflected.1 {
                simplex.replace(worst, expanded);
            } else {
                simplex.replace(worst, reflected);
            }
            continue;
        }

        if reflected.1 < simplex.values[second_worst] {
            simplex.replace(worst, reflected);
            continue;
        }

        let contracted = if reflected.1 < simplex.values[worst] {
            simplex.evaluate(along(&centroid, &reflected.0, config.rho))
        } else {
            simplex.evaluate(along(&centroid, &simplex.vertices[worst], config.rho))
        };
        if contracted.1 < simplex.values[worst].min(reflected.1) {
            simplex.replace(worst, contracted);
            continue;
        }

        simplex.shrink_towards(best, config.sigma);
    }

    let best = simplex.ranking()[0];
    NelderMeadResult {
        optimal_point: simplex.vertices[best].clone(),
        optimal_value: simplex.values[best],
        iterations,
        converged,
    }
}

/// `origin + factor * (target - origin)`.
fn along(origin: &[f64], target: &[f64], factor: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, t)| o + factor * (t - o))
        .collect()
}

fn clamp_to(point: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => point.to_vec(),
        Some(b) => point
            .iter()
            .enumerate()
            .map(|(i, &x)| b.get(i).map_or(x, |&(lo, hi)| x.clamp(lo, hi)))
            .collect(),
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn finds_quadratic_minimum() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        // Unconstrained optimum at 5 lies outside [0, 3]
        let result = nelder_mead(
            |x| (x[0] - 5.0).powi(2),
            &[1.0],
            Some(&[(0.0, 3.0)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-4);
    }

    #[test]
    fn smoothing_sse_stays_inside_unit_interval() {
        let data: [f64; 8] = [10.0, 12.0, 11.0, 13.0, 14.0, 13.0, 15.0, 16.0];
        let sse = |params: &[f64]| {
            let alpha = params[0];
            let mut level = data[0];
            let mut total = 0.0;
            for &y in &data[1..] {
                total += (y - level).powi(2);
                level = alpha * y + (1.0 - alpha) * level;
            }
            total
        };

        let result = nelder_mead(sse, &[0.5], Some(&[(0.0001, 0.9999)]), NelderMeadConfig::default());
        assert!(result.optimal_point[0] >= 0.0001 && result.optimal_point[0] <= 0.9999);
        assert!(result.optimal_value <= sse(&[0.5]));
    }

    #[test]
    fn empty_start_point() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());
        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }
}

// Population statistics shared by the rolling win-rate and run-differential
// summaries.

/// Mean and standard deviation over a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Threshold below which standard deviation is treated as zero.
pub const STDEV_EPSILON: f64 = 1e-9;

/// Compute mean and standard deviation for a slice of values.
///
/// Returns zeroes for an empty slice. Uses the population standard deviation
/// (N denominator): the values are the full universe under analysis, not a
/// sample from it.
pub fn population_stats(values: &[f64]) -> PopulationStats {
    if values.is_empty() {
        return PopulationStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PopulationStats {
        mean,
        stdev: variance.sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn known_values() {
        // Mean 5.0, population variance 4.0, stdev 2.0.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = population_stats(&values);
        assert!(approx_eq(stats.mean, 5.0));
        assert!(approx_eq(stats.stdev, 2.0));
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = population_stats(&[42.0]);
        assert!(approx_eq(stats.mean, 42.0));
        assert!(approx_eq(stats.stdev, 0.0));
    }

    #[test]
    fn empty_slice() {
        let stats = population_stats(&[]);
        assert!(approx_eq(stats.mean, 0.0));
        assert!(approx_eq(stats.stdev, 0.0));
    }

    #[test]
    fn population_not_sample_denominator() {
        // Sample stdev of [1, 3] would be sqrt(2); population is 1.0.
        let stats = population_stats(&[1.0, 3.0]);
        assert!(approx_eq(stats.stdev, 1.0));
    }
}

//! Population-level statistics for anomaly detection.
//!
//! [`SampleStats`] is built once per metric per batch and shared read-only
//! by every item classified against that batch. Mean and standard deviation
//! are population statistics (divide by `n`); median and MAD give the robust
//! counterparts. An empty sample reports `0` for every statistic.

/// Descriptive statistics over one metric's batch sample.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleStats {
    /// Ascending-sorted sample values.
    sorted: Vec<f64>,
    mean: f64,
    std_dev: f64,
    median: f64,
    mad: f64,
}

impl SampleStats {
    /// Build statistics from raw values. Non-finite values are dropped.
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self::default();
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let median = median_of_sorted(&sorted);

        let mut deviations: Vec<f64> = sorted.iter().map(|v| (v - median).abs()).collect();
        deviations.sort_by(f64::total_cmp);
        let mad = median_of_sorted(&deviations);

        Self {
            sorted,
            mean,
            std_dev: variance.sqrt(),
            median,
            mad,
        }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    /// Median absolute deviation from the median.
    pub fn mad(&self) -> f64 {
        self.mad
    }

    /// Percentage of sample values `<= x`. The sample maximum maps to 100.
    pub fn percentile_of(&self, x: f64) -> f64 {
        if self.sorted.is_empty() {
            return 0.0;
        }
        let at_or_below = self.sorted.partition_point(|v| *v <= x);
        at_or_below as f64 / self.sorted.len() as f64 * 100.0
    }

    /// Value at index `ceil(q·n) − 1` of the sorted sample, clamped to the sample.
    pub fn quantile(&self, q: f64) -> f64 {
        let n = self.sorted.len();
        if n == 0 {
            return 0.0;
        }
        let index = ((q * n as f64).ceil() as i64 - 1).clamp(0, n as i64 - 1);
        self.sorted[index as usize]
    }

    pub fn q1(&self) -> f64 {
        self.quantile(0.25)
    }

    pub fn q3(&self) -> f64 {
        self.quantile(0.75)
    }

    pub fn iqr(&self) -> f64 {
        self.q3() - self.q1()
    }

    /// Whether `x` lies outside `[Q1 − k·IQR, Q3 + k·IQR]`. Empty samples flag nothing.
    pub fn is_iqr_outlier(&self, x: f64, multiplier: f64) -> bool {
        if self.sorted.is_empty() {
            return false;
        }
        let (low, high) = self.iqr_fences(multiplier);
        x < low || x > high
    }

    /// Lower and upper IQR fences for multiplier `k`.
    pub fn iqr_fences(&self, multiplier: f64) -> (f64, f64) {
        let iqr = self.iqr();
        (self.q1() - multiplier * iqr, self.q3() + multiplier * iqr)
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 0 => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
        _ => sorted[n / 2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn mean_and_population_std_dev() {
        let s = SampleStats::from_values([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(close(s.mean(), 5.0));
        assert!(close(s.std_dev(), 2.0));
    }

    #[test]
    fn median_odd_and_even() {
        assert!(close(SampleStats::from_values([3.0, 1.0, 2.0]).median(), 2.0));
        assert!(close(SampleStats::from_values([4.0, 1.0, 3.0, 2.0]).median(), 2.5));
    }

    #[test]
    fn mad_is_median_of_absolute_deviations() {
        // median 3; deviations 2,1,0,1,97 -> sorted 0,1,1,2,97 -> 1
        let s = SampleStats::from_values([1.0, 2.0, 3.0, 4.0, 100.0]);
        assert!(close(s.median(), 3.0));
        assert!(close(s.mad(), 1.0));
    }

    #[test]
    fn percentile_counts_ties_at_or_below() {
        let s = SampleStats::from_values([10.0, 20.0, 30.0, 40.0, 50.0]);
        assert!(close(s.percentile_of(30.0), 60.0));
        assert!(close(s.percentile_of(50.0), 100.0));
        assert!(close(s.percentile_of(5.0), 0.0));
        assert!(close(s.percentile_of(1_000.0), 100.0));
    }

    #[test]
    fn quartiles_use_ceil_indexing() {
        let s = SampleStats::from_values((1..=8).map(f64::from));
        assert!(close(s.q1(), 2.0));
        assert!(close(s.q3(), 6.0));
        assert!(close(s.iqr(), 4.0));
        assert!(close(s.quantile(0.0), 1.0));
        assert!(close(s.quantile(1.0), 8.0));
    }

    #[test]
    fn iqr_outlier_fences() {
        let s = SampleStats::from_values((1..=8).map(f64::from));
        // fences: 2 - 6 = -4, 6 + 6 = 12
        assert_eq!(s.iqr_fences(1.5), (-4.0, 12.0));
        assert!(s.is_iqr_outlier(12.5, 1.5));
        assert!(!s.is_iqr_outlier(12.0, 1.5));
    }

    #[test]
    fn constant_sample_has_no_spread() {
        let s = SampleStats::from_values([5.0, 5.0, 5.0]);
        assert_eq!(s.std_dev(), 0.0);
        assert_eq!(s.mad(), 0.0);
        assert_eq!(s.iqr(), 0.0);
    }

    #[test]
    fn empty_sample_is_all_zero() {
        let s = SampleStats::from_values(std::iter::empty());
        assert!(s.is_empty());
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.std_dev(), 0.0);
        assert_eq!(s.median(), 0.0);
        assert_eq!(s.mad(), 0.0);
        assert_eq!(s.percentile_of(10.0), 0.0);
        assert_eq!(s.quantile(0.5), 0.0);
        assert!(!s.is_iqr_outlier(1e9, 1.5));
    }

    #[test]
    fn non_finite_values_dropped() {
        let s = SampleStats::from_values([1.0, f64::NAN, 3.0, f64::INFINITY]);
        assert_eq!(s.len(), 2);
        assert!(close(s.mean(), 2.0));
    }
}

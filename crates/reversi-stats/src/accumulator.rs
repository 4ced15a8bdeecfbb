/// Running `(count, sum, sum of squares)` over a stream of samples.
///
/// Samples are never stored, so accumulators can be merged and updated from many
/// games without growing.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Accumulator {
    count: usize,
    sum: f64,
    sum_sq: f64,
}

impl Accumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Folds the samples of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Mean of the samples, `0.0` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Spread of the samples, computed as `E[x²] - E[x]²`.
    ///
    /// This is the population variance; no square root is taken. Returns
    /// `f64::INFINITY` when there are no samples, so an empty accumulator never looks
    /// stable.
    ///
    /// ```
    /// # use reversi_stats::accumulator::Accumulator;
    /// let acc = [1.0, 2.0, 3.0].into_iter().collect::<Accumulator>();
    /// assert!((acc.std_dev() - 2.0 / 3.0).abs() < 1e-12);
    /// assert_eq!(Accumulator::new().std_dev(), f64::INFINITY);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return f64::INFINITY;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        self.sum_sq / n - mean * mean
    }
}

impl Extend<f64> for Accumulator {
    fn extend<T: IntoIterator<Item = f64>>(&mut self, iter: T) {
        for value in iter {
            self.add(value);
        }
    }
}

impl FromIterator<f64> for Accumulator {
    fn from_iter<T: IntoIterator<Item = f64>>(iter: T) -> Self {
        let mut acc = Self::new();
        acc.extend(iter);
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_accumulator() {
        let acc = Accumulator::new();
        assert!(acc.is_empty());
        assert_eq!(acc.avg(), 0.0);
        assert!(acc.std_dev().is_infinite());
    }

    #[test]
    fn test_avg_and_spread() {
        let acc = [1.0, 2.0, 3.0].into_iter().collect::<Accumulator>();
        assert_eq!(acc.count(), 3);
        assert_eq!(acc.sum(), 6.0);
        assert!((acc.avg() - 2.0).abs() < 1e-12);
        assert!((acc.std_dev() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_matches_single_stream() {
        let mut left = [1.0, 2.0].into_iter().collect::<Accumulator>();
        let right = [3.0, 4.0, 5.0].into_iter().collect::<Accumulator>();
        left.merge(&right);
        let all = [1.0, 2.0, 3.0, 4.0, 5.0]
            .into_iter()
            .collect::<Accumulator>();
        assert_eq!(left, all);
    }

    #[test]
    fn test_constant_samples_have_no_spread() {
        let acc = [0.5; 4].into_iter().collect::<Accumulator>();
        assert!(acc.std_dev().abs() < 1e-12);
    }
}

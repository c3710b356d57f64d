use std::fmt;
use std::sync::Arc;

/// Pure function from dependency values to an unrounded output
pub type DeriveFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Precondition on dependency values for a derivation to be well-defined
pub type GuardFn = Arc<dyn Fn(&[f64]) -> bool + Send + Sync>;

/// Round half to even at `decimals` decimal places
///
/// Rounds the exact binary value of `x`, not `x * 10^decimals`. `0.25` is a
/// true tie and rounds to `0.2`, while `0.15` is stored just below the tie
/// and rounds to `0.1`.
pub fn round_half_even(x: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return x.round_ties_even();
    }
    // Precision formatting rounds the exact decimal expansion, ties to even.
    format!("{x:.prec$}", prec = decimals as usize)
        .parse()
        .unwrap_or(x)
}

/// A derivation function, its guard, and the precision of its result
///
/// Values are handed over in the order the output declared its dependencies.
/// The engine checks at registration that the dependency count matches
/// [`Derivation::arity`], so `derive` and `guard` may index the slice freely.
#[derive(Clone)]
pub struct Derivation {
    arity: usize,
    precision: u32,
    derive: DeriveFn,
    guard: GuardFn,
}

impl Derivation {
    /// Create a derivation over `arity` values, rounded to whole numbers
    pub fn new<D, G>(arity: usize, derive: D, guard: G) -> Self
    where
        D: Fn(&[f64]) -> f64 + Send + Sync + 'static,
        G: Fn(&[f64]) -> bool + Send + Sync + 'static,
    {
        Self {
            arity,
            precision: 0,
            derive: Arc::new(derive),
            guard: Arc::new(guard),
        }
    }

    /// Round results to `decimals` decimal places instead
    pub fn with_precision(mut self, decimals: u32) -> Self {
        self.precision = decimals;
        self
    }

    /// Number of values the derivation reads
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Decimal places of the result
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Whether the guard holds for `values`
    pub fn is_defined(&self, values: &[f64]) -> bool {
        values.len() == self.arity && (self.guard)(values)
    }

    /// Evaluate and round, or `None` if the guard fails
    ///
    /// A result that is not finite is also `None`: inputs that pass the
    /// guard can still overflow, e.g. a divisor of `1e-320`.
    pub fn evaluate(&self, values: &[f64]) -> Option<f64> {
        if !self.is_defined(values) {
            return None;
        }
        let value = (self.derive)(values);
        value
            .is_finite()
            .then(|| round_half_even(value, self.precision))
    }
}

impl fmt::Debug for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Derivation")
            .field("arity", &self.arity)
            .field("precision", &self.precision)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.5, 0, 0.0)]
    #[case(1.5, 0, 2.0)]
    #[case(2.5, 0, 2.0)]
    #[case(191.999, 0, 192.0)]
    #[case(-2.5, 0, -2.0)]
    #[case(0.25, 1, 0.2)]
    #[case(0.75, 1, 0.8)]
    #[case(0.15, 1, 0.1)]
    #[case(0.45, 1, 0.5)]
    #[case(1.05, 1, 1.1)]
    #[case(0.35, 1, 0.3)]
    #[case(2.675, 2, 2.67)]
    #[case(50.04, 1, 50.0)]
    #[case(1.0 / 3.0, 1, 0.3)]
    fn rounds_half_to_even(#[case] x: f64, #[case] decimals: u32, #[case] expected: f64) {
        assert_eq!(round_half_even(x, decimals), expected);
    }

    #[test]
    fn guard_failure_yields_none() {
        let ratio = Derivation::new(2, |v| v[0] / v[1], |v| v[1] != 0.0).with_precision(1);

        assert_eq!(ratio.evaluate(&[1.0, 4.0]), Some(0.2));
        assert_eq!(ratio.evaluate(&[1.0, 0.0]), None);
    }

    #[test]
    fn overflowing_result_yields_none() {
        let ratio = Derivation::new(2, |v| v[0] / v[1], |v| v[1] > 0.0);

        assert_eq!(ratio.evaluate(&[1.0, 1e-320]), None);
        assert_eq!(ratio.evaluate(&[f64::MAX, 0.5]), None);
    }

    #[test]
    fn wrong_value_count_is_undefined() {
        let sum = Derivation::new(2, |v| v[0] + v[1], |_| true);

        assert!(!sum.is_defined(&[1.0]));
        assert_eq!(sum.evaluate(&[1.0, 2.0, 3.0]), None);
    }
}

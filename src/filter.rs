// Copyright 2023 Enphase Energy, Inc.
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use heapless::{Deque, Vec};
use log::{debug, warn};

use crate::Error;

/// A direct-form recursive digital filter of run-time order
///
/// Realizes the difference equation
///
/// ```text
/// y[n] = ( SUM(b_i * x[n-i])  -  SUM(a_i * y[n-i]) ) / a_0
///          i=0..N                i=1..N
/// ```
///
/// for any FIR or IIR design with up to `N` coefficients, i.e. a maximum order of `N - 1`.
/// All storage is inline and sized at compile time, so [`step`](Filter::step) never allocates
/// and runs in time linear in the filter order. A capacity of zero does not compile:
///
/// ```compile_fail
/// let filter = discrete_filter::Filter::<0>::new();
/// ```
///
/// The input and output histories each hold the `order + 1` most recent samples, oldest first.
/// Every step evicts the oldest sample of each history and appends the newest one.
///
/// # Examples
///
/// ```
/// use discrete_filter::Filter;
///
/// // 3-point moving average
/// let mut filter = Filter::<8>::from_coefficients(&[1.0, 1.0, 1.0], &[3.0, 0.0, 0.0]).unwrap();
///
/// let mut y = 0.0;
/// for x in [3.0, 3.0, 3.0] {
///     y = filter.step(x);
/// }
/// assert!((y - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct Filter<const N: usize> {
    // coefficients, b0 and a0 first
    numerator: Vec<f32, N>,
    denominator: Vec<f32, N>,

    // history, oldest first
    inputs: Deque<f32, N>,
    outputs: Deque<f32, N>,

    // limits
    min_y: f32,
    max_y: f32,
}

impl<const N: usize> Default for Filter<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Filter<N> {
    /// Highest order a filter of this capacity can realize
    ///
    /// A filter needs room for at least one coefficient, so `N` must be at least 1.
    pub const MAX_ORDER: usize = {
        assert!(N > 0, "filter capacity must be at least one coefficient");
        N - 1
    };

    /// Create an uninitialized filter
    ///
    /// This is a `const fn` so a filter can be placed in a `static` and configured later with
    /// [`init`](Filter::init). Until then [`is_ready`](Filter::is_ready) is false.
    pub const fn new() -> Self {
        // rejects a zero capacity at compile time
        let _ = Self::MAX_ORDER;
        Self {
            numerator: Vec::new(),
            denominator: Vec::new(),
            inputs: Deque::new(),
            outputs: Deque::new(),
            min_y: f32::NEG_INFINITY,
            max_y: f32::INFINITY,
        }
    }

    /// Create a filter of the given order from its numerator and denominator coefficients
    ///
    /// Both slices must hold exactly `order + 1` coefficients and `denominator[0]` must be
    /// non-zero. The input and output histories start at zero.
    pub fn with_order(order: usize, numerator: &[f32], denominator: &[f32]) -> Result<Self, Error> {
        let mut filter = Self::new();
        filter.init(order, numerator, denominator)?;
        Ok(filter)
    }

    /// Create a filter whose order is implied by the number of coefficients
    pub fn from_coefficients(numerator: &[f32], denominator: &[f32]) -> Result<Self, Error> {
        let order = numerator.len().max(1) - 1;
        Self::with_order(order, numerator, denominator)
    }

    /// (Re)initialize the filter with new coefficients and zeroed history
    ///
    /// The configuration is validated before anything is touched, so on error the filter keeps
    /// its previous coefficients and history. Output limits are kept either way.
    pub fn init(
        &mut self,
        order: usize,
        numerator: &[f32],
        denominator: &[f32],
    ) -> Result<(), Error> {
        if let Err(e) = Self::validate(order, numerator, denominator) {
            warn!("rejected filter configuration: {}", e);
            return Err(e);
        }

        let overflow = Error::InvalidOrder {
            order,
            max: Self::MAX_ORDER,
        };
        let numerator = Vec::from_slice(numerator).map_err(|_| overflow)?;
        let denominator = Vec::from_slice(denominator).map_err(|_| overflow)?;
        let inputs = Self::filled(order + 1, 0.0).ok_or(overflow)?;
        let outputs = Self::filled(order + 1, 0.0).ok_or(overflow)?;

        self.numerator = numerator;
        self.denominator = denominator;
        self.inputs = inputs;
        self.outputs = outputs;

        debug!("filter initialized with order {}", order);
        Ok(())
    }

    fn validate(order: usize, numerator: &[f32], denominator: &[f32]) -> Result<(), Error> {
        if order >= N {
            return Err(Error::InvalidOrder {
                order,
                max: Self::MAX_ORDER,
            });
        }

        let expected = order + 1;
        if numerator.len() != expected || denominator.len() != expected {
            return Err(Error::CoefficientCount {
                expected,
                numerator: numerator.len(),
                denominator: denominator.len(),
            });
        }

        if denominator[0] == 0.0 {
            return Err(Error::ZeroNormalizingCoefficient);
        }

        Ok(())
    }

    fn filled(len: usize, value: f32) -> Option<Deque<f32, N>> {
        let mut buf = Deque::new();
        for _ in 0..len {
            buf.push_back(value).ok()?;
        }
        Some(buf)
    }

    /// True once the filter holds a valid configuration
    pub fn is_ready(&self) -> bool {
        !self.denominator.is_empty()
    }

    /// Filter order, or 0 for an uninitialized filter
    pub fn order(&self) -> usize {
        self.numerator.len().saturating_sub(1)
    }

    /// Maximum number of coefficients
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Numerator coefficients `b0..bN`
    pub fn numerator(&self) -> &[f32] {
        &self.numerator
    }

    /// Denominator coefficients `a0..aN`
    pub fn denominator(&self) -> &[f32] {
        &self.denominator
    }

    /// Stored input samples, oldest first
    pub fn input_history(&self) -> impl DoubleEndedIterator<Item = f32> + '_ {
        self.inputs.iter().copied()
    }

    /// Stored output samples, oldest first
    pub fn output_history(&self) -> impl DoubleEndedIterator<Item = f32> + '_ {
        self.outputs.iter().copied()
    }

    /// Add a new input sample and get the resulting output
    ///
    /// Must only be called on an initialized filter. An uninitialized filter returns 0 and is
    /// left untouched; use [`try_step`](Filter::try_step) to have that reported as an error.
    pub fn step(&mut self, value: f32) -> f32 {
        debug_assert!(self.is_ready(), "step on an uninitialized filter");
        let (Some(&b0), Some(&a0)) = (self.numerator.first(), self.denominator.first()) else {
            return 0.0;
        };

        // evict x[n-N-1] and y[n-N-1], leaving x[n-N]..x[n-1] and y[n-N]..y[n-1]
        self.inputs.pop_front();
        self.outputs.pop_front();

        // walk the histories newest to oldest against b1..bN and a1..aN
        let in_sum = self.numerator[1..]
            .iter()
            .zip(self.inputs.iter().rev())
            .fold(b0 * value, |acc, (b, x)| acc + b * x);
        let out_sum = self.denominator[1..]
            .iter()
            .zip(self.outputs.iter().rev())
            .fold(0.0, |acc, (a, y)| acc + a * y);

        let y = self.limit((in_sum - out_sum) / a0);

        // room was made by the evictions above
        let _ = self.inputs.push_back(value);
        let _ = self.outputs.push_back(y);

        y
    }

    /// Like [`step`](Filter::step), but reports use of an uninitialized filter
    pub fn try_step(&mut self, value: f32) -> Result<f32, Error> {
        if !self.is_ready() {
            return Err(Error::NotReady);
        }
        Ok(self.step(value))
    }

    /// Return the latest output of the filter without updating
    pub fn last_output(&self) -> f32 {
        self.outputs.back().copied().unwrap_or(0.0)
    }

    /// Add a constant offset to every stored input and output sample
    ///
    /// This keeps the filter in the same frame when the signal is re-based, e.g. after a sensor
    /// offset correction or when handling wrap-around, without losing the recent dynamics.
    pub fn shift_by(&mut self, amount: f32) {
        for x in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            *x += amount;
        }
    }

    /// Overwrite the input and output history with a constant
    ///
    /// Puts the filter in the steady state for `amount`, e.g. to start from the current sensor
    /// reading instead of ramping up from zero.
    pub fn set_to(&mut self, amount: f32) {
        for x in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            *x = amount;
        }
    }

    /// Reset the filter
    ///
    /// This will clear the input and output history to zero
    pub fn reset(&mut self) {
        self.set_to(0.0);
    }

    /// Set a minimum output for the filter
    pub fn set_min(&mut self, y: f32) {
        self.min_y = y;
    }

    /// Set a maximum output for the filter
    pub fn set_max(&mut self, y: f32) {
        self.max_y = y;
    }

    /// Set a +- limit for the output of the filter
    pub fn set_limit(&mut self, y: f32) {
        self.set_min(-y);
        self.set_max(y);
    }

    /// Remove any output limits
    pub fn clear_limits(&mut self) {
        self.min_y = f32::NEG_INFINITY;
        self.max_y = f32::INFINITY;
    }

    /// Consume filter and return new filter with a set minimum for the output
    pub fn with_min(mut self, y: f32) -> Self {
        self.set_min(y);
        self
    }

    /// Consume filter and return new filter with a set maximum for the output
    pub fn with_max(mut self, y: f32) -> Self {
        self.set_max(y);
        self
    }

    /// Consume filter and return new filter with a +- limit for the output
    pub fn with_limit(mut self, y: f32) -> Self {
        self.set_limit(y);
        self
    }

    /// Current `(min, max)` output limits, infinite when unset
    pub fn limits(&self) -> (f32, f32) {
        (self.min_y, self.max_y)
    }

    // NaN passes through untouched
    fn limit(&self, y: f32) -> f32 {
        if y < self.min_y {
            self.min_y
        } else if y > self.max_y {
            self.max_y
        } else {
            y
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn moving_average() -> Filter<8> {
        Filter::with_order(4, &[0.2; 5], &[1.0, 0.0, 0.0, 0.0, 0.0]).unwrap()
    }

    #[test]
    fn moving_average_converges() {
        let mut filter = moving_average();

        let y = filter.step(3.0);
        assert_abs_diff_eq!(y, 0.6, epsilon = 1e-6);

        let mut y = y;
        for _ in 0..4 {
            y = filter.step(3.0);
        }
        assert_abs_diff_eq!(y, 3.0, epsilon = 1e-6);

        for _ in 0..10 {
            y = filter.step(3.0);
        }
        assert_abs_diff_eq!(y, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn pass_through() {
        let mut filter = Filter::<1>::with_order(0, &[1.0], &[1.0]).unwrap();
        for x in [0.0, 1.5, -7.25, 1e6, -0.001] {
            assert_eq!(filter.step(x), x);
            assert_eq!(filter.last_output(), x);
        }
        assert!(filter.input_history().eq([-0.001]));
    }

    #[test]
    fn normalizes_by_a0() {
        let mut filter = Filter::<2>::from_coefficients(&[4.0], &[2.0]).unwrap();
        assert_eq!(filter.step(1.5), 3.0);
    }

    #[test]
    fn difference_equation() {
        // y[n] = 0.5x[n] + 0.25x[n-1] + 0.125x[n-2] + 0.5y[n-1] - 0.25y[n-2]
        let mut filter =
            Filter::<4>::from_coefficients(&[0.5, 0.25, 0.125], &[1.0, -0.5, 0.25]).unwrap();

        let y: [f32; 4] = [1.0, 0.0, 0.0, 2.0].map(|x| filter.step(x));
        assert_eq!(y, [0.5, 0.5, 0.25, 1.0]);
    }

    #[test]
    fn evicts_oldest_once_per_step() {
        let mut filter =
            Filter::<4>::from_coefficients(&[0.5, 0.25, 0.125], &[1.0, -0.5, 0.25]).unwrap();
        for x in [1.0, 0.0, 0.0, 2.0] {
            filter.step(x);
        }

        // x[n-2..=n] and y[n-2..=n]; y[0] and the oldest input have been evicted exactly once
        assert!(filter.input_history().eq([0.0, 0.0, 2.0]));
        assert!(filter.output_history().eq([0.5, 0.25, 1.0]));
    }

    #[test]
    fn fir_difference() {
        let mut filter = Filter::<2>::from_coefficients(&[1.0, -1.0], &[1.0, 0.0]).unwrap();
        assert_eq!(filter.step(1.0), 1.0);
        assert_eq!(filter.step(1.0), 0.0);
        assert_eq!(filter.step(4.0), 3.0);
    }

    #[test]
    fn coefficients_keep_their_order() {
        let b = [0.1, 0.2, 0.3, 0.4];
        let a = [1.0, -0.3, 0.2, -0.1];
        let mut filter = Filter::<4>::from_coefficients(&b, &a).unwrap();
        for i in 0..37 {
            filter.step(i as f32);
            assert_eq!(filter.numerator(), &b);
            assert_eq!(filter.denominator(), &a);
        }
    }

    #[test]
    fn history_length() {
        for order in 0..=Filter::<6>::MAX_ORDER {
            let b = [0.5; 6];
            let mut a = [0.1; 6];
            a[0] = 1.0;
            let mut filter = Filter::<6>::with_order(order, &b[..=order], &a[..=order]).unwrap();
            assert_eq!(filter.order(), order);
            assert_eq!(filter.input_history().count(), order + 1);
            assert_eq!(filter.output_history().count(), order + 1);

            for i in 0..20 {
                filter.step(i as f32);
                assert_eq!(filter.input_history().count(), order + 1);
                assert_eq!(filter.output_history().count(), order + 1);
            }
        }
    }

    #[test]
    fn shift_by() {
        let mut filter =
            Filter::<4>::from_coefficients(&[0.5, 0.25, 0.125], &[1.0, -0.5, 0.25]).unwrap();
        for x in [1.0, -2.0, 3.0, 0.5] {
            filter.step(x);
        }

        let before = filter.last_output();
        filter.shift_by(2.5);
        assert_abs_diff_eq!(filter.last_output(), before + 2.5, epsilon = 1e-6);

        assert_eq!(filter.numerator(), &[0.5, 0.25, 0.125]);
        assert_eq!(filter.denominator(), &[1.0, -0.5, 0.25]);
    }

    #[test]
    fn shift_by_adds_up() {
        let mut filter = moving_average();
        for x in [1.0, 4.0, -2.0, 8.0] {
            filter.step(x);
        }

        let mut twice = filter.clone();
        twice.shift_by(1.25);
        twice.shift_by(-3.5);
        let mut once = filter.clone();
        once.shift_by(1.25 - 3.5);

        for (a, b) in twice.input_history().zip(once.input_history()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
        for (a, b) in twice.output_history().zip(once.output_history()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn shifted_steady_state() {
        // a filter at rest stays at rest in the shifted frame
        let mut filter = moving_average();
        filter.shift_by(5.0);
        assert_abs_diff_eq!(filter.step(5.0), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn set_to() {
        let mut filter = moving_average();
        for x in [1.0, 4.0, -2.0] {
            filter.step(x);
        }

        filter.set_to(7.0);
        assert_eq!(filter.last_output(), 7.0);
        let once = filter.clone();
        filter.set_to(7.0);
        assert!(filter.input_history().eq(once.input_history()));
        assert!(filter.output_history().eq(once.output_history()));
        assert!(filter.input_history().all(|x| x == 7.0));
        assert!(filter.output_history().all(|y| y == 7.0));

        // steady state, no transient
        assert_abs_diff_eq!(filter.step(7.0), 7.0, epsilon = 1e-6);

        filter.reset();
        assert_eq!(filter.last_output(), 0.0);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            Filter::<3>::with_order(3, &[1.0; 4], &[1.0; 4]).unwrap_err(),
            Error::InvalidOrder { order: 3, max: 2 }
        );
        assert_eq!(
            Filter::<4>::with_order(2, &[1.0; 3], &[1.0; 2]).unwrap_err(),
            Error::CoefficientCount {
                expected: 3,
                numerator: 3,
                denominator: 2
            }
        );
        assert_eq!(
            Filter::<4>::from_coefficients(&[], &[]).unwrap_err(),
            Error::CoefficientCount {
                expected: 1,
                numerator: 0,
                denominator: 0
            }
        );
        assert_eq!(
            Filter::<4>::from_coefficients(&[1.0, 1.0], &[0.0, 1.0]).unwrap_err(),
            Error::ZeroNormalizingCoefficient
        );
    }

    #[test]
    fn failed_init_keeps_state() {
        let mut filter = moving_average();
        filter.step(2.0);
        let history = filter.clone();

        assert!(filter.init(1, &[1.0, 1.0], &[0.0, 1.0]).is_err());
        assert_eq!(filter.order(), 4);
        assert_eq!(filter.numerator(), &[0.2; 5]);
        assert!(filter.output_history().eq(history.output_history()));
    }

    #[test]
    fn reinit_clears_history() {
        let mut filter = moving_average().with_max(10.0);
        filter.step(2.0);

        filter.init(1, &[1.0, 0.0], &[1.0, 0.0]).unwrap();
        assert_eq!(filter.order(), 1);
        assert!(filter.input_history().eq([0.0, 0.0]));
        assert!(filter.output_history().eq([0.0, 0.0]));
        assert_eq!(filter.limits(), (f32::NEG_INFINITY, 10.0));
    }

    #[test]
    fn single_coefficient_capacity() {
        assert_eq!(Filter::<1>::MAX_ORDER, 0);
        let mut filter = Filter::<1>::with_order(0, &[0.5], &[1.0]).unwrap();
        assert_eq!(filter.step(3.0), 1.5);
        assert_eq!(
            Filter::<1>::with_order(1, &[0.5, 0.5], &[1.0, 0.0]).unwrap_err(),
            Error::InvalidOrder { order: 1, max: 0 }
        );
    }

    #[test]
    fn uninitialized() {
        let mut filter = Filter::<4>::new();
        assert!(!filter.is_ready());
        assert_eq!(filter.order(), 0);
        assert_eq!(filter.capacity(), 4);
        assert_eq!(filter.try_step(1.0), Err(Error::NotReady));
        assert_eq!(filter.last_output(), 0.0);

        filter.init(0, &[2.0], &[1.0]).unwrap();
        assert!(filter.is_ready());
        assert_eq!(filter.try_step(1.0), Ok(2.0));
    }

    #[test]
    fn limits() {
        // integrator
        let mut filter = Filter::<2>::from_coefficients(&[1.0, 0.0], &[1.0, -1.0])
            .unwrap()
            .with_max(1.0);
        let mut y = 0.0;
        for _ in 0..100 {
            y = filter.step(0.1);
        }
        assert_eq!(y, 1.0);

        // anti-windup: the clamped value is what the integrator remembers
        assert_abs_diff_eq!(filter.step(-0.25), 0.75, epsilon = 1e-6);

        filter.set_limit(0.5);
        assert_eq!(filter.step(-10.0), -0.5);

        filter.clear_limits();
        assert_abs_diff_eq!(filter.step(-10.0), -10.5, epsilon = 1e-6);
    }

    #[test]
    fn nan_propagates() {
        let mut filter = Filter::<2>::from_coefficients(&[1.0, 0.0], &[1.0, -1.0])
            .unwrap()
            .with_limit(1.0);
        assert!(filter.step(f32::NAN).is_nan());
        assert!(filter.step(0.0).is_nan());
    }
}

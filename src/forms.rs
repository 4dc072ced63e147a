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

//! Associated constructors for standard filter forms

#[allow(unused_imports)]
use micromath::F32Ext; // enable floating point sin/cos approximations in microcontrollers

use core::f32::consts::PI;
use heapless::Vec;

use crate::{Error, Filter};

/// Calculate intermediate variables needed for various filter coefficients
fn calculate_intermediate_variables(ts: f32, f0: f32, q: f32) -> (f32, f32) {
    let omega = 2. * PI * f0 * ts;
    let cos_omega = omega.cos();
    let sin_omega = omega.sin();
    let alpha = sin_omega / (2. * q);
    (alpha, cos_omega)
}

impl<const N: usize> Filter<N> {
    /// Constructs a moving average over the last `order + 1` inputs
    ///
    /// # Examples
    ///
    /// ```
    /// use discrete_filter::Filter;
    ///
    /// let filter = Filter::<16>::moving_average(9).unwrap();
    /// assert_eq!(filter.numerator().len(), 10);
    /// ```
    pub fn moving_average(order: usize) -> Result<Self, Error> {
        let overflow = Error::InvalidOrder {
            order,
            max: Self::MAX_ORDER,
        };
        if order >= N {
            return Err(overflow);
        }
        let weight = 1. / (order as f32 + 1.);

        let mut numerator = Vec::<f32, N>::new();
        let mut denominator = Vec::<f32, N>::new();
        numerator.resize(order + 1, weight).map_err(|_| overflow)?;
        denominator.resize(order + 1, 0.).map_err(|_| overflow)?;
        denominator[0] = 1.;

        Self::with_order(order, &numerator, &denominator)
    }

    /// Constructs a first order filter with single pole lowpass (i.e.  "RC") behavior
    ///
    /// Effectively makes `y[n] = y[n-1] + alpha * (x[n]-y[n-1])` style filter
    ///
    /// # Examples
    ///
    /// ```
    /// use discrete_filter::Filter;
    ///
    /// let ts = 1./10e3;  // sampling period
    /// let f0 = 15.0;  // cutoff frequency
    /// let mut filter = Filter::<2>::single_pole_lowpass(ts, f0).unwrap();
    /// ```
    pub fn single_pole_lowpass(ts: f32, f0: f32) -> Result<Self, Error> {
        let omega = 2. * PI * f0 * ts;
        let alpha = omega / (omega + 1.);
        Self::from_coefficients(&[alpha, 0.], &[1., alpha - 1.])
    }

    /// Constructs a lowpass biquad filter
    ///
    /// Uses arithmetic from <https://webaudio.github.io/Audio-EQ-Cookbook/audio-eq-cookbook.html>
    ///
    /// # Examples
    ///
    /// ```
    /// use discrete_filter::Filter;
    ///
    /// let ts = 1./10e3;  // sampling period
    /// let f0 = 15.0;  // cutoff frequency
    /// let q = core::f32::consts::FRAC_1_SQRT_2; // butterworth
    /// let mut filter = Filter::<3>::lowpass(ts, f0, q).unwrap();
    ///
    /// let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    /// let mut y = 0.0;
    /// for x in signal {
    ///    y = filter.step(x);
    /// }
    /// ```
    pub fn lowpass(ts: f32, f0: f32, q: f32) -> Result<Self, Error> {
        let (alpha, cos_omega) = calculate_intermediate_variables(ts, f0, q);
        let a0 = 1. + alpha;
        let a1 = -2. * cos_omega;
        let a2 = 1. - alpha;
        let b0 = (1. - cos_omega) / 2.;
        let b1 = 2. * b0;
        let b2 = b0;
        Self::from_coefficients(&[b0, b1, b2], &[a0, a1, a2])
    }

    /// Constructs a highpass biquad filter
    ///
    /// Uses arithmetic from <https://webaudio.github.io/Audio-EQ-Cookbook/audio-eq-cookbook.html>
    ///
    /// # Examples
    ///
    /// ```
    /// use discrete_filter::Filter;
    ///
    /// let ts = 1./10e3;  // sampling period
    /// let f0 = 15.0;  // cutoff frequency
    /// let q = core::f32::consts::FRAC_1_SQRT_2; // butterworth
    /// let mut filter = Filter::<3>::highpass(ts, f0, q).unwrap();
    /// ```
    pub fn highpass(ts: f32, f0: f32, q: f32) -> Result<Self, Error> {
        let (alpha, cos_omega) = calculate_intermediate_variables(ts, f0, q);
        let a0 = 1. + alpha;
        let a1 = -2. * cos_omega;
        let a2 = 1. - alpha;
        let b0 = (1. + cos_omega) / 2.;
        let b1 = -2. * b0;
        let b2 = b0;
        Self::from_coefficients(&[b0, b1, b2], &[a0, a1, a2])
    }

    /// Constructs a bandpass biquad filter
    ///
    /// Uses arithmetic from <https://webaudio.github.io/Audio-EQ-Cookbook/audio-eq-cookbook.html>
    pub fn bandpass(ts: f32, f0: f32, q: f32) -> Result<Self, Error> {
        let (alpha, cos_omega) = calculate_intermediate_variables(ts, f0, q);
        let a0 = 1. + alpha;
        let a1 = -2. * cos_omega;
        let a2 = 1. - alpha;
        let b0 = alpha;
        let b1 = 0.;
        let b2 = -b0;
        Self::from_coefficients(&[b0, b1, b2], &[a0, a1, a2])
    }

    /// Constructs a notch biquad filter
    ///
    /// Uses arithmetic from <https://webaudio.github.io/Audio-EQ-Cookbook/audio-eq-cookbook.html>
    pub fn notch(ts: f32, f0: f32, q: f32) -> Result<Self, Error> {
        let (alpha, cos_omega) = calculate_intermediate_variables(ts, f0, q);
        let a0 = 1. + alpha;
        let a1 = -2. * cos_omega;
        let a2 = 1. - alpha;
        let b0 = 1.;
        let b1 = a1;
        let b2 = 1.;
        Self::from_coefficients(&[b0, b1, b2], &[a0, a1, a2])
    }

    /// Constructs a first order filter with proportional-integral behavior
    ///
    /// Combine with [`with_limit`](Filter::with_limit) for an anti-windup PI controller.
    ///
    /// # Examples
    ///
    /// ```
    /// use discrete_filter::Filter;
    ///
    /// let kp = 0.2;
    /// let ki = 0.1;
    /// let mut filter = Filter::<2>::pi(kp, ki).unwrap().with_limit(20.0);
    /// ```
    pub fn pi(kp: f32, ki: f32) -> Result<Self, Error> {
        Self::from_coefficients(&[kp + ki, -kp], &[1., -1.])
    }
}

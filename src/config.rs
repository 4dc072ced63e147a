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

//! Serializable filter configuration
//!
//! Available with the `serde` feature. A [`FilterConfig`] carries everything needed to build a
//! [`Filter`] and is validated when it is built, so a bad configuration received at run time is
//! rejected instead of producing a misbehaving filter.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::{Error, Filter};

/// Coefficients and output limits of a [`Filter`] with capacity `N`
///
/// # Examples
///
/// ```
/// use discrete_filter::FilterConfig;
///
/// let json = r#"{"numerator":[0.5,0.5],"denominator":[1.0,0.0]}"#;
/// let (config, _): (FilterConfig<4>, _) = serde_json_core::from_str(json).unwrap();
/// let mut filter = config.build().unwrap();
/// assert_eq!(filter.step(1.0), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig<const N: usize> {
    /// Numerator coefficients `b0..bN`
    pub numerator: Vec<f32, N>,
    /// Denominator coefficients `a0..aN`
    pub denominator: Vec<f32, N>,
    /// Minimum output
    #[serde(default)]
    pub min: Option<f32>,
    /// Maximum output
    #[serde(default)]
    pub max: Option<f32>,
}

impl<const N: usize> FilterConfig<N> {
    /// Validate the configuration and build a filter with zeroed history
    pub fn build(&self) -> Result<Filter<N>, Error> {
        let mut filter = Filter::from_coefficients(&self.numerator, &self.denominator)?;
        if let Some(min) = self.min {
            filter.set_min(min);
        }
        if let Some(max) = self.max {
            filter.set_max(max);
        }
        Ok(filter)
    }
}

impl<const N: usize> TryFrom<&FilterConfig<N>> for Filter<N> {
    type Error = Error;

    fn try_from(config: &FilterConfig<N>) -> Result<Self, Self::Error> {
        config.build()
    }
}

impl<const N: usize> Filter<N> {
    /// Capture the coefficients and output limits of this filter
    pub fn config(&self) -> FilterConfig<N> {
        let (min, max) = self.limits();
        FilterConfig {
            numerator: self.numerator().iter().copied().collect(),
            denominator: self.denominator().iter().copied().collect(),
            min: Some(min).filter(|y| y.is_finite()),
            max: Some(max).filter(|y| y.is_finite()),
        }
    }
}

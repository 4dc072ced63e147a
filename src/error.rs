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

/// Errors reported when configuring or driving a [`Filter`](crate::Filter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The filter order needs more coefficients than the backing storage holds
    #[error("order {order} exceeds the maximum order {max}")]
    InvalidOrder { order: usize, max: usize },

    /// A coefficient slice does not hold exactly `order + 1` entries
    #[error("expected {expected} coefficients, got {numerator} numerator and {denominator} denominator")]
    CoefficientCount {
        expected: usize,
        numerator: usize,
        denominator: usize,
    },

    /// The leading denominator coefficient `a0` is zero
    #[error("leading denominator coefficient is zero")]
    ZeroNormalizingCoefficient,

    /// The filter was used before it was initialized
    #[error("filter is not initialized")]
    NotReady,
}

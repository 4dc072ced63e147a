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

/*!
# `discrete-filter`

Direct-form recursive digital filters for embedded control loops.

`discrete-filter` is a `#![no_std]` library implementing a general [linear difference equation](https://en.wikipedia.org/wiki/Digital_filter#Difference_equation)

```text
y[n] = ( SUM(b_i * x[n-i])  -  SUM(a_i * y[n-i]) ) / a_0
         i=0..N                i=1..N
```

from arbitrary numerator (`b`) and denominator (`a`) coefficients. It covers both FIR and IIR designs on single precision `f32` samples. The filter order is chosen at run time, bounded by a capacity fixed at compile time through a constant generic, so all state lives inline in fixed-capacity [heapless](https://crates.io/crates/heapless) buffers and updating the filter never allocates.

# How to use

The main data structure for this crate is [Filter<N>](crate::filter::Filter) where `N` is the maximum number of coefficients, i.e. the filter can be of any order up to `N - 1`.  The most generic way of creating a filter is to pass the coefficients, in which case the order is the number of coefficients minus one.

```rust
use discrete_filter::Filter;

// 5-point moving average
let numerator = [0.2, 0.2, 0.2, 0.2, 0.2];
let denominator = [1.0, 0.0, 0.0, 0.0, 0.0];
let mut filter = Filter::<8>::from_coefficients(&numerator, &denominator).unwrap();

let signal = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
let mut y = 0.0;
for x in signal {
    y = filter.step(x);
}
assert!((y - 4.0).abs() < 1e-5);
```

Construction validates the configuration and returns an [Error](crate::Error) if the order does not fit the capacity, the coefficient counts do not match the order, or the leading denominator coefficient is zero.

When a control loop is (re)started mid-flight, the history can be snapped to the current reading with [set_to](crate::Filter::set_to) to avoid a start-up transient, or moved into a new frame of reference with [shift_by](crate::Filter::shift_by) without losing the recent dynamics.

```rust
use discrete_filter::Filter;

let ts = 1./1e3;
let f0 = 5.;
let mut filter = Filter::<2>::single_pole_lowpass(ts, f0).unwrap();

// start at the current sensor reading
filter.set_to(12.5);
assert!((filter.step(12.5) - 12.5).abs() < 1e-5);

// the sensor offset was corrected by -2.5
filter.shift_by(-2.5);
assert!((filter.last_output() - 10.).abs() < 1e-5);
```

`Filter` includes associated functions for creating the following standard forms:

1.  [moving_average](crate::Filter::moving_average)
2.  [single_pole_lowpass](crate::Filter::single_pole_lowpass)
3.  [lowpass](crate::Filter::lowpass)
4.  [highpass](crate::Filter::highpass)
5.  [bandpass](crate::Filter::bandpass)
6.  [notch](crate::Filter::notch)
7.  [proportional-integral behavior](crate::Filter::pi)

By default, the filters do not limit their output.  You can add limits to an existing filter using the `set_min`, `set_max`, or `set_limit` functions, or you can setup limits at construction using a builder pattern with the `with_min`, `with_max`, or `with_limit` functions.  The limited value is what the filter remembers, which makes a limited [pi](crate::Filter::pi) filter an anti-windup controller.

```rust
use discrete_filter::Filter;

// create a proportional-integral controller with a limit of +-20
let kp = 0.1;
let ki = 0.01;
let mut filter = Filter::<2>::pi(kp, ki).unwrap().with_limit(20.0);
```

With the `serde` feature, a [FilterConfig](crate::FilterConfig) can be deserialized and validated into a filter at run time.

# Logging

The crate emits [log](https://crates.io/crates/log) records when a filter is (re)initialized or a configuration is rejected.  Nothing is logged from [step](crate::Filter::step).
*/
#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod filter;
mod forms;

#[cfg(feature = "serde")]
pub mod config;

pub use error::Error;
pub use filter::Filter;

#[cfg(feature = "serde")]
pub use config::FilterConfig;

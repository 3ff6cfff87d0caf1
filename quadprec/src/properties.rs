//! Property checks expressed as estimates.
//!
//! Each check builds an approximate/expected pair out of one function and
//! hands it to [`Session::estimate`].
//!
//! | Check         | Approximate | Expected |
//! |---------------|-------------|----------|
//! | `identity`    | `f`         | `x`      |
//! | `involution`  | `f(f(x))`   | `x`      |
//! | `idempotence` | `f(f(x))`   | `f(x)`   |
//! | `homogeneous` | `f`         | zero     |

use crate::error::PrecError;
use crate::result::EstimateOptions;
use crate::session::Session;
use std::sync::Arc;

impl Session {
    /// `f` should equal the identity on the domain.
    pub fn identity<T, F>(
        &mut self,
        name: &str,
        f: F,
        options: EstimateOptions<T, T>,
    ) -> Result<(), PrecError>
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.estimate(name, f, |x: T| x, options)
    }

    /// `f` should be its own inverse.
    pub fn involution<T, F>(
        &mut self,
        name: &str,
        f: F,
        options: EstimateOptions<T, T>,
    ) -> Result<(), PrecError>
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        self.estimate(name, move |x: T| f(f(x)), |x: T| x, options)
    }

    /// Applying `f` twice should equal applying it once.
    pub fn idempotence<T, F>(
        &mut self,
        name: &str,
        f: F,
        options: EstimateOptions<T, T>,
    ) -> Result<(), PrecError>
    where
        T: 'static,
        F: Fn(T) -> T + Send + Sync + 'static,
    {
        let once = Arc::new(f);
        let twice = Arc::clone(&once);
        self.estimate(name, move |x: T| twice(twice(x)), move |x: T| once(x), options)
    }

    /// `f` should vanish on the domain.
    pub fn homogeneous<I, O, F>(
        &mut self,
        name: &str,
        f: F,
        options: EstimateOptions<I, O>,
    ) -> Result<(), PrecError>
    where
        I: 'static,
        O: Default + 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        self.estimate(name, f, |_: I| O::default(), options)
    }

    /// `f` should equal the constant `zero` on the domain.
    pub fn homogeneous_with_zero<I, O, F>(
        &mut self,
        name: &str,
        f: F,
        options: EstimateOptions<I, O>,
        zero: O,
    ) -> Result<(), PrecError>
    where
        I: 'static,
        O: Clone + Send + Sync + 'static,
        F: Fn(I) -> O + Send + Sync + 'static,
    {
        self.estimate(name, f, move |_: I| zero.clone(), options)
    }
}

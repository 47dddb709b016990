//! Wrapper functions that convert a [`Validation`] into a message of the
//! issuer's own vocabulary.
//!
//! Every wrapper-bearing command carries one of these. The reducer
//! invokes the wrapper exactly once per command with the outcome of the
//! intended effect; the wrapper must be total (no panics) and pure
//! beyond constructing the message value.

use crate::validation::Validation;

/// Converts a value-less outcome into a message.
///
/// Used by commands whose issuer only cares whether the operation
/// succeeded (remove layer, change zoom, ...).
pub struct BareWrapper<Msg>(Box<dyn Fn(Validation<()>) -> Msg + Send>);

impl<Msg> BareWrapper<Msg> {
    pub fn new(f: impl Fn(Validation<()>) -> Msg + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Invoke the wrapper with the command outcome.
    pub fn wrap(&self, outcome: Validation<()>) -> Msg {
        (self.0)(outcome)
    }
}

impl<Msg> std::fmt::Debug for BareWrapper<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BareWrapper")
    }
}

/// Converts an outcome carrying a produced value into a message.
///
/// Used when the issuer needs the value itself, e.g. the
/// [`SubscriptionResult`](crate::subscription::SubscriptionResult)
/// handed back by a successful subscribe.
pub struct ValueWrapper<T, Msg>(Box<dyn Fn(Validation<T>) -> Msg + Send>);

impl<T, Msg> ValueWrapper<T, Msg> {
    pub fn new(f: impl Fn(Validation<T>) -> Msg + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    /// Invoke the wrapper with the command outcome.
    pub fn wrap(&self, outcome: Validation<T>) -> Msg {
        (self.0)(outcome)
    }
}

impl<T, Msg> std::fmt::Debug for ValueWrapper<T, Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ValueWrapper")
    }
}

//! Field orchestration engine for declaratively configured forms.
//!
//! A form is described as an ordered list of [`FieldDescriptor`]s bound to an
//! external, mutable model. [`FormBuilder::build`] validates the declarations,
//! gives every field a stable key, subscribes the declared watchers to a
//! [`ChangeDetector`] and installs one model-wide dispatcher that re-runs
//! field expressions whenever the model changes. Dropping the resulting
//! [`FormInstance`] releases every subscription.
//!
//! [`Digest`] is the built-in dirty-checking change detector; hosts with their
//! own reactive runtime implement [`ChangeDetector`] instead.

mod config;
mod constants;
mod errors;
mod field;
mod form;
mod reactive;
mod reporter;

pub use self::config::*;
pub use errors::*;
pub use field::*;
pub use form::*;
pub use reactive::*;
pub use reporter::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

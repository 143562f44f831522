//! Form orchestration: the construction pipeline and the form lifetime.
//!
//! ```text
//! FormBuilder::build
//!   check_form_attributes   (host boundary: legacy attributes, model presence)
//!   validate_schema         (closed attribute set)
//!   resolve_keys            (position fallback)
//!   WatcherRegistry         (field order, then watcher order)
//!   install_model_dispatcher (last, sees final field state)
//! ```
//!
//! Dropping a [`FormInstance`] stops every subscription it made.

mod boundary;
mod builder;
mod dispatcher;
mod expression_wrapper;
mod id;
mod instance;
mod key_resolver;
mod schema_validator;
mod watcher_registry;
pub use boundary::*;
pub use builder::*;
pub use dispatcher::*;
pub use expression_wrapper::*;
pub use id::*;
pub use instance::*;
pub use key_resolver::*;
pub use schema_validator::*;
pub use watcher_registry::*;

#[cfg(test)]
mod instance_test;

use std::sync::Arc;

use crate::FieldDescriptor;

/// Finalized, shared field list of one form. Order is declaration order.
pub type FieldList = Arc<[Arc<FieldDescriptor>]>;

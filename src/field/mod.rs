//! Declarative field schema: descriptors, keys and watcher specs.
//!
//! A [`FieldDescriptor`] carries one optional member per recognized
//! [`Attribute`]. Anything else a host declares lands in an
//! unrecognized-attribute bag that only the schema validator inspects, so a
//! malformed field survives decoding and is rejected with a descriptive
//! error instead of a serde failure.

mod attribute;
mod descriptor;
mod key;
mod watcher;
pub use attribute::*;
pub use descriptor::*;
pub use key::*;
pub use watcher::*;

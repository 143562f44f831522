//! the test_utils folder here shares fixtures between the unit tests of
//! every module
mod common;
mod recording;

pub use common::*;
pub use recording::*;

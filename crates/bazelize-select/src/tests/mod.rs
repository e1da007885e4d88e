//! Test suite for bazelize-select.

#[cfg(feature = "proptest")]
mod property_tests;

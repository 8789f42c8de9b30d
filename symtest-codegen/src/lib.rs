//! Test source generation for synthesized test cases
//!
//! Formatters are selected by name through a [`FormatterRegistry`]; the
//! built-in ones emit JUnit 5, JUnit 4 and JSON.

pub mod formatter;
pub mod java;
pub mod json;
pub mod writer;

pub use formatter::{renderable_groups, FormatterFactory, FormatterRegistry, TestFormatter};
pub use java::{Dialect, JavaFormatter};
pub use json::JsonFormatter;
pub use writer::IndentWriter;

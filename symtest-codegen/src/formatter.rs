//! Formatter strategy and registry
//!
//! A formatter turns resolved test cases into test source. The engine picks
//! one by name from a [`FormatterRegistry`] when the run finishes.

use std::io;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use symtest_core::{
    admissibility, GeneratorConfig, MethodGroup, SynthesisError, SynthesisResult, TestCase,
    TestCollection,
};
use tracing::warn;

use crate::java::{Dialect, JavaFormatter};
use crate::json::JsonFormatter;

/// Renders test cases into a target test framework
pub trait TestFormatter: Send {
    /// Registry name of this formatter
    fn name(&self) -> &str;

    /// Render one test case as a self-contained test
    fn format_test(&mut self, test: &TestCase) -> SynthesisResult<String>;

    /// Render one test case onto a stream
    fn write_test(&mut self, test: &TestCase, out: &mut dyn io::Write) -> SynthesisResult<()> {
        let text = self.format_test(test)?;
        out.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Render a complete compilation unit for the whole collection.
    ///
    /// Methods whose receiver cannot be constructed are left out.
    fn format_all(&mut self, tests: &TestCollection, out: &mut dyn io::Write) -> SynthesisResult<()>;

    /// Restart test numbering
    fn reset_counter(&mut self) {}
}

/// Groups that can be rendered, warning once for every dropped method
pub fn renderable_groups(tests: &TestCollection) -> Vec<&MethodGroup> {
    tests
        .groups()
        .filter(|group| match admissibility::check_receiver(&group.method) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}, dropping {} test case(s)", e, group.len());
                false
            }
        })
        .collect()
}

/// Constructor for a formatter from configuration
pub type FormatterFactory = fn(&GeneratorConfig) -> SynthesisResult<Box<dyn TestFormatter>>;

/// Registry mapping configuration names to formatter factories
#[derive(Clone)]
pub struct FormatterRegistry {
    factories: Arc<RwLock<FxHashMap<String, FormatterFactory>>>,
}

impl FormatterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(FxHashMap::default())),
        }
    }

    /// Registry with `junit5`, `junit4` and `json`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("junit5", junit5_formatter);
        registry.register("junit4", junit4_formatter);
        registry.register("json", json_formatter);
        registry
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, factory: FormatterFactory) {
        self.factories.write().insert(name.into(), factory);
    }

    /// Instantiate the formatter named by `config.formatter`
    pub fn create(&self, config: &GeneratorConfig) -> SynthesisResult<Box<dyn TestFormatter>> {
        let factory = self
            .factories
            .read()
            .get(config.formatter.as_str())
            .copied()
            .ok_or_else(|| SynthesisError::UnknownFormatter(config.formatter.clone()))?;
        factory(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.read().keys().cloned().collect();
        names.sort();
        names
    }
}

fn junit5_formatter(config: &GeneratorConfig) -> SynthesisResult<Box<dyn TestFormatter>> {
    Ok(Box::new(JavaFormatter::new(config, Dialect::JUnit5)))
}

fn junit4_formatter(config: &GeneratorConfig) -> SynthesisResult<Box<dyn TestFormatter>> {
    Ok(Box::new(JavaFormatter::new(config, Dialect::JUnit4)))
}

fn json_formatter(config: &GeneratorConfig) -> SynthesisResult<Box<dyn TestFormatter>> {
    Ok(Box::new(JsonFormatter::new(config)))
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

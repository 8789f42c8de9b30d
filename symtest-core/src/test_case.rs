//! The resolved test case model
//!
//! A [`TestCase`] is immutable once built and compares structurally over
//! method, arguments and outcome. Two explorations that reach the same
//! concrete scenario produce equal test cases and collapse to one.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use serde::Serialize;

use crate::errors::{SynthesisError, SynthesisResult};
use crate::method::{MethodSignature, VariableBinding};
use crate::value::ConcreteValue;

/// Exception that escaped the method under test
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionInfo {
    /// Fully qualified runtime type name
    pub type_name: String,
    /// Detail message of the instance; not part of the test's identity
    pub message: Option<String>,
}

// The rendered assertion only checks the type, so only the type identifies the outcome.
impl PartialEq for ExceptionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl Eq for ExceptionInfo {}

impl Hash for ExceptionInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name.hash(state);
    }
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// How the call terminated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Normal return from a void method
    Void,
    Returned(ConcreteValue),
    Threw(ExceptionInfo),
}

/// One resolved argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedArgument {
    pub binding: Arc<VariableBinding>,
    pub value: ConcreteValue,
}

/// A fully resolved, concrete test case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestCase {
    pub method: Arc<MethodSignature>,
    /// Arguments keyed by ordinal
    args: BTreeMap<usize, ResolvedArgument>,
    pub outcome: Outcome,
}

impl TestCase {
    /// Build a test case, checking that every non-receiver parameter is bound
    /// exactly once and that the outcome fits the return type.
    pub fn new(
        method: Arc<MethodSignature>,
        args: impl IntoIterator<Item = (Arc<VariableBinding>, ConcreteValue)>,
        outcome: Outcome,
    ) -> SynthesisResult<Self> {
        let mut resolved = BTreeMap::new();
        for (binding, value) in args {
            if binding.is_receiver {
                return Err(SynthesisError::contract(format!(
                    "receiver bound as an argument of {}",
                    method.base_name()
                )));
            }
            if !method.params.iter().any(|p| Arc::ptr_eq(p, &binding) || **p == *binding) {
                return Err(SynthesisError::contract(format!(
                    "'{}' is not a parameter of {}",
                    binding.name,
                    method.base_name()
                )));
            }
            let ordinal = binding.ordinal;
            if resolved.insert(ordinal, ResolvedArgument { binding, value }).is_some() {
                return Err(SynthesisError::contract(format!(
                    "parameter #{} of {} bound twice",
                    ordinal,
                    method.base_name()
                )));
            }
        }

        if let Some(missing) = method.arguments().find(|p| !resolved.contains_key(&p.ordinal)) {
            return Err(SynthesisError::contract(format!(
                "parameter '{}' of {} was never resolved",
                missing.name,
                method.base_name()
            )));
        }

        match (&outcome, method.return_type.is_void()) {
            (Outcome::Void, false) => {
                return Err(SynthesisError::contract(format!(
                    "{} returns {} but the outcome has no value",
                    method.base_name(),
                    method.return_type
                )))
            }
            (Outcome::Returned(_), true) => {
                return Err(SynthesisError::contract(format!(
                    "void method {} produced a return value",
                    method.base_name()
                )))
            }
            _ => {}
        }

        Ok(Self {
            method,
            args: resolved,
            outcome,
        })
    }

    /// Resolved arguments in declaration order
    pub fn args(&self) -> impl Iterator<Item = &ResolvedArgument> {
        self.args.values()
    }

    /// Value of the named argument
    pub fn arg(&self, name: &str) -> Option<&ConcreteValue> {
        self.args
            .values()
            .find(|a| a.binding.name == name)
            .map(|a| &a.value)
    }

    /// Value bound to the given parameter
    pub fn value_of(&self, binding: &VariableBinding) -> Option<&ConcreteValue> {
        self.args.get(&binding.ordinal).map(|a| &a.value)
    }

    pub fn did_throw(&self) -> bool {
        matches!(self.outcome, Outcome::Threw(_))
    }

    pub fn return_value(&self) -> Option<&ConcreteValue> {
        match &self.outcome {
            Outcome::Returned(value) => Some(value),
            _ => None,
        }
    }

    /// Structural hash, stable for the lifetime of the process
    pub fn dedup_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

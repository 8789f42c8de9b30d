//! The synthesis engine
//!
//! Driven by VM notifications. At call entry a snapshot of the arguments is
//! attached to the activation; at a normal return or an uncaught exception
//! the snapshot is resolved against the solved path condition and the
//! resulting test case is added to the collection.

use std::io;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Serialize;
use symtest_codegen::FormatterRegistry;
use symtest_core::{
    admissibility, ConcreteValue, GeneratorConfig, MethodSignature, Outcome, SynthesisError, SynthesisResult,
    TestCase, TestCollection, VariableBinding,
};
use tracing::{debug, error, trace, warn};

use crate::resolver::ValueResolver;
use crate::snapshot::{CallSnapshot, SnapshotTable};
use crate::vm::{ActivationId, ArgKind, CallEntered, CallExited, Captured, ExceptionThrown, SymbolicVm};

/// Counters describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SynthesisStats {
    /// Activations that received a snapshot
    pub snapshots: usize,
    /// Test cases added to the collection
    pub emitted: usize,
    /// Test cases equal to one already collected
    pub duplicates: usize,
    /// Resolutions given up because the path condition was unsatisfiable or absent
    pub abandoned: usize,
    /// Methods or test cases skipped as unsupported
    pub skipped: usize,
}

/// Turns tracked method activations into deduplicated test cases
pub struct SynthesisEngine {
    config: GeneratorConfig,
    registry: FormatterRegistry,
    resolver: ValueResolver,
    snapshots: SnapshotTable,
    collection: TestCollection,
    /// Methods already reported as unsupported
    rejected: FxHashSet<Arc<MethodSignature>>,
    stats: SynthesisStats,
}

impl SynthesisEngine {
    /// Engine using the built-in formatters
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_registry(config, FormatterRegistry::with_builtins())
    }

    pub fn with_registry(config: GeneratorConfig, registry: FormatterRegistry) -> Self {
        let resolver = ValueResolver::new(&config);
        Self {
            config,
            registry,
            resolver,
            snapshots: SnapshotTable::new(),
            collection: TestCollection::new(),
            rejected: FxHashSet::default(),
            stats: SynthesisStats::default(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn collection(&self) -> &TestCollection {
        &self.collection
    }

    pub fn into_collection(self) -> TestCollection {
        self.collection
    }

    pub fn stats(&self) -> SynthesisStats {
        self.stats
    }

    /// Capture the arguments of a tracked, admissible method
    pub fn on_call_entered<V: SymbolicVm + ?Sized>(&mut self, vm: &mut V, event: CallEntered) -> SynthesisResult<()> {
        if self.snapshots.contains(event.activation) {
            trace!("activation {} already captured", event.activation);
            return Ok(());
        }

        let kinds = match vm.classify(&event.method) {
            Some(kinds) => kinds,
            None => return Ok(()),
        };

        if let Err(e) = admissibility::check_signature(&event.method) {
            self.skip_method(&event.method, e)?;
            return Ok(());
        }

        let snapshot = match self.capture(vm, &event, &kinds) {
            Ok(snapshot) => snapshot,
            Err(e) => return self.skip_test(e),
        };
        trace!("entered {}: {}", event.activation, snapshot);

        self.snapshots.attach(event.activation, snapshot);
        self.stats.snapshots += 1;
        Ok(())
    }

    /// Resolve a tracked activation that returned normally
    pub fn on_call_exited<V: SymbolicVm + ?Sized>(&mut self, vm: &mut V, event: CallExited) -> SynthesisResult<()> {
        let snapshot = match self.snapshots.get(event.activation) {
            Some(snapshot) => snapshot.clone(),
            None => return Ok(()),
        };

        if !self.path_condition_holds(vm, snapshot.method()) {
            return Ok(());
        }

        let outcome = self
            .resolver
            .resolve_return(vm, snapshot.method(), event.return_value.as_ref());
        let test = outcome.and_then(|outcome| self.resolve_test(vm, &snapshot, outcome));
        match test {
            Ok(test) => self.record(test),
            Err(e) => return self.skip_test(e),
        }

        if self.config.optimize && !vm.has_pending_alternatives() && !self.has_tracked_caller(vm, event.activation) {
            debug!("{} fully explored, abandoning branch", snapshot.method().base_name());
            vm.ignore_current_branch();
        }
        Ok(())
    }

    /// Attribute an exception to every tracked frame it escapes from.
    ///
    /// Frames are visited from the faulting one outward. The first frame with
    /// a handler catches the exception and ends the walk without a test.
    pub fn on_exception_thrown<V: SymbolicVm + ?Sized>(
        &mut self,
        vm: &mut V,
        event: ExceptionThrown,
    ) -> SynthesisResult<()> {
        let exception = event.exception;
        let mut satisfiable = None;

        for frame in vm.call_stack() {
            if vm.has_handler(&frame, &exception.type_name) {
                debug!(
                    "{} caught by {} ({})",
                    exception.type_name,
                    frame.method.base_name(),
                    frame.activation
                );
                break;
            }

            let snapshot = match self.snapshots.get(frame.activation) {
                Some(snapshot) => snapshot.clone(),
                None => continue,
            };

            let holds = match satisfiable {
                Some(holds) => holds,
                None => {
                    let holds = self.path_condition_holds(vm, snapshot.method());
                    satisfiable = Some(holds);
                    holds
                }
            };
            if !holds {
                return Ok(());
            }

            match self.resolve_test(vm, &snapshot, Outcome::Threw(exception.clone())) {
                Ok(test) => self.record(test),
                Err(e) => self.skip_test(e)?,
            }
        }
        Ok(())
    }

    /// Forget the snapshot of an activation that will not be resumed
    pub fn release_activation(&mut self, activation: ActivationId) -> bool {
        self.snapshots.release(activation).is_some()
    }

    /// Render the collection through the configured formatter.
    ///
    /// If the formatter cannot be created nothing is written.
    pub fn on_run_finished(&self, out: &mut dyn io::Write) -> SynthesisResult<()> {
        let mut formatter = match self.registry.create(&self.config) {
            Ok(formatter) => formatter,
            Err(e) => {
                error!("{}, no tests will be written", e);
                return Err(e);
            }
        };

        debug!(
            "writing {} test case(s) for {} method(s) with '{}'",
            self.collection.len(),
            self.collection.method_count(),
            formatter.name()
        );
        formatter.format_all(&self.collection, out)
    }

    fn capture<V: SymbolicVm + ?Sized>(
        &self,
        vm: &mut V,
        event: &CallEntered,
        kinds: &[ArgKind],
    ) -> SynthesisResult<CallSnapshot> {
        let method = &event.method;
        let count = method.argument_count();
        if kinds.len() != count || event.args.len() != count {
            return Err(SynthesisError::contract(format!(
                "{} takes {} argument(s) but {} classification(s) and {} value(s) were reported",
                method.base_name(),
                count,
                kinds.len(),
                event.args.len()
            )));
        }

        let mut symbolic = Vec::new();
        let mut concrete = Vec::new();
        for ((binding, kind), captured) in method.arguments().zip(kinds).zip(&event.args) {
            match kind {
                ArgKind::Symbolic => symbolic.push((binding.clone(), *captured)),
                ArgKind::Concrete => {
                    if matches!(captured, Captured::Symbolic(_) | Captured::SymbolicArray(_)) {
                        return Err(SynthesisError::contract(format!(
                            "'{}' of {} is classified concrete but was captured symbolically",
                            binding.name,
                            method.base_name()
                        )));
                    }
                    let value = self.resolver.resolve(vm, &binding.name, &binding.ty, captured)?;
                    concrete.push((binding.clone(), value));
                }
            }
        }

        CallSnapshot::new(method.clone(), symbolic, concrete)
    }

    fn resolve_test<V: SymbolicVm + ?Sized>(
        &self,
        vm: &mut V,
        snapshot: &CallSnapshot,
        outcome: Outcome,
    ) -> SynthesisResult<TestCase> {
        let args: Vec<(Arc<VariableBinding>, ConcreteValue)> = self.resolver.resolve_snapshot(vm, snapshot)?;
        TestCase::new(snapshot.method().clone(), args, outcome)
    }

    fn path_condition_holds<V: SymbolicVm + ?Sized>(&mut self, vm: &mut V, method: &MethodSignature) -> bool {
        match vm.solve_path_condition() {
            Some(true) => true,
            solved => {
                debug!(
                    "path condition for {} is {}, abandoning",
                    method.base_name(),
                    if solved.is_some() { "unsatisfiable" } else { "absent" }
                );
                self.stats.abandoned += 1;
                false
            }
        }
    }

    fn record(&mut self, test: TestCase) {
        let name = test.method.base_name();
        if self.collection.insert(test) {
            trace!("new test case for {}", name);
            self.stats.emitted += 1;
        } else {
            trace!("duplicate test case for {}", name);
            self.stats.duplicates += 1;
        }
    }

    /// Any other frame on the stack still waiting for its own resolution
    fn has_tracked_caller<V: SymbolicVm + ?Sized>(&self, vm: &V, current: ActivationId) -> bool {
        vm.call_stack()
            .iter()
            .any(|frame| frame.activation != current && self.snapshots.contains(frame.activation))
    }

    fn skip_method(&mut self, method: &Arc<MethodSignature>, e: SynthesisError) -> SynthesisResult<()> {
        if !e.is_recoverable() {
            return Err(e);
        }
        self.stats.skipped += 1;
        if self.rejected.insert(method.clone()) {
            warn!("{}, skipping", e);
        } else {
            trace!("{}, skipping", e);
        }
        Ok(())
    }

    fn skip_test(&mut self, e: SynthesisError) -> SynthesisResult<()> {
        if !e.is_recoverable() {
            return Err(e);
        }
        warn!("{}, test case skipped", e);
        self.stats.skipped += 1;
        Ok(())
    }
}

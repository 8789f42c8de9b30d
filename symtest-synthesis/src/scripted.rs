//! An in-memory VM driven by hand
//!
//! `ScriptedVm` holds a solver model, a heap of arrays and a call stack that
//! the caller sets up directly. It stands in for a real symbolic-execution VM
//! when exercising the engine.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use symtest_core::{MethodSignature, PrimitiveType, TypeDescriptor};

use crate::vm::{
    ActivationId, ArgKind, ArrayRef, ArraySlot, Frame, HeapArray, Solution, SymbolicVm, ValueSource, VarId,
};

#[derive(Debug)]
pub struct ScriptedVm {
    solutions: FxHashMap<VarId, Solution>,
    array_solutions: FxHashMap<VarId, Option<Vec<Solution>>>,
    heap: FxHashMap<ArrayRef, HeapArray>,
    /// Tracked methods by full name
    tracked: FxHashMap<String, Vec<ArgKind>>,
    path_condition: Option<bool>,
    /// Innermost frame last
    stack: Vec<Frame>,
    handlers: FxHashSet<(ActivationId, String)>,
    pending_alternatives: bool,
    ignored_branches: usize,
    next_var: u32,
    next_array: u32,
}

impl ScriptedVm {
    /// An empty VM with a satisfiable path condition
    pub fn new() -> Self {
        Self {
            solutions: FxHashMap::default(),
            array_solutions: FxHashMap::default(),
            heap: FxHashMap::default(),
            tracked: FxHashMap::default(),
            path_condition: Some(true),
            stack: Vec::new(),
            handlers: FxHashSet::default(),
            pending_alternatives: false,
            ignored_branches: 0,
            next_var: 0,
            next_array: 0,
        }
    }

    /// Track `method` with every argument symbolic
    pub fn track(&mut self, method: &MethodSignature) {
        let kinds = vec![ArgKind::Symbolic; method.argument_count()];
        self.track_with(method, kinds);
    }

    /// Track `method` with an explicit per-argument classification
    pub fn track_with(&mut self, method: &MethodSignature, kinds: Vec<ArgKind>) {
        self.tracked.insert(method.full_name(), kinds);
    }

    /// A fresh symbolic variable with the given solution
    pub fn var(&mut self, solution: Solution) -> VarId {
        let id = VarId(self.next_var);
        self.next_var += 1;
        self.solutions.insert(id, solution);
        id
    }

    /// A fresh variable the model leaves free
    pub fn undefined_var(&mut self) -> VarId {
        self.var(Solution::Undefined)
    }

    pub fn set_solution(&mut self, var: VarId, solution: Solution) {
        self.solutions.insert(var, solution);
    }

    /// A primitive array on the heap
    pub fn array(&mut self, element: PrimitiveType, slots: Vec<ArraySlot>) -> ArrayRef {
        self.heap(element.into(), slots)
    }

    /// An array of any element type on the heap
    pub fn heap(&mut self, element: TypeDescriptor, slots: Vec<ArraySlot>) -> ArrayRef {
        let id = ArrayRef(self.next_array);
        self.next_array += 1;
        self.heap.insert(id, HeapArray { element, slots });
        id
    }

    /// A fully symbolic array; `None` leaves it underconstrained
    pub fn symbolic_array(&mut self, solution: Option<Vec<Solution>>) -> VarId {
        let id = VarId(self.next_var);
        self.next_var += 1;
        self.array_solutions.insert(id, solution);
        id
    }

    pub fn set_path_condition(&mut self, satisfiable: Option<bool>) {
        self.path_condition = satisfiable;
    }

    /// Push a frame; it becomes the innermost one
    pub fn push_frame(&mut self, activation: ActivationId, method: Arc<MethodSignature>) {
        self.stack.push(Frame { activation, method });
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.stack.pop()
    }

    /// Make `activation` catch exceptions of `exception_type`
    pub fn add_handler(&mut self, activation: ActivationId, exception_type: impl Into<String>) {
        self.handlers.insert((activation, exception_type.into()));
    }

    pub fn set_pending_alternatives(&mut self, pending: bool) {
        self.pending_alternatives = pending;
    }

    /// How many branches the engine asked to abandon
    pub fn ignored_branches(&self) -> usize {
        self.ignored_branches
    }
}

impl Default for ScriptedVm {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueSource for ScriptedVm {
    fn solution(&self, var: VarId) -> Solution {
        self.solutions.get(&var).copied().unwrap_or(Solution::Undefined)
    }

    fn assign(&mut self, var: VarId, value: Solution) {
        self.solutions.insert(var, value);
    }

    fn array_solution(&self, var: VarId) -> Option<Vec<Solution>> {
        self.array_solutions.get(&var).cloned().flatten()
    }

    fn heap_array(&self, array: ArrayRef) -> Option<HeapArray> {
        self.heap.get(&array).cloned()
    }
}

impl SymbolicVm for ScriptedVm {
    fn classify(&self, method: &MethodSignature) -> Option<Vec<ArgKind>> {
        self.tracked.get(&method.full_name()).cloned()
    }

    fn solve_path_condition(&mut self) -> Option<bool> {
        self.path_condition
    }

    fn call_stack(&self) -> Vec<Frame> {
        self.stack.iter().rev().cloned().collect()
    }

    fn has_handler(&self, frame: &Frame, exception_type: &str) -> bool {
        self.handlers
            .contains(&(frame.activation, exception_type.to_string()))
    }

    fn has_pending_alternatives(&self) -> bool {
        self.pending_alternatives
    }

    fn ignore_current_branch(&mut self) {
        self.ignored_branches += 1;
    }
}

//! Interface to the symbolic-execution VM
//!
//! The VM drives synthesis through three notifications and answers queries
//! about its solver model, call stack and choice points. Nothing here knows
//! how the VM explores or solves; it only names the data crossing the boundary.

use std::fmt;
use std::sync::Arc;

use symtest_core::{ExceptionInfo, MethodSignature, Scalar, TypeDescriptor};

/// Stable identifier of one method activation, assigned by the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivationId(pub u64);

impl fmt::Display for ActivationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a symbolic variable in the solver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub u32);

/// Handle to an array object on the VM heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayRef(pub u32);

/// How the VM reports an argument or return slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Captured {
    /// A concrete primitive; booleans may arrive as integers
    Concrete(Scalar),
    /// A symbolic primitive
    Symbolic(VarId),
    /// A heap array whose elements may carry symbolic attributes
    Array(ArrayRef),
    /// An array whose contents are a single symbolic variable
    SymbolicArray(VarId),
}

/// Whether the VM treats a parameter as symbolic in the current branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Symbolic,
    Concrete,
}

/// A variable's value in the solved model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Solution {
    Integer(i64),
    Real(f64),
    /// The model leaves the variable free
    Undefined,
}

/// One element of a heap array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArraySlot {
    /// Concrete content of the slot
    pub value: Scalar,
    /// Symbolic attribute attached to the slot, if any
    pub symbolic: Option<VarId>,
}

impl ArraySlot {
    pub fn concrete(value: Scalar) -> Self {
        Self {
            value,
            symbolic: None,
        }
    }

    /// A slot whose concrete content is a placeholder for `var`
    pub fn symbolic(var: VarId) -> Self {
        Self {
            value: Scalar::Integer(0),
            symbolic: Some(var),
        }
    }
}

/// Snapshot of a heap array's layout and contents
#[derive(Debug, Clone, PartialEq)]
pub struct HeapArray {
    pub element: TypeDescriptor,
    pub slots: Vec<ArraySlot>,
}

impl HeapArray {
    pub fn is_partially_symbolic(&self) -> bool {
        self.slots.iter().any(|s| s.symbolic.is_some())
    }
}

/// A frame on the VM call stack
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub activation: ActivationId,
    pub method: Arc<MethodSignature>,
}

/// Read and write access to the solved model and heap
pub trait ValueSource {
    /// Current solution of a symbolic variable
    fn solution(&self, var: VarId) -> Solution;

    /// Fix a variable's value in the model so later reads observe it
    fn assign(&mut self, var: VarId, value: Solution);

    /// Element solutions of a fully symbolic array; `None` when underconstrained
    fn array_solution(&self, var: VarId) -> Option<Vec<Solution>>;

    /// Contents of a heap array
    fn heap_array(&self, array: ArrayRef) -> Option<HeapArray>;
}

/// The symbolic-execution VM as seen by the synthesis engine.
///
/// The engine keeps the snapshot of a tracked activation after it exits,
/// since backtracking may finish the same activation again on another
/// branch. The VM owns that lifetime: once an activation can no longer be
/// resumed, call [`SynthesisEngine::release_activation`] for it, or the
/// snapshot table grows for the rest of the run.
///
/// [`SynthesisEngine::release_activation`]: crate::engine::SynthesisEngine::release_activation
pub trait SymbolicVm: ValueSource {
    /// Per-argument classification for a method configured as symbolic.
    ///
    /// Returns `None` for methods that are not tracked at all.
    fn classify(&self, method: &MethodSignature) -> Option<Vec<ArgKind>>;

    /// Solve the current path condition; `None` when there is none
    fn solve_path_condition(&mut self) -> Option<bool>;

    /// Frames from the innermost (faulting) outward
    fn call_stack(&self) -> Vec<Frame>;

    /// Whether `frame` handles `exception_type` at its current program point
    fn has_handler(&self, frame: &Frame, exception_type: &str) -> bool;

    /// Whether unexplored alternatives remain at the last choice point
    fn has_pending_alternatives(&self) -> bool;

    /// Stop exploring the current branch
    fn ignore_current_branch(&mut self);
}

/// A method activation has started
#[derive(Debug, Clone)]
pub struct CallEntered {
    pub activation: ActivationId,
    pub method: Arc<MethodSignature>,
    /// One entry per non-receiver parameter, in declaration order
    pub args: Vec<Captured>,
}

/// A method activation returned normally
#[derive(Debug, Clone)]
pub struct CallExited {
    pub activation: ActivationId,
    pub method: Arc<MethodSignature>,
    /// `None` for void methods
    pub return_value: Option<Captured>,
}

/// An exception was raised; the stack is read from [`SymbolicVm::call_stack`]
#[derive(Debug, Clone)]
pub struct ExceptionThrown {
    pub exception: ExceptionInfo,
}

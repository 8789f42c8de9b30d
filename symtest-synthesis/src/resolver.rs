//! Turning captured values into concrete ones
//!
//! Every integer-width primitive is resolved as an `i64` and every real as an
//! `f64`; narrowing happens when the value is rendered. Variables the solver
//! leaves free take a fixed default, which is written back into the model so
//! any later read of the same variable agrees with the emitted test.

use std::sync::Arc;

use symtest_core::{
    ConcreteArray, ConcreteValue, GeneratorConfig, MethodSignature, Outcome, PrimitiveType, Scalar,
    SynthesisError, SynthesisResult, TypeDescriptor, ValueFamily, VariableBinding,
};
use tracing::trace;

use crate::snapshot::CallSnapshot;
use crate::vm::{ArrayRef, Captured, Solution, ValueSource, VarId};

/// Value of an underconstrained integer-family variable
pub const INTEGER_DEFAULT: i64 = 0;

/// Value of an underconstrained real-family variable
pub const REAL_DEFAULT: f64 = 0.0;

/// Default for a free variable of the given family, in solver form.
/// Booleans are integers in the model, so `false` is `0`.
pub fn default_solution(family: ValueFamily) -> Solution {
    match family {
        ValueFamily::Integer | ValueFamily::Boolean => Solution::Integer(INTEGER_DEFAULT),
        ValueFamily::Real => Solution::Real(REAL_DEFAULT),
    }
}

/// Resolves captured arguments and return slots against a solved model
#[derive(Debug, Clone)]
pub struct ValueResolver {
    symbolic_arrays: bool,
}

impl ValueResolver {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            symbolic_arrays: config.symbolic_arrays,
        }
    }

    /// Resolve every argument of a snapshot, in parameter order
    pub fn resolve_snapshot<S: ValueSource + ?Sized>(
        &self,
        source: &mut S,
        snapshot: &CallSnapshot,
    ) -> SynthesisResult<Vec<(Arc<VariableBinding>, ConcreteValue)>> {
        let mut resolved = Vec::with_capacity(snapshot.method().argument_count());
        for (binding, captured) in snapshot.symbolic_args() {
            let value = self.resolve(source, &binding.name, &binding.ty, captured)?;
            resolved.push((binding.clone(), value));
        }
        resolved.extend(snapshot.concrete_args().iter().cloned());
        resolved.sort_by_key(|(binding, _)| binding.ordinal);
        Ok(resolved)
    }

    /// Outcome of a normal return
    pub fn resolve_return<S: ValueSource + ?Sized>(
        &self,
        source: &mut S,
        method: &MethodSignature,
        captured: Option<&Captured>,
    ) -> SynthesisResult<Outcome> {
        match (&method.return_type, captured) {
            (TypeDescriptor::Void, None) => Ok(Outcome::Void),
            (TypeDescriptor::Void, Some(_)) => Err(SynthesisError::contract(format!(
                "void method {} reported a return value",
                method.base_name()
            ))),
            (_, None) => Err(SynthesisError::contract(format!(
                "{} returned without a value",
                method.base_name()
            ))),
            (ty, Some(captured)) => {
                let name = format!("{} return value", method.base_name());
                Ok(Outcome::Returned(self.resolve(source, &name, ty, captured)?))
            }
        }
    }

    /// Resolve one slot of declared type `ty`; `name` identifies it in errors
    pub fn resolve<S: ValueSource + ?Sized>(
        &self,
        source: &mut S,
        name: &str,
        ty: &TypeDescriptor,
        captured: &Captured,
    ) -> SynthesisResult<ConcreteValue> {
        match (ty, captured) {
            (TypeDescriptor::Primitive(p), Captured::Concrete(value)) => {
                Ok(ConcreteValue::Scalar(coerce(name, *p, *value)?))
            }
            (TypeDescriptor::Primitive(p), Captured::Symbolic(var)) => {
                Ok(ConcreteValue::Scalar(resolve_variable(source, name, *p, *var)?))
            }
            (TypeDescriptor::Array(_), _) => {
                let element = ty.basic_array_element().ok_or_else(|| SynthesisError::UnsupportedArray {
                    binding: name.to_string(),
                    reason: format!("{} is not a one-dimensional array of primitives", ty),
                })?;
                match captured {
                    Captured::Array(array) => resolve_heap_array(source, name, element, *array),
                    Captured::SymbolicArray(var) => self.resolve_symbolic_array(source, name, element, *var),
                    _ => Err(mismatch(name, ty, captured)),
                }
            }
            _ => Err(mismatch(name, ty, captured)),
        }
    }

    fn resolve_symbolic_array<S: ValueSource + ?Sized>(
        &self,
        source: &S,
        name: &str,
        element: PrimitiveType,
        var: VarId,
    ) -> SynthesisResult<ConcreteValue> {
        if !self.symbolic_arrays {
            return Err(SynthesisError::SymbolicArraysDisabled {
                binding: name.to_string(),
            });
        }

        let elements = match source.array_solution(var) {
            Some(solutions) => solutions
                .into_iter()
                .map(|s| {
                    let s = match s {
                        Solution::Undefined => default_solution(element.family()),
                        s => s,
                    };
                    from_solution(name, element, s)
                })
                .collect::<SynthesisResult<Vec<_>>>()?,
            None => {
                trace!("array '{}' is underconstrained, resolving to an empty array", name);
                Vec::new()
            }
        };
        Ok(ConcreteArray::new(element, elements).into())
    }
}

/// Solution of `var` as a value of type `ty`, fixing free variables to the default
fn resolve_variable<S: ValueSource + ?Sized>(
    source: &mut S,
    name: &str,
    ty: PrimitiveType,
    var: VarId,
) -> SynthesisResult<Scalar> {
    let solution = match source.solution(var) {
        Solution::Undefined => {
            let default = default_solution(ty.family());
            trace!("'{}' is underconstrained, defaulting to {:?}", name, default);
            source.assign(var, default);
            default
        }
        solution => solution,
    };
    from_solution(name, ty, solution)
}

/// Element-wise resolution: symbolic slots through the model, the rest as stored
fn resolve_heap_array<S: ValueSource + ?Sized>(
    source: &mut S,
    name: &str,
    declared: PrimitiveType,
    array: ArrayRef,
) -> SynthesisResult<ConcreteValue> {
    let heap = source
        .heap_array(array)
        .ok_or_else(|| SynthesisError::contract(format!("array behind '{}' is not on the heap", name)))?;

    let element = match heap.element {
        TypeDescriptor::Primitive(p) => p,
        ref other => {
            return Err(SynthesisError::UnsupportedArray {
                binding: name.to_string(),
                reason: format!("elements of type {} cannot be written as literals", other),
            })
        }
    };
    if element != declared {
        return Err(SynthesisError::contract(format!(
            "'{}' is declared {}[] but holds {} elements",
            name,
            declared.keyword(),
            element.keyword()
        )));
    }

    let mut elements = Vec::with_capacity(heap.slots.len());
    for (index, slot) in heap.slots.iter().enumerate() {
        let value = match slot.symbolic {
            Some(var) => resolve_variable(source, &format!("{}[{}]", name, index), element, var)?,
            None => coerce(name, element, slot.value)?,
        };
        elements.push(value);
    }
    Ok(ConcreteArray::new(element, elements).into())
}

fn from_solution(name: &str, ty: PrimitiveType, solution: Solution) -> SynthesisResult<Scalar> {
    let scalar = match solution {
        Solution::Integer(n) => Scalar::Integer(n),
        Solution::Real(x) => Scalar::Real(x),
        Solution::Undefined => {
            return Err(SynthesisError::contract(format!("'{}' has no solution", name)));
        }
    };
    coerce(name, ty, scalar)
}

fn coerce(name: &str, ty: PrimitiveType, value: Scalar) -> SynthesisResult<Scalar> {
    value.coerce_to(ty).ok_or_else(|| {
        SynthesisError::contract(format!(
            "'{}' is declared {} but resolved to {}",
            name,
            ty.keyword(),
            value
        ))
    })
}

fn mismatch(name: &str, ty: &TypeDescriptor, captured: &Captured) -> SynthesisError {
    SynthesisError::contract(format!(
        "'{}' is declared {} but was captured as {:?}",
        name, ty, captured
    ))
}

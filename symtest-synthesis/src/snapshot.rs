//! Per-activation call snapshots

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use symtest_core::{ConcreteValue, MethodSignature, SynthesisError, SynthesisResult, VariableBinding};

use crate::vm::{ActivationId, Captured};

/// Arguments of one tracked call, as captured at entry.
///
/// Symbolic arguments are kept as handles and resolved against whatever
/// model is current when the call finishes; concrete arguments are fixed.
#[derive(Debug, Clone)]
pub struct CallSnapshot {
    method: Arc<MethodSignature>,
    symbolic_args: Vec<(Arc<VariableBinding>, Captured)>,
    concrete_args: Vec<(Arc<VariableBinding>, ConcreteValue)>,
}

impl CallSnapshot {
    /// Build a snapshot whose two argument sets are disjoint and together
    /// cover every non-receiver parameter of `method`
    pub fn new(
        method: Arc<MethodSignature>,
        symbolic_args: Vec<(Arc<VariableBinding>, Captured)>,
        concrete_args: Vec<(Arc<VariableBinding>, ConcreteValue)>,
    ) -> SynthesisResult<Self> {
        let bound = symbolic_args
            .iter()
            .map(|(b, _)| b)
            .chain(concrete_args.iter().map(|(b, _)| b));

        let mut seen = vec![false; method.params.len()];
        for binding in bound {
            match seen.get_mut(binding.ordinal) {
                Some(slot) if !binding.is_receiver && !*slot => *slot = true,
                _ => {
                    return Err(SynthesisError::contract(format!(
                        "snapshot of {} binds '{}' twice or out of range",
                        method.base_name(),
                        binding.name
                    )))
                }
            }
        }

        if let Some(missing) = method.arguments().find(|p| !seen[p.ordinal]) {
            return Err(SynthesisError::contract(format!(
                "snapshot of {} does not capture '{}'",
                method.base_name(),
                missing.name
            )));
        }

        Ok(Self {
            method,
            symbolic_args,
            concrete_args,
        })
    }

    pub fn method(&self) -> &Arc<MethodSignature> {
        &self.method
    }

    pub fn symbolic_args(&self) -> &[(Arc<VariableBinding>, Captured)] {
        &self.symbolic_args
    }

    pub fn concrete_args(&self) -> &[(Arc<VariableBinding>, ConcreteValue)] {
        &self.concrete_args
    }

    pub fn is_symbolic(&self, name: &str) -> bool {
        self.symbolic_args.iter().any(|(b, _)| b.name == name)
    }
}

impl fmt::Display for CallSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} symbolic [", self.method.base_name())?;
        for (i, (binding, _)) in self.symbolic_args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&binding.name)?;
        }
        f.write_str("] concrete [")?;
        for (i, (binding, value)) in self.concrete_args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", binding.name, value)?;
        }
        f.write_str("]")
    }
}

/// Snapshots keyed by the activation they belong to.
///
/// Entries outlive a single exit because the VM may backtrack into an
/// activation and finish it again along another branch. The VM releases an
/// entry once the activation is gone for good.
#[derive(Debug, Default)]
pub struct SnapshotTable {
    snapshots: FxHashMap<ActivationId, Arc<CallSnapshot>>,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a snapshot; returns `false` and keeps the existing one if the
    /// activation is already tracked
    pub fn attach(&mut self, activation: ActivationId, snapshot: CallSnapshot) -> bool {
        if self.snapshots.contains_key(&activation) {
            return false;
        }
        self.snapshots.insert(activation, Arc::new(snapshot));
        true
    }

    pub fn get(&self, activation: ActivationId) -> Option<&Arc<CallSnapshot>> {
        self.snapshots.get(&activation)
    }

    pub fn contains(&self, activation: ActivationId) -> bool {
        self.snapshots.contains_key(&activation)
    }

    pub fn release(&mut self, activation: ActivationId) -> Option<Arc<CallSnapshot>> {
        self.snapshots.remove(&activation)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::VarId;
    use symtest_core::{ClassInfo, PrimitiveType};

    fn clamp() -> Arc<MethodSignature> {
        MethodSignature::builder(ClassInfo::new("Range", true), "clamp")
            .instance()
            .param("x", PrimitiveType::Int)
            .param("lo", PrimitiveType::Int)
            .returns(PrimitiveType::Int)
            .build()
            .unwrap()
    }

    #[test]
    fn test_snapshot_covers_arguments() {
        let method = clamp();
        let x = method.argument("x").unwrap().clone();
        let lo = method.argument("lo").unwrap().clone();

        let snapshot = CallSnapshot::new(
            method.clone(),
            vec![(x, Captured::Symbolic(VarId(1)))],
            vec![(lo, ConcreteValue::int(3))],
        )
        .unwrap();

        assert!(snapshot.is_symbolic("x"));
        assert!(!snapshot.is_symbolic("lo"));
        assert_eq!(snapshot.to_string(), "Range.clamp symbolic [x] concrete [lo=3]");
    }

    #[test]
    fn test_snapshot_rejects_gaps_and_overlap() {
        let method = clamp();
        let x = method.argument("x").unwrap().clone();
        let lo = method.argument("lo").unwrap().clone();

        let missing = CallSnapshot::new(method.clone(), vec![(x.clone(), Captured::Symbolic(VarId(1)))], vec![]);
        assert!(matches!(missing, Err(SynthesisError::ContractViolation(_))));

        let overlap = CallSnapshot::new(
            method.clone(),
            vec![(x.clone(), Captured::Symbolic(VarId(1)))],
            vec![(x, ConcreteValue::int(1)), (lo, ConcreteValue::int(0))],
        );
        assert!(overlap.is_err());

        let receiver = method.params[0].clone();
        let bound_receiver = CallSnapshot::new(method, vec![], vec![(receiver, ConcreteValue::int(0))]);
        assert!(bound_receiver.is_err());
    }

    #[test]
    fn test_table_attach_is_idempotent() {
        let method = MethodSignature::builder(ClassInfo::new("Clock", true), "tick")
            .build()
            .unwrap();
        let mut table = SnapshotTable::new();
        let id = ActivationId(7);

        assert!(table.attach(id, CallSnapshot::new(method.clone(), vec![], vec![]).unwrap()));
        assert!(!table.attach(id, CallSnapshot::new(method, vec![], vec![]).unwrap()));
        assert_eq!(table.len(), 1);
        assert!(table.contains(id));

        assert!(table.release(id).is_some());
        assert!(table.is_empty());
        assert!(table.get(id).is_none());
    }
}

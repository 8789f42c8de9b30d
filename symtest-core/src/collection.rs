//! Grouped, deduplicated collection of test cases

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::method::MethodSignature;
use crate::test_case::TestCase;

/// Test cases of one method, in first-seen order
#[derive(Debug, Clone)]
pub struct MethodGroup {
    pub method: Arc<MethodSignature>,
    tests: Vec<Arc<TestCase>>,
    seen: FxHashSet<Arc<TestCase>>,
}

impl MethodGroup {
    fn new(method: Arc<MethodSignature>) -> Self {
        Self {
            method,
            tests: Vec::new(),
            seen: FxHashSet::default(),
        }
    }

    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn contains(&self, test: &TestCase) -> bool {
        self.seen.contains(test)
    }
}

/// Mapping from method identity to its set of test cases.
///
/// Membership is deduplicated by structural equality of [`TestCase`].
/// Iteration follows first insertion so rendered output is reproducible.
#[derive(Debug, Clone, Default)]
pub struct TestCollection {
    groups: Vec<MethodGroup>,
    index: FxHashMap<Arc<MethodSignature>, usize>,
}

impl TestCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test case. Returns `false` if an equal case was already present.
    pub fn insert(&mut self, test: TestCase) -> bool {
        let slot = match self.index.get(&test.method) {
            Some(&slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push(MethodGroup::new(test.method.clone()));
                self.index.insert(test.method.clone(), slot);
                slot
            }
        };

        let group = &mut self.groups[slot];
        if group.seen.contains(&test) {
            return false;
        }
        let test = Arc::new(test);
        group.seen.insert(test.clone());
        group.tests.push(test);
        true
    }

    /// Total number of distinct test cases
    pub fn len(&self) -> usize {
        self.groups.iter().map(MethodGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn method_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = &MethodGroup> {
        self.groups.iter()
    }

    pub fn get(&self, method: &MethodSignature) -> Option<&MethodGroup> {
        self.index.get(method).map(|&slot| &self.groups[slot])
    }

    pub fn contains_method(&self, method: &MethodSignature) -> bool {
        self.index.contains_key(method)
    }

    /// All test cases, grouped by method
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.groups.iter().flat_map(|g| g.tests())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::ClassInfo;
    use crate::test_case::Outcome;
    use crate::types::PrimitiveType;
    use crate::value::ConcreteValue;

    fn method(name: &str) -> Arc<MethodSignature> {
        MethodSignature::builder(ClassInfo::new("Demo", true), name)
            .param("x", PrimitiveType::Int)
            .build()
            .unwrap()
    }

    fn case(method: &Arc<MethodSignature>, x: i64) -> TestCase {
        let binding = method.argument("x").cloned().unwrap();
        TestCase::new(method.clone(), vec![(binding, ConcreteValue::int(x))], Outcome::Void).unwrap()
    }

    #[test]
    fn test_insert_is_idempotent() {
        let m = method("run");
        let mut collection = TestCollection::new();
        assert!(collection.insert(case(&m, 1)));
        assert!(!collection.insert(case(&m, 1)));
        assert_eq!(collection.len(), 1);
        assert!(collection.insert(case(&m, 2)));
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.method_count(), 1);
    }

    #[test]
    fn test_groups_keep_first_insertion_order() {
        let first = method("first");
        let second = method("second");
        let mut collection = TestCollection::new();
        collection.insert(case(&second, 1));
        collection.insert(case(&first, 1));
        collection.insert(case(&second, 0));

        let names: Vec<_> = collection.groups().map(|g| g.method.name.as_str()).collect();
        assert_eq!(names, vec!["second", "first"]);

        let xs: Vec<_> = collection
            .get(&second)
            .unwrap()
            .tests()
            .map(|t| t.arg("x").cloned().unwrap())
            .collect();
        assert_eq!(xs, vec![ConcreteValue::int(1), ConcreteValue::int(0)]);
    }
}

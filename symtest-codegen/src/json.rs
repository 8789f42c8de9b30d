//! Machine-readable rendering of test cases

use std::io;

use serde::Serialize;
use symtest_core::{
    ConcreteValue, GeneratorConfig, MethodGroup, Outcome, SynthesisError, SynthesisResult, TestCase,
    TestCollection,
};

use crate::formatter::{renderable_groups, TestFormatter};

/// Writes the collection as a JSON document, one entry per method
pub struct JsonFormatter {
    package: Option<String>,
    class_name: String,
    counter: usize,
}

#[derive(Serialize)]
struct SuiteView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    package: Option<&'a str>,
    class_name: &'a str,
    methods: Vec<MethodView<'a>>,
}

#[derive(Serialize)]
struct MethodView<'a> {
    class: &'a str,
    name: &'a str,
    descriptor: String,
    is_static: bool,
    tests: Vec<CaseView<'a>>,
}

#[derive(Serialize)]
struct CaseView<'a> {
    id: usize,
    args: Vec<ArgView<'a>>,
    outcome: &'a Outcome,
}

#[derive(Serialize)]
struct ArgView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: String,
    value: &'a ConcreteValue,
}

impl JsonFormatter {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            package: config.package.clone(),
            class_name: config.class_name.clone(),
            counter: 0,
        }
    }

    fn case_view<'a>(&mut self, test: &'a TestCase) -> CaseView<'a> {
        let id = self.counter;
        self.counter += 1;
        CaseView {
            id,
            args: test
                .args()
                .map(|arg| ArgView {
                    name: &arg.binding.name,
                    ty: arg.binding.ty.source_name(),
                    value: &arg.value,
                })
                .collect(),
            outcome: &test.outcome,
        }
    }

    fn method_view<'a>(&mut self, group: &'a MethodGroup) -> MethodView<'a> {
        let method = &group.method;
        MethodView {
            class: method.class_name(),
            name: &method.name,
            descriptor: method.descriptor(),
            is_static: method.is_static,
            tests: group.tests().map(|test| self.case_view(test)).collect(),
        }
    }
}

fn to_serialization_error(e: serde_json::Error) -> SynthesisError {
    SynthesisError::Serialization(e.to_string())
}

impl TestFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn format_test(&mut self, test: &TestCase) -> SynthesisResult<String> {
        let view = self.case_view(test);
        serde_json::to_string_pretty(&view).map_err(to_serialization_error)
    }

    fn format_all(&mut self, tests: &TestCollection, out: &mut dyn io::Write) -> SynthesisResult<()> {
        self.reset_counter();

        let mut methods = Vec::new();
        for group in renderable_groups(tests) {
            methods.push(self.method_view(group));
        }

        let suite = SuiteView {
            package: self.package.as_deref(),
            class_name: &self.class_name,
            methods,
        };
        serde_json::to_writer_pretty(&mut *out, &suite).map_err(to_serialization_error)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    fn reset_counter(&mut self) {
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use symtest_core::{ClassInfo, ExceptionInfo, MethodSignature, PrimitiveType, TypeDescriptor};

    fn collection() -> TestCollection {
        let sum = MethodSignature::builder(ClassInfo::new("demo.Stats", true), "sum")
            .param("values", TypeDescriptor::array_of(PrimitiveType::Int))
            .returns(PrimitiveType::Int)
            .build()
            .unwrap();
        let values = sum.argument("values").unwrap().clone();

        let mut tests = TestCollection::new();
        tests.insert(
            TestCase::new(
                sum.clone(),
                vec![(values, ConcreteValue::int_array(PrimitiveType::Int, &[5, 7, 9]))],
                Outcome::Returned(ConcreteValue::int(21)),
            )
            .unwrap(),
        );
        tests
    }

    #[test]
    fn test_suite_document() {
        let mut formatter = JsonFormatter::new(&GeneratorConfig::default());
        let mut out = Vec::new();
        formatter.format_all(&collection(), &mut out).unwrap();

        let doc: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(doc["class_name"], "Testcases");
        assert!(doc.get("package").is_none());

        let method = &doc["methods"][0];
        assert_eq!(method["name"], "sum");
        assert_eq!(method["descriptor"], "([I)I");

        let case = &method["tests"][0];
        assert_eq!(case["id"], 0);
        assert_eq!(case["args"][0]["type"], "int[]");
        assert_eq!(case["args"][0]["value"]["elements"], serde_json::json!([5, 7, 9]));
        assert_eq!(case["outcome"]["kind"], "returned");
        assert_eq!(case["outcome"]["value"], 21);
    }

    #[test]
    fn test_exception_message_reported() {
        let inv = MethodSignature::builder(ClassInfo::new("Calc", true), "inv")
            .param("x", PrimitiveType::Int)
            .returns(PrimitiveType::Int)
            .build()
            .unwrap();
        let x = inv.argument("x").unwrap().clone();
        let thrown = ExceptionInfo::new("java.lang.ArithmeticException").with_message("/ by zero");

        let mut tests = TestCollection::new();
        tests.insert(TestCase::new(inv, vec![(x, ConcreteValue::int(0))], Outcome::Threw(thrown)).unwrap());

        let mut formatter = JsonFormatter::new(&GeneratorConfig::default());
        let mut out = Vec::new();
        formatter.format_all(&tests, &mut out).unwrap();

        let doc: Value = serde_json::from_slice(&out).unwrap();
        let outcome = &doc["methods"][0]["tests"][0]["outcome"];
        assert_eq!(outcome["kind"], "threw");
        assert_eq!(outcome["value"]["type_name"], "java.lang.ArithmeticException");
        assert_eq!(outcome["value"]["message"], "/ by zero");
    }

    #[test]
    fn test_counter_resets_per_document() {
        let mut formatter = JsonFormatter::new(&GeneratorConfig::default());
        let tests = collection();

        let mut first = Vec::new();
        formatter.format_all(&tests, &mut first).unwrap();
        let mut second = Vec::new();
        formatter.format_all(&tests, &mut second).unwrap();
        assert_eq!(first, second);
    }
}

//! Rendering tests for the JUnit formatters

use std::sync::Arc;

use symtest_codegen::{Dialect, FormatterRegistry, JavaFormatter, TestFormatter};
use symtest_core::{
    ClassInfo, ConcreteArray, ConcreteValue, ExceptionInfo, GeneratorConfig, MessageLevel, MethodSignature,
    Outcome, PrimitiveType, Scalar, TestCase, TestCollection, TypeDescriptor,
};

fn add() -> Arc<MethodSignature> {
    MethodSignature::builder(ClassInfo::new("Calc", true), "add")
        .param("a", PrimitiveType::Int)
        .param("b", PrimitiveType::Int)
        .returns(PrimitiveType::Int)
        .build()
        .unwrap()
}

fn div() -> Arc<MethodSignature> {
    MethodSignature::builder(ClassInfo::new("Calc", true), "div")
        .param("a", PrimitiveType::Int)
        .param("b", PrimitiveType::Int)
        .returns(PrimitiveType::Int)
        .throws("java.io.IOException")
        .build()
        .unwrap()
}

fn int_case(method: &Arc<MethodSignature>, a: i64, b: i64, outcome: Outcome) -> TestCase {
    let args = vec![
        (method.argument("a").unwrap().clone(), ConcreteValue::int(a)),
        (method.argument("b").unwrap().clone(), ConcreteValue::int(b)),
    ];
    TestCase::new(method.clone(), args, outcome).unwrap()
}

fn render(config: &GeneratorConfig, tests: &TestCollection) -> String {
    let mut formatter = FormatterRegistry::with_builtins().create(config).unwrap();
    let mut out = Vec::new();
    formatter.format_all(tests, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_static_method_full_unit() {
    let add = add();
    let mut tests = TestCollection::new();
    tests.insert(int_case(&add, 2, 3, Outcome::Returned(ConcreteValue::int(5))));

    let expected = "\
import org.junit.jupiter.api.Test;
import static org.junit.jupiter.api.Assertions.*;

public class Testcases {
    // Testing method add
    @Test
    public void test0() {
        int expected = 5;
        int result = Calc.add(2, 3);
        assertEquals(expected, result);
    }

}
";
    assert_eq!(render(&GeneratorConfig::default(), &tests), expected);
}

#[test]
fn test_package_and_class_name() {
    let add = add();
    let mut tests = TestCollection::new();
    tests.insert(int_case(&add, 1, 1, Outcome::Returned(ConcreteValue::int(2))));

    let config = GeneratorConfig {
        package: Some("demo.generated".to_string()),
        class_name: "CalcTest".to_string(),
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);
    assert!(output.starts_with("package demo.generated;\n\nimport org.junit.jupiter.api.Test;\n"));
    assert!(output.contains("public class CalcTest {\n"));
}

#[test]
fn test_void_instance_method() {
    let reset = MethodSignature::builder(ClassInfo::new("Counter", true), "reset")
        .instance()
        .build()
        .unwrap();
    let mut tests = TestCollection::new();
    tests.insert(TestCase::new(reset, Vec::new(), Outcome::Void).unwrap());

    let output = render(&GeneratorConfig::default(), &tests);
    assert!(output.contains(
        "    public void test0() {\n        Counter instance = new Counter();\n        instance.reset();\n    }\n"
    ));
    assert!(!output.contains("expected"));
    assert!(!output.contains("assert"));
}

#[test]
fn test_array_argument_declared_before_call() {
    let sum = MethodSignature::builder(ClassInfo::new("Stats", true), "sum")
        .param("values", TypeDescriptor::array_of(PrimitiveType::Int))
        .returns(PrimitiveType::Int)
        .build()
        .unwrap();
    let values = sum.argument("values").unwrap().clone();
    let mut tests = TestCollection::new();
    tests.insert(
        TestCase::new(
            sum,
            vec![(values, ConcreteValue::int_array(PrimitiveType::Int, &[5, 7, 9]))],
            Outcome::Returned(ConcreteValue::int(21)),
        )
        .unwrap(),
    );

    let config = GeneratorConfig {
        formatter: "junit4".to_string(),
        message: MessageLevel::Short,
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);
    assert!(output.contains("import org.junit.Test;\nimport static org.junit.Assert.*;\n"));
    assert!(output.contains(
        "        int[] values = {5, 7, 9};\n        int expected = 21;\n        int result = Stats.sum(values);\n"
    ));
    assert!(output.contains("assertEquals(\"Test for method sum failed.\", expected, result);"));
}

#[test]
fn test_array_return_uses_array_assertion() {
    let copy = MethodSignature::builder(ClassInfo::new("Arrays2", true), "twice")
        .param("x", PrimitiveType::Long)
        .returns(TypeDescriptor::array_of(PrimitiveType::Long))
        .build()
        .unwrap();
    let x = copy.argument("x").unwrap().clone();
    let mut tests = TestCollection::new();
    tests.insert(
        TestCase::new(
            copy,
            vec![(x, ConcreteValue::int(4))],
            Outcome::Returned(ConcreteValue::int_array(PrimitiveType::Long, &[4, 4])),
        )
        .unwrap(),
    );

    let output = render(&GeneratorConfig::default(), &tests);
    assert!(output.contains("long[] expected = {4L, 4L};"));
    assert!(output.contains("long[] result = Arrays2.twice(4L);"));
    assert!(output.contains("assertArrayEquals(expected, result);"));
}

#[test]
fn test_exception_outcome_with_full_message() {
    let div = div();
    let mut tests = TestCollection::new();
    tests.insert(int_case(
        &div,
        1,
        0,
        Outcome::Threw(ExceptionInfo::new("java.lang.ArithmeticException")),
    ));

    let config = GeneratorConfig {
        message: MessageLevel::Full,
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);

    // A throwing test never declares the checked exceptions of the method
    assert!(output.contains("    public void test0() {\n"));
    assert!(output.contains(
        "        assertThrows(java.lang.ArithmeticException.class, () -> {\n            Calc.div(1, 0);\n        }, \"Test for method div failed.\\nInput:\\na:\\t1\\nb:\\t0\");\n"
    ));
}

#[test]
fn test_junit4_exception_message_first() {
    let div = div();
    let mut tests = TestCollection::new();
    tests.insert(int_case(
        &div,
        1,
        0,
        Outcome::Threw(ExceptionInfo::new("java.lang.ArithmeticException")),
    ));

    let config = GeneratorConfig {
        formatter: "junit4".to_string(),
        message: MessageLevel::Short,
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);
    assert!(output.contains(
        "assertThrows(\"Test for method div failed.\", java.lang.ArithmeticException.class, () -> {\n"
    ));
    assert!(output.contains("        });\n"));
}

#[test]
fn test_declared_exceptions_on_returning_test() {
    let div = div();
    let mut tests = TestCollection::new();
    tests.insert(int_case(&div, 6, 3, Outcome::Returned(ConcreteValue::int(2))));

    let output = render(&GeneratorConfig::default(), &tests);
    assert!(output.contains("public void test0() throws java.io.IOException {"));
}

#[test]
fn test_junit4_real_delta() {
    let half = MethodSignature::builder(ClassInfo::new("Calc", true), "half")
        .param("x", PrimitiveType::Double)
        .returns(PrimitiveType::Double)
        .build()
        .unwrap();
    let x = half.argument("x").unwrap().clone();
    let mut tests = TestCollection::new();
    tests.insert(
        TestCase::new(
            half,
            vec![(x, ConcreteValue::real(3.0))],
            Outcome::Returned(ConcreteValue::real(1.5)),
        )
        .unwrap(),
    );

    let config = GeneratorConfig {
        formatter: "junit4".to_string(),
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);
    assert!(output.contains("double result = Calc.half(3.0);"));
    assert!(output.contains("assertEquals(expected, result, 0.0);"));
}

#[test]
fn test_junit4_float_array_delta_is_float() {
    let halve = MethodSignature::builder(ClassInfo::new("F", true), "halve")
        .param("x", PrimitiveType::Float)
        .returns(TypeDescriptor::array_of(PrimitiveType::Float))
        .build()
        .unwrap();
    let x = halve.argument("x").unwrap().clone();
    let mut tests = TestCollection::new();
    tests.insert(
        TestCase::new(
            halve,
            vec![(x, ConcreteValue::real(1.0))],
            Outcome::Returned(ConcreteArray::new(PrimitiveType::Float, vec![Scalar::Real(0.5)]).into()),
        )
        .unwrap(),
    );

    let config = GeneratorConfig {
        formatter: "junit4".to_string(),
        ..GeneratorConfig::default()
    };
    let output = render(&config, &tests);
    assert!(output.contains("float[] expected = {0.5f};"));
    assert!(output.contains("float[] result = F.halve(1.0f);"));
    assert!(output.contains("assertArrayEquals(expected, result, 0.0f);"));
    assert!(!output.contains("result, 0.0)"));
}

#[test]
fn test_unconstructible_receiver_is_dropped() {
    let withdraw = MethodSignature::builder(ClassInfo::new("Account", false), "withdraw")
        .instance()
        .param("amount", PrimitiveType::Long)
        .build()
        .unwrap();
    let amount = withdraw.argument("amount").unwrap().clone();

    let add = add();
    let mut tests = TestCollection::new();
    tests.insert(TestCase::new(withdraw, vec![(amount, ConcreteValue::int(10))], Outcome::Void).unwrap());
    tests.insert(int_case(&add, 2, 3, Outcome::Returned(ConcreteValue::int(5))));

    let output = render(&GeneratorConfig::default(), &tests);
    assert!(!output.contains("withdraw"));
    assert!(output.contains("// Testing method add"));
    assert!(output.contains("public void test0()"));
}

#[test]
fn test_numbering_restarts_per_unit() {
    let add = add();
    let mut tests = TestCollection::new();
    tests.insert(int_case(&add, 0, 0, Outcome::Returned(ConcreteValue::int(0))));
    tests.insert(int_case(&add, 1, 2, Outcome::Returned(ConcreteValue::int(3))));

    let mut formatter = JavaFormatter::new(&GeneratorConfig::default(), Dialect::JUnit5);
    let mut first = Vec::new();
    formatter.format_all(&tests, &mut first).unwrap();
    let mut second = Vec::new();
    formatter.format_all(&tests, &mut second).unwrap();

    let first = String::from_utf8(first).unwrap();
    assert!(first.contains("test0()") && first.contains("test1()"));
    assert!(!first.contains("test2()"));
    assert_eq!(first, String::from_utf8(second).unwrap());
}

#[test]
fn test_single_test_rendering() {
    let add = add();
    let mut formatter = JavaFormatter::new(&GeneratorConfig::default(), Dialect::JUnit5);
    let text = formatter
        .format_test(&int_case(&add, 2, 3, Outcome::Returned(ConcreteValue::int(5))))
        .unwrap();
    assert!(text.starts_with("// Testing method add\n@Test\npublic void test0() {\n"));
    assert!(text.ends_with("}\n"));
}

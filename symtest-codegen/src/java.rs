//! JUnit test source generation
//!
//! Each test case becomes one `@Test` method. Scalar arguments are inlined as
//! literals narrowed to the declared width; array arguments are declared as
//! locals right before the call because array initializers cannot appear in
//! an argument position.

use std::borrow::Cow;
use std::io;

use symtest_core::{
    ConcreteArray, ConcreteValue, ExceptionInfo, GeneratorConfig, MessageLevel, Outcome,
    PrimitiveType, Scalar, SynthesisError, SynthesisResult, TestCase, TestCollection,
    TypeDescriptor,
};

use crate::formatter::{renderable_groups, TestFormatter};
use crate::writer::IndentWriter;

/// Local holding the receiver of an instance method
const RECEIVER: &str = "instance";
const EXPECTED: &str = "expected";
const RESULT: &str = "result";

/// Target JUnit generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JUnit5,
    /// JUnit 4.13, message-first assertions and explicit deltas for reals
    JUnit4,
}

impl Dialect {
    fn name(self) -> &'static str {
        match self {
            Self::JUnit5 => "junit5",
            Self::JUnit4 => "junit4",
        }
    }

    fn imports(self) -> [&'static str; 2] {
        match self {
            Self::JUnit5 => [
                "import org.junit.jupiter.api.Test;",
                "import static org.junit.jupiter.api.Assertions.*;",
            ],
            Self::JUnit4 => ["import org.junit.Test;", "import static org.junit.Assert.*;"],
        }
    }

    fn message_first(self) -> bool {
        matches!(self, Self::JUnit4)
    }

    fn needs_delta(self) -> bool {
        matches!(self, Self::JUnit4)
    }
}

/// Formatter producing a JUnit test class
pub struct JavaFormatter {
    dialect: Dialect,
    package: Option<String>,
    class_name: String,
    message: MessageLevel,
    counter: usize,
}

impl JavaFormatter {
    pub fn new(config: &GeneratorConfig, dialect: Dialect) -> Self {
        Self {
            dialect,
            package: config.package.clone(),
            class_name: config.class_name.clone(),
            message: config.message,
            counter: 0,
        }
    }

    fn write_test_method(&mut self, w: &mut IndentWriter, test: &TestCase) -> SynthesisResult<()> {
        let method = &test.method;

        w.line(format!("// Testing method {}", method.name));
        w.line("@Test");
        w.start_line().push(format!("public void test{}()", self.counter));
        self.counter += 1;

        if !test.did_throw() && !method.thrown.is_empty() {
            let thrown: Vec<String> = method.thrown.iter().map(|t| source_class_name(t)).collect();
            w.push(format!(" throws {}", thrown.join(", ")));
        }
        w.push(" {").end_line();
        w.indent();

        self.write_array_locals(w, test)?;
        if !method.is_static {
            let class = source_class_name(&method.declaring_class.name);
            w.line(format!("{} {} = new {}();", class, RECEIVER, class));
        }

        match &test.outcome {
            Outcome::Threw(exception) => self.write_throws(w, test, exception)?,
            Outcome::Returned(value) => self.write_returned(w, test, value)?,
            Outcome::Void => {
                // A void call can only fail by throwing
                w.line(format!("{};", self.call_expression(test)?));
            }
        }

        w.dedent()?;
        w.line("}");
        Ok(())
    }

    /// Array arguments become initialized locals named after the parameter
    fn write_array_locals(&self, w: &mut IndentWriter, test: &TestCase) -> SynthesisResult<()> {
        for arg in test.args() {
            if arg.binding.ty.is_array() {
                w.line(format!(
                    "{} {} = {};",
                    arg.binding.ty.source_name(),
                    local_name(&arg.binding.name),
                    literal(&arg.binding.ty, &arg.value)?
                ));
            }
        }
        Ok(())
    }

    fn write_returned(&self, w: &mut IndentWriter, test: &TestCase, value: &ConcreteValue) -> SynthesisResult<()> {
        let return_type = &test.method.return_type;
        let type_name = return_type.source_name();

        w.line(format!("{} {} = {};", type_name, EXPECTED, literal(return_type, value)?));
        w.line(format!("{} {} = {};", type_name, RESULT, self.call_expression(test)?));

        let assertion = if return_type.is_array() {
            "assertArrayEquals"
        } else {
            "assertEquals"
        };
        let mut args = vec![EXPECTED.to_string(), RESULT.to_string()];
        if self.dialect.needs_delta() {
            if let Some(delta) = real_delta(return_type) {
                args.push(delta.to_string());
            }
        }
        w.line(format!("{};", self.assertion(assertion, args, test)?));
        Ok(())
    }

    fn write_throws(&self, w: &mut IndentWriter, test: &TestCase, exception: &ExceptionInfo) -> SynthesisResult<()> {
        let class = format!("{}.class", source_class_name(&exception.type_name));
        let message = self.assert_message(test)?;

        w.start_line().push("assertThrows(");
        if let (true, Some(message)) = (self.dialect.message_first(), &message) {
            w.push(format!("{}, ", message));
        }
        w.push(format!("{}, () -> {{", class)).end_line();

        w.indent();
        w.line(format!("{};", self.call_expression(test)?));
        w.dedent()?;

        w.start_line().push("}");
        if let (false, Some(message)) = (self.dialect.message_first(), &message) {
            w.push(format!(", {}", message));
        }
        w.push(");").end_line();
        Ok(())
    }

    /// `Class.m(args)` for static methods, `instance.m(args)` otherwise
    fn call_expression(&self, test: &TestCase) -> SynthesisResult<String> {
        let method = &test.method;
        let target = if method.is_static {
            source_class_name(&method.declaring_class.name)
        } else {
            RECEIVER.to_string()
        };

        let mut args = Vec::with_capacity(method.argument_count());
        for binding in method.arguments() {
            let value = test.value_of(binding).ok_or_else(|| {
                SynthesisError::contract(format!("no value for '{}' in {}", binding.name, method.base_name()))
            })?;
            if binding.ty.is_array() {
                args.push(local_name(&binding.name).into_owned());
            } else {
                args.push(literal(&binding.ty, value)?);
            }
        }

        Ok(format!("{}.{}({})", target, method.name, args.join(", ")))
    }

    fn assertion(&self, name: &str, mut args: Vec<String>, test: &TestCase) -> SynthesisResult<String> {
        if let Some(message) = self.assert_message(test)? {
            if self.dialect.message_first() {
                args.insert(0, message);
            } else {
                args.push(message);
            }
        }
        Ok(format!("{}({})", name, args.join(", ")))
    }

    /// Quoted failure message, or `None` when messages are off
    fn assert_message(&self, test: &TestCase) -> SynthesisResult<Option<String>> {
        if self.message == MessageLevel::None {
            return Ok(None);
        }

        let mut text = format!("Test for method {} failed.", test.method.name);
        if self.message == MessageLevel::Full {
            text.push_str("\\nInput:");
            for arg in test.args() {
                let value = escape_java_string(&literal(&arg.binding.ty, &arg.value)?);
                text.push_str(&format!("\\n{}:\\t{}", arg.binding.name, value));
            }
        }
        Ok(Some(format!("\"{}\"", text)))
    }

    fn write_header(&self, w: &mut IndentWriter) {
        if let Some(package) = &self.package {
            w.line(format!("package {};", package));
            w.blank();
        }
        for import in self.dialect.imports() {
            w.line(import);
        }
        w.blank();
    }
}

impl TestFormatter for JavaFormatter {
    fn name(&self) -> &str {
        self.dialect.name()
    }

    fn format_test(&mut self, test: &TestCase) -> SynthesisResult<String> {
        let mut w = IndentWriter::new();
        self.write_test_method(&mut w, test)?;
        w.finish()
    }

    fn format_all(&mut self, tests: &TestCollection, out: &mut dyn io::Write) -> SynthesisResult<()> {
        self.reset_counter();
        let mut w = IndentWriter::new();

        self.write_header(&mut w);
        w.line(format!("public class {} {{", self.class_name));
        w.indent();

        for group in renderable_groups(tests) {
            for test in group.tests() {
                self.write_test_method(&mut w, test)?;
                w.blank();
            }
        }

        w.dedent()?;
        w.line("}");

        out.write_all(w.finish()?.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn reset_counter(&mut self) {
        self.counter = 0;
    }
}

/// Java literal for `value` at the declared type
pub fn literal(ty: &TypeDescriptor, value: &ConcreteValue) -> SynthesisResult<String> {
    match (ty, value) {
        (TypeDescriptor::Primitive(p), ConcreteValue::Scalar(s)) => scalar_literal(*p, *s),
        (TypeDescriptor::Array(_), ConcreteValue::Array(array)) => {
            let element = ty.basic_array_element().ok_or_else(|| {
                SynthesisError::contract(format!("cannot render a literal of type {}", ty))
            })?;
            array_initializer(element, array)
        }
        _ => Err(SynthesisError::contract(format!(
            "value {} does not fit declared type {}",
            value, ty
        ))),
    }
}

/// `{1, 2, 3}` with every element narrowed to `element`
pub fn array_initializer(element: PrimitiveType, array: &ConcreteArray) -> SynthesisResult<String> {
    let elements = array
        .elements
        .iter()
        .map(|s| scalar_literal(element, *s))
        .collect::<SynthesisResult<Vec<_>>>()?;
    Ok(format!("{{{}}}", elements.join(", ")))
}

/// Primitive literal narrowed to the declared width
pub fn scalar_literal(ty: PrimitiveType, value: Scalar) -> SynthesisResult<String> {
    let value = value.coerce_to(ty).ok_or_else(|| {
        SynthesisError::contract(format!("value {} cannot be rendered as {}", value, ty.keyword()))
    })?;

    Ok(match (ty, value) {
        (PrimitiveType::Byte, Scalar::Integer(n)) => format!("(byte) {}", n as i8),
        (PrimitiveType::Short, Scalar::Integer(n)) => format!("(short) {}", n as i16),
        (PrimitiveType::Char, Scalar::Integer(n)) => char_literal(n as u16),
        (PrimitiveType::Int, Scalar::Integer(n)) => format!("{}", n as i32),
        (PrimitiveType::Long, Scalar::Integer(n)) => format!("{}L", n),
        (PrimitiveType::Float, Scalar::Real(x)) => float_literal(x as f32),
        (PrimitiveType::Double, Scalar::Real(x)) => double_literal(x),
        (PrimitiveType::Boolean, Scalar::Boolean(b)) => b.to_string(),
        (ty, value) => {
            return Err(SynthesisError::contract(format!(
                "value {} cannot be rendered as {}",
                value,
                ty.keyword()
            )))
        }
    })
}

fn char_literal(code: u16) -> String {
    match code {
        0x27 => "'\\''".to_string(),
        0x5c => "'\\\\'".to_string(),
        0x20..=0x7e => format!("'{}'", code as u8 as char),
        _ => format!("(char) {}", code),
    }
}

fn float_literal(x: f32) -> String {
    if x.is_nan() {
        "Float.NaN".to_string()
    } else if x.is_infinite() {
        let name = if x > 0.0 { "Float.POSITIVE_INFINITY" } else { "Float.NEGATIVE_INFINITY" };
        name.to_string()
    } else {
        format!("{:?}f", x)
    }
}

fn double_literal(x: f64) -> String {
    if x.is_nan() {
        "Double.NaN".to_string()
    } else if x.is_infinite() {
        let name = if x > 0.0 { "Double.POSITIVE_INFINITY" } else { "Double.NEGATIVE_INFINITY" };
        name.to_string()
    } else {
        format!("{:?}", x)
    }
}

/// Zero delta for real-valued assertions, typed to match the JUnit 4 overload.
/// `assertArrayEquals(float[], float[], float)` does not accept a double delta.
fn real_delta(ty: &TypeDescriptor) -> Option<&'static str> {
    match ty.as_primitive().or_else(|| ty.basic_array_element()) {
        Some(PrimitiveType::Float) => Some("0.0f"),
        Some(PrimitiveType::Double) => Some("0.0"),
        _ => None,
    }
}

/// Nested classes are reported as `Outer$Inner` but written `Outer.Inner`
fn source_class_name(name: &str) -> String {
    name.replace('$', ".")
}

/// Parameter names that would clash with the locals we introduce get a suffix
fn local_name(name: &str) -> Cow<'_, str> {
    if [RECEIVER, EXPECTED, RESULT].contains(&name) {
        Cow::Owned(format!("{}Arg", name))
    } else {
        Cow::Borrowed(name)
    }
}

fn escape_java_string(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literals_are_narrowed() {
        assert_eq!(scalar_literal(PrimitiveType::Byte, Scalar::Integer(300)).unwrap(), "(byte) 44");
        assert_eq!(scalar_literal(PrimitiveType::Short, Scalar::Integer(-2)).unwrap(), "(short) -2");
        assert_eq!(scalar_literal(PrimitiveType::Int, Scalar::Integer(7)).unwrap(), "7");
        assert_eq!(scalar_literal(PrimitiveType::Long, Scalar::Integer(7)).unwrap(), "7L");
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(scalar_literal(PrimitiveType::Char, Scalar::Integer(97)).unwrap(), "'a'");
        assert_eq!(scalar_literal(PrimitiveType::Char, Scalar::Integer(39)).unwrap(), "'\\''");
        assert_eq!(scalar_literal(PrimitiveType::Char, Scalar::Integer(92)).unwrap(), "'\\\\'");
        assert_eq!(scalar_literal(PrimitiveType::Char, Scalar::Integer(10)).unwrap(), "(char) 10");
    }

    #[test]
    fn test_real_literals() {
        assert_eq!(scalar_literal(PrimitiveType::Double, Scalar::Real(2.0)).unwrap(), "2.0");
        assert_eq!(scalar_literal(PrimitiveType::Float, Scalar::Real(1.5)).unwrap(), "1.5f");
        assert_eq!(scalar_literal(PrimitiveType::Double, Scalar::Real(f64::NAN)).unwrap(), "Double.NaN");
        assert_eq!(
            scalar_literal(PrimitiveType::Float, Scalar::Real(f64::NEG_INFINITY)).unwrap(),
            "Float.NEGATIVE_INFINITY"
        );
        assert_eq!(scalar_literal(PrimitiveType::Double, Scalar::Integer(3)).unwrap(), "3.0");
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(scalar_literal(PrimitiveType::Boolean, Scalar::Boolean(true)).unwrap(), "true");
        assert_eq!(scalar_literal(PrimitiveType::Boolean, Scalar::Integer(0)).unwrap(), "false");
        assert!(scalar_literal(PrimitiveType::Int, Scalar::Boolean(true)).is_err());
    }

    #[test]
    fn test_array_literal() {
        let ty = TypeDescriptor::array_of(PrimitiveType::Int);
        let value = ConcreteValue::int_array(PrimitiveType::Int, &[5, 7, 9]);
        assert_eq!(literal(&ty, &value).unwrap(), "{5, 7, 9}");

        let empty = ConcreteValue::int_array(PrimitiveType::Long, &[]);
        assert_eq!(literal(&TypeDescriptor::array_of(PrimitiveType::Long), &empty).unwrap(), "{}");

        assert!(literal(&TypeDescriptor::Primitive(PrimitiveType::Int), &value).is_err());
    }

    #[test]
    fn test_real_delta_matches_element_width() {
        assert_eq!(real_delta(&TypeDescriptor::array_of(PrimitiveType::Float)), Some("0.0f"));
        assert_eq!(real_delta(&PrimitiveType::Float.into()), Some("0.0f"));
        assert_eq!(real_delta(&TypeDescriptor::array_of(PrimitiveType::Double)), Some("0.0"));
        assert_eq!(real_delta(&PrimitiveType::Long.into()), None);
    }

    #[test]
    fn test_local_names_avoid_generated_locals() {
        assert_eq!(local_name("values"), "values");
        assert_eq!(local_name("expected"), "expectedArg");
        assert_eq!(local_name("instance"), "instanceArg");
    }
}

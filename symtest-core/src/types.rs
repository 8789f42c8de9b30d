//! Type descriptors for method signatures
//!
//! Types are described the way the JVM does it. Only primitives and
//! one-dimensional arrays of primitives can be synthesized; everything else
//! is carried through so that admissibility checks can reject it by name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{SynthesisError, SynthesisResult};

/// Primitive ("basic") types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
}

/// Resolution family shared by several primitive widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueFamily {
    /// byte, char, short, int, long
    Integer,
    /// float, double
    Real,
    Boolean,
}

impl PrimitiveType {
    /// The resolution family of this type
    pub fn family(self) -> ValueFamily {
        match self {
            Self::Byte | Self::Char | Self::Short | Self::Int | Self::Long => ValueFamily::Integer,
            Self::Float | Self::Double => ValueFamily::Real,
            Self::Boolean => ValueFamily::Boolean,
        }
    }

    /// Java source keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
        }
    }

    /// Single-character descriptor code
    pub fn code(self) -> char {
        match self {
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
            Self::Boolean => 'Z',
        }
    }

    fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => Self::Byte,
            'C' => Self::Char,
            'S' => Self::Short,
            'I' => Self::Int,
            'J' => Self::Long,
            'F' => Self::Float,
            'D' => Self::Double,
            'Z' => Self::Boolean,
            _ => return None,
        })
    }
}

/// A declared type in a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeDescriptor {
    Void,
    Primitive(PrimitiveType),
    Array(Box<TypeDescriptor>),
    /// Any class or interface type, by fully qualified name
    Reference(String),
}

impl TypeDescriptor {
    /// Array of the given primitive
    pub fn array_of(element: PrimitiveType) -> Self {
        Self::Array(Box::new(Self::Primitive(element)))
    }

    /// Parse a JVM field descriptor such as `I`, `[J` or `Ljava/lang/String;`
    pub fn from_signature(signature: &str) -> SynthesisResult<Self> {
        let (ty, rest) = Self::parse_prefix(signature)?;
        if !rest.is_empty() {
            return Err(SynthesisError::InvalidSignature(signature.to_string()));
        }
        Ok(ty)
    }

    /// Parse one descriptor off the front of `input`, returning the remainder
    pub(crate) fn parse_prefix(input: &str) -> SynthesisResult<(Self, &str)> {
        let invalid = || SynthesisError::InvalidSignature(input.to_string());
        let mut chars = input.chars();
        let first = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();

        match first {
            'V' => Ok((Self::Void, rest)),
            '[' => {
                let (element, rest) = Self::parse_prefix(rest)?;
                if element == Self::Void {
                    return Err(invalid());
                }
                Ok((Self::Array(Box::new(element)), rest))
            }
            'L' => {
                let end = rest.find(';').ok_or_else(invalid)?;
                let name = &rest[..end];
                if name.is_empty() {
                    return Err(invalid());
                }
                Ok((Self::Reference(name.replace('/', ".")), &rest[end + 1..]))
            }
            code => PrimitiveType::from_code(code)
                .map(|p| (Self::Primitive(p), rest))
                .ok_or_else(invalid),
        }
    }

    /// JVM descriptor form
    pub fn signature(&self) -> String {
        match self {
            Self::Void => "V".to_string(),
            Self::Primitive(p) => p.code().to_string(),
            Self::Array(element) => format!("[{}", element.signature()),
            Self::Reference(name) => format!("L{};", name.replace('.', "/")),
        }
    }

    /// Java source spelling, e.g. `int[]` or `java.lang.String`
    pub fn source_name(&self) -> String {
        match self {
            Self::Void => "void".to_string(),
            Self::Primitive(p) => p.keyword().to_string(),
            Self::Array(element) => format!("{}[]", element.source_name()),
            Self::Reference(name) => name.clone(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Arrays and class types
    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Reference(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Self::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Element type of a one-dimensional primitive array
    pub fn basic_array_element(&self) -> Option<PrimitiveType> {
        match self {
            Self::Array(element) => element.as_primitive(),
            _ => None,
        }
    }

    /// One-dimensional array of primitives
    pub fn is_basic_array(&self) -> bool {
        self.basic_array_element().is_some()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source_name())
    }
}

impl From<PrimitiveType> for TypeDescriptor {
    fn from(p: PrimitiveType) -> Self {
        Self::Primitive(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_primitive_signatures() {
        assert_eq!(TypeDescriptor::from_signature("I").unwrap(), TypeDescriptor::Primitive(PrimitiveType::Int));
        assert_eq!(TypeDescriptor::from_signature("Z").unwrap(), TypeDescriptor::Primitive(PrimitiveType::Boolean));
        assert_eq!(TypeDescriptor::from_signature("V").unwrap(), TypeDescriptor::Void);
    }

    #[test]
    fn test_parse_array_and_reference_signatures() {
        let ints = TypeDescriptor::from_signature("[I").unwrap();
        assert_eq!(ints, TypeDescriptor::array_of(PrimitiveType::Int));
        assert!(ints.is_basic_array());
        assert_eq!(ints.source_name(), "int[]");

        let matrix = TypeDescriptor::from_signature("[[D").unwrap();
        assert!(matrix.is_array());
        assert!(!matrix.is_basic_array());
        assert_eq!(matrix.source_name(), "double[][]");

        let string = TypeDescriptor::from_signature("Ljava/lang/String;").unwrap();
        assert_eq!(string, TypeDescriptor::Reference("java.lang.String".to_string()));
        assert_eq!(string.signature(), "Ljava/lang/String;");
    }

    #[test]
    fn test_invalid_signatures() {
        for bad in ["", "Q", "[", "[V", "Ljava/lang/String", "L;", "II"] {
            assert!(
                matches!(TypeDescriptor::from_signature(bad), Err(SynthesisError::InvalidSignature(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_families() {
        assert_eq!(PrimitiveType::Char.family(), ValueFamily::Integer);
        assert_eq!(PrimitiveType::Long.family(), ValueFamily::Integer);
        assert_eq!(PrimitiveType::Float.family(), ValueFamily::Real);
        assert_eq!(PrimitiveType::Boolean.family(), ValueFamily::Boolean);
    }
}

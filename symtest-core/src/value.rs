//! Concrete values produced by resolution
//!
//! Integer-family values are kept widened to `i64` and real-family values to
//! `f64`; narrowing to the declared width is a rendering concern.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::types::{PrimitiveType, ValueFamily};

/// A resolved primitive value
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

impl Scalar {
    pub fn family(&self) -> ValueFamily {
        match self {
            Self::Integer(_) => ValueFamily::Integer,
            Self::Real(_) => ValueFamily::Real,
            Self::Boolean(_) => ValueFamily::Boolean,
        }
    }

    /// Adapt a value to the family of `ty`.
    ///
    /// Booleans travel through the VM as integers, so `1` becomes `true`;
    /// integers are widened for real-typed slots. Returns `None` when the
    /// value cannot represent the type.
    pub fn coerce_to(self, ty: PrimitiveType) -> Option<Scalar> {
        match (ty.family(), self) {
            (ValueFamily::Integer, Self::Integer(_))
            | (ValueFamily::Real, Self::Real(_))
            | (ValueFamily::Boolean, Self::Boolean(_)) => Some(self),
            (ValueFamily::Boolean, Self::Integer(n)) => Some(Self::Boolean(n == 1)),
            (ValueFamily::Real, Self::Integer(n)) => Some(Self::Real(n as f64)),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

// Reals compare by bit pattern so that NaN results dedup like any other value.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Integer(n) => n.hash(state),
            Self::Real(x) => x.to_bits().hash(state),
            Self::Boolean(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{}", n),
            Self::Real(x) => write!(f, "{:?}", x),
            Self::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// A resolved one-dimensional primitive array
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConcreteArray {
    pub element: PrimitiveType,
    pub elements: Vec<Scalar>,
}

impl ConcreteArray {
    pub fn new(element: PrimitiveType, elements: Vec<Scalar>) -> Self {
        Self { element, elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// A fully concrete argument or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ConcreteValue {
    Scalar(Scalar),
    Array(ConcreteArray),
}

impl ConcreteValue {
    pub fn int(n: i64) -> Self {
        Self::Scalar(Scalar::Integer(n))
    }

    pub fn real(x: f64) -> Self {
        Self::Scalar(Scalar::Real(x))
    }

    pub fn boolean(b: bool) -> Self {
        Self::Scalar(Scalar::Boolean(b))
    }

    pub fn int_array(element: PrimitiveType, values: &[i64]) -> Self {
        Self::Array(ConcreteArray::new(
            element,
            values.iter().map(|n| Scalar::Integer(*n)).collect(),
        ))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ConcreteArray> {
        match self {
            Self::Array(a) => Some(a),
            Self::Scalar(_) => None,
        }
    }
}

impl From<Scalar> for ConcreteValue {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<ConcreteArray> for ConcreteValue {
    fn from(a: ConcreteArray) -> Self {
        Self::Array(a)
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::Array(a) => {
                f.write_str("[")?;
                for (i, element) in a.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                f.write_str("]")
            }
        }
    }
}

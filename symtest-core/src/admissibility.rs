//! Which methods can be turned into tests at all
//!
//! Signatures are checked at capture time so unsupported methods are never
//! snapshotted. The receiver check runs at render time, once per method.

use crate::errors::{SynthesisError, SynthesisResult};
use crate::method::MethodSignature;
use crate::types::TypeDescriptor;

/// Every non-receiver parameter and the return type must be a primitive or
/// a one-dimensional array of primitives (or void, for the return type).
pub fn check_signature(method: &MethodSignature) -> SynthesisResult<()> {
    for param in method.arguments() {
        if let Some(reason) = unsupported(&param.ty) {
            return Err(SynthesisError::UnsupportedSignature {
                method: method.base_name(),
                reason: format!("parameter '{}' {}", param.name, reason),
            });
        }
    }

    if let Some(reason) = unsupported(&method.return_type) {
        return Err(SynthesisError::UnsupportedSignature {
            method: method.base_name(),
            reason: format!("return type {}", reason),
        });
    }

    Ok(())
}

/// Instance methods need a receiver built with a zero-argument constructor
pub fn check_receiver(method: &MethodSignature) -> SynthesisResult<()> {
    if method.is_static || method.declaring_class.has_default_constructor {
        return Ok(());
    }
    Err(SynthesisError::NoDefaultConstructor {
        method: method.base_name(),
        class: method.declaring_class.name.clone(),
    })
}

fn unsupported(ty: &TypeDescriptor) -> Option<String> {
    match ty {
        TypeDescriptor::Void | TypeDescriptor::Primitive(_) => None,
        TypeDescriptor::Array(_) if ty.is_basic_array() => None,
        TypeDescriptor::Array(_) => Some(format!(
            "has type {}, only one-dimensional arrays of primitives are supported",
            ty
        )),
        TypeDescriptor::Reference(name) => Some(format!(
            "has reference type {}, reference types other than arrays are not supported",
            name
        )),
    }
}

//! Method identity and formal parameter bindings

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{SynthesisError, SynthesisResult};
use crate::types::TypeDescriptor;

/// One formal parameter of a method.
///
/// Created once per signature and shared by reference between every snapshot
/// and test case of that method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableBinding {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Position in the local variable table, the receiver is ordinal 0
    pub ordinal: usize,
    pub is_receiver: bool,
}

/// The class declaring a method under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully qualified name
    pub name: String,
    /// Whether a zero-argument constructor is available
    pub has_default_constructor: bool,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>, has_default_constructor: bool) -> Self {
        Self {
            name: name.into(),
            has_default_constructor,
        }
    }

    /// Unqualified name, used for local variable declarations
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Identity of an invoked routine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    pub declaring_class: ClassInfo,
    pub name: String,
    pub is_static: bool,
    /// All formal parameters including the receiver for instance methods
    pub params: Vec<Arc<VariableBinding>>,
    pub return_type: TypeDescriptor,
    /// Declared thrown exception class names
    pub thrown: Vec<String>,
}

impl MethodSignature {
    /// Start building a signature
    pub fn builder(class: ClassInfo, name: impl Into<String>) -> MethodSignatureBuilder {
        MethodSignatureBuilder {
            class,
            name: name.into(),
            is_static: true,
            params: Vec::new(),
            return_type: TypeDescriptor::Void,
            thrown: Vec::new(),
        }
    }

    /// Non-receiver parameters in declaration order
    pub fn arguments(&self) -> impl Iterator<Item = &Arc<VariableBinding>> {
        self.params.iter().filter(|p| !p.is_receiver)
    }

    /// Number of non-receiver parameters
    pub fn argument_count(&self) -> usize {
        self.arguments().count()
    }

    /// Look up a non-receiver parameter by name
    pub fn argument(&self, name: &str) -> Option<&Arc<VariableBinding>> {
        self.arguments().find(|p| p.name == name)
    }

    /// `Class.method`
    pub fn base_name(&self) -> String {
        format!("{}.{}", self.declaring_class.name, self.name)
    }

    /// Descriptor such as `(I[I)V`
    pub fn descriptor(&self) -> String {
        let args: String = self.arguments().map(|p| p.ty.signature()).collect();
        format!("({}){}", args, self.return_type.signature())
    }

    /// `Class.method(I[I)V`, unique per overload
    pub fn full_name(&self) -> String {
        format!("{}{}", self.base_name(), self.descriptor())
    }

    pub fn class_name(&self) -> &str {
        &self.declaring_class.name
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Builder for [`MethodSignature`]
pub struct MethodSignatureBuilder {
    class: ClassInfo,
    name: String,
    is_static: bool,
    params: Vec<(String, TypeDescriptor)>,
    return_type: TypeDescriptor,
    thrown: Vec<String>,
}

impl MethodSignatureBuilder {
    /// Mark as an instance method; a `this` receiver binding is added
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: impl Into<TypeDescriptor>) -> Self {
        self.params.push((name.into(), ty.into()));
        self
    }

    /// Add a parameter from its JVM descriptor
    pub fn param_signature(self, name: impl Into<String>, signature: &str) -> SynthesisResult<Self> {
        let ty = TypeDescriptor::from_signature(signature)?;
        Ok(self.param(name, ty))
    }

    pub fn returns(mut self, ty: impl Into<TypeDescriptor>) -> Self {
        self.return_type = ty.into();
        self
    }

    pub fn throws(mut self, exception: impl Into<String>) -> Self {
        self.thrown.push(exception.into());
        self
    }

    pub fn build(self) -> SynthesisResult<Arc<MethodSignature>> {
        let mut params = Vec::with_capacity(self.params.len() + 1);

        if !self.is_static {
            params.push(Arc::new(VariableBinding {
                name: "this".to_string(),
                ty: TypeDescriptor::Reference(self.class.name.clone()),
                ordinal: 0,
                is_receiver: true,
            }));
        }

        for (name, ty) in self.params {
            if ty.is_void() {
                return Err(SynthesisError::InvalidSignature(format!(
                    "parameter '{}' of {}.{} is void",
                    name, self.class.name, self.name
                )));
            }
            if params.iter().any(|p: &Arc<VariableBinding>| p.name == name) {
                return Err(SynthesisError::InvalidSignature(format!(
                    "duplicate parameter '{}' in {}.{}",
                    name, self.class.name, self.name
                )));
            }
            let ordinal = params.len();
            params.push(Arc::new(VariableBinding {
                name,
                ty,
                ordinal,
                is_receiver: false,
            }));
        }

        Ok(Arc::new(MethodSignature {
            declaring_class: self.class,
            name: self.name,
            is_static: self.is_static,
            params,
            return_type: self.return_type,
            thrown: self.thrown,
        }))
    }
}

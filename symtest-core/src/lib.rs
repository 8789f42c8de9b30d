//! Symtest core data model
//!
//! Types shared by the synthesis engine and the code generators: method
//! identities, resolved values, test cases and their grouped collection.

pub mod admissibility;
pub mod collection;
pub mod config;
pub mod errors;
pub mod method;
pub mod test_case;
pub mod types;
pub mod value;

pub use collection::{MethodGroup, TestCollection};
pub use config::{GeneratorConfig, MessageLevel};
pub use errors::{SynthesisError, SynthesisResult};
pub use method::{ClassInfo, MethodSignature, MethodSignatureBuilder, VariableBinding};
pub use test_case::{ExceptionInfo, Outcome, ResolvedArgument, TestCase};
pub use types::{PrimitiveType, TypeDescriptor, ValueFamily};
pub use value::{ConcreteArray, ConcreteValue, Scalar};

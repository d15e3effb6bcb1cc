use crate::catalog::TypeKey;
use serde::Serialize;
use std::fmt;

/// Identifies a resolution request: the type declaring an output and the
/// method that produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetadata {
    declaring_type: TypeKey,
    method: String,
    output_name: String,
    parameters: Vec<(String, TypeKey)>,
}

impl FunctionMetadata {
    pub fn new<T: ?Sized + 'static>(method: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self::for_type(TypeKey::of::<T>(), method, output_name)
    }

    pub fn for_type(declaring_type: TypeKey, method: impl Into<String>, output_name: impl Into<String>) -> Self {
        Self {
            declaring_type,
            method: method.into(),
            output_name: output_name.into(),
            parameters: Vec::new(),
        }
    }

    /// Declares a parameter of the output method.
    pub fn with_parameter<P: ?Sized + 'static>(mut self, name: impl Into<String>) -> Self {
        self.parameters.push((name.into(), TypeKey::of::<P>()));
        self
    }

    pub fn declaring_type(&self) -> TypeKey { self.declaring_type }
    pub fn method(&self) -> &str { &self.method }
    pub fn output_name(&self) -> &str { &self.output_name }
    pub fn parameters(&self) -> &[(String, TypeKey)] { &self.parameters }

    /// Example: `Fn.foo(d: i32)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|(name, ty)| format!("{}: {}", name, ty))
            .collect();
        format!("{}.{}({})", self.declaring_type, self.method, params.join(", "))
    }
}

impl fmt::Display for FunctionMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output '{}' from {}", self.output_name, self.signature())
    }
}

/// Serializable view used in reports.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataSummary {
    pub declaring_type: String,
    pub method: String,
    pub output_name: String,
    pub parameters: Vec<(String, String)>,
}

impl From<&FunctionMetadata> for MetadataSummary {
    fn from(meta: &FunctionMetadata) -> Self {
        Self {
            declaring_type: meta.declaring_type.short_name(),
            method: meta.method.clone(),
            output_name: meta.output_name.clone(),
            parameters: meta.parameters.iter().map(|(n, t)| (n.clone(), t.short_name())).collect(),
        }
    }
}

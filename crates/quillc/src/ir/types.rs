use super::{ExprId, GenContext, TypeId};
use crate::diagnostics::{unimplemented, InternalError, Result};
use quill_ast::ParameterMode;

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub returntype: TypeId,
    pub params: Vec<(ParameterMode, TypeId)>,
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: String,
    pub ty: TypeId,
    pub is_private: bool,
}

#[derive(Debug, Clone)]
pub enum Type {
    Nothing,
    Boolean,
    Number,
    String,
    Bytes,
    Object,
    Function(FunctionType),
    Array(TypeId),
    Dictionary(TypeId),
    Record { name: String, fields: Vec<RecordField> },
    Pointer(TypeId),
    FunctionPointer(TypeId),
    Enum { name: String, names: Vec<String> },
    Choice { name: String, choices: Vec<(String, TypeId)> },
}

impl Type {
    pub fn describe(&self) -> String {
        match self {
            Type::Nothing => "Nothing".to_string(),
            Type::Boolean => "Boolean".to_string(),
            Type::Number => "Number".to_string(),
            Type::String => "String".to_string(),
            Type::Bytes => "Bytes".to_string(),
            Type::Object => "Object".to_string(),
            Type::Function(_) => "function type".to_string(),
            Type::Array(_) => "Array".to_string(),
            Type::Dictionary(_) => "Dictionary".to_string(),
            Type::Record { name, .. } => format!("record {}", name),
            Type::Pointer(_) => "pointer type".to_string(),
            Type::FunctionPointer(_) => "function pointer type".to_string(),
            Type::Enum { name, .. } => format!("enum {}", name),
            Type::Choice { name, .. } => format!("choice {}", name),
        }
    }

    /// Pushes the zero value of this type.
    ///
    /// A record's default is made of its fields' defaults.
    pub fn generate_default(&self, cx: &mut GenContext<'_>) -> Result<()> {
        match self {
            Type::Record { fields, .. } => {
                let ir = cx.ir;
                for field in fields {
                    ir.ty(field.ty).generate_default(cx)?;
                }
                Ok(())
            }
            _ => unimplemented(format!("default value of {}", self.describe())),
        }
    }

    /// Calls a value of this type with `args`.
    pub fn generate_call(&self, cx: &mut GenContext<'_>, args: &[ExprId]) -> Result<()> {
        match self {
            Type::FunctionPointer(_) => {
                let ir = cx.ir;
                for arg in args {
                    ir.expr(*arg).generate(cx)?;
                }
                unimplemented("call through a function pointer")
            }
            _ => Err(InternalError::NotCallable {
                construct: format!("value of type {}", self.describe()),
            }),
        }
    }
}

use super::{ExprId, GenContext, StmtId, Type, TypeId, VariableId};
use crate::diagnostics::{unimplemented, InternalError, Result};
use quill_ast::ParameterMode;

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub ty: TypeId,
    pub params: Vec<VariableId>,
    pub locals: Vec<VariableId>,
    /// Filled in after the function node exists, so recursive calls resolve.
    pub body: Vec<StmtId>,
}

#[derive(Debug, Clone)]
pub enum Variable {
    Predefined { name: String, ty: TypeId },
    Module { module: String, name: String, ty: TypeId },
    Global { name: String, ty: TypeId },
    Local { name: String, ty: TypeId },
    FunctionParameter { name: String, ty: TypeId, mode: ParameterMode },
    Function(Function),
    PredefinedFunction { name: String, ty: TypeId },
    ModuleFunction { module: String, name: String, ty: TypeId },
    ExternalFunction { name: String, ty: TypeId, library: String, symbol: String },
}

impl Variable {
    pub fn ty(&self) -> TypeId {
        match self {
            Variable::Predefined { ty, .. }
            | Variable::Module { ty, .. }
            | Variable::Global { ty, .. }
            | Variable::Local { ty, .. }
            | Variable::FunctionParameter { ty, .. }
            | Variable::PredefinedFunction { ty, .. }
            | Variable::ModuleFunction { ty, .. }
            | Variable::ExternalFunction { ty, .. } => *ty,
            Variable::Function(f) => f.ty,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Variable::Predefined { name, .. } => format!("predefined variable {}", name),
            Variable::Module { module, name, .. } => format!("module variable {}.{}", module, name),
            Variable::Global { name, .. } => format!("global variable {}", name),
            Variable::Local { name, .. } => format!("local variable {}", name),
            Variable::FunctionParameter { name, .. } => format!("parameter {}", name),
            Variable::Function(f) => format!("function {}", f.name),
            Variable::PredefinedFunction { name, .. } => format!("predefined function {}", name),
            Variable::ModuleFunction { module, name, .. } => {
                format!("module function {}.{}", module, name)
            }
            Variable::ExternalFunction { name, library, .. } => {
                format!("external function {} from {}", name, library)
            }
        }
    }

    fn is_function(&self) -> bool {
        matches!(
            self,
            Variable::Function(_)
                | Variable::PredefinedFunction { .. }
                | Variable::ModuleFunction { .. }
                | Variable::ExternalFunction { .. }
        )
    }

    pub fn generate_load(&self, _cx: &mut GenContext<'_>) -> Result<()> {
        unimplemented(format!("load of {}", self.describe()))
    }

    pub fn generate_store(&self, _cx: &mut GenContext<'_>) -> Result<()> {
        unimplemented(format!("store to {}", self.describe()))
    }

    /// Arguments are evaluated left to right before the call itself.
    pub fn generate_call(&self, cx: &mut GenContext<'_>, args: &[ExprId]) -> Result<()> {
        let ir = cx.ir;
        if self.is_function() {
            for arg in args {
                ir.expr(*arg).generate(cx)?;
            }
            return unimplemented(format!("call of {}", self.describe()));
        }
        match ir.ty(self.ty()) {
            ty @ Type::FunctionPointer(_) => {
                self.generate_load(cx)?;
                ty.generate_call(cx, args)
            }
            _ => Err(InternalError::NotCallable {
                construct: self.describe(),
            }),
        }
    }
}

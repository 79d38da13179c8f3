//! Backend IR for the binary backend.
//!
//! The IR mirrors the AST variant for variant. Nodes live in the arenas of
//! [`Ir`] and refer to each other through the copyable handles defined here
//! ([`TypeId`], [`VariableId`], [`ExprId`], [`StmtId`]); they never hold AST
//! references. The only link back to the AST is the [`Origin`] kept with each
//! node for diagnostics.
//!
//! Every node exposes the generation methods of its category. Generation
//! happens against a [`GenContext`], which pairs the arenas (to resolve child
//! handles) with the [`MethodBody`] being emitted. Nodes that would need to
//! emit an instruction report [`crate::diagnostics::InternalError::Unimplemented`]
//! naming the construct; nodes that only group children forward to them.
//! Filling in instruction selection later only changes leaf bodies.

pub mod expressions;
pub mod statements;
pub mod types;
pub mod variables;

use crate::il::MethodBody;
use std::fmt;
use std::rc::Rc;

pub use expressions::Expression;
pub use statements::Statement;
pub use types::Type;
pub use variables::Variable;

macro_rules! define_handle {
    ($($(#[$meta:meta])* $name:ident,)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(u32);

            impl $name {
                pub fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

define_handle! {
    /// Handle of a lowered type.
    TypeId,
    /// Handle of a lowered variable.
    VariableId,
    /// Handle of a lowered expression.
    ExprId,
    /// Handle of a lowered statement.
    StmtId,
}

/// Identity of the AST node an IR node was lowered from.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin(usize);

impl Origin {
    pub fn of<T>(node: &Rc<T>) -> Self {
        Origin(Rc::as_ptr(node) as *const () as usize)
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Origin({:#x})", self.0)
    }
}

/// An IR node plus the identity of its AST origin.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub origin: Origin,
    pub node: T,
}

/// Arenas holding every IR node of one generation pass.
#[derive(Debug, Default)]
pub struct Ir {
    types: Vec<Node<Type>>,
    variables: Vec<Node<Variable>>,
    expressions: Vec<Node<Expression>>,
    statements: Vec<Node<Statement>>,
}

impl Ir {
    pub fn ty(&self, id: TypeId) -> &Type {
        &self.types[id.index()].node
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()].node
    }

    pub fn expr(&self, id: ExprId) -> &Expression {
        &self.expressions[id.index()].node
    }

    pub fn stmt(&self, id: StmtId) -> &Statement {
        &self.statements[id.index()].node
    }

    pub fn type_origin(&self, id: TypeId) -> Origin {
        self.types[id.index()].origin
    }

    pub fn variable_origin(&self, id: VariableId) -> Origin {
        self.variables[id.index()].origin
    }

    pub fn expr_origin(&self, id: ExprId) -> Origin {
        self.expressions[id.index()].origin
    }

    pub fn stmt_origin(&self, id: StmtId) -> Origin {
        self.statements[id.index()].origin
    }

    pub(crate) fn variable_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.variables[id.index()].node
    }

    pub(crate) fn push_type(&mut self, origin: Origin, node: Type) -> TypeId {
        self.types.push(Node { origin, node });
        TypeId(self.types.len() as u32 - 1)
    }

    pub(crate) fn push_variable(&mut self, origin: Origin, node: Variable) -> VariableId {
        self.variables.push(Node { origin, node });
        VariableId(self.variables.len() as u32 - 1)
    }

    pub(crate) fn push_expr(&mut self, origin: Origin, node: Expression) -> ExprId {
        self.expressions.push(Node { origin, node });
        ExprId(self.expressions.len() as u32 - 1)
    }

    pub(crate) fn push_stmt(&mut self, origin: Origin, node: Statement) -> StmtId {
        self.statements.push(Node { origin, node });
        StmtId(self.statements.len() as u32 - 1)
    }

    pub fn stats(&self) -> IrStats {
        IrStats {
            types: self.types.len(),
            variables: self.variables.len(),
            expressions: self.expressions.len(),
            statements: self.statements.len(),
        }
    }
}

/// Node counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IrStats {
    pub types: usize,
    pub variables: usize,
    pub expressions: usize,
    pub statements: usize,
}

/// What generation methods operate on.
pub struct GenContext<'a> {
    pub ir: &'a Ir,
    pub body: &'a mut MethodBody,
}

impl<'a> GenContext<'a> {
    pub fn new(ir: &'a Ir, body: &'a mut MethodBody) -> Self {
        Self { ir, body }
    }
}

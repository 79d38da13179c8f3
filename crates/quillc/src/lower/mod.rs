//! AST to IR lowering.
//!
//! [`LoweringContext`] turns AST nodes into IR nodes exactly once per node
//! identity. Each category has an arena (inside [`Ir`]) and a side table from
//! the AST allocation address to the handle of the IR node built for it.
//! Asking for the same node again returns the cached handle, so a sub-tree
//! the front end shares between several parents is lowered once and
//! referenced from all of them.
//!
//! The context borrows the program for its whole lifetime, which keeps every
//! keyed allocation alive while its address is in a side table.
//!
//! Lowering is split by category the same way the IR is:
//! - `mod.rs`: types, variables and the program driver
//! - `expr.rs`: expressions
//! - `stmt.rs`: statements

mod expr;
mod stmt;

use crate::ir::{self, Ir, IrStats, Origin, StmtId, TypeId, VariableId};
use quill_ast as ast;
use std::collections::HashMap;

pub struct LoweringContext<'a> {
    program: &'a ast::Program,
    ir: Ir,
    types: HashMap<Origin, TypeId>,
    variables: HashMap<Origin, VariableId>,
    expressions: HashMap<Origin, ir::ExprId>,
    statements: HashMap<Origin, StmtId>,
}

/// Handles of a program's top-level declarations after lowering.
#[derive(Debug, Clone, Default)]
pub struct LoweredProgram {
    pub functions: Vec<VariableId>,
    pub statements: Vec<StmtId>,
}

impl<'a> LoweringContext<'a> {
    pub fn new(program: &'a ast::Program) -> Self {
        Self {
            program,
            ir: Ir::default(),
            types: HashMap::new(),
            variables: HashMap::new(),
            expressions: HashMap::new(),
            statements: HashMap::new(),
        }
    }

    pub fn ir(&self) -> &Ir {
        &self.ir
    }

    pub fn into_ir(self) -> Ir {
        self.ir
    }

    pub fn stats(&self) -> IrStats {
        self.ir.stats()
    }

    /// Lowers every module-level function and top-level statement.
    pub fn lower_program(&mut self) -> LoweredProgram {
        let program = self.program;
        let functions = program
            .functions
            .iter()
            .map(|f| self.lower_variable(f))
            .collect();
        let statements = program
            .statements
            .iter()
            .map(|s| self.lower_statement(s))
            .collect();

        let stats = self.stats();
        log::debug!(
            "lowered {}: {} types, {} variables, {} expressions, {} statements",
            program.module_name,
            stats.types,
            stats.variables,
            stats.expressions,
            stats.statements
        );
        LoweredProgram {
            functions,
            statements,
        }
    }

    pub fn lower_type(&mut self, node: &'a ast::TypeRef) -> TypeId {
        let origin = Origin::of(node);
        if let Some(id) = self.types.get(&origin) {
            return *id;
        }

        let lowered = match node.as_ref() {
            ast::Type::Nothing => ir::Type::Nothing,
            ast::Type::Boolean => ir::Type::Boolean,
            ast::Type::Number => ir::Type::Number,
            ast::Type::String => ir::Type::String,
            ast::Type::Bytes => ir::Type::Bytes,
            ast::Type::Object => ir::Type::Object,
            ast::Type::Function(f) => ir::Type::Function(self.lower_function_type(f)),
            ast::Type::Array(elem) => ir::Type::Array(self.lower_type(elem)),
            ast::Type::Dictionary(elem) => ir::Type::Dictionary(self.lower_type(elem)),
            ast::Type::Record(r) => ir::Type::Record {
                name: r.name.clone(),
                fields: r
                    .fields
                    .iter()
                    .map(|f| ir::types::RecordField {
                        name: f.name.clone(),
                        ty: self.lower_type(&f.ty),
                        is_private: f.is_private,
                    })
                    .collect(),
            },
            ast::Type::Pointer(target) => ir::Type::Pointer(self.lower_type(target)),
            ast::Type::FunctionPointer(f) => ir::Type::FunctionPointer(self.lower_type(f)),
            ast::Type::Enum(e) => ir::Type::Enum {
                name: e.name.clone(),
                names: e.names.clone(),
            },
            ast::Type::Choice(c) => ir::Type::Choice {
                name: c.name.clone(),
                choices: c
                    .choices
                    .iter()
                    .map(|v| (v.name.clone(), self.lower_type(&v.ty)))
                    .collect(),
            },
        };

        let id = self.ir.push_type(origin, lowered);
        self.types.insert(origin, id);
        id
    }

    fn lower_function_type(&mut self, f: &'a ast::FunctionType) -> ir::types::FunctionType {
        ir::types::FunctionType {
            returntype: self.lower_type(&f.returntype),
            params: f
                .params
                .iter()
                .map(|p| (p.mode, self.lower_type(&p.ty)))
                .collect(),
        }
    }

    pub fn lower_variable(&mut self, node: &'a ast::VariableRef) -> VariableId {
        let origin = Origin::of(node);
        if let Some(id) = self.variables.get(&origin) {
            return *id;
        }

        let lowered = match node.as_ref() {
            ast::Variable::Predefined(v) => ir::Variable::Predefined {
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::Module(v) => ir::Variable::Module {
                module: v.module.clone(),
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::Global(v) => ir::Variable::Global {
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::Local(v) => ir::Variable::Local {
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::FunctionParameter(p) => ir::Variable::FunctionParameter {
                name: p.name.clone(),
                ty: self.lower_type(&p.ty),
                mode: p.mode,
            },
            ast::Variable::Function(f) => return self.lower_function(origin, f),
            ast::Variable::PredefinedFunction(v) => ir::Variable::PredefinedFunction {
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::ModuleFunction(v) => ir::Variable::ModuleFunction {
                module: v.module.clone(),
                name: v.name.clone(),
                ty: self.lower_type(&v.ty),
            },
            ast::Variable::ExternalFunction(f) => ir::Variable::ExternalFunction {
                name: f.name.clone(),
                ty: self.lower_type(&f.ty),
                library: f.library.clone(),
                symbol: f.symbol.clone(),
            },
        };

        let id = self.ir.push_variable(origin, lowered);
        self.variables.insert(origin, id);
        id
    }

    // The function is cached before its body is lowered so that calls to
    // itself inside the body resolve to the same handle.
    fn lower_function(&mut self, origin: Origin, f: &'a ast::Function) -> VariableId {
        let ty = self.lower_type(&f.ty);
        let params = f.params.iter().map(|p| self.lower_variable(p)).collect();
        let locals = f.locals.iter().map(|l| self.lower_variable(l)).collect();
        let id = self.ir.push_variable(
            origin,
            ir::Variable::Function(ir::variables::Function {
                name: f.name.clone(),
                ty,
                params,
                locals,
                body: Vec::new(),
            }),
        );
        self.variables.insert(origin, id);

        let body: Vec<StmtId> = f
            .statements()
            .iter()
            .map(|s| self.lower_statement(s))
            .collect();
        if let ir::Variable::Function(function) = self.ir.variable_mut(id) {
            function.body = body;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn number() -> ast::TypeRef {
        Rc::new(ast::Type::Number)
    }

    #[test]
    fn same_node_lowers_to_the_same_handle() {
        let program = ast::Program::new("t.quill", "t");
        let ty = number();
        let mut cx = LoweringContext::new(&program);
        let first = cx.lower_type(&ty);
        let second = cx.lower_type(&ty);
        assert_eq!(first, second);
        assert_eq!(cx.stats().types, 1);
    }

    #[test]
    fn equal_but_distinct_nodes_are_lowered_separately() {
        let program = ast::Program::new("t.quill", "t");
        let a = number();
        let b = number();
        let mut cx = LoweringContext::new(&program);
        assert_ne!(cx.lower_type(&a), cx.lower_type(&b));
        assert_eq!(cx.stats().types, 2);
    }

    #[test]
    fn shared_field_type_is_lowered_once() {
        let program = ast::Program::new("t.quill", "t");
        let shared = number();
        let record: ast::TypeRef = Rc::new(ast::Type::Record(ast::RecordType {
            name: "Point".to_string(),
            fields: vec![
                ast::RecordField {
                    name: "x".to_string(),
                    ty: shared.clone(),
                    is_private: false,
                },
                ast::RecordField {
                    name: "y".to_string(),
                    ty: shared.clone(),
                    is_private: false,
                },
            ],
        }));
        let mut cx = LoweringContext::new(&program);
        let id = cx.lower_type(&record);
        assert_eq!(cx.stats().types, 2);
        match cx.ir().ty(id) {
            ir::Type::Record { fields, .. } => assert_eq!(fields[0].ty, fields[1].ty),
            other => panic!("expected a record, got {:?}", other),
        }
        assert_eq!(cx.ir().type_origin(id), Origin::of(&record));
    }
}

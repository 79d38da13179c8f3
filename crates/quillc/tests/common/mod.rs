//! Common testing utilities for the Quill backend test suite.
//!
//! The backends consume an already type-checked AST, so tests build small
//! programs by hand. The helpers here keep that terse and provide readers
//! for the little-endian fields of an emitted image.

#![allow(dead_code)]

use quill_ast as ast;
use quillc::BackendOptions;
use std::rc::Rc;
use uuid::Uuid;

pub fn number() -> ast::TypeRef {
    Rc::new(ast::Type::Number)
}

pub fn string() -> ast::TypeRef {
    Rc::new(ast::Type::String)
}

pub fn nothing() -> ast::TypeRef {
    Rc::new(ast::Type::Nothing)
}

pub fn num(n: f64) -> ast::ExprRef {
    Rc::new(ast::Expression::ConstantNumber(n))
}

pub fn text(s: &str) -> ast::ExprRef {
    Rc::new(ast::Expression::ConstantString(s.to_string()))
}

pub fn add(left: ast::ExprRef, right: ast::ExprRef) -> ast::ExprRef {
    Rc::new(ast::Expression::Addition(ast::Binary { left, right }))
}

pub fn global(name: &str, ty: ast::TypeRef) -> ast::VariableRef {
    Rc::new(ast::Variable::Global(ast::NamedVariable {
        name: name.to_string(),
        ty,
    }))
}

pub fn var(v: &ast::VariableRef) -> ast::ExprRef {
    Rc::new(ast::Expression::Variable(v.clone()))
}

pub fn assign(target: &ast::VariableRef, value: ast::ExprRef) -> ast::StmtRef {
    Rc::new(ast::Statement::Assignment {
        targets: vec![var(target)],
        value,
    })
}

pub fn expr_stmt(e: ast::ExprRef) -> ast::StmtRef {
    Rc::new(ast::Statement::Expression(e))
}

pub fn block(statements: Vec<ast::StmtRef>) -> ast::StmtRef {
    Rc::new(ast::Statement::Block(statements))
}

pub fn null_stmt() -> ast::StmtRef {
    Rc::new(ast::Statement::Null)
}

/// `FUNCTION name(): Nothing` with no parameters and an unset body.
pub fn function(name: &str) -> ast::VariableRef {
    let ty = Rc::new(ast::Type::Function(ast::FunctionType {
        returntype: nothing(),
        params: Vec::new(),
    }));
    Rc::new(ast::Variable::Function(ast::Function::new(name, ty, Vec::new())))
}

pub fn set_body(function: &ast::VariableRef, body: Vec<ast::StmtRef>) {
    if let ast::Variable::Function(f) = function.as_ref() {
        assert!(f.body.set(body).is_ok(), "body already set");
    } else {
        panic!("not a function: {}", function.name());
    }
}

pub fn call(function: &ast::VariableRef, args: Vec<ast::ExprRef>) -> ast::ExprRef {
    Rc::new(ast::Expression::FunctionCall {
        func: var(function),
        args,
    })
}

pub fn program(module: &str, statements: Vec<ast::StmtRef>) -> ast::Program {
    let mut program = ast::Program::new(format!("{}.quill", module), module);
    program.statements = statements;
    program
}

/// Options with a fixed module GUID, so images are reproducible.
pub fn fixed_options() -> BackendOptions {
    BackendOptions {
        module_guid: Some(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
        ..BackendOptions::default()
    }
}

pub fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

pub fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// File offset of an RVA inside the single `.text` section.
pub fn file_offset(rva: u32) -> usize {
    (rva - 0x2000 + 0x200) as usize
}

/// `(rva, size)` of an optional header data directory.
pub fn data_directory(image: &[u8], slot: usize) -> (u32, u32) {
    let pe = read_u32(image, 0x3c) as usize;
    let at = pe + 4 + 20 + 96 + slot * 8;
    (read_u32(image, at), read_u32(image, at + 4))
}

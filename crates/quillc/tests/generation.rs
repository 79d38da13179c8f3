//! Structural generation over the IR: which constructs pass through and
//! which one is reported first.

mod common;

use anyhow::Result;
use common::*;
use quill_ast as ast;
use quillc::il::MethodBody;
use quillc::ir::GenContext;
use quillc::lower::LoweringContext;
use quillc::InternalError;
use std::rc::Rc;

fn generate_statement(stmt: ast::StmtRef) -> quillc::diagnostics::Result<()> {
    let program = program("gen", vec![stmt]);
    let mut cx = LoweringContext::new(&program);
    let lowered = cx.lower_program();
    let ir = cx.into_ir();

    let mut body = MethodBody::new();
    let mut gen = GenContext::new(&ir, &mut body);
    ir.stmt(lowered.statements[0]).generate(&mut gen)
}

fn unimplemented(construct: &str) -> InternalError {
    InternalError::Unimplemented {
        construct: construct.to_string(),
    }
}

#[test]
fn null_statements_and_blocks_need_no_code() -> Result<()> {
    generate_statement(null_stmt())?;
    generate_statement(block(vec![null_stmt(), block(vec![null_stmt()])]))?;
    Ok(())
}

#[test]
fn first_operand_is_reported() {
    let err = generate_statement(expr_stmt(add(num(1.0), num(2.0)))).unwrap_err();
    assert_eq!(err, unimplemented("number constant"));
}

#[test]
fn block_stops_at_the_first_failure() {
    let err = generate_statement(block(vec![
        null_stmt(),
        expr_stmt(text("first")),
        expr_stmt(num(2.0)),
    ]))
    .unwrap_err();
    assert_eq!(err, unimplemented("string constant"));
}

#[test]
fn assignment_evaluates_the_value_first() {
    let x = global("x", number());
    let err = generate_statement(assign(&x, var(&x))).unwrap_err();
    assert_eq!(err, unimplemented("load of global variable x"));
}

#[test]
fn statements_without_children_report_themselves() {
    let err = generate_statement(Rc::new(ast::Statement::Exit(3))).unwrap_err();
    assert_eq!(err, unimplemented("EXIT from loop 3"));
    let err = generate_statement(Rc::new(ast::Statement::Return(None))).unwrap_err();
    assert_eq!(err, unimplemented("RETURN statement"));
}

#[test]
fn repeat_runs_its_body_before_the_condition() {
    let err = generate_statement(Rc::new(ast::Statement::Repeat {
        loop_id: 1,
        condition: text("condition"),
        body: vec![null_stmt()],
    }))
    .unwrap_err();
    assert_eq!(err, unimplemented("string constant"));

    let err = generate_statement(Rc::new(ast::Statement::Repeat {
        loop_id: 1,
        condition: text("condition"),
        body: vec![expr_stmt(num(1.0))],
    }))
    .unwrap_err();
    assert_eq!(err, unimplemented("number constant"));
}

#[test]
fn calls_evaluate_arguments_before_the_call() {
    let f = function("greet");
    set_body(&f, Vec::new());
    let err = generate_statement(expr_stmt(call(&f, vec![text("arg")]))).unwrap_err();
    assert_eq!(err, unimplemented("string constant"));

    let err = generate_statement(expr_stmt(call(&f, Vec::new()))).unwrap_err();
    assert_eq!(err, unimplemented("call of function greet"));
}

#[test]
fn calling_a_plain_variable_is_rejected() {
    let x = global("x", number());
    let err = generate_statement(expr_stmt(Rc::new(ast::Expression::FunctionCall {
        func: var(&x),
        args: Vec::new(),
    })))
    .unwrap_err();
    assert_eq!(
        err,
        InternalError::NotCallable {
            construct: "global variable x".to_string()
        }
    );
}

#[test]
fn generation_emits_no_instructions() -> Result<()> {
    let program = program("gen", vec![null_stmt()]);
    let mut cx = LoweringContext::new(&program);
    let lowered = cx.lower_program();
    let ir = cx.into_ir();

    let mut body = MethodBody::new();
    let mut gen = GenContext::new(&ir, &mut body);
    ir.stmt(lowered.statements[0]).generate(&mut gen)?;
    assert_eq!(body.code_size(), 0);
    Ok(())
}

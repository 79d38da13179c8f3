mod common;

use common::*;
use quill_ast as ast;
use quillc::ir::{self, Origin};
use quillc::lower::LoweringContext;
use std::rc::Rc;

#[test]
fn shared_subtree_is_lowered_once() {
    let x = global("x", number());
    let shared = add(var(&x), num(1.0));
    let program = program(
        "shared",
        vec![
            expr_stmt(shared.clone()),
            expr_stmt(shared.clone()),
        ],
    );

    let mut cx = LoweringContext::new(&program);
    let lowered = cx.lower_program();
    assert_eq!(lowered.statements.len(), 2);

    let ir = cx.ir();
    let first = match ir.stmt(lowered.statements[0]) {
        ir::Statement::Expression(e) => *e,
        other => panic!("expected an expression statement, got {:?}", other),
    };
    let second = match ir.stmt(lowered.statements[1]) {
        ir::Statement::Expression(e) => *e,
        other => panic!("expected an expression statement, got {:?}", other),
    };
    assert_eq!(first, second);
    assert_eq!(ir.expr_origin(first), Origin::of(&shared));

    // addition, variable reference, constant
    let stats = cx.stats();
    assert_eq!(stats.statements, 2);
    assert_eq!(stats.expressions, 3);
    assert_eq!(stats.variables, 1);
    assert_eq!(stats.types, 1);
}

#[test]
fn lowering_the_same_statement_twice_returns_the_same_handle() {
    let stmt = null_stmt();
    let program = program("again", Vec::new());
    let mut cx = LoweringContext::new(&program);
    let a = cx.lower_statement(&stmt);
    let b = cx.lower_statement(&stmt);
    assert_eq!(a, b);
    assert_eq!(cx.stats().statements, 1);
}

#[test]
fn recursive_function_refers_to_itself() {
    let f = function("countdown");
    set_body(&f, vec![expr_stmt(call(&f, Vec::new()))]);
    let mut program = program("recursion", Vec::new());
    program.functions.push(f.clone());

    let mut cx = LoweringContext::new(&program);
    let lowered = cx.lower_program();
    assert_eq!(lowered.functions.len(), 1);
    let id = lowered.functions[0];

    let ir = cx.ir();
    let body = match ir.variable(id) {
        ir::Variable::Function(function) => function.body.clone(),
        other => panic!("expected a function, got {:?}", other),
    };
    assert_eq!(body.len(), 1);
    let call = match ir.stmt(body[0]) {
        ir::Statement::Expression(e) => ir.expr(*e),
        other => panic!("expected an expression statement, got {:?}", other),
    };
    let callee = match call {
        ir::Expression::FunctionCall { func, .. } => ir.expr(*func),
        other => panic!("expected a call, got {:?}", other),
    };
    assert!(matches!(callee, ir::Expression::Variable(v) if *v == id));
    assert_eq!(cx.stats().variables, 1);
}

#[test]
fn recursive_function_outlives_its_program() {
    let f = function("countdown");
    set_body(&f, vec![expr_stmt(call(&f, Vec::new()))]);
    let weak = Rc::downgrade(&f);
    {
        let mut program = program("recursion", Vec::new());
        program.functions.push(f);
        let mut cx = LoweringContext::new(&program);
        cx.lower_program();
    }
    // The body's call keeps the function alive.
    assert_eq!(weak.strong_count(), 1);
}

#[test]
fn every_statement_kind_lowers() {
    let i = global("i", number());
    let items = global("items", Rc::new(ast::Type::Array(number())));
    let failure = Rc::new(ast::Exception {
        name: "Failure".to_string(),
    });
    let cond = Rc::new(ast::Expression::ConstantBoolean(true));

    let statements = vec![
        null_stmt(),
        Rc::new(ast::Statement::Assert {
            condition: cond.clone(),
            message: "always".to_string(),
        }),
        assign(&i, num(0.0)),
        Rc::new(ast::Statement::Return(None)),
        Rc::new(ast::Statement::Exit(1)),
        Rc::new(ast::Statement::Next(1)),
        Rc::new(ast::Statement::Raise {
            exception: failure.clone(),
            info: Some(text("why")),
        }),
        Rc::new(ast::Statement::Reset(vec![var(&i)])),
        Rc::new(ast::Statement::Increment {
            target: var(&i),
            delta: -1,
        }),
        Rc::new(ast::Statement::If {
            clauses: vec![ast::IfClause {
                condition: cond.clone(),
                statements: vec![null_stmt()],
            }],
            else_statements: Vec::new(),
        }),
        Rc::new(ast::Statement::Case {
            expr: var(&i),
            clauses: vec![ast::CaseClause {
                conditions: vec![
                    ast::WhenCondition::Equals(num(1.0)),
                    ast::WhenCondition::Compare(ast::ComparisonOp::Greater, num(5.0)),
                    ast::WhenCondition::Range {
                        low: num(2.0),
                        high: num(3.0),
                    },
                ],
                statements: Vec::new(),
            }],
            else_statements: Vec::new(),
        }),
        Rc::new(ast::Statement::Loop {
            loop_id: 1,
            body: Vec::new(),
        }),
        Rc::new(ast::Statement::While {
            loop_id: 2,
            condition: cond.clone(),
            body: Vec::new(),
        }),
        Rc::new(ast::Statement::Repeat {
            loop_id: 3,
            condition: cond.clone(),
            body: Vec::new(),
        }),
        Rc::new(ast::Statement::For {
            loop_id: 4,
            var: i.clone(),
            start: num(1.0),
            end: num(10.0),
            step: num(1.0),
            body: Vec::new(),
        }),
        Rc::new(ast::Statement::ForEach {
            loop_id: 5,
            var: i.clone(),
            index: None,
            array: var(&items),
            body: Vec::new(),
        }),
        Rc::new(ast::Statement::Try {
            body: vec![null_stmt()],
            catches: vec![ast::CatchClause {
                exceptions: vec![failure],
                name: None,
                statements: Vec::new(),
            }],
        }),
        block(vec![null_stmt()]),
    ];
    let count = statements.len();
    let program = program("kinds", statements);

    let mut cx = LoweringContext::new(&program);
    let lowered = cx.lower_program();
    assert_eq!(lowered.statements.len(), count);

    let ir = cx.ir();
    assert!(matches!(
        ir.stmt(lowered.statements[6]),
        ir::Statement::Raise { exception, .. } if exception == "Failure"
    ));
    // the boolean constant is shared by four statements
    let conditions: Vec<_> = lowered
        .statements
        .iter()
        .filter_map(|s| match ir.stmt(*s) {
            ir::Statement::Assert { condition, .. }
            | ir::Statement::While { condition, .. }
            | ir::Statement::Repeat { condition, .. } => Some(*condition),
            ir::Statement::If { clauses, .. } => Some(clauses[0].condition),
            _ => None,
        })
        .collect();
    assert_eq!(conditions.len(), 4);
    assert!(conditions.iter().all(|c| *c == conditions[0]));
}

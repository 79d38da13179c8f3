use super::{ExprId, GenContext, StmtId, VariableId};
use crate::diagnostics::{unimplemented, Result};
use quill_ast::{ComparisonOp, LoopId};

#[derive(Debug, Clone)]
pub struct IfClause {
    pub condition: ExprId,
    pub statements: Vec<StmtId>,
}

#[derive(Debug, Clone)]
pub enum WhenCondition {
    Equals(ExprId),
    Compare(ComparisonOp, ExprId),
    Range { low: ExprId, high: ExprId },
}

#[derive(Debug, Clone)]
pub struct CaseClause {
    pub conditions: Vec<WhenCondition>,
    pub statements: Vec<StmtId>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub exceptions: Vec<String>,
    pub name: Option<VariableId>,
    pub statements: Vec<StmtId>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Null,
    Assert { condition: ExprId, message: String },
    Assignment { targets: Vec<ExprId>, value: ExprId },
    Expression(ExprId),
    Return(Option<ExprId>),
    Exit(LoopId),
    Next(LoopId),
    Raise { exception: String, info: Option<ExprId> },
    Reset(Vec<ExprId>),
    Increment { target: ExprId, delta: i32 },
    If { clauses: Vec<IfClause>, else_statements: Vec<StmtId> },
    Case { expr: ExprId, clauses: Vec<CaseClause>, else_statements: Vec<StmtId> },
    Loop { loop_id: LoopId, body: Vec<StmtId> },
    While { loop_id: LoopId, condition: ExprId, body: Vec<StmtId> },
    Repeat { loop_id: LoopId, condition: ExprId, body: Vec<StmtId> },
    For {
        loop_id: LoopId,
        var: VariableId,
        start: ExprId,
        end: ExprId,
        step: ExprId,
        body: Vec<StmtId>,
    },
    ForEach {
        loop_id: LoopId,
        var: VariableId,
        index: Option<VariableId>,
        array: ExprId,
        body: Vec<StmtId>,
    },
    Try { body: Vec<StmtId>, catches: Vec<CatchClause> },
    Block(Vec<StmtId>),
}

impl Statement {
    pub fn describe(&self) -> String {
        match self {
            Statement::Null => "null statement".to_string(),
            Statement::Assert { .. } => "ASSERT statement".to_string(),
            Statement::Assignment { .. } => "assignment".to_string(),
            Statement::Expression(_) => "expression statement".to_string(),
            Statement::Return(_) => "RETURN statement".to_string(),
            Statement::Exit(id) => format!("EXIT from loop {}", id),
            Statement::Next(id) => format!("NEXT in loop {}", id),
            Statement::Raise { exception, .. } => format!("RAISE {}", exception),
            Statement::Reset(_) => "reset to default".to_string(),
            Statement::Increment { .. } => "INC/DEC statement".to_string(),
            Statement::If { .. } => "IF statement".to_string(),
            Statement::Case { .. } => "CASE statement".to_string(),
            Statement::Loop { .. } => "LOOP statement".to_string(),
            Statement::While { .. } => "WHILE loop".to_string(),
            Statement::Repeat { .. } => "REPEAT loop".to_string(),
            Statement::For { .. } => "FOR loop".to_string(),
            Statement::ForEach { .. } => "FOREACH loop".to_string(),
            Statement::Try { .. } => "TRY statement".to_string(),
            Statement::Block(_) => "block".to_string(),
        }
    }

    /// Emits this statement.
    ///
    /// Null statements and blocks need no instruction of their own. Every
    /// other statement visits its children in source order first, then
    /// reports its own construct as unimplemented.
    pub fn generate(&self, cx: &mut GenContext<'_>) -> Result<()> {
        let ir = cx.ir;
        match self {
            Statement::Null => return Ok(()),
            Statement::Block(statements) => return generate_block(cx, statements),
            Statement::Expression(expr) => return ir.expr(*expr).generate(cx),
            Statement::Assert { condition, .. } => ir.expr(*condition).generate(cx)?,
            Statement::Assignment { targets, value } => {
                ir.expr(*value).generate(cx)?;
                for target in targets {
                    if let super::Expression::Variable(v) = ir.expr(*target) {
                        return ir.variable(*v).generate_store(cx);
                    }
                }
            }
            Statement::Return(value) | Statement::Raise { info: value, .. } => {
                if let Some(value) = value {
                    ir.expr(*value).generate(cx)?;
                }
            }
            Statement::Exit(_) | Statement::Next(_) => {}
            Statement::Reset(targets) => {
                for target in targets {
                    ir.expr(*target).generate(cx)?;
                }
            }
            Statement::Increment { target, .. } => ir.expr(*target).generate(cx)?,
            Statement::If {
                clauses,
                else_statements,
            } => {
                for clause in clauses {
                    ir.expr(clause.condition).generate(cx)?;
                    generate_block(cx, &clause.statements)?;
                }
                generate_block(cx, else_statements)?;
            }
            Statement::Case {
                expr,
                clauses,
                else_statements,
            } => {
                ir.expr(*expr).generate(cx)?;
                for clause in clauses {
                    for condition in &clause.conditions {
                        match condition {
                            WhenCondition::Equals(e) | WhenCondition::Compare(_, e) => {
                                ir.expr(*e).generate(cx)?
                            }
                            WhenCondition::Range { low, high } => {
                                ir.expr(*low).generate(cx)?;
                                ir.expr(*high).generate(cx)?;
                            }
                        }
                    }
                    generate_block(cx, &clause.statements)?;
                }
                generate_block(cx, else_statements)?;
            }
            Statement::Loop { body, .. } => generate_block(cx, body)?,
            Statement::While {
                condition, body, ..
            } => {
                ir.expr(*condition).generate(cx)?;
                generate_block(cx, body)?;
            }
            Statement::Repeat {
                condition, body, ..
            } => {
                generate_block(cx, body)?;
                ir.expr(*condition).generate(cx)?;
            }
            Statement::For {
                start,
                end,
                step,
                body,
                ..
            } => {
                for bound in [start, end, step] {
                    ir.expr(*bound).generate(cx)?;
                }
                generate_block(cx, body)?;
            }
            Statement::ForEach { array, body, .. } => {
                ir.expr(*array).generate(cx)?;
                generate_block(cx, body)?;
            }
            Statement::Try { body, catches } => {
                generate_block(cx, body)?;
                for catch in catches {
                    generate_block(cx, &catch.statements)?;
                }
            }
        }
        unimplemented(self.describe())
    }
}

fn generate_block(cx: &mut GenContext<'_>, statements: &[StmtId]) -> Result<()> {
    let ir = cx.ir;
    for stmt in statements {
        ir.stmt(*stmt).generate(cx)?;
    }
    Ok(())
}

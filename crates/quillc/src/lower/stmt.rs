use super::LoweringContext;
use crate::ir::statements::{CaseClause, CatchClause, IfClause, WhenCondition};
use crate::ir::{self, Origin, StmtId};
use quill_ast as ast;

impl<'a> LoweringContext<'a> {
    pub fn lower_statement(&mut self, node: &'a ast::StmtRef) -> StmtId {
        let origin = Origin::of(node);
        if let Some(id) = self.statements.get(&origin) {
            return *id;
        }

        use ast::Statement as S;
        use ir::Statement as T;
        let lowered = match node.as_ref() {
            S::Null => T::Null,
            S::Assert { condition, message } => T::Assert {
                condition: self.lower_expression(condition),
                message: message.clone(),
            },
            S::Assignment { targets, value } => T::Assignment {
                targets: self.lower_expressions(targets),
                value: self.lower_expression(value),
            },
            S::Expression(e) => T::Expression(self.lower_expression(e)),
            S::Return(value) => T::Return(value.as_ref().map(|v| self.lower_expression(v))),
            S::Exit(loop_id) => T::Exit(*loop_id),
            S::Next(loop_id) => T::Next(*loop_id),
            S::Raise { exception, info } => T::Raise {
                exception: exception.name.clone(),
                info: info.as_ref().map(|i| self.lower_expression(i)),
            },
            S::Reset(targets) => T::Reset(self.lower_expressions(targets)),
            S::Increment { target, delta } => T::Increment {
                target: self.lower_expression(target),
                delta: *delta,
            },
            S::If {
                clauses,
                else_statements,
            } => T::If {
                clauses: clauses
                    .iter()
                    .map(|c| IfClause {
                        condition: self.lower_expression(&c.condition),
                        statements: self.lower_statements(&c.statements),
                    })
                    .collect(),
                else_statements: self.lower_statements(else_statements),
            },
            S::Case {
                expr,
                clauses,
                else_statements,
            } => T::Case {
                expr: self.lower_expression(expr),
                clauses: clauses.iter().map(|c| self.lower_case_clause(c)).collect(),
                else_statements: self.lower_statements(else_statements),
            },
            S::Loop { loop_id, body } => T::Loop {
                loop_id: *loop_id,
                body: self.lower_statements(body),
            },
            S::While {
                loop_id,
                condition,
                body,
            } => T::While {
                loop_id: *loop_id,
                condition: self.lower_expression(condition),
                body: self.lower_statements(body),
            },
            S::Repeat {
                loop_id,
                condition,
                body,
            } => T::Repeat {
                loop_id: *loop_id,
                condition: self.lower_expression(condition),
                body: self.lower_statements(body),
            },
            S::For {
                loop_id,
                var,
                start,
                end,
                step,
                body,
            } => T::For {
                loop_id: *loop_id,
                var: self.lower_variable(var),
                start: self.lower_expression(start),
                end: self.lower_expression(end),
                step: self.lower_expression(step),
                body: self.lower_statements(body),
            },
            S::ForEach {
                loop_id,
                var,
                index,
                array,
                body,
            } => T::ForEach {
                loop_id: *loop_id,
                var: self.lower_variable(var),
                index: index.as_ref().map(|i| self.lower_variable(i)),
                array: self.lower_expression(array),
                body: self.lower_statements(body),
            },
            S::Try { body, catches } => T::Try {
                body: self.lower_statements(body),
                catches: catches
                    .iter()
                    .map(|c| CatchClause {
                        exceptions: c.exceptions.iter().map(|e| e.name.clone()).collect(),
                        name: c.name.as_ref().map(|v| self.lower_variable(v)),
                        statements: self.lower_statements(&c.statements),
                    })
                    .collect(),
            },
            S::Block(statements) => T::Block(self.lower_statements(statements)),
        };

        let id = self.ir.push_stmt(origin, lowered);
        self.statements.insert(origin, id);
        id
    }

    pub(super) fn lower_statements(&mut self, nodes: &'a [ast::StmtRef]) -> Vec<StmtId> {
        nodes.iter().map(|s| self.lower_statement(s)).collect()
    }

    fn lower_case_clause(&mut self, c: &'a ast::CaseClause) -> CaseClause {
        CaseClause {
            conditions: c
                .conditions
                .iter()
                .map(|w| match w {
                    ast::WhenCondition::Equals(e) => WhenCondition::Equals(self.lower_expression(e)),
                    ast::WhenCondition::Compare(op, e) => {
                        WhenCondition::Compare(*op, self.lower_expression(e))
                    }
                    ast::WhenCondition::Range { low, high } => WhenCondition::Range {
                        low: self.lower_expression(low),
                        high: self.lower_expression(high),
                    },
                })
                .collect(),
            statements: self.lower_statements(&c.statements),
        }
    }
}

use super::LoweringContext;
use crate::ir::expressions::{
    Binary, CatchHandler, Comparison, FieldAccess, Index, Range, TryCatch,
};
use crate::ir::{self, ExprId, Origin};
use quill_ast as ast;

impl<'a> LoweringContext<'a> {
    pub fn lower_expression(&mut self, node: &'a ast::ExprRef) -> ExprId {
        let origin = Origin::of(node);
        if let Some(id) = self.expressions.get(&origin) {
            return *id;
        }

        use ast::Expression as E;
        use ir::Expression as X;
        let lowered = match node.as_ref() {
            E::ConstantBoolean(b) => X::ConstantBoolean(*b),
            E::ConstantNumber(n) => X::ConstantNumber(*n),
            E::ConstantString(s) => X::ConstantString(s.clone()),
            E::ConstantBytes(b) => X::ConstantBytes(b.clone()),
            E::ConstantEnum { ty, value } => X::ConstantEnum {
                ty: self.lower_type(ty),
                value: *value,
            },
            E::ConstantChoice { ty, choice } => X::ConstantChoice {
                ty: self.lower_type(ty),
                choice: *choice,
            },
            E::ConstantNil(ty) => X::ConstantNil(self.lower_type(ty)),
            E::ConstantNowhere(ty) => X::ConstantNowhere(self.lower_type(ty)),
            E::ArrayLiteral { ty, elements } => X::ArrayLiteral {
                ty: self.lower_type(ty),
                elements: self.lower_expressions(elements),
            },
            E::DictionaryLiteral { ty, entries } => X::DictionaryLiteral {
                ty: self.lower_type(ty),
                entries: entries
                    .iter()
                    .map(|(key, value)| (key.clone(), self.lower_expression(value)))
                    .collect(),
            },
            E::RecordLiteral { ty, values } => X::RecordLiteral {
                ty: self.lower_type(ty),
                values: self.lower_expressions(values),
            },
            E::NewRecord { ty, value } => X::NewRecord {
                ty: self.lower_type(ty),
                value: value.as_ref().map(|v| self.lower_expression(v)),
            },
            E::TypeTest { expr, target } => X::TypeTest {
                expr: self.lower_expression(expr),
                target: self.lower_type(target),
            },
            E::UnaryMinus(e) => X::UnaryMinus(self.lower_expression(e)),
            E::LogicalNot(e) => X::LogicalNot(self.lower_expression(e)),
            E::Conditional {
                condition,
                left,
                right,
            } => X::Conditional {
                condition: self.lower_expression(condition),
                left: self.lower_expression(left),
                right: self.lower_expression(right),
            },
            E::Try { expr, catches } => X::Try {
                expr: self.lower_expression(expr),
                catches: catches.iter().map(|c| self.lower_try_catch(c)).collect(),
            },
            E::Disjunction(b) => X::Disjunction(self.lower_binary(b)),
            E::Conjunction(b) => X::Conjunction(self.lower_binary(b)),
            E::ArrayIn(b) => X::ArrayIn(self.lower_binary(b)),
            E::DictionaryIn(b) => X::DictionaryIn(self.lower_binary(b)),
            E::ChainedComparison(comps) => X::ChainedComparison(self.lower_expressions(comps)),
            E::BooleanComparison(c) => X::BooleanComparison(self.lower_comparison(c)),
            E::NumericComparison(c) => X::NumericComparison(self.lower_comparison(c)),
            E::EnumComparison(c) => X::EnumComparison(self.lower_comparison(c)),
            E::StringComparison(c) => X::StringComparison(self.lower_comparison(c)),
            E::BytesComparison(c) => X::BytesComparison(self.lower_comparison(c)),
            E::ArrayComparison(c) => X::ArrayComparison(self.lower_comparison(c)),
            E::DictionaryComparison(c) => X::DictionaryComparison(self.lower_comparison(c)),
            E::RecordComparison(c) => X::RecordComparison(self.lower_comparison(c)),
            E::PointerComparison(c) => X::PointerComparison(self.lower_comparison(c)),
            E::FunctionPointerComparison(c) => {
                X::FunctionPointerComparison(self.lower_comparison(c))
            }
            E::ValidPointer(e) => X::ValidPointer(self.lower_expression(e)),
            E::Addition(b) => X::Addition(self.lower_binary(b)),
            E::Subtraction(b) => X::Subtraction(self.lower_binary(b)),
            E::Multiplication(b) => X::Multiplication(self.lower_binary(b)),
            E::Division(b) => X::Division(self.lower_binary(b)),
            E::Modulo(b) => X::Modulo(self.lower_binary(b)),
            E::Exponentiation(b) => X::Exponentiation(self.lower_binary(b)),
            E::ArrayReferenceIndex(i) => X::ArrayReferenceIndex(self.lower_index(i)),
            E::ArrayValueIndex(i) => X::ArrayValueIndex(self.lower_index(i)),
            E::DictionaryReferenceIndex(i) => X::DictionaryReferenceIndex(self.lower_index(i)),
            E::DictionaryValueIndex(i) => X::DictionaryValueIndex(self.lower_index(i)),
            E::StringRange(r) => X::StringRange(self.lower_range(r)),
            E::BytesRange(r) => X::BytesRange(self.lower_range(r)),
            E::ArrayRange(r) => X::ArrayRange(self.lower_range(r)),
            E::RecordReferenceField(f) => X::RecordReferenceField(self.lower_field(f)),
            E::RecordValueField(f) => X::RecordValueField(self.lower_field(f)),
            E::PointerDereference(e) => X::PointerDereference(self.lower_expression(e)),
            E::Variable(v) => X::Variable(self.lower_variable(v)),
            E::FunctionCall { func, args } => X::FunctionCall {
                func: self.lower_expression(func),
                args: self.lower_expressions(args),
            },
        };

        let id = self.ir.push_expr(origin, lowered);
        self.expressions.insert(origin, id);
        id
    }

    pub(super) fn lower_expressions(&mut self, nodes: &'a [ast::ExprRef]) -> Vec<ExprId> {
        nodes.iter().map(|e| self.lower_expression(e)).collect()
    }

    fn lower_binary(&mut self, b: &'a ast::Binary) -> Binary {
        Binary {
            left: self.lower_expression(&b.left),
            right: self.lower_expression(&b.right),
        }
    }

    fn lower_comparison(&mut self, c: &'a ast::Comparison) -> Comparison {
        Comparison {
            comp: c.comp,
            left: self.lower_expression(&c.left),
            right: self.lower_expression(&c.right),
        }
    }

    fn lower_index(&mut self, i: &'a ast::Index) -> Index {
        Index {
            base: self.lower_expression(&i.base),
            index: self.lower_expression(&i.index),
        }
    }

    fn lower_range(&mut self, r: &'a ast::Range) -> Range {
        Range {
            base: self.lower_expression(&r.base),
            first: self.lower_expression(&r.first),
            first_from_end: r.first_from_end,
            last: self.lower_expression(&r.last),
            last_from_end: r.last_from_end,
        }
    }

    fn lower_field(&mut self, f: &'a ast::FieldAccess) -> FieldAccess {
        FieldAccess {
            base: self.lower_expression(&f.base),
            field: f.field.clone(),
            index: f.index,
        }
    }

    fn lower_try_catch(&mut self, c: &'a ast::TryCatch) -> TryCatch {
        TryCatch {
            exceptions: c.exceptions.iter().map(|e| e.name.clone()).collect(),
            name: c.name.as_ref().map(|v| self.lower_variable(v)),
            handler: match &c.handler {
                ast::CatchHandler::Gives(e) => CatchHandler::Gives(self.lower_expression(e)),
                ast::CatchHandler::Statements(statements) => {
                    CatchHandler::Statements(self.lower_statements(statements))
                }
            },
        }
    }
}

use super::{ExprId, GenContext, StmtId, TypeId, VariableId};
use crate::diagnostics::{unimplemented, Result};
use quill_ast::ComparisonOp;

#[derive(Debug, Clone)]
pub struct Binary {
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub comp: ComparisonOp,
    pub left: ExprId,
    pub right: ExprId,
}

#[derive(Debug, Clone)]
pub struct Index {
    pub base: ExprId,
    pub index: ExprId,
}

#[derive(Debug, Clone)]
pub struct Range {
    pub base: ExprId,
    pub first: ExprId,
    pub first_from_end: bool,
    pub last: ExprId,
    pub last_from_end: bool,
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub base: ExprId,
    pub field: String,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum CatchHandler {
    Gives(ExprId),
    Statements(Vec<StmtId>),
}

#[derive(Debug, Clone)]
pub struct TryCatch {
    /// Names of the exceptions this handler traps.
    pub exceptions: Vec<String>,
    pub name: Option<VariableId>,
    pub handler: CatchHandler,
}

#[derive(Debug, Clone)]
pub enum Expression {
    ConstantBoolean(bool),
    ConstantNumber(f64),
    ConstantString(String),
    ConstantBytes(Vec<u8>),
    ConstantEnum { ty: TypeId, value: u32 },
    ConstantChoice { ty: TypeId, choice: u32 },
    ConstantNil(TypeId),
    ConstantNowhere(TypeId),
    ArrayLiteral { ty: TypeId, elements: Vec<ExprId> },
    DictionaryLiteral { ty: TypeId, entries: Vec<(String, ExprId)> },
    RecordLiteral { ty: TypeId, values: Vec<ExprId> },
    NewRecord { ty: TypeId, value: Option<ExprId> },
    TypeTest { expr: ExprId, target: TypeId },
    UnaryMinus(ExprId),
    LogicalNot(ExprId),
    Conditional { condition: ExprId, left: ExprId, right: ExprId },
    Try { expr: ExprId, catches: Vec<TryCatch> },
    Disjunction(Binary),
    Conjunction(Binary),
    ArrayIn(Binary),
    DictionaryIn(Binary),
    ChainedComparison(Vec<ExprId>),
    BooleanComparison(Comparison),
    NumericComparison(Comparison),
    EnumComparison(Comparison),
    StringComparison(Comparison),
    BytesComparison(Comparison),
    ArrayComparison(Comparison),
    DictionaryComparison(Comparison),
    RecordComparison(Comparison),
    PointerComparison(Comparison),
    FunctionPointerComparison(Comparison),
    ValidPointer(ExprId),
    Addition(Binary),
    Subtraction(Binary),
    Multiplication(Binary),
    Division(Binary),
    Modulo(Binary),
    Exponentiation(Binary),
    ArrayReferenceIndex(Index),
    ArrayValueIndex(Index),
    DictionaryReferenceIndex(Index),
    DictionaryValueIndex(Index),
    StringRange(Range),
    BytesRange(Range),
    ArrayRange(Range),
    RecordReferenceField(FieldAccess),
    RecordValueField(FieldAccess),
    PointerDereference(ExprId),
    Variable(VariableId),
    FunctionCall { func: ExprId, args: Vec<ExprId> },
}

fn comparison_symbol(comp: ComparisonOp) -> &'static str {
    match comp {
        ComparisonOp::Equal => "=",
        ComparisonOp::NotEqual => "<>",
        ComparisonOp::Less => "<",
        ComparisonOp::Greater => ">",
        ComparisonOp::LessEqual => "<=",
        ComparisonOp::GreaterEqual => ">=",
    }
}

impl Expression {
    /// Human-readable name of the construct, used in diagnostics.
    pub fn describe(&self) -> String {
        let name = match self {
            Expression::ConstantBoolean(_) => "boolean constant",
            Expression::ConstantNumber(_) => "number constant",
            Expression::ConstantString(_) => "string constant",
            Expression::ConstantBytes(_) => "bytes constant",
            Expression::ConstantEnum { .. } => "enum constant",
            Expression::ConstantChoice { .. } => "choice constant",
            Expression::ConstantNil(_) => "NIL constant",
            Expression::ConstantNowhere(_) => "NOWHERE constant",
            Expression::ArrayLiteral { .. } => "array literal",
            Expression::DictionaryLiteral { .. } => "dictionary literal",
            Expression::RecordLiteral { .. } => "record literal",
            Expression::NewRecord { .. } => "NEW record",
            Expression::TypeTest { .. } => "ISA type test",
            Expression::UnaryMinus(_) => "unary minus",
            Expression::LogicalNot(_) => "logical NOT",
            Expression::Conditional { .. } => "conditional expression",
            Expression::Try { .. } => "TRY expression",
            Expression::Disjunction(_) => "logical OR",
            Expression::Conjunction(_) => "logical AND",
            Expression::ArrayIn(_) => "array IN",
            Expression::DictionaryIn(_) => "dictionary IN",
            Expression::ChainedComparison(_) => "chained comparison",
            Expression::BooleanComparison(c) => return compared("boolean", c),
            Expression::NumericComparison(c) => return compared("numeric", c),
            Expression::EnumComparison(c) => return compared("enum", c),
            Expression::StringComparison(c) => return compared("string", c),
            Expression::BytesComparison(c) => return compared("bytes", c),
            Expression::ArrayComparison(c) => return compared("array", c),
            Expression::DictionaryComparison(c) => return compared("dictionary", c),
            Expression::RecordComparison(c) => return compared("record", c),
            Expression::PointerComparison(c) => return compared("pointer", c),
            Expression::FunctionPointerComparison(c) => return compared("function pointer", c),
            Expression::ValidPointer(_) => "VALID pointer test",
            Expression::Addition(_) => "numeric addition",
            Expression::Subtraction(_) => "numeric subtraction",
            Expression::Multiplication(_) => "numeric multiplication",
            Expression::Division(_) => "numeric division",
            Expression::Modulo(_) => "numeric modulo",
            Expression::Exponentiation(_) => "numeric exponentiation",
            Expression::ArrayReferenceIndex(_) => "array element reference",
            Expression::ArrayValueIndex(_) => "array element",
            Expression::DictionaryReferenceIndex(_) => "dictionary entry reference",
            Expression::DictionaryValueIndex(_) => "dictionary entry",
            Expression::StringRange(_) => "string slice",
            Expression::BytesRange(_) => "bytes slice",
            Expression::ArrayRange(_) => "array slice",
            Expression::RecordReferenceField(f) => return format!("reference to field {}", f.field),
            Expression::RecordValueField(f) => return format!("field {}", f.field),
            Expression::PointerDereference(_) => "pointer dereference",
            Expression::Variable(_) => "variable reference",
            Expression::FunctionCall { .. } => "function call",
        };
        name.to_string()
    }

    /// Pushes the value of this expression.
    ///
    /// Operands are generated first, in evaluation order, so the first
    /// construct without an instruction sequence is the one reported.
    pub fn generate(&self, cx: &mut GenContext<'_>) -> Result<()> {
        let ir = cx.ir;
        match self {
            Expression::ConstantBoolean(_)
            | Expression::ConstantNumber(_)
            | Expression::ConstantString(_)
            | Expression::ConstantBytes(_)
            | Expression::ConstantEnum { .. }
            | Expression::ConstantChoice { .. }
            | Expression::ConstantNil(_)
            | Expression::ConstantNowhere(_) => {}
            Expression::ArrayLiteral { elements, .. } | Expression::RecordLiteral { values: elements, .. } => {
                generate_all(cx, elements)?;
            }
            Expression::DictionaryLiteral { entries, .. } => {
                for (_, value) in entries {
                    ir.expr(*value).generate(cx)?;
                }
            }
            Expression::NewRecord { ty, value } => match value {
                Some(value) => ir.expr(*value).generate(cx)?,
                None => ir.ty(*ty).generate_default(cx)?,
            },
            Expression::TypeTest { expr, .. }
            | Expression::UnaryMinus(expr)
            | Expression::LogicalNot(expr)
            | Expression::ValidPointer(expr)
            | Expression::PointerDereference(expr) => {
                ir.expr(*expr).generate(cx)?;
            }
            Expression::Conditional { condition, .. } => {
                ir.expr(*condition).generate(cx)?;
            }
            Expression::Try { expr, .. } => {
                ir.expr(*expr).generate(cx)?;
            }
            Expression::Disjunction(b)
            | Expression::Conjunction(b)
            | Expression::ArrayIn(b)
            | Expression::DictionaryIn(b)
            | Expression::Addition(b)
            | Expression::Subtraction(b)
            | Expression::Multiplication(b)
            | Expression::Division(b)
            | Expression::Modulo(b)
            | Expression::Exponentiation(b) => {
                generate_all(cx, &[b.left, b.right])?;
            }
            Expression::ChainedComparison(comparisons) => {
                generate_all(cx, comparisons)?;
            }
            Expression::BooleanComparison(c)
            | Expression::NumericComparison(c)
            | Expression::EnumComparison(c)
            | Expression::StringComparison(c)
            | Expression::BytesComparison(c)
            | Expression::ArrayComparison(c)
            | Expression::DictionaryComparison(c)
            | Expression::RecordComparison(c)
            | Expression::PointerComparison(c)
            | Expression::FunctionPointerComparison(c) => {
                generate_all(cx, &[c.left, c.right])?;
            }
            Expression::ArrayReferenceIndex(i)
            | Expression::ArrayValueIndex(i)
            | Expression::DictionaryReferenceIndex(i)
            | Expression::DictionaryValueIndex(i) => {
                generate_all(cx, &[i.base, i.index])?;
            }
            Expression::StringRange(r) | Expression::BytesRange(r) | Expression::ArrayRange(r) => {
                generate_all(cx, &[r.base, r.first, r.last])?;
            }
            Expression::RecordReferenceField(f) | Expression::RecordValueField(f) => {
                ir.expr(f.base).generate(cx)?;
            }
            Expression::Variable(v) => return ir.variable(*v).generate_load(cx),
            Expression::FunctionCall { func, args } => {
                return ir.expr(*func).generate_call(cx, args)
            }
        }
        unimplemented(self.describe())
    }

    /// Calls the value of this expression with `args`.
    pub fn generate_call(&self, cx: &mut GenContext<'_>, args: &[ExprId]) -> Result<()> {
        let ir = cx.ir;
        match self {
            Expression::Variable(v) => ir.variable(*v).generate_call(cx, args),
            _ => {
                self.generate(cx)?;
                unimplemented(format!("indirect call through {}", self.describe()))
            }
        }
    }
}

fn compared(kind: &str, c: &Comparison) -> String {
    format!("{} comparison ({})", kind, comparison_symbol(c.comp))
}

fn generate_all(cx: &mut GenContext<'_>, exprs: &[ExprId]) -> Result<()> {
    let ir = cx.ir;
    for expr in exprs {
        ir.expr(*expr).generate(cx)?;
    }
    Ok(())
}

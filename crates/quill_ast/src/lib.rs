//! Quill AST definitions
//!
//! This crate defines the type-checked abstract syntax tree handed from the
//! Quill front end to the code generation backends. It serves as the contract
//! between the two: the front end builds it, the backends only read it.
//!
//! Every node of the four lowered categories (types, variables, expressions
//! and statements) lives behind an `Rc`. A node's identity is its allocation,
//! so a sub-tree that the front end shares between several parents (a record
//! type used by many declarations, a variable referenced from many
//! expressions) is the same node wherever it appears.

use std::cell::OnceCell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

pub type TypeRef = Rc<Type>;
pub type VariableRef = Rc<Variable>;
pub type ExprRef = Rc<Expression>;
pub type StmtRef = Rc<Statement>;
pub type ExceptionRef = Rc<Exception>;

/// A fully type-checked compilation unit.
#[derive(Debug, Clone)]
pub struct Program {
    /// Path of the source file this program was compiled from.
    pub source_path: PathBuf,
    /// Module name, used to derive the output name.
    pub module_name: String,
    /// Functions declared at module level. Each is a `Variable::Function`.
    pub functions: Vec<VariableRef>,
    /// Top-level statements in source order.
    pub statements: Vec<StmtRef>,
}

impl Program {
    pub fn new(source_path: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            module_name: module_name.into(),
            functions: Vec::new(),
            statements: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Type {
    Nothing,
    Boolean,
    Number,
    String,
    Bytes,
    Object,
    Function(FunctionType),
    Array(TypeRef),
    Dictionary(TypeRef),
    Record(RecordType),
    Pointer(TypeRef),
    /// Pointer to a function; the payload is a `Type::Function`.
    FunctionPointer(TypeRef),
    Enum(EnumType),
    Choice(ChoiceType),
}

#[derive(Debug, Clone)]
pub struct FunctionType {
    pub returntype: TypeRef,
    pub params: Vec<ParameterType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterMode {
    In,
    InOut,
    Out,
}

#[derive(Debug, Clone)]
pub struct ParameterType {
    pub mode: ParameterMode,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct RecordType {
    pub name: String,
    pub fields: Vec<RecordField>,
}

#[derive(Debug, Clone)]
pub struct RecordField {
    pub name: String,
    pub ty: TypeRef,
    pub is_private: bool,
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub names: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChoiceType {
    pub name: String,
    pub choices: Vec<ChoiceVariant>,
}

#[derive(Debug, Clone)]
pub struct ChoiceVariant {
    pub name: String,
    pub ty: TypeRef,
}

/// A declared exception. Referenced by `RAISE` and by catch clauses.
#[derive(Debug, Clone)]
pub struct Exception {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Variables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Variable {
    /// Built-in variable provided by the runtime (for example `args`).
    Predefined(NamedVariable),
    /// Variable exported by another module.
    Module(ModuleVariable),
    Global(NamedVariable),
    Local(NamedVariable),
    FunctionParameter(Parameter),
    Function(Function),
    PredefinedFunction(NamedVariable),
    ModuleFunction(ModuleVariable),
    ExternalFunction(ExternalFunction),
}

#[derive(Debug, Clone)]
pub struct NamedVariable {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct ModuleVariable {
    pub module: String,
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub mode: ParameterMode,
}

/// A function declared in the program being compiled.
///
/// The body is set once, after the function node exists, so that recursive
/// calls can refer to the function from inside its own body.
///
/// A recursive body holds an `Rc` to the function's own `Variable`, so that
/// node is never freed by reference counting alone. The front end owns the
/// program and accepts that the cycle lives for the rest of the process; the
/// backend never breaks it.
#[derive(Clone)]
pub struct Function {
    pub name: String,
    /// A `Type::Function`.
    pub ty: TypeRef,
    /// `Variable::FunctionParameter` nodes in declaration order.
    pub params: Vec<VariableRef>,
    /// `Variable::Local` nodes declared anywhere in the body.
    pub locals: Vec<VariableRef>,
    pub body: OnceCell<Vec<StmtRef>>,
}

impl Function {
    pub fn new(name: impl Into<String>, ty: TypeRef, params: Vec<VariableRef>) -> Self {
        Self {
            name: name.into(),
            ty,
            params,
            locals: Vec::new(),
            body: OnceCell::new(),
        }
    }

    /// Statements of the body, or an empty slice for a body not yet set.
    pub fn statements(&self) -> &[StmtRef] {
        self.body.get().map(Vec::as_slice).unwrap_or(&[])
    }
}

// Bodies may refer back to the function itself, so only the header is printed.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params.len())
            .field("statements", &self.statements().len())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ExternalFunction {
    pub name: String,
    pub ty: TypeRef,
    pub library: String,
    pub symbol: String,
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Predefined(v)
            | Variable::Global(v)
            | Variable::Local(v)
            | Variable::PredefinedFunction(v) => &v.name,
            Variable::Module(v) | Variable::ModuleFunction(v) => &v.name,
            Variable::FunctionParameter(p) => &p.name,
            Variable::Function(f) => &f.name,
            Variable::ExternalFunction(f) => &f.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub left: ExprRef,
    pub right: ExprRef,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub comp: ComparisonOp,
    pub left: ExprRef,
    pub right: ExprRef,
}

#[derive(Debug, Clone)]
pub struct Index {
    pub base: ExprRef,
    pub index: ExprRef,
}

#[derive(Debug, Clone)]
pub struct Range {
    pub base: ExprRef,
    pub first: ExprRef,
    pub first_from_end: bool,
    pub last: ExprRef,
    pub last_from_end: bool,
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub base: ExprRef,
    pub field: String,
    /// Position of the field in the record type.
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum CatchHandler {
    /// `TRAP ... GIVES expr`
    Gives(ExprRef),
    /// `TRAP ... DO statements`; the statements must leave the expression.
    Statements(Vec<StmtRef>),
}

#[derive(Debug, Clone)]
pub struct TryCatch {
    pub exceptions: Vec<ExceptionRef>,
    pub name: Option<VariableRef>,
    pub handler: CatchHandler,
}

#[derive(Debug, Clone)]
pub enum Expression {
    ConstantBoolean(bool),
    ConstantNumber(f64),
    ConstantString(String),
    ConstantBytes(Vec<u8>),
    ConstantEnum { ty: TypeRef, value: u32 },
    ConstantChoice { ty: TypeRef, choice: u32 },
    ConstantNil(TypeRef),
    ConstantNowhere(TypeRef),
    ArrayLiteral { ty: TypeRef, elements: Vec<ExprRef> },
    DictionaryLiteral { ty: TypeRef, entries: Vec<(String, ExprRef)> },
    RecordLiteral { ty: TypeRef, values: Vec<ExprRef> },
    NewRecord { ty: TypeRef, value: Option<ExprRef> },
    TypeTest { expr: ExprRef, target: TypeRef },
    UnaryMinus(ExprRef),
    LogicalNot(ExprRef),
    Conditional { condition: ExprRef, left: ExprRef, right: ExprRef },
    Try { expr: ExprRef, catches: Vec<TryCatch> },
    Disjunction(Binary),
    Conjunction(Binary),
    ArrayIn(Binary),
    DictionaryIn(Binary),
    /// `a < b < c`; each element is a comparison expression.
    ChainedComparison(Vec<ExprRef>),
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
    ValidPointer(ExprRef),
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
    PointerDereference(ExprRef),
    Variable(VariableRef),
    FunctionCall { func: ExprRef, args: Vec<ExprRef> },
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// Identifies the loop an `EXIT` or `NEXT` statement leaves.
pub type LoopId = u32;

#[derive(Debug, Clone)]
pub struct IfClause {
    pub condition: ExprRef,
    pub statements: Vec<StmtRef>,
}

#[derive(Debug, Clone)]
pub enum WhenCondition {
    Equals(ExprRef),
    Compare(ComparisonOp, ExprRef),
    Range { low: ExprRef, high: ExprRef },
}

#[derive(Debug, Clone)]
pub struct CaseClause {
    pub conditions: Vec<WhenCondition>,
    pub statements: Vec<StmtRef>,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub exceptions: Vec<ExceptionRef>,
    pub name: Option<VariableRef>,
    pub statements: Vec<StmtRef>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Null,
    Assert { condition: ExprRef, message: String },
    Assignment { targets: Vec<ExprRef>, value: ExprRef },
    Expression(ExprRef),
    Return(Option<ExprRef>),
    Exit(LoopId),
    Next(LoopId),
    Raise { exception: ExceptionRef, info: Option<ExprRef> },
    Reset(Vec<ExprRef>),
    Increment { target: ExprRef, delta: i32 },
    If { clauses: Vec<IfClause>, else_statements: Vec<StmtRef> },
    Case { expr: ExprRef, clauses: Vec<CaseClause>, else_statements: Vec<StmtRef> },
    Loop { loop_id: LoopId, body: Vec<StmtRef> },
    While { loop_id: LoopId, condition: ExprRef, body: Vec<StmtRef> },
    Repeat { loop_id: LoopId, condition: ExprRef, body: Vec<StmtRef> },
    For {
        loop_id: LoopId,
        var: VariableRef,
        start: ExprRef,
        end: ExprRef,
        step: ExprRef,
        body: Vec<StmtRef>,
    },
    ForEach {
        loop_id: LoopId,
        var: VariableRef,
        index: Option<VariableRef>,
        array: ExprRef,
        body: Vec<StmtRef>,
    },
    Try { body: Vec<StmtRef>, catches: Vec<CatchClause> },
    Block(Vec<StmtRef>),
}

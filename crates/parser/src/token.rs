//! Token kinds: lexical tokens plus the synthetic kinds the parser uses to
//! tag AST nodes that have no source token of their own.

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

macro_rules! define_tokens {
    ($($(#[$meta:meta])* $name:ident = $text:literal,)*) => {
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum Token {
            $($(#[$meta])* $name,)*
        }

        const TOKEN_TEXT: &[&str] = &[$($text,)*];
        const ALL_TOKENS: &[Token] = &[$(Token::$name,)*];
    };
}

define_tokens! {
    #[default]
    Illegal = "ILLEGAL",
    Eof = "EOF",
    Comment = "COMMENT",

    Ident = "IDENT",
    Int = "INT",
    Float = "FLOAT",
    Imag = "IMAG",
    Char = "CHAR",
    String = "STRING",

    Add = "+",
    Sub = "-",
    Mul = "*",
    Quo = "/",
    Rem = "%",
    And = "&",
    Or = "|",
    Xor = "^",
    Shl = "<<",
    Shr = ">>",
    AndNot = "&^",
    AddAssign = "+=",
    SubAssign = "-=",
    MulAssign = "*=",
    QuoAssign = "/=",
    RemAssign = "%=",
    AndAssign = "&=",
    OrAssign = "|=",
    XorAssign = "^=",
    ShlAssign = "<<=",
    ShrAssign = ">>=",
    AndNotAssign = "&^=",
    LAnd = "&&",
    LOr = "||",
    Arrow = "<-",
    Inc = "++",
    Dec = "--",
    Eql = "==",
    Lss = "<",
    Gtr = ">",
    Assign = "=",
    Not = "!",
    Neq = "!=",
    Leq = "<=",
    Geq = ">=",
    Define = ":=",
    Ellipsis = "...",
    LParen = "(",
    LBrack = "[",
    LBrace = "{",
    Comma = ",",
    Period = ".",
    RParen = ")",
    RBrack = "]",
    RBrace = "}",
    Semicolon = ";",
    Colon = ":",
    Tilde = "~",

    Break = "break",
    Case = "case",
    Chan = "chan",
    Const = "const",
    Continue = "continue",
    Default = "default",
    Defer = "defer",
    Else = "else",
    Fallthrough = "fallthrough",
    For = "for",
    Func = "func",
    Go = "go",
    Goto = "goto",
    If = "if",
    Import = "import",
    Interface = "interface",
    Map = "map",
    Package = "package",
    Range = "range",
    Return = "return",
    Select = "select",
    Struct = "struct",
    Switch = "switch",
    Type = "type",
    Var = "var",

    Array = "ARRAY",
    Block = "BLOCK",
    BothDir = "BOTH_DIR",
    Call = "CALL",
    CompositeLit = "COMPOSITE_LIT",
    Decls = "DECLS",
    Exprs = "EXPRS",
    Field = "FIELD",
    File = "FILE",
    Generic = "GENERIC",
    ImportSpec = "IMPORT_SPEC",
    Imports = "IMPORTS",
    Index = "INDEX",
    KeyValue = "KEY_VALUE",
    Label = "LABEL",
    Lambda = "LAMBDA",
    Names = "NAMES",
    Params = "PARAMS",
    RecvDir = "RECV_DIR",
    Results = "RESULTS",
    SendDir = "SEND_DIR",
    Slice = "SLICE",
    TypeAssert = "TYPE_ASSERT",
    TypeSwitch = "TYPESWITCH",
    ValueSpec = "VALUE_SPEC",
}

pub const LOWEST_PREC: u8 = 0;
pub const UNARY_PREC: u8 = 6;
pub const HIGHEST_PREC: u8 = 7;

static KEYWORDS: LazyLock<FxHashMap<&'static str, Token>> = LazyLock::new(|| {
    ALL_TOKENS
        .iter()
        .copied()
        .filter(|t| t.is_keyword())
        .map(|t| (t.as_str(), t))
        .collect()
});

static OPERATORS: LazyLock<FxHashMap<&'static str, Token>> = LazyLock::new(|| {
    ALL_TOKENS
        .iter()
        .copied()
        .filter(|t| t.is_operator())
        .map(|t| (t.as_str(), t))
        .collect()
});

impl Token {
    #[inline]
    pub fn as_str(self) -> &'static str {
        TOKEN_TEXT[self as usize]
    }

    #[inline]
    pub fn is_literal(self) -> bool {
        (Token::Ident..=Token::String).contains(&self)
    }

    #[inline]
    pub fn is_operator(self) -> bool {
        (Token::Add..=Token::Tilde).contains(&self)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (Token::Break..=Token::Var).contains(&self)
    }

    /// Kinds that only ever tag AST nodes.
    #[inline]
    pub fn is_synthetic(self) -> bool {
        (Token::Array..=Token::ValueSpec).contains(&self)
    }

    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            Token::Assign
                | Token::Define
                | Token::AddAssign
                | Token::SubAssign
                | Token::MulAssign
                | Token::QuoAssign
                | Token::RemAssign
                | Token::AndAssign
                | Token::OrAssign
                | Token::XorAssign
                | Token::ShlAssign
                | Token::ShrAssign
                | Token::AndNotAssign
        )
    }

    /// Binary operator precedence; `LOWEST_PREC` for anything else.
    pub fn precedence(self) -> u8 {
        match self {
            Token::LOr => 1,
            Token::LAnd => 2,
            Token::Eql | Token::Neq | Token::Lss | Token::Leq | Token::Gtr | Token::Geq => 3,
            Token::Add | Token::Sub | Token::Or | Token::Xor => 4,
            Token::Mul
            | Token::Quo
            | Token::Rem
            | Token::Shl
            | Token::Shr
            | Token::And
            | Token::AndNot => 5,
            _ => LOWEST_PREC,
        }
    }

    /// Maps an identifier to its keyword, or `Ident`.
    pub fn lookup(ident: &str) -> Token {
        KEYWORDS.get(ident).copied().unwrap_or(Token::Ident)
    }

    pub fn lookup_operator(text: &str) -> Option<Token> {
        OPERATORS.get(text).copied()
    }

    /// Tokens after which a newline ends the statement.
    pub(crate) fn ends_statement(self) -> bool {
        matches!(
            self,
            Token::Ident
                | Token::Int
                | Token::Float
                | Token::Imag
                | Token::Char
                | Token::String
                | Token::Break
                | Token::Continue
                | Token::Fallthrough
                | Token::Return
                | Token::Inc
                | Token::Dec
                | Token::RParen
                | Token::RBrack
                | Token::RBrace
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

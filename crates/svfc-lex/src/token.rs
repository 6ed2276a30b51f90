//! Token model: kinds, payloads, and the immutable token itself.
//!
//! A token owns its kind, span, raw text slice, leading trivia, and a
//! kind-specific payload. Tokens are immutable once built; the preprocessor
//! derives new tokens (via the `with_*` constructors) instead of mutating.
//! Token equality compares kind and payload only, never location.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use svfc_util::{Span, Symbol};

use crate::trivia::Trivia;

/// Token classification.
///
/// This enum is part of the stable public surface; downstream tools match
/// on it. Keywords come first, then punctuators, then literal and special
/// kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum TokenKind {
    // ------------------------------------------------------------------
    // Keywords
    // ------------------------------------------------------------------
    Module,
    Endmodule,
    Macromodule,
    Program,
    Endprogram,
    Interface,
    Endinterface,
    Package,
    Endpackage,
    Class,
    Endclass,
    Extends,
    Implements,
    Virtual,
    Modport,
    Input,
    Output,
    Inout,
    Ref,
    Wire,
    Uwire,
    Tri,
    Tri0,
    Tri1,
    Triand,
    Trior,
    Trireg,
    Wand,
    Wor,
    Supply0,
    Supply1,
    Interconnect,
    Logic,
    Reg,
    Bit,
    Byte,
    Shortint,
    Int,
    Longint,
    Integer,
    Time,
    Real,
    Shortreal,
    Realtime,
    String,
    Chandle,
    Event,
    Void,
    Signed,
    Unsigned,
    Packed,
    Struct,
    Union,
    Enum,
    Typedef,
    Parameter,
    Localparam,
    Specparam,
    Defparam,
    Genvar,
    Generate,
    Endgenerate,
    Assign,
    Alias,
    Initial,
    Final,
    Always,
    AlwaysComb,
    AlwaysFf,
    AlwaysLatch,
    Begin,
    End,
    Fork,
    Join,
    JoinAny,
    JoinNone,
    If,
    Else,
    Case,
    Casex,
    Casez,
    Endcase,
    Default,
    For,
    Foreach,
    While,
    Do,
    Forever,
    Repeat,
    Break,
    Continue,
    Return,
    Wait,
    Disable,
    Function,
    Endfunction,
    Task,
    Endtask,
    Automatic,
    Static,
    Const,
    Var,
    Scalared,
    Vectored,
    Posedge,
    Negedge,
    Edge,
    Or,
    And,
    Not,
    Xor,
    Nand,
    Nor,
    Xnor,
    Buf,
    Bufif0,
    Bufif1,
    Notif0,
    Notif1,
    Assert,
    Assume,
    Cover,
    Expect,
    Constraint,
    Soft,
    Solve,
    Before,
    Inside,
    Dist,
    Unique,
    Unique0,
    Priority,
    Rand,
    Randc,
    Randcase,
    Null,
    This,
    Super,
    New,
    Local,
    Protected,
    Import,
    Export,
    Timeunit,
    Timeprecision,
    Type,
    Iff,
    With,

    // ------------------------------------------------------------------
    // Punctuators
    // ------------------------------------------------------------------
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Dot,
    DotStar,
    Colon,
    ColonColon,
    ColonEquals,
    ColonSlash,
    Apostrophe,
    ApostropheLBrace,
    Hash,
    DoubleHash,
    At,
    Dollar,
    Question,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    DoubleStar,
    Equals,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    AmpEquals,
    PipeEquals,
    CaretEquals,
    ShlEquals,
    ShrEquals,
    AshlEquals,
    AshrEquals,
    DoubleEquals,
    NotEquals,
    CaseEquals,
    CaseNotEquals,
    WildcardEquals,
    WildcardNotEquals,
    Lt,
    Lte,
    Gt,
    Gte,
    Shl,
    Shr,
    Ashl,
    Ashr,
    Amp,
    DoubleAmp,
    Pipe,
    DoublePipe,
    Caret,
    TildeCaret,
    CaretTilde,
    Tilde,
    TildeAmp,
    TildePipe,
    Bang,
    PlusPlus,
    MinusMinus,
    Arrow,
    EqualsArrow,
    LtMinusGt,
    PlusColon,
    MinusColon,
    OpenParenStar,
    StarCloseParen,

    // ------------------------------------------------------------------
    // Literals and identifiers
    // ------------------------------------------------------------------
    Identifier,
    SystemIdentifier,
    IntegerLiteral,
    UnbasedUnsizedLiteral,
    RealLiteral,
    TimeLiteral,
    StringLiteral,
    IncludeFileName,

    // ------------------------------------------------------------------
    // Preprocessing
    // ------------------------------------------------------------------
    Directive,
    MacroUsage,
    MacroQuote,
    MacroPaste,

    // ------------------------------------------------------------------
    // Special
    // ------------------------------------------------------------------
    Unknown,
    EndOfFile,
}

static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    use TokenKind::*;
    let entries: &[(&str, TokenKind)] = &[
        ("module", Module),
        ("endmodule", Endmodule),
        ("macromodule", Macromodule),
        ("program", Program),
        ("endprogram", Endprogram),
        ("interface", Interface),
        ("endinterface", Endinterface),
        ("package", Package),
        ("endpackage", Endpackage),
        ("class", Class),
        ("endclass", Endclass),
        ("extends", Extends),
        ("implements", Implements),
        ("virtual", Virtual),
        ("modport", Modport),
        ("input", Input),
        ("output", Output),
        ("inout", Inout),
        ("ref", Ref),
        ("wire", Wire),
        ("uwire", Uwire),
        ("tri", Tri),
        ("tri0", Tri0),
        ("tri1", Tri1),
        ("triand", Triand),
        ("trior", Trior),
        ("trireg", Trireg),
        ("wand", Wand),
        ("wor", Wor),
        ("supply0", Supply0),
        ("supply1", Supply1),
        ("interconnect", Interconnect),
        ("logic", Logic),
        ("reg", Reg),
        ("bit", Bit),
        ("byte", Byte),
        ("shortint", Shortint),
        ("int", Int),
        ("longint", Longint),
        ("integer", Integer),
        ("time", Time),
        ("real", Real),
        ("shortreal", Shortreal),
        ("realtime", Realtime),
        ("string", String),
        ("chandle", Chandle),
        ("event", Event),
        ("void", Void),
        ("signed", Signed),
        ("unsigned", Unsigned),
        ("packed", Packed),
        ("struct", Struct),
        ("union", Union),
        ("enum", Enum),
        ("typedef", Typedef),
        ("parameter", Parameter),
        ("localparam", Localparam),
        ("specparam", Specparam),
        ("defparam", Defparam),
        ("genvar", Genvar),
        ("generate", Generate),
        ("endgenerate", Endgenerate),
        ("assign", Assign),
        ("alias", Alias),
        ("initial", Initial),
        ("final", Final),
        ("always", Always),
        ("always_comb", AlwaysComb),
        ("always_ff", AlwaysFf),
        ("always_latch", AlwaysLatch),
        ("begin", Begin),
        ("end", End),
        ("fork", Fork),
        ("join", Join),
        ("join_any", JoinAny),
        ("join_none", JoinNone),
        ("if", If),
        ("else", Else),
        ("case", Case),
        ("casex", Casex),
        ("casez", Casez),
        ("endcase", Endcase),
        ("default", Default),
        ("for", For),
        ("foreach", Foreach),
        ("while", While),
        ("do", Do),
        ("forever", Forever),
        ("repeat", Repeat),
        ("break", Break),
        ("continue", Continue),
        ("return", Return),
        ("wait", Wait),
        ("disable", Disable),
        ("function", Function),
        ("endfunction", Endfunction),
        ("task", Task),
        ("endtask", Endtask),
        ("automatic", Automatic),
        ("static", Static),
        ("const", Const),
        ("var", Var),
        ("scalared", Scalared),
        ("vectored", Vectored),
        ("posedge", Posedge),
        ("negedge", Negedge),
        ("edge", Edge),
        ("or", Or),
        ("and", And),
        ("not", Not),
        ("xor", Xor),
        ("nand", Nand),
        ("nor", Nor),
        ("xnor", Xnor),
        ("buf", Buf),
        ("bufif0", Bufif0),
        ("bufif1", Bufif1),
        ("notif0", Notif0),
        ("notif1", Notif1),
        ("assert", Assert),
        ("assume", Assume),
        ("cover", Cover),
        ("expect", Expect),
        ("constraint", Constraint),
        ("soft", Soft),
        ("solve", Solve),
        ("before", Before),
        ("inside", Inside),
        ("dist", Dist),
        ("unique", Unique),
        ("unique0", Unique0),
        ("priority", Priority),
        ("rand", Rand),
        ("randc", Randc),
        ("randcase", Randcase),
        ("null", Null),
        ("this", This),
        ("super", Super),
        ("new", New),
        ("local", Local),
        ("protected", Protected),
        ("import", Import),
        ("export", Export),
        ("timeunit", Timeunit),
        ("timeprecision", Timeprecision),
        ("type", Type),
        ("iff", Iff),
        ("with", With),
    ];
    entries.iter().copied().collect()
});

impl TokenKind {
    /// Looks up a keyword, returning `None` for ordinary identifiers.
    pub fn from_keyword(text: &str) -> Option<TokenKind> {
        KEYWORDS.get(text).copied()
    }

    pub fn is_keyword(self) -> bool {
        (self as u16) <= (TokenKind::With as u16)
    }

    /// Canonical source text for keywords and punctuators.
    ///
    /// `None` for kinds whose text varies (identifiers, literals).
    pub fn text(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Module => "module",
            Endmodule => "endmodule",
            Macromodule => "macromodule",
            Program => "program",
            Endprogram => "endprogram",
            Interface => "interface",
            Endinterface => "endinterface",
            Package => "package",
            Endpackage => "endpackage",
            Class => "class",
            Endclass => "endclass",
            Extends => "extends",
            Implements => "implements",
            Virtual => "virtual",
            Modport => "modport",
            Input => "input",
            Output => "output",
            Inout => "inout",
            Ref => "ref",
            Wire => "wire",
            Uwire => "uwire",
            Tri => "tri",
            Tri0 => "tri0",
            Tri1 => "tri1",
            Triand => "triand",
            Trior => "trior",
            Trireg => "trireg",
            Wand => "wand",
            Wor => "wor",
            Supply0 => "supply0",
            Supply1 => "supply1",
            Interconnect => "interconnect",
            Logic => "logic",
            Reg => "reg",
            Bit => "bit",
            Byte => "byte",
            Shortint => "shortint",
            Int => "int",
            Longint => "longint",
            Integer => "integer",
            Time => "time",
            Real => "real",
            Shortreal => "shortreal",
            Realtime => "realtime",
            String => "string",
            Chandle => "chandle",
            Event => "event",
            Void => "void",
            Signed => "signed",
            Unsigned => "unsigned",
            Packed => "packed",
            Struct => "struct",
            Union => "union",
            Enum => "enum",
            Typedef => "typedef",
            Parameter => "parameter",
            Localparam => "localparam",
            Specparam => "specparam",
            Defparam => "defparam",
            Genvar => "genvar",
            Generate => "generate",
            Endgenerate => "endgenerate",
            Assign => "assign",
            Alias => "alias",
            Initial => "initial",
            Final => "final",
            Always => "always",
            AlwaysComb => "always_comb",
            AlwaysFf => "always_ff",
            AlwaysLatch => "always_latch",
            Begin => "begin",
            End => "end",
            Fork => "fork",
            Join => "join",
            JoinAny => "join_any",
            JoinNone => "join_none",
            If => "if",
            Else => "else",
            Case => "case",
            Casex => "casex",
            Casez => "casez",
            Endcase => "endcase",
            Default => "default",
            For => "for",
            Foreach => "foreach",
            While => "while",
            Do => "do",
            Forever => "forever",
            Repeat => "repeat",
            Break => "break",
            Continue => "continue",
            Return => "return",
            Wait => "wait",
            Disable => "disable",
            Function => "function",
            Endfunction => "endfunction",
            Task => "task",
            Endtask => "endtask",
            Automatic => "automatic",
            Static => "static",
            Const => "const",
            Var => "var",
            Scalared => "scalared",
            Vectored => "vectored",
            Posedge => "posedge",
            Negedge => "negedge",
            Edge => "edge",
            Or => "or",
            And => "and",
            Not => "not",
            Xor => "xor",
            Nand => "nand",
            Nor => "nor",
            Xnor => "xnor",
            Buf => "buf",
            Bufif0 => "bufif0",
            Bufif1 => "bufif1",
            Notif0 => "notif0",
            Notif1 => "notif1",
            Assert => "assert",
            Assume => "assume",
            Cover => "cover",
            Expect => "expect",
            Constraint => "constraint",
            Soft => "soft",
            Solve => "solve",
            Before => "before",
            Inside => "inside",
            Dist => "dist",
            Unique => "unique",
            Unique0 => "unique0",
            Priority => "priority",
            Rand => "rand",
            Randc => "randc",
            Randcase => "randcase",
            Null => "null",
            This => "this",
            Super => "super",
            New => "new",
            Local => "local",
            Protected => "protected",
            Import => "import",
            Export => "export",
            Timeunit => "timeunit",
            Timeprecision => "timeprecision",
            Type => "type",
            Iff => "iff",
            With => "with",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            DotStar => ".*",
            Colon => ":",
            ColonColon => "::",
            ColonEquals => ":=",
            ColonSlash => ":/",
            Apostrophe => "'",
            ApostropheLBrace => "'{",
            Hash => "#",
            DoubleHash => "##",
            At => "@",
            Dollar => "$",
            Question => "?",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            DoubleStar => "**",
            Equals => "=",
            PlusEquals => "+=",
            MinusEquals => "-=",
            StarEquals => "*=",
            SlashEquals => "/=",
            PercentEquals => "%=",
            AmpEquals => "&=",
            PipeEquals => "|=",
            CaretEquals => "^=",
            ShlEquals => "<<=",
            ShrEquals => ">>=",
            AshlEquals => "<<<=",
            AshrEquals => ">>>=",
            DoubleEquals => "==",
            NotEquals => "!=",
            CaseEquals => "===",
            CaseNotEquals => "!==",
            WildcardEquals => "==?",
            WildcardNotEquals => "!=?",
            Lt => "<",
            Lte => "<=",
            Gt => ">",
            Gte => ">=",
            Shl => "<<",
            Shr => ">>",
            Ashl => "<<<",
            Ashr => ">>>",
            Amp => "&",
            DoubleAmp => "&&",
            Pipe => "|",
            DoublePipe => "||",
            Caret => "^",
            TildeCaret => "~^",
            CaretTilde => "^~",
            Tilde => "~",
            TildeAmp => "~&",
            TildePipe => "~|",
            Bang => "!",
            PlusPlus => "++",
            MinusMinus => "--",
            Arrow => "->",
            EqualsArrow => "=>",
            LtMinusGt => "<->",
            PlusColon => "+:",
            MinusColon => "-:",
            OpenParenStar => "(*",
            StarCloseParen => "*)",
            MacroQuote => "`\"",
            MacroPaste => "``",
            _ => return None,
        })
    }
}

/// Base of a sized or based integer literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LiteralBase {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl LiteralBase {
    /// Bits contributed per digit; decimal digits do not map to fixed bits.
    pub fn bits_per_digit(self) -> u32 {
        match self {
            LiteralBase::Binary => 1,
            LiteralBase::Octal => 3,
            LiteralBase::Hex => 4,
            LiteralBase::Decimal => 0,
        }
    }

    pub fn radix(self) -> u32 {
        match self {
            LiteralBase::Binary => 2,
            LiteralBase::Octal => 8,
            LiteralBase::Decimal => 10,
            LiteralBase::Hex => 16,
        }
    }
}

/// A four-state integer literal value.
///
/// `value` and `xz` encode the four states per bit: a set `xz` bit marks
/// the position unknown, and the `value` bit then distinguishes X (0) from
/// Z (1). Known bits have `xz` clear and their logic level in `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LogicVector {
    /// Declared width in bits (32 when the literal carries no size).
    pub width: u32,
    pub base: LiteralBase,
    pub signed: bool,
    pub value: u64,
    pub xz: u64,
}

impl LogicVector {
    /// True if any bit is X or Z.
    #[inline]
    pub fn has_unknown(&self) -> bool {
        self.xz != 0
    }
}

/// Time literal units, ordered from largest to smallest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
    Picoseconds,
    Femtoseconds,
}

impl TimeUnit {
    pub fn from_suffix(text: &str) -> Option<Self> {
        Some(match text {
            "s" => Self::Seconds,
            "ms" => Self::Milliseconds,
            "us" => Self::Microseconds,
            "ns" => Self::Nanoseconds,
            "ps" => Self::Picoseconds,
            "fs" => Self::Femtoseconds,
            _ => return None,
        })
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Seconds => "s",
            Self::Milliseconds => "ms",
            Self::Microseconds => "us",
            Self::Nanoseconds => "ns",
            Self::Picoseconds => "ps",
            Self::Femtoseconds => "fs",
        }
    }
}

/// Kind-specific token payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenValue<'a> {
    None,
    /// Identifier, system identifier, directive, or macro name.
    Ident(Symbol),
    /// Unsized decimal integer.
    Integer(u64),
    /// Sized/based four-state integer.
    Vector(LogicVector),
    Real(f64),
    /// Decoded string contents (escapes resolved).
    Str(&'a str),
    Time(f64, TimeUnit),
}

/// One lexical token.
///
/// Immutable after construction. `raw` is the exact source slice (no
/// trivia); `trivia` is the leading trivia run. Synthesized tokens made by
/// parser recovery have empty raw text and the `missing` flag set.
#[derive(Clone, Copy, Debug)]
pub struct Token<'a> {
    kind: TokenKind,
    span: Span,
    raw: &'a str,
    trivia: &'a [Trivia<'a>],
    value: TokenValue<'a>,
    missing: bool,
}

static_assertions::const_assert!(std::mem::size_of::<Token<'static>>() <= 96);

impl<'a> Token<'a> {
    pub fn new(
        kind: TokenKind,
        span: Span,
        raw: &'a str,
        trivia: &'a [Trivia<'a>],
        value: TokenValue<'a>,
    ) -> Self {
        Self {
            kind,
            span,
            raw,
            trivia,
            value,
            missing: false,
        }
    }

    /// Builds a zero-width placeholder for a token the parser expected but
    /// did not find.
    pub fn missing(kind: TokenKind, location: Span) -> Self {
        Self {
            kind,
            span: Span::point(location.file, location.start),
            raw: "",
            trivia: &[],
            value: TokenValue::None,
            missing: true,
        }
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    #[inline]
    pub fn span(&self) -> Span {
        self.span
    }

    #[inline]
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    #[inline]
    pub fn trivia(&self) -> &'a [Trivia<'a>] {
        self.trivia
    }

    #[inline]
    pub fn value(&self) -> TokenValue<'a> {
        self.value
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfFile
    }

    /// Interned symbol for identifier-like tokens.
    pub fn ident(&self) -> Option<Symbol> {
        match self.value {
            TokenValue::Ident(sym) => Some(sym),
            _ => None,
        }
    }

    /// Derives a token with different leading trivia.
    pub fn with_trivia(self, trivia: &'a [Trivia<'a>]) -> Self {
        Self { trivia, ..self }
    }

    /// Derives a token relocated to `span`.
    ///
    /// Used by macro expansion so every expanded token reports the use
    /// site, keeping stream locations monotone.
    pub fn with_span(self, span: Span) -> Self {
        Self { span, ..self }
    }

    /// Derives a token with a different kind, keeping text and payload.
    pub fn with_kind(self, kind: TokenKind) -> Self {
        Self { kind, ..self }
    }

    /// Appends leading trivia and raw text to `out`, reconstructing the
    /// exact source bytes this token covers.
    pub fn write_to(&self, out: &mut std::string::String) {
        for t in self.trivia {
            out.push_str(t.raw);
        }
        out.push_str(self.raw);
    }

    /// Displayable text: raw text if present, else the kind's canonical
    /// text (for missing tokens).
    pub fn display_text(&self) -> &str {
        if !self.raw.is_empty() {
            self.raw
        } else {
            self.kind.text().unwrap_or("")
        }
    }
}

impl PartialEq for Token<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_util::FileId;

    fn span(start: u32, end: u32) -> Span {
        Span::new(FileId(0), start, end)
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::from_keyword("module"), Some(TokenKind::Module));
        assert_eq!(TokenKind::from_keyword("always_ff"), Some(TokenKind::AlwaysFf));
        assert_eq!(TokenKind::from_keyword("clk"), None);
        assert_eq!(TokenKind::from_keyword("Module"), None);
    }

    #[test]
    fn test_keyword_text_matches_lookup() {
        for kind in [TokenKind::Module, TokenKind::AlwaysComb, TokenKind::Unique0] {
            let text = kind.text().unwrap();
            assert_eq!(TokenKind::from_keyword(text), Some(kind));
        }
    }

    #[test]
    fn test_punctuator_text() {
        assert_eq!(TokenKind::AshlEquals.text(), Some("<<<="));
        assert_eq!(TokenKind::CaseEquals.text(), Some("==="));
        assert_eq!(TokenKind::Identifier.text(), None);
    }

    #[test]
    fn test_equality_ignores_location() {
        let a = Token::new(
            TokenKind::Semicolon,
            span(0, 1),
            ";",
            &[],
            TokenValue::None,
        );
        let b = Token::new(
            TokenKind::Semicolon,
            span(40, 41),
            ";",
            &[],
            TokenValue::None,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_token() {
        let t = Token::missing(TokenKind::Semicolon, span(7, 7));
        assert!(t.is_missing());
        assert_eq!(t.raw(), "");
        assert_eq!(t.display_text(), ";");
        assert_eq!(t.span().start, 7);
    }

    #[test]
    fn test_write_to_includes_trivia() {
        let trivia = [Trivia::new(crate::trivia::TriviaKind::Whitespace, "  ")];
        let t = Token::new(
            TokenKind::Identifier,
            span(2, 5),
            "clk",
            &trivia,
            TokenValue::Ident(Symbol::intern("clk")),
        );
        let mut out = std::string::String::new();
        t.write_to(&mut out);
        assert_eq!(out, "  clk");
    }

    #[test]
    fn test_logic_vector_unknown() {
        let v = LogicVector {
            width: 4,
            base: LiteralBase::Binary,
            signed: false,
            value: 0b1010,
            xz: 0,
        };
        assert!(!v.has_unknown());
        let x = LogicVector { xz: 0b0100, ..v };
        assert!(x.has_unknown());
    }

    #[test]
    fn test_time_unit_suffixes() {
        assert_eq!(TimeUnit::from_suffix("ns"), Some(TimeUnit::Nanoseconds));
        assert_eq!(TimeUnit::from_suffix("fs"), Some(TimeUnit::Femtoseconds));
        assert_eq!(TimeUnit::from_suffix("ks"), None);
        assert_eq!(TimeUnit::Picoseconds.suffix(), "ps");
    }
}

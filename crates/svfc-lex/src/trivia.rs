//! Trivia: whitespace, comments, and preprocessing residue.
//!
//! Trivia is not part of the grammar but every byte of it is preserved so
//! source text can be reconstructed from a token stream. Each token carries
//! the trivia that precedes it; the end-of-file token carries whatever
//! trails the buffer.

/// The directives the preprocessor understands.
///
/// A backtick-led identifier that matches none of these is a user macro
/// usage instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Include,
    Define,
    Undef,
    UndefineAll,
    Ifdef,
    Ifndef,
    Else,
    Elsif,
    Endif,
    Timescale,
    DefaultNettype,
    Line,
    ResetAll,
    CellDefine,
    EndCellDefine,
    Pragma,
    BeginKeywords,
    EndKeywords,
}

impl DirectiveKind {
    /// Maps a directive name (without the backtick) to its kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "include" => Self::Include,
            "define" => Self::Define,
            "undef" => Self::Undef,
            "undefineall" => Self::UndefineAll,
            "ifdef" => Self::Ifdef,
            "ifndef" => Self::Ifndef,
            "else" => Self::Else,
            "elsif" => Self::Elsif,
            "endif" => Self::Endif,
            "timescale" => Self::Timescale,
            "default_nettype" => Self::DefaultNettype,
            "line" => Self::Line,
            "resetall" => Self::ResetAll,
            "celldefine" => Self::CellDefine,
            "endcelldefine" => Self::EndCellDefine,
            "pragma" => Self::Pragma,
            "begin_keywords" => Self::BeginKeywords,
            "end_keywords" => Self::EndKeywords,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Define => "define",
            Self::Undef => "undef",
            Self::UndefineAll => "undefineall",
            Self::Ifdef => "ifdef",
            Self::Ifndef => "ifndef",
            Self::Else => "else",
            Self::Elsif => "elsif",
            Self::Endif => "endif",
            Self::Timescale => "timescale",
            Self::DefaultNettype => "default_nettype",
            Self::Line => "line",
            Self::ResetAll => "resetall",
            Self::CellDefine => "celldefine",
            Self::EndCellDefine => "endcelldefine",
            Self::Pragma => "pragma",
            Self::BeginKeywords => "begin_keywords",
            Self::EndKeywords => "end_keywords",
        }
    }
}

/// Classification of one piece of trivia.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriviaKind {
    /// Spaces and tabs.
    Whitespace,
    /// A line ending (`\n` or `\r\n`).
    EndOfLine,
    /// Backslash immediately followed by a line ending; continues a
    /// directive onto the next line.
    LineContinuation,
    /// `// ...` up to the line ending.
    LineComment,
    /// `/* ... */`.
    BlockComment,
    /// A fully consumed preprocessor directive line.
    Directive(DirectiveKind),
    /// Tokens the parser skipped while resynchronizing after an error.
    SkippedTokens,
    /// Text dropped by a false conditional-compilation branch.
    DisabledText,
}

/// One piece of trivia with its raw source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trivia<'a> {
    pub kind: TriviaKind,
    pub raw: &'a str,
}

impl<'a> Trivia<'a> {
    #[inline]
    pub fn new(kind: TriviaKind, raw: &'a str) -> Self {
        Self { kind, raw }
    }

    /// True for whitespace and line-ending trivia.
    pub fn is_whitespace(&self) -> bool {
        matches!(
            self.kind,
            TriviaKind::Whitespace | TriviaKind::EndOfLine | TriviaKind::LineContinuation
        )
    }

    /// True if this trivia contains a line ending.
    pub fn is_end_of_line(&self) -> bool {
        matches!(self.kind, TriviaKind::EndOfLine)
    }
}

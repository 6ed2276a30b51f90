//! svfc-pre - SystemVerilog preprocessor.
//!
//! Owns the token stream the parser actually consumes. Raw tokens are
//! pulled from a stack of lexers (one per include file); directives are
//! recognized and fully consumed here, macro usages are expanded in place,
//! and conditionally disabled regions are dropped. What survives is a
//! stream of plain tokens in which every directive line lives on as
//! trivia, so reconstruction of the original text still works for
//! everything except macro-expanded spans (whose text is replaced by
//! definition).
//!
//! The parser-facing surface is a bidirectional peek buffer:
//! [`Preprocessor::peek`] is valid for offsets 0..=3 and
//! [`Preprocessor::consume`] advances. End of input is idempotent.

mod condition;
mod directive;
mod macros;

pub use condition::{CondFrame, CondState};
pub use macros::{MacroBodyPiece, MacroDef, MacroFormal, MacroInvocation};

use std::collections::VecDeque;

use indexmap::IndexMap;
use svfc_lex::{DirectiveKind, Lexer, TimeUnit, Token, TokenKind, Trivia, TriviaKind};
use svfc_util::{Arena, DiagnosticCode, FileId, Handler, SourceMap, Symbol};

/// Net type selected by `default_nettype`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultNetType {
    Wire,
    Tri,
    Tri0,
    Tri1,
    Wand,
    Wor,
    Trireg,
    Uwire,
    /// `default_nettype none: implicit nets are disallowed.
    None,
}

/// Recorded `timescale values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub unit: (f64, TimeUnit),
    pub precision: (f64, TimeUnit),
}

/// Recorded `line override.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDirective {
    pub line: u64,
    pub file: String,
    pub level: u8,
}

/// Configuration for one preprocessing run.
#[derive(Clone, Debug)]
pub struct PreprocessorOptions {
    /// Hard bound on include nesting.
    pub max_include_depth: usize,
    /// Directories tried, in order, when resolving `include paths.
    pub include_search_dirs: Vec<String>,
    /// (name, body) pairs defined before the root file is read.
    pub predefines: Vec<(String, String)>,
    /// When set, `default_nettype is restored at the end of each include
    /// file instead of propagating to the includer.
    pub reset_nettype_on_include: bool,
}

impl Default for PreprocessorOptions {
    fn default() -> Self {
        Self {
            max_include_depth: 64,
            include_search_dirs: Vec::new(),
            predefines: Vec::new(),
            reset_nettype_on_include: false,
        }
    }
}

struct IncludeFrame<'a> {
    lexer: Lexer<'a>,
    file: FileId,
    /// Net type to restore when this file ends, if isolation is on.
    saved_nettype: Option<DefaultNetType>,
}

/// The preprocessor: directive handling, macro expansion, conditional
/// inclusion, and the include stack, behind a small peek window.
///
/// # Example
///
/// ```
/// use svfc_pre::{Preprocessor, PreprocessorOptions};
/// use svfc_util::{Arena, Handler, SourceMap};
/// use svfc_lex::TokenKind;
///
/// let mut sources = SourceMap::new();
/// let root = sources.add_file("top.sv", "`define WIDTH 8\nwire [`WIDTH-1:0] w;\n");
/// let arena = Arena::new();
/// let handler = Handler::new();
/// let mut pp = Preprocessor::new(&arena, &sources, &handler, root, PreprocessorOptions::default());
///
/// assert_eq!(pp.peek(0).kind(), TokenKind::Wire);
/// pp.consume();
/// assert_eq!(pp.peek(0).kind(), TokenKind::LBracket);
/// assert_eq!(pp.peek(1).kind(), TokenKind::IntegerLiteral); // 8, expanded
/// ```
pub struct Preprocessor<'a> {
    arena: &'a Arena,
    sources: &'a SourceMap,
    handler: &'a Handler,
    options: PreprocessorOptions,

    /// Include stack; the innermost file is last.
    stack: Vec<IncludeFrame<'a>>,
    /// Raw-stream pushback used for line-boundary detection.
    pushback: Option<Token<'a>>,
    /// End-of-file token of the outermost buffer, once reached.
    root_eof: Option<Token<'a>>,
    /// Finalized EOF (pending trivia attached), returned forever after.
    done_eof: Option<Token<'a>>,

    /// Macro table in definition order.
    macros: IndexMap<Symbol, MacroDef<'a>>,
    /// Names currently being expanded; the recursion guard.
    expansion_stack: Vec<Symbol>,
    /// Tokens produced by macro expansion, awaiting emission.
    expanded: VecDeque<Token<'a>>,
    /// Every macro invocation seen, for expansion-trail reporting.
    invocations: Vec<MacroInvocation>,

    /// Conditional-inclusion frames.
    cond_stack: Vec<CondFrame>,
    /// Trivia (directives, disabled text, include residue) awaiting the
    /// next surviving token.
    pending_trivia: Vec<Trivia<'a>>,

    /// Parser-visible lookahead window.
    window: VecDeque<Token<'a>>,

    default_nettype: DefaultNetType,
    timescale: Option<TimeScale>,
    line_directive: Option<LineDirective>,
    keyword_versions: Vec<String>,
    in_celldefine: bool,
}

impl<'a> Preprocessor<'a> {
    /// Guaranteed peek horizon: `peek(n)` is valid for `n < PEEK_WINDOW`.
    pub const PEEK_WINDOW: usize = 4;

    /// Creates a preprocessor reading from `root`.
    ///
    /// # Panics
    ///
    /// Panics if `root` is not registered in `sources`.
    pub fn new(
        arena: &'a Arena,
        sources: &'a SourceMap,
        handler: &'a Handler,
        root: FileId,
        options: PreprocessorOptions,
    ) -> Self {
        let mut pp = Self {
            arena,
            sources,
            handler,
            options,
            stack: Vec::new(),
            pushback: None,
            root_eof: None,
            done_eof: None,
            macros: IndexMap::new(),
            expansion_stack: Vec::new(),
            expanded: VecDeque::new(),
            invocations: Vec::new(),
            cond_stack: Vec::new(),
            pending_trivia: Vec::new(),
            window: VecDeque::new(),
            default_nettype: DefaultNetType::Wire,
            timescale: None,
            line_directive: None,
            keyword_versions: Vec::new(),
            in_celldefine: false,
        };

        let content = pp.sources.file(root).content();
        pp.stack.push(IncludeFrame {
            lexer: Lexer::new(arena, handler, root, content),
            file: root,
            saved_nettype: None,
        });

        // Command-line style predefines run before the root file.
        if !pp.options.predefines.is_empty() {
            let mut text = String::new();
            for (name, body) in &pp.options.predefines {
                text.push_str(&format!("`define {} {}\n", name, body));
            }
            let text = arena.alloc_str(&text);
            pp.stack.push(IncludeFrame {
                lexer: Lexer::new(arena, handler, FileId::DUMMY, text),
                file: FileId::DUMMY,
                saved_nettype: None,
            });
        }

        pp
    }

    // ------------------------------------------------------------------
    // Parser-facing surface
    // ------------------------------------------------------------------

    /// Token `n` positions ahead without consuming anything.
    ///
    /// Valid for any `n`, but only `n < PEEK_WINDOW` is contractual; the
    /// parser's speculative scanners stay within that horizon.
    pub fn peek(&mut self, n: usize) -> Token<'a> {
        while self.window.len() <= n {
            let token = self.next_processed();
            self.window.push_back(token);
        }
        self.window[n]
    }

    /// Consumes and returns the next token.
    pub fn consume(&mut self) -> Token<'a> {
        self.peek(0);
        self.window.pop_front().expect("peek filled the window")
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// True if `name` is currently defined as a macro.
    pub fn is_macro_defined(&self, name: &str) -> bool {
        self.macros.contains_key(&Symbol::intern(name))
    }

    /// The macro table entry for `name`.
    pub fn macro_def(&self, name: &str) -> Option<&MacroDef<'a>> {
        self.macros.get(&Symbol::intern(name))
    }

    /// Every macro invocation seen so far, in expansion order.
    pub fn invocations(&self) -> &[MacroInvocation] {
        &self.invocations
    }

    pub fn default_nettype(&self) -> DefaultNetType {
        self.default_nettype
    }

    pub fn timescale(&self) -> Option<TimeScale> {
        self.timescale
    }

    pub fn line_directive(&self) -> Option<&LineDirective> {
        self.line_directive.as_ref()
    }

    pub fn in_celldefine(&self) -> bool {
        self.in_celldefine
    }

    // ------------------------------------------------------------------
    // Raw stream
    // ------------------------------------------------------------------

    /// Next token straight from the lexer stack, before any directive or
    /// macro processing. Pops include frames at their end of file.
    pub(crate) fn next_raw(&mut self) -> Token<'a> {
        if let Some(token) = self.pushback.take() {
            // An EOF pushback is only a line-boundary marker; the lexer
            // will hand the same token back.
            if !token.is_eof() {
                return token;
            }
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                return self.root_eof.expect("stack was non-empty at construction");
            };

            let token = frame.lexer.lex();
            if !token.is_eof() {
                return token;
            }

            // This buffer is exhausted: keep its trailing trivia and pop.
            self.pending_trivia.extend_from_slice(token.trivia());
            let frame = self.stack.pop().expect("frame was just observed");
            if let Some(net) = frame.saved_nettype {
                self.default_nettype = net;
            }

            if self.stack.is_empty() {
                let eof = token.with_trivia(&[]);
                self.root_eof = Some(eof);
                return eof;
            }
            log::debug!("leaving include file {:?}", frame.file);
        }
    }

    // ------------------------------------------------------------------
    // Processed stream
    // ------------------------------------------------------------------

    fn next_processed(&mut self) -> Token<'a> {
        loop {
            if let Some(token) = self.expanded.pop_front() {
                return self.attach_pending(token);
            }
            if let Some(done) = self.done_eof {
                return done;
            }

            let token = self.next_raw();
            match token.kind() {
                TokenKind::Directive => self.handle_directive(token),
                TokenKind::MacroUsage => {
                    self.pending_trivia.extend_from_slice(token.trivia());
                    let usage = token.with_trivia(&[]);
                    self.expand_usage(usage);
                }
                TokenKind::EndOfFile => {
                    if !self.cond_stack.is_empty() {
                        self.handler.report(
                            DiagnosticCode::E_PP_UNTERMINATED_CONDITIONAL,
                            token.span(),
                            "conditional block not terminated before end of input",
                        );
                        self.cond_stack.clear();
                    }
                    let finished = self.attach_pending(token);
                    self.done_eof = Some(finished);
                    return finished;
                }
                _ => return self.attach_pending(token),
            }
        }
    }

    /// Prepends accumulated trivia to `token`'s own leading trivia.
    fn attach_pending(&mut self, token: Token<'a>) -> Token<'a> {
        if self.pending_trivia.is_empty() {
            return token;
        }
        let mut combined = std::mem::take(&mut self.pending_trivia);
        combined.extend_from_slice(token.trivia());
        token.with_trivia(self.arena.alloc_slice(&combined))
    }

    /// Records a fully consumed directive line as trivia.
    pub(crate) fn push_directive_trivia(&mut self, kind: DirectiveKind, text: String) {
        let raw = self.arena.alloc_str(&text);
        self.pending_trivia
            .push(Trivia::new(TriviaKind::Directive(kind), raw));
    }

    // ------------------------------------------------------------------
    // Directive dispatch
    // ------------------------------------------------------------------

    fn handle_directive(&mut self, token: Token<'a>) {
        let kind = token
            .ident()
            .and_then(|sym| DirectiveKind::from_name(sym.as_str()))
            .expect("lexer only marks known directive names");

        self.pending_trivia.extend_from_slice(token.trivia());
        let directive = token.with_trivia(&[]);
        let mut text = String::from(directive.raw());
        let mut needs_skip = false;

        match kind {
            DirectiveKind::Include => self.handle_include(directive, &mut text),
            DirectiveKind::Define => self.handle_define(directive, &mut text),
            DirectiveKind::Undef => self.handle_undef(directive, &mut text),
            DirectiveKind::UndefineAll => self.macros.clear(),
            DirectiveKind::Ifdef | DirectiveKind::Ifndef => {
                needs_skip = self.handle_ifdef(kind, directive, &mut text);
            }
            DirectiveKind::Else | DirectiveKind::Elsif => {
                needs_skip = self.handle_else_like(kind, directive, &mut text);
            }
            DirectiveKind::Endif => self.handle_endif(directive),
            DirectiveKind::Timescale => self.handle_timescale(directive, &mut text),
            DirectiveKind::DefaultNettype => self.handle_default_nettype(directive, &mut text),
            DirectiveKind::Line => self.handle_line(directive, &mut text),
            DirectiveKind::ResetAll => self.handle_resetall(),
            DirectiveKind::CellDefine => self.in_celldefine = true,
            DirectiveKind::EndCellDefine => self.in_celldefine = false,
            DirectiveKind::Pragma => self.handle_pragma(&mut text),
            DirectiveKind::BeginKeywords => self.handle_begin_keywords(&mut text),
            DirectiveKind::EndKeywords => self.handle_end_keywords(directive),
        }

        self.push_directive_trivia(kind, text);

        if needs_skip {
            self.skip_disabled_text();
        }
    }

    // ------------------------------------------------------------------
    // Includes
    // ------------------------------------------------------------------

    fn handle_include(&mut self, directive: Token<'a>, text: &mut String) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        let filename = frame.lexer.lex_include_filename();

        if filename.kind() != TokenKind::IncludeFileName {
            self.handler.report(
                DiagnosticCode::E_PP_BAD_INCLUDE_FILENAME,
                directive.span(),
                "expected \"filename\" or <filename> after '`include'",
            );
            self.pushback = Some(filename);
            return;
        }
        filename.write_to(text);

        let svfc_lex::TokenValue::Str(path) = filename.value() else {
            return;
        };

        let dirs: Vec<&str> = self
            .options
            .include_search_dirs
            .iter()
            .map(|s| s.as_str())
            .collect();
        let Some(id) = self.sources.resolve(path, &dirs) else {
            self.handler.report(
                DiagnosticCode::E_PP_INCLUDE_NOT_FOUND,
                filename.span(),
                format!("include file '{}' not found", path),
            );
            return;
        };

        if self.stack.iter().any(|f| f.file == id) {
            self.handler.report(
                DiagnosticCode::E_PP_INCLUDE_CYCLE,
                filename.span(),
                format!("include cycle through '{}'", path),
            );
            return;
        }

        if self.stack.len() >= self.options.max_include_depth {
            self.handler.report(
                DiagnosticCode::E_PP_INCLUDE_TOO_DEEP,
                filename.span(),
                format!(
                    "include nesting exceeds {} levels",
                    self.options.max_include_depth
                ),
            );
            return;
        }

        log::debug!("entering include file '{}'", path);
        let saved_nettype = self
            .options
            .reset_nettype_on_include
            .then_some(self.default_nettype);
        let content = self.sources.file(id).content();
        self.stack.push(IncludeFrame {
            lexer: Lexer::new(self.arena, self.handler, id, content),
            file: id,
            saved_nettype,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svfc_lex::{LiteralBase, TokenValue};

    fn run<'a>(
        arena: &'a Arena,
        handler: &'a Handler,
        sources: &'a SourceMap,
        root: FileId,
        options: PreprocessorOptions,
    ) -> (Vec<Token<'a>>, Preprocessor<'a>) {
        let mut pp = Preprocessor::new(arena, sources, handler, root, options);
        let mut tokens = Vec::new();
        loop {
            let token = pp.consume();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, pp)
    }

    fn single_file<'a>(sources: &mut SourceMap, text: &str) -> FileId {
        sources.add_file("test.sv", text)
    }

    fn kinds(tokens: &[Token<'_>]) -> Vec<TokenKind> {
        tokens
            .iter()
            .filter(|t| !t.is_eof())
            .map(|t| t.kind())
            .collect()
    }

    fn reconstruct(tokens: &[Token<'_>]) -> String {
        let mut out = String::new();
        for token in tokens {
            token.write_to(&mut out);
        }
        out
    }

    #[test]
    fn test_object_macro_expansion() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define X 42\n`X+1\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, pp) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Plus,
                TokenKind::IntegerLiteral,
            ]
        );
        assert_eq!(tokens[0].value(), TokenValue::Integer(42));
        assert_eq!(tokens[2].value(), TokenValue::Integer(1));
        assert!(pp.is_macro_defined("X"));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_function_macro_with_args() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define ADD(a, b) a + b\n`ADD(1, 2)\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Plus,
                TokenKind::IntegerLiteral,
            ]
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_macro_default_argument() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define D(x = 5) x\n`D()\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(kinds(&tokens), vec![TokenKind::IntegerLiteral]);
        assert_eq!(tokens[0].value(), TokenValue::Integer(5));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_token_pasting() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define CAT(a, b) a``b\n`CAT(foo, bar)\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(kinds(&tokens), vec![TokenKind::Identifier]);
        assert_eq!(tokens[0].raw(), "foobar");
    }

    #[test]
    fn test_stringification() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define S(x) `\"x`\"\n`S(hello)\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(kinds(&tokens), vec![TokenKind::StringLiteral]);
        assert_eq!(tokens[0].value(), TokenValue::Str("hello"));
    }

    #[test]
    fn test_stringification_joins_with_spaces() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define S(x) `\"x + x`\"\n`S(a)\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(tokens[0].value(), TokenValue::Str("a + a"));
    }

    #[test]
    fn test_recursive_macro_emitted_verbatim_once() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define M x `M y\n`M\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        let usages: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind() == TokenKind::MacroUsage)
            .collect();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].ident().unwrap().as_str(), "M");
        // The non-recursive parts expanded normally.
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::MacroUsage,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_nested_macro_expansion() {
        let mut sources = SourceMap::new();
        let root = single_file(
            &mut sources,
            "`define INNER 7\n`define OUTER `INNER + `INNER\n`OUTER\n",
        );
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Plus,
                TokenKind::IntegerLiteral,
            ]
        );
    }

    #[test]
    fn test_function_macro_without_args_diagnosed() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define F(x) x\n`F\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let _ = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_arity_mismatch_diagnosed() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define F(a, b) a b\n`F(1, 2, 3)\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let _ = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_undefined_macro_diagnosed() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`NOPE\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
        assert_eq!(kinds(&tokens), Vec::<TokenKind>::new());
    }

    #[test]
    fn test_undef_removes_macro() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define A 1\n`undef A\n`A\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (_, pp) = run(&arena, &handler, &sources, root, Default::default());
        assert!(!pp.is_macro_defined("A"));
        assert!(handler.has_errors());
    }

    #[test]
    fn test_macro_redefinition_warns() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`define A 1\n`define A 2\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let _ = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn test_conditional_false_branch_dropped() {
        let mut sources = SourceMap::new();
        let root = single_file(
            &mut sources,
            "`ifdef FOO\nx = 1;\n`else\ny = 2;\n`endif\n",
        );
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::IntegerLiteral,
                TokenKind::Semicolon,
            ]
        );
        assert_eq!(tokens[0].raw(), "y");

        // The dropped branch is preserved as disabled-text trivia on `y`.
        let disabled: Vec<_> = tokens[0]
            .trivia()
            .iter()
            .filter(|t| t.kind == TriviaKind::DisabledText)
            .collect();
        assert_eq!(disabled.len(), 1);
        assert!(disabled[0].raw.contains("x = 1;"));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_conditional_taken_branch() {
        let mut sources = SourceMap::new();
        let root = single_file(
            &mut sources,
            "`define FOO\n`ifdef FOO\nx = 1;\n`else\ny = 2;\n`endif\n",
        );
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(tokens[0].raw(), "x");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_elsif_chain() {
        let mut sources = SourceMap::new();
        let root = single_file(
            &mut sources,
            "`define B\n`ifdef A\na;\n`elsif B\nb;\n`elsif C\nc;\n`else\nd;\n`endif\n",
        );
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(tokens[0].raw(), "b");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Semicolon]
        );
    }

    #[test]
    fn test_nested_conditionals_in_skipped_region() {
        let mut sources = SourceMap::new();
        let root = single_file(
            &mut sources,
            "`ifdef A\n`ifdef B\nx;\n`endif\ny;\n`endif\nz;\n",
        );
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(tokens[0].raw(), "z");
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_conditional_neutrality_law() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let with_cond = sources.add_file("a.sv", "`ifdef NOPE\njunk here\n`endif\nwire w;\n");
        let without = sources.add_file("b.sv", "wire w;\n");

        let (cond_tokens, _) = run(&arena, &handler, &sources, with_cond, Default::default());
        let (plain_tokens, _) = run(&arena, &handler, &sources, without, Default::default());
        assert_eq!(kinds(&cond_tokens), kinds(&plain_tokens));
    }

    #[test]
    fn test_unbalanced_endif_diagnosed() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`endif\nwire w;\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
        // The stream continues after the bad directive.
        assert_eq!(tokens[0].kind(), TokenKind::Wire);
    }

    #[test]
    fn test_unterminated_conditional_recovers_at_eof() {
        let mut sources = SourceMap::new();
        let root = single_file(&mut sources, "`ifdef NOPE\nnever\n");
        let arena = Arena::new();
        let handler = Handler::new();
        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
        assert!(tokens.last().unwrap().is_eof());
    }

    #[test]
    fn test_include_expansion() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let _inc = sources.add_file("defs.svh", "`define WIDTH 8\n");
        let root = sources.add_file("top.sv", "`include \"defs.svh\"\nwire [`WIDTH:0] w;\n");

        let (tokens, pp) = run(&arena, &handler, &sources, root, Default::default());
        assert!(pp.is_macro_defined("WIDTH"));
        assert!(!handler.has_errors());
        assert_eq!(tokens[0].kind(), TokenKind::Wire);
        // The 8 from the include-defined macro made it into the stream.
        assert!(tokens
            .iter()
            .any(|t| t.value() == TokenValue::Integer(8)));
    }

    #[test]
    fn test_include_tokens_inline() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let _inc = sources.add_file("body.svh", "wire inner;\n");
        let root = sources.add_file("top.sv", "`include \"body.svh\"\nwire outer;\n");

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        let names: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind() == TokenKind::Identifier)
            .map(|t| t.raw())
            .collect();
        assert_eq!(names, vec!["inner", "outer"]);
    }

    #[test]
    fn test_include_cycle_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        sources.add_file("a.svh", "`include \"b.svh\"\n");
        sources.add_file("b.svh", "`include \"a.svh\"\n");
        let root = sources.add_file("top.sv", "`include \"a.svh\"\n");

        let _ = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_include_not_found_diagnosed() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`include \"missing.svh\"\n");
        let _ = run(&arena, &handler, &sources, root, Default::default());
        assert!(handler.has_errors());
    }

    #[test]
    fn test_include_search_dirs() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        sources.add_file("rtl/inc/defs.svh", "`define OK 1\n");
        let root = sources.add_file("top.sv", "`include \"defs.svh\"\n");

        let options = PreprocessorOptions {
            include_search_dirs: vec!["rtl/inc".to_string()],
            ..Default::default()
        };
        let (_, pp) = run(&arena, &handler, &sources, root, options);
        assert!(pp.is_macro_defined("OK"));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_predefines() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`ifdef SYNTHESIS\nwire w;\n`endif\n");

        let options = PreprocessorOptions {
            predefines: vec![("SYNTHESIS".to_string(), "1".to_string())],
            ..Default::default()
        };
        let (tokens, _) = run(&arena, &handler, &sources, root, options);
        assert_eq!(tokens[0].kind(), TokenKind::Wire);
    }

    #[test]
    fn test_timescale_recorded() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`timescale 1ns / 100ps\nwire w;\n");

        let (_, pp) = run(&arena, &handler, &sources, root, Default::default());
        let scale = pp.timescale().expect("timescale was recorded");
        assert_eq!(scale.unit, (1.0, TimeUnit::Nanoseconds));
        assert_eq!(scale.precision, (100.0, TimeUnit::Picoseconds));
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_default_nettype_recorded() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`default_nettype none\nwire w;\n");

        let (_, pp) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(pp.default_nettype(), DefaultNetType::None);
    }

    #[test]
    fn test_default_nettype_propagates_from_include_by_default() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        sources.add_file("n.svh", "`default_nettype none\n");
        let root = sources.add_file("top.sv", "`include \"n.svh\"\nwire w;\n");

        let (_, pp) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(pp.default_nettype(), DefaultNetType::None);
    }

    #[test]
    fn test_default_nettype_isolated_when_requested() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        sources.add_file("n.svh", "`default_nettype none\n");
        let root = sources.add_file("top.sv", "`include \"n.svh\"\nwire w;\n");

        let options = PreprocessorOptions {
            reset_nettype_on_include: true,
            ..Default::default()
        };
        let (_, pp) = run(&arena, &handler, &sources, root, options);
        assert_eq!(pp.default_nettype(), DefaultNetType::Wire);
    }

    #[test]
    fn test_directive_lines_preserved_as_trivia() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let text = "`timescale 1ns / 1ps\nwire w;\n";
        let root = sources.add_file("top.sv", text);

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(reconstruct(&tokens), text);
        assert!(tokens[0]
            .trivia()
            .iter()
            .any(|t| t.kind == TriviaKind::Directive(DirectiveKind::Timescale)));
    }

    #[test]
    fn test_conditional_roundtrip_losslessness() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let text = "`ifdef FOO\nx = 1;\n`else\ny = 2;\n`endif\nwire w;\n";
        let root = sources.add_file("top.sv", text);

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(reconstruct(&tokens), text);
    }

    #[test]
    fn test_line_continuation_in_define() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`define TWO 1 + \\\n 2\n`TWO\n");

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::Plus,
                TokenKind::IntegerLiteral,
            ]
        );
        assert!(!handler.has_errors());
    }

    #[test]
    fn test_peek_window() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "a b c d e\n");

        let mut pp = Preprocessor::new(&arena, &sources, &handler, root, Default::default());
        assert_eq!(pp.peek(3).raw(), "d");
        assert_eq!(pp.peek(0).raw(), "a");
        assert_eq!(pp.consume().raw(), "a");
        assert_eq!(pp.peek(3).raw(), "e");
    }

    #[test]
    fn test_eof_idempotent() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "x\n");

        let mut pp = Preprocessor::new(&arena, &sources, &handler, root, Default::default());
        pp.consume();
        let eof1 = pp.consume();
        let eof2 = pp.consume();
        assert!(eof1.is_eof() && eof2.is_eof());
        assert_eq!(eof1.span(), eof2.span());
    }

    #[test]
    fn test_expanded_tokens_located_at_use_site() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`define V 1\nwire w;\n`V\n");

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        // Locations stay monotone even through expansion.
        let real: Vec<_> = tokens.iter().filter(|t| !t.is_eof()).collect();
        for pair in real.windows(2) {
            assert!(pair[0].span().start <= pair[1].span().start);
        }
    }

    #[test]
    fn test_macro_vector_literal() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`define ZERO 1'b0\n`ZERO\n");

        let (tokens, _) = run(&arena, &handler, &sources, root, Default::default());
        match tokens[0].value() {
            TokenValue::Vector(v) => {
                assert_eq!(v.width, 1);
                assert_eq!(v.base, LiteralBase::Binary);
                assert_eq!(v.value, 0);
            }
            other => panic!("expected vector, got {:?}", other),
        }
    }

    #[test]
    fn test_invocation_trail_recorded() {
        let arena = Arena::new();
        let handler = Handler::new();
        let mut sources = SourceMap::new();
        let root = sources.add_file("top.sv", "`define A `B\n`define B 1\n`A\n");

        let (_, pp) = run(&arena, &handler, &sources, root, Default::default());
        let names: Vec<_> = pp
            .invocations()
            .iter()
            .map(|inv| (inv.name.as_str(), inv.depth))
            .collect();
        assert_eq!(names, vec![("A", 0), ("B", 1)]);
    }
}

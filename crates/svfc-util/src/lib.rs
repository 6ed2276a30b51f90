//! svfc-util - Foundation types for the svfc SystemVerilog front end.
//!
//! This crate provides the infrastructure every compilation stage leans on:
//!
//! - [`arena`]: a bump allocator that owns all tokens, trivia, syntax nodes,
//!   and semantic nodes for one compilation unit. Freed wholesale.
//! - [`symbol`]: a thread-safe string interner producing compact [`Symbol`]
//!   handles. SystemVerilog keywords are pre-interned at startup.
//! - [`span`]: byte-offset source locations ([`Span`], [`FileId`]) and the
//!   [`SourceMap`] that registers buffers and computes line/column info.
//! - [`diagnostic`]: the diagnostic sink. Stages report through a shared
//!   [`Handler`]; codes are partitioned by stage (E1xxx lexing, E2xxx
//!   preprocessing, E3xxx parsing, E4xxx binding).
//! - [`index_vec`]: typed-index vectors so file ids and similar handles
//!   cannot be mixed up at compile time.
//!
//! Nothing in this crate performs I/O. Callers register source buffers with
//! the [`SourceMap`] up front; include resolution works against those
//! registered buffers only.

pub mod arena;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use arena::Arena;
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level};
pub use error::SourceError;
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

// Re-export commonly used hash collections
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;

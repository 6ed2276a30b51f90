//! Source manager: registered buffers, include resolution, line tables.
//!
//! The front end performs no file I/O. The driver registers every buffer
//! (top-level files and anything includable) before compilation starts;
//! `resolve` then answers include lookups purely against the registered
//! names, trying each search directory prefix in order.

use crate::error::SourceError;
use crate::index_vec::{Idx, IndexVec};
use crate::span::{FileId, Span};

/// A registered source buffer with its precomputed line table.
pub struct SourceFile {
    id: FileId,
    name: String,
    content: String,
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, name: String, content: String) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in content.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self {
            id,
            name,
            content,
            line_starts,
        }
    }

    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based (line, column) for a byte offset.
    ///
    /// Column counts bytes from the line start; multi-byte characters count
    /// their encoded length, matching how editors address raw buffers.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col + 1)
    }
}

/// Registry of source buffers for one compilation session.
///
/// # Examples
///
/// ```
/// use svfc_util::SourceMap;
///
/// let mut sources = SourceMap::new();
/// let id = sources.add_file("top.sv", "module top; endmodule\n");
/// assert_eq!(sources.file(id).name(), "top.sv");
/// ```
#[derive(Default)]
pub struct SourceMap {
    files: IndexVec<FileId, SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self {
            files: IndexVec::new(),
        }
    }

    /// Registers a buffer and returns its id.
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<String>) -> FileId {
        let name = name.into();
        let content = content.into();
        let id = FileId::from_usize(self.files.len());
        self.files.push(SourceFile::new(id, name, content));
        id
    }

    /// Looks up a registered buffer.
    pub fn get(&self, id: FileId) -> Result<&SourceFile, SourceError> {
        self.files
            .get(id)
            .ok_or(SourceError::UnknownFile { id: id.0 })
    }

    /// Looks up a registered buffer, panicking on an invalid id.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id]
    }

    /// Number of registered buffers.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves an include path against the registered buffer names.
    ///
    /// Tries the path verbatim first, then prefixed with each search
    /// directory in order. Returns the first match.
    pub fn resolve(&self, path: &str, search_dirs: &[&str]) -> Option<FileId> {
        if let Some(file) = self.files.iter().find(|f| f.name() == path) {
            return Some(file.id());
        }
        for dir in search_dirs {
            let joined = if dir.ends_with('/') {
                format!("{}{}", dir, path)
            } else {
                format!("{}/{}", dir, path)
            };
            if let Some(file) = self.files.iter().find(|f| f.name() == joined) {
                return Some(file.id());
            }
        }
        None
    }

    /// 1-based (line, column) of a span's start, for diagnostics rendering.
    pub fn line_col(&self, span: Span) -> Option<(u32, u32)> {
        self.files.get(span.file).map(|f| f.line_col(span.start))
    }
}

//! String interner implementation using DashMap for concurrent access.
//!
//! The table is shared by every compilation unit in the process: interning
//! is lock-free via DashMap, hashing uses AHasher, and interned strings are
//! leaked to obtain `'static` lifetimes. Keywords are interned eagerly when
//! the table is created so they occupy a stable, contiguous low range of
//! indices.

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;

use super::Symbol;

/// Global string table instance.
///
/// Initialized on first use via `LazyLock`; the initialization interns the
/// full SystemVerilog keyword set, which gives a guaranteed happens-before
/// edge between keyword-table setup and the first lexer that consults it.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(|| {
    let table = StringTable::new();
    table.intern_keywords();
    table
});

/// All keywords the front end pre-interns.
///
/// The low symbol range [0, keyword count) is reserved for these, in order.
pub(crate) const KEYWORDS: &[&str] = &[
    "module", "endmodule", "macromodule", "program", "endprogram", "interface", "endinterface",
    "package", "endpackage", "class", "endclass", "extends", "implements", "virtual", "modport",
    "input", "output", "inout", "ref", "wire", "uwire", "tri", "tri0", "tri1", "triand", "trior",
    "trireg", "wand", "wor", "supply0", "supply1", "interconnect", "logic", "reg", "bit", "byte",
    "shortint", "int", "longint", "integer", "time", "real", "shortreal", "realtime", "string",
    "chandle", "event", "void", "signed", "unsigned", "packed", "struct", "union", "enum",
    "typedef", "parameter", "localparam", "specparam", "defparam", "genvar", "generate",
    "endgenerate", "assign", "alias", "initial", "final", "always", "always_comb", "always_ff",
    "always_latch", "begin", "end", "fork", "join", "join_any", "join_none", "if", "else", "case",
    "casex", "casez", "endcase", "default", "for", "foreach", "while", "do", "forever", "repeat",
    "break", "continue", "return", "wait", "disable", "function", "endfunction", "task",
    "endtask", "automatic", "static", "const", "var", "scalared", "vectored", "posedge",
    "negedge", "edge", "or", "and", "not", "xor", "nand", "nor", "xnor", "buf", "bufif0",
    "bufif1", "notif0", "notif1", "assert", "assume", "cover", "expect", "constraint", "soft",
    "solve", "before", "inside", "dist", "unique", "unique0", "priority", "rand", "randc",
    "randcase", "randsequence", "null", "this", "super", "new", "local", "protected", "import",
    "export", "timeunit", "timeprecision", "type", "iff", "matches", "tagged", "wildcard", "with",
    "wait_order", "cell", "config", "endconfig", "design", "instance", "liblist", "library",
    "use", "incdir", "include",
];

/// Thread-safe string table.
///
/// Two maps are kept in sync: `map` resolves string → symbol on intern,
/// `reverse` resolves symbol → string so `Symbol::as_str` is O(1). Strings
/// are interned at most once; a collision on the 64-bit hash falls back to
/// probing with a golden-ratio stride.
pub struct StringTable {
    /// Maps string hash to (string, symbol index).
    map: DashMap<u64, (&'static str, u32)>,

    /// Maps symbol index back to its string.
    reverse: DashMap<u32, &'static str>,

    /// Next index to hand out (atomic for lock-free increment).
    next_index: AtomicU32,

    /// Exclusive end of the pre-interned keyword range.
    keywords_end: AtomicU32,
}

impl StringTable {
    fn new() -> Self {
        Self {
            map: DashMap::with_capacity(1024),
            reverse: DashMap::with_capacity(1024),
            next_index: AtomicU32::new(0),
            keywords_end: AtomicU32::new(0),
        }
    }

    /// Interns the keyword set into the reserved low index range.
    ///
    /// Called exactly once, from the `LazyLock` initializer.
    fn intern_keywords(&self) {
        for keyword in KEYWORDS {
            self.intern(keyword);
        }
        self.keywords_end
            .store(self.next_index.load(Ordering::Relaxed), Ordering::Relaxed);
    }

    /// Interns a string, returning its symbol.
    ///
    /// Fast path is a single hash lookup; the slow path allocates the string
    /// with `'static` lifetime and registers it in both maps.
    pub fn intern(&self, string: &str) -> Symbol {
        let hash = Self::hash_string(string);

        if let Some(entry) = self.map.get(&hash) {
            if entry.value().0 == string {
                return Symbol::from_index(entry.value().1);
            }
            // 64-bit hash collision between distinct strings
            return self.intern_probed(string, hash);
        }

        match self.map.entry(hash) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                if entry.get().0 == string {
                    Symbol::from_index(entry.get().1)
                } else {
                    self.intern_probed(string, hash)
                }
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
                let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                entry.insert((interned, index));
                self.reverse.insert(index, interned);
                Symbol::from_index(index)
            }
        }
    }

    /// Collision fallback: linear probing with a golden-ratio stride.
    fn intern_probed(&self, string: &str, original_hash: u64) -> Symbol {
        const PROBE_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

        for i in 1u64.. {
            let probe_hash = original_hash.wrapping_add(i.wrapping_mul(PROBE_STRIDE));
            match self.map.entry(probe_hash) {
                dashmap::mapref::entry::Entry::Occupied(entry) => {
                    if entry.get().0 == string {
                        return Symbol::from_index(entry.get().1);
                    }
                }
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
                    let index = self.next_index.fetch_add(1, Ordering::Relaxed);
                    entry.insert((interned, index));
                    self.reverse.insert(index, interned);
                    return Symbol::from_index(index);
                }
            }
        }
        unreachable!("probe sequence exhausted u64 space")
    }

    /// Resolves a symbol back to its string.
    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.reverse.get(&symbol.as_u32()).map(|e| *e.value())
    }

    /// True if the symbol lies in the pre-interned keyword range.
    pub fn is_known(&self, symbol: Symbol) -> bool {
        symbol.as_u32() < self.keywords_end.load(Ordering::Relaxed)
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// False once keywords are interned, so effectively always false.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    fn hash_string(string: &str) -> u64 {
        let mut hasher = AHasher::default();
        string.hash(&mut hasher);
        hasher.finish()
    }
}

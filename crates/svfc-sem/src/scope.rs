//! Local name resolution for the binder.
//!
//! A `Scope` is a parent-chained symbol table holding the nets,
//! variables, parameters, and ports visible while binding one construct.
//! Full hierarchical elaboration lives outside this crate; scopes here
//! only answer "what does this simple name mean locally".

use std::cell::RefCell;

use rustc_hash::FxHashMap;
use svfc_util::{Arena, Symbol};

use crate::types::TypeKind;

/// What kind of declaration produced a symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Net,
    Variable,
    Parameter,
    Port,
    Genvar,
}

/// One declared name.
#[derive(Clone, Copy, Debug)]
pub struct VarSymbol {
    pub name: Symbol,
    pub ty: TypeKind,
    pub kind: SymbolKind,
    /// True for `rand`/`randc` variables, which constraints may target.
    pub is_rand: bool,
}

/// A lexical scope. Declarations are added while binding (variable
/// declaration statements), so the table sits behind a `RefCell`.
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    symbols: RefCell<FxHashMap<Symbol, VarSymbol>>,
}

impl<'a> Scope<'a> {
    /// Creates a root scope in the arena.
    pub fn root(arena: &'a Arena) -> &'a Scope<'a> {
        arena.alloc(Scope {
            parent: None,
            symbols: RefCell::new(FxHashMap::default()),
        })
    }

    /// Creates a child scope chained to `self`.
    pub fn child(&'a self, arena: &'a Arena) -> &'a Scope<'a> {
        arena.alloc(Scope {
            parent: Some(self),
            symbols: RefCell::new(FxHashMap::default()),
        })
    }

    /// Declares a name in this scope. Returns false when the name is
    /// already declared here (shadowing an outer scope is fine).
    pub fn declare(&self, symbol: VarSymbol) -> bool {
        let mut symbols = self.symbols.borrow_mut();
        if symbols.contains_key(&symbol.name) {
            return false;
        }
        symbols.insert(symbol.name, symbol);
        true
    }

    /// Resolves a name through the scope chain.
    pub fn lookup(&self, name: Symbol) -> Option<VarSymbol> {
        if let Some(symbol) = self.symbols.borrow().get(&name) {
            return Some(*symbol);
        }
        self.parent.and_then(|p| p.lookup(name))
    }

    /// Resolves a name in this scope only.
    pub fn lookup_local(&self, name: Symbol) -> Option<VarSymbol> {
        self.symbols.borrow().get(&name).copied()
    }
}

//! Compiler symbol table built on [`ProbeMap`].
//!
//! Symbol records live in a generational arena; the map stores only the
//! arena handle for each name. Tearing the table down goes through
//! [`ProbeMap::destroy_with_ownership`] so every record is released
//! exactly once, before the index itself disappears.

use crate::error::Result;
use crate::probe_map::ProbeMap;
use crate::slot::Visit;
use core::fmt;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a symbol record owned by a [`SymbolTable`].
    pub struct SymbolId;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScalarType {
    Integer,
    Real,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Scalar {
    Integer(i32),
    Real(f32),
}

impl Scalar {
    pub fn ty(&self) -> ScalarType {
        match self {
            Scalar::Integer(_) => ScalarType::Integer,
            Scalar::Real(_) => ScalarType::Real,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Symbol {
    Var {
        name: String,
        value: Scalar,
        scope: u32,
        addr: u32,
    },
    Proc {
        name: String,
        return_type: ScalarType,
        addr: u32,
    },
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Var { name, .. } | Symbol::Proc { name, .. } => name,
        }
    }

    pub fn addr(&self) -> u32 {
        match self {
            Symbol::Var { addr, .. } | Symbol::Proc { addr, .. } => *addr,
        }
    }
}

/// `Integer` lists as `INT` and `Real` as `REAL`. Older listings printed the
/// two swapped; this mapping is intentional.
impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScalarType::Integer => "INT",
            ScalarType::Real => "REAL",
        })
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Var {
                name,
                value,
                scope,
                addr,
            } => {
                write!(f, "Var {name} (scope {scope}, addr {addr}) value ")?;
                match value {
                    Scalar::Integer(n) => write!(f, "{n}"),
                    Scalar::Real(x) => write!(f, "{x:.6}"),
                }
            }
            Symbol::Proc {
                name, return_type, ..
            } => write!(f, "Proc {name} (return type {return_type})"),
        }
    }
}

/// Names to symbol records.
pub struct SymbolTable {
    records: SlotMap<SymbolId, Symbol>,
    index: ProbeMap<String, SymbolId>,
    next_addr: u32,
}

impl SymbolTable {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            records: SlotMap::with_key(),
            index: ProbeMap::with_capacity(capacity)?,
            next_addr: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Declares a variable; addresses are handed out sequentially from 0.
    pub fn insert_var(&mut self, name: &str, value: Scalar, scope: u32) -> Result<SymbolId> {
        let addr = self.next_addr;
        let id = self.declare(Symbol::Var {
            name: name.to_owned(),
            value,
            scope,
            addr,
        })?;
        self.next_addr = self.next_addr.wrapping_add(1);
        Ok(id)
    }

    pub fn insert_proc(
        &mut self,
        name: &str,
        return_type: ScalarType,
        addr: u32,
    ) -> Result<SymbolId> {
        self.declare(Symbol::Proc {
            name: name.to_owned(),
            return_type,
            addr,
        })
    }

    /// Stores `symbol` and indexes it by name. A redeclared name replaces
    /// the previous record, which is released.
    fn declare(&mut self, symbol: Symbol) -> Result<SymbolId> {
        let name = symbol.name().to_owned();
        let id = self.records.insert(symbol);
        match self.index.put(name, id) {
            Ok(Some(shadowed)) => {
                self.records.remove(shadowed);
                Ok(id)
            }
            Ok(None) => Ok(id),
            Err(e) => {
                self.records.remove(id);
                Err(e)
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let id = self.index.get(name)?;
        self.records.get(*id)
    }

    pub fn remove(&mut self, name: &str) -> Option<Symbol> {
        let (_, id) = self.index.remove(name)?;
        self.records.remove(id)
    }

    /// Releases every record and the index. Returns how many records were
    /// released.
    pub fn release(self) -> usize {
        let Self {
            mut records, index, ..
        } = self;
        let mut released = 0;
        let outcome = index.destroy_with_ownership(|entry| {
            if records.remove(*entry.value()).is_some() {
                released += 1;
                tracing::trace!(name = %entry.key(), "released symbol");
            }
            Visit::Remove
        });
        debug_assert!(outcome.is_completed());
        released
    }
}

impl fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.index
                    .iter()
                    .filter_map(|(name, id)| self.records.get(*id).map(|s| (name, s))),
            )
            .finish()
    }
}

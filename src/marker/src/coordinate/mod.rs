use std::{
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use ahash::AHashMap;
use parking_lot::RwLock;

mod error;
pub use error::ChromTableError;

/// Dense, 0-based index into a [`ChromTable`].
///
/// `ChromId` values are only comparable within the table that produced them;
/// ordering them across two independently-built tables is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChromId(pub u32);

impl Display for ChromId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for ChromId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ChromId> for u32 {
    fn from(value: ChromId) -> Self {
        value.0
    }
}

/// A genomic position. `0` and beyond are all valid; there is no
/// sentinel value here (unlike `Marker::end`, which uses `-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(pub u32);

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for Position {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Position> for u32 {
    fn from(value: Position) -> Self {
        value.0
    }
}

/// Chromosome name interning table.
///
/// An explicit context object rather than a hidden global: tests build
/// their own table for isolation, while [`ChromTable::global`] offers a
/// lazily-initialized process-wide instance behind an `RwLock` for
/// production callers that don't need isolation. The write path (`intern`
/// on a miss) takes the write lock; once a name is published, `name()`
/// lookups only ever need the read lock.
#[derive(Debug, Default)]
pub struct ChromTable {
    names: Vec<Arc<str>>,
    index: AHashMap<Arc<str>, ChromId>,
}

impl ChromTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its existing id if already known, or
    /// assigning it the next dense id otherwise.
    ///
    /// # Errors
    /// Returns [`ChromTableError::InvalidName`] if `name` contains
    /// whitespace or a `:` character.
    pub fn intern(&mut self, name: &str) -> Result<ChromId, ChromTableError> {
        if let Some(&id) = self.index.get(name) {
            return Ok(id);
        }
        if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(ChromTableError::InvalidName(name.to_string()));
        }
        let id = ChromId(self.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.index.insert(name, id);
        Ok(id)
    }

    #[must_use]
    pub fn name(&self, id: ChromId) -> Option<&str> {
        self.names.get(id.0 as usize).map(AsRef::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The lazily-initialized, process-wide default table.
    #[must_use]
    pub fn global() -> &'static RwLock<ChromTable> {
        static GLOBAL: once_cell::sync::OnceCell<RwLock<ChromTable>> = once_cell::sync::OnceCell::new();
        GLOBAL.get_or_init(|| RwLock::new(ChromTable::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_dense_and_idempotent() {
        let mut table = ChromTable::new();
        let chr1 = table.intern("1").unwrap();
        let chr2 = table.intern("2").unwrap();
        let chr1_again = table.intern("1").unwrap();
        assert_eq!(chr1, chr1_again);
        assert_ne!(chr1, chr2);
        assert_eq!(chr1, ChromId(0));
        assert_eq!(chr2, ChromId(1));
    }

    #[test]
    fn rejects_whitespace_and_colon() {
        let mut table = ChromTable::new();
        assert!(table.intern("chr 1").is_err());
        assert!(table.intern("chr:1").is_err());
        assert!(table.intern("").is_err());
    }

    #[test]
    fn name_roundtrip() {
        let mut table = ChromTable::new();
        let id = table.intern("X").unwrap();
        assert_eq!(table.name(id), Some("X"));
        assert_eq!(table.name(ChromId(99)), None);
    }

    #[test]
    fn global_table_is_shared() {
        let id = ChromTable::global().write().intern("22").unwrap();
        assert_eq!(ChromTable::global().read().name(id), Some("22"));
    }
}

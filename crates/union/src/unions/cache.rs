//! Merged-view cache for collection unions

/// Cache of a collection union's merged view.
///
/// `Cached` always holds the concatenation of every member's contents in
/// declared member order, as of the last fill.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CacheState<T> {
    /// Nothing loaded, or invalidated by a write
    #[default]
    Uncached,
    /// Merged view from the last load
    Cached(Vec<T>),
}

impl<T> CacheState<T> {
    pub fn is_cached(&self) -> bool {
        matches!(self, CacheState::Cached(_))
    }

    /// The cached view, if any
    pub fn get(&self) -> Option<&[T]> {
        match self {
            CacheState::Cached(records) => Some(records),
            CacheState::Uncached => None,
        }
    }

    /// Store a freshly merged view and return it
    pub fn fill(&mut self, records: Vec<T>) -> &[T] {
        *self = CacheState::Cached(records);
        match self {
            CacheState::Cached(records) => records,
            CacheState::Uncached => &[],
        }
    }

    /// Drop the cached view, returning whether anything was cached
    pub fn invalidate(&mut self) -> bool {
        let was_cached = self.is_cached();
        *self = CacheState::Uncached;
        was_cached
    }
}

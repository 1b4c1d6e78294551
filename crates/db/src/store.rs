use parking_lot::RwLock;

/// Shared, lock-protected schema of tables.
pub struct MemoryStore<S> {
    inner: RwLock<S>,
}

impl<S> MemoryStore<S> {
    pub fn new(schema: S) -> Self {
        Self {
            inner: RwLock::new(schema),
        }
    }

    /// Run a read-only query against a consistent snapshot.
    pub fn read<R>(&self, query: impl FnOnce(&S) -> R) -> R {
        query(&self.inner.read())
    }

    /// Run a mutation; all changes made by `tx` become visible together.
    pub fn write<R>(&self, tx: impl FnOnce(&mut S) -> R) -> R {
        tx(&mut self.inner.write())
    }
}

impl<S: Default> Default for MemoryStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

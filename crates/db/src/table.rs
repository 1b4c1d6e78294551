use std::collections::BTreeMap;

use thiserror::Error;

use crate::page::PageRequest;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record {id} not found in {table}")]
    NotFound { table: &'static str, id: i64 },

    #[error("invalid page request: page={page} size={size}; both must be >= 1")]
    InvalidPage { page: u32, size: u32 },
}

/// Records keyed by a store-assigned id, iterated in ascending id order.
///
/// Ids start at 1, grow monotonically and are never reused after removal.
#[derive(Debug, Clone)]
pub struct Table<T> {
    name: &'static str,
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Table<T> {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Insert a record built from its freshly assigned id.
    pub fn insert(&mut self, build: impl FnOnce(i64) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        tracing::trace!(table = self.name, id, "insert");
        self.rows.entry(id).or_insert(build(id))
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    /// Records of the requested page in id order.
    pub fn page(&self, request: PageRequest) -> impl Iterator<Item = &T> {
        self.rows
            .values()
            .skip(request.offset())
            .take(request.size() as usize)
    }

    /// Apply `change` to an existing record.
    pub fn update<R>(&mut self, id: i64, change: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
        let name = self.name;
        let row = self
            .rows
            .get_mut(&id)
            .ok_or(StoreError::NotFound { table: name, id })?;
        tracing::trace!(table = name, id, "update");
        Ok(change(row))
    }

    pub fn remove(&mut self, id: i64) -> Result<T, StoreError> {
        tracing::trace!(table = self.name, id, "remove");
        self.rows.remove(&id).ok_or(StoreError::NotFound {
            table: self.name,
            id,
        })
    }

    /// Remove every record matching `predicate`, returning the removed ids.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<i64> {
        let ids: Vec<i64> = self
            .rows
            .iter()
            .filter(|(_, row)| predicate(row))
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.rows.remove(id);
        }
        ids
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::named("records")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(n: usize) -> Table<String> {
        let mut table = Table::named("titles");
        for i in 0..n {
            table.insert(|id| format!("{id}:{i}"));
        }
        table
    }

    #[test]
    fn ids_are_sequential_and_not_reused() {
        let mut table = table_with(2);
        table.remove(2).unwrap();
        let id = table.insert(|id| id.to_string()).clone();
        assert_eq!(id, "3");
    }

    #[test]
    fn pages_follow_id_order() {
        let table = table_with(7);
        let page: Vec<_> = table.page(PageRequest::new(2, 3).unwrap()).cloned().collect();
        assert_eq!(page, vec!["4:3", "5:4", "6:5"]);

        let last: Vec<_> = table.page(PageRequest::new(3, 3).unwrap()).collect();
        assert_eq!(last.len(), 1);

        let beyond: Vec<_> = table.page(PageRequest::new(9, 3).unwrap()).collect();
        assert!(beyond.is_empty());
    }

    #[test]
    fn update_and_remove_report_missing_ids() {
        let mut table = table_with(1);
        assert_eq!(
            table.update(5, |_| ()),
            Err(StoreError::NotFound {
                table: "titles",
                id: 5
            })
        );
        assert!(table.remove(5).is_err());
        table.update(1, |row| row.push('!')).unwrap();
        assert_eq!(table.get(1).unwrap(), "1:0!");
    }

    #[test]
    fn remove_where_returns_removed_ids() {
        let mut table = table_with(4);
        let removed = table.remove_where(|row| row.ends_with('1') || row.ends_with('3'));
        assert_eq!(removed, vec![2, 4]);
        assert_eq!(table.len(), 2);
    }
}

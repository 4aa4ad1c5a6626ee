use sinkhole_domain::{DomainError, Record, MAGIC_BYTE};
use std::collections::VecDeque;
use tracing::error;

/// Growable table of fixed-shape records addressed by a stable id.
///
/// Ids are assigned sequentially and never reused. Records can only leave
/// from the front, which moves `first_id` forward; ids below it resolve to
/// `None`.
#[derive(Debug, Clone)]
pub struct Table<R: Record> {
    base: usize,
    rows: VecDeque<R>,
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self {
            base: 0,
            rows: VecDeque::new(),
        }
    }

    pub(crate) fn from_rows(base: usize, rows: Vec<R>) -> Self {
        Self {
            base,
            rows: rows.into(),
        }
    }

    /// Makes room for `additional` records so the next appends cannot fail.
    pub(crate) fn reserve(&mut self, additional: usize) -> Result<(), DomainError> {
        self.rows.try_reserve(additional).map_err(|e| {
            DomainError::ResourceExhausted(format!("{} table: {}", R::TABLE, e))
        })
    }

    pub(crate) fn append(&mut self, record: R) -> Result<R::Id, DomainError> {
        self.reserve(1)?;
        let id = self.base + self.rows.len();
        self.rows.push_back(record);
        Ok(R::Id::from(id))
    }

    /// Looks up a record, treating a tag mismatch as fatal.
    ///
    /// # Panics
    ///
    /// Panics when `verify` is set and the record's integrity tag is wrong.
    /// Continuing with a corrupted table would silently skew every aggregate.
    pub fn get(&self, id: R::Id, verify: bool) -> Option<&R> {
        match self.try_get(id, verify) {
            Ok(record) => record,
            Err(e) => integrity_violation(e),
        }
    }

    /// Same as [`Table::get`] but reports a tag mismatch as an error.
    pub fn try_get(&self, id: R::Id, verify: bool) -> Result<Option<&R>, DomainError> {
        let id: usize = id.into();
        let Some(record) = id.checked_sub(self.base).and_then(|i| self.rows.get(i)) else {
            return Ok(None);
        };
        if verify && record.magic() != MAGIC_BYTE {
            return Err(DomainError::Corruption { table: R::TABLE, id });
        }
        Ok(Some(record))
    }

    pub(crate) fn get_mut(&mut self, id: R::Id, verify: bool) -> Option<&mut R> {
        let id: usize = id.into();
        let record = id.checked_sub(self.base).and_then(|i| self.rows.get_mut(i))?;
        if verify && record.magic() != MAGIC_BYTE {
            integrity_violation(DomainError::Corruption { table: R::TABLE, id });
        }
        Some(record)
    }

    /// Number of live records.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Id of the oldest live record (or of the next record when empty).
    pub fn first_id(&self) -> usize {
        self.base
    }

    pub fn next_id(&self) -> usize {
        self.base + self.rows.len()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (R::Id, &R)> + '_ {
        let base = self.base;
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, r)| (R::Id::from(base + i), r))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut R> + '_ {
        self.rows.iter_mut()
    }

    pub(crate) fn front(&self) -> Option<&R> {
        self.rows.front()
    }

    pub(crate) fn pop_front(&mut self) -> Option<R> {
        let record = self.rows.pop_front()?;
        self.base += 1;
        Some(record)
    }

    pub(crate) fn to_vec(&self) -> Vec<R>
    where
        R: Clone,
    {
        self.rows.iter().cloned().collect()
    }
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn integrity_violation(err: DomainError) -> ! {
    error!(error = %err, "Integrity tag mismatch, refusing to continue");
    panic!("{}", err);
}

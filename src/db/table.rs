// Table — one in-memory collection keyed by record id.
//
// Rows live in a HashMap for id lookups; a separate Vec keeps insertion order
// so scans, "first match" lookups and stable tie-breaks are deterministic.

use std::collections::HashMap;

use super::models::{Article, Bookmark, Comment, Follow, Like, User};

/// A row with a primary key.
pub trait Keyed {
    fn key(&self) -> &str;
}

macro_rules! keyed_by_id {
    ($($ty:ty),*) => {
        $(impl Keyed for $ty {
            fn key(&self) -> &str {
                &self.id
            }
        })*
    };
}

keyed_by_id!(User, Article, Comment, Follow, Bookmark, Like);

#[derive(Debug)]
pub struct Table<T> {
    rows: HashMap<String, T>,
    order: Vec<String>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Keyed> Table<T> {
    /// Insert or replace a row. A replaced row keeps its original position.
    pub fn insert(&mut self, row: T) {
        let key = row.key().to_string();
        if self.rows.insert(key.clone(), row).is_none() {
            self.order.push(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.rows.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.rows.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        let row = self.rows.remove(key)?;
        self.order.retain(|k| k != key);
        Some(row)
    }

    /// Rows in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.order.iter().filter_map(|k| self.rows.get(k))
    }

    /// First row in insertion order satisfying `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|row| pred(row))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

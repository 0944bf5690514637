//! Memoized per-fixture accessors for test code.
//!
//! A [`FixtureAccessor`] turns labels into whatever the consumer wants
//! (a model instance, a row struct) through a loader, caching each result
//! until it is explicitly reloaded.

use crate::error::{FixtureError, FixtureResult};
use crate::set::FixtureSet;
use fx_core::Identifier;
use std::collections::HashMap;
use std::fmt::Display;

/// Cached lookups of one fixture's rows.
pub struct FixtureAccessor<'s, T, F> {
    set: &'s FixtureSet,
    fixture: String,
    loader: F,
    cache: HashMap<String, T>,
}

impl<'s, T, F, E> FixtureAccessor<'s, T, F>
where
    F: FnMut(&Identifier) -> Result<T, E>,
    E: Display,
{
    /// Accessor for a fixture of a baked set.
    pub fn new(set: &'s FixtureSet, fixture: impl Into<String>, loader: F) -> FixtureResult<Self> {
        let fixture = fixture.into();
        set.identifiers(&fixture)?;
        Ok(Self {
            set,
            fixture,
            loader,
            cache: HashMap::new(),
        })
    }

    pub fn fixture(&self) -> &str {
        &self.fixture
    }

    /// Instance for `label`, loaded on first access.
    pub fn get(&mut self, label: &str) -> FixtureResult<&T> {
        if !self.cache.contains_key(label) {
            let instance = self.load(label)?;
            self.cache.insert(label.to_string(), instance);
        }
        self.cache.get(label).ok_or_else(|| FixtureError::Lookup {
            fixture: self.fixture.clone(),
            label: label.to_string(),
        })
    }

    /// Instance for `label`, bypassing and refreshing the cache.
    pub fn get_fresh(&mut self, label: &str) -> FixtureResult<&T> {
        self.cache.remove(label);
        self.get(label)
    }

    /// Instances for several labels, in the order given.
    pub fn get_many<'l, I>(&mut self, labels: I) -> FixtureResult<Vec<&T>>
    where
        I: IntoIterator<Item = &'l str>,
    {
        let labels: Vec<&str> = labels.into_iter().collect();
        for label in &labels {
            self.get(label)?;
        }
        labels
            .into_iter()
            .map(|label| {
                self.cache.get(label).ok_or_else(|| FixtureError::Lookup {
                    fixture: self.fixture.clone(),
                    label: label.to_string(),
                })
            })
            .collect()
    }

    /// Instances for every row of the fixture, in file order.
    pub fn all(&mut self) -> FixtureResult<Vec<&T>> {
        let set = self.set;
        let labels: Vec<&str> = set
            .identifiers(&self.fixture)?
            .keys()
            .map(String::as_str)
            .collect();
        self.get_many(labels)
    }

    /// Drop every cached instance.
    pub fn reload(&mut self) {
        self.cache.clear();
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    fn load(&mut self, label: &str) -> FixtureResult<T> {
        let set = self.set;
        let id = set.lookup(&self.fixture, label)?;
        (self.loader)(id).map_err(|e| FixtureError::InstanceLoad {
            fixture: self.fixture.clone(),
            label: label.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "accessor_test.rs"]
mod tests;

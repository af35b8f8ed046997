//! Registry of live client instances.
//!
//! The host glue keeps one client per configuration entry. Rather than an
//! ambient global map, the registry is an explicit object: inserted on
//! configuration setup, removed on teardown. When a call names no target
//! instance, an injected selection strategy picks one.

use std::sync::Arc;

use tracing::warn;

use crate::client::OllamaVisionClient;

/// Picks an instance when a call does not address one explicitly.
pub trait SelectionStrategy: Send + Sync {
    /// Choose among the registered instance ids, given in insertion order.
    fn select<'a>(&self, ids: &[&'a str]) -> Option<&'a str>;
}

/// Default strategy: the instance registered first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstByInsertion;

impl SelectionStrategy for FirstByInsertion {
    fn select<'a>(&self, ids: &[&'a str]) -> Option<&'a str> {
        ids.first().copied()
    }
}

/// Maps configuration instance ids to live clients, in insertion order.
pub struct ClientRegistry {
    entries: Vec<(String, Arc<OllamaVisionClient>)>,
    strategy: Box<dyn SelectionStrategy>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::with_strategy(Box::new(FirstByInsertion))
    }

    pub fn with_strategy(strategy: Box<dyn SelectionStrategy>) -> Self {
        Self {
            entries: Vec::new(),
            strategy,
        }
    }

    /// Register a client under an instance id. Re-inserting an existing id
    /// replaces the client in place, keeping its position.
    pub fn insert(&mut self, id: impl Into<String>, client: Arc<OllamaVisionClient>) {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = client,
            None => self.entries.push((id, client)),
        }
    }

    /// Remove a client on configuration teardown.
    pub fn remove(&mut self, id: &str) -> Option<Arc<OllamaVisionClient>> {
        let index = self.entries.iter().position(|(existing, _)| existing == id)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, id: &str) -> Option<Arc<OllamaVisionClient>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, client)| Arc::clone(client))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an instance, falling back to the selection strategy when no id
    /// is given.
    pub fn select(&self, id: Option<&str>) -> Option<Arc<OllamaVisionClient>> {
        match id {
            Some(id) => self.get(id),
            None => {
                if self.entries.len() > 1 {
                    warn!(
                        instances = self.entries.len(),
                        "no target instance given, selecting one by strategy"
                    );
                }
                let ids: Vec<&str> = self.ids().collect();
                self.strategy.select(&ids).and_then(|id| self.get(id))
            }
        }
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

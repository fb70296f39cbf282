//! Named-value storage backed by one or more [`TargetEnv`] adapters.
//!
//! Reads walk the adapters in order and return the first defined value.
//! Writes and clears go to every adapter. An immutable repository refuses to
//! touch names that were already defined before it wrote them.

use std::collections::BTreeSet;

use crate::env::TargetEnv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    adapters: Vec<TargetEnv>,
    immutable: bool,
    loaded: BTreeSet<String>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::memory()
    }
}

impl Repository {
    /// Create a mutable repository over a single empty in-memory map.
    pub fn memory() -> Self {
        RepositoryBuilder::new().build()
    }

    /// Create a mutable repository over the process environment.
    ///
    /// # Safety
    ///
    /// See [`TargetEnv::process`].
    pub unsafe fn process() -> Self {
        RepositoryBuilder::new()
            .with_adapter(unsafe { TargetEnv::process() })
            .build()
    }

    pub fn builder() -> RepositoryBuilder {
        RepositoryBuilder::new()
    }

    pub fn is_immutable(&self) -> bool {
        self.immutable
    }

    pub fn adapters(&self) -> &[TargetEnv] {
        &self.adapters
    }

    pub fn has(&self, name: &str) -> bool {
        self.adapters.iter().any(|adapter| adapter.contains_key(name))
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.adapters.iter().find_map(|adapter| adapter.get_var(name))
    }

    /// Set `name` on every adapter.
    ///
    /// Returns `false` when an immutable repository declined the write.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        if !self.is_writable(name) {
            return false;
        }

        for adapter in &mut self.adapters {
            adapter.set_var(name, value);
        }
        self.loaded.insert(name.to_owned());
        true
    }

    /// Remove `name` from every adapter.
    ///
    /// Returns `false` when an immutable repository declined the removal.
    pub fn clear(&mut self, name: &str) -> bool {
        if !self.is_writable(name) {
            return false;
        }

        for adapter in &mut self.adapters {
            adapter.remove_var(name);
        }
        self.loaded.remove(name);
        true
    }

    /// Names written by this repository, in sorted order.
    pub fn loaded_names(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }

    fn is_writable(&self, name: &str) -> bool {
        !self.immutable || self.loaded.contains(name) || !self.has(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RepositoryBuilder {
    adapters: Vec<TargetEnv>,
    immutable: bool,
}

impl RepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_adapter(mut self, adapter: TargetEnv) -> Self {
        self.adapters.push(adapter);
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Build the repository, falling back to an in-memory adapter when none
    /// were added.
    pub fn build(self) -> Repository {
        let adapters = if self.adapters.is_empty() {
            vec![TargetEnv::memory()]
        } else {
            self.adapters
        };

        Repository {
            adapters,
            immutable: self.immutable,
            loaded: BTreeSet::new(),
        }
    }
}

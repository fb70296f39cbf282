use std::collections::BTreeMap;

/// A single storage backend for environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Read and write the current process environment.
    ///
    /// This goes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Read and write an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment adapter.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an empty in-memory adapter.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory adapter from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        match &self.kind {
            TargetEnvKind::Process => std::env::var_os(name).is_some(),
            TargetEnvKind::Memory(map) => map.contains_key(name),
        }
    }

    pub fn get_var(&self, name: &str) -> Option<String> {
        match &self.kind {
            TargetEnvKind::Process => {
                std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
            }
            TargetEnvKind::Memory(map) => map.get(name).cloned(),
        }
    }

    pub(crate) fn set_var(&mut self, name: &str, value: &str) {
        match &mut self.kind {
            // SAFETY: upheld by the caller of `TargetEnv::process`.
            TargetEnvKind::Process => unsafe { std::env::set_var(name, value) },
            TargetEnvKind::Memory(map) => {
                map.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    pub(crate) fn remove_var(&mut self, name: &str) {
        match &mut self.kind {
            // SAFETY: upheld by the caller of `TargetEnv::process`.
            TargetEnvKind::Process => unsafe { std::env::remove_var(name) },
            TargetEnvKind::Memory(map) => {
                map.remove(name);
            }
        }
    }
}

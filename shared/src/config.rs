use std::collections::{BTreeMap, HashMap};

/// Read-only key/value configuration the relay pulls its cluster topology
/// from. Implemented for the std maps; an application's own config reader
/// only needs to answer `lookup`.
pub trait ConfigLookup {
    /// Returns the value stored under `key`, or `None` if the key is absent.
    fn lookup(&self, key: &str) -> Option<String>;
}

impl ConfigLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl ConfigLookup for BTreeMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl<T: ConfigLookup + ?Sized> ConfigLookup for &T {
    fn lookup(&self, key: &str) -> Option<String> {
        (**self).lookup(key)
    }
}

//! The static string dictionary.
//!
//! The dictionary's contents and storage are an external collaborator,
//! not part of the decoder itself. This module only defines the
//! read-only lookup contract the decoder depends on, and one convenience
//! implementation (`StaticDictionary`) for the common case of a fixed,
//! compile-time table.

use std::collections::{BTreeMap, HashMap};

/// A read-only mapping from dictionary key to well-known string, safe to
/// share across threads.
pub trait Dictionary {
    fn lookup(&self, key: u32) -> Option<&str>;
}

impl Dictionary for HashMap<u32, String> {
    fn lookup(&self, key: u32) -> Option<&str> {
        self.get(&key).map(String::as_str)
    }
}

impl Dictionary for BTreeMap<u32, String> {
    fn lookup(&self, key: u32) -> Option<&str> {
        self.get(&key).map(String::as_str)
    }
}

impl<D: Dictionary + ?Sized> Dictionary for &D {
    fn lookup(&self, key: u32) -> Option<&str> {
        (**self).lookup(key)
    }
}

/// A dictionary backed by a fixed, `'static` key/value table — the usual
/// shape for a SOAP well-known-strings dictionary that never changes at
/// runtime and should not require a heap allocation to construct.
#[derive(Debug, Clone, Copy)]
pub struct StaticDictionary(pub &'static [(u32, &'static str)]);

impl Dictionary for StaticDictionary {
    fn lookup(&self, key: u32) -> Option<&str> {
        self.0
            .iter()
            .find(|&&(k, _)| k == key)
            .map(|&(_, v)| v)
    }
}

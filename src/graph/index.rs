//! Symbol index used to resolve usages to nodes
//!
//! Three maps are built while nodes are created:
//!
//! - `by_full_name`: `namespace\name` to node id, last write wins
//! - `by_short_name`: bare name to node id, subject to the ambiguity policy
//! - `class_by_short_name`: bare class name to the class's full name
//!
//! A short name moves through `Unset -> Unique -> Ambiguous` and never comes
//! back from `Ambiguous`. Global-namespace declarations always claim their
//! short name. A namespaced declaration only claims an unset name; if the
//! name is already taken, the entry becomes ambiguous for the rest of the run.

use super::store_models::NodeId;
use crate::models::{Declaration, DeclarationKind};
use rustc_hash::FxHashMap;
use tracing::debug;

/// State of one short-name entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortName<T> {
    Unset,
    Unique(T),
    Ambiguous,
}

#[derive(Debug, Default)]
pub struct SymbolIndex {
    by_full_name: FxHashMap<String, NodeId>,
    by_short_name: FxHashMap<String, ShortName<NodeId>>,
    class_by_short_name: FxHashMap<String, ShortName<String>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index one declaration whose node id is `id`
    pub fn insert(&mut self, decl: &Declaration, id: &NodeId) {
        let full_name = decl.full_name();
        self.by_full_name.insert(full_name.clone(), id.clone());

        if decl.namespace.is_empty() {
            self.by_short_name
                .insert(decl.name.clone(), ShortName::Unique(id.clone()));
            return;
        }

        let is_class = decl.kind == DeclarationKind::Class;
        let existing = self.by_short_name.get(&decl.name).cloned();
        match existing {
            None | Some(ShortName::Unset) => {
                self.by_short_name
                    .insert(decl.name.clone(), ShortName::Unique(id.clone()));
                if is_class {
                    self.class_by_short_name
                        .insert(decl.name.clone(), ShortName::Unique(full_name));
                }
            }
            Some(ShortName::Unique(previous)) => {
                debug!(
                    "Short name '{}' is ambiguous ({} vs {}), requiring qualified lookups",
                    decl.name, previous, id
                );
                self.by_short_name
                    .insert(decl.name.clone(), ShortName::Ambiguous);
                if is_class {
                    self.class_by_short_name
                        .insert(decl.name.clone(), ShortName::Ambiguous);
                }
            }
            Some(ShortName::Ambiguous) => {
                if is_class {
                    self.class_by_short_name
                        .insert(decl.name.clone(), ShortName::Ambiguous);
                }
            }
        }
    }

    pub fn by_full_name(&self, full_name: &str) -> Option<&NodeId> {
        self.by_full_name.get(full_name)
    }

    /// Node id for a short name, only while it is unambiguous
    pub fn by_short_name(&self, name: &str) -> Option<&NodeId> {
        match self.by_short_name.get(name) {
            Some(ShortName::Unique(id)) => Some(id),
            _ => None,
        }
    }

    /// Full name of the single class with this short name
    pub fn class_full_name(&self, name: &str) -> Option<&str> {
        match self.class_by_short_name.get(name) {
            Some(ShortName::Unique(full)) => Some(full.as_str()),
            _ => None,
        }
    }

    pub fn short_name_state(&self, name: &str) -> ShortName<&NodeId> {
        match self.by_short_name.get(name) {
            None | Some(ShortName::Unset) => ShortName::Unset,
            Some(ShortName::Unique(id)) => ShortName::Unique(id),
            Some(ShortName::Ambiguous) => ShortName::Ambiguous,
        }
    }

    pub fn len(&self) -> usize {
        self.by_full_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_full_name.is_empty()
    }
}

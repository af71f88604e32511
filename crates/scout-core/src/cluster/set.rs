use std::collections::BTreeMap;

use super::node::{NodeIdentity, NodeRecord};

/// Node collection keyed by identity.
///
/// Inserting an identity that is already present merges the two records
/// instead of replacing one with the other. Iteration is ordered by identity.
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: BTreeMap<NodeIdentity, NodeRecord>,
}

impl NodeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge several collections into one set.
    pub fn merge<I, C>(collections: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = NodeRecord>,
    {
        let mut set = Self::new();
        for collection in collections {
            set.extend(collection);
        }
        set
    }

    /// Insert a record. Returns `true` if the identity was not present before.
    pub fn insert(&mut self, record: NodeRecord) -> bool {
        match self.nodes.get_mut(&record.identity) {
            Some(existing) => {
                existing.merge(record);
                false
            }
            None => {
                self.nodes.insert(record.identity.clone(), record);
                true
            }
        }
    }

    /// Check if an identity is present.
    pub fn contains(&self, identity: &NodeIdentity) -> bool {
        self.nodes.contains_key(identity)
    }

    /// Get a record by identity.
    pub fn get(&self, identity: &NodeIdentity) -> Option<&NodeRecord> {
        self.nodes.get(identity)
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over records in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    /// Consume into a vector ordered by identity.
    pub fn into_records(self) -> Vec<NodeRecord> {
        self.nodes.into_values().collect()
    }
}

impl Extend<NodeRecord> for NodeSet {
    fn extend<T: IntoIterator<Item = NodeRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}

impl FromIterator<NodeRecord> for NodeSet {
    fn from_iter<T: IntoIterator<Item = NodeRecord>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeRecord;
    type IntoIter = std::collections::btree_map::IntoValues<NodeIdentity, NodeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_values()
    }
}

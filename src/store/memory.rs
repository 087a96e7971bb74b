use std::collections::{BTreeMap, BTreeSet};

use super::{CollectionPath, DocumentStore, Resource};
use crate::error::{Error, Result};

/// A store kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeSet<CollectionPath>,
    resources: BTreeMap<CollectionPath, BTreeMap<String, Resource>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_collection(&self, path: &str) -> bool {
        CollectionPath::parse(path).is_ok_and(|path| self.collections.contains(&path))
    }

    /// Look up a resource by its full path, e.g. `/db/a/b/c.xml`.
    pub fn resource(&self, path: &str) -> Option<&Resource> {
        let path = CollectionPath::parse(path).ok()?;
        let collection = path.parent()?;
        self.resources.get(&collection)?.get(path.last()?)
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionPath> {
        self.collections.iter()
    }

    /// All resources with their full paths, in path order.
    pub fn resources(&self) -> impl Iterator<Item = (CollectionPath, &Resource)> {
        self.resources.iter().flat_map(|(collection, resources)| {
            resources
                .iter()
                .map(move |(name, resource)| (collection.child(name), resource))
        })
    }

    pub fn resource_count(&self) -> usize {
        self.resources.values().map(BTreeMap::len).sum()
    }
}

impl DocumentStore for MemoryStore {
    fn create_collection(&mut self, path: &CollectionPath) -> Result<()> {
        for ancestor in path.ancestors_inclusive() {
            self.collections.insert(ancestor);
        }
        Ok(())
    }

    fn store_resource(&mut self, collection: &CollectionPath, resource: Resource) -> Result<()> {
        if !self.collections.contains(collection) {
            return Err(Error::Store(format!(
                "collection {collection} does not exist"
            )));
        }
        self.resources
            .entry(collection.clone())
            .or_default()
            .insert(resource.name.clone(), resource);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResourceContent;

    fn binary(name: &str) -> Resource {
        Resource {
            name: name.to_string(),
            content: ResourceContent::Binary(vec![1, 2, 3]),
            mime_type: None,
        }
    }

    #[test]
    fn test_create_collection_chain() {
        let mut store = MemoryStore::new();
        store
            .create_collection(&CollectionPath::parse("/db/a/b").unwrap())
            .unwrap();
        assert!(store.has_collection("/db"));
        assert!(store.has_collection("/db/a"));
        assert!(store.has_collection("/db/a/b"));
        assert!(!store.has_collection("/db/b"));
    }

    #[test]
    fn test_store_requires_collection() {
        let mut store = MemoryStore::new();
        let db = CollectionPath::parse("/db").unwrap();
        assert!(matches!(
            store.store_resource(&db, binary("x.bin")),
            Err(Error::Store(_))
        ));
        store.create_collection(&db).unwrap();
        store.store_resource(&db, binary("x.bin")).unwrap();
        store.store_resource(&db, binary("x.bin")).unwrap();
        assert_eq!(store.resource_count(), 1);
        assert!(store.resource("/db/x.bin").is_some());
    }
}

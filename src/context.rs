//! Who is calling and where writes go.

use crate::config::ModuleConfig;
use crate::error::Result;
use crate::mime::MimeTable;
use crate::store::{CollectionPath, DocumentStore};

/// Role required to call `rar:unrar`.
pub const DBA_ROLE: &str = "dba";

/// The authenticated user evaluating a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    name: String,
    roles: Vec<String>,
}

impl Subject {
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// A subject holding the administrative role.
    pub fn dba(name: impl Into<String>) -> Self {
        Self::new(name, [DBA_ROLE])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_dba_role(&self) -> bool {
        self.has_role(DBA_ROLE)
    }
}

/// Evaluation context of one query.
pub struct QueryContext<'s> {
    subject: Subject,
    store: &'s mut dyn DocumentStore,
    root: CollectionPath,
    mime_table: MimeTable,
}

impl<'s> QueryContext<'s> {
    /// Context with the default configuration.
    pub fn new(subject: Subject, store: &'s mut dyn DocumentStore) -> Self {
        let config = ModuleConfig::default();
        Self {
            subject,
            store,
            root: CollectionPath::default().child("db"),
            mime_table: config.mime_table(),
        }
    }

    pub fn with_config(
        subject: Subject,
        store: &'s mut dyn DocumentStore,
        config: &ModuleConfig,
    ) -> Result<Self> {
        Ok(Self {
            subject,
            store,
            root: config.root()?,
            mime_table: config.mime_table(),
        })
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn root_collection(&self) -> &CollectionPath {
        &self.root
    }

    /// Split borrow used by the path-returning store form.
    pub(crate) fn store_parts(&mut self) -> (&mut dyn DocumentStore, &CollectionPath, &MimeTable) {
        (&mut *self.store, &self.root, &self.mime_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_dba_role() {
        assert!(Subject::dba("admin").has_dba_role());
        assert!(!Subject::new("guest", ["guest"]).has_dba_role());
        assert!(!Subject::new("nobody", Vec::<String>::new()).has_dba_role());
    }

    #[test]
    fn test_context_root_from_config() {
        let mut store = MemoryStore::new();
        let config = ModuleConfig {
            root_collection: "/db/imports/".to_string(),
            ..ModuleConfig::default()
        };
        let ctx = QueryContext::with_config(Subject::dba("admin"), &mut store, &config).unwrap();
        assert_eq!(ctx.root_collection().to_string(), "/db/imports");
        assert_eq!(ctx.subject().name(), "admin");
    }
}

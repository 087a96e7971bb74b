//! Module configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables prefixed with `XMLDB_RAR__` (nested keys separated by
//! `__`, e.g. `XMLDB_RAR__ROOT_COLLECTION=/db/imports`).
//!
//! ```toml
//! root_collection = "/db"
//!
//! [mime_types]
//! xml = "application/xml"
//! xq = "application/xquery"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mime::MimeTable;
use crate::store::CollectionPath;

pub const ENV_PREFIX: &str = "XMLDB_RAR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Collection the path-returning store form writes under.
    pub root_collection: String,
    /// Extension to content type overrides.
    pub mime_types: BTreeMap<String, String>,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        let mime_types = [
            ("xml", "application/xml"),
            ("xsl", "application/xml"),
            ("xq", "application/xquery"),
            ("xql", "application/xquery"),
            ("xqm", "application/xquery"),
            ("xquery", "application/xquery"),
        ]
        .into_iter()
        .map(|(ext, mime)| (ext.to_owned(), mime.to_owned()))
        .collect();

        Self {
            root_collection: "/db".to_owned(),
            mime_types,
        }
    }
}

impl ModuleConfig {
    /// Load the layered configuration. A missing `file` is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(file) = file {
            builder = builder.add_source(
                File::new(&file.to_string_lossy(), FileFormat::Toml).required(false),
            );
        }
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn root(&self) -> Result<CollectionPath> {
        CollectionPath::parse(&self.root_collection)
    }

    pub fn mime_table(&self) -> MimeTable {
        MimeTable::new(&self.mime_types)
    }
}

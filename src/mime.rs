//! Content types for stored resources.

use std::collections::BTreeMap;
use std::path::Path;

/// Maps resource names to content types.
///
/// Configured extensions take precedence over the `mime_guess` database.
#[derive(Debug, Clone, Default)]
pub struct MimeTable {
    overrides: BTreeMap<String, String>,
}

impl MimeTable {
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(ext, mime)| (ext.trim_start_matches('.').to_ascii_lowercase(), mime.clone()))
            .collect();
        Self { overrides }
    }

    pub fn content_type_for(&self, name: &str) -> Option<String> {
        let ext = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();
        if let Some(mime) = self.overrides.get(&ext) {
            return Some(mime.clone());
        }
        mime_guess::from_ext(&ext).first_raw().map(str::to_owned)
    }
}

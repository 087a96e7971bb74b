//! `rar:unrar($file, $entry-filter, $entry-filter-param, $entry-data, $entry-data-param)`.

use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::archive::ArchiveOpener;
use crate::context::QueryContext;
use crate::error::{Error, Result};
use crate::extract::EntryProcessor;
use crate::function::{FunctionReference, StoreStrategy, MIN_ARITY};
use crate::store::ResourceWriter;
use crate::value::{Item, Sequence};

/// Arguments of one `rar:unrar` call, in signature order.
#[derive(Debug, Default)]
pub struct UnrarCall<'f> {
    /// Path of the first rar volume.
    pub file: Sequence,
    pub entry_filter: Option<FunctionReference<'f>>,
    pub entry_filter_param: Sequence,
    pub entry_data: Option<FunctionReference<'f>>,
    pub entry_data_param: Sequence,
}

impl<'f> UnrarCall<'f> {
    pub fn new(
        file: impl Into<String>,
        entry_filter: FunctionReference<'f>,
        entry_data: FunctionReference<'f>,
    ) -> Self {
        Self {
            file: Sequence::one(Item::string(file)),
            entry_filter: Some(entry_filter),
            entry_data: Some(entry_data),
            ..Self::default()
        }
    }

    pub fn with_filter_param(mut self, param: Sequence) -> Self {
        self.entry_filter_param = param;
        self
    }

    pub fn with_data_param(mut self, param: Sequence) -> Self {
        self.entry_data_param = param;
        self
    }

    /// The archive path, or `None` when the argument is empty.
    fn archive_path(&self) -> Option<PathBuf> {
        let path = self.file.first()?.string_value();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }
}

/// Implementation of `rar:unrar`.
pub struct UnrarFunction {
    opener: Box<dyn ArchiveOpener>,
}

#[cfg(feature = "unrar")]
impl Default for UnrarFunction {
    fn default() -> Self {
        Self::new(crate::archive::UnrarOpener)
    }
}

impl UnrarFunction {
    pub fn new(opener: impl ArchiveOpener + 'static) -> Self {
        Self {
            opener: Box::new(opener),
        }
    }

    /// Evaluate the function.
    ///
    /// Argument and privilege checks run before the archive is opened. The
    /// archive is closed on every path once it has been opened.
    pub fn eval(&self, call: UnrarCall<'_>, ctx: &mut QueryContext<'_>) -> Result<Sequence> {
        let Some(path) = call.archive_path() else {
            return Ok(Sequence::empty());
        };

        let mut filter = call.entry_filter.ok_or(Error::MissingFunction {
            parameter: "entry-filter",
        })?;
        if filter.arity() < MIN_ARITY {
            return Err(Error::InvalidArity {
                parameter: "entry-filter",
                arity: filter.arity(),
                required: MIN_ARITY,
            });
        }
        let mut strategy = StoreStrategy::from_function(call.entry_data.ok_or(
            Error::MissingFunction {
                parameter: "entry-data",
            },
        )?)?;

        if !ctx.subject().has_dba_role() {
            let err = Error::PermissionDenied {
                user: ctx.subject().name().to_owned(),
            };
            error!(error = %err, "Invalid user");
            return Err(err);
        }

        let (store, root, mime_table) = ctx.store_parts();
        let mut processor = EntryProcessor::new(
            &mut filter,
            &call.entry_filter_param,
            &mut strategy,
            &call.entry_data_param,
            ResourceWriter::new(store, root, mime_table),
        );
        self.process_compressed_data(&path, &mut processor)
    }

    fn process_compressed_data(
        &self,
        path: &Path,
        processor: &mut EntryProcessor<'_, '_>,
    ) -> Result<Sequence> {
        let mut archive = self
            .opener
            .open(path)
            .inspect_err(|e| error!(error = %e, "cannot open archive"))?;

        let outcome = if archive.is_encrypted() {
            warn!(path = %path.display(), "archive is encrypted cannot extract");
            Ok(Sequence::empty())
        } else {
            processor.process_entries(archive.as_mut())
        };

        if let Err(e) = archive.close() {
            warn!(error = %e, path = %path.display(), "failed to close archive");
        }

        match &outcome {
            Ok(results) => {
                debug!(path = %path.display(), items = results.len(), "archive processed");
            }
            Err(e) if e.is_archive_error() => error!(error = %e, "archive processing failed"),
            Err(_) => {}
        }
        outcome
    }
}

//! Walking an open archive and dispatching entries to the user functions.

use tracing::{debug, trace, warn};

use crate::archive::{EntryHeader, RarArchive};
use crate::error::{Error, Result};
use crate::function::{FunctionReference, StoreStrategy};
use crate::markup::decode_entry;
use crate::store::ResourceWriter;
use crate::value::{Item, Sequence};

/// Per-call state of the entry loop.
pub struct EntryProcessor<'p, 'f> {
    filter: &'p mut FunctionReference<'f>,
    filter_param: &'p Sequence,
    strategy: &'p mut StoreStrategy<'f>,
    store_param: &'p Sequence,
    writer: ResourceWriter<'p>,
}

impl<'p, 'f> EntryProcessor<'p, 'f> {
    pub fn new(
        filter: &'p mut FunctionReference<'f>,
        filter_param: &'p Sequence,
        strategy: &'p mut StoreStrategy<'f>,
        store_param: &'p Sequence,
        writer: ResourceWriter<'p>,
    ) -> Self {
        Self {
            filter,
            filter_param,
            strategy,
            store_param,
            writer,
        }
    }

    /// Visit every entry in order and concatenate their contributions.
    ///
    /// Encrypted entries are skipped. The archive is left open; closing it is
    /// the caller's job.
    pub fn process_entries(&mut self, archive: &mut dyn RarArchive) -> Result<Sequence> {
        let mut results = Sequence::empty();
        while let Some(header) = archive.next_entry()? {
            if header.is_encrypted() {
                warn!(entry = %header.file_name(), "file is encrypted, cannot extract");
                continue;
            }
            let produced = self.process_entry(archive, &header)?;
            results.append(produced);
        }
        Ok(results)
    }

    fn process_entry(
        &mut self,
        archive: &mut dyn RarArchive,
        header: &EntryHeader,
    ) -> Result<Sequence> {
        let kind = header.kind();
        let name = Sequence::one(Item::string(header.file_name()));
        let kind_arg = Sequence::one(Item::string(kind.as_str()));

        let verdict = self
            .filter
            .call(&[name.clone(), kind_arg.clone(), self.filter_param.clone()])?;
        if verdict.first().and_then(Item::as_boolean) == Some(false) {
            trace!(entry = %header.file_name(), "rejected by entry filter");
            return Ok(Sequence::empty());
        }

        let bytes = archive.extract(header)?;
        debug!(entry = %header.file_name(), %kind, len = bytes.len(), "extracted entry");

        match &mut *self.strategy {
            StoreStrategy::PathReturning(function) => {
                let returned = function.call(&[name, kind_arg, self.store_param.clone()])?;
                let target = returned
                    .first()
                    .map(Item::string_value)
                    .ok_or_else(|| Error::InvalidTargetPath {
                        path: String::new(),
                        reason: "entry-data function returned no path",
                    })?;
                if header.is_directory() {
                    self.writer.write_folder(&target)?;
                } else {
                    self.writer.write_resource(&target, bytes)?;
                }
                Ok(Sequence::empty())
            }
            StoreStrategy::DataReceiving(function) => {
                let data = decode_entry(bytes).into_sequence();
                function.call(&[name, kind_arg, data, self.store_param.clone()])
            }
        }
    }
}

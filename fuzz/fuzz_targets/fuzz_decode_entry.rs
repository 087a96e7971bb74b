#![no_main]
use libfuzzer_sys::fuzz_target;
use xmldb_rar::{decode_entry, EntryData};

// Decoding never panics and never loses bytes.
fuzz_target!(|data: &[u8]| {
    match decode_entry(data.to_vec()) {
        EntryData::Empty => assert!(data.is_empty()),
        EntryData::Binary(bin) => assert_eq!(bin.as_bytes(), data),
        EntryData::Document(doc) => assert!(!doc.root_name().is_empty()),
    }
});

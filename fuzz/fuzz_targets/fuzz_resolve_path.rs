#![no_main]
use libfuzzer_sys::fuzz_target;
use xmldb_rar::CollectionPath;

// Whatever a user function returns, an accepted path stays under the root.
fuzz_target!(|target: &str| {
    let Ok(root) = CollectionPath::parse("/db") else {
        return;
    };
    if let Ok(resolved) = CollectionPath::resolve(&root, target) {
        assert!(resolved.starts_with(&root));
        assert!(resolved.segments().iter().all(|s| s != ".."));
    }
});

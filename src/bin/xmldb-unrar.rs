//! Extract a RAR archive into a directory-backed document store.
//!
//! # Usage
//!
//! ```bash
//! # Mirror every entry under <store>/db
//! xmldb-unrar data.rar --store ./xmldb-store
//!
//! # Only entries below docs/, with a custom root collection
//! xmldb-unrar data.rar --include docs/ --config xmldb-rar.toml
//!
//! # Print entries without storing anything
//! xmldb-unrar data.rar --list
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xmldb_rar::{
    FsStore, FunctionReference, Item, ModuleConfig, QueryContext, Sequence, Subject, UnrarCall,
    UnrarFunction,
};

/// Extract a RAR archive into an XML database store
#[derive(Parser, Debug)]
#[command(name = "xmldb-unrar")]
#[command(version, about, long_about = None)]
struct Args {
    /// First volume of the archive
    archive: PathBuf,

    /// Directory backing the document store
    #[arg(long, default_value = "./xmldb-store")]
    store: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only process entries whose name starts with PREFIX (repeatable)
    #[arg(long = "include", value_name = "PREFIX")]
    include: Vec<String>,

    /// List entries instead of storing them
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ModuleConfig::load(args.config.as_deref()).context("loading configuration")?;

    let mut store = FsStore::new(&args.store);
    let mut ctx = QueryContext::with_config(Subject::dba("admin"), &mut store, &config)
        .context("invalid configuration")?;

    let filter_param: Sequence = args.include.iter().map(|p| Item::string(p.as_str())).collect();
    let filter = FunctionReference::new("local:include", 3, |argv: &[Sequence]| {
        let name = argv[0].first().map(Item::string_value).unwrap_or_default();
        let prefixes = &argv[2];
        let accepted =
            prefixes.is_empty() || prefixes.iter().any(|p| name.starts_with(&p.string_value()));
        Ok(Sequence::one(accepted))
    });

    let stored = RefCell::new(0usize);
    let store_fn = if args.list {
        FunctionReference::new("local:list", 4, |argv: &[Sequence]| {
            let name = argv[0].first().map(Item::string_value).unwrap_or_default();
            let kind = argv[1].first().map(Item::string_value).unwrap_or_default();
            let data = match argv[2].first() {
                Some(Item::Document(doc)) => format!("document <{}>", doc.root_name()),
                Some(Item::Binary(bin)) => format!("binary {} bytes", bin.len()),
                _ => "empty".to_owned(),
            };
            println!("{kind:8} {name}  ({data})");
            Ok(Sequence::empty())
        })
    } else {
        FunctionReference::new("local:path", 3, |argv: &[Sequence]| {
            *stored.borrow_mut() += 1;
            Ok(argv[0].clone())
        })
    };

    let call = UnrarCall::new(args.archive.to_string_lossy(), filter, store_fn)
        .with_filter_param(filter_param);
    UnrarFunction::default()
        .eval(call, &mut ctx)
        .with_context(|| format!("extracting {}", args.archive.display()))?;

    if !args.list {
        tracing::info!(
            entries = *stored.borrow(),
            store = %args.store.display(),
            "extraction complete"
        );
    }
    Ok(())
}

//! Bucketed key-value store with cookie-based descending pagination.
//!
//! Records are opaque key/value byte pairs grouped into named buckets. Buckets come into
//! existence on first write and must exist for every read. Besides point lookups, a bucket can
//! be scanned from its biggest key down in pages of bounded size, see [`page`].
//!
//! ```no_run
//! let db = bucketdb::open(&bucketdb::Config::new("target/users"))?;
//! db.put("users", &1u64.to_be_bytes(), b"Alan")?;
//! let page = db.get_page("users", 10, None)?;
//! assert_eq!(page.values, vec![b"Alan".to_vec()]);
//! # Ok::<(), bucketdb::Error>(())
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod diag;
pub mod engine;
pub mod page;
pub mod record;
#[cfg(feature = "typed")]
pub mod typed;
pub mod util;

pub use crate::api::error::{Error, Result};
pub use crate::config::Config;
pub use crate::db::Db;
pub use crate::diag::{Diagnostics, LogSink, Silent};
pub use crate::engine::{DiskEngine, MemEngine};
pub use crate::page::{Page, Pages};
pub use crate::record::Record;

/// Longest key accepted by writes, in bytes.
pub const MAX_KEY_LEN: usize = 1024;

/// Open (or create) the durable store described by `config`.
pub fn open(config: &Config) -> Result<Db<DiskEngine>> {
    Ok(Db::new(DiskEngine::open(config)?))
}

/// Volatile store, gone once dropped.
pub fn memory() -> Db<MemEngine> {
    Db::new(MemEngine::new())
}

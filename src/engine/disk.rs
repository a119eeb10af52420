use log::{debug, error, info};
use parking_lot::RwLock;
use sled::{Db, IVec, Tree};

use crate::api::error::{Error, Result};
use crate::api::{Bucket, Engine, Entry, Tx, TxMut};
use crate::config::Config;

/// Every bucket is a separate sled tree named with this prefix, which keeps buckets apart
/// from sled's own default tree.
const TREE_PREFIX: &str = "bucket/";

/// Durable engine on top of sled.
///
/// Sled itself has no read-write transactions spanning multiple trees, so a single `RwLock`
/// gate serializes writers against everyone else and every update keeps an undo log
/// that is replayed when the transaction fails.
pub struct DiskEngine {
    db: Db,
    gate: RwLock<()>,
    flush_on_commit: bool,
}

impl DiskEngine {
    pub fn open(config: &Config) -> Result<Self> {
        let db = sled::Config::new()
            .path(&config.path)
            .cache_capacity(config.cache_capacity)
            .temporary(config.temporary)
            .open()?;
        info!(
            "open: path={:?} cache={} flush={} temporary={}",
            config.path, config.cache_capacity, config.flush_on_commit, config.temporary
        );
        Ok(Self {
            db,
            gate: RwLock::new(()),
            flush_on_commit: config.flush_on_commit,
        })
    }

    /// Size of the database on disk, in bytes.
    pub fn size_on_disk(&self) -> Result<u64> {
        Ok(self.db.size_on_disk()?)
    }
}

fn tree_name(bucket: &str) -> String {
    format!("{}{}", TREE_PREFIX, bucket)
}

fn entry((k, v): (IVec, IVec)) -> Entry {
    (k.to_vec(), v.to_vec())
}

fn buckets(db: &Db) -> Vec<String> {
    let mut names = db
        .tree_names()
        .into_iter()
        .filter_map(|name| {
            std::str::from_utf8(&name)
                .ok()
                .and_then(|name| name.strip_prefix(TREE_PREFIX))
                .map(|name| name.to_string())
        })
        .collect::<Vec<_>>();
    names.sort();
    names
}

fn exists(db: &Db, bucket: &str) -> bool {
    let name = tree_name(bucket);
    db.tree_names()
        .iter()
        .any(|tree| tree.as_ref() == name.as_bytes())
}

/// Opens the tree of an existing bucket, never creating one.
fn open(db: &Db, bucket: &str) -> Result<Option<Tree>> {
    if !exists(db, bucket) {
        return Ok(None);
    }
    Ok(Some(db.open_tree(tree_name(bucket))?))
}

struct DiskBucket(Tree);

impl Bucket for DiskBucket {
    fn lookup(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.0.get(key)?.map(|v| v.to_vec()))
    }

    fn min(&self) -> Result<Option<Entry>> {
        Ok(self.0.first()?.map(entry))
    }

    fn max(&self) -> Result<Option<Entry>> {
        Ok(self.0.last()?.map(entry))
    }

    fn ceil(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.0.range(key..).next().transpose()?.map(entry))
    }

    fn above(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.0.get_gt(key)?.map(entry))
    }

    fn below(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.0.get_lt(key)?.map(entry))
    }
}

struct DiskTx<'a> {
    db: &'a Db,
}

impl Tx for DiskTx<'_> {
    fn bucket(&self, name: &str) -> Result<Option<Box<dyn Bucket + '_>>> {
        Ok(open(self.db, name)?.map(|tree| Box::new(DiskBucket(tree)) as Box<dyn Bucket>))
    }

    fn buckets(&self) -> Result<Vec<String>> {
        Ok(buckets(self.db))
    }
}

enum Undo {
    Created(String),
    Dropped(String, Vec<Entry>),
    Put {
        bucket: String,
        key: Vec<u8>,
        prev: Option<Vec<u8>>,
    },
}

struct DiskTxMut<'a> {
    db: &'a Db,
    undo: Vec<Undo>,
}

impl DiskTxMut<'_> {
    fn tree(&self, bucket: &str) -> Result<Tree> {
        open(self.db, bucket)?.ok_or_else(|| Error::BucketNotFound(bucket.to_string()))
    }

    fn rollback(&mut self) -> Result<()> {
        let undo = std::mem::take(&mut self.undo);
        debug!("rollback: {} change(s)", undo.len());
        for change in undo.into_iter().rev() {
            match change {
                Undo::Created(name) => {
                    self.db.drop_tree(tree_name(&name))?;
                }
                Undo::Dropped(name, entries) => {
                    let tree = self.db.open_tree(tree_name(&name))?;
                    for (key, val) in entries {
                        tree.insert(key, val)?;
                    }
                }
                Undo::Put { bucket, key, prev } => {
                    let tree = self.db.open_tree(tree_name(&bucket))?;
                    match prev {
                        Some(val) => tree.insert(key, val)?,
                        None => tree.remove(key)?,
                    };
                }
            }
        }
        Ok(())
    }

    /// Commit a successful result or roll back. A failed commit is rolled back too.
    fn finish<T, C>(mut self, result: Result<T>, commit: C) -> Result<T>
    where
        C: FnOnce() -> Result<()>,
    {
        let result = result.and_then(|value| commit().map(|_| value));
        if result.is_err() {
            if let Err(rollback) = self.rollback() {
                error!("rollback failed: {}", rollback);
            }
        }
        result
    }
}

impl Tx for DiskTxMut<'_> {
    fn bucket(&self, name: &str) -> Result<Option<Box<dyn Bucket + '_>>> {
        Ok(open(self.db, name)?.map(|tree| Box::new(DiskBucket(tree)) as Box<dyn Bucket>))
    }

    fn buckets(&self) -> Result<Vec<String>> {
        Ok(buckets(self.db))
    }
}

impl TxMut for DiskTxMut<'_> {
    fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<bool> {
        if exists(self.db, name) {
            return Ok(false);
        }
        self.db.open_tree(tree_name(name))?;
        self.undo.push(Undo::Created(name.to_string()));
        Ok(true)
    }

    fn delete_bucket(&mut self, name: &str) -> Result<bool> {
        let tree = match open(self.db, name)? {
            Some(tree) => tree,
            None => return Ok(false),
        };
        let entries = tree
            .iter()
            .map(|r| r.map(entry))
            .collect::<sled::Result<Vec<_>>>()?;
        self.db.drop_tree(tree_name(name))?;
        self.undo.push(Undo::Dropped(name.to_string(), entries));
        Ok(true)
    }

    fn insert(&mut self, bucket: &str, key: &[u8], val: &[u8]) -> Result<Option<Vec<u8>>> {
        let prev = self.tree(bucket)?.insert(key, val)?.map(|v| v.to_vec());
        self.undo.push(Undo::Put {
            bucket: bucket.to_string(),
            key: key.to_vec(),
            prev: prev.clone(),
        });
        Ok(prev)
    }

    fn remove(&mut self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let prev = self.tree(bucket)?.remove(key)?.map(|v| v.to_vec());
        if prev.is_some() {
            self.undo.push(Undo::Put {
                bucket: bucket.to_string(),
                key: key.to_vec(),
                prev: prev.clone(),
            });
        }
        Ok(prev)
    }
}

impl Engine for DiskEngine {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Tx) -> Result<T>,
    {
        let _guard = self.gate.read();
        f(&DiskTx { db: &self.db })
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn TxMut) -> Result<T>,
    {
        let _guard = self.gate.write();
        let mut tx = DiskTxMut {
            db: &self.db,
            undo: Vec::new(),
        };
        let result = f(&mut tx);
        tx.finish(result, || {
            if self.flush_on_commit {
                self.db.flush()?;
            }
            Ok(())
        })
    }
}

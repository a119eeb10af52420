use bytes::Bytes;
use log::debug;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::api::error::{Error, Result};
use crate::api::{Bucket, Engine, Entry, Tx, TxMut};

/// Volatile engine: every bucket is a `BTreeMap`, all buckets live behind a single lock.
#[derive(Default)]
pub struct MemEngine {
    buckets: RwLock<BTreeMap<String, MemBucket>>,
}

impl MemEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default, Clone)]
pub struct MemBucket {
    map: BTreeMap<Bytes, Bytes>,
}

impl MemBucket {
    pub(crate) fn put(&mut self, key: &[u8], val: &[u8]) -> Option<Bytes> {
        self.map
            .insert(Bytes::copy_from_slice(key), Bytes::copy_from_slice(val))
    }

    pub(crate) fn del(&mut self, key: &[u8]) -> Option<Bytes> {
        self.map.remove(key)
    }

    fn range(
        &self,
        lo: Bound<&[u8]>,
        hi: Bound<&[u8]>,
    ) -> impl DoubleEndedIterator<Item = Entry> + '_ {
        self.map
            .range::<[u8], _>((lo, hi))
            .map(|(k, v)| (k.to_vec(), v.to_vec()))
    }
}

impl Bucket for MemBucket {
    fn lookup(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.get(key).map(|v| v.to_vec()))
    }

    fn min(&self) -> Result<Option<Entry>> {
        Ok(self.range(Bound::Unbounded, Bound::Unbounded).next())
    }

    fn max(&self) -> Result<Option<Entry>> {
        Ok(self.range(Bound::Unbounded, Bound::Unbounded).next_back())
    }

    fn ceil(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.range(Bound::Included(key), Bound::Unbounded).next())
    }

    fn above(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.range(Bound::Excluded(key), Bound::Unbounded).next())
    }

    fn below(&self, key: &[u8]) -> Result<Option<Entry>> {
        Ok(self.range(Bound::Unbounded, Bound::Excluded(key)).next_back())
    }
}

struct MemTx<'a> {
    buckets: &'a BTreeMap<String, MemBucket>,
}

impl Tx for MemTx<'_> {
    fn bucket(&self, name: &str) -> Result<Option<Box<dyn Bucket + '_>>> {
        Ok(self
            .buckets
            .get(name)
            .map(|b| Box::new(b) as Box<dyn Bucket + '_>))
    }

    fn buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.keys().cloned().collect())
    }
}

enum Undo {
    Created(String),
    Dropped(String, MemBucket),
    Put {
        bucket: String,
        key: Bytes,
        prev: Option<Bytes>,
    },
}

struct MemTxMut<'a> {
    buckets: &'a mut BTreeMap<String, MemBucket>,
    undo: Vec<Undo>,
}

impl MemTxMut<'_> {
    fn bucket_mut(&mut self, name: &str) -> Result<&mut MemBucket> {
        self.buckets
            .get_mut(name)
            .ok_or_else(|| Error::BucketNotFound(name.to_string()))
    }

    fn rollback(&mut self) {
        let undo = std::mem::take(&mut self.undo);
        debug!("rollback: {} change(s)", undo.len());
        for change in undo.into_iter().rev() {
            match change {
                Undo::Created(name) => {
                    self.buckets.remove(&name);
                }
                Undo::Dropped(name, bucket) => {
                    self.buckets.insert(name, bucket);
                }
                Undo::Put { bucket, key, prev } => {
                    if let Some(b) = self.buckets.get_mut(&bucket) {
                        match prev {
                            Some(val) => b.map.insert(key, val),
                            None => b.map.remove(&key),
                        };
                    }
                }
            }
        }
    }
}

impl Tx for MemTxMut<'_> {
    fn bucket(&self, name: &str) -> Result<Option<Box<dyn Bucket + '_>>> {
        Ok(self
            .buckets
            .get(name)
            .map(|b| Box::new(b) as Box<dyn Bucket + '_>))
    }

    fn buckets(&self) -> Result<Vec<String>> {
        Ok(self.buckets.keys().cloned().collect())
    }
}

impl TxMut for MemTxMut<'_> {
    fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<bool> {
        if self.buckets.contains_key(name) {
            return Ok(false);
        }
        self.buckets.insert(name.to_string(), MemBucket::default());
        self.undo.push(Undo::Created(name.to_string()));
        Ok(true)
    }

    fn delete_bucket(&mut self, name: &str) -> Result<bool> {
        match self.buckets.remove(name) {
            Some(bucket) => {
                self.undo.push(Undo::Dropped(name.to_string(), bucket));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert(&mut self, bucket: &str, key: &[u8], val: &[u8]) -> Result<Option<Vec<u8>>> {
        let prev = self.bucket_mut(bucket)?.put(key, val);
        let old = prev.as_ref().map(|v| v.to_vec());
        self.undo.push(Undo::Put {
            bucket: bucket.to_string(),
            key: Bytes::copy_from_slice(key),
            prev,
        });
        Ok(old)
    }

    fn remove(&mut self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let prev = self.bucket_mut(bucket)?.del(key);
        let old = prev.as_ref().map(|v| v.to_vec());
        if prev.is_some() {
            self.undo.push(Undo::Put {
                bucket: bucket.to_string(),
                key: Bytes::copy_from_slice(key),
                prev,
            });
        }
        Ok(old)
    }
}

impl Engine for MemEngine {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Tx) -> Result<T>,
    {
        let guard = self.buckets.read();
        let tx = MemTx { buckets: &*guard };
        f(&tx)
    }

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn TxMut) -> Result<T>,
    {
        let mut guard = self.buckets.write();
        let mut tx = MemTxMut {
            buckets: &mut *guard,
            undo: Vec::new(),
        };
        let result = f(&mut tx);
        if result.is_err() {
            tx.rollback();
        }
        result
    }
}

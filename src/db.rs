use std::sync::Arc;

use crate::api::cursor::Cursor;
use crate::api::error::{Error, Result};
use crate::api::{Bucket, Engine, Tx};
use crate::diag::{Diagnostics, LogSink};
use crate::record::Record;
use crate::util::hex::hex;
use crate::MAX_KEY_LEN;

/// Bucketed key-value store over an `Engine`.
///
/// Buckets are created implicitly by the first write into them (`put`, `store`), but never by
/// a read: `get`, `get_all`, `get_page`, `delete` on a missing bucket fail with
/// `Error::BucketNotFound`. Each call runs in its own engine transaction.
pub struct Db<E: Engine> {
    pub(crate) engine: E,
    pub(crate) diag: Arc<dyn Diagnostics>,
}

impl<E: Engine> Db<E> {
    pub fn new(engine: E) -> Self {
        Self::with_diagnostics(engine, Arc::new(LogSink))
    }

    pub fn with_diagnostics(engine: E, diag: Arc<dyn Diagnostics>) -> Self {
        Self { engine, diag }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Open an existing bucket within a transaction.
    pub(crate) fn open<'t>(&self, tx: &'t dyn Tx, bucket: &str) -> Result<Box<dyn Bucket + 't>> {
        tx.bucket(bucket)?.ok_or_else(|| {
            self.diag
                .error(format_args!("bucket not found: '{}'", bucket));
            Error::BucketNotFound(bucket.to_string())
        })
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() > MAX_KEY_LEN {
            self.diag
                .error(format_args!("key too large: {} bytes", key.len()));
            return Err(Error::KeyTooLarge(key.len()));
        }
        Ok(())
    }

    pub fn get(&self, bucket: &str, key: &[u8]) -> Result<Vec<u8>> {
        self.engine.view(|tx| {
            self.open(tx, bucket)?
                .lookup(key)?
                .ok_or_else(|| Error::KeyNotFound(key.to_vec()))
        })
    }

    /// Values for all `keys`, in the same order. Fails on the first missing key.
    pub fn get_multiple<K: AsRef<[u8]>>(&self, bucket: &str, keys: &[K]) -> Result<Vec<Vec<u8>>> {
        self.engine.view(|tx| {
            let b = self.open(tx, bucket)?;
            keys.iter()
                .map(|key| {
                    let key = key.as_ref();
                    b.lookup(key)?
                        .ok_or_else(|| Error::KeyNotFound(key.to_vec()))
                })
                .collect()
        })
    }

    pub fn contains(&self, bucket: &str, key: &[u8]) -> Result<bool> {
        self.engine
            .view(|tx| Ok(self.open(tx, bucket)?.lookup(key)?.is_some()))
    }

    /// Upsert, creating the bucket if it does not exist yet.
    pub fn put(&self, bucket: &str, key: &[u8], val: &[u8]) -> Result<()> {
        self.check_key(key)?;
        if bucket.is_empty() {
            return Err(Error::InvalidBucketName(bucket.to_string()));
        }
        self.engine.update(|tx| {
            if tx.create_bucket_if_not_exists(bucket)? {
                self.diag.info(format_args!("created bucket '{}'", bucket));
            }
            tx.insert(bucket, key, val)?;
            Ok(())
        })
    }

    pub fn store<R: Record>(&self, bucket: &str, record: &R) -> Result<()> {
        self.put(bucket, &record.key(), &record.val())
    }

    /// Remove the key and return the value it held. A missing key is not an error.
    pub fn take(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_key(key)?;
        self.engine.update(|tx| {
            if tx.bucket(bucket)?.is_none() {
                self.diag
                    .error(format_args!("bucket not found: '{}'", bucket));
                return Err(Error::BucketNotFound(bucket.to_string()));
            }
            let prev = tx.remove(bucket, key)?;
            if prev.is_none() {
                self.diag.info(format_args!(
                    "key not present: bucket='{}' key='{}'",
                    bucket,
                    hex(key)
                ));
            }
            Ok(prev)
        })
    }

    /// Deleting a key that is not present succeeds.
    pub fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        self.take(bucket, key).map(|_| ())
    }

    pub fn remove<R: Record>(&self, bucket: &str, record: &R) -> Result<()> {
        self.delete(bucket, &record.key())
    }

    pub fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.engine.update(|tx| {
            if !tx.delete_bucket(bucket)? {
                self.diag
                    .error(format_args!("bucket not found: '{}'", bucket));
                return Err(Error::BucketNotFound(bucket.to_string()));
            }
            self.diag.info(format_args!("deleted bucket '{}'", bucket));
            Ok(())
        })
    }

    /// All values of the bucket in descending key order.
    pub fn get_all(&self, bucket: &str) -> Result<Vec<Vec<u8>>> {
        self.engine.view(|tx| {
            let b = self.open(tx, bucket)?;
            let mut cursor = Cursor::new(&*b);
            let mut values = Vec::new();
            let mut entry = cursor.last()?;
            while let Some((_, val)) = entry {
                values.push(val);
                entry = cursor.prev()?;
            }
            Ok(values)
        })
    }

    pub fn buckets(&self) -> Result<Vec<String>> {
        self.engine.view(|tx| tx.buckets())
    }
}

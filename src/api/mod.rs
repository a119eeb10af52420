pub mod cursor;
pub mod error;

use crate::api::error::Result;

/// Key-value pair as stored in a bucket.
pub type Entry = (Vec<u8>, Vec<u8>);

/// Ordered byte-string keyspace of a single bucket, as seen from within a transaction.
pub trait Bucket {
    fn lookup(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Get entry with the lowest/smallest key stored in the bucket, or none if bucket is empty.
    fn min(&self) -> Result<Option<Entry>>;

    /// Get entry with the highest/biggest key stored in the bucket, or none if bucket is empty.
    fn max(&self) -> Result<Option<Entry>>;

    /// Get entry with the smallest key that is greater or equal to given one, if any.
    fn ceil(&self, key: &[u8]) -> Result<Option<Entry>>;

    /// Get entry with the smallest key that is strictly greater than given one, if any.
    fn above(&self, key: &[u8]) -> Result<Option<Entry>>;

    /// Get entry with the biggest key that is strictly lesser than given one, if any.
    fn below(&self, key: &[u8]) -> Result<Option<Entry>>;
}

/// Read-only transaction.
pub trait Tx {
    /// Open an existing bucket. Never creates one.
    fn bucket(&self, name: &str) -> Result<Option<Box<dyn Bucket + '_>>>;

    /// Names of all existing buckets in ascending order.
    fn buckets(&self) -> Result<Vec<String>>;
}

/// Read-write transaction. Either all of its changes are applied or none.
pub trait TxMut: Tx {
    /// Returns `true` if the bucket was created by this call.
    fn create_bucket_if_not_exists(&mut self, name: &str) -> Result<bool>;

    /// Drop the bucket with all its entries. Returns `false` if there was no such bucket.
    fn delete_bucket(&mut self, name: &str) -> Result<bool>;

    /// Upsert an entry into an existing bucket, returning the replaced value (if any).
    fn insert(&mut self, bucket: &str, key: &[u8], val: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Remove an entry from an existing bucket, returning the removed value (if any).
    fn remove(&mut self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>>;
}

/// Ordered, transactional, bucket-partitioned storage engine.
///
/// Any number of `view` transactions may run at the same time, `update` transactions are
/// exclusive with respect to each other and to readers.
pub trait Engine: Send + Sync {
    fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Tx) -> Result<T>;

    fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn TxMut) -> Result<T>;
}

impl<B: Bucket + ?Sized> Bucket for &B {
    fn lookup(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        (**self).lookup(key)
    }

    fn min(&self) -> Result<Option<Entry>> {
        (**self).min()
    }

    fn max(&self) -> Result<Option<Entry>> {
        (**self).max()
    }

    fn ceil(&self, key: &[u8]) -> Result<Option<Entry>> {
        (**self).ceil(key)
    }

    fn above(&self, key: &[u8]) -> Result<Option<Entry>> {
        (**self).above(key)
    }

    fn below(&self, key: &[u8]) -> Result<Option<Entry>> {
        (**self).below(key)
    }
}

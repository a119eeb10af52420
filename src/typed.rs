use std::marker::PhantomData;

use crate::api::error::{Error, Result};
use crate::api::Engine;
use crate::db::Db;

/// Typed view over a single bucket.
pub struct Collection<'a, E: Engine, K, V> {
    db: &'a Db<E>,
    bucket: String,
    _types: PhantomData<(K, V)>,
}

impl<E: Engine> Db<E> {
    pub fn collection<K, V>(&self, bucket: &str) -> Collection<'_, E, K, V>
    where
        K: AsRef<[u8]> + for<'a> From<&'a [u8]>,
        V: AsRef<[u8]> + for<'a> From<&'a [u8]>,
    {
        Collection {
            db: self,
            bucket: bucket.to_string(),
            _types: PhantomData,
        }
    }
}

impl<E, K, V> Collection<'_, E, K, V>
where
    E: Engine,
    K: AsRef<[u8]> + for<'a> From<&'a [u8]>,
    V: AsRef<[u8]> + for<'a> From<&'a [u8]>,
{
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.db.contains(&self.bucket, key.as_ref())
    }

    /// Missing key is `None`, missing bucket is still an error.
    pub fn lookup(&self, key: &K) -> Result<Option<V>> {
        match self.db.get(&self.bucket, key.as_ref()) {
            Ok(bytes) => Ok(Some(V::from(&bytes[..]))),
            Err(Error::KeyNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn insert(&self, key: &K, val: V) -> Result<()> {
        self.db.put(&self.bucket, key.as_ref(), val.as_ref())
    }

    pub fn remove(&self, key: &K) -> Result<Option<V>> {
        Ok(self
            .db
            .take(&self.bucket, key.as_ref())?
            .map(|bytes| V::from(&bytes[..])))
    }

    pub fn all(&self) -> Result<Vec<V>> {
        Ok(self
            .db
            .get_all(&self.bucket)?
            .iter()
            .map(|bytes| V::from(bytes.as_slice()))
            .collect())
    }

    /// Same as `Db::get_page`, with the cookie being a key.
    pub fn page(&self, size: usize, after: Option<&K>) -> Result<(Vec<V>, Option<K>)> {
        let page = self
            .db
            .get_page(&self.bucket, size, after.map(|k| k.as_ref()))?;
        let values = page.values.iter().map(|bytes| V::from(bytes.as_slice())).collect();
        Ok((values, page.next.map(|bytes| K::from(&bytes[..]))))
    }
}

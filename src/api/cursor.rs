use crate::api::error::Result;
use crate::api::{Bucket, Entry};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Position {
    Unset,
    At(Vec<u8>),
    /// Stepped past the smallest key.
    BeforeFirst,
    /// Seek found no key greater or equal to the target.
    AfterLast,
}

/// Positional cursor over a single bucket.
///
/// Every move returns the entry the cursor lands on, or `None` once it moves off either end.
/// Moving further off the same end keeps yielding `None`, moving back re-enters at that end:
/// `prev` after `first` yields `None`, and a `next` after that returns the first entry again.
pub struct Cursor<'a> {
    bucket: &'a dyn Bucket,
    pos: Position,
}

impl<'a> Cursor<'a> {
    pub fn new(bucket: &'a dyn Bucket) -> Self {
        Self {
            bucket,
            pos: Position::Unset,
        }
    }

    pub fn first(&mut self) -> Result<Option<Entry>> {
        let entry = self.bucket.min()?;
        self.land(entry, Position::AfterLast)
    }

    pub fn last(&mut self) -> Result<Option<Entry>> {
        let entry = self.bucket.max()?;
        self.land(entry, Position::BeforeFirst)
    }

    /// Position at the smallest key greater or equal to `key`.
    pub fn seek(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let entry = self.bucket.ceil(key)?;
        self.land(entry, Position::AfterLast)
    }

    pub fn next(&mut self) -> Result<Option<Entry>> {
        let entry = match &self.pos {
            Position::At(key) => self.bucket.above(key)?,
            Position::BeforeFirst => self.bucket.min()?,
            Position::AfterLast | Position::Unset => return Ok(None),
        };
        self.land(entry, Position::AfterLast)
    }

    pub fn prev(&mut self) -> Result<Option<Entry>> {
        let entry = match &self.pos {
            Position::At(key) => self.bucket.below(key)?,
            Position::AfterLast => self.bucket.max()?,
            Position::BeforeFirst | Position::Unset => return Ok(None),
        };
        self.land(entry, Position::BeforeFirst)
    }

    fn land(&mut self, entry: Option<Entry>, off: Position) -> Result<Option<Entry>> {
        self.pos = match &entry {
            Some((key, _)) => Position::At(key.clone()),
            None => off,
        };
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mem::MemBucket;

    fn bucket(keys: &[&[u8]]) -> MemBucket {
        let mut bucket = MemBucket::default();
        for key in keys {
            bucket.put(key, &[key[0] + 100]);
        }
        bucket
    }

    fn key(entry: Option<Entry>) -> Option<Vec<u8>> {
        entry.map(|(k, _)| k)
    }

    #[test]
    fn test_walk_backward() -> Result<()> {
        let bucket = bucket(&[b"a", b"c", b"e"]);
        let mut cursor = Cursor::new(&bucket);

        assert_eq!(cursor.last()?, Some((b"e".to_vec(), vec![b'e' + 100])));
        assert_eq!(key(cursor.prev()?), Some(b"c".to_vec()));
        assert_eq!(key(cursor.prev()?), Some(b"a".to_vec()));
        assert_eq!(cursor.prev()?, None);
        assert_eq!(cursor.prev()?, None);
        assert_eq!(key(cursor.next()?), Some(b"a".to_vec()));
        Ok(())
    }

    #[test]
    fn test_walk_forward() -> Result<()> {
        let bucket = bucket(&[b"a", b"c", b"e"]);
        let mut cursor = Cursor::new(&bucket);

        assert_eq!(key(cursor.first()?), Some(b"a".to_vec()));
        assert_eq!(key(cursor.next()?), Some(b"c".to_vec()));
        assert_eq!(key(cursor.next()?), Some(b"e".to_vec()));
        assert_eq!(cursor.next()?, None);
        assert_eq!(key(cursor.prev()?), Some(b"e".to_vec()));
        Ok(())
    }

    #[test]
    fn test_seek() -> Result<()> {
        let bucket = bucket(&[b"a", b"c", b"e"]);
        let mut cursor = Cursor::new(&bucket);

        assert_eq!(key(cursor.seek(b"c")?), Some(b"c".to_vec()));
        assert_eq!(key(cursor.seek(b"b")?), Some(b"c".to_vec()));
        assert_eq!(key(cursor.prev()?), Some(b"a".to_vec()));

        assert_eq!(cursor.seek(b"f")?, None);
        assert_eq!(key(cursor.prev()?), Some(b"e".to_vec()));
        Ok(())
    }

    #[test]
    fn test_empty() -> Result<()> {
        let bucket = MemBucket::default();
        let mut cursor = Cursor::new(&bucket);

        assert_eq!(cursor.prev()?, None);
        assert_eq!(cursor.last()?, None);
        assert_eq!(cursor.first()?, None);
        assert_eq!(cursor.seek(b"x")?, None);
        Ok(())
    }
}

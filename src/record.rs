/// Anything that can be stored in a bucket: produces its key bytes and its value bytes.
///
/// The store never interprets either of them.
pub trait Record {
    fn key(&self) -> Vec<u8>;
    fn val(&self) -> Vec<u8>;
}

impl<K, V> Record for (K, V)
where
    K: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    fn key(&self) -> Vec<u8> {
        self.0.as_ref().to_vec()
    }

    fn val(&self) -> Vec<u8> {
        self.1.as_ref().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_pairs() {
        let record = (b"key".to_vec(), "val");
        assert_eq!(record.key(), b"key".to_vec());
        assert_eq!(record.val(), b"val".to_vec());

        let record = (Bytes::from_static(b"k"), [1u8, 2, 3]);
        assert_eq!(record.key(), b"k".to_vec());
        assert_eq!(record.val(), vec![1, 2, 3]);
    }
}

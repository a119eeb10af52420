use std::fmt::Formatter;
use std::io;
use std::result;

use crate::util::hex::hex;

#[derive(Debug)]
pub enum Error {
    /// Read path referenced a bucket that was never created (or was dropped).
    BucketNotFound(String),
    InvalidBucketName(String),
    /// Key length in bytes, above `MAX_KEY_LEN`.
    KeyTooLarge(usize),
    KeyNotFound(Vec<u8>),
    /// Pagination cookie that does not resolve to a resumption point.
    InvalidCookie(Vec<u8>),
    IO(io::Error),
    Engine(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BucketNotFound(name) => write!(f, "Bucket not found: '{}'.", name),
            Error::InvalidBucketName(name) => write!(f, "Invalid bucket name: '{}'.", name),
            Error::KeyTooLarge(len) => write!(
                f,
                "Key too large: {} bytes (max length is {} bytes).",
                len,
                crate::MAX_KEY_LEN
            ),
            Error::KeyNotFound(key) => write!(f, "Key not found: '{}'.", hex(key)),
            Error::InvalidCookie(cookie) => write!(f, "Invalid cookie: '{}'.", hex(cookie)),
            Error::IO(io) => write!(f, "IO error: '{}'.", io),
            Error::Engine(e) => write!(f, "Engine error: '{}'.", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IO(io) => Some(io),
            Error::Engine(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::IO(e)
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        match e {
            sled::Error::Io(io) => Error::IO(io),
            other => Error::Engine(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::BucketNotFound("users".to_string()).to_string(),
            "Bucket not found: 'users'."
        );
        assert_eq!(
            Error::KeyNotFound(vec![0x01, 0xab]).to_string(),
            "Key not found: '01ab'."
        );
        assert_eq!(
            Error::KeyTooLarge(1025).to_string(),
            "Key too large: 1025 bytes (max length is 1024 bytes)."
        );
    }

    #[test]
    fn test_source() {
        use std::error::Error as _;

        let e: Error = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert!(e.source().is_some());
        assert!(Error::InvalidCookie(vec![42]).source().is_none());
    }
}

//! Resumable descending range scans.
//!
//! A page request names a bucket, a page size and an optional cookie. Without a cookie the
//! scan starts at the biggest key of the bucket, with a cookie it resumes right below the key
//! the cookie carries. The cookie handed back with a page is the key of its last value, and it
//! is only handed back while there is something left below that key. So the caller is done
//! once a page comes back without one.
//!
//! No state is kept between calls: every page is read in its own transaction, and the cookie
//! alone carries the position. A cookie that does not name a key currently stored in the
//! bucket (never stored, deleted since, past the end of keyspace, or the very first key) is
//! rejected with `Error::InvalidCookie`.

use crate::api::cursor::Cursor;
use crate::api::error::{Error, Result};
use crate::api::Engine;
use crate::db::Db;
use crate::util::hex::hex;

/// Values in descending key order and the cookie to fetch the page that follows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub values: Vec<Vec<u8>>,
    pub next: Option<Vec<u8>>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<E: Engine> Db<E> {
    /// Fetch up to `size` values walking `bucket` towards smaller keys.
    pub fn get_page(&self, bucket: &str, size: usize, cookie: Option<&[u8]>) -> Result<Page> {
        self.engine.view(|tx| {
            let b = self.open(tx, bucket)?;
            let mut cursor = Cursor::new(&*b);

            let mut entry = match cookie {
                None => cursor.last()?,
                Some(cookie) => {
                    let found = cursor.seek(cookie)?;
                    if !matches!(&found, Some((key, _)) if key == cookie) {
                        return Err(self.invalid_cookie(bucket, cookie));
                    }
                    match cursor.prev()? {
                        Some(entry) => Some(entry),
                        None => return Err(self.invalid_cookie(bucket, cookie)),
                    }
                }
            };

            let mut values = Vec::with_capacity(size.min(1024));
            let mut last = None;
            while values.len() < size {
                match entry {
                    Some((key, val)) => {
                        values.push(val);
                        last = Some(key);
                        entry = cursor.prev()?;
                    }
                    None => break,
                }
            }

            // The cookie is only worth handing out if the cursor still stands on something.
            let next = entry.and(last);
            Ok(Page { values, next })
        })
    }

    /// Iterate over the whole bucket page by page, feeding each cookie into the next request.
    ///
    /// Stops after the last page or after yielding the first error.
    pub fn pages(&self, bucket: &str, size: usize) -> Pages<'_, E> {
        Pages {
            db: self,
            bucket: bucket.to_string(),
            size,
            cookie: None,
            done: false,
        }
    }

    fn invalid_cookie(&self, bucket: &str, cookie: &[u8]) -> Error {
        self.diag.error(format_args!(
            "invalid cookie: bucket='{}' cookie='{}'",
            bucket,
            hex(cookie)
        ));
        Error::InvalidCookie(cookie.to_vec())
    }
}

pub struct Pages<'a, E: Engine> {
    db: &'a Db<E>,
    bucket: String,
    size: usize,
    cookie: Option<Vec<u8>>,
    done: bool,
}

impl<E: Engine> Iterator for Pages<'_, E> {
    type Item = Result<Vec<Vec<u8>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self
            .db
            .get_page(&self.bucket, self.size, self.cookie.as_deref())
        {
            Ok(page) => {
                self.done = page.next.is_none();
                self.cookie = page.next;
                if page.values.is_empty() {
                    None
                } else {
                    Some(Ok(page.values))
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{decode, disk, mem, users};
    use crate::record::Record;
    use crate::util;

    fn key(id: u64) -> Vec<u8> {
        id.to_le_bytes().to_vec()
    }

    fn fill<E: Engine>(db: &Db<E>) {
        for user in users() {
            db.store("users", &user).unwrap();
        }
    }

    fn check_scenario<E: Engine>(db: &Db<E>) {
        fill(db);
        assert_eq!(decode(&db.get_all("users").unwrap()), vec![5, 4, 3, 2, 1]);

        let page = db.get_page("users", 2, None).unwrap();
        assert_eq!(decode(&page.values), vec![5, 4]);
        assert_eq!(page.next, Some(key(4)));

        let page = db.get_page("users", 1, Some(&key(4)[..])).unwrap();
        assert_eq!(decode(&page.values), vec![3]);
        assert_eq!(page.next, Some(key(3)));

        let page = db.get_page("users", 2, Some(&key(3)[..])).unwrap();
        assert_eq!(decode(&page.values), vec![2, 1]);
        assert_eq!(page.next, None);
    }

    fn check_subdivision<E: Engine>(db: &Db<E>) {
        fill(db);
        let all = db.get_all("users").unwrap();

        let mut concat = Vec::new();
        let mut cookie: Option<Vec<u8>> = None;
        for size in [2, 1, 2].iter() {
            let page = db.get_page("users", *size, cookie.as_deref()).unwrap();
            assert_eq!(page.len(), *size);
            concat.extend(page.values);
            cookie = page.next;
        }
        assert_eq!(cookie, None);
        assert_eq!(concat, all);
    }

    fn check_invalid_cookie<E: Engine>(db: &Db<E>) {
        fill(db);
        let invalid = |cookie: &[u8]| {
            matches!(
                db.get_page("users", 2, Some(cookie)),
                Err(Error::InvalidCookie(c)) if c == cookie
            )
        };

        // Beyond the biggest key.
        assert!(invalid(&key(20)));
        // Between stored keys, never stored.
        assert!(invalid(&[3, 0, 0, 0, 0, 0, 0, 1]));
        // Smallest key: nothing below it.
        assert!(invalid(&key(1)));
        // Stale: key deleted after the cookie was handed out.
        let page = db.get_page("users", 2, None).unwrap();
        let cookie = page.next.unwrap();
        db.delete("users", &cookie).unwrap();
        assert!(invalid(&cookie));
    }

    fn check_empty_bucket<E: Engine>(db: &Db<E>) {
        db.put("empty", b"k", b"v").unwrap();
        db.delete("empty", b"k").unwrap();

        assert_eq!(db.get_page("empty", 10, None).unwrap(), Page::default());
        assert!(matches!(
            db.get_page("empty", 10, Some(b"k")),
            Err(Error::InvalidCookie(_))
        ));
        assert_eq!(db.pages("empty", 10).count(), 0);
    }

    fn check_sizes<E: Engine>(db: &Db<E>) {
        fill(db);

        let page = db.get_page("users", 100, None).unwrap();
        assert_eq!(decode(&page.values), vec![5, 4, 3, 2, 1]);
        assert_eq!(page.next, None);

        // Exactly the rest: nothing left below, no cookie.
        let page = db.get_page("users", 4, Some(&key(5)[..])).unwrap();
        assert_eq!(decode(&page.values), vec![4, 3, 2, 1]);
        assert_eq!(page.next, None);

        let page = db.get_page("users", 0, None).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next, None);
    }

    fn check_completeness<E: Engine>(db: &Db<E>) {
        // Value is the key itself, so order can be checked on values alone.
        let data = util::data(97, 42);
        for (k, _) in data.iter() {
            db.put("random", k, k).unwrap();
        }
        let all = db.get_all("random").unwrap();
        assert_eq!(all.len(), data.len());

        for size in [1, 2, 3, 10, 96, 97, 98].iter() {
            let pages = db
                .pages("random", *size)
                .collect::<Result<Vec<_>>>()
                .unwrap();
            assert_eq!(pages.len(), (all.len() + size - 1) / size);
            assert!(pages.iter().all(|p| p.len() <= *size));

            let visited = pages.into_iter().flatten().collect::<Vec<_>>();
            assert!(visited.windows(2).all(|w| w[0] > w[1]));
            assert_eq!(visited, all);
        }
    }

    fn check_pages_error<E: Engine>(db: &Db<E>) {
        let mut pages = db.pages("nope", 2);
        assert!(matches!(pages.next(), Some(Err(Error::BucketNotFound(_)))));
        assert!(pages.next().is_none());
    }

    fn check_key_agnostic<E: Engine>(db: &Db<E>) {
        for k in ["b", "ab", "a", "ba", "bb"].iter() {
            db.put("strings", k.as_bytes(), k.as_bytes()).unwrap();
        }

        let page = db.get_page("strings", 3, None).unwrap();
        assert_eq!(page.values, vec![b"bb".to_vec(), b"ba".to_vec(), b"b".to_vec()]);
        assert_eq!(page.next, Some(b"b".to_vec()));

        let page = db.get_page("strings", 3, page.next.as_deref()).unwrap();
        assert_eq!(page.values, vec![b"ab".to_vec(), b"a".to_vec()]);
        assert_eq!(page.next, None);

        let record = ("zzz", "last");
        db.store("strings", &record).unwrap();
        let page = db.get_page("strings", 1, None).unwrap();
        assert_eq!(page.values, vec![record.val()]);
    }

    macro_rules! both {
        ($check:ident, $mem:ident, $disk:ident) => {
            #[test]
            fn $mem() {
                $check(&mem());
            }

            #[test]
            fn $disk() {
                $check(&disk(stringify!($disk)));
            }
        };
    }

    both!(check_scenario, test_scenario_mem, test_scenario_disk);
    both!(check_subdivision, test_subdivision_mem, test_subdivision_disk);
    both!(check_invalid_cookie, test_invalid_cookie_mem, test_invalid_cookie_disk);
    both!(check_empty_bucket, test_page_empty_bucket_mem, test_page_empty_bucket_disk);
    both!(check_sizes, test_sizes_mem, test_sizes_disk);
    both!(check_completeness, test_completeness_mem, test_completeness_disk);
    both!(check_pages_error, test_pages_error_mem, test_pages_error_disk);
    both!(check_key_agnostic, test_key_agnostic_mem, test_key_agnostic_disk);
}

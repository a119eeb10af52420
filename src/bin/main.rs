use log::{debug, error, info};
use std::collections::BTreeMap;
use std::time::SystemTime;

use bucketdb::api::Engine;
use bucketdb::util::{self, hex::hex};
use bucketdb::{Config, Db, DiskEngine};

const BUCKET: &str = "bench";

fn rate(count: usize, millis: u128) -> u128 {
    count as u128 * 1000 / millis.max(1)
}

fn benchmark<E: Engine>(db: &Db<E>, count: usize, page: usize) -> anyhow::Result<()> {
    let data = util::data(count, 42);
    // Last write wins for a repeated key.
    let latest = data.iter().cloned().collect::<BTreeMap<_, _>>();

    let mut now = SystemTime::now();
    for (k, v) in data.iter() {
        debug!("insert: key='{}' val='{}'", hex(k), hex(v));
        db.put(BUCKET, k, v)?;
    }
    let mut millis = now.elapsed().unwrap_or_default().as_millis();
    info!("insert: {} ms (rate={} op/s)", millis, rate(count, millis));

    now = SystemTime::now();
    let mut errors = 0;
    for (k, v) in latest.iter() {
        let r = db.get(BUCKET, k)?;
        if &r != v {
            error!(
                "key='{}': expected '{}' but got '{}'",
                hex(k),
                hex(v),
                hex(&r)
            );
            errors += 1;
        }
    }
    millis = now.elapsed().unwrap_or_default().as_millis();
    info!("lookup: {} ms (rate={} op/s)", millis, rate(count, millis));
    if errors > 0 {
        error!("lookup errors: {}", errors);
    }

    let expected = latest.into_iter().rev().collect::<Vec<_>>();

    now = SystemTime::now();
    let mut n = 0usize;
    let mut pages = 0usize;
    for values in db.pages(BUCKET, page) {
        for val in values? {
            if expected.get(n).map(|(_, v)| v) != Some(&val) {
                error!("page: desc order violated at n={} val='{}'", n, hex(&val));
                break;
            }
            n += 1;
        }
        pages += 1;
    }
    millis = now.elapsed().unwrap_or_default().as_millis();
    info!(
        "pages: {} ms (rate={} op/s) n={} pages={}",
        millis,
        rate(n, millis),
        n,
        pages
    );
    if n != expected.len() {
        error!("pages: visited {} of {} entries", n, expected.len());
    }

    now = SystemTime::now();
    for (key, _) in util::shuffle(data, 42).iter() {
        db.delete(BUCKET, key)?;
        if db.contains(BUCKET, key)? {
            error!("key='{}' not removed", hex(key));
        }
    }
    millis = now.elapsed().unwrap_or_default().as_millis();
    info!("remove: {} ms (rate={} op/s)", millis, rate(count, millis));

    if !db.get_all(BUCKET)?.is_empty() {
        error!("non-empty bucket");
    }
    db.delete_bucket(BUCKET)?;
    Ok(())
}

fn stats(db: &Db<DiskEngine>) -> anyhow::Result<()> {
    info!(
        "stats: buckets={:?} size={} bytes",
        db.buckets()?,
        db.engine().size_on_disk()?
    );
    Ok(())
}

// RUST_LOG=info cargo run --release --bin bucketdb-bench -- disk 100000 100
fn main() -> anyhow::Result<()> {
    env_logger::init();
    let mut it = std::env::args().skip(1);
    let target = it.next().unwrap_or_else(|| "mem".to_string());
    let count = it
        .next()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(1000);
    let page = it
        .next()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(100);

    match target.as_str() {
        "mem" => {
            info!("target={} count={} page={}", target, count, page);
            benchmark(&bucketdb::memory(), count, page)
        }
        "disk" => {
            let config = Config::from_env();
            std::fs::remove_dir_all(&config.path).ok();
            info!(
                "target={} path={:?} count={} page={}",
                target, config.path, count, page
            );
            let db: Db<DiskEngine> = bucketdb::open(&config)?;
            benchmark(&db, count, page)?;
            stats(&db)?;
            drop(db);
            std::fs::remove_dir_all(&config.path).ok();
            Ok(())
        }
        other => anyhow::bail!("unknown target '{}' (expected 'mem' or 'disk')", other),
    }
}

use std::fmt::Arguments;

/// Sink for the store's diagnostic lines. Injected into `Db` at construction.
pub trait Diagnostics: Send + Sync {
    fn info(&self, args: Arguments);
    fn error(&self, args: Arguments);
}

/// Forwards to the `log` facade under the `bucketdb` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Diagnostics for LogSink {
    fn info(&self, args: Arguments) {
        log::info!(target: "bucketdb", "{}", args);
    }

    fn error(&self, args: Arguments) {
        log::error!(target: "bucketdb", "{}", args);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Diagnostics for Silent {
    fn info(&self, _args: Arguments) {}

    fn error(&self, _args: Arguments) {}
}

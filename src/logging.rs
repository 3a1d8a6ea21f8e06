use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_MAX_BYTES: u64 = 10 * 1024 * 1024;

pub fn init_logging(log_level: Level, log_file: Option<&str>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);

    if let Some(path) = log_file {
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(capped_file_writer(PathBuf::from(path), LOG_FILE_MAX_BYTES));
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .with(file_layer.with_filter(level_filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(stdout_layer.with_filter(level_filter))
            .init();
    }
}

fn capped_file_writer(path: PathBuf, max_len: u64) -> impl Fn() -> CappedFileWriter {
    let lock = Arc::new(Mutex::new(()));
    move || CappedFileWriter { path: path.clone(), max_len, lock: lock.clone() }
}

/// Appends to a file and, once it reaches `max_len`, keeps only the newest half.
struct CappedFileWriter {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

impl CappedFileWriter {
    fn shrink(&self) -> io::Result<()> {
        let keep_bytes = self.max_len / 2;
        let mut tail = Vec::new();
        {
            let mut rf = OpenOptions::new().read(true).open(&self.path)?;
            let size = rf.metadata()?.len();
            rf.seek(SeekFrom::Start(size.saturating_sub(keep_bytes)))?;
            rf.read_to_end(&mut tail)?;
        }
        let mut wf = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        wf.write_all(&tail)
    }
}

impl Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        let over_cap = std::fs::metadata(&self.path).map(|m| m.len() >= self.max_len).unwrap_or(false);
        if over_cap {
            self.shrink()?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

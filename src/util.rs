use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

static INIT_ONCE: std::sync::Once = std::sync::Once::new();
pub fn init_tracing_once() {
    INIT_ONCE.call_once(|| {
        let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init();
    });
}

// -------- file ops with backoff (AV scanners, network shares, sharing violations) --------

const TRIES: usize = 16;
const DELAY_MS: u64 = 50;

/// Transient OS errors worth retrying:
///   5 access denied (AV/share), 21 device not ready, 32 sharing violation,
///   33 lock violation, 1224 user-mapped section open.
fn is_retriable_io_error(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(5) | Some(21) | Some(32) | Some(33) | Some(1224))
}

/// Run `op` until it succeeds, fails permanently, or `tries` attempts are used,
/// sleeping a linearly growing delay between attempts.
fn with_backoff<T>(tries: usize, delay_ms: u64, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let mut last_err: Option<io::Error> = None;
    for i in 0..tries.max(1) {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if is_retriable_io_error(&e) => {
                last_err = Some(e);
                sleep(Duration::from_millis(delay_ms.saturating_mul((i + 1) as u64)));
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "retries exhausted")))
}

pub fn open_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(TRIES, DELAY_MS, || File::open(path))
}

pub fn create_with_backoff(path: &Path) -> io::Result<File> {
    with_backoff(TRIES, DELAY_MS, || File::create(path))
}

/// Temp sibling used while an output is being written: `out.csv` -> `.out.csv.inprogress`.
pub fn staging_path(dest: &Path) -> PathBuf {
    let name = dest.file_name().and_then(|s| s.to_str()).unwrap_or("output");
    dest.with_file_name(format!(".{name}.inprogress"))
}

/// Replace `dest` with `tmp`. Falls back to copy+remove when rename is refused.
pub fn replace_file_atomic_backoff(tmp: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        with_backoff(TRIES, DELAY_MS, || match fs::remove_file(dest) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .with_context(|| format!("remove {}", dest.display()))?;
    }
    if with_backoff(TRIES, DELAY_MS, || fs::rename(tmp, dest)).is_ok() {
        return Ok(());
    }
    with_backoff(TRIES, DELAY_MS, || fs::copy(tmp, dest))
        .with_context(|| format!("copy {} -> {}", tmp.display(), dest.display()))?;
    with_backoff(TRIES, DELAY_MS, || fs::remove_file(tmp))
        .with_context(|| format!("remove {}", tmp.display()))?;
    Ok(())
}

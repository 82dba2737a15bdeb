use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use uuid::Uuid;

/// One generation attempt as written to disk.
#[derive(Debug, Serialize)]
pub struct Exchange<'a> {
    pub stage: &'a str,
    pub provider: &'a str,
    pub model: &'a str,
    pub timestamp: DateTime<Utc>,
    pub instruction: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-run directory `<root>/<session>/` holding `NN-<stage>.json` files.
pub struct Transcript {
    dir: PathBuf,
    session: Uuid,
    seq: AtomicUsize,
}

impl Transcript {
    pub fn create(root: &Path) -> anyhow::Result<Self> {
        let session = Uuid::new_v4();
        let dir = root.join(session.to_string());
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "transcript directory created");
        Ok(Self { dir, session, seq: AtomicUsize::new(0) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    pub fn record(&self, exchange: &Exchange<'_>) -> anyhow::Result<PathBuf> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.dir.join(format!("{seq:02}-{}.json", exchange.stage));
        fs::write(&path, to_string_pretty(exchange)?)?;
        debug!(path = %path.display(), "exchange recorded");
        Ok(path)
    }
}

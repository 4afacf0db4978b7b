use std::path::{Path, PathBuf};

/// Marker directory: when a persistent volume is mounted here (Render/Railway
/// style disks), the store lives under it and survives redeploys.
const DATA_VOLUME: &str = "/data";

/// File name of the store inside the chosen directory.
const STORE_FILE: &str = "pcshop.db";

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u64 = 10_000;

/// Resolved location of the store plus connection parameters.
#[derive(Debug, Clone)]
pub struct StorePath {
    pub path: PathBuf,
    pub busy_timeout_ms: u64,
    pub shared_cache: bool,
}

/// Decide where the store lives. Pure function of the environment with no
/// side effects and no failure mode: the working-directory fallback is always
/// available. Called exactly once per process, in `server::run_with_port`.
pub fn resolve() -> StorePath {
    resolve_under(Path::new(DATA_VOLUME), Path::new("."))
}

pub(crate) fn resolve_under(volume: &Path, fallback: &Path) -> StorePath {
    let dir = if volume.is_dir() { volume } else { fallback };
    StorePath {
        path: dir.join(STORE_FILE),
        busy_timeout_ms: BUSY_TIMEOUT_MS,
        shared_cache: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn prefers_volume_when_present() {
        let volume = tempdir().unwrap();
        let fallback = tempdir().unwrap();
        let resolved = resolve_under(volume.path(), fallback.path());
        assert_eq!(resolved.path, volume.path().join(STORE_FILE));
        assert_eq!(resolved.busy_timeout_ms, BUSY_TIMEOUT_MS);
        assert!(resolved.shared_cache);
    }

    #[test]
    fn falls_back_when_volume_absent() {
        let fallback = tempdir().unwrap();
        let missing = fallback.path().join("no-such-volume");
        let resolved = resolve_under(&missing, fallback.path());
        assert_eq!(resolved.path, fallback.path().join(STORE_FILE));
    }

    #[test]
    fn resolution_is_deterministic() {
        let fallback = tempdir().unwrap();
        let missing = fallback.path().join("no-such-volume");
        let a = resolve_under(&missing, fallback.path());
        let b = resolve_under(&missing, fallback.path());
        assert_eq!(a.path, b.path);
    }
}

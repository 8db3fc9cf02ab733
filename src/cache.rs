use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::extract::{ExtractionProvider, SourceDocument};
use crate::model::RawQuiz;

/// Remembers successful extractions, keyed by the SHA-256 of the document, so
/// the same PDF is never sent upstream twice. Failures, including quizzes that
/// do not pass validation, are not cached.
pub struct CachingProvider<P> {
    inner: P,
    dir: PathBuf,
}

impl<P: ExtractionProvider> CachingProvider<P> {
    pub fn new(inner: P, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, document: &SourceDocument) -> PathBuf {
        self.dir.join(format!("{}.json", document.sha256_hex()))
    }

    fn load(&self, path: &Path) -> Option<RawQuiz> {
        let content = fs::read_to_string(path).ok()?;
        let raw: RawQuiz = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt cache entry");
                return None;
            }
        };
        if let Err(e) = raw.clone().validate() {
            warn!(path = %path.display(), error = %e, "ignoring invalid cache entry");
            return None;
        }
        Some(raw)
    }

    fn store(&self, path: &Path, raw: &RawQuiz) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("Cannot create cache dir: {}", e))?;
        let json = serde_json::to_string_pretty(raw)
            .map_err(|e| format!("Cannot encode cache entry: {}", e))?;
        atomic_write(path, &json)
    }
}

impl<P: ExtractionProvider> ExtractionProvider for CachingProvider<P> {
    fn extract(&self, document: &SourceDocument) -> Result<RawQuiz, ExtractionError> {
        let path = self.entry_path(document);
        if let Some(raw) = self.load(&path) {
            info!(file = %document.file_name(), "using cached extraction");
            return Ok(raw);
        }

        let raw = self.inner.extract(document)?;
        // A quiz the session would reject is a failed extraction; leave it
        // out so the next attempt reaches the provider again.
        if let Err(e) = raw.clone().validate() {
            debug!(error = %e, "not caching invalid extraction");
        } else if let Err(e) = self.store(&path, &raw) {
            warn!(error = %e, "could not cache extraction");
        } else {
            debug!(path = %path.display(), "extraction cached");
        }
        Ok(raw)
    }
}

pub fn clear_cache(dir: &Path) -> Result<(), String> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| format!("Cannot clear cache: {}", e))?;
    }
    Ok(())
}

pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), String> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content).map_err(|e| format!("Cannot write {}: {}", tmp.display(), e))?;
    fs::rename(&tmp, path).map_err(|e| format!("Cannot rename: {}", e))?;
    Ok(())
}

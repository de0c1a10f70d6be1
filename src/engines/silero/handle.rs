use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::SynthConfig;
use crate::error::{Result, VoiceSynthError};
use crate::{has_extension, MODEL_EXTENSION};

use super::catalog::{Catalog, CatalogEntry};

/// Progress is reported every this many bytes when the size is unknown.
const UNSIZED_PROGRESS_STEP: u64 = 16 * 1024 * 1024;

/// A catalog model resolved to a local weight file and an active speaker.
///
/// The weight file exists once construction succeeds. It is never checked
/// for integrity: a file already present at the path is trusted as-is, so
/// delete it to force a fresh download.
///
/// The presence check and the download are not atomic. Two processes
/// acquiring the same path at once may both download, and one may observe
/// the other's partially written file.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    entry: CatalogEntry,
    local_path: PathBuf,
    speaker: String,
    log_enabled: bool,
}

impl ModelHandle {
    /// Resolve `model_id` in the built-in catalog and acquire its weights at
    /// `local_path`.
    pub fn new(
        model_id: &str,
        local_path: impl AsRef<Path>,
        config: &SynthConfig,
    ) -> Result<Self> {
        Self::with_catalog(Catalog::builtin(), model_id, local_path, config)
    }

    /// Resolve `model_id` in `catalog` and acquire its weights at `local_path`.
    ///
    /// The active speaker starts as the entry's first speaker. `local_path`
    /// must end in `.pt`.
    pub fn with_catalog(
        catalog: &Catalog,
        model_id: &str,
        local_path: impl AsRef<Path>,
        config: &SynthConfig,
    ) -> Result<Self> {
        let entry = catalog.lookup(model_id)?.clone();
        let speaker = entry.default_speaker().to_string();
        info_if!(config.log_enabled, "Model {} configured", entry.id);

        let local_path = local_path.as_ref().to_path_buf();
        if !has_extension(&local_path, MODEL_EXTENSION) {
            return Err(VoiceSynthError::InvalidModelPath(local_path));
        }

        let handle = Self {
            entry,
            local_path,
            speaker,
            log_enabled: config.log_enabled,
        };
        handle.acquire(config)?;
        Ok(handle)
    }

    /// Make sure the weight file exists, downloading it if it does not.
    ///
    /// A no-op when any file is already present at the local path.
    pub fn acquire(&self, config: &SynthConfig) -> Result<()> {
        if self.local_path.exists() {
            info_if!(
                config.log_enabled,
                "Using existing model file {}",
                self.local_path.display()
            );
            return Ok(());
        }

        info_if!(
            config.log_enabled,
            "Downloading model {} from {}",
            self.entry.id,
            self.entry.url
        );
        download(&self.entry.url, &self.local_path, config)
    }

    /// Switch the active speaker.
    ///
    /// Fails with [`VoiceSynthError::InvalidSpeaker`] listing every valid
    /// speaker when `name` is unknown to the model; the current speaker is
    /// kept in that case.
    pub fn set_speaker(&mut self, name: &str) -> Result<()> {
        let speaker = self.entry.speaker(name)?;
        self.speaker = speaker.to_string();
        info_if!(self.log_enabled, "Speaker {} set", self.speaker);
        Ok(())
    }

    pub fn model_id(&self) -> &str {
        &self.entry.id
    }

    pub fn speaker(&self) -> &str {
        &self.speaker
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }
}

/// Fetch `url` into `dest` with a single blocking GET.
///
/// A partially written file is removed when the transfer fails, so the
/// presence check never trusts it later.
fn download(url: &str, dest: &Path, config: &SynthConfig) -> Result<()> {
    let failure = |reason: String| VoiceSynthError::DownloadFailure {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(None)
        .build()
        .map_err(|e| failure(format!("failed building HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| failure(e.to_string()))?;
    let total = response.content_length();

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(dest)?;
    let mut reader = ProgressReader::new(response, total, config.show_progress);
    let result = io::copy(&mut reader, &mut file)
        .and_then(|_| file.flush())
        .map_err(|e| failure(format!("transfer interrupted: {e}")));

    if result.is_err() {
        drop(file);
        let _ = fs::remove_file(dest);
    } else {
        log::debug!("Wrote {} bytes to {}", reader.read, dest.display());
    }
    result
}

/// Logs transfer progress in 10% steps while passing bytes through.
struct ProgressReader<R> {
    inner: R,
    total: Option<u64>,
    read: u64,
    next_report: u64,
    enabled: bool,
}

impl<R: Read> ProgressReader<R> {
    fn new(inner: R, total: Option<u64>, enabled: bool) -> Self {
        let mut reader = Self {
            inner,
            total,
            read: 0,
            next_report: 0,
            enabled,
        };
        reader.next_report = reader.step();
        reader
    }

    fn step(&self) -> u64 {
        match self.total {
            Some(total) if total > 0 => (total / 10).max(1),
            _ => UNSIZED_PROGRESS_STEP,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;

        if self.enabled && self.read >= self.next_report {
            match self.total {
                Some(total) if total > 0 => log::info!(
                    "Downloaded {}% ({} / {} bytes)",
                    (self.read * 100 / total).min(100),
                    self.read,
                    total
                ),
                _ => log::info!("Downloaded {} bytes", self.read),
            }
            while self.next_report <= self.read {
                self.next_report += self.step();
            }
        }
        Ok(n)
    }
}

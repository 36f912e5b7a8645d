//! Audio artifacts and their shared lifecycle.
//!
//! Artifacts are named by platform video id, so two runs for the same video
//! land on the same file. The [`ArtifactRegistry`] tracks every path that is
//! in use: concurrent acquisitions share one download, and the file is only
//! removed when the last consumer releases it without asking for retention.

use super::MediaDownloader;
use crate::error::{Result, VidsumError};
use crate::source::VideoReference;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// What happened to the file when a consumer let go of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Last consumer gone; file removed.
    Deleted,
    /// Last consumer gone; file kept because retention was requested
    /// (or removal failed, which is logged).
    Retained,
    /// Other consumers still hold the file.
    InUse,
    /// Last consumer gone, but the file was never successfully acquired.
    Abandoned,
}

struct Slot {
    ready: Arc<OnceCell<()>>,
    consumers: usize,
    retain: bool,
}

/// Shared table of artifact paths currently in use.
#[derive(Clone, Default)]
pub struct ArtifactRegistry {
    slots: Arc<Mutex<HashMap<PathBuf, Slot>>>,
}

impl ArtifactRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live consumers for `path`.
    pub fn consumers(&self, path: &Path) -> usize {
        self.lock().get(path).map_or(0, |slot| slot.consumers)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, Slot>> {
        // Slots stay consistent across a panic: every mutation is a single step.
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn checkout(&self, path: &Path) -> Lease {
        let ready = {
            let mut slots = self.lock();
            let slot = slots.entry(path.to_path_buf()).or_insert_with(|| Slot {
                ready: Arc::new(OnceCell::new()),
                consumers: 0,
                retain: false,
            });
            slot.consumers += 1;
            slot.ready.clone()
        };

        Lease {
            registry: self.clone(),
            path: path.to_path_buf(),
            ready,
            active: true,
        }
    }

    fn release(&self, path: &Path, retain: bool) -> ReleaseOutcome {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(path) else {
            return ReleaseOutcome::Abandoned;
        };

        slot.retain |= retain;
        slot.consumers = slot.consumers.saturating_sub(1);
        if slot.consumers > 0 {
            debug!("{} still has {} consumer(s)", path.display(), slot.consumers);
            return ReleaseOutcome::InUse;
        }

        let Some(slot) = slots.remove(path) else {
            return ReleaseOutcome::Abandoned;
        };
        if !slot.ready.initialized() {
            return ReleaseOutcome::Abandoned;
        }
        if slot.retain {
            info!("Keeping audio file {}", path.display());
            return ReleaseOutcome::Retained;
        }

        // Removal happens under the lock so a new checkout can't observe a
        // half-deleted artifact.
        match std::fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed audio file {}", path.display());
                ReleaseOutcome::Deleted
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ReleaseOutcome::Deleted,
            Err(e) => {
                warn!("Failed to remove audio file {}: {}", path.display(), e);
                ReleaseOutcome::Retained
            }
        }
    }
}

/// One consumer's claim on a registry slot.
struct Lease {
    registry: ArtifactRegistry,
    path: PathBuf,
    ready: Arc<OnceCell<()>>,
    active: bool,
}

impl Lease {
    fn finish(&mut self, retain: bool) -> ReleaseOutcome {
        if !self.active {
            return ReleaseOutcome::Abandoned;
        }
        self.active = false;
        self.registry.release(&self.path, retain)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if self.active {
            self.finish(false);
        }
    }
}

/// A local audio file for one video, held by one pipeline run.
///
/// Dropping the artifact releases it without retention.
pub struct AudioArtifact {
    video_id: String,
    lease: Lease,
}

impl AudioArtifact {
    pub fn path(&self) -> &Path {
        &self.lease.path
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Give up this consumer's hold on the file.
    pub fn release(mut self, retain: bool) -> ReleaseOutcome {
        self.lease.finish(retain)
    }
}

impl std::fmt::Debug for AudioArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioArtifact")
            .field("video_id", &self.video_id)
            .field("path", &self.lease.path)
            .finish()
    }
}

/// Obtains audio artifacts through a [`MediaDownloader`].
pub struct AudioAcquirer {
    downloader: Arc<dyn MediaDownloader>,
    registry: ArtifactRegistry,
    audio_format: String,
}

impl AudioAcquirer {
    pub fn new(downloader: Arc<dyn MediaDownloader>, audio_format: &str) -> Self {
        Self {
            downloader,
            registry: ArtifactRegistry::new(),
            audio_format: audio_format.to_string(),
        }
    }

    /// Share a registry with other acquirers writing to the same directories.
    pub fn with_registry(mut self, registry: ArtifactRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ArtifactRegistry {
        &self.registry
    }

    /// Path the artifact for `reference` lives at inside `output_dir`.
    pub fn artifact_path(&self, reference: &VideoReference, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", reference.id(), self.audio_format))
    }

    /// Download (or reuse) the audio for `reference` under `output_dir`.
    #[instrument(skip(self, output_dir), fields(video_id = %reference.id()))]
    pub async fn acquire_audio(
        &self,
        reference: &VideoReference,
        output_dir: &Path,
    ) -> Result<AudioArtifact> {
        prepare_output_dir(output_dir)?;

        let expected = self.artifact_path(reference, output_dir);
        let lease = self.registry.checkout(&expected);

        lease
            .ready
            .get_or_try_init(|| async {
                if expected.exists() {
                    info!("Reusing existing audio file {}", expected.display());
                    return Ok(());
                }

                let reported = self
                    .downloader
                    .fetch_best_audio(reference.url(), output_dir)
                    .await
                    .map_err(|e| VidsumError::acquisition("audio download failed", e))?;

                if !expected.exists() {
                    return Err(VidsumError::ResourceAcquisition {
                        message: format!(
                            "download reported {} but {} is missing",
                            reported.display(),
                            expected.display()
                        ),
                        source: None,
                    });
                }

                info!("Audio ready at {}", expected.display());
                Ok::<(), VidsumError>(())
            })
            .await?;

        Ok(AudioArtifact {
            video_id: reference.id().to_string(),
            lease,
        })
    }
}

/// Create `dir` if needed and make sure files can be written into it.
fn prepare_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| VidsumError::Directory {
        path: dir.to_path_buf(),
        source,
    })?;

    tempfile::Builder::new()
        .prefix(".vidsum-probe")
        .tempfile_in(dir)
        .map_err(|e| {
            debug!("Write probe failed in {}: {}", dir.display(), e);
            VidsumError::Permission(dir.to_path_buf())
        })?;

    Ok(())
}

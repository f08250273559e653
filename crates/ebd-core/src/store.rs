//! Local scene store: `basedir/<order>/<filename>`.
//!
//! The committed file is the only record that a scene was downloaded. A scene
//! is written to `<filename>.part` first and renamed into place once it is
//! complete (and verified, when asked), so an interrupted run never leaves
//! something that looks stored.

use crate::checksum;
use crate::error::{StoreError, TransferError};
use crate::events::{Observer, SceneEvent};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::scene::Scene;
use crate::storage::{self, PartFile};
use crate::transport::Transport;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Retry bounds for one `store` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StorePolicy {
    /// Re-downloads allowed after a checksum mismatch.
    pub checksum_retries: u32,
    /// Backoff for transient network errors during a single transfer.
    pub transfer_retry: RetryPolicy,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            checksum_retries: crate::config::DEFAULT_CHECKSUM_RETRIES,
            transfer_retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    NotRequested,
    /// Sidecar missing or empty; accepted as-is.
    Unavailable,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Committed file was already present. No request was made.
    AlreadyStored,
    Committed {
        /// Transfers performed, including checksum retries.
        attempts: u32,
        verification: Verification,
    },
}

/// Result of comparing a downloaded file against its sidecar.
enum Check {
    Unavailable,
    Matched,
    Mismatch { expected: String, actual: String },
}

/// One `store` call, from first byte to commit or failure.
enum State {
    Transferring { attempt: u32 },
    Verifying { attempt: u32, part: PartFile },
    Committed {
        attempts: u32,
        verification: Verification,
    },
    Failed(StoreError),
}

pub struct LocalStore {
    basedir: PathBuf,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn Observer>,
    policy: StorePolicy,
}

impl LocalStore {
    pub fn new(
        basedir: impl Into<PathBuf>,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn Observer>,
        policy: StorePolicy,
    ) -> Self {
        Self {
            basedir: basedir.into(),
            transport,
            observer,
            policy,
        }
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// `basedir/<order>`, using the sanitized components the scene was built with.
    pub fn directory_path(&self, scene: &Scene) -> PathBuf {
        self.basedir.join(scene.order_dir())
    }

    pub fn scene_path(&self, scene: &Scene) -> PathBuf {
        self.directory_path(scene).join(scene.stored_filename())
    }

    pub fn temp_scene_path(&self, scene: &Scene) -> PathBuf {
        storage::temp_path(&self.scene_path(scene))
    }

    pub fn is_stored(&self, scene: &Scene) -> bool {
        self.scene_path(scene).exists()
    }

    /// Downloads `scene` unless it is already stored.
    ///
    /// With `verify`, the file is checked against its md5 sidecar and
    /// re-downloaded from scratch on mismatch, at most `checksum_retries`
    /// times. A missing sidecar skips verification.
    pub fn store(&self, scene: &Scene, verify: bool) -> Result<StoreOutcome, StoreError> {
        if self.is_stored(scene) {
            self.observer.scene(scene, SceneEvent::AlreadyStored);
            return Ok(StoreOutcome::AlreadyStored);
        }

        let result = self.download(scene, verify);
        if let Err(e) = &result {
            self.observer.scene(scene, SceneEvent::Failed(e));
        }
        result
    }

    fn download(&self, scene: &Scene, verify: bool) -> Result<StoreOutcome, StoreError> {
        let dir = self.directory_path(scene);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
            self.observer.scene(scene, SceneEvent::DirectoryCreated(&dir));
        }
        let final_path = self.scene_path(scene);
        let temp = storage::temp_path(&final_path);

        let mut state = State::Transferring { attempt: 1 };
        loop {
            state = match state {
                State::Transferring { attempt } => {
                    self.observer
                        .scene(scene, SceneEvent::TransferStarted { attempt, dir: &dir });
                    match self.transfer(scene, &temp) {
                        Ok(part) if verify => State::Verifying { attempt, part },
                        Ok(part) => self.commit(scene, part, &final_path, attempt, Verification::NotRequested),
                        Err(source) => {
                            self.discard(scene, &temp);
                            State::Failed(StoreError::Transfer {
                                scene: scene.name().to_string(),
                                source,
                            })
                        }
                    }
                }
                State::Verifying { attempt, part } => match self.check(scene, part.temp_path()) {
                    Ok(Check::Unavailable) => {
                        self.commit(scene, part, &final_path, attempt, Verification::Unavailable)
                    }
                    Ok(Check::Matched) => {
                        self.observer.scene(scene, SceneEvent::ChecksumMatched);
                        self.commit(scene, part, &final_path, attempt, Verification::Matched)
                    }
                    Ok(Check::Mismatch { expected, actual }) => {
                        let retrying = attempt <= self.policy.checksum_retries;
                        self.observer.scene(
                            scene,
                            SceneEvent::ChecksumMismatch {
                                attempt,
                                expected: &expected,
                                actual: &actual,
                                retrying,
                            },
                        );
                        drop(part);
                        if retrying {
                            State::Transferring {
                                attempt: attempt + 1,
                            }
                        } else {
                            self.discard(scene, &temp);
                            State::Failed(StoreError::ChecksumExceeded {
                                scene: scene.name().to_string(),
                                attempts: attempt,
                            })
                        }
                    }
                    Err(e) => {
                        drop(part);
                        self.discard(scene, &temp);
                        State::Failed(e)
                    }
                },
                State::Committed {
                    attempts,
                    verification,
                } => {
                    return Ok(StoreOutcome::Committed {
                        attempts,
                        verification,
                    })
                }
                State::Failed(e) => return Err(e),
            };
        }
    }

    /// One full transfer into the `.part` file, restarting from byte zero on
    /// every (transient) retry.
    fn transfer(&self, scene: &Scene, temp: &Path) -> Result<PartFile, TransferError> {
        run_with_retry(
            &self.policy.transfer_retry,
            |attempt, error, delay| {
                self.observer.scene(
                    scene,
                    SceneEvent::TransferRetry {
                        attempt,
                        error,
                        delay,
                    },
                )
            },
            |_| {
                let mut part = PartFile::create(temp).map_err(TransferError::Storage)?;
                self.transport.get_into(scene.source_url(), &mut part)?;
                part.sync().map_err(TransferError::Storage)?;
                Ok(part)
            },
        )
    }

    fn check(&self, scene: &Scene, temp: &Path) -> Result<Check, StoreError> {
        let body = match self.transport.get_text(scene.checksum_url()) {
            Ok(body) => body,
            Err(e) => {
                let reason = e.to_string();
                self.observer
                    .scene(scene, SceneEvent::ChecksumUnavailable { reason: &reason });
                return Ok(Check::Unavailable);
            }
        };
        let expected = match checksum::sidecar_digest(&body) {
            Some(d) => d.to_string(),
            None => {
                self.observer
                    .scene(scene, SceneEvent::ChecksumUnavailable { reason: "empty checksum file" });
                return Ok(Check::Unavailable);
            }
        };

        let actual = checksum::md5_path(temp).map_err(|e| StoreError::io(temp, e))?;
        if checksum::digests_match(&expected, &actual) {
            Ok(Check::Matched)
        } else {
            Ok(Check::Mismatch { expected, actual })
        }
    }

    /// The single commit point: rename `.part` onto the final path.
    fn commit(
        &self,
        scene: &Scene,
        part: PartFile,
        final_path: &Path,
        attempts: u32,
        verification: Verification,
    ) -> State {
        let temp = part.temp_path().to_path_buf();
        match part.finalize(final_path) {
            Ok(()) => {
                self.observer.scene(scene, SceneEvent::Committed(final_path));
                State::Committed {
                    attempts,
                    verification,
                }
            }
            Err(e) => {
                self.discard(scene, &temp);
                State::Failed(StoreError::io(final_path, e))
            }
        }
    }

    fn discard(&self, scene: &Scene, temp: &Path) {
        if let Err(error) = storage::remove_temp(temp) {
            self.observer.scene(
                scene,
                SceneEvent::TempFileLeft {
                    path: temp,
                    error: &error,
                },
            );
        }
    }
}

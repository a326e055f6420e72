//! Capture controller: countdown, auto-snap, and the handoff to the collage.
//!
//! Timing is tick driven. One call to [`CaptureSession::tick`] stands for one
//! second of wall-clock time, which keeps the state machine deterministic and
//! lets the caller own the actual timer. Cancelling (reset, navigating away)
//! only has to move the phase back to idle; a stale tick then finds nothing
//! to fire.

mod camera;

pub use camera::{Camera, DirectoryCamera, Facing, Frame};

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::error::{BoothError, Result};
use crate::export::DownloadSink;
use crate::session::{Handoff, SessionStore, Snapshot, View, write_handoff};
use crate::style::{Filter, StyleAxis};

pub const MIN_PHOTOS: usize = 3;
pub const MAX_PHOTOS: usize = 6;

/// Ticks between an auto-snap capture and the next countdown.
pub const REARM_TICKS: u32 = 1;

/// Visual or audible feedback played on capture.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureEffect {
    #[default]
    Confetti,
    Flash,
    Shutter,
}

/// User-tunable capture settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Photos per session, 3-6.
    pub photo_count: usize,
    /// Countdown length in seconds.
    pub timer_secs: u32,
    pub effect: CaptureEffect,
    /// Camera direction; `None` keeps the camera's own.
    pub facing: Option<Facing>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            photo_count: MIN_PHOTOS,
            timer_secs: 3,
            effect: CaptureEffect::default(),
            facing: None,
        }
    }
}

impl CaptureSettings {
    pub fn validate(&self) -> Result<()> {
        if (MIN_PHOTOS..=MAX_PHOTOS).contains(&self.photo_count) {
            Ok(())
        } else {
            Err(BoothError::InvalidPhotoCount {
                value: self.photo_count,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Countdown { remaining: u32 },
    Rearm { ticks: u32 },
}

/// What happened on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Nothing scheduled.
    Idle,
    /// Countdown still running; `remaining` seconds left.
    Counting { remaining: u32 },
    /// A photo was taken and stored at `index`.
    Captured { index: usize, effect: CaptureEffect },
    /// The countdown finished but the camera returned no frame.
    Missed,
    /// Auto-snap restarted the countdown.
    Rearmed { remaining: u32 },
}

/// In-progress capture session.
pub struct CaptureSession<C> {
    camera: C,
    settings: CaptureSettings,
    filter: Filter,
    photos: Vec<Snapshot>,
    phase: Phase,
    auto_snap: bool,
}

impl<C: Camera> CaptureSession<C> {
    pub fn new(mut camera: C, settings: CaptureSettings) -> Result<Self> {
        settings.validate()?;
        if let Some(facing) = settings.facing {
            camera.set_facing(facing);
        }
        Ok(Self {
            camera,
            settings,
            filter: Filter::default(),
            photos: Vec::new(),
            phase: Phase::Idle,
            auto_snap: false,
        })
    }

    pub fn photos(&self) -> &[Snapshot] {
        &self.photos
    }

    pub const fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Live preview filter; also handed to the collage.
    pub fn set_filter(&mut self, filter: Filter) {
        debug!(filter = filter.id(), "Capture filter changed");
        self.filter = filter;
    }

    pub fn facing(&self) -> Facing {
        self.camera.facing()
    }

    /// Flip between the user-facing and rear cameras.
    pub fn switch_camera(&mut self) -> Facing {
        let facing = self.camera.facing().toggled();
        self.camera.set_facing(facing);
        self.settings.facing = Some(facing);
        facing
    }

    pub fn is_complete(&self) -> bool {
        self.photos.len() >= self.settings.photo_count
    }

    pub const fn is_auto_snap(&self) -> bool {
        self.auto_snap
    }

    /// Seconds left on the countdown, if one is running.
    pub const fn countdown(&self) -> Option<u32> {
        match self.phase {
            Phase::Countdown { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Whether any capture is scheduled.
    pub fn is_pending(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Start a single countdown. Ignored once the session is full.
    pub fn start_countdown(&mut self) -> bool {
        if self.is_complete() {
            return false;
        }
        self.phase = Phase::Countdown {
            remaining: self.settings.timer_secs,
        };
        trace!(remaining = self.settings.timer_secs, "Countdown started");
        true
    }

    /// Start countdowns that repeat until the session is full.
    pub fn start_auto_snap(&mut self) -> bool {
        if !self.start_countdown() {
            return false;
        }
        self.auto_snap = true;
        info!(
            target_count = self.settings.photo_count,
            taken = self.photos.len(),
            "Auto-snap started"
        );
        true
    }

    /// Advance one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.phase {
            Phase::Idle => TickOutcome::Idle,
            Phase::Countdown { remaining } if remaining > 1 => {
                self.phase = Phase::Countdown {
                    remaining: remaining - 1,
                };
                TickOutcome::Counting {
                    remaining: remaining - 1,
                }
            }
            Phase::Countdown { .. } => self.capture(),
            Phase::Rearm { ticks } if ticks > 1 => {
                self.phase = Phase::Rearm { ticks: ticks - 1 };
                TickOutcome::Idle
            }
            Phase::Rearm { .. } => {
                let remaining = self.settings.timer_secs;
                self.phase = Phase::Countdown { remaining };
                TickOutcome::Rearmed { remaining }
            }
        }
    }

    fn capture(&mut self) -> TickOutcome {
        self.phase = Phase::Idle;
        if self.is_complete() {
            self.auto_snap = false;
            return TickOutcome::Idle;
        }

        let outcome = match self.camera.screenshot() {
            Some(frame) => {
                let index = self.photos.len();
                self.photos.push(Snapshot::new(index, frame.mime, frame.data));
                info!(index, "Photo captured");
                TickOutcome::Captured {
                    index,
                    effect: self.settings.effect,
                }
            }
            None => {
                warn!("Camera returned no frame");
                TickOutcome::Missed
            }
        };

        if self.auto_snap && !self.is_complete() {
            self.phase = Phase::Rearm { ticks: REARM_TICKS };
        } else {
            self.auto_snap = false;
        }
        outcome
    }

    /// Remove the photo at `index`; later photos shift down.
    pub fn remove_photo(&mut self, index: usize) -> Result<Snapshot> {
        if index >= self.photos.len() {
            return Err(BoothError::PhotoIndexOutOfRange {
                index,
                count: self.photos.len(),
            });
        }
        let removed = self.photos.remove(index);
        for (position, photo) in self.photos.iter_mut().enumerate().skip(index) {
            *photo = photo.clone().at_position(position);
        }
        debug!(index, remaining = self.photos.len(), "Photo removed");
        Ok(removed)
    }

    /// Save one photo on its own as `photo-booth-<n>.jpg`, `n` counting from 1.
    pub fn download_photo(&self, index: usize, sink: &dyn DownloadSink) -> Result<PathBuf> {
        let photo = self
            .photos
            .get(index)
            .ok_or(BoothError::PhotoIndexOutOfRange {
                index,
                count: self.photos.len(),
            })?;
        let filename = photo_filename(index);
        let path = sink.deliver(&filename, photo.data())?;
        debug!(index, path = %path.display(), "Photo downloaded");
        Ok(path)
    }

    /// Cancel any scheduled capture and stop auto-snap.
    pub fn cancel(&mut self) {
        if self.is_pending() || self.auto_snap {
            debug!("Pending capture cancelled");
        }
        self.phase = Phase::Idle;
        self.auto_snap = false;
    }

    /// Discard all photos and cancel anything scheduled.
    pub fn reset(&mut self) {
        self.cancel();
        self.photos.clear();
        info!("Capture session reset");
    }

    /// Hand the photos and filter to the collage view.
    ///
    /// Cancels anything pending first, since the capture view is being left.
    pub fn finish(&mut self, store: &mut dyn SessionStore) -> Result<View> {
        self.cancel();
        let handoff = Handoff {
            photos: self.photos.clone(),
            filter: Some(self.filter),
        };
        write_handoff(store, &handoff)?;
        Ok(View::Result)
    }

    /// Give the camera back, dropping the session.
    pub fn into_camera(self) -> C {
        self.camera
    }
}

/// Download name of the photo at `index`.
pub fn photo_filename(index: usize) -> String {
    format!("photo-booth-{}.jpg", index + 1)
}

/// Drive auto-snap in real time until the session is full or the camera runs dry.
///
/// Sleeps `tick` between state-machine ticks; returns every outcome.
pub async fn run_auto_snap<C: Camera>(
    session: &mut CaptureSession<C>,
    tick: Duration,
) -> Vec<TickOutcome> {
    let mut outcomes = Vec::new();
    if !session.start_auto_snap() {
        return outcomes;
    }

    while session.is_pending() {
        tokio::time::sleep(tick).await;
        let outcome = session.tick();
        trace!(?outcome, "Tick");
        outcomes.push(outcome);
        if outcome == TickOutcome::Missed {
            session.cancel();
        }
    }
    outcomes
}

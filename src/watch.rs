//! Change-triggered refresh loop.
//!
//! Polls the image and prompt directories and re-runs the whole pipeline when
//! the *set of names* in either one changes. Editing the bytes of an existing
//! file is not a change; adding, removing, or renaming one is.
//!
//! ```text
//!            start (unconditional render)
//!                  │
//!                  ▼
//!   ┌──────────► Idle ──── sleep(interval), list dirs
//!   │              │
//!   │   unchanged ─┤
//!   │              │ names differ from snapshot
//!   │              ▼
//!   └────────── Rendering ── scan → resolve → render → write
//! ```
//!
//! A failing tick leaves the stored snapshot untouched, so the same change is
//! picked up and retried on the next poll. The loop has no exit state; it runs
//! until the process is killed.

use crate::config::Gallery;
use crate::render::{self, BuildReport, RenderError};
use crate::scan::{self, ScanError};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Names present in both watched directories at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub images: BTreeSet<String>,
    pub prompts: BTreeSet<String>,
}

impl Snapshot {
    pub fn take(gallery: &Gallery) -> Result<Self, ScanError> {
        Ok(Self {
            images: scan::list_names(&gallery.images_path())?,
            prompts: scan::list_names(&gallery.prompts_path())?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Rendering,
}

/// Result of one poll.
#[derive(Debug)]
pub enum Tick {
    Unchanged,
    Rendered(BuildReport),
    Failed(WatchError),
}

pub struct RefreshLoop<'a> {
    gallery: &'a Gallery,
    state: LoopState,
    snapshot: Snapshot,
}

impl<'a> RefreshLoop<'a> {
    pub fn new(gallery: &'a Gallery) -> Self {
        Self {
            gallery,
            state: LoopState::Idle,
            snapshot: Snapshot::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Initial render. Runs regardless of directory state.
    pub fn start(&mut self) -> Result<BuildReport, WatchError> {
        scan::ensure_dirs(self.gallery)?;
        let snapshot = Snapshot::take(self.gallery)?;
        let report = self.render()?;
        self.snapshot = snapshot;
        Ok(report)
    }

    /// Poll once and re-render if membership changed.
    pub fn tick(&mut self) -> Tick {
        let current =
            match scan::ensure_dirs(self.gallery).and_then(|_| Snapshot::take(self.gallery)) {
                Ok(s) => s,
                Err(e) => return Tick::Failed(e.into()),
            };
        if current == self.snapshot {
            return Tick::Unchanged;
        }
        match self.render() {
            Ok(report) => {
                self.snapshot = current;
                Tick::Rendered(report)
            }
            Err(e) => Tick::Failed(e),
        }
    }

    fn render(&mut self) -> Result<BuildReport, WatchError> {
        self.state = LoopState::Rendering;
        let result = render::build(self.gallery);
        self.state = LoopState::Idle;
        Ok(result?)
    }

    /// Render once, then poll forever.
    ///
    /// `on_tick` sees every poll result, including the initial render.
    /// Only a failing initial render returns.
    pub fn run(
        mut self,
        interval: Duration,
        mut on_tick: impl FnMut(&Tick),
    ) -> Result<Infallible, WatchError> {
        let first = self.start()?;
        on_tick(&Tick::Rendered(first));
        loop {
            std::thread::sleep(interval);
            let tick = self.tick();
            if let Tick::Failed(e) = &tick {
                tracing::warn!(error = %e, "refresh failed, retrying on next poll");
            }
            on_tick(&tick);
        }
    }
}

//! Undo/redo over whole-surface snapshots.
//!
//! The buffer holds up to `capacity` encoded copies of the surface and a
//! cursor pointing at the one currently shown. Snapshots are requested after
//! each committed draw and taken once drawing has been quiet for the debounce
//! period. Restores decode on a worker thread; only the most recently issued
//! restore is ever applied.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use parking_lot::{Condvar, Mutex};

use crate::config::{HistoryConfig, SnapshotEncoding};
use crate::error::SurfaceError;
use crate::surface::{self, DrawingSurface};

/// An immutable encoded copy of the surface
#[derive(Clone)]
pub struct Snapshot {
    bytes: Arc<[u8]>,
    encoding: SnapshotEncoding,
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("bytes", &self.bytes.len())
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl Snapshot {
    pub fn capture(surface: &DrawingSurface, encoding: SnapshotEncoding) -> Result<Self, SurfaceError> {
        let bytes = surface.export_snapshot(encoding)?;
        Ok(Self {
            bytes: bytes.into(),
            encoding,
        })
    }

    pub fn decode(&self) -> Result<RgbaImage, SurfaceError> {
        surface::decode(&self.bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> SnapshotEncoding {
        self.encoding
    }
}

#[derive(Debug, Default)]
struct RestoreSlot {
    /// Token of the most recently issued restore
    latest: u64,
    /// A restore has been issued and not yet applied
    outstanding: bool,
    /// Finished decode for `latest`, waiting to be applied
    completed: Option<Result<RgbaImage, SurfaceError>>,
}

/// Serializes asynchronous restores so the last one issued wins, no matter
/// which decode finishes first.
#[derive(Debug, Default, Clone)]
struct RestoreQueue {
    shared: Arc<(Mutex<RestoreSlot>, Condvar)>,
}

impl RestoreQueue {
    fn issue(&self, snapshot: Snapshot) {
        let token = {
            let mut slot = self.shared.0.lock();
            slot.latest += 1;
            slot.outstanding = true;
            slot.completed = None;
            slot.latest
        };

        let shared = Arc::clone(&self.shared);
        let job = move || {
            let decoded = snapshot.decode();
            let (lock, ready) = &*shared;
            let mut slot = lock.lock();
            if slot.latest == token && slot.outstanding {
                slot.completed = Some(decoded);
                ready.notify_all();
            } else {
                log::debug!("Dropping stale restore {token} (latest is {})", slot.latest);
            }
        };

        if let Err(err) = std::thread::Builder::new()
            .name("snapshot-restore".to_owned())
            .spawn(job)
        {
            // The closure was consumed by the failed spawn; mark the restore as failed.
            log::warn!("Failed to spawn restore worker: {err}");
            let mut slot = self.shared.0.lock();
            if slot.latest == token {
                slot.outstanding = false;
            }
        }
    }

    /// Forget any restore in flight
    fn cancel(&self) {
        let mut slot = self.shared.0.lock();
        slot.latest += 1;
        slot.outstanding = false;
        slot.completed = None;
    }

    fn is_pending(&self) -> bool {
        self.shared.0.lock().outstanding
    }

    fn take_completed(&self) -> Option<Result<RgbaImage, SurfaceError>> {
        let mut slot = self.shared.0.lock();
        let completed = slot.completed.take()?;
        slot.outstanding = false;
        Some(completed)
    }

    fn wait_completed(&self) -> Option<Result<RgbaImage, SurfaceError>> {
        let (lock, ready) = &*self.shared;
        let mut slot = lock.lock();
        while slot.outstanding && slot.completed.is_none() {
            ready.wait(&mut slot);
        }
        let completed = slot.completed.take()?;
        slot.outstanding = false;
        Some(completed)
    }
}

fn apply(surface: &mut DrawingSurface, decoded: Result<RgbaImage, SurfaceError>) -> bool {
    match decoded {
        Ok(image) => {
            surface.restore_from(&image);
            true
        }
        Err(err) => {
            log::warn!("Failed to restore snapshot: {err}");
            false
        }
    }
}

/// Bounded linear history of surface snapshots
#[derive(Debug)]
pub struct SnapshotHistory {
    config: HistoryConfig,
    snapshots: VecDeque<Snapshot>,
    cursor: usize,
    /// When the debounced snapshot is due
    pending_snapshot: Option<Instant>,
    restores: RestoreQueue,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl SnapshotHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            snapshots: VecDeque::with_capacity(config.capacity.max(1)),
            cursor: 0,
            pending_snapshot: None,
            restores: RestoreQueue::default(),
        }
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity.max(1)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Index of the snapshot currently shown, if any
    pub fn cursor(&self) -> Option<usize> {
        (!self.snapshots.is_empty()).then_some(self.cursor)
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.cursor < self.snapshots.len() - 1
    }

    /// Capture the surface now.
    ///
    /// Anything after the cursor is discarded first, so a draw made after an
    /// undo replaces the redo branch. Returns `false` (and logs) when encoding
    /// fails; the history is left as it was.
    pub fn snapshot(&mut self, surface: &DrawingSurface) -> bool {
        let snapshot = match Snapshot::capture(surface, self.config.encoding) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::warn!("Failed to save to history: {err}");
                return false;
            }
        };

        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity() {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;

        log::debug!(
            "History snapshot {} of {} ({} bytes)",
            self.cursor + 1,
            self.snapshots.len(),
            self.snapshots[self.cursor].bytes().len()
        );
        true
    }

    /// Schedule a snapshot once drawing has been quiet for the debounce period.
    /// A later request pushes the deadline out.
    pub fn request_snapshot(&mut self, now: Instant) {
        self.schedule_snapshot(now, self.config.debounce());
    }

    pub fn schedule_snapshot(&mut self, now: Instant, delay: Duration) {
        self.pending_snapshot = Some(now + delay);
    }

    pub fn has_pending_snapshot(&self) -> bool {
        self.pending_snapshot.is_some()
    }

    /// Time left until the scheduled snapshot, for repaint scheduling
    pub fn time_until_snapshot(&self, now: Instant) -> Option<Duration> {
        self.pending_snapshot
            .map(|due| due.saturating_duration_since(now))
    }

    /// Take the scheduled snapshot if it is due. Returns whether one was taken.
    pub fn tick(&mut self, now: Instant, surface: &DrawingSurface) -> bool {
        match self.pending_snapshot {
            Some(due) if due <= now => {
                self.pending_snapshot = None;
                self.snapshot(surface)
            }
            _ => false,
        }
    }

    /// Take the scheduled snapshot immediately, if there is one
    pub fn flush(&mut self, surface: &DrawingSurface) -> bool {
        if self.pending_snapshot.take().is_some() {
            self.snapshot(surface)
        } else {
            false
        }
    }

    /// Step back one snapshot and start restoring it.
    ///
    /// A snapshot still waiting on its debounce is taken first so the step
    /// lands on the state before the latest draw.
    pub fn undo(&mut self, surface: &DrawingSurface) -> bool {
        self.flush(surface);
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.restores.issue(self.snapshots[self.cursor].clone());
        true
    }

    pub fn redo(&mut self, surface: &DrawingSurface) -> bool {
        self.flush(surface);
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.restores.issue(self.snapshots[self.cursor].clone());
        true
    }

    pub fn is_restoring(&self) -> bool {
        self.restores.is_pending()
    }

    /// Apply the latest restore if its decode has finished
    pub fn poll_restore(&mut self, surface: &mut DrawingSurface) -> bool {
        match self.restores.take_completed() {
            Some(decoded) => apply(surface, decoded),
            None => false,
        }
    }

    /// Block until the latest restore has been decoded, then apply it.
    /// Called before new ink goes down so a late decode cannot paint over it.
    pub fn wait_restore(&mut self, surface: &mut DrawingSurface) -> bool {
        match self.restores.wait_completed() {
            Some(decoded) => apply(surface, decoded),
            None => false,
        }
    }

    /// Blank the surface and capture the blank state after the clear delay
    pub fn clear(&mut self, surface: &mut DrawingSurface, now: Instant) {
        self.restores.cancel();
        surface.clear();
        self.schedule_snapshot(now, self.config.clear_delay());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    fn png_history(capacity: usize) -> SnapshotHistory {
        SnapshotHistory::new(HistoryConfig {
            capacity,
            encoding: SnapshotEncoding::Png,
            ..Default::default()
        })
    }

    #[test]
    fn empty_history_cannot_move() {
        let surface = DrawingSurface::default();
        let mut history = png_history(10);
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&surface));
        assert!(!history.redo(&surface));
    }

    #[test]
    fn debounce_waits_for_quiet() {
        let surface = DrawingSurface::default();
        let mut history = png_history(10);
        let t0 = Instant::now();

        history.request_snapshot(t0);
        assert!(!history.tick(t0 + Duration::from_millis(50), &surface));

        // A second request restarts the wait.
        history.request_snapshot(t0 + Duration::from_millis(50));
        assert!(!history.tick(t0 + Duration::from_millis(120), &surface));
        assert!(history.tick(t0 + Duration::from_millis(150), &surface));
        assert_eq!(history.len(), 1);
        assert!(!history.has_pending_snapshot());
    }

    #[test]
    fn undo_flushes_a_pending_snapshot_first() {
        let mut surface = DrawingSurface::default();
        let mut history = png_history(10);
        history.snapshot(&surface);

        surface.draw_rectangle(pos2(10.0, 10.0), pos2(100.0, 80.0), Color32::BLACK);
        history.request_snapshot(Instant::now());

        assert!(history.undo(&surface));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(0));
        assert!(history.wait_restore(&mut surface));
        assert!(surface.is_blank());
    }

    #[test]
    fn clear_cancels_restores_in_flight() {
        let mut surface = DrawingSurface::default();
        let mut history = png_history(10);
        history.snapshot(&surface);
        surface.draw_circle(pos2(50.0, 50.0), pos2(80.0, 50.0), Color32::RED);
        history.snapshot(&surface);

        history.undo(&surface);
        history.redo(&surface);
        history.clear(&mut surface, Instant::now());

        assert!(!history.is_restoring());
        assert!(!history.wait_restore(&mut surface));
        assert!(surface.is_blank());
    }
}

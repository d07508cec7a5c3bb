use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Position and length of the loaded source, shared between the media
/// element and its loader task.
#[derive(Default, Debug, Clone)]
pub struct TrackProgress {
    seek_offset_millis: Arc<AtomicU64>,
    total_duration_millis: Arc<AtomicU64>,
    generation: Arc<AtomicU64>,
    ready: Arc<AtomicBool>,
}

impl TrackProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total_duration(&self, duration: Duration) {
        self.total_duration_millis
            .store(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_millis.load(Ordering::Relaxed))
    }

    /// Position to apply once the source is ready.
    pub fn set_pending_seek(&self, position: Duration) {
        self.seek_offset_millis
            .store(position.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn take_pending_seek(&self) -> Duration {
        Duration::from_millis(self.seek_offset_millis.swap(0, Ordering::Relaxed))
    }

    pub fn pending_seek(&self) -> Duration {
        Duration::from_millis(self.seek_offset_millis.load(Ordering::Relaxed))
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn get_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidates any load in flight and returns the new generation.
    pub fn reset(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.ready.store(false, Ordering::Release);
        self.set_pending_seek(Duration::ZERO);
        self.set_total_duration(Duration::ZERO);
        generation
    }
}

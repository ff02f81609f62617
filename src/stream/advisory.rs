use image::DynamicImage;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::core::face::DetectedFace;
use crate::core::quality::{QualityAnalyzer, QualityReport};
use crate::stream::lux::LuxCell;
use crate::stream::slot::FrameSlot;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A preview frame together with whatever the face detector found in it.
#[derive(Debug, Clone)]
pub struct PreviewFrame {
    pub image: DynamicImage,
    pub face: Option<DetectedFace>,
}

/// What the advisory loop tells the UI about one preview frame.
#[derive(Debug, Clone)]
pub enum AdvisoryUpdate {
    Report { generation: u64, report: QualityReport },
    /// The detector found no face, so the gate was not run.
    NoFace { generation: u64 },
    /// The light sensor has not reported yet.
    NoLightReading { generation: u64 },
}

impl AdvisoryUpdate {
    pub fn generation(&self) -> u64 {
        match self {
            AdvisoryUpdate::Report { generation, .. }
            | AdvisoryUpdate::NoFace { generation }
            | AdvisoryUpdate::NoLightReading { generation } => *generation,
        }
    }
}

/// Best-effort background analysis for live feedback.
///
/// Frames go through a latest-wins [`FrameSlot`]; a result is delivered only
/// if no newer frame arrived while it was being computed.
pub struct AdvisoryWorker {
    slot: Arc<FrameSlot<PreviewFrame>>,
    handle: Option<JoinHandle<AdvisoryStats>>,
}

/// Counters reported when the worker shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvisoryStats {
    pub analyzed: u64,
    pub delivered: u64,
    pub superseded: u64,
    pub dropped: u64,
}

impl AdvisoryWorker {
    pub fn spawn<F>(analyzer: QualityAnalyzer, lux: LuxCell, mut on_update: F) -> Self
    where
        F: FnMut(AdvisoryUpdate) + Send + 'static,
    {
        let slot = Arc::new(FrameSlot::<PreviewFrame>::new());
        let worker_slot = Arc::clone(&slot);

        let handle = thread::spawn(move || {
            let mut stats = AdvisoryStats::default();

            loop {
                let Some((generation, frame)) = worker_slot.wait_take(POLL_INTERVAL) else {
                    if worker_slot.is_closed() {
                        break;
                    }
                    continue;
                };

                let update = match (frame.face, lux.current()) {
                    (None, _) => AdvisoryUpdate::NoFace { generation },
                    (Some(_), None) => AdvisoryUpdate::NoLightReading { generation },
                    (Some(face), Some(lux)) => {
                        let start = Instant::now();
                        let result = analyzer.analyze(&frame.image, &face, lux);
                        stats.analyzed += 1;
                        tracing::trace!(
                            "Advisory analysis of generation {} took {:.1}ms",
                            generation,
                            start.elapsed().as_secs_f32() * 1000.0
                        );
                        match result {
                            Ok(report) => AdvisoryUpdate::Report { generation, report },
                            Err(e) => {
                                tracing::warn!("Skipping preview frame {}: {}", generation, e);
                                continue;
                            }
                        }
                    }
                };

                if worker_slot.is_superseded(generation) {
                    stats.superseded += 1;
                    tracing::debug!("Abandoning result for superseded frame {}", generation);
                    continue;
                }

                stats.delivered += 1;
                on_update(update);
            }

            stats.dropped = worker_slot.dropped();
            tracing::debug!("Advisory worker stopped: {:?}", stats);
            stats
        });

        Self { slot, handle: Some(handle) }
    }

    /// Hand a preview frame to the worker. Any frame still waiting is dropped.
    pub fn submit(&self, frame: PreviewFrame) -> Option<u64> {
        self.slot.offer(frame)
    }

    /// Stop the worker and wait for it to finish its current frame.
    pub fn stop(mut self) -> AdvisoryStats {
        self.shutdown()
    }

    fn shutdown(&mut self) -> AdvisoryStats {
        self.slot.close();
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                tracing::warn!("Advisory worker panicked");
                AdvisoryStats::default()
            }),
            None => AdvisoryStats::default(),
        }
    }
}

impl Drop for AdvisoryWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.shutdown();
        }
    }
}

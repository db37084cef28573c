//! The render thread.
//!
//! A [`RenderEngine`] owns the only write access to the canvas. Each pass of
//! its loop refreshes the preview when one is due, then either drains the
//! draw queue (while recording) or naps for the idle poll interval. It exits
//! as soon as it observes `Stopped`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use egui::Color32;

use crate::canvas::SharedCanvas;
use crate::color_scheme::{ClassicScheme, ColorScheme, TRAIL_GRAY};
use crate::config::RecorderConfig;
use crate::error::RecorderError;
use crate::geometry::Geometry;
use crate::preview::{PreviewSink, render_preview};
use crate::queue::DrawOperationQueue;
use crate::raster;
use crate::state::{LifecycleState, RecorderState};

pub const RENDER_THREAD_NAME: &str = "iart-render";

/// Counters reported when the render loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Primitives rasterized successfully
    pub drawn: u64,
    /// Primitives skipped because coloring or rasterizing them panicked
    pub faulted: u64,
    /// Preview images delivered
    pub previews: u64,
}

pub struct RenderEngine {
    canvas: SharedCanvas,
    queue: DrawOperationQueue,
    state: RecorderState,
    scheme: Arc<dyn ColorScheme>,
    preview: Option<Arc<dyn PreviewSink>>,
    preview_interval: Duration,
    idle_poll: Duration,
    lines_follow_scheme: bool,
}

impl std::fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEngine")
            .field("canvas", &self.canvas.size())
            .field("queue", &self.queue)
            .field("state", &self.state.get())
            .field("scheme", &self.scheme.name())
            .field("has_preview", &self.preview.is_some())
            .field("preview_interval", &self.preview_interval)
            .field("idle_poll", &self.idle_poll)
            .field("lines_follow_scheme", &self.lines_follow_scheme)
            .finish()
    }
}

impl RenderEngine {
    pub fn new(
        canvas: SharedCanvas,
        queue: DrawOperationQueue,
        state: RecorderState,
        scheme: Arc<dyn ColorScheme>,
    ) -> Self {
        let defaults = RecorderConfig::default();
        Self {
            canvas,
            queue,
            state,
            scheme,
            preview: None,
            preview_interval: defaults.preview_interval(),
            idle_poll: defaults.idle_poll(),
            lines_follow_scheme: defaults.lines_follow_scheme,
        }
    }

    /// Engine drawing in the classic palette, mostly useful in tests
    pub fn classic(canvas: SharedCanvas, queue: DrawOperationQueue, state: RecorderState) -> Self {
        Self::new(canvas, queue, state, Arc::new(ClassicScheme::new()))
    }

    pub fn with_config(mut self, config: &RecorderConfig) -> Self {
        self.preview_interval = config.preview_interval();
        self.idle_poll = config.idle_poll();
        self.lines_follow_scheme = config.lines_follow_scheme;
        self
    }

    pub fn with_preview(mut self, sink: Arc<dyn PreviewSink>) -> Self {
        self.preview = Some(sink);
        self
    }

    pub fn with_preview_interval(mut self, interval: Duration) -> Self {
        self.preview_interval = interval;
        self
    }

    pub fn with_idle_poll(mut self, idle_poll: Duration) -> Self {
        self.idle_poll = idle_poll;
        self
    }

    pub fn with_lines_follow_scheme(mut self, follow: bool) -> Self {
        self.lines_follow_scheme = follow;
        self
    }

    pub fn canvas(&self) -> &SharedCanvas {
        &self.canvas
    }

    /// Move the engine onto its own named thread
    pub fn spawn(self) -> std::io::Result<EngineHandle> {
        let thread = thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_string())
            .spawn(move || self.run())?;
        Ok(EngineHandle { thread })
    }

    /// Run the render loop on the calling thread until the state is `Stopped`
    pub fn run(self) -> EngineStats {
        let [width, height] = self.canvas.size();
        log::info!(
            "Render loop started: {}x{} canvas, scheme {}",
            width,
            height,
            self.scheme.name()
        );

        let mut stats = EngineStats::default();
        let mut last_preview: Option<Instant> = None;

        loop {
            self.refresh_preview_if_due(&mut last_preview, &mut stats);

            match self.state.get() {
                LifecycleState::Stopped => break,
                LifecycleState::Recording => {
                    let batch = self.queue.drain_or_wait(self.recording_wait(last_preview));
                    if !batch.is_empty() {
                        log::trace!("Drawing {} queued primitives", batch.len());
                    }
                    for geometry in &batch {
                        self.draw_one(geometry, &mut stats);
                        self.refresh_preview_if_due(&mut last_preview, &mut stats);
                    }
                }
                LifecycleState::PreRecording
                | LifecycleState::Paused
                | LifecycleState::Calibrating => thread::sleep(self.idle_poll),
            }
        }

        log::info!(
            "Render loop stopped: {} drawn, {} faulted, {} previews",
            stats.drawn,
            stats.faulted,
            stats.previews
        );
        stats
    }

    /// Rasterize everything currently queued on the calling thread,
    /// regardless of state. Returns how many primitives were drawn.
    pub fn drain_once(&self) -> usize {
        let mut stats = EngineStats::default();
        for geometry in self.queue.drain() {
            self.draw_one(&geometry, &mut stats);
        }
        stats.drawn as usize
    }

    /// Color a primitive is drawn in
    pub fn stroke_color(&self, geometry: &Geometry) -> Color32 {
        match geometry {
            Geometry::Line(_) if !self.lines_follow_scheme => TRAIL_GRAY,
            _ => self
                .scheme
                .color_for(geometry.draw_event(), geometry.anchor()),
        }
    }

    fn draw_one(&self, geometry: &Geometry, stats: &mut EngineStats) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let color = self.stroke_color(geometry);
            let mut canvas = self.canvas.write();
            raster::draw(&mut canvas, geometry, color)
        }));

        match outcome {
            Ok(_) => stats.drawn += 1,
            Err(payload) => {
                stats.faulted += 1;
                log::error!(
                    "Skipped {} at {:?}: {}",
                    geometry.kind(),
                    geometry.anchor(),
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// How long an empty queue may keep the loop asleep while recording
    fn recording_wait(&self, last_preview: Option<Instant>) -> Duration {
        match (&self.preview, last_preview) {
            (Some(_), Some(at)) => self
                .preview_interval
                .saturating_sub(at.elapsed())
                .min(self.idle_poll),
            (Some(_), None) => Duration::ZERO,
            (None, _) => self.idle_poll,
        }
    }

    fn refresh_preview_if_due(&self, last_preview: &mut Option<Instant>, stats: &mut EngineStats) {
        let Some(sink) = &self.preview else {
            return;
        };
        if last_preview.is_some_and(|at| at.elapsed() < self.preview_interval) {
            return;
        }
        // Restart the interval even when nothing is delivered so a minimized
        // window is polled at the same rate
        *last_preview = Some(Instant::now());
        if sink.is_minimized() {
            return;
        }

        let [width, height] = sink.target_size();
        let image = {
            let canvas = self.canvas.read();
            render_preview(&canvas, width, height)
        };
        match image {
            Ok(image) => {
                sink.deliver(image);
                stats.previews += 1;
            }
            Err(err) => log::debug!("No preview this pass: {}", err),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Join handle for a spawned [`RenderEngine`]
#[derive(Debug)]
pub struct EngineHandle {
    thread: JoinHandle<EngineStats>,
}

impl EngineHandle {
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the render loop to exit. The state must already be `Stopped`
    /// or this blocks until someone stops it.
    pub fn join(self) -> Result<EngineStats, RecorderError> {
        self.thread.join().map_err(|_| RecorderError::EngineFault)
    }
}

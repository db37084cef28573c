//! Recording sessions.
//!
//! A [`Recorder`] ties the pieces together: it owns the lifecycle state, the
//! draw queue and the scheme registry, and for each session creates a fresh
//! canvas and a render thread. Producers go through [`Recorder::submit`],
//! which only accepts geometry while recording.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::canvas::{Canvas, SharedCanvas};
use crate::color_scheme::{ClassicScheme, ColorScheme, ColorSchemeRegistry};
use crate::config::RecorderConfig;
use crate::engine::{EngineHandle, EngineStats, RenderEngine};
use crate::error::{ExportError, RecorderError};
use crate::export::save_canvas;
use crate::geometry::Geometry;
use crate::preview::PreviewSink;
use crate::queue::DrawOperationQueue;
use crate::state::{LifecycleState, RecorderState};

struct Session {
    id: Uuid,
    canvas: SharedCanvas,
    scheme: Arc<dyn ColorScheme>,
    engine: EngineHandle,
    started_at: Instant,
}

/// Everything a finished session leaves behind
#[derive(Debug)]
pub struct FinishedSession {
    pub id: Uuid,
    pub canvas: Canvas,
    pub stats: EngineStats,
    /// Geometry still queued at stop time, dropped undrawn
    pub discarded: usize,
}

pub struct Recorder {
    config: RecorderConfig,
    registry: ColorSchemeRegistry,
    state: RecorderState,
    queue: DrawOperationQueue,
    preview: Option<Arc<dyn PreviewSink>>,
    session: Option<Session>,
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state.get())
            .field("session", &self.session_id())
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(RecorderConfig::default())
    }
}

impl Recorder {
    pub fn new(config: RecorderConfig) -> Self {
        Self::with_registry(config, ColorSchemeRegistry::with_builtin())
    }

    pub fn with_registry(config: RecorderConfig, registry: ColorSchemeRegistry) -> Self {
        Self {
            config,
            registry,
            state: RecorderState::default(),
            queue: DrawOperationQueue::new(),
            preview: None,
            session: None,
        }
    }

    /// Sink that receives previews from every session started afterwards
    pub fn with_preview(mut self, sink: Arc<dyn PreviewSink>) -> Self {
        self.preview = Some(sink);
        self
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Replace the settings. A running session keeps the ones it started with.
    pub fn set_config(&mut self, config: RecorderConfig) {
        self.config = config;
    }

    pub fn registry(&self) -> &ColorSchemeRegistry {
        &self.registry
    }

    /// Shared handle to the lifecycle state
    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.state.get()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|session| session.id)
    }

    /// Canvas of the running session
    pub fn canvas(&self) -> Option<&SharedCanvas> {
        self.session.as_ref().map(|session| &session.canvas)
    }

    /// Queue producers push into. Prefer [`submit`](Self::submit), which
    /// respects the lifecycle state.
    pub fn queue(&self) -> &DrawOperationQueue {
        &self.queue
    }

    /// Begin a session on a fresh white canvas of the given size
    pub fn start(&mut self, width: usize, height: usize) -> Result<Uuid, RecorderError> {
        if self.session.is_some()
            || !self
                .state
                .transition(LifecycleState::Stopped, LifecycleState::PreRecording)
        {
            return Err(RecorderError::AlreadyActive(self.state.get()));
        }
        if width == 0 || height == 0 {
            self.state.set(LifecycleState::Stopped);
            return Err(RecorderError::InvalidCanvasSize { width, height });
        }

        let scheme = match self.registry.create(&self.config.color_scheme) {
            Some(scheme) => scheme,
            None => {
                log::warn!(
                    "Unknown color scheme {:?}, falling back to {}",
                    self.config.color_scheme,
                    ClassicScheme::NAME
                );
                Arc::new(ClassicScheme::new())
            }
        };

        let stale = self.queue.clear();
        if stale > 0 {
            log::debug!("Dropped {} primitives queued before the session", stale);
        }

        let canvas = SharedCanvas::new(Canvas::new(width, height));
        scheme.start();

        let mut engine = RenderEngine::new(
            canvas.clone(),
            self.queue.clone(),
            self.state.clone(),
            Arc::clone(&scheme),
        )
        .with_config(&self.config);
        if let Some(sink) = &self.preview {
            engine = engine.with_preview(Arc::clone(sink));
        }

        let engine = match engine.spawn() {
            Ok(handle) => handle,
            Err(err) => {
                scheme.stop();
                self.state.set(LifecycleState::Stopped);
                return Err(RecorderError::EngineSpawn(err));
            }
        };

        let id = Uuid::new_v4();
        log::info!(
            "Session {} started: {}x{} canvas, scheme {}",
            id,
            width,
            height,
            scheme.name()
        );
        self.session = Some(Session {
            id,
            canvas,
            scheme,
            engine,
            started_at: Instant::now(),
        });
        self.state.set(LifecycleState::Recording);
        Ok(id)
    }

    /// Flip between recording and paused. Returns the resulting state; any
    /// other state is left alone.
    pub fn toggle_pause(&self) -> LifecycleState {
        if self
            .state
            .transition(LifecycleState::Recording, LifecycleState::Paused)
        {
            log::info!("Recording paused");
            LifecycleState::Paused
        } else if self
            .state
            .transition(LifecycleState::Paused, LifecycleState::Recording)
        {
            log::info!("Recording resumed");
            LifecycleState::Recording
        } else {
            self.state.get()
        }
    }

    /// Suspend drawing while the screen layout is re-measured
    pub fn begin_calibration(&self) -> bool {
        let entered = self
            .state
            .transition(LifecycleState::Recording, LifecycleState::Calibrating);
        if entered {
            log::info!("Screen layout changed, recalibrating");
        }
        entered
    }

    pub fn end_calibration(&self) -> bool {
        self.state
            .transition(LifecycleState::Calibrating, LifecycleState::Recording)
    }

    /// Enqueue a primitive. Only accepted while recording.
    pub fn submit(&self, geometry: Geometry) -> bool {
        if !self.state.is_recording() {
            return false;
        }
        self.queue.push(geometry);
        true
    }

    /// End the session: stop the render thread, stop the scheme and hand back
    /// the final canvas. Returns `Ok(None)` when no session was running.
    pub fn stop(&mut self) -> Result<Option<FinishedSession>, RecorderError> {
        let Some(session) = self.session.take() else {
            self.state.set(LifecycleState::Stopped);
            return Ok(None);
        };

        self.state.set(LifecycleState::Stopped);
        self.queue.wake();
        let joined = session.engine.join();
        session.scheme.stop();

        let discarded = self.queue.clear();
        if discarded > 0 {
            log::info!("Discarded {} undrawn primitives", discarded);
        }

        let stats = joined?;
        log::info!(
            "Session {} stopped after {:.1}s",
            session.id,
            session.started_at.elapsed().as_secs_f32()
        );
        Ok(Some(FinishedSession {
            id: session.id,
            canvas: session.canvas.into_inner(),
            stats,
            discarded,
        }))
    }

    /// Stop and write the canvas to the configured export directory.
    /// Returns the written path, or `None` when no session was running.
    pub fn stop_and_export(&mut self) -> Result<Option<PathBuf>, RecorderError> {
        let Some(finished) = self.stop()? else {
            return Ok(None);
        };
        let dir = self
            .config
            .resolve_export_dir()
            .ok_or(ExportError::NoExportDir)?;
        let path = save_canvas(&finished.canvas, &dir, self.config.export_format)?;
        Ok(Some(path))
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.state.set(LifecycleState::Stopped);
            self.queue.wake();
            if session.engine.join().is_err() {
                log::error!("Render thread for session {} panicked", session.id);
            }
            session.scheme.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Line;

    #[test]
    fn test_submit_rejected_when_stopped() {
        let recorder = Recorder::default();
        assert!(!recorder.submit(Line::new(0, 0, 1, 1).into()));
        assert!(recorder.queue().is_empty());
    }

    #[test]
    fn test_invalid_size_resets_state() {
        let mut recorder = Recorder::default();
        let err = recorder.start(0, 10).unwrap_err();
        assert!(matches!(err, RecorderError::InvalidCanvasSize { width: 0, height: 10 }));
        assert_eq!(recorder.lifecycle(), LifecycleState::Stopped);
        assert!(!recorder.is_active());
    }

    #[test]
    fn test_stop_without_session() {
        let mut recorder = Recorder::default();
        assert!(recorder.stop().unwrap().is_none());
        assert_eq!(recorder.lifecycle(), LifecycleState::Stopped);
    }

    #[test]
    fn test_pause_toggle_requires_session() {
        let recorder = Recorder::default();
        assert_eq!(recorder.toggle_pause(), LifecycleState::Stopped);
        assert!(!recorder.begin_calibration());
    }

    #[test]
    fn test_unknown_scheme_falls_back() {
        let config = RecorderConfig {
            color_scheme: "Nope".to_string(),
            idle_poll_ms: 10,
            ..Default::default()
        };
        let mut recorder = Recorder::new(config);
        recorder.start(8, 8).unwrap();
        assert!(recorder.is_active());
        let finished = recorder.stop().unwrap().unwrap();
        assert_eq!(finished.canvas.size(), [8, 8]);
    }
}

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod color_scheme;
pub mod config;
pub mod draw_event;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod input;
pub mod preview;
pub mod queue;
pub mod raster;
pub mod recorder;
pub mod state;

pub use app::IArtApp;
pub use canvas::{Canvas, SharedCanvas};
pub use color_scheme::{ClassicScheme, ColorScheme, ColorSchemeRegistry, RainbowScheme};
pub use config::{ExportFormat, RecorderConfig};
pub use draw_event::DrawEvent;
pub use engine::{EngineHandle, EngineStats, RenderEngine};
pub use error::{ExportError, PreviewError, RecorderError, StateError};
pub use geometry::{Circle, Geometry, Line};
pub use input::InputClassifier;
pub use preview::{PreviewSink, PreviewSlot};
pub use queue::DrawOperationQueue;
pub use recorder::{FinishedSession, Recorder};
pub use state::{LifecycleState, RecorderState};

use std::sync::Arc;

use egui::{Color32, Pos2, Rect, TextureHandle, TextureOptions, Vec2};

use crate::config::{MAX_RESOLUTION_MULTIPLIER, MIN_RESOLUTION_MULTIPLIER, RecorderConfig};
use crate::input::InputClassifier;
use crate::preview::{PreviewSink, PreviewSlot};
use crate::recorder::Recorder;
use crate::state::LifecycleState;

const RESOLUTION_PRESETS: [f32; 5] = [1.0, 2.0, 4.0, 8.0, 16.0];

/// Menu actions are collected while the menus are drawn and applied afterwards
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Start,
    TogglePause,
    Stop,
}

pub struct IArtApp {
    config: RecorderConfig,
    recorder: Recorder,
    preview: Arc<PreviewSlot>,
    classifier: InputClassifier,
    texture: Option<TextureHandle>,
    // Last monitor size seen, in pixels
    monitor_size: Option<Vec2>,
    calibrating: bool,
    status: Option<String>,
}

impl std::fmt::Debug for IArtApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IArtApp")
            .field("config", &self.config)
            .field("recorder", &self.recorder)
            .field("has_texture", &self.texture.is_some())
            .field("monitor_size", &self.monitor_size)
            .finish()
    }
}

impl IArtApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config: RecorderConfig = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let preview = Arc::new(PreviewSlot::new(1, 1));
        preview.set_repaint_context(cc.egui_ctx.clone());

        Self::with_config(config, preview)
    }

    fn with_config(config: RecorderConfig, preview: Arc<PreviewSlot>) -> Self {
        let sink: Arc<dyn PreviewSink> = preview.clone();
        Self {
            recorder: Recorder::new(config.clone()).with_preview(sink),
            classifier: InputClassifier::new(&config),
            config,
            preview,
            texture: None,
            monitor_size: None,
            calibrating: false,
            status: None,
        }
    }

    /// Virtual screen size in pixels: the monitor if egui knows it, else the window
    fn screen_size(ctx: &egui::Context) -> Vec2 {
        let points = ctx
            .input(|input| input.viewport().monitor_size)
            .unwrap_or_else(|| ctx.screen_rect().size());
        points * ctx.pixels_per_point()
    }

    fn start_session(&mut self, ctx: &egui::Context) {
        let screen = Self::screen_size(ctx);
        let [width, height] = self.config.canvas_size(screen.x, screen.y);

        self.recorder.set_config(self.config.clone());
        self.classifier = InputClassifier::new(&self.config);
        self.texture = None;
        self.status = None;

        match self.recorder.start(width, height) {
            Ok(id) => log::debug!("Viewer attached to session {}", id),
            Err(err) => {
                log::error!("Could not start recording: {}", err);
                self.status = Some(format!("Could not start: {}", err));
            }
        }
    }

    fn stop_session(&mut self) {
        self.classifier.reset();
        self.status = Some(match self.recorder.stop_and_export() {
            Ok(Some(path)) => format!("Saved {}", path.display()),
            Ok(None) => "Nothing to save".to_string(),
            Err(err) => {
                log::error!("Export failed: {}", err);
                format!("Export failed: {}", err)
            }
        });
    }

    fn apply(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::Start => self.start_session(ctx),
            Action::TogglePause => {
                self.recorder.toggle_pause();
                self.classifier.reset();
            }
            Action::Stop => self.stop_session(),
        }
    }

    /// Enter calibration when the monitor changes under a running session
    fn watch_monitor(&mut self, ctx: &egui::Context) {
        if self.calibrating {
            self.recorder.end_calibration();
            self.calibrating = false;
        }

        let Some(size) = ctx.input(|input| input.viewport().monitor_size) else {
            return;
        };
        if self.monitor_size.is_some_and(|previous| previous != size)
            && self.recorder.begin_calibration()
        {
            self.classifier.reset();
            self.calibrating = true;
        }
        self.monitor_size = Some(size);
    }

    fn menu_bar(&mut self, ui: &mut egui::Ui) -> Option<Action> {
        let mut action = None;
        let active = self.recorder.is_active();
        let lifecycle = self.recorder.lifecycle();

        egui::menu::bar(ui, |ui| {
            ui.menu_button("Actions", |ui| {
                if ui.add_enabled(!active, egui::Button::new("Start")).clicked() {
                    action = Some(Action::Start);
                    ui.close_menu();
                }
                let pause_label = if lifecycle == LifecycleState::Paused {
                    "Resume"
                } else {
                    "Pause"
                };
                if ui.add_enabled(active, egui::Button::new(pause_label)).clicked() {
                    action = Some(Action::TogglePause);
                    ui.close_menu();
                }
                if ui.add_enabled(active, egui::Button::new("Stop")).clicked() {
                    action = Some(Action::Stop);
                    ui.close_menu();
                }
            });

            ui.menu_button("Color Scheme", |ui| {
                ui.add_enabled_ui(!active, |ui| {
                    let registry = self.recorder.registry();
                    for family in registry.families() {
                        ui.label(family);
                        for variant in registry.variants(family) {
                            if ui
                                .selectable_label(self.config.color_scheme == variant, variant)
                                .clicked()
                            {
                                self.config.color_scheme = variant.to_string();
                            }
                        }
                        ui.separator();
                    }
                    ui.checkbox(&mut self.config.lines_follow_scheme, "Color lines by scheme");
                });
            });

            ui.menu_button("Resolution Multiplier", |ui| {
                ui.add_enabled_ui(!active, |ui| {
                    for preset in RESOLUTION_PRESETS {
                        ui.radio_value(
                            &mut self.config.resolution_multiplier,
                            preset,
                            format!("{}x", preset),
                        );
                    }
                    ui.add(
                        egui::Slider::new(
                            &mut self.config.resolution_multiplier,
                            MIN_RESOLUTION_MULTIPLIER..=MAX_RESOLUTION_MULTIPLIER,
                        )
                        .text("custom"),
                    );
                });
            });
        });

        action
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.recorder.lifecycle().as_str());
            if let Some(canvas) = self.recorder.canvas() {
                let [width, height] = canvas.size();
                ui.separator();
                ui.label(format!("{}x{}", width, height));
            }
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
    }

    fn preview_pane(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, egui::Sense::click());
        let rect = response.rect;

        let pixels = rect.size() * ctx.pixels_per_point();
        self.preview
            .set_target_size(pixels.x.max(1.0) as usize, pixels.y.max(1.0) as usize);

        if let Some(image) = self.preview.take() {
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => {
                    self.texture = Some(ctx.load_texture("iart-preview", image, TextureOptions::LINEAR));
                }
            }
        }

        match &self.texture {
            Some(texture) => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                painter.image(texture.id(), rect, uv, Color32::WHITE);
            }
            None => {
                painter.rect_filled(rect, 0.0, Color32::WHITE);
            }
        }

        let canvas_size = self.recorder.canvas().map(|canvas| canvas.size());
        match canvas_size {
            Some(size) if self.recorder.state().is_recording() => {
                for geometry in self.classifier.process_input(ctx, rect, size) {
                    self.recorder.submit(geometry);
                }
            }
            _ => self.classifier.reset(),
        }
    }
}

impl eframe::App for IArtApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.config);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let minimized = ctx.input(|input| input.viewport().minimized.unwrap_or(false));
        self.preview.set_minimized(minimized);
        self.watch_monitor(ctx);

        let action = egui::TopBottomPanel::top("menu_bar")
            .show(ctx, |ui| self.menu_bar(ui))
            .inner;

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| self.status_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.preview_pane(ctx, ui));

        if let Some(action) = action {
            self.apply(ctx, action);
        }

        if self.recorder.is_active() {
            ctx.request_repaint_after(self.config.preview_interval());
        }
    }

    /// Closing while recording finishes the piece
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.recorder.is_active() {
            self.stop_session();
            if let Some(status) = &self.status {
                log::info!("{}", status);
            }
        }
    }
}

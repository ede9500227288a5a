//! Interactive duct-flow viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a running [`Simulation`] and
//! implements [`eframe::App`] to draw the duct and its tracer particles.

use eframe::App;
use glam::Vec2;
use rand::rngs::StdRng;
use tunnel_core::{Config, Simulation, stepper::StepStats};

const DUCT_COLOR: egui::Color32 = egui::Color32::from_rgb(0x44, 0x44, 0x44);
const PARTICLE_COLOR: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 153, 153, 153);

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: a [`Simulation`] and the RNG that drives it.
/// - Two configurations: `cfg` is the one the current run was built from,
///   `pending` is what the side panel edits. A run never changes while it is
///   going; edits take effect on the next reset.
/// - UI state (pan/zoom, timing) and the eframe/egui callbacks.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and at least one frame period has passed, call
///    [`Viewer::step_once`].
/// 3. Render the duct outline and the particles.
pub struct Viewer {
    sim: Simulation,
    cfg: Config,
    pending: Config,
    rng: StdRng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    last_stats: StepStats,
    /// Set when a step fails; the run is halted until the next reset.
    step_error: Option<String>,
    /// Set when the pending configuration was rejected by a reset.
    pending_error: Option<String>,

    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer with a fresh run built from `cfg`.
    ///
    /// ### Errors
    /// Any configuration or geometry error from [`Simulation::new`].
    pub fn new(cfg: Config) -> tunnel_core::Result<Self> {
        let mut rng = cfg.rng();
        let sim = Simulation::new(&cfg, &mut rng)?;

        Ok(Self {
            sim,
            pending: cfg.clone(),
            cfg,
            rng,
            running: false,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            last_stats: StepStats::default(),
            step_error: None,
            pending_error: None,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Starts a new run from the pending configuration.
    ///
    /// On success the pending configuration becomes the active one, the frame
    /// counter restarts and auto-run stops. If the pending configuration is
    /// rejected, the current run is kept and can still be stepped; the error
    /// is shown next to the editor until a reset succeeds.
    fn reset(&mut self) {
        let mut rng = self.pending.rng();
        match Simulation::new(&self.pending, &mut rng) {
            Ok(sim) => {
                self.sim = sim;
                self.rng = rng;
                self.cfg = self.pending.clone();
                self.last_stats = StepStats::default();
                self.step_error = None;
                self.pending_error = None;
            }
            Err(e) => {
                log::error!("reset rejected: {e}");
                self.pending_error = Some(e.to_string());
            }
        }
        self.running = false;
    }

    /// Advances the simulation by a single frame.
    ///
    /// A failing step means the particle state is no longer trustworthy, so
    /// auto-run stops and the error stays on screen until the next reset.
    fn step_once(&mut self) {
        if self.step_error.is_some() {
            return;
        }
        match self.sim.step(&mut self.rng) {
            Ok(stats) => self.last_stats = stats,
            Err(e) => {
                log::error!("step {} failed: {e}", self.sim.frame_index() + 1);
                self.step_error = Some(e.to_string());
                self.running = false;
            }
        }
    }

    /// Pixels per canvas unit at the current zoom, fitting the canvas in `rect`.
    fn scale(&self, rect: egui::Rect) -> f32 {
        (rect.width() / self.cfg.width).min(rect.height() / self.cfg.height) * self.zoom
    }

    /// Converts a canvas-space position to screen-space.
    ///
    /// The canvas center maps to the center of `rect` (plus `pan`). The
    /// y-axis is flipped so that positive y goes up on the canvas.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let s = self.scale(rect);
        let c = Vec2::new(self.cfg.width, self.cfg.height) / 2.0;
        egui::pos2(
            center.x + (p.x - c.x) * s + self.pan.x,
            center.y - (p.y - c.y) * s + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] (up to floating point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let s = self.scale(rect);
        let c = Vec2::new(self.cfg.width, self.cfg.height) / 2.0;
        Vec2::new(
            (p.x - center.x - self.pan.x) / s + c.x,
            (center.y - p.y + self.pan.y) / s + c.y,
        )
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
                if ui.button("Fit").clicked() {
                    self.zoom = 1.0;
                    self.pan = egui::vec2(0.0, 0.0);
                }
            });
        });
    }

    /// Builds the bottom status bar (frame, time, respawns, errors).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("frame = {}", self.sim.frame_index()));
                ui.label(format!("t = {:.2} s", self.sim.time()));
                ui.label(format!("particles = {}", self.sim.state().len()));
                ui.label(format!(
                    "respawned = {} ({} wall, {} outlet)",
                    self.last_stats.respawned, self.last_stats.outside, self.last_stats.escaped
                ));
                for err in [&self.step_error, &self.pending_error].into_iter().flatten() {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
        });
    }

    /// Builds the right-hand panel editing the configuration for the next run.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Next run");

                ui.separator();
                ui.label("Particles");
                Self::labeled_drag_usize(
                    ui,
                    "count:",
                    &mut self.pending.particle_count,
                    1..=50_000,
                    10.0,
                );
                Self::labeled_drag_f32(ui, "size_min:", &mut self.pending.size_min, 0.0..=20.0, 0.1);
                Self::labeled_drag_f32(ui, "size_max:", &mut self.pending.size_max, 0.0..=20.0, 0.1);

                ui.separator();
                ui.label("Flow");
                Self::labeled_drag_f32(
                    ui,
                    "base_velocity:",
                    &mut self.pending.base_velocity,
                    0.1..=1000.0,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "boost_factor:",
                    &mut self.pending.boost_factor,
                    0.1..=10.0,
                    0.05,
                );
                Self::labeled_drag_f32(
                    ui,
                    "turbulence:",
                    &mut self.pending.turbulence_strength,
                    0.0..=200.0,
                    0.5,
                );

                ui.separator();
                ui.label("Timing");
                Self::labeled_drag_f32(ui, "fps:", &mut self.pending.fps, 1.0..=240.0, 1.0);

                ui.separator();
                if ui.button("Apply (reset)").clicked() {
                    self.reset();
                }
                if ui.button("Revert to defaults").clicked() {
                    self.pending = Config {
                        polygon: self.pending.polygon.clone(),
                        landmarks: self.pending.landmarks,
                        ..Config::default()
                    };
                }
            });
    }

    /// Builds the central panel where the duct and particles are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Duct outline.
            let outline: Vec<egui::Pos2> = self
                .sim
                .polygon()
                .vertices
                .iter()
                .map(|&v| self.world_to_screen(v, rect))
                .collect();
            painter.add(egui::Shape::closed_line(
                outline,
                egui::Stroke::new(2.0, DUCT_COLOR),
            ));

            // Particles; size is a diameter in canvas units.
            let s = self.scale(rect);
            let state = self.sim.state();
            for (&p, &size) in state.positions.iter().zip(&state.sizes) {
                let r = (0.5 * size * s).max(0.5);
                painter.circle_filled(self.world_to_screen(p, rect), r, PARTICLE_COLOR);
            }

            // Auto-run at the configured frame rate.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= f64::from(self.sim.dt()) {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn test_viewer() -> Viewer {
        let cfg = Config {
            particle_count: 200,
            seed: Some(31),
            ..Config::default()
        };
        Viewer::new(cfg).unwrap()
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = test_viewer();
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(960.0, 540.0),
            Vec2::new(1500.5, 88.25),
        ];

        let eps = 1e-2;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn canvas_center_maps_to_rect_center_and_y_points_up() {
        let viewer = test_viewer();
        let rect = test_rect();
        let c = viewer.world_to_screen(Vec2::new(960.0, 540.0), rect);
        assert_eq!(c, rect.center());

        let above = viewer.world_to_screen(Vec2::new(960.0, 600.0), rect);
        assert!(above.y < c.y);
    }

    #[test]
    fn step_once_advances_one_frame() {
        let mut viewer = test_viewer();
        assert_eq!(viewer.sim.frame_index(), 0);

        viewer.step_once();
        viewer.step_once();

        assert_eq!(viewer.sim.frame_index(), 2);
        assert!(viewer.step_error.is_none());
        let state = viewer.sim.state();
        assert!(
            state
                .sizes
                .iter()
                .all(|&s| s >= viewer.cfg.size_min && s <= viewer.cfg.size_max)
        );
    }

    #[test]
    fn reset_applies_pending_config_and_restarts() {
        let mut viewer = test_viewer();
        viewer.step_once();
        viewer.running = true;

        viewer.pending.particle_count = 50;
        viewer.pending.boost_factor = 2.0;
        viewer.reset();

        assert_eq!(viewer.sim.frame_index(), 0);
        assert_eq!(viewer.sim.state().len(), 50);
        assert_eq!(viewer.cfg.boost_factor, 2.0);
        assert!(!viewer.running);
        assert!(viewer.step_error.is_none());
        assert!(viewer.pending_error.is_none());
    }

    #[test]
    fn rejected_reset_keeps_current_run() {
        let mut viewer = test_viewer();
        viewer.step_once();

        viewer.pending.size_min = 10.0;
        viewer.pending.size_max = 2.0;
        viewer.reset();

        assert_eq!(viewer.sim.frame_index(), 1);
        assert_eq!(viewer.sim.state().len(), 200);
        assert!(
            viewer
                .pending_error
                .as_deref()
                .unwrap_or("")
                .contains("size_min")
        );
        assert!(viewer.step_error.is_none());
    }

    #[test]
    fn kept_run_still_steps_after_rejected_reset() {
        let mut viewer = test_viewer();
        viewer.step_once();

        viewer.pending.size_min = 10.0;
        viewer.pending.size_max = 2.0;
        viewer.reset();
        viewer.step_once();
        viewer.step_once();

        assert_eq!(viewer.sim.frame_index(), 3);
        assert!(viewer.pending_error.is_some());

        // Fixing the pending config and resetting clears the message.
        viewer.pending.size_min = 1.0;
        viewer.reset();
        assert!(viewer.pending_error.is_none());
        assert_eq!(viewer.sim.frame_index(), 0);
    }

    #[test]
    fn seeded_reset_replays_the_same_run() {
        let mut viewer = test_viewer();
        viewer.step_once();
        let first = viewer.sim.snapshot();

        viewer.reset();
        viewer.step_once();
        assert_eq!(viewer.sim.snapshot(), first);
    }
}

//! Interactive differential growth viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`World`] together with the
//! settings it was built from, and implements [`eframe::App`] to drive and
//! render the simulation through an egui UI.

use eframe::App;
use glam::Vec2;
use growth_core::{
    BoundaryRepulsion, Bounds, Contour, GrowthError, PartialSettings, Settings, World,
    types::Color,
};
use rand::{Rng, rngs::ThreadRng};

/// Colors handed out to spawned paths, in order.
const PALETTE: [Color; 5] = [
    [144, 238, 144, 255],
    [255, 160, 122, 255],
    [135, 206, 250, 255],
    [238, 130, 238, 255],
    [255, 215, 0, 255],
];

/// Segments used for circles spawned by clicking.
const CIRCLE_SEGMENTS: usize = 64;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If the world is not paused and enough time has passed, step it with
///    the egui clock as simulated time.
/// 3. Render the bounds, shapes and paths.
///
/// ### Fields
/// - `world` - The growth world being simulated.
/// - `cfg` - Settings edited in the side panel; applied on reset.
/// - `seed` / `fixed_seed` - When `fixed_seed` is set, worlds are built
///   from `seed` so runs can be replayed.
/// - `rng` - Source of world seeds when no fixed seed is requested.
/// - `spawn_radius` - Radius of circles spawned by clicking.
/// - `next_color` - Index into [`PALETTE`] for the next spawned path.
/// - `zoom` / `pan` - Camera.
/// - `step_interval` - Minimum time between automatic steps (seconds).
/// - `last_step_time` / `last_step_dt` - Step timing, for display.
/// - `error` - Last settings error, shown in the config panel.
pub struct Viewer {
    world: World,
    cfg: Settings,
    seed: u64,
    fixed_seed: bool,

    rng: ThreadRng,

    spawn_radius: f32,
    next_color: usize,

    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,

    error: Option<String>,
}

impl Viewer {
    /// Creates a paused viewer showing a single circle in the middle of a
    /// 600x400 growth area.
    pub fn new() -> Result<Self, GrowthError> {
        let cfg = Settings {
            bounds: Bounds::centered(Vec2::ZERO, 600.0, 400.0),
            ..Settings::default()
        };
        let mut rng = rand::rng();
        let mut world = World::with_seed(&PartialSettings::from(cfg), rng.random())?;
        world.pause();

        let mut viewer = Self {
            world,
            cfg,
            seed: 0,
            fixed_seed: false,
            rng,
            spawn_radius: 20.0,
            next_color: 0,
            zoom: 1.5,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
            error: None,
        };
        viewer.spawn_circle(Vec2::ZERO);
        Ok(viewer)
    }

    /// Builds a fresh, paused world from `cfg`.
    ///
    /// On invalid settings the current world is kept and the error is
    /// recorded for display.
    fn rebuild_world(&mut self) -> bool {
        let seed = if self.fixed_seed {
            self.seed
        } else {
            self.rng.random()
        };
        match World::with_seed(&PartialSettings::from(self.cfg), seed) {
            Ok(mut world) => {
                world.pause();
                self.world = world;
                self.next_color = 0;
                self.error = None;
                tracing::info!(seed, "built new world");
                true
            }
            Err(err) => {
                tracing::warn!(%err, "rejected settings");
                self.error = Some(err.to_string());
                false
            }
        }
    }

    /// Rebuilds the world and seeds it with the starting circle.
    fn reset(&mut self) {
        if self.rebuild_world() {
            self.spawn_circle(self.cfg.bounds.center());
        }
    }

    /// Rebuilds the world without any paths.
    fn clear(&mut self) {
        self.rebuild_world();
    }

    /// Registers a closed circular path at `center` with the next palette
    /// color.
    fn spawn_circle(&mut self, center: Vec2) {
        let color = PALETTE[self.next_color % PALETTE.len()];
        let circle = Contour::circle(center, self.spawn_radius, CIRCLE_SEGMENTS);
        match self.world.add_path(&circle, Some(color)) {
            Ok(id) => {
                self.next_color += 1;
                tracing::debug!(id, x = center.x, y = center.y, "spawned circle");
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Advances the world by a single step, even while it is paused.
    fn step_once(&mut self, now: f64) {
        let paused = self.world.is_paused();
        self.world.resume();
        self.world.step(now);
        if paused {
            self.world.pause();
        }
    }

    /// Number of paths and shapes that have not gone extinct.
    fn live_counts(&self) -> (usize, usize) {
        let paths = self
            .world
            .growth_paths()
            .iter()
            .filter(|p| !p.is_extinct())
            .count();
        let shapes = self
            .world
            .growth_shapes()
            .iter()
            .filter(|s| !s.is_extinct())
            .count();
        (paths, shapes)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`], up to rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

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

    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
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
                let label = if self.world.is_paused() {
                    "▶ Run"
                } else {
                    "⏸ Pause"
                };
                if ui.button(label).clicked() {
                    self.world.toggle_pause();
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once(now);
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (timing, point and entity counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("points = {}", self.world.point_count()));
                let (paths, shapes) = self.live_counts();
                ui.label(format!("paths = {paths}"));
                ui.label(format!("shapes = {shapes}"));
                if self.world.is_paused() {
                    ui.separator();
                    ui.label("paused");
                }
            });
        });
    }

    /// Builds the right-hand panel for growth settings.
    ///
    /// Edits only take effect when the world is rebuilt.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Settings");

                ui.separator();
                ui.label("Spacing");
                Self::labeled_drag_f32(
                    ui,
                    "min_distance:",
                    &mut self.cfg.min_distance,
                    0.0..=50.0,
                    0.05,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_distance:",
                    &mut self.cfg.max_distance,
                    0.1..=100.0,
                    0.1,
                );
                Self::labeled_drag_usize(
                    ui,
                    "sub_splits_number:",
                    &mut self.cfg.sub_splits_number,
                    1..=2000,
                    1.0,
                );

                ui.separator();
                ui.label("Forces");
                Self::labeled_drag_f32(
                    ui,
                    "attraction_force:",
                    &mut self.cfg.attraction_force,
                    0.0..=2.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "repulsion_force:",
                    &mut self.cfg.repulsion_force,
                    0.0..=5.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "repulsion_radius:",
                    &mut self.cfg.repulsion_radius,
                    0.1..=200.0,
                    0.5,
                );
                Self::labeled_drag_f32(
                    ui,
                    "alignment_force:",
                    &mut self.cfg.alignment_force,
                    0.0..=2.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_velocity:",
                    &mut self.cfg.max_velocity,
                    0.0..=1.0,
                    0.005,
                );
                egui::ComboBox::from_label("boundary")
                    .selected_text(match self.cfg.boundary_repulsion {
                        BoundaryRepulsion::Legacy => "legacy",
                        BoundaryRepulsion::Outward => "outward",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(
                            &mut self.cfg.boundary_repulsion,
                            BoundaryRepulsion::Legacy,
                            "legacy",
                        );
                        ui.selectable_value(
                            &mut self.cfg.boundary_repulsion,
                            BoundaryRepulsion::Outward,
                            "outward",
                        );
                    });

                ui.separator();
                ui.label("Injection");
                Self::labeled_drag_f64(
                    ui,
                    "interval (s):",
                    &mut self.cfg.node_injection_interval,
                    0.0..=10.0,
                    0.01,
                );

                ui.separator();
                ui.label("Bounds");
                Self::labeled_drag_f32(ui, "width:", &mut self.cfg.bounds.width, 1.0..=5000.0, 1.0);
                Self::labeled_drag_f32(
                    ui,
                    "height:",
                    &mut self.cfg.bounds.height,
                    1.0..=5000.0,
                    1.0,
                );

                ui.separator();
                ui.label("Spawning");
                Self::labeled_drag_f32(
                    ui,
                    "circle radius:",
                    &mut self.spawn_radius,
                    0.5..=500.0,
                    0.5,
                );

                ui.separator();
                ui.checkbox(&mut self.cfg.debug_mode, "debug logging");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.fixed_seed, "fixed seed:");
                    ui.add_enabled(self.fixed_seed, egui::DragValue::new(&mut self.seed));
                });

                ui.separator();
                if ui.button("Apply (resets world)").clicked() {
                    let (w, h) = (self.cfg.bounds.width, self.cfg.bounds.height);
                    self.cfg.bounds = Bounds::centered(Vec2::ZERO, w, h);
                    self.reset();
                }
                if ui.button("Reset settings to default").clicked() {
                    self.cfg = Settings {
                        bounds: self.cfg.bounds,
                        ..Settings::default()
                    };
                }

                if let Some(err) = &self.error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err);
                }
            });
    }

    fn draw_contour(
        &self,
        painter: &egui::Painter,
        rect: egui::Rect,
        contour: &Contour,
        color: Option<Color>,
    ) {
        let color = color
            .map(|[r, g, b, a]| egui::Color32::from_rgba_unmultiplied(r, g, b, a))
            .unwrap_or(egui::Color32::LIGHT_GREEN);
        let points: Vec<egui::Pos2> = contour
            .polyline()
            .into_iter()
            .map(|p| self.world_to_screen(p, rect))
            .collect();
        painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
    }

    /// Builds the central panel where the growth is drawn and interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            if response.dragged() {
                self.pan += response.drag_delta();
            }

            if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
                self.world.toggle_pause();
            }

            if response.clicked()
                && let Some(pos) = response.hover_pos()
            {
                let center = self.screen_to_world(pos, rect);
                self.spawn_circle(center);
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

            let bounds = self.world.settings().bounds;
            let corners: Vec<egui::Pos2> = bounds
                .corners()
                .iter()
                .map(|&c| self.world_to_screen(c, rect))
                .collect();
            painter.add(egui::Shape::closed_line(
                corners,
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            ));

            for (shape, color) in self.world.shapes() {
                for contour in &shape.contours {
                    self.draw_contour(&painter, rect, contour, color);
                }
            }
            for (contour, color) in self.world.contours() {
                self.draw_contour(&painter, rect, &contour, color);
            }

            if !self.world.is_paused() {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.world.step(now);
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
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

    fn positions(viewer: &Viewer) -> Vec<Vec<Vec2>> {
        viewer
            .world
            .growth_paths()
            .iter()
            .map(|p| p.positions().to_vec())
            .collect()
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new().unwrap();
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(-3.5, 8.25),
        ] {
            let back = viewer.screen_to_world(viewer.world_to_screen(p, rect), rect);
            assert!(
                (back - p).abs().max_element() < 1e-5,
                "roundtrip mismatch: p={p:?}, back={back:?}"
            );
        }
    }

    #[test]
    fn starts_paused_with_one_circle() {
        let viewer = Viewer::new().unwrap();
        assert!(viewer.world.is_paused());
        assert_eq!(viewer.world.contours().len(), 1);
        assert_eq!(viewer.world.contours()[0].1, Some(PALETTE[0]));
    }

    #[test]
    fn spawned_circles_cycle_through_the_palette() {
        let mut viewer = Viewer::new().unwrap();
        for i in 0..PALETTE.len() {
            viewer.spawn_circle(Vec2::new(i as f32 * 50.0 - 100.0, 100.0));
        }
        let colors: Vec<_> = viewer.world.contours().into_iter().map(|(_, c)| c).collect();
        assert_eq!(colors.len(), PALETTE.len() + 1);
        assert_eq!(colors[0], colors[PALETTE.len()]);
    }

    #[test]
    fn reset_restores_basic_state() {
        let mut viewer = Viewer::new().unwrap();
        viewer.spawn_circle(Vec2::new(100.0, 0.0));
        viewer.world.resume();
        viewer.world.step(0.0);

        viewer.reset();

        assert!(viewer.world.is_paused());
        assert_eq!(viewer.world.contours().len(), 1);
        assert_eq!(viewer.world.point_count(), 0);
        assert!(viewer.error.is_none());
    }

    #[test]
    fn live_counts_skip_extinct_paths() {
        let mut viewer = Viewer::new().unwrap();
        // Entirely outside the 600x400 bounds.
        viewer.spawn_circle(Vec2::new(2000.0, 0.0));
        assert_eq!(viewer.live_counts(), (2, 0));

        viewer.step_once(0.0);

        assert_eq!(viewer.world.growth_paths().len(), 2);
        assert_eq!(viewer.live_counts(), (1, 0));
        assert_eq!(viewer.live_counts().0, viewer.world.contours().len());
    }

    #[test]
    fn clear_removes_all_content() {
        let mut viewer = Viewer::new().unwrap();
        viewer.clear();
        assert!(viewer.world.contours().is_empty());
        assert!(viewer.world.shapes().is_empty());
    }

    #[test]
    fn invalid_settings_keep_the_current_world() {
        let mut viewer = Viewer::new().unwrap();
        viewer.spawn_circle(Vec2::new(100.0, 0.0));
        viewer.cfg.max_distance = viewer.cfg.min_distance;

        viewer.reset();

        assert!(viewer.error.is_some());
        assert_eq!(viewer.world.contours().len(), 2);
    }

    #[test]
    fn fixed_seed_replays_the_same_growth() {
        let run = || {
            let mut viewer = Viewer::new().unwrap();
            viewer.fixed_seed = true;
            viewer.seed = 7;
            viewer.reset();
            for i in 1..=20 {
                viewer.step_once(i as f64 * 0.05);
            }
            positions(&viewer)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn step_once_advances_a_paused_world() {
        let mut viewer = Viewer::new().unwrap();
        let before = positions(&viewer);

        viewer.step_once(0.0);

        assert!(viewer.world.is_paused());
        assert_ne!(positions(&viewer), before);
        assert!(viewer.world.point_count() > 0);
    }
}

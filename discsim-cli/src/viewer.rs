//! Interactive viewer
//!
//! The simulated viewport follows the canvas size, the frame delta comes from
//! egui, and the config file (if any) is watched and reloaded on change.
//! Placement waits for the first canvas rect so discs are laid out in the area
//! actually shown; Reset and reload place again into the current canvas.

use crate::SimArgs;
use discsim_core::{format_runtime_error, step_simulation, SimConfig, Simulation, Viewport};
use eframe::egui;
use notify::{Event, RecommendedWatcher, Watcher};
use std::path::PathBuf;
use std::sync::mpsc;

/// Fill colour for discs, a dark grey on white
const DISC_COLOR: egui::Color32 = egui::Color32::from_gray(64);
const STEP_DT: f32 = 1.0 / 60.0;
/// How often the title bar is refreshed, in seconds
const TITLE_INTERVAL: f32 = 0.5;

pub fn run_viewer(args: SimArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.resolve()?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.width as f32, config.height as f32])
            .with_title("discsim"),
        ..Default::default()
    };

    eframe::run_native(
        "discsim",
        options,
        Box::new(move |cc| Ok(Box::new(ViewerApp::new(args, config, cc)))),
    )?;
    Ok(())
}

/// Frames-per-second over a short window
struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            elapsed: 0.0,
            fps: 0.0,
        }
    }

    /// Returns the new rate whenever the window rolls over
    fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < TITLE_INTERVAL {
            return None;
        }
        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }
}

pub struct ViewerApp {
    args: SimArgs,
    config: SimConfig,
    watched_path: Option<PathBuf>,
    sim: Option<Simulation>,
    last_error: Option<String>,
    playing: bool,
    show_grid: bool,
    fps: FpsCounter,
    #[allow(dead_code)] // Kept alive to maintain file watching
    file_watcher: Option<RecommendedWatcher>,
    file_receiver: mpsc::Receiver<notify::Result<Event>>,
    needs_reload: bool,
    /// Place a fresh layout once the canvas size is known
    restart_pending: bool,
}

impl ViewerApp {
    pub fn new(args: SimArgs, config: SimConfig, _cc: &eframe::CreationContext<'_>) -> Self {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .ok();

        // notify reports absolute paths
        let watched_path = args
            .config_path()
            .map(|path| std::fs::canonicalize(path).unwrap_or_else(|_| path.clone()));

        if let (Some(w), Some(path)) = (watcher.as_mut(), watched_path.as_ref()) {
            if let Err(e) = w.watch(path, notify::RecursiveMode::NonRecursive) {
                tracing::warn!(path = %path.display(), "cannot watch config file: {}", e);
            }
        }

        Self {
            args,
            config,
            watched_path,
            sim: None,
            last_error: None,
            playing: true,
            show_grid: false,
            fps: FpsCounter::new(),
            file_watcher: watcher,
            file_receiver: rx,
            needs_reload: false,
            restart_pending: true,
        }
    }

    fn rebuild_simulation(&mut self, canvas: Viewport) {
        self.restart_pending = false;
        self.config = self.config.clone().with_viewport(canvas);
        match Simulation::new(self.config.clone()) {
            Ok(sim) => {
                self.sim = Some(sim);
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!("{}", e);
                self.last_error = Some(format_runtime_error(&e));
                self.sim = None;
                self.playing = false;
            }
        }
    }

    fn reload_config(&mut self) {
        match self.args.resolve() {
            Ok(config) => {
                tracing::info!("config reloaded");
                // The canvas size replaces the file's on the next frame.
                self.config = config;
                self.restart_pending = true;
            }
            Err(e) => {
                tracing::warn!("config reload failed: {}", e);
                self.last_error = Some(format_runtime_error(&e));
            }
        }
    }

    fn check_file_changes(&mut self) {
        while let Ok(event) = self.file_receiver.try_recv() {
            match event {
                Ok(Event {
                    kind: notify::EventKind::Modify(_),
                    paths,
                    ..
                }) => {
                    if let Some(path) = &self.watched_path {
                        if paths.contains(path) {
                            self.needs_reload = true;
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("file watcher error: {}", e);
                }
            }
        }

        if self.needs_reload {
            self.reload_config();
            self.needs_reload = false;
        }
    }

    fn advance(&mut self, dt: f32) {
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        if let Err(e) = step_simulation(sim, dt) {
            self.last_error = Some(format_runtime_error(&e));
            self.playing = false;
        }
    }

    fn fit_to_canvas(&mut self, rect: egui::Rect) {
        let viewport = Viewport::new(rect.width() as u32, rect.height() as u32);
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }
        if self.restart_pending {
            self.rebuild_simulation(viewport);
            return;
        }
        let Some(sim) = self.sim.as_mut() else {
            return;
        };
        if let Err(e) = sim.resize(viewport) {
            self.last_error = Some(format_runtime_error(&e));
            self.playing = false;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_file_changes();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button(if self.playing { "⏸ Pause" } else { "▶ Play" }).clicked() {
                    self.playing = !self.playing;
                }

                if ui.button("⏮ Reset").clicked() {
                    self.restart_pending = true;
                }

                if ui.button("⏭ Step").clicked() {
                    self.advance(STEP_DT);
                }

                ui.separator();
                ui.checkbox(&mut self.show_grid, "Grid");
                ui.separator();

                if let Some(ref sim) = self.sim {
                    ui.label(format!(
                        "Frame: {}  Particles: {}  Energy: {:.0}",
                        sim.current_frame,
                        sim.world.len(),
                        sim.energy.last()
                    ));
                }
            });
        });

        if let Some(ref error) = self.last_error {
            egui::TopBottomPanel::bottom("errors").show(ctx, |ui| {
                ui.set_max_height(100.0);
                ui.label(egui::RichText::new(error).color(egui::Color32::RED));
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::WHITE))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.fit_to_canvas(rect);

                if self.playing {
                    let dt = ctx.input(|i| i.stable_dt);
                    self.advance(dt);
                }

                let painter = ui.painter();
                let Some(ref sim) = self.sim else {
                    return;
                };

                if self.show_grid {
                    let stroke = egui::Stroke::new(1.0, egui::Color32::from_gray(220));
                    let cell = sim.grid.cell_size();
                    for col in 1..sim.grid.cols() {
                        let x = rect.min.x + col as f32 * cell.x;
                        painter.line_segment(
                            [egui::pos2(x, rect.min.y), egui::pos2(x, rect.max.y)],
                            stroke,
                        );
                    }
                    for row in 1..sim.grid.rows() {
                        let y = rect.min.y + row as f32 * cell.y;
                        painter.line_segment(
                            [egui::pos2(rect.min.x, y), egui::pos2(rect.max.x, y)],
                            stroke,
                        );
                    }
                }

                for particle in sim.particles() {
                    let center = rect.min + egui::vec2(particle.pos.x, particle.pos.y);
                    painter.circle_filled(center, particle.radius, DISC_COLOR);
                }
            });

        let dt = ctx.input(|i| i.stable_dt);
        if let Some(fps) = self.fps.tick(dt) {
            let energy = self.sim.as_ref().map_or(0.0, |sim| sim.energy.last());
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(format!(
                "discsim - {:.0} fps - energy {:.0}",
                fps, energy
            )));
        }

        if self.playing {
            ctx.request_repaint();
        }
    }
}

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use crate::config::Settings;
use crate::flow::{FlowGraph, FlowSource, collect_flow_graph};

mod graph;
mod interaction;
mod layout;
mod render_utils;
mod session;
mod surface;
mod ui;

use session::GraphSession;
use surface::Frame;

/// Canonical identifier of the one view this application owns.
pub const CODE_FLOW_VIEW: &str = "code-flow";

type LoadResult = Result<FlowGraph, String>;

pub struct CodeFlowApp {
    source: FlowSource,
    settings: Settings,
    state: AppState,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

impl AppState {
    /// Cancels any running simulation so a stale tick can never touch a
    /// replaced graph.
    fn teardown(&mut self) {
        if let Self::Ready(model) = self
            && let Some(session) = model.session.as_mut()
        {
            session.teardown();
        }
    }
}

struct ViewModel {
    source_label: String,
    settings: Settings,
    session: Option<GraphSession>,
    frame: Option<Frame>,
    search: String,
    pan: Vec2,
    zoom: f32,
    pointer_drag: Option<PointerDrag>,
    search_results_cache: Option<SearchResultsCache>,
    screen_scratch: ScreenScratch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PointerDrag {
    Node(usize),
    Canvas,
}

struct SearchResultsCache {
    query: String,
    results: Arc<Vec<usize>>,
}

/// Screen-space copies of the current frame's node sprites, index-aligned
/// with `Frame::nodes`.
#[derive(Default)]
struct ScreenScratch {
    positions: Vec<egui::Pos2>,
    radii: Vec<f32>,
}

impl CodeFlowApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: FlowSource, settings: Settings) -> Self {
        log::info!("opening {CODE_FLOW_VIEW} view for {source}");
        let state = Self::start_load(source.clone());
        Self {
            source,
            settings,
            state,
        }
    }

    fn spawn_load(source: FlowSource) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = collect_flow_graph(&source).map_err(|error| {
                log::error!("{error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: FlowSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready(&self, graph: FlowGraph) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            graph,
            self.source.to_string(),
            self.settings.clone(),
        )))
    }

    /// Tears the current state down before replacing it and hands back the
    /// retired state.
    fn transition_to(&mut self, next: AppState) -> AppState {
        self.state.teardown();
        std::mem::replace(&mut self.state, next)
    }

    /// Reload and Retry share this path: the live session is stopped and the
    /// window shows the loading screen until the new payload arrives.
    fn reload(&mut self) -> AppState {
        log::info!("reloading code flow data from {}", self.source);
        let next = Self::start_load(self.source.clone());
        self.transition_to(next)
    }
}

impl eframe::App for CodeFlowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut reload = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(graph) => self.ready(graph),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading code flow data...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Error loading code flow data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload = true;
                    }
                });
            }
            AppState::Ready(model) => model.show(ctx, &mut reload),
        }

        if reload {
            self.reload();
            ctx.request_repaint();
        } else if let Some(next_state) = transition {
            self.transition_to(next_state);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.teardown();
    }
}

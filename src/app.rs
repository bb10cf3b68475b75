use eframe::egui::{self, ScrollArea, Ui};

use crate::state::{AppState, Event, Page};
use crate::ui::{charts, metrics, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Each frame renders from `state` and collects [`Event`]s; the events are
/// applied once the frame is laid out, so the next frame shows their effect.
pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<Event> = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state, &mut events);
        });

        // ---- Left side panel: menu and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &self.state, &mut events);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| page(ui, &self.state, &mut events));
        });

        let changed = !events.is_empty();
        for event in events {
            self.state.handle(event);
        }
        if changed {
            ctx.request_repaint();
        }
    }
}

fn page(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    ui.heading("Analytics dashboard: processing, KPIs, trends and forecasts");

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Open a records file to start  (File → Open…)");
        });
        return;
    }

    ui.strong(format!("Page: {}", state.page.title()));
    match state.page {
        Page::Home => {
            metrics::dataset_table(ui, state, events);
            ui.add_space(8.0);
            metrics::metric_cards(ui, state);
        }
        Page::Progress => metrics::progress_bar(ui, &state.view.progress),
    }
    ui.separator();
    charts::graphs(ui, state);
    ui.separator();
    charts::feature_quartiles(ui, state, events);
}

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use super::format::{abbreviate, thousands};
use crate::data::aggregate::Summary;
use crate::data::model::Field;
use crate::state::{AppState, Event};
use crate::view::Progress;

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

fn card(ui: &mut Ui, title: &str, label: &str, value: String, hover: Option<String>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(title).strong());
        ui.label(RichText::new(label).small());
        let response = ui.label(RichText::new(value).heading());
        if let Some(text) = hover {
            response.on_hover_text(text);
        }
    });
}

/// Sum / mode / mean / median of production and the quality total.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    let stat = |pick: fn(&Summary) -> f64| {
        view.production
            .as_ref()
            .map_or_else(|| "no data".to_string(), |s| thousands(pick(s)))
    };

    ui.columns(5, |cols| {
        card(&mut cols[0], "Sum Production", "Sum", stat(|s| s.sum), None);
        card(&mut cols[1], "Most Production", "Mode", stat(|s| s.mode), None);
        card(&mut cols[2], "Average Production", "Average", stat(|s| s.mean), None);
        card(&mut cols[3], "Central Production", "Median", stat(|s| s.median), None);
        card(
            &mut cols[4],
            "Quality",
            "Quality",
            abbreviate(view.quality_total),
            Some(format!("Total Quality: {}", view.quality_total)),
        );
    });

    if ui.small_button("Copy metrics as JSON").clicked() {
        match view.to_json() {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("Failed to serialize metrics: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset table
// ---------------------------------------------------------------------------

/// Collapsible table of the filtered records with a column chooser.
pub fn dataset_table(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    let Some(dataset) = &state.dataset else {
        return;
    };

    egui::CollapsingHeader::new("VIEW DATASET")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                ui.label("Columns:");
                for field in Field::ALL {
                    let shown = state.visible_columns.contains(&field);
                    if ui.selectable_label(shown, field.name()).clicked() {
                        events.push(Event::ToggleColumn(field));
                    }
                }
            });
            ui.separator();

            let columns: Vec<Field> = Field::ALL
                .into_iter()
                .filter(|f| state.visible_columns.contains(f))
                .collect();
            let rows = &state.view.rows;

            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(300.0)
                .columns(Column::auto().resizable(true), columns.len())
                .header(20.0, |mut header| {
                    for field in &columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(field.name());
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, rows.len(), |mut row| {
                        let record = &dataset.records[rows[row.index()]];
                        for field in &columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(record.value(*field).to_string());
                            });
                        }
                    });
                });
        });
}

// ---------------------------------------------------------------------------
// Progress towards target
// ---------------------------------------------------------------------------

pub fn progress_bar(ui: &mut Ui, progress: &Progress) {
    if progress.target_exceeded() {
        ui.heading("Target achieved!");
    } else {
        ui.label(format!(
            "You have {}% of {} units of Production",
            progress.percent,
            progress.target
        ));
    }
    ui.add(
        egui::ProgressBar::new(progress.fraction())
            .text(format!("Target Percentage: {}%", progress.percent)),
    );
    ui.label(format!(
        "{} / {}",
        thousands(progress.current),
        thousands(progress.target.get() as f64)
    ));
}

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::SelectionChange;
use crate::data::model::Field;
use crate::state::{AppState, Event, Page};

// ---------------------------------------------------------------------------
// Left side panel – logo, main menu, filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.  Widgets push [`Event`]s; nothing mutates here.
pub fn side_panel(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    // ---- Logo (centered) ----
    if let Some(logo) = &state.logo {
        let uri = format!("file://{}", logo.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
            ui.label(RichText::new("Online Analytics").small());
        });
        ui.add_space(4.0);
    }

    // ---- Main menu ----
    ui.heading("Main Menu");
    ui.horizontal(|ui: &mut Ui| {
        for page in Page::ALL {
            if ui.selectable_label(state.page == page, page.title()).clicked() {
                events.push(Event::ShowPage(page));
            }
        }
    });
    ui.separator();

    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for field in Field::FILTERABLE {
                let Some(all_values) = dataset.unique_values.get(&field) else {
                    continue;
                };
                let selected = state.selection.accepted(field);

                // Show count of selected / total in the header
                let n_selected = selected.map_or(all_values.len(), |s| s.len());
                let n_total = all_values.len();
                let header_text = format!("Select {field}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field.name())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                events.push(Event::Filter(SelectionChange::SelectAll(field)));
                            }
                            if ui.small_button("None").clicked() {
                                events.push(Event::Filter(SelectionChange::SelectNone(field)));
                            }
                        });

                        let colors = state.colors.get(&field);
                        for val in all_values {
                            let mut checked = selected.map_or(true, |s| s.contains(val));
                            let mut text = RichText::new(val.to_string());
                            if let Some(cm) = colors {
                                text = text.color(cm.color_for(val));
                            }
                            if ui.checkbox(&mut checked, text).changed() {
                                events.push(Event::Filter(SelectionChange::Toggle {
                                    field,
                                    value: val.clone(),
                                }));
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                if let Some(path) = open_file_dialog() {
                    events.push(Event::Open(path));
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.view.rows.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open production records")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file()
}

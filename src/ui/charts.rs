use std::f64::consts::TAU;

use eframe::egui::{self, Align2, Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, PlotPoints,
    Points, Polygon, Text,
};

use crate::color::SERIES_COLOR;
use crate::data::model::Field;
use crate::state::{AppState, Event};
use crate::view::DashboardView;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Chart grid shared by both pages
// ---------------------------------------------------------------------------

/// Line, bar and pie side by side, then the two full-width point charts.
pub fn graphs(ui: &mut Ui, state: &AppState) {
    let view = &state.view;
    ui.columns(3, |cols| {
        production_by_satisfaction(&mut cols[0], view);
        production_by_quality(&mut cols[1], view);
        quality_by_satisfaction(&mut cols[2], state);
    });
    ui.add_space(8.0);
    production_vs_cost(ui, view);
    ui.add_space(8.0);
    energy_vs_production(ui, view);
}

fn production_by_satisfaction(ui: &mut Ui, view: &DashboardView) {
    ui.strong("PRODUCTION BY SATISFACTION");
    let points: PlotPoints = view
        .production_by_satisfaction
        .iter()
        .filter_map(|g| Some([g.key.as_f64()?, g.sum]))
        .collect();

    Plot::new("production_by_satisfaction")
        .height(CHART_HEIGHT)
        .x_axis_label("Satisfaction")
        .y_axis_label("Production")
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).color(SERIES_COLOR).width(2.0).name("Production"));
        });
}

fn production_by_quality(ui: &mut Ui, view: &DashboardView) {
    ui.strong("PRODUCTION BY QUALITY");
    // Bars are stacked in group order (ascending production), labelled in place.
    let bars: Vec<Bar> = view
        .production_by_quality
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.sum)
                .name(format!("Quality {} (mean {:.1})", g.key, g.mean()))
                .fill(SERIES_COLOR)
        })
        .collect();
    let labels: Vec<Text> = view
        .production_by_quality
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Text::new(PlotPoint::new(0.0, i as f64), format!(" {}", g.key))
                .anchor(Align2::LEFT_CENTER)
                .color(Color32::WHITE)
        })
        .collect();

    Plot::new("production_by_quality")
        .height(CHART_HEIGHT)
        .x_axis_label("Production")
        .y_axis_label("Quality")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Production"));
            for label in labels {
                plot_ui.text(label);
            }
        });
}

fn quality_by_satisfaction(ui: &mut Ui, state: &AppState) {
    ui.strong("QUALITY BY SATISFACTION");
    let colors = state.colors.get(&Field::Satisfaction);

    Plot::new("quality_by_satisfaction")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for slice in &state.view.quality_by_satisfaction {
                if slice.share <= 0.0 {
                    continue;
                }
                let sweep = slice.share * TAU;
                let color = colors.map_or(SERIES_COLOR, |cm| cm.color_for(&slice.key));
                let name = format!("Satisfaction {} ({})", slice.key, slice.value);

                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(wedge(start, sweep)))
                        .name(&name)
                        .fill_color(color)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                );

                let mid = start + sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    format!("{}\n{:.1}%", slice.key, slice.share * 100.0),
                ));
                start += sweep;
            }
        });
}

/// Unit-circle wedge from `start` spanning `sweep` radians.
fn wedge(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * 90.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        points.push([angle.cos(), angle.sin()]);
    }
    points
}

fn production_vs_cost(ui: &mut Ui, view: &DashboardView) {
    ui.strong("PRODUCTION VS. COST");
    Plot::new("production_vs_cost")
        .height(CHART_HEIGHT)
        .x_axis_label("Production")
        .y_axis_label("Cost")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(view.production_vs_cost.clone()))
                    .radius(3.0)
                    .color(SERIES_COLOR)
                    .name("Records"),
            );
        });
}

fn energy_vs_production(ui: &mut Ui, view: &DashboardView) {
    ui.strong("ENERGY CONSUMPTION VS. PRODUCTION");
    Plot::new("energy_vs_production")
        .height(CHART_HEIGHT)
        .x_axis_label("Production")
        .y_axis_label("Energy")
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(view.energy_vs_production.clone()))
                    .color(SERIES_COLOR)
                    .width(1.5)
                    .name("Energy"),
            );
        });
}

// ---------------------------------------------------------------------------
// Box plot with field pickers
// ---------------------------------------------------------------------------

/// "Feature by quartiles": distribution of a numeric field per category.
pub fn feature_quartiles(ui: &mut Ui, state: &AppState, events: &mut Vec<Event>) {
    ui.heading("PICK FEATURES TO EXPLORE DISTRIBUTIONS TRENDS BY QUARTILES");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Qualitative (x)");
        egui::ComboBox::from_id_salt("box_group")
            .selected_text(state.box_group.name())
            .show_ui(ui, |ui: &mut Ui| {
                for field in Field::categorical() {
                    if ui.selectable_label(state.box_group == field, field.name()).clicked() {
                        events.push(Event::BoxGroup(field));
                    }
                }
            });

        ui.label("Quantitative (y)");
        egui::ComboBox::from_id_salt("box_measure")
            .selected_text(state.box_measure.name())
            .show_ui(ui, |ui: &mut Ui| {
                for field in Field::numeric() {
                    if ui.selectable_label(state.box_measure == field, field.name()).clicked() {
                        events.push(Event::BoxMeasure(field));
                    }
                }
            });
    });

    let colors = state.colors.get(&state.box_group);
    let boxes: Vec<BoxElem> = state
        .quartiles
        .iter()
        .enumerate()
        .map(|(i, (key, stats))| {
            let color = colors.map_or(SERIES_COLOR, |cm| cm.color_for(key));
            BoxElem::new(
                i as f64,
                BoxSpread::new(
                    stats.lower_whisker,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.upper_whisker,
                ),
            )
            .name(format!("{} {key}", state.box_group))
            .fill(color.linear_multiply(0.4))
            .stroke(Stroke::new(1.5, color))
        })
        .collect();

    Plot::new("feature_quartiles")
        .height(CHART_HEIGHT + 60.0)
        .x_axis_label(state.box_group.name())
        .y_axis_label(state.box_measure.name())
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name("FEATURE BY QUARTILES"));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wedge_spans_arc_from_center() {
        let points = wedge(0.0, TAU / 4.0);
        assert_eq!(points[0], [0.0, 0.0]);
        assert_eq!(points[1], [1.0, 0.0]);
        let last = points[points.len() - 1];
        assert!(last[0].abs() < 1e-9 && (last[1] - 1.0).abs() < 1e-9);
        assert!(points[1..]
            .iter()
            .all(|p| ((p[0] * p[0] + p[1] * p[1]).sqrt() - 1.0).abs() < 1e-9));
    }
}

use std::num::NonZeroU64;

use serde::Serialize;

use crate::data::aggregate::{
    aggregate, box_stats, group_aggregate, pairs, progress_ratio, BoxStats, Group, GroupOrder,
    Summary,
};
use crate::data::filter::{filter, Selection};
use crate::data::model::{Dataset, Field, Value};

// ---------------------------------------------------------------------------
// Everything the dashboard renders for one selection
// ---------------------------------------------------------------------------

/// Derived metrics and chart series for one `(dataset, selection)` pair.
///
/// Recomputed from scratch whenever the selection changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardView {
    /// Indices of records passing the selection, ascending.
    pub rows: Vec<usize>,
    /// `None` when no record passes the selection.
    pub production: Option<Summary>,
    pub quality_total: f64,
    /// Horizontal bar: production per quality score, ascending by sum.
    pub production_by_quality: Vec<Group>,
    /// Line: production per satisfaction score, ascending by score.
    pub production_by_satisfaction: Vec<Group>,
    /// Pie: quality per satisfaction score, ascending by score.
    pub quality_by_satisfaction: Vec<Slice>,
    /// Scatter: (production, cost) in row order.
    pub production_vs_cost: Vec<[f64; 2]>,
    /// Line: (production, energy) sorted by production.
    pub energy_vs_production: Vec<[f64; 2]>,
    pub progress: Progress,
}

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub key: Value,
    pub value: f64,
    /// Share of the pie in `0.0..=1.0`.
    pub share: f64,
}

/// Production measured against the fixed target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub current: f64,
    pub target: NonZeroU64,
    pub percent: i64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current: 0.0,
            target: NonZeroU64::MIN,
            percent: 0,
        }
    }
}

impl Progress {
    pub fn target_exceeded(&self) -> bool {
        self.percent > 100
    }

    /// Fill fraction for a progress bar, clamped to `0.0..=1.0`.
    pub fn fraction(&self) -> f32 {
        (self.percent as f32 / 100.0).clamp(0.0, 1.0)
    }
}

impl DashboardView {
    pub fn compute(dataset: &Dataset, selection: &Selection, target: NonZeroU64) -> Self {
        let view = filter(dataset, selection);

        let quality_by_satisfaction = slices(&group_aggregate(
            &view,
            Field::Satisfaction,
            Field::Quality,
            GroupOrder::ByKey,
        ));

        let mut energy_vs_production = pairs(&view, Field::Production, Field::Energy);
        energy_vs_production.sort_by(|a, b| a[0].total_cmp(&b[0]));

        let production = aggregate(&view, Field::Production);
        log::debug!(
            "Recomputed dashboard: {} of {} records visible",
            view.len(),
            dataset.len()
        );

        DashboardView {
            rows: view.indices().to_vec(),
            production,
            quality_total: view.measures(Field::Quality).sum(),
            production_by_quality: group_aggregate(
                &view,
                Field::Quality,
                Field::Production,
                GroupOrder::ByValue,
            ),
            production_by_satisfaction: group_aggregate(
                &view,
                Field::Satisfaction,
                Field::Production,
                GroupOrder::ByKey,
            ),
            quality_by_satisfaction,
            production_vs_cost: pairs(&view, Field::Production, Field::Cost),
            energy_vs_production,
            progress: Progress {
                current: production.map_or(0.0, |s| s.sum),
                target,
                percent: progress_ratio(&view, Field::Production, target),
            },
        }
    }

    /// Pretty JSON of every metric and series, for copying out of the UI.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn slices(groups: &[Group]) -> Vec<Slice> {
    let total: f64 = groups.iter().map(|g| g.sum).sum();
    groups
        .iter()
        .map(|g| Slice {
            key: g.key.clone(),
            value: g.sum,
            share: if total == 0.0 { 0.0 } else { g.sum / total },
        })
        .collect()
}

/// Box plot series for the user-chosen fields.
pub fn feature_quartiles(
    dataset: &Dataset,
    selection: &Selection,
    group_field: Field,
    measure_field: Field,
) -> Vec<(Value, BoxStats)> {
    box_stats(&filter(dataset, selection), group_field, measure_field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::dataset;

    fn target(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn sample() -> Dataset {
        let mut ds = dataset(&[(1, "X", 30.0), (2, "X", 10.0), (2, "Y", 20.0)]);
        let sat = [5, 1, 5];
        for (rec, s) in ds.records.iter_mut().zip(sat) {
            rec.satisfaction = s;
        }
        Dataset::from_records(ds.records)
    }

    #[test]
    fn test_compute_full_selection() {
        let ds = sample();
        let view = DashboardView::compute(&ds, &Selection::all(&ds), target(120));

        assert_eq!(view.rows, vec![0, 1, 2]);
        assert_eq!(view.production.unwrap().sum, 60.0);
        assert_eq!(view.quality_total, 5.0);

        let bar: Vec<(Value, f64)> = view
            .production_by_quality
            .iter()
            .map(|g| (g.key.clone(), g.sum))
            .collect();
        assert_eq!(bar, vec![(Value::Integer(1), 30.0), (Value::Integer(2), 30.0)]);

        let line: Vec<(Value, f64)> = view
            .production_by_satisfaction
            .iter()
            .map(|g| (g.key.clone(), g.sum))
            .collect();
        assert_eq!(line, vec![(Value::Integer(1), 10.0), (Value::Integer(5), 50.0)]);

        let shares: Vec<f64> = view.quality_by_satisfaction.iter().map(|s| s.share).collect();
        assert_eq!(shares, vec![0.4, 0.6]);

        assert_eq!(view.production_vs_cost, vec![[30.0, 15.0], [10.0, 5.0], [20.0, 10.0]]);
        assert_eq!(view.energy_vs_production, vec![[10.0, 1.0], [20.0, 2.0], [30.0, 3.0]]);

        assert_eq!(view.progress.percent, 50);
        assert!(!view.progress.target_exceeded());
        assert_eq!(view.progress.fraction(), 0.5);
    }

    #[test]
    fn test_compute_empty_selection() {
        let ds = sample();
        let sel = Selection::all(&ds).with(Field::Equipment, Vec::new());
        let view = DashboardView::compute(&ds, &sel, target(100));

        assert!(view.rows.is_empty());
        assert_eq!(view.production, None);
        assert_eq!(view.quality_total, 0.0);
        assert!(view.production_by_quality.is_empty());
        assert!(view.quality_by_satisfaction.is_empty());
        assert_eq!(view.progress.percent, 0);
    }

    #[test]
    fn test_target_exceeded() {
        let ds = sample();
        let view = DashboardView::compute(&ds, &Selection::all(&ds), target(50));
        assert_eq!(view.progress.percent, 120);
        assert!(view.progress.target_exceeded());
        assert_eq!(view.progress.fraction(), 1.0);
    }

    #[test]
    fn test_to_json() {
        let ds = sample();
        let view = DashboardView::compute(&ds, &Selection::all(&ds), target(120));
        let json: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();
        assert_eq!(json["production"]["sum"], 60.0);
        assert_eq!(json["progress"]["percent"], 50);
        assert_eq!(json["production_by_quality"][0]["key"]["Integer"], 1);

        let none = Selection::default().with(Field::Quality, Vec::new());
        let empty = DashboardView::compute(&ds, &none, target(1));
        let json: serde_json::Value = serde_json::from_str(&empty.to_json().unwrap()).unwrap();
        assert!(json["production"].is_null());
    }

    #[test]
    fn test_feature_quartiles_respects_selection() {
        let ds = sample();
        let sel = Selection::all(&ds).with(Field::Equipment, [Value::Text("X".into())]);
        let boxes = feature_quartiles(&ds, &sel, Field::Equipment, Field::Production);
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].1.median, 20.0);
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;
use std::num::NonZeroU64;

use serde::Serialize;

use super::filter::FilteredView;
use super::model::{Field, Value};

// ---------------------------------------------------------------------------
// Flat statistics
// ---------------------------------------------------------------------------

/// Summary statistics of one numeric field over a filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; ties resolve to the lowest value.
    pub mode: f64,
}

/// Sum, mean, median and mode of `field` over `view`.
///
/// Returns `None` ("no data") when the view is empty or `field` is not
/// numeric, so callers never see a division by zero.
pub fn aggregate(view: &FilteredView<'_>, field: Field) -> Option<Summary> {
    let mut values: Vec<f64> = view.measures(field).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);

    let count = values.len();
    let sum: f64 = values.iter().sum();
    Some(Summary {
        count,
        sum,
        mean: sum / count as f64,
        median: median_of_sorted(&values),
        mode: mode_of_sorted(&values),
    })
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Scan runs of equal values; a strictly longer run replaces the current
/// best, so the earliest (lowest) value wins a tie.
fn mode_of_sorted(sorted: &[f64]) -> f64 {
    let mut best = sorted[0];
    let mut best_run = 0;
    let mut start = 0;
    while start < sorted.len() {
        let value = sorted[start];
        let run = sorted[start..]
            .iter()
            .take_while(|v| v.total_cmp(&value) == Ordering::Equal)
            .count();
        if run > best_run {
            best = value;
            best_run = run;
        }
        start += run;
    }
    best
}

// ---------------------------------------------------------------------------
// Grouped statistics
// ---------------------------------------------------------------------------

/// Ordering of the groups returned by [`group_aggregate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupOrder {
    /// Order of first appearance in the view.
    #[default]
    Insertion,
    /// Ascending group key.
    ByKey,
    /// Ascending summed value, ties broken by key.
    ByValue,
}

/// Sum and count of one measure for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: Value,
    pub count: usize,
    pub sum: f64,
}

impl Group {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Group `view` by `group_field` and sum `measure_field` per group.
pub fn group_aggregate(
    view: &FilteredView<'_>,
    group_field: Field,
    measure_field: Field,
    order: GroupOrder,
) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    let mut slot: HashMap<Value, usize> = HashMap::new();

    for rec in view.records() {
        let Some(measure) = rec.measure(measure_field) else {
            continue;
        };
        let key = rec.value(group_field);
        let idx = *slot.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                count: 0,
                sum: 0.0,
            });
            groups.len() - 1
        });
        groups[idx].count += 1;
        groups[idx].sum += measure;
    }

    match order {
        GroupOrder::Insertion => {}
        GroupOrder::ByKey => groups.sort_by(|a, b| a.key.cmp(&b.key)),
        GroupOrder::ByValue => {
            groups.sort_by(|a, b| a.sum.total_cmp(&b.sum).then_with(|| a.key.cmp(&b.key)))
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Progress towards a target
// ---------------------------------------------------------------------------

/// Summed `measure_field` as a percentage of `target`, rounded half to even.
///
/// Results above 100 are valid and mean the target is exceeded.
pub fn progress_ratio(view: &FilteredView<'_>, measure_field: Field, target: NonZeroU64) -> i64 {
    let current: f64 = view.measures(measure_field).sum();
    (current / target.get() as f64 * 100.0).round_ties_even() as i64
}

// ---------------------------------------------------------------------------
// Distribution per group (box plot)
// ---------------------------------------------------------------------------

/// Five-number summary plus Tukey whiskers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Lowest value within `q1 - 1.5 * IQR`.
    pub lower_whisker: f64,
    /// Highest value within `q3 + 1.5 * IQR`.
    pub upper_whisker: f64,
}

impl BoxStats {
    /// Compute from unsorted values; `None` when empty.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let q1 = quantile_of_sorted(&values, 0.25);
        let q3 = quantile_of_sorted(&values, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let lower_whisker = values.iter().copied().find(|v| *v >= low_fence).unwrap_or(q1);
        let upper_whisker = values
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);

        Some(BoxStats {
            min: values[0],
            q1,
            median: median_of_sorted(&values),
            q3,
            max: values[values.len() - 1],
            lower_whisker,
            upper_whisker,
        })
    }
}

/// Linear interpolation between closest ranks.
fn quantile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Distribution of `measure_field` per `group_field` key, keys ascending.
pub fn box_stats(
    view: &FilteredView<'_>,
    group_field: Field,
    measure_field: Field,
) -> Vec<(Value, BoxStats)> {
    let mut buckets: std::collections::BTreeMap<Value, Vec<f64>> = Default::default();
    for rec in view.records() {
        if let Some(v) = rec.measure(measure_field) {
            buckets.entry(rec.value(group_field)).or_default().push(v);
        }
    }
    buckets
        .into_iter()
        .filter_map(|(key, values)| BoxStats::from_values(values).map(|s| (key, s)))
        .collect()
}

// ---------------------------------------------------------------------------
// Point series
// ---------------------------------------------------------------------------

/// `(x, y)` points of two numeric fields, in row order.
pub fn pairs(view: &FilteredView<'_>, x_field: Field, y_field: Field) -> Vec<[f64; 2]> {
    view.records()
        .filter_map(|r| Some([r.measure(x_field)?, r.measure(y_field)?]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, Selection};
    use crate::data::fixtures::dataset;
    use crate::data::model::Dataset;

    fn sample() -> Dataset {
        dataset(&[
            (2, "X", 20.0),
            (1, "Y", 30.0),
            (1, "X", 10.0),
            (3, "Y", 40.0),
            (2, "Z", 50.0),
            (1, "Z", 10.0),
        ])
    }

    #[test]
    fn test_two_record_example() {
        let ds = dataset(&[(1, "X", 10.0), (2, "X", 20.0)]);
        let sel = Selection::all(&ds)
            .with(Field::Quality, [Value::Integer(1)])
            .with(Field::Equipment, [Value::Text("X".into())]);
        let view = filter(&ds, &sel);

        let s = aggregate(&view, Field::Production).unwrap();
        assert_eq!(s.count, 1);
        assert_eq!(s.sum, 10.0);
        assert_eq!(s.mean, 10.0);
        assert_eq!(s.median, 10.0);
        assert_eq!(s.mode, 10.0);
    }

    #[test]
    fn test_aggregate_full_view() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));
        let s = aggregate(&view, Field::Production).unwrap();
        assert_eq!(s.count, 6);
        assert_eq!(s.sum, 160.0);
        assert!((s.mean - 160.0 / 6.0).abs() < 1e-9);
        // sorted: 10 10 20 30 40 50
        assert_eq!(s.median, 25.0);
        assert_eq!(s.mode, 10.0);
    }

    #[test]
    fn test_empty_view_is_no_data() {
        let ds = sample();
        let view = filter(&ds, &Selection::default().with(Field::Quality, Vec::new()));
        assert!(view.is_empty());
        assert_eq!(aggregate(&view, Field::Production), None);
        assert!(group_aggregate(&view, Field::Quality, Field::Production, GroupOrder::ByValue).is_empty());
        assert!(box_stats(&view, Field::Equipment, Field::Production).is_empty());
        assert_eq!(progress_ratio(&view, Field::Production, NonZeroU64::new(10).unwrap()), 0);
    }

    #[test]
    fn test_non_numeric_field_is_no_data() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));
        assert_eq!(aggregate(&view, Field::Equipment), None);
    }

    #[test]
    fn test_mode_tie_picks_lowest() {
        let ds = dataset(&[(1, "X", 7.0), (1, "X", 3.0), (1, "X", 7.0), (1, "X", 3.0), (1, "X", 5.0)]);
        let view = filter(&ds, &Selection::all(&ds));
        assert_eq!(aggregate(&view, Field::Production).unwrap().mode, 3.0);
    }

    #[test]
    fn test_group_orders() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));

        let keys = |order| {
            group_aggregate(&view, Field::Equipment, Field::Production, order)
                .into_iter()
                .map(|g| (g.key.to_string(), g.sum))
                .collect::<Vec<_>>()
        };

        let x = ("X".to_string(), 30.0);
        let y = ("Y".to_string(), 70.0);
        let z = ("Z".to_string(), 60.0);
        assert_eq!(keys(GroupOrder::Insertion), vec![x.clone(), y.clone(), z.clone()]);
        assert_eq!(keys(GroupOrder::ByKey), vec![x.clone(), y.clone(), z.clone()]);
        assert_eq!(keys(GroupOrder::ByValue), vec![x, z, y]);
    }

    #[test]
    fn test_group_sums_match_flat_aggregate() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));
        let groups = group_aggregate(&view, Field::Quality, Field::Production, GroupOrder::default());
        assert_eq!(groups.len(), 3);

        for g in &groups {
            let only = Selection::all(&ds).with(Field::Quality, [g.key.clone()]);
            let sub = filter(&ds, &only);
            let flat = aggregate(&sub, Field::Production).unwrap();
            assert_eq!(g.sum, flat.sum);
            assert_eq!(g.count, flat.count);
            assert_eq!(g.mean(), flat.mean);
        }
        let total: f64 = groups.iter().map(|g| g.sum).sum();
        assert_eq!(total, aggregate(&view, Field::Production).unwrap().sum);
    }

    #[test]
    fn test_progress_ratio() {
        let ds = dataset(&[(1, "X", 600.0), (1, "X", 400.0)]);
        let view = filter(&ds, &Selection::all(&ds));
        let pct = |t| progress_ratio(&view, Field::Production, NonZeroU64::new(t).unwrap());

        assert_eq!(pct(1000), 100);
        assert_eq!(pct(4000), 25);
        assert_eq!(pct(500), 200);
        assert_eq!(pct(3000), 33);
        assert_eq!(pct(400), 250);
        assert_eq!(pct(80_000), 1);
    }

    #[test]
    fn test_box_stats() {
        let stats = BoxStats::from_values(vec![5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);

        // 100 lies beyond q3 + 1.5 * IQR and is left outside the whisker
        let stats = BoxStats::from_values(vec![1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(BoxStats::from_values(Vec::new()), None);
    }

    #[test]
    fn test_box_stats_grouped_by_key() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));
        let groups = box_stats(&view, Field::Equipment, Field::Production);
        let keys: Vec<String> = groups.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["X", "Y", "Z"]);
        assert_eq!(groups[1].1.median, 35.0);
    }

    #[test]
    fn test_pairs_in_row_order() {
        let ds = dataset(&[(1, "X", 10.0), (1, "X", 4.0)]);
        let view = filter(&ds, &Selection::all(&ds));
        assert_eq!(pairs(&view, Field::Production, Field::Cost), vec![[10.0, 5.0], [4.0, 2.0]]);
        assert!(pairs(&view, Field::Production, Field::Date).is_empty());
    }
}

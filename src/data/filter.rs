use std::collections::{BTreeMap, BTreeSet};

use super::model::{Dataset, Field, Record, Value};

// ---------------------------------------------------------------------------
// Selection: which values are accepted per filterable column
// ---------------------------------------------------------------------------

/// Per-field accepted values: field → set of values a record may carry.
///
/// * A field absent from the map is unconstrained.
/// * A field mapped to an empty set accepts nothing.
/// * Fields are ANDed together; values within one field are ORed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    accepted: BTreeMap<Field, BTreeSet<Value>>,
}

/// One user edit of a [`Selection`].
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Toggle { field: Field, value: Value },
    SelectAll(Field),
    SelectNone(Field),
}

impl Selection {
    /// Every filterable field with all its distinct values selected (i.e., show everything).
    pub fn all(dataset: &Dataset) -> Self {
        let accepted = Field::FILTERABLE
            .iter()
            .map(|field| {
                let values = dataset.unique_values.get(field).cloned().unwrap_or_default();
                (*field, values)
            })
            .collect();
        Selection { accepted }
    }

    /// Restrict `field` to exactly `values`.
    pub fn with(mut self, field: Field, values: impl IntoIterator<Item = Value>) -> Self {
        self.accepted.insert(field, values.into_iter().collect());
        self
    }

    /// Accepted values for `field`, `None` when unconstrained.
    pub fn accepted(&self, field: Field) -> Option<&BTreeSet<Value>> {
        self.accepted.get(&field)
    }

    /// Whether `record` passes every field predicate.
    pub fn accepts(&self, record: &Record) -> bool {
        self.accepted
            .iter()
            .all(|(field, values)| values.contains(&record.value(*field)))
    }

    /// Apply one edit and return the new selection.
    pub fn apply(mut self, change: &SelectionChange, dataset: &Dataset) -> Self {
        match change {
            SelectionChange::Toggle { field, value } => {
                // An unconstrained field starts from every value being checked.
                let values = self.accepted.entry(*field).or_insert_with(|| {
                    dataset.unique_values.get(field).cloned().unwrap_or_default()
                });
                if !values.remove(value) {
                    values.insert(value.clone());
                }
            }
            SelectionChange::SelectAll(field) => {
                let all = dataset.unique_values.get(field).cloned().unwrap_or_default();
                self.accepted.insert(*field, all);
            }
            SelectionChange::SelectNone(field) => {
                self.accepted.insert(*field, BTreeSet::new());
            }
        }
        self
    }
}

// ---------------------------------------------------------------------------
// FilteredView: the records passing a selection
// ---------------------------------------------------------------------------

/// Order-preserving subset of a dataset, borrowed rather than copied.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Indices into `dataset.records`, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    /// Values of a numeric field in row order; empty for non-numeric fields.
    pub fn measures(&self, field: Field) -> impl Iterator<Item = f64> + '_ {
        self.records().filter_map(move |r| r.measure(field))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the records that pass `selection`, in original order.
///
/// Values in the selection that no longer occur in the dataset simply
/// match nothing.
pub fn filter<'a>(dataset: &'a Dataset, selection: &Selection) -> FilteredView<'a> {
    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.accepts(rec))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::dataset;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn sample() -> Dataset {
        dataset(&[
            (1, "X", 10.0),
            (2, "X", 20.0),
            (1, "Y", 30.0),
            (3, "Y", 40.0),
            (2, "Z", 50.0),
        ])
    }

    #[test]
    fn test_select_all_is_identity() {
        let ds = sample();
        let view = filter(&ds, &Selection::all(&ds));
        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
        assert_eq!(view.records().cloned().collect::<Vec<_>>(), ds.records);
    }

    #[test]
    fn test_single_record_example() {
        let ds = dataset(&[(1, "X", 10.0), (2, "X", 20.0)]);
        let sel = Selection::all(&ds)
            .with(Field::Quality, [Value::Integer(1)])
            .with(Field::Equipment, [text("X")]);
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), &[0]);
    }

    #[test]
    fn test_and_across_fields_or_within() {
        let ds = sample();
        let sel = Selection::default()
            .with(Field::Quality, [Value::Integer(1), Value::Integer(2)])
            .with(Field::Equipment, [text("X"), text("Z")]);
        let view = filter(&ds, &sel);
        assert_eq!(view.indices(), &[0, 1, 4]);
    }

    #[test]
    fn test_filter_is_faithful_and_ordered() {
        let ds = sample();
        let sel = Selection::default().with(Field::Equipment, [text("Y"), text("X")]);
        let view = filter(&ds, &sel);

        // every returned record matches, in original order
        assert!(view.records().all(|r| sel.accepts(r)));
        assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
        // every matching record is returned
        let expected: Vec<usize> = (0..ds.len()).filter(|&i| sel.accepts(&ds.records[i])).collect();
        assert_eq!(view.indices(), expected.as_slice());
    }

    #[test]
    fn test_empty_value_set_gives_empty_view() {
        let ds = sample();
        let sel = Selection::all(&ds).with(Field::Equipment, Vec::new());
        let view = filter(&ds, &sel);
        assert!(view.is_empty());
        assert_eq!(ds.len(), 5);
    }

    #[test]
    fn test_stale_value_matches_nothing() {
        let ds = sample();
        let sel = Selection::default().with(Field::Equipment, [text("Gone")]);
        assert!(filter(&ds, &sel).is_empty());

        let sel = Selection::default().with(Field::Equipment, [text("Gone"), text("Z")]);
        assert_eq!(filter(&ds, &sel).indices(), &[4]);
    }

    #[test]
    fn test_toggle_and_select_none_all() {
        let ds = sample();
        let sel = Selection::all(&ds).apply(
            &SelectionChange::Toggle {
                field: Field::Equipment,
                value: text("Y"),
            },
            &ds,
        );
        assert_eq!(filter(&ds, &sel).indices(), &[0, 1, 4]);

        let sel = sel.apply(
            &SelectionChange::Toggle {
                field: Field::Equipment,
                value: text("Y"),
            },
            &ds,
        );
        assert_eq!(filter(&ds, &sel).len(), 5);

        let sel = sel.apply(&SelectionChange::SelectNone(Field::Quality), &ds);
        assert!(filter(&ds, &sel).is_empty());

        let sel = sel.apply(&SelectionChange::SelectAll(Field::Quality), &ds);
        assert_eq!(sel, Selection::all(&ds));
    }

    #[test]
    fn test_toggle_unconstrained_field_unchecks_one_value() {
        let ds = sample();
        let sel = Selection::default().apply(
            &SelectionChange::Toggle {
                field: Field::Equipment,
                value: text("Y"),
            },
            &ds,
        );
        let expected: BTreeSet<Value> = [text("X"), text("Z")].into_iter().collect();
        assert_eq!(sel.accepted(Field::Equipment), Some(&expected));
        assert_eq!(filter(&ds, &sel).indices(), &[0, 1, 4]);
    }

    #[test]
    fn test_measures_follow_view_order() {
        let ds = sample();
        let sel = Selection::default().with(Field::Quality, [Value::Integer(2)]);
        let view = filter(&ds, &sel);
        assert_eq!(view.measures(Field::Production).collect::<Vec<_>>(), vec![20.0, 50.0]);
        assert_eq!(view.measures(Field::Equipment).count(), 0);
    }
}

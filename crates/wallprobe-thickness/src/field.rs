//! Sparse per-triangle scalar values.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Sparse map from triangle (or face) id to a value.
///
/// Values are only ever raised: [`ScalarField::upsert_max`] binds an absent
/// id and otherwise keeps the larger value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalarField {
    values: BTreeMap<usize, f64>,
}

impl ScalarField {
    /// An empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `id` if absent, else keep the maximum.
    ///
    /// Returns true if the stored value changed.
    pub fn upsert_max(&mut self, id: usize, value: f64) -> bool {
        match self.values.get_mut(&id) {
            Some(current) if value > *current => {
                *current = value;
                true
            }
            Some(_) => false,
            None => {
                self.values.insert(id, value);
                true
            }
        }
    }

    /// Value bound to `id`.
    pub fn get(&self, id: usize) -> Option<f64> {
        self.values.get(&id).copied()
    }

    /// Whether `id` has a value.
    pub fn contains(&self, id: usize) -> bool {
        self.values.contains_key(&id)
    }

    /// Number of ids with a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no id has a value.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(id, value)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }

    /// Smallest stored value.
    pub fn min(&self) -> Option<f64> {
        self.values.values().copied().reduce(f64::min)
    }

    /// Largest stored value.
    pub fn max(&self) -> Option<f64> {
        self.values.values().copied().reduce(f64::max)
    }

    /// Remove all values.
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl FromIterator<(usize, f64)> for ScalarField {
    fn from_iter<I: IntoIterator<Item = (usize, f64)>>(iter: I) -> Self {
        let mut field = ScalarField::new();
        for (id, v) in iter {
            field.upsert_max(id, v);
        }
        field
    }
}

/// Dense field of `f64` slots shared between worker threads.
///
/// Absent slots hold NaN. Values must not be NaN.
pub(crate) struct AtomicScalarField {
    slots: Vec<AtomicU64>,
}

impl AtomicScalarField {
    /// Field for ids `0..len`.
    pub(crate) fn new(len: usize) -> Self {
        let absent = f64::NAN.to_bits();
        Self {
            slots: (0..len).map(|_| AtomicU64::new(absent)).collect(),
        }
    }

    /// Concurrent version of [`ScalarField::upsert_max`].
    pub(crate) fn upsert_max(&self, id: usize, value: f64) {
        let _ = self.slots[id].fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            let current = f64::from_bits(bits);
            (current.is_nan() || value > current).then(|| value.to_bits())
        });
    }

    /// Collect the bound slots.
    pub(crate) fn into_field(self) -> ScalarField {
        self.slots
            .into_iter()
            .enumerate()
            .filter_map(|(id, slot)| {
                let v = f64::from_bits(slot.into_inner());
                (!v.is_nan()).then_some((id, v))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_upsert_binds_then_keeps_max() {
        let mut field = ScalarField::new();
        assert!(field.upsert_max(3, 1.5));
        assert!(!field.upsert_max(3, 0.5));
        assert_eq!(field.get(3), Some(1.5));
        assert!(field.upsert_max(3, 2.0));
        assert_eq!(field.get(3), Some(2.0));
        assert_eq!(field.get(4), None);
        assert_eq!(field.len(), 1);
    }

    #[test]
    fn test_min_max() {
        let field: ScalarField = [(0, 2.0), (7, 0.25), (2, 9.0)].into_iter().collect();
        assert_eq!(field.min(), Some(0.25));
        assert_eq!(field.max(), Some(9.0));
        assert_eq!(field.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![0, 2, 7]);
        assert!(ScalarField::new().min().is_none());
    }

    #[test]
    fn test_serializes_as_map() {
        let field: ScalarField = [(1, 0.5)].into_iter().collect();
        assert_eq!(serde_json::to_string(&field).unwrap(), r#"{"1":0.5}"#);
    }

    #[test]
    fn test_atomic_field_matches_sequential() {
        let samples: Vec<(usize, f64)> = (0..1000).map(|i| (i % 17, ((i * 37) % 101) as f64)).collect();

        let atomic = AtomicScalarField::new(20);
        samples.par_iter().for_each(|&(id, v)| atomic.upsert_max(id, v));
        let parallel = atomic.into_field();

        let sequential: ScalarField = samples.into_iter().collect();
        assert_eq!(parallel, sequential);
        assert!(!parallel.contains(18));
    }
}

use crate::matrix::CategoryRow;

pub const MIN_WEIGHT: u8 = 0;
pub const MAX_WEIGHT: u8 = 30;

/// Seed weight for a row: the stored base weight truncated to an integer and
/// clamped into range. A blank base weight counts as 0.
pub fn default_weight(base: Option<f64>) -> u8 {
    match base {
        Some(w) if w.is_finite() => w.trunc().clamp(MIN_WEIGHT as f64, MAX_WEIGHT as f64) as u8,
        _ => MIN_WEIGHT,
    }
}

/// Clamp an arbitrary integer into the weight range
pub fn clamp_weight(value: i64) -> u8 {
    value.clamp(MIN_WEIGHT as i64, MAX_WEIGHT as i64) as u8
}

/// Holds one adjustable weight per category row.
///
/// Weights are kept in row order and are always within
/// `MIN_WEIGHT..=MAX_WEIGHT`; every mutator clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightController {
    base: Vec<u8>,
    current: Vec<u8>,
}

impl WeightController {
    pub fn from_rows(rows: &[CategoryRow]) -> Self {
        let base: Vec<u8> = rows.iter().map(|r| default_weight(r.base_weight)).collect();
        Self {
            current: base.clone(),
            base,
        }
    }

    /// Current weights, one per row, in row order
    pub fn current(&self) -> &[u8] {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.current.get(index).copied()
    }

    /// Set a weight, clamped into range. Returns true if the value changed.
    pub fn set(&mut self, index: usize, value: i64) -> bool {
        let Some(slot) = self.current.get_mut(index) else {
            return false;
        };
        let clamped = clamp_weight(value);
        let changed = *slot != clamped;
        *slot = clamped;
        changed
    }

    pub fn increment(&mut self, index: usize, step: u8) -> bool {
        match self.get(index) {
            Some(w) => self.set(index, w as i64 + step as i64),
            None => false,
        }
    }

    pub fn decrement(&mut self, index: usize, step: u8) -> bool {
        match self.get(index) {
            Some(w) => self.set(index, w as i64 - step as i64),
            None => false,
        }
    }

    /// Restore a single row to its base weight
    pub fn reset(&mut self, index: usize) -> bool {
        match self.base.get(index) {
            Some(&b) => self.set(index, b as i64),
            None => false,
        }
    }

    /// Restore every row to its base weight
    pub fn reset_all(&mut self) {
        self.current.clone_from(&self.base);
    }

    pub fn is_customized(&self, index: usize) -> bool {
        self.current.get(index) != self.base.get(index)
    }

    /// Apply validated `(row index, weight)` overrides
    pub fn apply_overrides(&mut self, overrides: &[(usize, u8)]) {
        for &(index, weight) in overrides {
            self.set(index, weight as i64);
        }
    }
}

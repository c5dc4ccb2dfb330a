use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

pub const CATEGORY_COLUMN: &str = "Category";
pub const WEIGHT_COLUMN: &str = "Weight (%)";
pub const REASONING_COLUMN: &str = "Reasoning / Notes";

/// One of the three options being compared, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Choice {
    Clarkson,
    ColumbiaNoEyuf,
    ColumbiaWithEyuf,
}

impl Choice {
    /// All options in the order used for tie-breaking and table columns
    pub const ALL: [Choice; 3] = [
        Choice::Clarkson,
        Choice::ColumbiaNoEyuf,
        Choice::ColumbiaWithEyuf,
    ];

    /// Source column header holding this option's raw values
    pub fn label(self) -> &'static str {
        match self {
            Choice::Clarkson => "Clarkson",
            Choice::ColumbiaNoEyuf => "Columbia (No EYUF)",
            Choice::ColumbiaWithEyuf => "Columbia (With EYUF)",
        }
    }

    /// Header of the derived per-row contribution column
    pub fn score_label(self) -> &'static str {
        match self {
            Choice::Clarkson => "Clarkson Score",
            Choice::ColumbiaNoEyuf => "Columbia Score",
            Choice::ColumbiaWithEyuf => "EYUF Score",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Choice::Clarkson => 0,
            Choice::ColumbiaNoEyuf => 1,
            Choice::ColumbiaWithEyuf => 2,
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A weighted decision criterion with a raw score for each option.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    /// Weight as stored in the source; `None` when the cell is blank
    pub base_weight: Option<f64>,
    /// Raw values indexed by `Choice::index()`; `None` when the cell is blank
    pub values: [Option<f64>; 3],
    pub rationale: String,
}

impl CategoryRow {
    pub fn value(&self, choice: Choice) -> Option<f64> {
        self.values[choice.index()]
    }
}

/// The loaded category table. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionMatrix {
    pub source: PathBuf,
    pub rows: Vec<CategoryRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_order_matches_index() {
        for (i, choice) in Choice::ALL.iter().enumerate() {
            assert_eq!(choice.index(), i);
        }
    }

    #[test]
    fn test_choice_labels() {
        assert_eq!(Choice::ColumbiaNoEyuf.to_string(), "Columbia (No EYUF)");
        assert_eq!(Choice::ColumbiaWithEyuf.score_label(), "EYUF Score");
    }

    #[test]
    fn test_row_value_lookup() {
        let row = CategoryRow {
            name: "Cost".to_string(),
            base_weight: Some(20.0),
            values: [Some(5.0), None, Some(8.0)],
            rationale: "cheaper".to_string(),
        };
        assert_eq!(row.value(Choice::Clarkson), Some(5.0));
        assert_eq!(row.value(Choice::ColumbiaNoEyuf), None);
        assert_eq!(row.value(Choice::ColumbiaWithEyuf), Some(8.0));
    }
}

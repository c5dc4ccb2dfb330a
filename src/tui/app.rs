use crate::matrix::DecisionMatrix;
use crate::scoring::{compute_scores, MissingValuePolicy, Scorecard, WeightController, MAX_WEIGHT, MIN_WEIGHT};
use crate::tui::theme::ThemeColors;
use std::sync::Arc;
use std::time::Instant;

/// Step used by the coarse adjustment keys (H/L)
pub const COARSE_STEP: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
}

pub struct App {
    pub matrix: Arc<DecisionMatrix>,
    pub weights: WeightController,
    pub policy: MissingValuePolicy,
    /// Result of the latest scoring pass; `None` when it failed
    pub scorecard: Option<Scorecard>,
    pub score_error: Option<String>,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub show_reasoning: bool,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    pub colors: ThemeColors,
    pub verbose: bool,
}

impl App {
    pub fn new(
        matrix: Arc<DecisionMatrix>,
        weights: WeightController,
        policy: MissingValuePolicy,
        colors: ThemeColors,
        verbose: bool,
    ) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if !matrix.rows.is_empty() {
            table_state.select(Some(0));
        }

        let mut app = Self {
            matrix,
            weights,
            policy,
            scorecard: None,
            score_error: None,
            table_state,
            input_mode: InputMode::Normal,
            show_reasoning: false,
            flash_message: None,
            should_quit: false,
            colors,
            verbose,
        };
        app.recompute();
        app
    }

    /// Full scoring pass over the current weights. Runs after every change.
    pub fn recompute(&mut self) {
        match compute_scores(&self.matrix.rows, self.weights.current(), self.policy) {
            Ok(card) => {
                self.scorecard = Some(card);
                self.score_error = None;
            }
            Err(e) => {
                self.scorecard = None;
                self.score_error = Some(format!("{:#}", e));
            }
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn next_row(&mut self) {
        let len = self.matrix.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.matrix.rows.len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    /// Raise the selected weight by `step`, saturating at the maximum
    pub fn increase_selected(&mut self, step: u8) {
        if let Some(i) = self.selected_index() {
            if self.weights.increment(i, step) {
                self.recompute();
            }
        }
    }

    /// Lower the selected weight by `step`, saturating at the minimum
    pub fn decrease_selected(&mut self, step: u8) {
        if let Some(i) = self.selected_index() {
            if self.weights.decrement(i, step) {
                self.recompute();
            }
        }
    }

    pub fn set_selected(&mut self, value: u8) {
        if let Some(i) = self.selected_index() {
            if self.weights.set(i, value as i64) {
                self.recompute();
            }
        }
    }

    pub fn set_selected_min(&mut self) {
        self.set_selected(MIN_WEIGHT);
    }

    pub fn set_selected_max(&mut self) {
        self.set_selected(MAX_WEIGHT);
    }

    pub fn reset_selected(&mut self) {
        let Some(i) = self.selected_index() else {
            return;
        };
        if self.weights.reset(i) {
            self.recompute();
            let name = self.matrix.rows[i].name.clone();
            self.show_flash(format!("Reset: {}", name));
        }
    }

    pub fn reset_all(&mut self) {
        self.weights.reset_all();
        self.recompute();
        self.show_flash("Reset all weights".to_string());
    }

    pub fn toggle_reasoning(&mut self) {
        self.show_reasoning = !self.show_reasoning;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{CategoryRow, Choice};
    use std::path::PathBuf;

    fn sample_app(policy: MissingValuePolicy) -> App {
        let matrix = Arc::new(DecisionMatrix {
            source: PathBuf::from("matrix.csv"),
            rows: vec![
                CategoryRow {
                    name: "Cost".to_string(),
                    base_weight: Some(20.0),
                    values: [Some(5.0), Some(8.0), Some(8.0)],
                    rationale: "cheaper".to_string(),
                },
                CategoryRow {
                    name: "Location".to_string(),
                    base_weight: Some(10.0),
                    values: [Some(9.0), Some(3.0), None],
                    rationale: "closer".to_string(),
                },
            ],
        });
        let weights = WeightController::from_rows(&matrix.rows);
        App::new(matrix, weights, policy, ThemeColors::dark(), false)
    }

    #[test]
    fn test_initial_scorecard() {
        let app = sample_app(MissingValuePolicy::Zero);
        let card = app.scorecard.as_ref().unwrap();
        assert_eq!(card.weights, vec![20, 10]);
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn test_weight_change_recomputes() {
        let mut app = sample_app(MissingValuePolicy::Zero);
        app.next_row();
        app.set_selected_max();

        let card = app.scorecard.as_ref().unwrap();
        assert_eq!(card.weights, vec![20, 30]);
        assert_eq!(card.total(Choice::Clarkson), 3.7);
        assert_eq!(card.winner, Choice::Clarkson);
        assert_eq!(card.top_factor.as_ref().unwrap().category, "Location");
    }

    #[test]
    fn test_increase_saturates() {
        let mut app = sample_app(MissingValuePolicy::Zero);
        app.increase_selected(COARSE_STEP);
        app.increase_selected(COARSE_STEP);
        app.increase_selected(COARSE_STEP);
        assert_eq!(app.weights.get(0), Some(30));
        app.decrease_selected(1);
        assert_eq!(app.weights.get(0), Some(29));
    }

    #[test]
    fn test_reset_restores_base() {
        let mut app = sample_app(MissingValuePolicy::Zero);
        app.set_selected_min();
        assert_eq!(app.scorecard.as_ref().unwrap().weights, vec![0, 10]);

        app.reset_selected();
        assert_eq!(app.scorecard.as_ref().unwrap().weights, vec![20, 10]);

        app.next_row();
        app.set_selected(1);
        app.reset_all();
        assert_eq!(app.weights.current(), &[20, 10]);
    }

    #[test]
    fn test_missing_value_surfaces_error() {
        let app = sample_app(MissingValuePolicy::Fail);
        assert!(app.scorecard.is_none());
        assert!(app.score_error.as_ref().unwrap().contains("Location"));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = sample_app(MissingValuePolicy::Zero);
        app.previous_row();
        assert_eq!(app.selected_index(), Some(1));
        app.next_row();
        assert_eq!(app.selected_index(), Some(0));
    }
}

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::matrix::{CategoryRow, Choice};

/// What to do when a raw option value is blank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissingValuePolicy {
    /// Abort scoring with a `MissingValueError`
    #[default]
    Fail,
    /// Treat the blank cell as 0
    Zero,
}

/// A raw option value was blank under `MissingValuePolicy::Fail`
#[derive(Debug, Clone, PartialEq)]
pub struct MissingValueError {
    pub category: String,
    pub choice: Choice,
}

impl fmt::Display for MissingValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Missing value for '{}' in category '{}' (use --missing-values zero to treat blanks as 0)",
            self.choice, self.category
        )
    }
}

impl std::error::Error for MissingValueError {}

/// The category contributing most to the winning option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopFactor {
    pub row: usize,
    pub category: String,
    pub rationale: String,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    /// Weights the card was computed with, in row order
    pub weights: Vec<u8>,
    /// Unrounded `raw * weight / 100` per row, indexed by `Choice::index()`
    pub contributions: Vec<[f64; 3]>,
    /// Per-option totals rounded to 2 decimals
    pub totals: [f64; 3],
    pub winner: Choice,
    pub top_factor: Option<TopFactor>,
}

impl Scorecard {
    pub fn total(&self, choice: Choice) -> f64 {
        self.totals[choice.index()]
    }

    pub fn winning_total(&self) -> f64 {
        self.total(self.winner)
    }

    /// Options ordered by total descending; equal totals keep option order
    pub fn ranked(&self) -> Vec<(Choice, f64)> {
        let mut ranked: Vec<(Choice, f64)> =
            Choice::ALL.iter().map(|&c| (c, self.total(c))).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }
}

/// Round to 2 decimal places, ties to even on the scaled value
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Score every option against the current weights.
///
/// Pure function of its inputs: the same rows, weights and policy always
/// produce the same scorecard.
///
/// # Errors
///
/// Returns an error if `weights` and `rows` differ in length, or if a raw
/// value is blank under `MissingValuePolicy::Fail` (downcastable to
/// `MissingValueError`).
pub fn compute_scores(
    rows: &[CategoryRow],
    weights: &[u8],
    policy: MissingValuePolicy,
) -> Result<Scorecard> {
    if rows.len() != weights.len() {
        bail!(
            "Got {} weights for {} categories",
            weights.len(),
            rows.len()
        );
    }

    let mut contributions = Vec::with_capacity(rows.len());
    let mut sums = [0.0_f64; 3];

    for (row, &weight) in rows.iter().zip(weights) {
        let mut per_option = [0.0_f64; 3];
        for choice in Choice::ALL {
            let raw = match (row.value(choice), policy) {
                (Some(v), _) => v,
                (None, MissingValuePolicy::Zero) => 0.0,
                (None, MissingValuePolicy::Fail) => {
                    return Err(MissingValueError {
                        category: row.name.clone(),
                        choice,
                    }
                    .into())
                }
            };
            let contribution = raw * weight as f64 / 100.0;
            per_option[choice.index()] = contribution;
            sums[choice.index()] += contribution;
        }
        contributions.push(per_option);
    }

    let totals = sums.map(round2);
    let winner = select_winner(&totals);
    let top_factor = top_factor(rows, &contributions, winner);

    Ok(Scorecard {
        weights: weights.to_vec(),
        contributions,
        totals,
        winner,
        top_factor,
    })
}

/// Option with the strictly largest total; the first listed wins a tie
pub fn select_winner(totals: &[f64; 3]) -> Choice {
    let mut best = Choice::ALL[0];
    for choice in Choice::ALL.into_iter().skip(1) {
        if totals[choice.index()] > totals[best.index()] {
            best = choice;
        }
    }
    best
}

/// Row with the largest contribution to `winner`; the first row wins a tie.
/// Returns `None` when there are no rows.
pub fn top_factor(
    rows: &[CategoryRow],
    contributions: &[[f64; 3]],
    winner: Choice,
) -> Option<TopFactor> {
    let mut best: Option<(usize, f64)> = None;
    for (i, per_option) in contributions.iter().enumerate() {
        let value = per_option[winner.index()];
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((i, value)),
        }
    }

    best.and_then(|(i, contribution)| {
        rows.get(i).map(|row| TopFactor {
            row: i,
            category: row.name.clone(),
            rationale: row.rationale.clone(),
            contribution,
        })
    })
}

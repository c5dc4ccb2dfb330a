pub mod engine;
pub mod validation;
pub mod weights;

pub use engine::{
    compute_scores, round2, select_winner, top_factor, MissingValueError, MissingValuePolicy,
    Scorecard, TopFactor,
};
pub use validation::parse_weight_overrides;
pub use weights::{default_weight, WeightController, MAX_WEIGHT, MIN_WEIGHT};

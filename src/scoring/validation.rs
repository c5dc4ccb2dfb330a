use crate::matrix::CategoryRow;
use super::weights::{MAX_WEIGHT, MIN_WEIGHT};

/// Resolve `--weight "<Category>=<N>"` overrides against the loaded rows.
///
/// Returns `(row index, weight)` pairs in argument order, or all validation
/// errors at once (not just the first).
pub fn parse_weight_overrides(
    args: &[String],
    rows: &[CategoryRow],
) -> Result<Vec<(usize, u8)>, Vec<String>> {
    let mut errors = Vec::new();
    let mut overrides = Vec::new();

    for arg in args {
        // Split on the last '=' so category names may contain '='
        let Some((name, value)) = arg.rsplit_once('=') else {
            errors.push(format!("--weight '{}': expected <Category>=<N>", arg));
            continue;
        };
        let name = name.trim();

        let weight = match value.trim().parse::<i64>() {
            Ok(w) if (MIN_WEIGHT as i64..=MAX_WEIGHT as i64).contains(&w) => Some(w as u8),
            Ok(w) => {
                errors.push(format!(
                    "--weight '{}': {} is outside {}-{}",
                    arg, w, MIN_WEIGHT, MAX_WEIGHT
                ));
                None
            }
            Err(_) => {
                errors.push(format!("--weight '{}': '{}' is not an integer", arg, value.trim()));
                None
            }
        };

        let index = find_category(rows, name);
        if index.is_none() {
            errors.push(format!("--weight '{}': unknown category '{}'", arg, name));
        }

        if let (Some(index), Some(weight)) = (index, weight) {
            overrides.push((index, weight));
        }
    }

    if errors.is_empty() {
        Ok(overrides)
    } else {
        Err(errors)
    }
}

/// Exact name match first, then ASCII case-insensitive
fn find_category(rows: &[CategoryRow], name: &str) -> Option<usize> {
    rows.iter()
        .position(|r| r.name == name)
        .or_else(|| rows.iter().position(|r| r.name.eq_ignore_ascii_case(name)))
}

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::collections::HashMap;
use std::path::Path;

use super::types::{
    CategoryRow, Choice, DecisionMatrix, CATEGORY_COLUMN, REASONING_COLUMN, WEIGHT_COLUMN,
};

/// Zero-based sheet row holding the column headers (the second row)
pub const DEFAULT_HEADER_ROW: usize = 1;

/// Cell texts read as missing, the markers spreadsheet exports use for "no value"
const NA_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single cell as read from the source, before column typing
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Number(f64),
    Text(String),
}

impl RawCell {
    fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
            RawCell::Empty
        } else {
            RawCell::Text(trimmed.to_string())
        }
    }
}

/// Load the decision matrix from a workbook or CSV file.
///
/// `header_row` is the zero-based sheet row holding the column headers.
/// Every row below it is a category row; fully blank rows are skipped.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The file extension is not a supported format
/// - The header row or a required column is missing
/// - A numeric column holds non-numeric text
pub fn load_matrix(path: &Path, header_row: usize) -> Result<DecisionMatrix> {
    if !path.exists() {
        bail!("Source file not found at {}", path.display());
    }

    let grid = read_grid(path)?;
    let rows = parse_grid(&grid, header_row)
        .with_context(|| format!("Invalid decision matrix in {}", path.display()))?;

    Ok(DecisionMatrix {
        source: path.to_path_buf(),
        rows,
    })
}

/// Read the raw cell grid, indexed by absolute sheet row
fn read_grid(path: &Path) -> Result<Vec<Vec<RawCell>>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        "csv" => read_csv(path),
        other => bail!(
            "Unsupported source format '{}' for {} (expected .xlsx, .xls, .ods or .csv)",
            other,
            path.display()
        ),
    }
}

fn read_workbook(path: &Path) -> Result<Vec<Vec<RawCell>>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook at {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("Workbook at {} has no worksheets", path.display()))?
        .with_context(|| format!("Failed to read first worksheet of {}", path.display()))?;

    // calamine ranges start at the first non-empty cell; pad so indices stay absolute
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<RawCell>> = (0..start_row).map(|_| Vec::new()).collect();

    for row in range.rows() {
        let mut cells: Vec<RawCell> = (0..start_col).map(|_| RawCell::Empty).collect();
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }

    Ok(grid)
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty | Data::Error(_) => RawCell::Empty,
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Float(f) => RawCell::Number(*f),
        Data::String(s) => RawCell::from_text(s),
        other => RawCell::from_text(&other.to_string()),
    }
}

fn read_csv(path: &Path) -> Result<Vec<Vec<RawCell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file at {}", path.display()))?;

    let mut grid = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("Failed to read row {} of {}", i + 1, path.display()))?;
        grid.push(record.iter().map(RawCell::from_text).collect());
    }

    Ok(grid)
}

/// Column positions of the required headers
struct Columns {
    category: usize,
    weight: usize,
    values: [usize; 3],
    reasoning: usize,
}

impl Columns {
    fn locate(header: &[RawCell]) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (i, cell) in header.iter().enumerate() {
            let name = match cell {
                RawCell::Text(s) => s.clone(),
                RawCell::Number(n) => n.to_string(),
                RawCell::Empty => continue,
            };
            // First occurrence wins for duplicated headers
            positions.entry(name).or_insert(i);
        }

        let mut missing = Vec::new();
        let mut find = |name: &str| match positions.get(name) {
            Some(&i) => i,
            None => {
                missing.push(name.to_string());
                usize::MAX
            }
        };

        let columns = Columns {
            category: find(CATEGORY_COLUMN),
            weight: find(WEIGHT_COLUMN),
            values: [
                find(Choice::Clarkson.label()),
                find(Choice::ColumbiaNoEyuf.label()),
                find(Choice::ColumbiaWithEyuf.label()),
            ],
            reasoning: find(REASONING_COLUMN),
        };

        if !missing.is_empty() {
            bail!("Missing required column(s): {}", missing.join(", "));
        }

        Ok(columns)
    }
}

/// Turn a raw grid into category rows.
///
/// Row numbers in error messages are 1-based sheet rows, as a spreadsheet shows them.
pub fn parse_grid(grid: &[Vec<RawCell>], header_row: usize) -> Result<Vec<CategoryRow>> {
    let Some(header) = grid.get(header_row) else {
        bail!(
            "Header row {} not found (source has {} rows)",
            header_row + 1,
            grid.len()
        );
    };

    let columns = Columns::locate(header)?;
    let mut rows = Vec::new();

    for (offset, cells) in grid.iter().skip(header_row + 1).enumerate() {
        if cells.iter().all(|c| *c == RawCell::Empty) {
            continue;
        }
        let sheet_row = header_row + offset + 2;

        let name = match cell(cells, columns.category) {
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => n.to_string(),
            RawCell::Empty => bail!("Row {}: '{}' is blank", sheet_row, CATEGORY_COLUMN),
        };

        let base_weight = numeric(cells, columns.weight, WEIGHT_COLUMN, sheet_row)?;

        let mut values = [None; 3];
        for choice in Choice::ALL {
            values[choice.index()] =
                numeric(cells, columns.values[choice.index()], choice.label(), sheet_row)?;
        }

        let rationale = match cell(cells, columns.reasoning) {
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => n.to_string(),
            RawCell::Empty => String::new(),
        };

        rows.push(CategoryRow {
            name,
            base_weight,
            values,
            rationale,
        });
    }

    Ok(rows)
}

fn cell(cells: &[RawCell], index: usize) -> &RawCell {
    static EMPTY: RawCell = RawCell::Empty;
    cells.get(index).unwrap_or(&EMPTY)
}

fn numeric(cells: &[RawCell], index: usize, column: &str, sheet_row: usize) -> Result<Option<f64>> {
    match cell(cells, index) {
        RawCell::Empty => Ok(None),
        RawCell::Number(n) if n.is_finite() => Ok(Some(*n)),
        RawCell::Number(n) => bail!("Row {}: '{}' is not a number: '{}'", sheet_row, column, n),
        RawCell::Text(s) if NA_MARKERS.contains(&s.as_str()) => Ok(None),
        RawCell::Text(s) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => bail!("Row {}: '{}' is not a number: '{}'", sheet_row, column, s),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn text(s: &str) -> RawCell {
        RawCell::Text(s.to_string())
    }

    fn header() -> Vec<RawCell> {
        vec![
            text("Category"),
            text("Weight (%)"),
            text("Clarkson"),
            text("Columbia (No EYUF)"),
            text("Columbia (With EYUF)"),
            text("Reasoning / Notes"),
        ]
    }

    fn title_row() -> Vec<RawCell> {
        vec![text("University Decision Matrix")]
    }

    #[test]
    fn test_parse_grid_basic() {
        let grid = vec![
            title_row(),
            header(),
            vec![
                text("Cost"),
                RawCell::Number(20.0),
                RawCell::Number(5.0),
                RawCell::Number(8.0),
                RawCell::Number(8.0),
                text("cheaper"),
            ],
            vec![
                text("Location"),
                RawCell::Number(10.0),
                RawCell::Number(9.0),
                RawCell::Number(3.0),
                RawCell::Number(3.0),
                text("closer"),
            ],
        ];

        let rows = parse_grid(&grid, 1).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Cost");
        assert_eq!(rows[0].base_weight, Some(20.0));
        assert_eq!(rows[0].values, [Some(5.0), Some(8.0), Some(8.0)]);
        assert_eq!(rows[1].rationale, "closer");
    }

    #[test]
    fn test_parse_grid_preserves_order_and_skips_blank_rows() {
        let grid = vec![
            title_row(),
            header(),
            vec![text("Zeta"), RawCell::Number(1.0)],
            vec![RawCell::Empty, RawCell::Empty],
            vec![text("Alpha"), RawCell::Number(2.0)],
        ];

        let rows = parse_grid(&grid, 1).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_parse_grid_blank_cells_are_none() {
        let grid = vec![title_row(), header(), vec![text("Cost")]];

        let rows = parse_grid(&grid, 1).unwrap();
        assert_eq!(rows[0].base_weight, None);
        assert_eq!(rows[0].values, [None, None, None]);
        assert_eq!(rows[0].rationale, "");
    }

    #[test]
    fn test_parse_grid_numeric_text() {
        let grid = vec![
            title_row(),
            header(),
            vec![text("Cost"), text("15"), text("7.5")],
        ];

        let rows = parse_grid(&grid, 1).unwrap();
        assert_eq!(rows[0].base_weight, Some(15.0));
        assert_eq!(rows[0].values[0], Some(7.5));
    }

    #[test]
    fn test_parse_grid_non_numeric_value_fails() {
        let grid = vec![
            title_row(),
            header(),
            vec![text("Cost"), RawCell::Number(20.0), text("lots")],
        ];

        let err = parse_grid(&grid, 1).unwrap_err().to_string();
        assert!(err.contains("Row 3"));
        assert!(err.contains("Clarkson"));
    }

    #[test]
    fn test_parse_grid_missing_columns_lists_all() {
        let grid = vec![
            title_row(),
            vec![text("Category"), text("Weight (%)"), text("Clarkson")],
        ];

        let err = parse_grid(&grid, 1).unwrap_err().to_string();
        assert!(err.contains("Columbia (No EYUF)"));
        assert!(err.contains("Columbia (With EYUF)"));
        assert!(err.contains("Reasoning / Notes"));
    }

    #[test]
    fn test_parse_grid_missing_header_row() {
        let grid = vec![header()];
        let err = parse_grid(&grid, 1).unwrap_err().to_string();
        assert!(err.contains("Header row 2 not found"));
    }

    #[test]
    fn test_parse_grid_blank_category_fails() {
        let grid = vec![
            title_row(),
            header(),
            vec![RawCell::Empty, RawCell::Number(10.0)],
        ];
        assert!(parse_grid(&grid, 1).is_err());
    }

    #[test]
    fn test_load_matrix_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "Decision Matrix,,,,,").unwrap();
        writeln!(
            file,
            "Category,Weight (%),Clarkson,Columbia (No EYUF),Columbia (With EYUF),Reasoning / Notes"
        )
        .unwrap();
        writeln!(file, "Cost,20,5,8,8,cheaper").unwrap();
        writeln!(file, "Location,10,9,3,3,\"closer, easier\"").unwrap();
        drop(file);

        let matrix = load_matrix(&path, DEFAULT_HEADER_ROW).unwrap();
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[1].rationale, "closer, easier");
        assert_eq!(matrix.source, path);
    }

    #[test]
    fn test_load_matrix_missing_file() {
        let err = load_matrix(Path::new("does-not-exist.xlsx"), 1)
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_load_matrix_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.txt");
        std::fs::write(&path, "Category").unwrap();

        let err = load_matrix(&path, 1).unwrap_err().to_string();
        assert!(err.contains("Unsupported source format"));
    }

    #[test]
    fn test_na_markers_read_as_missing() {
        let grid = vec![
            title_row(),
            header(),
            vec![
                text("Cost"),
                RawCell::Number(20.0),
                text("nan"),
                text("N/A"),
                text("#N/A"),
                text("cheaper"),
            ],
            vec![
                text("Location"),
                text("NULL"),
                RawCell::Number(9.0),
                RawCell::Number(3.0),
                RawCell::Number(3.0),
                text("closer"),
            ],
        ];

        let rows = parse_grid(&grid, 1).unwrap();
        assert_eq!(rows[0].values, [None, None, None]);
        assert_eq!(rows[1].base_weight, None);

        let err = crate::scoring::compute_scores(
            &rows,
            &[20, 10],
            crate::scoring::MissingValuePolicy::Fail,
        )
        .unwrap_err();
        let missing = err
            .downcast_ref::<crate::scoring::MissingValueError>()
            .unwrap();
        assert_eq!(missing.category, "Cost");
        assert_eq!(missing.choice, Choice::Clarkson);
    }

    #[test]
    fn test_non_finite_values_rejected() {
        for bad in ["inf", "-infinity", "Infinity"] {
            let grid = vec![
                title_row(),
                header(),
                vec![text("Cost"), RawCell::Number(20.0), text(bad)],
            ];
            let err = parse_grid(&grid, 1).unwrap_err().to_string();
            assert!(err.contains("is not a number"), "{}", err);
        }

        let grid = vec![
            title_row(),
            header(),
            vec![text("Cost"), RawCell::Number(f64::NAN)],
        ];
        assert!(parse_grid(&grid, 1).is_err());
    }

    #[test]
    fn test_convert_cell_variants() {
        assert_eq!(convert_cell(&Data::Int(7)), RawCell::Number(7.0));
        assert_eq!(convert_cell(&Data::Float(2.5)), RawCell::Number(2.5));
        assert_eq!(convert_cell(&Data::String("  Cost ".to_string())), RawCell::Text("Cost".to_string()));
        assert_eq!(convert_cell(&Data::String("#N/A".to_string())), RawCell::Empty);
        assert_eq!(convert_cell(&Data::Error(calamine::CellErrorType::NA)), RawCell::Empty);
        assert_eq!(convert_cell(&Data::Error(calamine::CellErrorType::Div0)), RawCell::Empty);
        assert_eq!(convert_cell(&Data::Bool(true)), RawCell::Text("true".to_string()));
        assert_eq!(convert_cell(&Data::Empty), RawCell::Empty);
    }

    #[test]
    fn test_load_matrix_csv_na_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        std::fs::write(
            &path,
            "title\n\
             Category,Weight (%),Clarkson,Columbia (No EYUF),Columbia (With EYUF),Reasoning / Notes\n\
             Cost,NA,5,n/a,<NA>,None\n",
        )
        .unwrap();

        let matrix = load_matrix(&path, DEFAULT_HEADER_ROW).unwrap();
        let row = &matrix.rows[0];
        assert_eq!(row.base_weight, None);
        assert_eq!(row.values, [Some(5.0), None, None]);
        assert_eq!(row.rationale, "");
    }

    #[test]
    fn test_load_matrix_xlsx_with_offset_range() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.xlsx");

        // Row 0 and column A stay blank so the used range starts at B2
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let headers = [
            "Category",
            "Weight (%)",
            "Clarkson",
            "Columbia (No EYUF)",
            "Columbia (With EYUF)",
            "Reasoning / Notes",
        ];
        for (col, name) in headers.iter().enumerate() {
            sheet.write_string(1, col as u16 + 1, *name).unwrap();
        }
        sheet.write_string(2, 1, "Cost").unwrap();
        sheet.write_number(2, 2, 20.0).unwrap();
        sheet.write_number(2, 3, 5.0).unwrap();
        sheet.write_number(2, 4, 8.0).unwrap();
        sheet.write_number(2, 5, 8.0).unwrap();
        sheet.write_string(2, 6, "cheaper").unwrap();
        sheet.write_string(3, 1, "Location").unwrap();
        sheet.write_number(3, 3, 9.0).unwrap();
        sheet.write_number(3, 4, 3.0).unwrap();
        sheet.write_string(3, 5, "#N/A").unwrap();
        sheet.write_string(3, 6, "closer").unwrap();
        workbook.save(&path).unwrap();

        let matrix = load_matrix(&path, DEFAULT_HEADER_ROW).unwrap();
        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].name, "Cost");
        assert_eq!(matrix.rows[0].base_weight, Some(20.0));
        assert_eq!(matrix.rows[0].values, [Some(5.0), Some(8.0), Some(8.0)]);
        assert_eq!(matrix.rows[0].rationale, "cheaper");
        assert_eq!(matrix.rows[1].base_weight, None);
        assert_eq!(matrix.rows[1].values, [Some(9.0), Some(3.0), None]);
    }
}

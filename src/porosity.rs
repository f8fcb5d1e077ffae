//! Porosity measurements along the core, indexed by depth.

use calamine::{Data, Reader, open_workbook_auto};
use log::info;
use std::path::Path;
use thiserror::Error;

/// Sheet holding the BH-3 15 m core log.
pub const DEFAULT_SHEET: &str = "MSCL_BH-3_15m";

/// Rows kept from the sheet; later rows are outside the scanned section.
pub const DEFAULT_ROW_LIMIT: usize = 495;

/// Depth column followed by the measured and model-predicted porosity columns.
pub const TARGET_COLUMNS: [&str; 6] = [
    "Depth (cm)",
    "Fractional porosity",
    "CTG=1095 by Computer with weight",
    "pix2pix unet 512 train 1095 test 1095",
    "512_unet512_lsgan_1095_isResetValAboveSoildCt",
    "pix2pix unet 512 train 970 test 970",
];

/// Column selected when the dashboard first opens.
pub const DEFAULT_SELECTION: &str = "Fractional porosity";

#[derive(Debug, Error)]
pub enum PorosityError {
    #[error("spreadsheet error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("sheet {0} is empty")]
    EmptySheet(String),

    #[error("column {0:?} not found")]
    MissingColumn(String),

    #[error("column {name:?} has {found} rows, expected {expected}")]
    RaggedColumn {
        name: String,
        found: usize,
        expected: usize,
    },

    #[error("a table needs a depth column and at least one value column")]
    NoColumns,
}

/// Read-only table: one depth column and any number of value columns of the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PorosityTable {
    depth_name: String,
    depth: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl PorosityTable {
    pub fn from_columns(
        depth_name: impl Into<String>,
        depth: Vec<f64>,
        columns: Vec<(String, Vec<f64>)>,
    ) -> Result<Self, PorosityError> {
        if columns.is_empty() {
            return Err(PorosityError::NoColumns);
        }
        let expected = depth.len();
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != expected) {
            return Err(PorosityError::RaggedColumn {
                name: name.clone(),
                found: values.len(),
                expected,
            });
        }
        Ok(Self {
            depth_name: depth_name.into(),
            depth,
            columns,
        })
    }

    /// Reads `columns` (the first one being depth) from `sheet`, keeping at most `row_limit` rows.
    pub fn load_xlsx(
        path: impl AsRef<Path>,
        sheet: &str,
        columns: &[&str],
        row_limit: usize,
    ) -> Result<Self, PorosityError> {
        let mut workbook = open_workbook_auto(path.as_ref())?;
        let range = workbook.worksheet_range(sheet)?;

        let mut rows = range.rows();
        let header = rows
            .next()
            .ok_or_else(|| PorosityError::EmptySheet(sheet.to_string()))?;
        let body: Vec<&[Data]> = rows.take(row_limit).collect();

        let table = Self::from_rows(header, &body, columns)?;
        info!(
            "loaded {} porosity rows x {} columns from {}",
            table.len(),
            table.columns.len(),
            path.as_ref().display()
        );
        Ok(table)
    }

    /// Builds a table from raw sheet cells. Blank or non-numeric cells become NaN.
    pub fn from_rows(header: &[Data], body: &[&[Data]], columns: &[&str]) -> Result<Self, PorosityError> {
        let (depth_name, value_names) = columns.split_first().ok_or(PorosityError::NoColumns)?;

        let position = |name: &str| {
            header
                .iter()
                .position(|cell| cell_text(cell).trim() == name)
                .ok_or_else(|| PorosityError::MissingColumn(name.to_string()))
        };
        let extract = |idx: usize| -> Vec<f64> {
            body.iter()
                .map(|row| row.get(idx).map_or(f64::NAN, cell_value))
                .collect()
        };

        let depth = extract(position(*depth_name)?);
        let values = value_names
            .iter()
            .map(|name| Ok((name.to_string(), extract(position(*name)?))))
            .collect::<Result<Vec<_>, PorosityError>>()?;

        Self::from_columns(*depth_name, depth, values)
    }

    pub fn depth_name(&self) -> &str {
        &self.depth_name
    }

    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Names of the value columns, in sheet order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> f64 {
    match cell {
        Data::Float(f) => *f,
        Data::Int(i) => *i as f64,
        Data::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn picks_target_columns_from_rows() {
        let header = vec![s("Depth (cm)"), s("Unrelated"), s("Fractional porosity")];
        let r1 = vec![Data::Float(0.5), s("x"), Data::Float(0.21)];
        let r2 = vec![Data::Int(1), s("y"), Data::Empty];
        let r3 = vec![Data::Float(1.5), s("z"), s("0.3")];
        let body: Vec<&[Data]> = vec![r1.as_slice(), r2.as_slice(), r3.as_slice()];

        let table =
            PorosityTable::from_rows(&header, &body, &["Depth (cm)", "Fractional porosity"])
                .unwrap();
        assert_eq!(table.depth_name(), "Depth (cm)");
        assert_eq!(table.depth(), &[0.5, 1.0, 1.5]);

        let porosity = table.column("Fractional porosity").unwrap();
        assert_eq!(porosity[0], 0.21);
        assert!(porosity[1].is_nan());
        assert_eq!(porosity[2], 0.3);
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["Fractional porosity"]);
    }

    #[test]
    fn missing_column_is_reported() {
        let header = vec![s("Depth (cm)")];
        let err = PorosityTable::from_rows(&header, &[], &["Depth (cm)", "Fractional porosity"])
            .unwrap_err();
        assert!(matches!(err, PorosityError::MissingColumn(name) if name == "Fractional porosity"));
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = PorosityTable::from_columns(
            "Depth (cm)",
            vec![0.0, 1.0],
            vec![("a".to_string(), vec![0.1])],
        )
        .unwrap_err();
        assert!(matches!(err, PorosityError::RaggedColumn { found: 1, expected: 2, .. }));
    }

    #[test]
    fn missing_workbook_fails() {
        let err = PorosityTable::load_xlsx(
            "/nonexistent/porosity.xlsx",
            DEFAULT_SHEET,
            &TARGET_COLUMNS,
            DEFAULT_ROW_LIMIT,
        )
        .unwrap_err();
        assert!(matches!(err, PorosityError::Workbook(_)));
    }
}

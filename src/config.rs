use std::path::PathBuf;

use clap::Parser;

use crate::enums::SortBy;
use crate::porosity::{DEFAULT_ROW_LIMIT, DEFAULT_SHEET};

/// Command line options of the dashboard server.
#[derive(Parser, Debug, Clone)]
#[command(name = "rock-ct-dashboard", version, about = "CT slicer and porosity dashboard for rock cores")]
pub struct Config {
    /// Directory holding the DICOM slices of the core scan
    #[arg(long, default_value = "./assets/RockCT")]
    pub dicom_dir: PathBuf,

    /// Slice ordering applied to the DICOM files
    #[arg(long, value_enum, default_value_t = SortBy::ImagePositionPatient)]
    pub sort_by: SortBy,

    /// Keep only the first N slices of the scan
    #[arg(long)]
    pub max_slices: Option<usize>,

    /// Directory of normalized model input images (`img_{i}.npy`)
    #[arg(long, default_value = "./assets/image_np/")]
    pub image_np_dir: PathBuf,

    /// Directory of predicted phase fractions (`percent_{i}.npy`)
    #[arg(long, default_value = "./assets/percent_np/")]
    pub percent_np_dir: PathBuf,

    /// Spreadsheet with porosity measurements
    #[arg(long, default_value = "./assets/porosity.xlsx")]
    pub porosity: PathBuf,

    /// Worksheet to read porosity from
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Number of porosity rows to keep
    #[arg(long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub rows: usize,

    /// Scene id shared by the slicers
    #[arg(long, default_value = "rock")]
    pub scene: String,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8050)]
    pub port: u16,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_asset_layout() {
        let config = Config::parse_from(["rock-ct-dashboard"]);
        assert_eq!(config.dicom_dir, PathBuf::from("./assets/RockCT"));
        assert_eq!(config.sheet, "MSCL_BH-3_15m");
        assert_eq!(config.rows, 495);
        assert_eq!(config.port, 8050);
        assert_eq!(config.sort_by, SortBy::ImagePositionPatient);
        assert_eq!(config.max_slices, None);
    }

    #[test]
    fn parses_overrides() {
        let config = Config::parse_from([
            "rock-ct-dashboard",
            "--max-slices",
            "500",
            "--sort-by",
            "instance-number",
            "--scene",
            "brain",
            "--port",
            "9000",
        ]);
        assert_eq!(config.max_slices, Some(500));
        assert_eq!(config.sort_by, SortBy::InstanceNumber);
        assert_eq!(config.scene, "brain");
        assert_eq!(config.port, 9000);
    }
}

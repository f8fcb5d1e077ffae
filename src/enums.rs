use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Slicing axis of a volume laid out as `(depth, height, width)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Axial,
    Coronal,
    Sagittal,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Axial,
        Orientation::Coronal,
        Orientation::Sagittal,
    ];

    /// Array axis this orientation slices along.
    pub fn axis(self) -> usize {
        match self {
            Orientation::Axial => 0,
            Orientation::Coronal => 1,
            Orientation::Sagittal => 2,
        }
    }

    pub fn from_axis(axis: usize) -> Option<Self> {
        match axis {
            0 => Some(Orientation::Axial),
            1 => Some(Orientation::Coronal),
            2 => Some(Orientation::Sagittal),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    /// Resample coronal and sagittal slices to isotropic pixels.
    Bilinear,
    #[default]
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips_through_orientation() {
        for orientation in Orientation::ALL {
            assert_eq!(Orientation::from_axis(orientation.axis()), Some(orientation));
        }
        assert_eq!(Orientation::from_axis(3), None);
    }
}

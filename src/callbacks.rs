//! Reactions to UI events. Every function here is pure: the HTTP layer feeds
//! it the event payload and writes the result into the matching store.

use serde::Deserialize;
use thiserror::Error;

use crate::figure::{self, Figure};
use crate::porosity::PorosityTable;
use crate::scene::{AxisValues, SetPosition};

/// Dropdown entry that overlays every column.
pub const ALL: &str = "All";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CallbackError {
    #[error("unknown porosity column {0:?}")]
    UnknownColumn(String),
}

/// Dropdown value of the porosity chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSelection {
    Column(String),
    All,
}

impl LineSelection {
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case(ALL) {
            LineSelection::All
        } else {
            LineSelection::Column(value.to_string())
        }
    }
}

/// Dropdown change: redraw the porosity chart for the selection.
pub fn update_line_chart(
    table: &PorosityTable,
    selection: &LineSelection,
) -> Result<Figure, CallbackError> {
    match selection {
        LineSelection::All => Ok(figure::overlay_chart(table)),
        LineSelection::Column(name) => figure::line_chart(table, name)
            .ok_or_else(|| CallbackError::UnknownColumn(name.clone())),
    }
}

/// `clickData` payload sent by a Plotly graph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClickData {
    #[serde(default)]
    pub points: Vec<ClickPoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPoint {
    pub point_index: usize,
    #[serde(default)]
    pub curve_number: Option<usize>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// Chart click: seek the axial slicer to the clicked row.
///
/// Without a click the scene is centered on the middle slice.
pub fn click_to_seek(click: Option<&ClickData>, nslices: usize) -> SetPosition {
    match click.and_then(|c| c.points.first()) {
        Some(point) => SetPosition::new(None, None, Some(point.point_index)),
        None => {
            let middle = nslices / 2;
            SetPosition::new(None, Some(middle), Some(middle))
        }
    }
}

/// Builtin slider drag: mirror the values onto the auxiliary sliders.
pub fn write_to_auxiliary_sliders(drag: AxisValues) -> AxisValues {
    drag
}

/// Auxiliary slider change: show the values in the navigation fields.
pub fn write_to_position_table(aux: AxisValues) -> AxisValues {
    aux
}

/// Navigation field edit: field `i` drives the slicer on axis `i`, so the
/// fields map to scene coordinates in reverse order.
pub fn write_table_values_to_slicer(nav: AxisValues) -> SetPosition {
    let [x_pos, y_pos, z_pos] = nav;
    SetPosition::new(z_pos, y_pos, x_pos)
}

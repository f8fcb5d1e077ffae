//! Plotly-compatible figure description, serialized as the `{data, layout}`
//! JSON that `Plotly.react` consumes.

use serde::Serialize;

use crate::porosity::PorosityTable;

const GRID_COLOR: &str = "#EBF0F8";
const WHITE: &str = "white";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

/// One `scatter` trace drawn as lines. NaN values serialize as `null` and show as gaps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub showlegend: bool,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Trace {
    pub fn line(x: &[f64], y: &[f64]) -> Self {
        Self {
            kind: "scatter",
            mode: "lines",
            name: None,
            showlegend: false,
            x: x.to_vec(),
            y: y.to_vec(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.showlegend = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    pub plot_bgcolor: &'static str,
    pub paper_bgcolor: &'static str,
    pub hovermode: &'static str,
}

impl Layout {
    /// White background with light grid lines.
    pub fn plotly_white(x_title: impl Into<String>, y_title: impl Into<String>) -> Self {
        Self {
            xaxis: AxisLayout::titled(x_title),
            yaxis: AxisLayout::titled(y_title),
            plot_bgcolor: WHITE,
            paper_bgcolor: WHITE,
            hovermode: "closest",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: Title,
    pub gridcolor: &'static str,
    pub zerolinecolor: &'static str,
}

impl AxisLayout {
    fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Title { text: text.into() },
            gridcolor: GRID_COLOR,
            zerolinecolor: GRID_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

/// `column` against depth. `None` if the table has no such column.
pub fn line_chart(table: &PorosityTable, column: &str) -> Option<Figure> {
    let values = table.column(column)?;
    Some(Figure {
        data: vec![Trace::line(table.depth(), values)],
        layout: Layout::plotly_white(table.depth_name(), column),
    })
}

/// Every value column against depth, one named trace each.
pub fn overlay_chart(table: &PorosityTable) -> Figure {
    let data = table
        .columns()
        .map(|(name, values)| Trace::line(table.depth(), values).named(name))
        .collect();
    Figure {
        data,
        layout: Layout::plotly_white("Depth (cm)", "Porosity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> PorosityTable {
        PorosityTable::from_columns(
            "Depth (cm)",
            vec![0.0, 0.5],
            vec![
                ("Fractional porosity".to_string(), vec![0.2, f64::NAN]),
                ("model".to_string(), vec![0.1, 0.3]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn serializes_as_plotly_json() {
        let figure = line_chart(&table(), "model").unwrap();
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["type"], "scatter");
        assert_eq!(value["data"][0]["mode"], "lines");
        assert_eq!(value["data"][0]["y"], json!([0.1, 0.3]));
        assert!(value["data"][0].get("name").is_none());
        assert_eq!(value["layout"]["xaxis"]["title"]["text"], "Depth (cm)");
        assert_eq!(value["layout"]["yaxis"]["title"]["text"], "model");
    }

    #[test]
    fn nan_becomes_null() {
        let figure = line_chart(&table(), "Fractional porosity").unwrap();
        let value = serde_json::to_value(&figure).unwrap();
        assert_eq!(value["data"][0]["y"], json!([0.2, null]));
    }

    #[test]
    fn overlay_names_each_trace() {
        let figure = overlay_chart(&table());
        let names: Vec<_> = figure.data.iter().map(|t| t.name.as_deref()).collect();
        assert_eq!(names, [Some("Fractional porosity"), Some("model")]);
        assert_eq!(figure.layout.yaxis.title.text, "Porosity");
    }

    #[test]
    fn unknown_column_has_no_chart() {
        assert!(line_chart(&table(), "nope").is_none());
    }
}

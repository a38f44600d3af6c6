//! Figure layout: titles, axes, margins and colors

use serde::Serialize;

/// Axis scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    Linear,
    Log,
    Category,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AxisType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl Axis {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn kind(mut self, kind: AxisType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn range(mut self, low: f64, high: f64) -> Self {
        self.range = Some([low, high]);
        self
    }
}

/// Plot margins in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub l: u32,
    pub b: u32,
    pub t: u32,
    pub r: u32,
}

/// Legend anchor in paper coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<Legend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn xaxis(mut self, axis: Axis) -> Self {
        self.xaxis = Some(axis);
        self
    }

    pub fn yaxis(mut self, axis: Axis) -> Self {
        self.yaxis = Some(axis);
        self
    }

    pub fn margin(mut self, l: u32, b: u32, t: u32, r: u32) -> Self {
        self.margin = Some(Margin { l, b, t, r });
        self
    }

    pub fn legend(mut self, x: f64, y: f64) -> Self {
        self.legend = Some(Legend { x, y });
        self
    }

    pub fn hovermode(mut self, mode: impl Into<String>) -> Self {
        self.hovermode = Some(mode.into());
        self
    }

    /// Plot and paper background plus font color
    pub fn colors(mut self, background: &str, text: &str) -> Self {
        self.plot_bgcolor = Some(background.to_string());
        self.paper_bgcolor = Some(background.to_string());
        self.font = Some(Font {
            color: text.to_string(),
        });
        self
    }
}

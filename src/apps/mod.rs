//! Bundled apps
//!
//! - [`bar_chart`]: two static bar traces
//! - [`agriculture`]: markdown, bar chart, export table and an echo input
//! - [`gapminder`]: scatter plot filtered by a year slider and a GDP dropdown
//! - [`powers`]: one number input driving five outputs

mod agriculture;
mod bar_chart;
mod gapminder;
mod powers;

pub use agriculture::{agriculture, entered_text};
pub use bar_chart::bar_chart;
pub use gapminder::{gapminder, update_figure};
pub use powers::{powers, powers_of};

use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;

use crate::app::{App, AppResult};
use crate::config::DataConfig;
use crate::dataset;

/// Shared page background
pub const BACKGROUND_COLOR: &str = "#D7D7D7";
/// Shared text color
pub const TEXT_COLOR: &str = "#4D4D4D";
/// Stylesheet every bundled app links
pub const STYLESHEET: &str = "https://codepen.io/chriddyp/pen/bWLwgP.css";

/// Centered heading style in the shared text color
pub(crate) fn centered_text() -> Value {
    json!({ "textAlign": "center", "color": TEXT_COLOR })
}

/// Which bundled app to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AppKind {
    BarChart,
    Agriculture,
    Gapminder,
    Powers,
}

impl AppKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppKind::BarChart => "bar-chart",
            AppKind::Agriculture => "agriculture",
            AppKind::Gapminder => "gapminder",
            AppKind::Powers => "powers",
        }
    }

    pub fn all() -> [AppKind; 4] {
        [
            AppKind::BarChart,
            AppKind::Agriculture,
            AppKind::Gapminder,
            AppKind::Powers,
        ]
    }
}

impl std::fmt::Display for AppKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppKind::all()
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| format!("unknown app '{}'", s))
    }
}

/// Build an app, loading whatever dataset it needs
///
/// Data-load failures are returned as errors; the app is not served
/// without its data.
pub async fn load(kind: AppKind, data: &DataConfig) -> AppResult<App> {
    let timeout = Duration::from_secs(data.fetch_timeout_secs);
    let app = match kind {
        AppKind::BarChart => bar_chart(),
        AppKind::Powers => powers()?,
        AppKind::Agriculture => {
            let source = dataset::source_for(&data.agriculture_csv, timeout);
            agriculture(dataset::load(source.as_ref()).await?)?
        }
        AppKind::Gapminder => {
            let source = dataset::source_for(&data.gapminder_csv, timeout);
            gapminder(dataset::load(source.as_ref()).await?)?
        }
    };

    app.validate()?;
    Ok(app)
}

//! Gapminder scatter
//!
//! Life expectancy against GDP per capita for one year, one trace per
//! continent. A slider picks the year and a dropdown sets the GDP floor.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::STYLESHEET;
use crate::app::{App, AppResult};
use crate::callback::{CallbackArgs, CallbackError, PropRef};
use crate::component::{html, widgets};
use crate::dataset::{number_value, Cell, Dataset, DatasetError, DatasetResult};
use crate::figure::{Axis, AxisType, Figure, Layout, Line, Marker, Trace};

const YEAR: &str = "year";
const GDP: &str = "gdpPercap";
const LIFE_EXPECTANCY: &str = "lifeExp";
const CONTINENT: &str = "continent";
const COUNTRY: &str = "country";

/// Scatter of the rows for `year` with GDP per capita of at least `min_gdp`
pub fn update_figure(data: &Dataset, year: f64, min_gdp: f64) -> DatasetResult<Figure> {
    let selected = data
        .view()
        .filter_eq(YEAR, &Cell::Number(year))?
        .filter_ge(GDP, min_gdp)?;

    let mut traces = Vec::new();
    for continent in selected.unique(CONTINENT)? {
        let rows = selected.filter_eq(CONTINENT, &continent)?;
        traces.push(
            Trace::scatter(rows.values(GDP)?, rows.values(LIFE_EXPECTANCY)?)
                .text(rows.values(COUNTRY)?)
                .name(continent.to_string())
                .mode("markers")
                .opacity(0.7)
                .marker(Marker {
                    size: Some(15.0),
                    color: None,
                    line: Some(Line {
                        width: 0.5,
                        color: "white".to_string(),
                    }),
                }),
        );
    }

    let layout = Layout::new()
        .xaxis(Axis::titled("GDP Per Capita").kind(AxisType::Log))
        .yaxis(Axis::titled("Life Expectancy").range(20.0, 90.0))
        .margin(40, 40, 10, 10)
        .legend(0.0, 1.0)
        .hovermode("closest");

    Ok(Figure::new(traces, layout))
}

fn year_marks(data: &Dataset) -> DatasetResult<Map<String, Value>> {
    Ok(data
        .view()
        .unique(YEAR)?
        .into_iter()
        .map(|year| (year.to_string(), Value::String(year.to_string())))
        .collect())
}

pub fn gapminder(data: Arc<Dataset>) -> AppResult<App> {
    let missing = || DatasetError::Empty(format!("column '{}' has no values", YEAR));
    let min_year = data.min(YEAR)?.ok_or_else(missing)?;
    let max_year = data.max(YEAR)?.ok_or_else(missing)?;

    let layout = html::div()
        .child(html::div().child("Minimum GDP"))
        .child(widgets::dropdown(
            "gdp-dropdown",
            (0..11_000).step_by(1000).map(|gdp| (gdp.to_string(), gdp)),
            0,
        ))
        .child(widgets::graph("graph-with-slider"))
        .child(widgets::slider(
            "year-slider",
            number_value(min_year),
            number_value(max_year),
            number_value(min_year),
            year_marks(&data)?,
        ));

    App::new("gapminder")
        .title("Gapminder")
        .external_stylesheet(STYLESHEET)
        .layout(layout)
        .callback(
            vec![PropRef::new("graph-with-slider", "figure")],
            vec![
                PropRef::new("year-slider", "value"),
                PropRef::new("gdp-dropdown", "value"),
            ],
            vec![],
            move |args: &CallbackArgs<'_>| {
                let year = args.f64(0)?;
                let min_gdp = args.f64(1)?;
                let figure = update_figure(&data, year, min_gdp)
                    .map_err(|e| CallbackError::Failed(e.to_string()))?;
                Ok(figure.to_value().into())
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::fixtures::GAPMINDER;
    use serde_json::json;

    fn data() -> Arc<Dataset> {
        Arc::new(Dataset::from_csv_str(GAPMINDER).unwrap())
    }

    fn figure_ref() -> PropRef {
        PropRef::new("graph-with-slider", "figure")
    }

    #[test]
    fn test_traces_per_continent() {
        let figure = update_figure(&data(), 2007.0, 0.0).unwrap();
        let names: Vec<_> = figure.data.iter().map(|t| t.name.clone().unwrap()).collect();

        assert_eq!(names, ["Asia", "Europe", "Africa"]);
        assert_eq!(figure.data[0].len(), 2);
        assert_eq!(figure.data[0].text, Some(vec![json!("Afghanistan"), json!("Japan")]));
        assert_eq!(figure.data[0].y, vec![json!(43.828), json!(82.603)]);
    }

    #[test]
    fn test_gdp_floor() {
        let figure = update_figure(&data(), 2007.0, 6000.0).unwrap();
        let names: Vec<_> = figure.data.iter().map(|t| t.name.clone().unwrap()).collect();
        assert_eq!(names, ["Africa", "Asia"]);

        let empty = update_figure(&data(), 1990.0, 0.0).unwrap();
        assert!(empty.data.is_empty());
        assert_eq!(empty.layout.hovermode.as_deref(), Some("closest"));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let data = data();
        let first = update_figure(&data, 1952.0, 1000.0).unwrap();
        let second = update_figure(&data, 1952.0, 1000.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn test_slider_from_years() {
        let app = gapminder(data()).unwrap();
        let slider = app.layout_tree().find("year-slider").unwrap();

        assert_eq!(slider.get_prop("min"), Some(json!(1952)));
        assert_eq!(slider.get_prop("max"), Some(json!(2007)));
        assert_eq!(slider.get_prop("value"), Some(json!(1952)));
        assert_eq!(
            slider.get_prop("marks"),
            Some(json!({"1952": "1952", "2007": "2007"}))
        );

        let dropdown = app.layout_tree().find("gdp-dropdown").unwrap();
        let options = dropdown.get_prop("options").unwrap();
        assert_eq!(options.as_array().unwrap().len(), 11);
        assert_eq!(options[10], json!({"label": "10000", "value": 10000}));
    }

    #[test]
    fn test_session_drives_figure() {
        let app = gapminder(data()).unwrap();
        app.validate().unwrap();

        let mut session = app.session();
        let startup = session.start();
        let figure = startup.value_of(&figure_ref()).unwrap();
        assert_eq!(figure["data"].as_array().unwrap().len(), 3);

        let dispatch = session.apply_input_change(PropRef::new("gdp-dropdown", "value"), json!(3000));
        let figure = dispatch.value_of(&figure_ref()).unwrap();
        assert_eq!(figure["data"].as_array().unwrap().len(), 1);
        assert_eq!(figure["data"][0]["name"], json!("Asia"));
        assert_eq!(figure["layout"]["xaxis"]["type"], json!("log"));
    }

    #[test]
    fn test_missing_column_fails_at_build() {
        let data = Arc::new(Dataset::from_csv_str("country,pop\nChad,1\n").unwrap());
        assert!(gapminder(data).is_err());
    }
}

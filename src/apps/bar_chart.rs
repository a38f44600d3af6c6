//! Static bar chart

use serde_json::json;

use super::{centered_text, BACKGROUND_COLOR, STYLESHEET, TEXT_COLOR};
use crate::app::App;
use crate::component::{html, widgets, Component};
use crate::figure::{Figure, Layout, Trace};

/// The two-city sample figure shared with the agriculture page
pub(crate) fn sample_graph() -> Component {
    let figure = Figure::new(
        vec![
            Trace::bar(vec![json!(1), json!(2), json!(3)], vec![json!(4), json!(1), json!(2)])
                .name("SF"),
            Trace::bar(vec![json!(1), json!(2), json!(3)], vec![json!(2), json!(4), json!(5)])
                .name("Montréal"),
        ],
        Layout::new()
            .title("Dash Data Visualization")
            .colors(BACKGROUND_COLOR, TEXT_COLOR),
    );

    widgets::graph("example-graph").prop("figure", figure)
}

pub(crate) fn heading() -> Component {
    html::h1().child("Dash Demo").style(centered_text())
}

pub(crate) fn subtitle() -> Component {
    html::div().child("A Sample Bar Chart").style(centered_text())
}

pub fn bar_chart() -> App {
    App::new("bar-chart")
        .title("Dash Demo")
        .external_stylesheet(STYLESHEET)
        .layout(
            html::div()
                .child(heading())
                .child(subtitle())
                .child(sample_graph()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let app = bar_chart();
        app.validate().unwrap();
        assert!(app.registry().is_empty());

        let graph = app.layout_tree().find("example-graph").unwrap();
        let figure = graph.get_prop("figure").unwrap();
        assert_eq!(figure["data"][1]["name"], json!("Montréal"));
        assert_eq!(figure["data"][0]["y"], json!([4, 1, 2]));
        assert_eq!(figure["layout"]["paper_bgcolor"], json!("#D7D7D7"));

        let layout = app.layout_tree().to_value();
        assert_eq!(layout["props"]["children"][0]["props"]["children"], json!("Dash Demo"));
    }
}

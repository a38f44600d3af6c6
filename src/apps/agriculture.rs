//! Agriculture exports page
//!
//! Markdown, the sample bar chart, a table of the first ten export rows, and
//! a text input echoed into a div.

use serde_json::json;
use std::sync::Arc;

use super::bar_chart::{heading, sample_graph, subtitle};
use super::{centered_text, STYLESHEET};
use crate::app::{App, AppResult};
use crate::callback::{CallbackArgs, PropRef};
use crate::component::{generate_table, html, widgets};
use crate::dataset::Dataset;

const MARKDOWN: &str = "
### This is a Markdown Header

Sample _fancy_ **markdown** ~~words~~ text :)
Dash uses the [CommonMark](http://commonmark.org/)
specification of Markdown.
";

const TABLE_ROWS: usize = 10;

/// Text shown under the input
pub fn entered_text(value: &str) -> String {
    format!("You've entered \"{}\"", value)
}

pub fn agriculture(data: Arc<Dataset>) -> AppResult<App> {
    let table = generate_table(&data.view(), TABLE_ROWS);

    let layout = html::div()
        .child(heading())
        .child(widgets::markdown(MARKDOWN))
        .child(subtitle())
        .child(sample_graph())
        .child(
            html::h4()
                .child("Sample Table - US Agriculture Exports (2011)")
                .style(centered_text()),
        )
        .child(html::div().child(table).style(json!({
            "margin": "0 auto",
            "width": "75%",
            "overflow": "scroll"
        })))
        .child(widgets::input("my-input", "text", "initial value"))
        .child(html::div().id("my-div"));

    App::new("agriculture")
        .title("Dash Demo")
        .external_stylesheet(STYLESHEET)
        .layout(layout)
        .callback(
            vec![PropRef::new("my-div", "children")],
            vec![PropRef::new("my-input", "value")],
            vec![],
            |args: &CallbackArgs<'_>| Ok(json!(entered_text(&args.text(0)?)).into()),
        )
}

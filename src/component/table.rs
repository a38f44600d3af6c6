//! Table rendering for datasets

use super::html;
use super::node::Component;
use crate::dataset::DatasetView;

/// Render a header row plus at most `max_rows` body rows of a view
pub fn generate_table(view: &DatasetView<'_>, max_rows: usize) -> Component {
    let header = html::tr().children(
        view.columns()
            .iter()
            .map(|col| html::th().child(col.as_str())),
    );

    let body: Vec<Component> = view
        .head(max_rows)
        .rows()
        .map(|row| {
            html::tr().children(row.cells().iter().map(|cell| html::td().child(cell.to_string())))
        })
        .collect();

    html::table().child(header).children(body)
}

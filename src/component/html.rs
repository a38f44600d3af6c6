//! Plain HTML element builders
//!
//! Thin constructors over [`Component::new`] for the elements the bundled
//! apps use.

use super::node::{Component, Namespace};

fn element(kind: &str) -> Component {
    Component::new(Namespace::Html, kind)
}

pub fn div() -> Component {
    element("Div")
}

pub fn h1() -> Component {
    element("H1")
}

pub fn h4() -> Component {
    element("H4")
}

pub fn p() -> Component {
    element("P")
}

pub fn table() -> Component {
    element("Table")
}

pub fn tr() -> Component {
    element("Tr")
}

pub fn th() -> Component {
    element("Th")
}

pub fn td() -> Component {
    element("Td")
}

//! Property references
//!
//! A [`PropRef`] names one property of one component, written `id.property`.
//! Bindings with several outputs are addressed by the joined form
//! `..a.x...b.y..` used by the rendering runtime.
//!
//! # Grammar
//!
//! ```text
//! single := id "." property
//! multi  := ".." single ( "..." single )* ".."
//! id     := any chars except "."
//! property := [A-Za-z0-9_-]+
//! ```

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::{delimited, separated_pair},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::{DispatchError, DispatchResult};

/// One property of one component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropRef {
    /// Component identifier
    pub id: String,
    /// Property name on that component
    pub property: String,
}

impl PropRef {
    pub fn new(id: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            property: property.into(),
        }
    }
}

impl std::fmt::Display for PropRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.id, self.property)
    }
}

impl FromStr for PropRef {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(parse_single)(s.trim())
            .map(|(_, r)| r)
            .map_err(|e| DispatchError::InvalidReference(format!("{}: {:?}", s, e)))
    }
}

/// Textual form of an ordered output list
pub fn format_outputs(outputs: &[PropRef]) -> String {
    match outputs {
        [single] => single.to_string(),
        many => {
            let joined: Vec<String> = many.iter().map(PropRef::to_string).collect();
            format!("..{}..", joined.join("..."))
        }
    }
}

/// Parse either output form into an ordered list
pub fn parse_outputs(spec: &str) -> DispatchResult<Vec<PropRef>> {
    let spec = spec.trim();
    let parsed = if spec.starts_with("..") {
        all_consuming(parse_multi)(spec)
    } else {
        all_consuming(map(parse_single, |r| vec![r]))(spec)
    };

    parsed
        .map(|(_, refs)| refs)
        .map_err(|e| DispatchError::InvalidReference(format!("{}: {:?}", spec, e)))
}

fn is_property_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn parse_single(input: &str) -> IResult<&str, PropRef> {
    map(
        separated_pair(
            take_while1(|c: char| c != '.'),
            char('.'),
            take_while1(is_property_char),
        ),
        |(id, property): (&str, &str)| PropRef::new(id, property),
    )(input)
}

fn parse_multi(input: &str) -> IResult<&str, Vec<PropRef>> {
    delimited(tag(".."), separated_list1(tag("..."), parse_single), tag(".."))(input)
}

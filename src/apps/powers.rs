//! Powers table
//!
//! One number input; five cells show x², x³, 2ˣ, 3ˣ and xˣ.

use serde_json::Value;

use super::STYLESHEET;
use crate::app::{App, AppResult};
use crate::callback::{CallbackArgs, CallbackError, CallbackResult, Outputs, PropRef};
use crate::component::{html, widgets, Component};
use crate::dataset::number_value;

const CELLS: [(&str, &str); 5] = [
    ("square", "x²"),
    ("cube", "x³"),
    ("twos", "2ˣ"),
    ("threes", "3ˣ"),
    ("x^x", "xˣ"),
];

/// `base^exp` as JSON
///
/// Integer operands with a non-negative exponent are computed exactly and
/// must fit a JSON integer. Everything else goes through `f64` and must
/// stay finite.
fn pow(base: f64, exp: f64) -> Result<Value, String> {
    let integral = base.fract() == 0.0 && exp.fract() == 0.0;
    if integral && exp >= 0.0 && base.abs() <= i64::MAX as f64 && exp <= u32::MAX as f64 {
        return (base as i128)
            .checked_pow(exp as u32)
            .and_then(|n| {
                i64::try_from(n)
                    .map(Value::from)
                    .or_else(|_| u64::try_from(n).map(Value::from))
                    .ok()
            })
            .ok_or_else(|| format!("{}^{} does not fit in an integer", base, exp));
    }

    let result = base.powf(exp);
    if result.is_finite() {
        Ok(number_value(result))
    } else {
        Err(format!("{}^{} is not a finite number", base, exp))
    }
}

/// `(x², x³, 2ˣ, 3ˣ, xˣ)`
///
/// Fails as a whole when any of the five cannot be represented, so no cell
/// is ever written with a placeholder.
pub fn powers_of(x: f64) -> CallbackResult<Vec<Value>> {
    [(x, 2.0), (x, 3.0), (2.0, x), (3.0, x), (x, x)]
        .into_iter()
        .map(|(base, exp)| pow(base, exp))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|reason| CallbackError::InvalidInput { index: 0, reason })
}

fn row(id: &str, label: &str) -> Component {
    html::tr()
        .child(html::td().child(label))
        .child(html::td().id(id))
}

pub fn powers() -> AppResult<App> {
    let layout = html::div()
        .child(widgets::input("num", "number", 5))
        .child(html::table().children(CELLS.iter().map(|(id, label)| row(id, label))));

    App::new("powers")
        .title("Powers")
        .external_stylesheet(STYLESHEET)
        .layout(layout)
        .callback(
            CELLS.iter().map(|(id, _)| PropRef::new(*id, "children")).collect(),
            vec![PropRef::new("num", "value")],
            vec![],
            |args: &CallbackArgs<'_>| {
                let x = args.f64(0)?;
                Ok(Outputs::from(powers_of(x)?))
            },
        )
}

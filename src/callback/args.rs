//! Callback arguments and return values

use serde_json::Value;

use super::error::{CallbackError, CallbackResult};

/// Positional argument values handed to a callback: inputs in declared
/// order, then states in declared order
#[derive(Debug, Clone, Copy)]
pub struct CallbackArgs<'a> {
    values: &'a [Value],
}

impl<'a> CallbackArgs<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value at `index`
    pub fn get(&self, index: usize) -> CallbackResult<&'a Value> {
        self.values
            .get(index)
            .ok_or(CallbackError::MissingArgument(index))
    }

    /// Value at `index` as a number
    ///
    /// Numeric strings are accepted since text inputs deliver their value as
    /// a string. Anything else is an input-value error.
    pub fn f64(&self, index: usize) -> CallbackResult<f64> {
        let value = self.get(index)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        };

        parsed.ok_or_else(|| CallbackError::InvalidInput {
            index,
            reason: format!("expected a number, got {}", value),
        })
    }

    /// Value at `index` as text; non-string values use their JSON form
    pub fn text(&self, index: usize) -> CallbackResult<String> {
        Ok(match self.get(index)? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// What a callback returns: one value for a single-output binding, or one
/// value per output in declared order
#[derive(Debug, Clone, PartialEq)]
pub enum Outputs {
    Single(Value),
    Many(Vec<Value>),
}

impl Outputs {
    /// Check the shape against the declared output count
    ///
    /// Returns the number of values actually returned on mismatch.
    pub(crate) fn into_values(self, expected: usize) -> Result<Vec<Value>, usize> {
        match self {
            Outputs::Single(value) if expected == 1 => Ok(vec![value]),
            Outputs::Single(_) => Err(1),
            Outputs::Many(values) if values.len() == expected => Ok(values),
            Outputs::Many(values) => Err(values.len()),
        }
    }
}

impl From<Value> for Outputs {
    fn from(value: Value) -> Self {
        Outputs::Single(value)
    }
}

impl From<Vec<Value>> for Outputs {
    fn from(values: Vec<Value>) -> Self {
        Outputs::Many(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_coercion() {
        let values = [json!(5), json!("2.5"), json!("abc"), Value::Null];
        let args = CallbackArgs::new(&values);

        assert_eq!(args.f64(0).unwrap(), 5.0);
        assert_eq!(args.f64(1).unwrap(), 2.5);
        assert!(matches!(
            args.f64(2),
            Err(CallbackError::InvalidInput { index: 2, .. })
        ));
        assert!(args.f64(3).is_err());
        assert_eq!(args.f64(4), Err(CallbackError::MissingArgument(4)));
    }

    #[test]
    fn test_text() {
        let values = [json!("hello"), json!(3)];
        let args = CallbackArgs::new(&values);

        assert_eq!(args.text(0).unwrap(), "hello");
        assert_eq!(args.text(1).unwrap(), "3");
    }

    #[test]
    fn test_output_shapes() {
        assert_eq!(Outputs::from(json!(1)).into_values(1), Ok(vec![json!(1)]));
        assert_eq!(Outputs::from(json!(1)).into_values(2), Err(1));
        assert_eq!(
            Outputs::from(vec![json!(1), json!(2)]).into_values(2),
            Ok(vec![json!(1), json!(2)])
        );
        assert_eq!(Outputs::from(vec![json!(1)]).into_values(3), Err(1));
    }
}

//! Operation parameter formatting.

use serde_json::{Map, Number, Value};

/// Rewrites one Beacon operation into the shape the operation sender takes.
pub trait OpParamFormatter: Send + Sync {
    fn format(&self, op: Value) -> Value;
}

/// Default formatter.
///
/// `transaction`: `destination` becomes `to`, `parameters` becomes
/// `parameter`, `amount` becomes a number and `mutez` is set.
/// `origination`: `mutez` is set. Anything else is left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeaconOpParamFormatter;

impl OpParamFormatter for BeaconOpParamFormatter {
    fn format(&self, op: Value) -> Value {
        let Value::Object(mut fields) = op else {
            return op;
        };
        match fields.get("kind").and_then(Value::as_str) {
            Some("transaction") => {
                rename(&mut fields, "destination", "to");
                rename(&mut fields, "parameters", "parameter");
                if let Some(amount) = fields.remove("amount") {
                    fields.insert("amount".into(), numeric(amount));
                }
                fields.insert("mutez".into(), Value::Bool(true));
            }
            Some("origination") => {
                fields.insert("mutez".into(), Value::Bool(true));
            }
            _ => {}
        }
        Value::Object(fields)
    }
}

fn rename(fields: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = fields.remove(from) {
        fields.insert(to.to_string(), value);
    }
}

/// Amounts arrive as decimal strings. Unparseable values are kept.
fn numeric(amount: Value) -> Value {
    let Value::String(text) = &amount else {
        return amount;
    };
    if let Ok(n) = text.parse::<u64>() {
        return Value::Number(n.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(amount)
}

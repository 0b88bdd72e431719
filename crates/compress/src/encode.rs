//! Payload encoders.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rush_pipeline::Strategy;
use rush_primitives::{AttrKey, AttrValue, Attributes};
use serde_json::{Map, Value};

/// Marker prefix for packed small ints under the `advanced` strategy.
///
/// Lets the receiving decoder distinguish a packed small int from a generic
/// string value.
pub const PACKED_INT_MARKER: char = '#';

/// Marker prefix for base64-wrapped numerics under the `maximum` strategy.
pub const WRAPPED_NUM_MARKER: char = '~';

/// Encode an attribute map under the given strategy.
///
/// Deterministic: the output object's keys are sorted, so the same input and
/// strategy always produce byte-identical output. Never fails; keys outside
/// the alias registry serialize under their original name.
pub fn compress(attributes: &Attributes, strategy: Strategy) -> String {
    let mut object = Map::new();
    for (key, value) in attributes {
        object.insert(encode_key(key, strategy), encode_value(value, strategy));
    }
    Value::Object(object).to_string()
}

fn encode_key(key: &AttrKey, strategy: Strategy) -> String {
    match strategy {
        Strategy::None => key.name().to_string(),
        // Alias substitution; Custom keys have no alias and pass through.
        Strategy::Basic | Strategy::Advanced | Strategy::Maximum => match key.alias() {
            Some(alias) => alias.to_string(),
            None => key.name().to_string(),
        },
    }
}

fn encode_value(value: &AttrValue, strategy: Strategy) -> Value {
    match (strategy, value) {
        (Strategy::Advanced, AttrValue::Int(v)) if (0..=255).contains(v) => {
            Value::String(format!("{PACKED_INT_MARKER}{v}"))
        }
        (Strategy::Maximum, AttrValue::Int(v)) => {
            Value::String(format!("{WRAPPED_NUM_MARKER}{}", STANDARD.encode(v.to_string())))
        }
        (_, AttrValue::Int(v)) => Value::Number((*v).into()),
        (_, AttrValue::Text(s)) => Value::String(s.clone()),
    }
}

use json::JsonValue;

use abstractor_netlist::{Const, ParamValue, Trit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bit {
    Zero,
    One,
    Undef,
    Net(usize),
}

impl Bit {
    pub fn from_json(value: &JsonValue) -> Option<Bit> {
        match value.as_str() {
            Some("0") => Some(Bit::Zero),
            Some("1") => Some(Bit::One),
            Some("x" | "z") => Some(Bit::Undef),
            Some(_) => None,
            None => value.as_usize().map(Bit::Net),
        }
    }
}

/// Reads a `bits` array, least significant bit first.
pub(crate) fn bits_from_json(value: &JsonValue) -> Option<Vec<Bit>> {
    if !value.is_array() {
        return None;
    }
    value.members().map(Bit::from_json).collect()
}

pub(crate) fn trit_to_json(trit: Trit) -> JsonValue {
    match trit {
        Trit::Zero => "0".into(),
        Trit::One => "1".into(),
        Trit::Undef => "x".into(),
    }
}

fn is_binary(chr: char) -> bool {
    matches!(chr, '0' | '1' | 'x' | 'z')
}

/// Strings that consist of binary digits followed by spaces get an extra trailing space, so that
/// they are not mistaken for constants when read back.
fn needs_escape(value: &str) -> bool {
    value.trim_start_matches(is_binary).chars().all(|chr| chr == ' ')
}

pub(crate) fn param_from_json(value: &JsonValue) -> Option<ParamValue> {
    if let Some(string) = value.as_str() {
        if string.chars().all(is_binary) {
            let trits: Option<Vec<Trit>> = string.chars().rev().map(|chr| Trit::from_char(chr).ok()).collect();
            return trits.map(|trits| ParamValue::Const(Const::from(trits)));
        }
        if needs_escape(string) {
            return Some(ParamValue::String(string[..string.len() - 1].to_string()));
        }
        Some(ParamValue::String(string.to_string()))
    } else {
        value.as_i64().map(ParamValue::Int)
    }
}

pub(crate) fn param_to_json(value: &ParamValue) -> JsonValue {
    match value {
        ParamValue::Const(value) => value.iter().rev().map(|trit| trit.to_string()).collect::<String>().into(),
        ParamValue::Int(value) => (*value).into(),
        ParamValue::String(value) if needs_escape(value) => format!("{value} ").into(),
        ParamValue::String(value) => value.as_str().into(),
    }
}

/// Converts a JSON name into an RTLIL identifier.
pub(crate) fn escape_id(name: &str) -> String {
    if name.starts_with('$') || name.starts_with('\\') { name.to_string() } else { format!("\\{name}") }
}

pub(crate) fn unescape_id(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use json::JsonValue;

    use abstractor_netlist::{Const, ParamValue};

    use super::{Bit, bits_from_json, param_from_json, param_to_json};

    #[test]
    fn test_bits() {
        let value = json::parse(r#"[2, "0", "1", "x", "z", 3]"#).unwrap();
        assert_eq!(
            bits_from_json(&value),
            Some(vec![Bit::Net(2), Bit::Zero, Bit::One, Bit::Undef, Bit::Undef, Bit::Net(3)])
        );
        assert_eq!(bits_from_json(&json::parse(r#"["q"]"#).unwrap()), None);
        assert_eq!(bits_from_json(&JsonValue::Null), None);
    }

    #[test]
    fn test_params() {
        let param = |text: &str| param_from_json(&json::parse(text).unwrap()).unwrap();
        assert_eq!(param(r#""0101""#), ParamValue::Const(Const::from_str("0101").unwrap()));
        assert_eq!(param(r#""01 ""#), ParamValue::String("01".into()));
        assert_eq!(param(r#""hello""#), ParamValue::String("hello".into()));
        assert_eq!(param("12"), ParamValue::Int(12));

        for value in [
            ParamValue::String("01".into()),
            ParamValue::String("".into()),
            ParamValue::String("text ".into()),
            ParamValue::Const(Const::from_str("1x0").unwrap()),
            ParamValue::Int(-3),
        ] {
            assert_eq!(param_from_json(&param_to_json(&value)), Some(value));
        }
    }
}

use crate::{Const, Trit};
use std::fmt::Display;

/// The value of a cell parameter, or of a wire, cell, or module attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamValue {
    Const(Const),
    Int(i64),
    String(String),
}

impl ParamValue {
    pub fn as_const(&self) -> Option<Const> {
        match self {
            ParamValue::Const(value) => Some(value.clone()),
            ParamValue::Int(value) => Some(Const::from_uint(*value as u64, 32)),
            ParamValue::String(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Const(value) => value.as_uint().map(|value| value as i64),
            ParamValue::Int(value) => Some(*value),
            ParamValue::String(_) => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            ParamValue::Const(value) => value.as_bool(),
            ParamValue::Int(value) => *value != 0,
            ParamValue::String(_) => false,
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Const(Trit::from(value).into())
    }
}

impl From<Trit> for ParamValue {
    fn from(value: Trit) -> Self {
        Self::Const(value.into())
    }
}

impl From<Const> for ParamValue {
    fn from(value: Const) -> Self {
        Self::Const(value)
    }
}

impl From<&Const> for ParamValue {
    fn from(value: &Const) -> Self {
        Self::Const(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

pub(crate) fn write_string(f: &mut std::fmt::Formatter, value: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for chr in value.chars() {
        match chr {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            chr if chr.is_ascii_graphic() || chr == ' ' => write!(f, "{chr}")?,
            chr => {
                let mut buffer = [0u8; 4];
                for byte in chr.encode_utf8(&mut buffer).bytes() {
                    write!(f, "\\{byte:03o}")?;
                }
            }
        }
    }
    write!(f, "\"")
}

/// Formats the value in RTLIL syntax.
impl Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Const(value) => write!(f, "{value}"),
            ParamValue::Int(value) => write!(f, "{value}"),
            ParamValue::String(value) => write_string(f, value),
        }
    }
}

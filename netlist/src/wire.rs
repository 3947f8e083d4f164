use indexmap::IndexMap;

use crate::{Const, ParamValue};

/// Identifies a wire within its [`Module`]. Wire identifiers are never reused.
///
/// [`Module`]: crate::Module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WireId(u32);

impl WireId {
    pub fn from_index(index: usize) -> WireId {
        assert!(index <= u32::MAX as usize);
        WireId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named, fixed-width bit vector within a module.
///
/// Bit `0` of a wire is always its least significant bit; this is the *raw* index. The *declared*
/// index is the one used by the HDL source, and is described by `start_offset` and `upto`:
///
/// - for `[7:0]`, `start_offset` is 0 and `upto` is false,
/// - for `[10:3]`, `start_offset` is 3 and `upto` is false,
/// - for `[0:7]`, `start_offset` is 0 and `upto` is true.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    pub name: String,
    pub width: usize,
    pub start_offset: i64,
    pub upto: bool,
    /// Position in the module port list, or 0 if the wire is not a port.
    pub port_id: usize,
    pub port_input: bool,
    pub port_output: bool,
    pub attributes: IndexMap<String, ParamValue>,
}

impl Wire {
    pub const INIT: &'static str = "\\init";

    pub fn new(name: impl Into<String>, width: usize) -> Self {
        Wire {
            name: name.into(),
            width,
            start_offset: 0,
            upto: false,
            port_id: 0,
            port_input: false,
            port_output: false,
            attributes: IndexMap::new(),
        }
    }

    pub fn with_start_offset(self, start_offset: i64) -> Self {
        Self { start_offset, ..self }
    }

    pub fn with_upto(self, upto: bool) -> Self {
        Self { upto, ..self }
    }

    pub fn with_input(self, port_id: usize) -> Self {
        Self { port_id, port_input: true, ..self }
    }

    pub fn with_output(self, port_id: usize) -> Self {
        Self { port_id, port_output: true, ..self }
    }

    pub fn with_init(mut self, value: impl Into<Const>) -> Self {
        let value = value.into();
        assert_eq!(value.len(), self.width);
        self.attributes.insert(Self::INIT.into(), ParamValue::Const(value));
        self
    }

    pub fn is_port(&self) -> bool {
        self.port_id != 0
    }

    /// Returns `true` for names that come from the HDL, as opposed to generated ones.
    pub fn is_public(&self) -> bool {
        self.name.starts_with('\\')
    }

    /// Converts a declared (HDL) bit index into a raw offset, or `None` if the index does not
    /// refer to a bit of this wire.
    pub fn from_hdl_index(&self, hdl_index: i64) -> Option<usize> {
        let zero_index = hdl_index.checked_sub(self.start_offset)?;
        let raw_index = if self.upto { (self.width as i64 - 1).checked_sub(zero_index)? } else { zero_index };
        if raw_index >= 0 && raw_index < self.width as i64 { Some(raw_index as usize) } else { None }
    }

    /// Converts a raw offset into the declared (HDL) bit index.
    pub fn to_hdl_index(&self, offset: usize) -> i64 {
        assert!(offset < self.width);
        let zero_index = if self.upto { self.width - 1 - offset } else { offset };
        zero_index as i64 + self.start_offset
    }

    pub fn init_value(&self) -> Option<Const> {
        self.attributes.get(Self::INIT).and_then(ParamValue::as_const)
    }
}

use indexmap::IndexMap;

use crate::{Const, ControlNet, ParamValue, Value};

mod types;
mod flip_flop;

pub use types::{CellTypes, PortDirection};
pub use flip_flop::FlipFlop;

/// Identifies a cell within its [`Module`]. Cell identifiers are never reused.
///
/// [`Module`]: crate::Module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u32);

impl CellId {
    pub fn from_index(index: usize) -> CellId {
        assert!(index <= u32::MAX as usize);
        CellId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named instance of a cell type, with parameters and port connections.
///
/// Whether a port is an input or an output is not recorded in the cell; it is a property of the cell
/// type, and is looked up in [`CellTypes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub name: String,
    pub kind: String,
    pub parameters: IndexMap<String, ParamValue>,
    pub attributes: IndexMap<String, ParamValue>,
    pub connections: IndexMap<String, Value>,
}

impl Cell {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Cell {
            name: name.into(),
            kind: kind.into(),
            parameters: IndexMap::new(),
            attributes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.set_param(name, value);
        self
    }

    pub fn with_port(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_port(name, value);
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    pub fn param_bool(&self, name: &str) -> bool {
        self.param(name).map(ParamValue::as_bool).unwrap_or(false)
    }

    pub fn param_const(&self, name: &str) -> Option<Const> {
        self.param(name).and_then(ParamValue::as_const)
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<ParamValue>) {
        self.parameters.insert(name.into(), value.into());
    }

    pub fn has_port(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn port(&self, name: &str) -> Option<&Value> {
        self.connections.get(name)
    }

    pub fn set_port(&mut self, name: &str, value: impl Into<Value>) {
        self.connections.insert(name.into(), value.into());
    }

    /// Reads a single-bit control port together with its polarity parameter.
    pub fn control_port(&self, port: &str, polarity: &str) -> Option<ControlNet> {
        let net = self.port(port)?.as_net()?;
        Some(ControlNet::from_net_invert(net, !self.param_bool(polarity)))
    }

    /// Writes a single-bit control port together with its polarity parameter.
    pub fn set_control_port(&mut self, port: &str, polarity: &str, control: ControlNet) {
        self.set_port(port, control.net());
        self.set_param(polarity, control.is_positive());
    }
}

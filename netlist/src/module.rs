use indexmap::IndexMap;

use crate::{Cell, CellId, ControlNet, Net, ParamValue, Trit, Value, Wire, WireId};

/// A module: a set of named wires, a set of named cells whose ports connect to wire bits, and
/// a list of direct connections between wire bits.
///
/// Wires and cells are stored in insertion order and are never removed, so a [`WireId`] or
/// a [`CellId`] stays valid for the lifetime of the module.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    pub attributes: IndexMap<String, ParamValue>,
    wires: IndexMap<String, Wire>,
    cells: IndexMap<String, Cell>,
    connections: Vec<(Value, Value)>,
    next_name: usize,
}

/// A maximal run of a [`Value`] that is either constant or refers to consecutive bits of one wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Chunk {
    Const(Vec<Trit>),
    Wire { wire: WireId, offset: usize, width: usize },
}

pub(crate) fn chunks(value: &Value) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();
    for net in value {
        match (chunks.last_mut(), net) {
            (Some(Chunk::Const(trits)), Net::Const(trit)) => trits.push(trit),
            (Some(Chunk::Wire { wire, offset, width }), Net::Wire(net_wire, net_offset))
                if *wire == net_wire && *offset + *width == net_offset as usize =>
            {
                *width += 1
            }
            (_, Net::Const(trit)) => chunks.push(Chunk::Const(vec![trit])),
            (_, Net::Wire(wire, offset)) => chunks.push(Chunk::Wire { wire, offset: offset as usize, width: 1 }),
        }
    }
    chunks
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            attributes: IndexMap::new(),
            wires: IndexMap::new(),
            cells: IndexMap::new(),
            connections: Vec::new(),
            next_name: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn wire_ids(&self) -> impl DoubleEndedIterator<Item = WireId> + ExactSizeIterator + use<> {
        (0..self.wires.len()).map(WireId::from_index)
    }

    pub fn cell_ids(&self) -> impl DoubleEndedIterator<Item = CellId> + ExactSizeIterator + use<> {
        (0..self.cells.len()).map(CellId::from_index)
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires.values().enumerate().map(|(index, wire)| (WireId::from_index(index), wire))
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.values().enumerate().map(|(index, cell)| (CellId::from_index(index), cell))
    }

    pub fn wire(&self, wire_id: WireId) -> &Wire {
        &self.wires[wire_id.index()]
    }

    pub fn wire_mut(&mut self, wire_id: WireId) -> &mut Wire {
        &mut self.wires[wire_id.index()]
    }

    pub fn cell(&self, cell_id: CellId) -> &Cell {
        &self.cells[cell_id.index()]
    }

    /// Returns a cell for modification. The name of the cell must not be changed.
    pub fn cell_mut(&mut self, cell_id: CellId) -> &mut Cell {
        &mut self.cells[cell_id.index()]
    }

    pub fn find_wire(&self, name: &str) -> Option<WireId> {
        self.wires.get_index_of(name).map(WireId::from_index)
    }

    pub fn find_cell(&self, name: &str) -> Option<CellId> {
        self.cells.get_index_of(name).map(CellId::from_index)
    }

    /// Returns all bits of a wire, least significant first.
    pub fn wire_value(&self, wire_id: WireId) -> Value {
        Value::from_wire(wire_id, self.wire(wire_id).width)
    }

    pub fn connections(&self) -> &[(Value, Value)] {
        &self.connections
    }

    fn is_name_used(&self, name: &str) -> bool {
        self.wires.contains_key(name) || self.cells.contains_key(name)
    }

    /// Allocates a name that is not used by any wire or cell of this module.
    pub fn new_name(&mut self) -> String {
        loop {
            let name = format!("$abstract${}", self.next_name);
            self.next_name += 1;
            if !self.is_name_used(&name) {
                return name;
            }
        }
    }

    pub fn add_wire(&mut self, wire: Wire) -> WireId {
        assert!(!self.wires.contains_key(&wire.name), "wire {} already exists in module {}", wire.name, self.name);
        let (index, _) = self.wires.insert_full(wire.name.clone(), wire);
        WireId::from_index(index)
    }

    /// Adds an internal wire with a fresh name, and returns all of its bits.
    pub fn add_fresh_wire(&mut self, width: usize) -> Value {
        let name = self.new_name();
        let wire_id = self.add_wire(Wire::new(name, width));
        self.wire_value(wire_id)
    }

    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        assert!(!self.cells.contains_key(&cell.name), "cell {} already exists in module {}", cell.name, self.name);
        let (index, _) = self.cells.insert_full(cell.name.clone(), cell);
        CellId::from_index(index)
    }

    /// Records that `lhs` is driven by `rhs`.
    pub fn connect(&mut self, lhs: impl Into<Value>, rhs: impl Into<Value>) {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        assert_eq!(lhs.len(), rhs.len(), "connection width mismatch in module {}", self.name);
        if !lhs.is_empty() {
            self.connections.push((lhs, rhs));
        }
    }

    /// Adds a `$anyseq` cell, whose output takes an unconstrained value on every step.
    pub fn add_anyseq(&mut self, width: usize) -> Value {
        let output = self.add_fresh_wire(width);
        let name = self.new_name();
        self.add_cell(Cell::new(name, "$anyseq").with_param("WIDTH", width).with_port("Y", &output));
        output
    }

    /// Returns a value that is `if_active` when `select` is active, and `if_inactive` otherwise.
    pub fn add_mux(
        &mut self,
        select: impl Into<ControlNet>,
        if_active: impl Into<Value>,
        if_inactive: impl Into<Value>,
    ) -> Value {
        let select = select.into();
        let (if_active, if_inactive) = (if_active.into(), if_inactive.into());
        assert_eq!(if_active.len(), if_inactive.len());
        match select.is_active() {
            Some(true) => if_active,
            Some(false) => if_inactive,
            None if if_active == if_inactive => if_active,
            None => {
                let output = self.add_fresh_wire(if_active.len());
                self.add_mux_into(select, if_active, if_inactive, &output);
                output
            }
        }
    }

    /// Adds a `$mux` cell driving `output`, selecting `if_active` when `select` is active.
    pub fn add_mux_into(
        &mut self,
        select: impl Into<ControlNet>,
        if_active: impl Into<Value>,
        if_inactive: impl Into<Value>,
        output: impl Into<Value>,
    ) -> CellId {
        let (if_active, if_inactive, output) = (if_active.into(), if_inactive.into(), output.into());
        assert_eq!(if_active.len(), output.len());
        assert_eq!(if_inactive.len(), output.len());
        let (select, a, b) = match select.into() {
            ControlNet::Pos(net) => (net, if_inactive, if_active),
            ControlNet::Neg(net) => (net, if_active, if_inactive),
        };
        let name = self.new_name();
        self.add_cell(
            Cell::new(name, "$mux")
                .with_param("WIDTH", output.len())
                .with_port("A", a)
                .with_port("B", b)
                .with_port("S", select)
                .with_port("Y", output),
        )
    }

    /// Formats a single bit for diagnostics, e.g. `\q [2]` or `1'0`.
    pub fn display_net(&self, net: Net) -> String {
        self.display_value(&Value::from(net))
    }

    /// Formats a value for diagnostics, using wire names and raw bit offsets.
    pub fn display_value(&self, value: &Value) -> String {
        let parts: Vec<String> = chunks(value)
            .into_iter()
            .rev()
            .map(|chunk| match chunk {
                Chunk::Const(trits) => crate::Const::from(trits).to_string(),
                Chunk::Wire { wire, offset, width } => {
                    let wire = self.wire(wire);
                    if offset == 0 && width == wire.width {
                        wire.name.clone()
                    } else if width == 1 {
                        format!("{} [{}]", wire.name, offset)
                    } else {
                        format!("{} [{}:{}]", wire.name, offset + width - 1, offset)
                    }
                }
            })
            .collect();
        match parts.len() {
            0 => "{ }".to_string(),
            1 => parts.into_iter().next().unwrap_or_default(),
            _ => format!("{{ {} }}", parts.join(" ")),
        }
    }
}

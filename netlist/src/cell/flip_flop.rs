use indexmap::IndexMap;

use crate::{Cell, CellId, Const, ControlNet, Module, ParamValue, Value};

/// A uniform view of a coarse-grained flip-flop cell.
///
/// The output is determined by the following rules:
///
/// - whenever `load` is active, the output is set to `load_data`
/// - whenever `clear` is active, the output is set to `clear_value`
/// - on the active edge of `clock` (or on every step of the global clock, if `clock` is absent):
///   - if `reset` is active and `reset_over_enable` is true, the output is set to `reset_value`
///   - if `enable` is not active, the output is unchanged
///   - if `reset` is active and `reset_over_enable` is false, the output is set to `reset_value`
///   - otherwise, the output is set to `data`
///
/// A flip-flop is read from its cell with [`FlipFlop::from_cell`], simplified with the `unmap_*`
/// methods, and written back to the same cell with [`FlipFlop::emit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipFlop {
    pub cell: CellId,
    pub name: String,
    pub attributes: IndexMap<String, ParamValue>,

    pub output: Value,
    pub data: Value,
    /// Absent for flip-flops clocked by the global (formal) clock.
    pub clock: Option<ControlNet>,
    pub enable: ControlNet,

    pub reset: ControlNet,
    pub reset_over_enable: bool,
    pub reset_value: Const,

    pub clear: ControlNet,
    pub clear_value: Const,

    pub load: ControlNet,
    pub load_data: Value,

    /// Per-bit set and clear controls of `$dffsr`, `$dffsre`, `$sr`, and `$dlatchsr` cells; these
    /// are not normalized.
    pub set_reset: Option<(Value, Value)>,
}

impl FlipFlop {
    pub fn new(cell: CellId, name: impl Into<String>, output: Value, data: Value, clock: Option<ControlNet>) -> Self {
        assert_eq!(output.len(), data.len());
        let size = output.len();
        FlipFlop {
            cell,
            name: name.into(),
            attributes: IndexMap::new(),
            output,
            data,
            clock,
            enable: ControlNet::ONE,
            reset: ControlNet::ZERO,
            reset_over_enable: false,
            reset_value: Const::undef(size),
            clear: ControlNet::ZERO,
            clear_value: Const::undef(size),
            load: ControlNet::ZERO,
            load_data: Value::undef(size),
            set_reset: None,
        }
    }

    /// Reads the flip-flop stored in cell `cell_id` of `module`. Returns `None` if the cell is not
    /// a flip-flop, or is malformed.
    ///
    /// The `$sr` and `$dlatchsr` cells have no clock and are read as flip-flops on the global clock
    /// (with `$sr` holding its output); only their set and clear controls are meaningful.
    pub fn from_cell(module: &Module, cell_id: CellId) -> Option<FlipFlop> {
        let cell = module.cell(cell_id);
        let output = cell.port("Q")?.clone();
        let data = match cell.kind.as_str() {
            "$sr" => output.clone(),
            _ => cell.port("D")?.clone(),
        };
        if output.len() != data.len() {
            return None;
        }
        let size = output.len();
        let clock = match cell.kind.as_str() {
            "$ff" | "$sr" | "$dlatchsr" => None,
            _ => Some(cell.control_port("CLK", "CLK_POLARITY")?),
        };
        let mut flip_flop = FlipFlop::new(cell_id, &cell.name, output, data, clock);
        flip_flop.attributes = cell.attributes.clone();
        let (has_enable, has_reset, has_clear, has_load, has_set_reset) = match cell.kind.as_str() {
            "$ff" | "$dff" => (false, false, false, false, false),
            "$dffe" => (true, false, false, false, false),
            "$adff" => (false, false, true, false, false),
            "$adffe" => (true, false, true, false, false),
            "$sdff" => (false, true, false, false, false),
            "$sdffe" | "$sdffce" => (true, true, false, false, false),
            "$aldff" => (false, false, false, true, false),
            "$aldffe" => (true, false, false, true, false),
            "$dffsr" => (false, false, false, false, true),
            "$dffsre" | "$dlatchsr" => (true, false, false, false, true),
            "$sr" => (false, false, false, false, true),
            _ => return None,
        };
        if has_enable {
            flip_flop.enable = cell.control_port("EN", "EN_POLARITY")?;
        }
        if has_reset {
            flip_flop.reset = cell.control_port("SRST", "SRST_POLARITY")?;
            flip_flop.reset_value = fit_const(cell.param_const("SRST_VALUE")?, size);
            flip_flop.reset_over_enable = cell.kind != "$sdffce";
        }
        if has_clear {
            flip_flop.clear = cell.control_port("ARST", "ARST_POLARITY")?;
            flip_flop.clear_value = fit_const(cell.param_const("ARST_VALUE")?, size);
        }
        if has_load {
            flip_flop.load = cell.control_port("ALOAD", "ALOAD_POLARITY")?;
            flip_flop.load_data = cell.port("AD")?.clone();
            if flip_flop.load_data.len() != size {
                return None;
            }
        }
        if has_set_reset {
            let set = cell.port("SET")?.clone();
            let clr = cell.port("CLR")?.clone();
            if set.len() != size || clr.len() != size {
                return None;
            }
            flip_flop.set_reset = Some((set, clr));
        }
        Some(flip_flop)
    }

    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    pub fn has_enable(&self) -> bool {
        !self.enable.is_always(true)
    }

    pub fn has_reset(&self) -> bool {
        !self.reset.is_always(false)
    }

    pub fn has_clear(&self) -> bool {
        !self.clear.is_always(false)
    }

    pub fn has_load(&self) -> bool {
        !self.load.is_always(false)
    }

    pub fn has_set_reset(&self) -> bool {
        self.set_reset.is_some()
    }

    /// Rewrites the clock enable into a multiplexer feeding `data`.
    pub fn unmap_enable(&mut self, module: &mut Module) {
        if !self.has_enable() {
            return;
        }
        if self.has_reset() && !self.reset_over_enable {
            self.unmap_reset(module);
        }
        self.data = module.add_mux(self.enable, &self.data, &self.output);
        self.enable = ControlNet::ONE;
    }

    /// Rewrites the synchronous reset into a multiplexer feeding `data`.
    pub fn unmap_reset(&mut self, module: &mut Module) {
        if !self.has_reset() {
            return;
        }
        if self.has_enable() && self.reset_over_enable {
            self.unmap_enable(module);
        }
        self.data = module.add_mux(self.reset, Value::from(&self.reset_value), &self.data);
        self.reset = ControlNet::ZERO;
        self.reset_value = Const::undef(self.output_len());
    }

    /// Rewrites the asynchronous reset into an asynchronous load of the reset value.
    pub fn clear_to_load(&mut self) {
        if !self.has_clear() {
            return;
        }
        assert!(!self.has_load(), "flip-flop {} has both an asynchronous reset and load", self.name);
        self.load = self.clear;
        self.load_data = Value::from(&self.clear_value);
        self.clear = ControlNet::ZERO;
        self.clear_value = Const::undef(self.output_len());
    }

    fn cell_kind(&self) -> &'static str {
        assert!(!self.has_set_reset(), "flip-flop {} with set/reset controls cannot be emitted", self.name);
        assert!(!(self.has_load() && self.has_clear()), "flip-flop {} has both an asynchronous reset and load", self.name);
        assert!(!(self.has_reset() && (self.has_load() || self.has_clear())));
        match self.clock {
            None => {
                assert!(!self.has_enable() && !self.has_reset() && !self.has_clear() && !self.has_load());
                "$ff"
            }
            Some(_) if self.has_load() => if self.has_enable() { "$aldffe" } else { "$aldff" },
            Some(_) if self.has_clear() => if self.has_enable() { "$adffe" } else { "$adff" },
            Some(_) if self.has_reset() => match (self.has_enable(), self.reset_over_enable) {
                (false, _) => "$sdff",
                (true, true) => "$sdffe",
                (true, false) => "$sdffce",
            },
            Some(_) => if self.has_enable() { "$dffe" } else { "$dff" },
        }
    }

    /// Writes the flip-flop back into its cell, replacing the cell type, parameters, and connections.
    pub fn emit(&self, module: &mut Module) {
        let kind = self.cell_kind();
        let mut cell = Cell::new(&self.name, kind).with_param("WIDTH", self.output_len());
        cell.attributes = self.attributes.clone();
        if let Some(clock) = self.clock {
            cell.set_control_port("CLK", "CLK_POLARITY", clock);
        }
        if self.has_load() {
            cell.set_control_port("ALOAD", "ALOAD_POLARITY", self.load);
            cell.set_port("AD", &self.load_data);
        }
        if self.has_clear() {
            cell.set_control_port("ARST", "ARST_POLARITY", self.clear);
            cell.set_param("ARST_VALUE", &self.clear_value);
        }
        if self.has_reset() {
            cell.set_control_port("SRST", "SRST_POLARITY", self.reset);
            cell.set_param("SRST_VALUE", &self.reset_value);
        }
        if self.has_enable() {
            cell.set_control_port("EN", "EN_POLARITY", self.enable);
        }
        cell.set_port("D", &self.data);
        cell.set_port("Q", &self.output);
        *module.cell_mut(self.cell) = cell;
    }
}

fn fit_const(value: Const, size: usize) -> Const {
    if value.len() >= size {
        value.slice(..size)
    } else {
        value.concat(Const::zero(size - value.len()))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{CellTypes, Const, ControlNet, Design, FlipFlop, Net, Value};

    fn design() -> Design {
        Design::from_str(concat!(
            "module \\top\n",
            "  wire \\clk\n",
            "  wire \\en\n",
            "  wire \\rst\n",
            "  wire width 2 \\d\n",
            "  wire width 2 \\q\n",
            "  cell $sdffe \\ff\n",
            "    parameter \\WIDTH 2\n",
            "    parameter \\CLK_POLARITY 1\n",
            "    parameter \\EN_POLARITY 0\n",
            "    parameter \\SRST_POLARITY 1\n",
            "    parameter \\SRST_VALUE 2'10\n",
            "    connect \\CLK \\clk\n",
            "    connect \\EN \\en\n",
            "    connect \\SRST \\rst\n",
            "    connect \\D \\d\n",
            "    connect \\Q \\q\n",
            "  end\n",
            "end\n",
        ))
        .unwrap()
    }

    #[test]
    fn test_from_cell() {
        let design = design();
        let module = design.module("\\top").unwrap();
        let cell_id = module.find_cell("\\ff").unwrap();
        let flip_flop = FlipFlop::from_cell(module, cell_id).unwrap();
        let en = module.find_wire("\\en").unwrap();
        assert_eq!(flip_flop.enable, ControlNet::Neg(Net::wire(en, 0)));
        assert!(flip_flop.has_reset());
        assert!(flip_flop.reset_over_enable);
        assert_eq!(flip_flop.reset_value, Const::from_str("10").unwrap());
        assert!(!flip_flop.has_clear());
        assert!(!flip_flop.has_set_reset());
    }

    #[test]
    fn test_unmap() {
        let mut design = design();
        let module = design.module_mut("\\top").unwrap();
        let cell_id = module.find_cell("\\ff").unwrap();
        let mut flip_flop = FlipFlop::from_cell(module, cell_id).unwrap();
        let cell_count = module.cell_count();
        flip_flop.unmap_reset(module);
        assert!(!flip_flop.has_enable());
        assert!(!flip_flop.has_reset());
        assert_eq!(module.cell_count(), cell_count + 2);
        flip_flop.emit(module);
        let cell = module.cell(cell_id);
        assert_eq!(cell.kind, "$dff");
        assert_eq!(cell.port("D"), Some(&flip_flop.data));
        assert!(CellTypes::internals().is_flip_flop(&cell.kind));
    }

    #[test]
    fn test_clear_to_load() {
        let mut design = design();
        let module = design.module_mut("\\top").unwrap();
        let rst = Net::wire(module.find_wire("\\rst").unwrap(), 0);
        let cell_id = module.find_cell("\\ff").unwrap();
        let mut flip_flop = FlipFlop::from_cell(module, cell_id).unwrap();
        flip_flop.unmap_reset(module);
        flip_flop.clear = ControlNet::Pos(rst);
        flip_flop.clear_value = Const::from_str("01").unwrap();
        flip_flop.clear_to_load();
        assert!(!flip_flop.has_clear());
        assert_eq!(flip_flop.load, ControlNet::Pos(rst));
        assert_eq!(flip_flop.load_data, Value::from(Const::from_str("01").unwrap()));
        flip_flop.emit(module);
        assert_eq!(module.cell(cell_id).kind, "$aldff");
    }

    #[test]
    fn test_set_reset_cells() {
        let design = Design::from_str(concat!(
            "module \\top\n",
            "  wire width 2 \\set\n",
            "  wire width 2 \\clr\n",
            "  wire width 2 \\q\n",
            "  cell $sr \\sr\n",
            "    parameter \\WIDTH 2\n",
            "    parameter \\SET_POLARITY 1\n",
            "    parameter \\CLR_POLARITY 0\n",
            "    connect \\SET \\set\n",
            "    connect \\CLR \\clr\n",
            "    connect \\Q \\q\n",
            "  end\n",
            "  cell $sr \\narrow\n",
            "    parameter \\WIDTH 2\n",
            "    connect \\SET \\set [0]\n",
            "    connect \\CLR \\clr\n",
            "    connect \\Q \\q\n",
            "  end\n",
            "end\n",
        ))
        .unwrap();
        let module = design.module("\\top").unwrap();
        let flip_flop = FlipFlop::from_cell(module, module.find_cell("\\sr").unwrap()).unwrap();
        let wire = |name: &str| module.wire_value(module.find_wire(name).unwrap());
        assert!(flip_flop.has_set_reset());
        assert_eq!(flip_flop.set_reset, Some((wire("\\set"), wire("\\clr"))));
        assert_eq!(flip_flop.clock, None);
        assert_eq!(flip_flop.data, wire("\\q"));
        assert_eq!(FlipFlop::from_cell(module, module.find_cell("\\narrow").unwrap()), None);
    }
}

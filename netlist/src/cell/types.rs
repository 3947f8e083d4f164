use indexmap::IndexMap;

use crate::{Cell, Design};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
    InOut,
}

#[derive(Debug, Clone, Default)]
struct CellType {
    ports: IndexMap<String, PortDirection>,
    is_flip_flop: bool,
}

/// A table of cell types, answering which ports of a cell are inputs or outputs, and which
/// cells hold state.
///
/// The table covers the internal cells (`$and`, `$alu`, `$dff`, `$memrd`, ...) and the
/// fine-grained cells (`$_AND_`, `$_DFF_P_`, ...), and may be extended with the modules of a
/// design, so that ports of hierarchical instances are classified according to the direction of
/// the corresponding module port.
#[derive(Debug, Clone, Default)]
pub struct CellTypes {
    types: IndexMap<String, CellType>,
}

const UNARY: &[&str] = &[
    "$not", "$pos", "$neg", "$reduce_and", "$reduce_or", "$reduce_xor", "$reduce_xnor", "$reduce_bool",
    "$logic_not", "$slice", "$lut", "$sop", "$get_tag", "$original_tag", "$future_ff",
];

const BINARY: &[&str] = &[
    "$and", "$or", "$xor", "$xnor", "$shl", "$shr", "$sshl", "$sshr", "$shift", "$shiftx", "$lt", "$le", "$eq",
    "$ne", "$eqx", "$nex", "$ge", "$gt", "$add", "$sub", "$mul", "$div", "$mod", "$divfloor", "$modfloor", "$pow",
    "$logic_and", "$logic_or", "$concat", "$macc", "$bweqx", "$equiv",
];

/// Cell types with a single output `Y`, and the given inputs.
const COMBINATIONAL: &[(&str, &[&str])] = &[
    ("$macc_v2", &["A", "B", "C"]),
    ("$mux", &["A", "B", "S"]),
    ("$pmux", &["A", "B", "S"]),
    ("$bwmux", &["A", "B", "S"]),
    ("$bmux", &["A", "S"]),
    ("$demux", &["A", "S"]),
    ("$tribuf", &["A", "EN"]),
    ("$set_tag", &["A", "SET", "CLR"]),
    ("$anyconst", &[]),
    ("$anyseq", &[]),
    ("$allconst", &[]),
    ("$allseq", &[]),
    ("$initstate", &[]),
    ("$input_port", &[]),
];

/// Cell types without outputs.
const SINKS: &[(&str, &[&str])] = &[
    ("$assert", &["A", "EN"]),
    ("$assume", &["A", "EN"]),
    ("$live", &["A", "EN"]),
    ("$fair", &["A", "EN"]),
    ("$cover", &["A", "EN"]),
    ("$check", &["A", "EN", "ARGS", "TRG"]),
    ("$print", &["EN", "ARGS", "TRG"]),
    ("$overwrite_tag", &["A", "SET", "CLR"]),
    ("$specify2", &["EN", "SRC", "DST"]),
    ("$specify3", &["EN", "SRC", "DST", "DAT"]),
    ("$specrule", &["EN_SRC", "EN_DST", "SRC", "DST"]),
    ("$connect", &["A", "B"]),
    ("$scopeinfo", &[]),
    ("$memwr", &["CLK", "EN", "ADDR", "DATA"]),
    ("$memwr_v2", &["CLK", "EN", "ADDR", "DATA"]),
    ("$meminit", &["ADDR", "DATA"]),
    ("$meminit_v2", &["ADDR", "DATA", "EN"]),
];

/// Cell types with several outputs, given as `(kind, inputs, outputs)`.
const MULTI_OUTPUT: &[(&str, &[&str], &[&str])] = &[
    ("$alu", &["A", "B", "CI", "BI"], &["X", "Y", "CO"]),
    ("$lcu", &["P", "G", "CI"], &["CO"]),
    ("$fa", &["A", "B", "C"], &["X", "Y"]),
    ("$memrd", &["CLK", "EN", "ADDR"], &["DATA"]),
    ("$memrd_v2", &["CLK", "EN", "ARST", "SRST", "ADDR"], &["DATA"]),
    ("$mem", &["RD_CLK", "RD_EN", "RD_ADDR", "WR_CLK", "WR_EN", "WR_ADDR", "WR_DATA"], &["RD_DATA"]),
    (
        "$mem_v2",
        &["RD_CLK", "RD_EN", "RD_ARST", "RD_SRST", "RD_ADDR", "WR_CLK", "WR_EN", "WR_ADDR", "WR_DATA"],
        &["RD_DATA"],
    ),
    ("$fsm", &["CLK", "ARST", "CTRL_IN"], &["CTRL_OUT"]),
    ("$dlatch", &["EN", "D"], &["Q"]),
    ("$adlatch", &["EN", "ARST", "D"], &["Q"]),
];

/// Coarse-grained flip-flops; these are the cells a state abstraction looks at.
const FLIP_FLOPS: &[(&str, &[&str])] = &[
    ("$ff", &["D"]),
    ("$dff", &["CLK", "D"]),
    ("$dffe", &["CLK", "EN", "D"]),
    ("$adff", &["CLK", "ARST", "D"]),
    ("$adffe", &["CLK", "ARST", "EN", "D"]),
    ("$sdff", &["CLK", "SRST", "D"]),
    ("$sdffe", &["CLK", "SRST", "EN", "D"]),
    ("$sdffce", &["CLK", "SRST", "EN", "D"]),
    ("$aldff", &["CLK", "ALOAD", "AD", "D"]),
    ("$aldffe", &["CLK", "ALOAD", "AD", "EN", "D"]),
    ("$dffsr", &["CLK", "SET", "CLR", "D"]),
    ("$dffsre", &["CLK", "SET", "CLR", "EN", "D"]),
    ("$sr", &["SET", "CLR"]),
    ("$dlatchsr", &["EN", "SET", "CLR", "D"]),
];

/// Fine-grained gates with output `Y`.
const GATES: &[(&str, &[&str])] = &[
    ("$_BUF_", &["A"]),
    ("$_NOT_", &["A"]),
    ("$_AND_", &["A", "B"]),
    ("$_NAND_", &["A", "B"]),
    ("$_OR_", &["A", "B"]),
    ("$_NOR_", &["A", "B"]),
    ("$_XOR_", &["A", "B"]),
    ("$_XNOR_", &["A", "B"]),
    ("$_ANDNOT_", &["A", "B"]),
    ("$_ORNOT_", &["A", "B"]),
    ("$_MUX_", &["A", "B", "S"]),
    ("$_NMUX_", &["A", "B", "S"]),
    ("$_AOI3_", &["A", "B", "C"]),
    ("$_OAI3_", &["A", "B", "C"]),
    ("$_AOI4_", &["A", "B", "C", "D"]),
    ("$_OAI4_", &["A", "B", "C", "D"]),
    ("$_MUX4_", &["A", "B", "C", "D", "S", "T"]),
    ("$_MUX8_", &["A", "B", "C", "D", "E", "F", "G", "H", "S", "T", "U"]),
    (
        "$_MUX16_",
        &["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "S", "T", "U", "V"],
    ),
    ("$_TBUF_", &["A", "E"]),
];

const POLARITY: &str = "NP";
const RESET_VALUE: &str = "01";

/// Fine-grained storage cells with output `Q`, given as `(prefix, parameter letters, inputs)`.
/// Each cell name is the prefix followed by one letter from each set and a final `_`.
const STORAGE_GATES: &[(&str, &[&str], &[&str])] = &[
    ("$_FF", &[], &["D"]),
    ("$_SR_", &[POLARITY, POLARITY], &["S", "R"]),
    ("$_DFF_", &[POLARITY], &["C", "D"]),
    ("$_DFFE_", &[POLARITY, POLARITY], &["C", "D", "E"]),
    ("$_DFF_", &[POLARITY, POLARITY, RESET_VALUE], &["C", "R", "D"]),
    ("$_DFFE_", &[POLARITY, POLARITY, RESET_VALUE, POLARITY], &["C", "R", "D", "E"]),
    ("$_ALDFF_", &[POLARITY, POLARITY], &["C", "L", "AD", "D"]),
    ("$_ALDFFE_", &[POLARITY, POLARITY, POLARITY], &["C", "L", "AD", "D", "E"]),
    ("$_DFFSR_", &[POLARITY, POLARITY, POLARITY], &["C", "S", "R", "D"]),
    ("$_DFFSRE_", &[POLARITY, POLARITY, POLARITY, POLARITY], &["C", "S", "R", "D", "E"]),
    ("$_SDFF_", &[POLARITY, POLARITY, RESET_VALUE], &["C", "R", "D"]),
    ("$_SDFFE_", &[POLARITY, POLARITY, RESET_VALUE, POLARITY], &["C", "R", "D", "E"]),
    ("$_SDFFCE_", &[POLARITY, POLARITY, RESET_VALUE, POLARITY], &["C", "R", "D", "E"]),
    ("$_DLATCH_", &[POLARITY], &["E", "D"]),
    ("$_DLATCH_", &[POLARITY, POLARITY, RESET_VALUE], &["E", "R", "D"]),
    ("$_DLATCHSR_", &[POLARITY, POLARITY, POLARITY], &["E", "S", "R", "D"]),
];

/// Expands `$_DFF_` with `["NP"]` into `$_DFF_N_` and `$_DFF_P_`.
fn expand_name(prefix: &str, letters: &[&str]) -> Vec<String> {
    let mut names = vec![prefix.to_string()];
    for choices in letters {
        names = names.iter().flat_map(|name| choices.chars().map(move |chr| format!("{name}{chr}"))).collect();
    }
    names.into_iter().map(|name| name + "_").collect()
}

impl CellTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table of the coarse-grained flip-flop cell types only.
    pub fn internals_ff() -> Self {
        let mut types = CellTypes::new();
        for &(kind, inputs) in FLIP_FLOPS {
            types.setup_type(kind, inputs, &["Q"], true);
        }
        types
    }

    /// Creates a table of all internal cell types, memories, and fine-grained cells.
    pub fn internals() -> Self {
        let mut types = CellTypes::internals_ff();
        for &kind in UNARY {
            types.setup_type(kind, &["A"], &["Y"], false);
        }
        for &kind in BINARY {
            types.setup_type(kind, &["A", "B"], &["Y"], false);
        }
        for &(kind, inputs) in COMBINATIONAL.iter().chain(GATES) {
            types.setup_type(kind, inputs, &["Y"], false);
        }
        for &(kind, inputs) in SINKS {
            types.setup_type(kind, inputs, &[], false);
        }
        for &(kind, inputs, outputs) in MULTI_OUTPUT {
            types.setup_type(kind, inputs, outputs, false);
        }
        for &(prefix, letters, inputs) in STORAGE_GATES {
            for kind in expand_name(prefix, letters) {
                types.setup_type(&kind, inputs, &["Q"], false);
            }
        }
        types
    }

    /// Creates a table of all internal cell types and the modules of `design`.
    pub fn with_design(design: &Design) -> Self {
        let mut types = CellTypes::internals();
        types.setup_design(design);
        types
    }

    pub fn setup_type(&mut self, kind: &str, inputs: &[&str], outputs: &[&str], is_flip_flop: bool) {
        let mut cell_type = CellType { ports: IndexMap::new(), is_flip_flop };
        for &input in inputs {
            cell_type.ports.insert(input.into(), PortDirection::Input);
        }
        for &output in outputs {
            cell_type.ports.insert(output.into(), PortDirection::Output);
        }
        self.types.insert(kind.into(), cell_type);
    }

    pub fn setup_design(&mut self, design: &Design) {
        for module in design.modules() {
            let mut cell_type = CellType::default();
            for (_, wire) in module.wires() {
                let direction = match (wire.port_input, wire.port_output) {
                    (true, true) => PortDirection::InOut,
                    (true, false) => PortDirection::Input,
                    (false, true) => PortDirection::Output,
                    (false, false) => continue,
                };
                let port = wire.name.strip_prefix('\\').unwrap_or(&wire.name);
                cell_type.ports.insert(port.into(), direction);
            }
            self.types.insert(module.name().into(), cell_type);
        }
    }

    pub fn is_known(&self, kind: &str) -> bool {
        self.types.contains_key(kind)
    }

    pub fn is_flip_flop(&self, kind: &str) -> bool {
        self.types.get(kind).is_some_and(|cell_type| cell_type.is_flip_flop)
    }

    pub fn port_direction(&self, kind: &str, port: &str) -> Option<PortDirection> {
        self.types.get(kind)?.ports.get(port).copied()
    }

    /// Returns `true` if `port` of `cell` is driven by the cell. Ports of unknown cells are never outputs.
    pub fn is_output(&self, cell: &Cell, port: &str) -> bool {
        matches!(self.port_direction(&cell.kind, port), Some(PortDirection::Output | PortDirection::InOut))
    }

    pub fn is_input(&self, cell: &Cell, port: &str) -> bool {
        matches!(self.port_direction(&cell.kind, port), Some(PortDirection::Input | PortDirection::InOut))
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{Cell, CellTypes, Design, PortDirection};

    #[test]
    fn test_internals() {
        let types = CellTypes::internals();
        assert!(types.is_flip_flop("$dff"));
        assert!(types.is_flip_flop("$sdffce"));
        assert!(!types.is_flip_flop("$mux"));
        assert!(!types.is_flip_flop("$dlatch"));
        let cell = Cell::new("$1", "$mux");
        assert!(types.is_output(&cell, "Y"));
        assert!(types.is_input(&cell, "S"));
        assert!(!types.is_output(&Cell::new("$2", "\\unknown"), "Y"));
    }

    #[test]
    fn test_set_reset_types() {
        let types = CellTypes::internals_ff();
        assert!(types.is_flip_flop("$sr"));
        assert!(types.is_flip_flop("$dlatchsr"));
        assert_eq!(types.port_direction("$sr", "SET"), Some(PortDirection::Input));
        assert_eq!(types.port_direction("$dlatchsr", "Q"), Some(PortDirection::Output));
    }

    #[test]
    fn test_multi_output() {
        let types = CellTypes::internals();
        let alu = Cell::new("$1", "$alu");
        for port in ["X", "Y", "CO"] {
            assert!(types.is_output(&alu, port));
        }
        assert!(types.is_input(&alu, "BI"));
        assert!(types.is_output(&Cell::new("$2", "$memrd_v2"), "DATA"));
        assert!(types.is_output(&Cell::new("$3", "$fsm"), "CTRL_OUT"));
        assert!(types.is_output(&Cell::new("$4", "$fa"), "X"));
        assert_eq!(types.port_direction("$memwr_v2", "DATA"), Some(PortDirection::Input));
    }

    #[test]
    fn test_fine_grained() {
        let types = CellTypes::internals();
        for kind in ["$_DFF_P_", "$_DFF_NP1_", "$_DFFE_PN0N_", "$_SDFFCE_NP1P_", "$_ALDFFE_PNP_", "$_DFFSRE_PNNP_", "$_FF_"] {
            assert!(types.is_output(&Cell::new("$1", kind), "Q"), "{kind}");
            assert!(!types.is_flip_flop(kind), "{kind}");
        }
        assert!(!types.is_known("$_DFF_X_"));
        assert_eq!(types.port_direction("$_DLATCH_P_", "E"), Some(PortDirection::Input));
        assert_eq!(types.port_direction("$_SR_PN_", "R"), Some(PortDirection::Input));
        assert!(types.is_output(&Cell::new("$2", "$_MUX4_"), "Y"));
        assert!(types.is_input(&Cell::new("$3", "$_AOI3_"), "C"));
        assert!(types.is_input(&Cell::new("$4", "$_MUX16_"), "V"));
    }

    #[test]
    fn test_design() {
        let design = Design::from_str(concat!(
            "module \\sub\n",
            "  wire input 1 \\a\n",
            "  wire output 2 \\y\n",
            "  wire \\t\n",
            "end\n",
        ))
        .unwrap();
        let types = CellTypes::with_design(&design);
        assert_eq!(types.port_direction("\\sub", "a"), Some(PortDirection::Input));
        assert_eq!(types.port_direction("\\sub", "y"), Some(PortDirection::Output));
        assert_eq!(types.port_direction("\\sub", "t"), None);
    }
}

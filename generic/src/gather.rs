use indexmap::IndexMap;
use tracing::debug;

use abstractor_netlist::{CellId, CellTypes, Module, Net, Selection, SigMap, WireId};

use crate::{Error, Slice};

/// Why a bit was selected for abstraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionReason {
    Wire(WireId),
    Cell(CellId),
}

/// Canonical bits selected for abstraction, each with the reasons it was selected in discovery order.
pub type SelectedBits = IndexMap<Net, Vec<SelectionReason>>;

/// Collects the canonical bits of `module` that are selected for abstraction.
///
/// Without slices, these are all bits of the selected wires and all output bits of the selected
/// cells. With slices, exactly one wire and no cells must be selected, and the bits are those
/// covered by the slices.
pub fn gather_selected(
    module: &Module,
    cell_types: &CellTypes,
    selection: &Selection,
    slices: &[Slice],
    sigmap: &SigMap,
) -> Result<SelectedBits, Error> {
    let mut selected = SelectedBits::new();
    let wires = module.selected_wires(selection);
    let cells = module.selected_cells(selection);

    if slices.is_empty() {
        for &wire_id in &wires {
            for net in &sigmap.apply_wire(module, wire_id) {
                selected.entry(net).or_default().push(SelectionReason::Wire(wire_id));
            }
        }
        for &cell_id in &cells {
            let cell = module.cell(cell_id);
            for (port, value) in &cell.connections {
                if !cell_types.is_output(cell, port) {
                    continue;
                }
                for net in &sigmap.apply(value) {
                    selected.entry(net).or_default().push(SelectionReason::Cell(cell_id));
                }
            }
        }
    } else {
        let [wire_id] = wires[..] else {
            return Err(Error::UnsupportedSelection { module: module.name().to_string() });
        };
        if !cells.is_empty() {
            return Err(Error::UnsupportedSelection { module: module.name().to_string() });
        }
        let wire = module.wire(wire_id);
        for slice in slices {
            for offset in slice.resolve(module, wire)? {
                let net = sigmap.apply_net(Net::wire(wire_id, offset));
                selected.entry(net).or_default().push(SelectionReason::Wire(wire_id));
            }
        }
    }
    Ok(selected)
}

/// Logs the reasons a bit was selected.
pub fn explain_selection(module: &Module, reasons: &[SelectionReason]) {
    for reason in reasons {
        match *reason {
            SelectionReason::Wire(wire_id) => debug!("  wire {}", module.wire(wire_id).name),
            SelectionReason::Cell(cell_id) => debug!("  cell {}", module.cell(cell_id).name),
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use abstractor_netlist::{CellTypes, Design, Net, Selection, SigMap};

    use super::{SelectionReason, gather_selected};
    use crate::{Error, IndexConvention, Slice};

    fn design() -> Design {
        Design::from_str(concat!(
            "module \\top\n",
            "  wire width 4 \\q\n",
            "  wire width 4 \\r\n",
            "  wire width 2 \\d\n",
            "  cell $not \\inv\n",
            "    parameter \\A_WIDTH 2\n",
            "    parameter \\Y_WIDTH 2\n",
            "    connect \\A \\d\n",
            "    connect \\Y \\q [1:0]\n",
            "  end\n",
            "  connect \\r \\q\n",
            "end\n",
        ))
        .unwrap()
    }

    #[test]
    fn test_whole_selection() {
        let design = design();
        let module = design.module("\\top").unwrap();
        let q = module.find_wire("\\q").unwrap();
        let r = module.find_wire("\\r").unwrap();
        let inv = module.find_cell("\\inv").unwrap();
        let sigmap = SigMap::new(module);
        let types = CellTypes::internals();
        let selection = Selection::parse(&["r", "inv"]).unwrap();
        let selected = gather_selected(module, &types, &selection, &[], &sigmap).unwrap();
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[&Net::wire(q, 0)], vec![SelectionReason::Wire(r), SelectionReason::Cell(inv)]);
        assert_eq!(selected[&Net::wire(q, 3)], vec![SelectionReason::Wire(r)]);
        let again = gather_selected(module, &types, &selection, &[], &sigmap).unwrap();
        assert_eq!(selected, again);
    }

    #[test]
    fn test_slices() {
        let design = design();
        let module = design.module("\\top").unwrap();
        let q = module.find_wire("\\q").unwrap();
        let sigmap = SigMap::new(module);
        let types = CellTypes::internals();
        let selection = Selection::parse(&["q"]).unwrap();
        let slices = [Slice::parse("2:1", IndexConvention::Declared).unwrap()];
        let selected = gather_selected(module, &types, &selection, &slices, &sigmap).unwrap();
        assert_eq!(selected.keys().copied().collect::<Vec<_>>(), vec![Net::wire(q, 1), Net::wire(q, 2)]);

        let selection = Selection::parse(&["q", "r"]).unwrap();
        assert!(matches!(
            gather_selected(module, &types, &selection, &slices, &sigmap),
            Err(Error::UnsupportedSelection { .. })
        ));
        let selection = Selection::parse(&["q", "inv"]).unwrap();
        assert!(matches!(
            gather_selected(module, &types, &selection, &slices, &sigmap),
            Err(Error::UnsupportedSelection { .. })
        ));
    }
}

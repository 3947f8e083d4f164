use std::collections::BTreeSet;

use tracing::debug;

use abstractor_netlist::{CellTypes, ControlNet, FlipFlop, Module, Selection, SigMap, Value};

use crate::gather::{explain_selection, gather_selected};
use crate::{Error, Slice, insert_free_source};

/// Replaces the selected bits of `port` with bits of a new wire driven by a free source, and
/// returns the new port value.
fn abstract_port(module: &mut Module, port: &Value, offsets: &BTreeSet<usize>, enable: ControlNet) -> Value {
    let abstracted = module.add_fresh_wire(offsets.len());
    let mut source = Value::new();
    let mut new_port = port.clone();
    for (index, &offset) in offsets.iter().enumerate() {
        source.push(port[offset]);
        new_port[offset] = abstracted[index];
    }
    insert_free_source(module, &source, &abstracted, enable);
    new_port
}

/// Abstracts the state of every flip-flop whose output drives a selected bit: its data input
/// (and asynchronous load input, if any) is replaced with a free source for those bits.
///
/// Returns the number of flip-flop ports that were abstracted.
pub fn abstract_state(
    module: &mut Module,
    cell_types: &CellTypes,
    selection: &Selection,
    enable: ControlNet,
    slices: &[Slice],
) -> Result<usize, Error> {
    let flip_flop_types = CellTypes::internals_ff();
    let sigmap = SigMap::new(module);
    let selected = gather_selected(module, cell_types, selection, slices, &sigmap)?;

    let mut flip_flops = Vec::new();
    for cell_id in module.cell_ids() {
        let cell = module.cell(cell_id);
        if !flip_flop_types.is_flip_flop(&cell.kind) {
            continue;
        }
        let Some(flip_flop) = FlipFlop::from_cell(module, cell_id) else {
            return Err(Error::MalformedFlipFlop { cell: cell.name.clone(), module: module.name().to_string() });
        };
        if flip_flop.has_set_reset() {
            return Err(Error::UnsupportedFlipFlop { cell: cell.name.clone(), module: module.name().to_string() });
        }
        flip_flops.push(flip_flop);
    }

    let mut changed = 0;
    for mut flip_flop in flip_flops {
        let mut offsets = BTreeSet::new();
        for (offset, net) in flip_flop.output.iter().enumerate() {
            if let Some(reasons) = selected.get(&sigmap.apply_net(net)) {
                debug!("abstracting state for bit {} due to selections:", module.display_net(net));
                explain_selection(module, reasons);
                offsets.insert(offset);
            }
        }
        if offsets.is_empty() {
            continue;
        }

        flip_flop.unmap_enable(module);
        flip_flop.unmap_reset(module);
        if flip_flop.has_clear() {
            if flip_flop.has_load() {
                return Err(Error::UnsupportedFlipFlop { cell: flip_flop.name, module: module.name().to_string() });
            }
            flip_flop.clear_to_load();
        }

        if flip_flop.has_load() {
            flip_flop.load_data = abstract_port(module, &flip_flop.load_data, &offsets, enable);
            changed += 1;
        }
        flip_flop.data = abstract_port(module, &flip_flop.data, &offsets, enable);
        changed += 1;
        flip_flop.emit(module);
    }
    Ok(changed)
}

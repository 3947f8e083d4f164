use tracing::debug;

use abstractor_netlist::{CellTypes, ControlNet, Module, Selection, SigMap, Value};

use crate::gather::{explain_selection, gather_selected};
use crate::{Error, Slice, insert_free_source};

/// Abstracts every cell output bit that drives a selected bit. The cell is rewired to drive a new
/// wire, and the original bits are driven by a free source, or by a multiplexer between the new
/// wire and a free source.
///
/// Returns the number of output ports that were abstracted.
pub fn abstract_value(
    module: &mut Module,
    cell_types: &CellTypes,
    selection: &Selection,
    enable: ControlNet,
    slices: &[Slice],
) -> Result<usize, Error> {
    let sigmap = SigMap::new(module);
    let selected = gather_selected(module, cell_types, selection, slices, &sigmap)?;

    let mut changed = 0;
    for cell_id in module.cell_ids() {
        let cell = module.cell(cell_id);
        let ports: Vec<(String, Value)> = cell
            .connections
            .iter()
            .filter(|(port, _)| cell_types.is_output(cell, port))
            .map(|(port, value)| (port.clone(), value.clone()))
            .collect();
        for (port, old_value) in ports {
            let mut offsets = Vec::new();
            for (offset, net) in old_value.iter().enumerate() {
                if let Some(reasons) = selected.get(&sigmap.apply_net(net)) {
                    debug!("abstracting value for bit {} due to selections:", module.display_net(net));
                    explain_selection(module, reasons);
                    offsets.push(offset);
                }
            }
            if offsets.is_empty() {
                continue;
            }

            let abstracted = module.add_fresh_wire(offsets.len());
            let mut new_value = old_value.clone();
            let mut target = Value::new();
            for (index, &offset) in offsets.iter().enumerate() {
                target.push(old_value[offset]);
                new_value[offset] = abstracted[index];
            }
            module.cell_mut(cell_id).set_port(&port, new_value);
            insert_free_source(module, &abstracted, &target, enable);
            changed += 1;
        }
    }
    Ok(changed)
}

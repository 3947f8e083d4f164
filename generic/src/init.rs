use tracing::debug;

use abstractor_netlist::{CellTypes, InitValues, Module, Selection, SigMap};

use crate::gather::{explain_selection, gather_selected};
use crate::{Error, Slice};

/// Removes the initial value of every selected bit.
///
/// Returns the number of selected bits, whether or not they had an initial value.
pub fn abstract_init(
    module: &mut Module,
    cell_types: &CellTypes,
    selection: &Selection,
    slices: &[Slice],
) -> Result<usize, Error> {
    let sigmap = SigMap::new(module);
    let selected = gather_selected(module, cell_types, selection, slices, &sigmap)?;
    let mut init_values = InitValues::new(&sigmap, module);

    let mut changed = 0;
    for (&net, reasons) in &selected {
        debug!("removing init bit on {} due to selections:", module.display_net(net));
        explain_selection(module, reasons);
        init_values.remove_init(module, net);
        changed += 1;
    }
    Ok(changed)
}

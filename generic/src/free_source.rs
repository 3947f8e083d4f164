use tracing::debug;

use abstractor_netlist::{ControlNet, Module, Value};

/// Drives `target` with an unconstrained value whenever `enable` is active, and with `source`
/// otherwise.
///
/// The unconstrained value comes from a new `$anyseq` cell. If `enable` is always active, `target`
/// is connected to it directly and `source` is left unused; otherwise a `$mux` is added.
pub fn insert_free_source(module: &mut Module, source: &Value, target: &Value, enable: ControlNet) {
    assert_eq!(source.len(), target.len());
    let free = module.add_anyseq(target.len());
    if enable.is_always(true) {
        debug!("connecting {} to a free source", module.display_value(target));
        module.connect(target, &free);
        return;
    }
    debug!(
        "multiplexing {} between {} and a free source",
        module.display_value(target),
        module.display_value(source)
    );
    module.add_mux_into(enable, &free, source, target);
}

#[cfg(test)]
mod test {
    use abstractor_netlist::{ControlNet, Module, Net, Value, Wire};

    use super::insert_free_source;

    fn module() -> (Module, Value, Value, Net) {
        let mut module = Module::new("\\top");
        let a = module.add_wire(Wire::new("\\a", 3));
        let y = module.add_wire(Wire::new("\\y", 3));
        let en = module.add_wire(Wire::new("\\en", 1));
        let (a, y) = (module.wire_value(a), module.wire_value(y));
        (module, a, y, Net::wire(en, 0))
    }

    #[test]
    fn test_always() {
        let (mut module, a, y, _) = module();
        insert_free_source(&mut module, &a, &y, ControlNet::ONE);
        let kinds: Vec<_> = module.cells().map(|(_, cell)| cell.kind.clone()).collect();
        assert_eq!(kinds, vec!["$anyseq"]);
        let (_, anyseq) = module.cells().next().unwrap();
        assert_eq!(module.connections(), &[(y, anyseq.port("Y").unwrap().clone())]);
        assert_eq!(module.wire_count(), 4);
    }

    #[test]
    fn test_enable() {
        let (mut module, a, y, en) = module();
        insert_free_source(&mut module, &a, &y, ControlNet::Pos(en));
        let cells: Vec<_> = module.cells().map(|(_, cell)| cell.clone()).collect();
        assert_eq!(cells.len(), 2);
        let free = cells[0].port("Y").unwrap();
        assert_eq!(free.len(), 3);
        assert_eq!(cells[1].kind, "$mux");
        assert_eq!(cells[1].port("A"), Some(&a));
        assert_eq!(cells[1].port("B"), Some(free));
        assert_eq!(cells[1].port("S"), Some(&Value::from(en)));
        assert_eq!(cells[1].port("Y"), Some(&y));
        assert!(module.connections().is_empty());
    }

    #[test]
    fn test_enable_low() {
        let (mut module, a, y, en) = module();
        insert_free_source(&mut module, &a, &y, ControlNet::Neg(en));
        let (_, mux) = module.cells().nth(1).unwrap();
        assert_eq!(mux.port("B"), Some(&a));
        assert_eq!(mux.port("S"), Some(&Value::from(en)));
    }

    #[test]
    fn test_constant_enable() {
        let (mut module, a, y, _) = module();
        insert_free_source(&mut module, &a, &y, ControlNet::Neg(Net::ZERO));
        assert_eq!(module.cell_count(), 1);
        assert_eq!(module.connections().len(), 1);
    }
}

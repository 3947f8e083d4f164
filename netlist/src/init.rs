use std::collections::HashMap;

use crate::{Module, Net, ParamValue, SigMap, Trit, Wire, WireId};

/// Index of the initial values declared by `\init` attributes, keyed by canonical bit.
#[derive(Debug, Clone)]
pub struct InitValues {
    sigmap: SigMap,
    bits: HashMap<Net, (Trit, Vec<(WireId, usize)>)>,
}

impl InitValues {
    pub fn new(sigmap: &SigMap, module: &Module) -> InitValues {
        let mut bits: HashMap<Net, (Trit, Vec<(WireId, usize)>)> = HashMap::new();
        for (wire_id, wire) in module.wires() {
            let Some(init) = wire.init_value() else { continue };
            for (offset, trit) in init.iter().enumerate().take(wire.width) {
                if trit == Trit::Undef {
                    continue;
                }
                let net = sigmap.apply_net(Net::wire(wire_id, offset));
                bits.entry(net).or_insert_with(|| (trit, Vec::new())).1.push((wire_id, offset));
            }
        }
        InitValues { sigmap: sigmap.clone(), bits }
    }

    /// Returns the initial value of a bit, or `x` if it has none.
    pub fn get(&self, net: Net) -> Trit {
        match self.sigmap.apply_net(net) {
            Net::Const(trit) => trit,
            net => self.bits.get(&net).map(|&(trit, _)| trit).unwrap_or(Trit::Undef),
        }
    }

    /// Clears the initial value of a bit from every wire that declares it, and removes `\init`
    /// attributes that become entirely undefined. Returns `true` if any wire was changed.
    pub fn remove_init(&mut self, module: &mut Module, net: Net) -> bool {
        let Some((_, locations)) = self.bits.remove(&self.sigmap.apply_net(net)) else { return false };
        for (wire_id, offset) in locations {
            let wire = module.wire_mut(wire_id);
            let Some(mut init) = wire.init_value() else { continue };
            init[offset] = Trit::Undef;
            if init.is_undef() {
                wire.attributes.shift_remove(Wire::INIT);
            } else {
                wire.attributes.insert(Wire::INIT.into(), ParamValue::Const(init));
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{Const, InitValues, Module, Net, SigMap, Trit, Wire};

    #[test]
    fn test_remove_init() {
        let mut module = Module::new("\\top");
        let q = module.add_wire(Wire::new("\\q", 2).with_init(Const::from_str("10").unwrap()));
        let r = module.add_wire(Wire::new("\\r", 1).with_init(Trit::Zero));
        module.connect(Net::wire(r, 0), Net::wire(q, 0));
        let sigmap = SigMap::new(&module);
        let mut init = InitValues::new(&sigmap, &module);
        assert_eq!(init.get(Net::wire(q, 1)), Trit::One);
        assert_eq!(init.get(Net::wire(r, 0)), Trit::Zero);

        assert!(init.remove_init(&mut module, Net::wire(r, 0)));
        assert!(module.wire(r).init_value().is_none());
        assert_eq!(module.wire(q).init_value(), Some(Const::from_str("1x").unwrap()));
        assert!(!init.remove_init(&mut module, Net::wire(q, 0)));

        assert!(init.remove_init(&mut module, Net::wire(q, 1)));
        assert!(module.wire(q).init_value().is_none());
        assert!(init.is_empty());
    }
}

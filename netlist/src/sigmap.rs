use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use crate::{Module, Net, Trit, Value, WireId};

/// Maps every bit of a module to the canonical representative of the bits it is connected to.
///
/// Two bits have the same representative if and only if they are joined, directly or through
/// other bits, by the module's connections. The representative of a set of bits is its smallest
/// [`Net`], so a constant always represents every bit it is connected to.
///
/// The map is a snapshot: connections added to the module after it was built are not reflected.
#[derive(Debug, Clone, Default)]
pub struct SigMap {
    map: HashMap<Net, Net>,
}

const CONSTS: [Trit; 3] = [Trit::Undef, Trit::Zero, Trit::One];

impl SigMap {
    pub fn new(module: &Module) -> SigMap {
        let mut bases = Vec::with_capacity(module.wire_count());
        let mut count = CONSTS.len();
        for (_, wire) in module.wires() {
            bases.push(count);
            count += wire.width;
        }
        let index_of = |net: Net| -> usize {
            match net {
                Net::Const(Trit::Undef) => 0,
                Net::Const(Trit::Zero) => 1,
                Net::Const(Trit::One) => 2,
                Net::Wire(wire, offset) => bases[wire.index()] + offset as usize,
            }
        };

        let mut union_find = UnionFind::<usize>::new(count);
        for (lhs, rhs) in module.connections() {
            for (lhs_net, rhs_net) in lhs.iter().zip(rhs.iter()) {
                union_find.union(index_of(lhs_net), index_of(rhs_net));
            }
        }

        // Dense indices are assigned in `Net` order, so the first member of each class seen
        // while walking the indices upwards is its smallest net.
        let mut nets = Vec::with_capacity(count);
        nets.extend(CONSTS.into_iter().map(Net::Const));
        for (wire_id, wire) in module.wires() {
            nets.extend((0..wire.width).map(|offset| Net::wire(wire_id, offset)));
        }
        let mut representatives: HashMap<usize, Net> = HashMap::new();
        let mut map = HashMap::new();
        for (index, &net) in nets.iter().enumerate() {
            let root = union_find.find(index);
            let representative = *representatives.entry(root).or_insert(net);
            if representative != net {
                map.insert(net, representative);
            }
        }
        SigMap { map }
    }

    pub fn apply_net(&self, net: Net) -> Net {
        self.map.get(&net).copied().unwrap_or(net)
    }

    pub fn apply(&self, value: &Value) -> Value {
        value.iter().map(|net| self.apply_net(net)).collect()
    }

    /// Returns the canonical bits of a whole wire.
    pub fn apply_wire(&self, module: &Module, wire_id: WireId) -> Value {
        self.apply(&module.wire_value(wire_id))
    }
}

#[cfg(test)]
mod test {
    use crate::{Module, Net, SigMap, Value, Wire};

    #[test]
    fn test_aliases() {
        let mut module = Module::new("\\top");
        let a = module.add_wire(Wire::new("\\a", 2));
        let b = module.add_wire(Wire::new("\\b", 2));
        let c = module.add_wire(Wire::new("\\c", 1));
        module.connect(module.wire_value(b), module.wire_value(a));
        module.connect(Net::wire(c, 0), Net::wire(b, 1));
        let sigmap = SigMap::new(&module);
        assert_eq!(sigmap.apply_net(Net::wire(b, 0)), Net::wire(a, 0));
        assert_eq!(sigmap.apply_net(Net::wire(c, 0)), Net::wire(a, 1));
        assert_eq!(sigmap.apply_net(Net::wire(a, 1)), Net::wire(a, 1));
        for net in [Net::wire(a, 0), Net::wire(b, 1), Net::wire(c, 0)] {
            assert_eq!(sigmap.apply_net(sigmap.apply_net(net)), sigmap.apply_net(net));
        }
    }

    #[test]
    fn test_constants_win() {
        let mut module = Module::new("\\top");
        let a = module.add_wire(Wire::new("\\a", 1));
        let b = module.add_wire(Wire::new("\\b", 1));
        module.connect(Net::wire(a, 0), Net::wire(b, 0));
        module.connect(Net::wire(b, 0), Net::ONE);
        let sigmap = SigMap::new(&module);
        assert_eq!(sigmap.apply(&Value::from(Net::wire(a, 0))), Value::from(Net::ONE));
        assert_eq!(sigmap.apply_net(Net::ONE), Net::ONE);
    }
}

use std::{
    fmt::{Debug, Display},
    hash::Hash,
    ops::{Index, IndexMut},
    slice::SliceIndex,
};

use crate::{Const, Trit, WireId};

/// A net identifies a single bit of a signal; either a constant (a [`Trit`]) or a position within
/// a [`Wire`] of a [`Module`].
///
/// Nets are ordered so that every constant compares less than every wire bit.
///
/// [`Wire`]: crate::Wire
/// [`Module`]: crate::Module
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Net {
    Const(Trit),
    Wire(WireId, u32),
}

impl Net {
    pub const UNDEF: Net = Net::Const(Trit::Undef);
    pub const ZERO: Net = Net::Const(Trit::Zero);
    pub const ONE: Net = Net::Const(Trit::One);

    pub fn wire(wire: WireId, offset: usize) -> Net {
        assert!(offset <= u32::MAX as usize);
        Net::Wire(wire, offset as u32)
    }

    pub fn as_const(self) -> Option<Trit> {
        match self {
            Net::Const(trit) => Some(trit),
            Net::Wire(..) => None,
        }
    }

    pub fn as_wire(self) -> Option<(WireId, usize)> {
        match self {
            Net::Const(_) => None,
            Net::Wire(wire, offset) => Some((wire, offset as usize)),
        }
    }

    pub fn repeat(self, count: usize) -> Value {
        Value::from_iter(std::iter::repeat_n(self, count))
    }
}

impl From<Trit> for Net {
    fn from(value: Trit) -> Self {
        Net::Const(value)
    }
}

impl From<&Net> for Net {
    fn from(net: &Net) -> Self {
        *net
    }
}

impl Debug for Net {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Net::Const(Trit::Zero) => write!(f, "Net::ZERO"),
            Net::Const(Trit::One) => write!(f, "Net::ONE"),
            Net::Const(Trit::Undef) => write!(f, "Net::UNDEF"),
            Net::Wire(wire, offset) => write!(f, "Net::wire({wire:?}, {offset})"),
        }
    }
}

/// Formats the net without access to wire names; use [`Module::display_net`] for diagnostics.
///
/// [`Module::display_net`]: crate::Module::display_net
impl Display for Net {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Net::Const(trit) => write!(f, "{trit}"),
            Net::Wire(wire, offset) => write!(f, "%{}+{offset}", wire.index()),
        }
    }
}

#[derive(Clone)]
enum ValueRepr {
    None,
    Some(Net),
    Many(Vec<Net>),
}

impl ValueRepr {
    fn as_slice(&self) -> &[Net] {
        match self {
            ValueRepr::None => &[],
            ValueRepr::Some(net) => std::slice::from_ref(net),
            ValueRepr::Many(nets) => nets.as_slice(),
        }
    }

    fn as_slice_mut(&mut self) -> &mut [Net] {
        match self {
            ValueRepr::None => &mut [],
            ValueRepr::Some(net) => std::slice::from_mut(net),
            ValueRepr::Many(nets) => nets.as_mut_slice(),
        }
    }

    fn push(&mut self, new_net: Net) {
        match self {
            ValueRepr::None => *self = ValueRepr::Some(new_net),
            ValueRepr::Some(net) => *self = ValueRepr::Many(vec![*net, new_net]),
            ValueRepr::Many(nets) => {
                nets.push(new_net);
            }
        }
    }
}

impl PartialEq for ValueRepr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ValueRepr::Some(lft), ValueRepr::Some(rgt)) => lft.eq(rgt),
            _ => self.as_slice().eq(other.as_slice()),
        }
    }
}

impl Eq for ValueRepr {}

impl PartialOrd for ValueRepr {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueRepr {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (ValueRepr::Some(lft), ValueRepr::Some(rgt)) => lft.cmp(rgt),
            _ => self.as_slice().cmp(other.as_slice()),
        }
    }
}

impl Hash for ValueRepr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

/// A value is a (possibly empty) sequence of [`Net`]s, least significant first.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Value(ValueRepr);

impl Value {
    /// Creates an empty value.
    pub fn new() -> Self {
        Value(ValueRepr::None)
    }

    /// Creates an all-`X` value of given width.
    pub fn undef(width: usize) -> Self {
        Net::UNDEF.repeat(width)
    }

    /// Creates a reference to all `width` bits of a wire in their natural order.
    pub fn from_wire(wire: WireId, width: usize) -> Value {
        Value::from_iter((0..width).map(|offset| Net::wire(wire, offset)))
    }

    pub fn len(&self) -> usize {
        self.0.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_slice().is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Net> + ExactSizeIterator + '_ {
        self.0.as_slice().iter().copied()
    }

    pub fn push(&mut self, new_net: impl Into<Net>) {
        self.0.push(new_net.into())
    }

    pub fn is_undef(&self) -> bool {
        self.iter().all(|net| net == Net::UNDEF)
    }

    pub fn as_const(&self) -> Option<Const> {
        self.iter().map(Net::as_const).collect()
    }

    pub fn as_net(&self) -> Option<Net> {
        if self.len() == 1 { Some(self[0]) } else { None }
    }

    pub fn concat(&self, other: &Value) -> Self {
        Value::from_iter(self.iter().chain(other.iter()))
    }

    pub fn slice(&self, range: impl std::ops::RangeBounds<usize>) -> Value {
        Value::from(&self[(range.start_bound().cloned(), range.end_bound().cloned())])
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::new()
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Value::from_iter([")?;
        for (index, net) in self.iter().enumerate() {
            if index != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{net:?}")?;
        }
        write!(f, "])")?;
        Ok(())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else if self.len() == 1 {
            write!(f, "{}", self[0])
        } else {
            write!(f, "[")?;
            for net in self.iter().rev() {
                write!(f, " {net}")?;
            }
            write!(f, " ]")
        }
    }
}

impl<I: SliceIndex<[Net]>> Index<I> for Value {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.0.as_slice()[index]
    }
}

impl<I: SliceIndex<[Net]>> IndexMut<I> for Value {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.0.as_slice_mut()[index]
    }
}

impl Extend<Net> for Value {
    fn extend<T: IntoIterator<Item = Net>>(&mut self, iter: T) {
        for net in iter {
            self.push(net);
        }
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl From<Net> for Value {
    fn from(net: Net) -> Self {
        Value(ValueRepr::Some(net))
    }
}

impl From<&Net> for Value {
    fn from(net: &Net) -> Self {
        Value::from(*net)
    }
}

impl From<&[Net]> for Value {
    fn from(nets: &[Net]) -> Self {
        Value::from_iter(nets.iter().cloned())
    }
}

impl From<Vec<Net>> for Value {
    fn from(nets: Vec<Net>) -> Self {
        Value::from(&nets[..])
    }
}

impl From<&Const> for Value {
    fn from(value: &Const) -> Self {
        Value::from_iter(value.into_iter().map(Net::from))
    }
}

impl From<Const> for Value {
    fn from(value: Const) -> Self {
        Value::from(&value)
    }
}

impl FromIterator<Net> for Value {
    fn from_iter<T: IntoIterator<Item = Net>>(iter: T) -> Self {
        let mut iter = iter.into_iter();
        match iter.size_hint() {
            (_, Some(0 | 1)) => {
                let mut value = match iter.next() {
                    None => Value::new(),
                    Some(net) => Value::from(net),
                };
                for net in iter {
                    value.push(net);
                }
                value
            }
            _ => Value(ValueRepr::Many(iter.collect())),
        }
    }
}

impl<'a> IntoIterator for &'a Value {
    type Item = Net;
    type IntoIter = std::iter::Cloned<std::slice::Iter<'a, Net>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.as_slice().iter().cloned()
    }
}

pub struct ValueIntoIter {
    repr: ValueRepr,
    index: usize,
}

impl Iterator for ValueIntoIter {
    type Item = Net;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.repr.as_slice().get(self.index).cloned();
        if item.is_some() {
            self.index += 1;
        }
        item
    }
}

impl IntoIterator for Value {
    type Item = Net;
    type IntoIter = ValueIntoIter;

    fn into_iter(self) -> Self::IntoIter {
        ValueIntoIter { repr: self.0, index: 0 }
    }
}

/// A control net is a [`Net`] that can be negated.
///
/// Control nets describe enables and resets of flip-flops, as well as the enable condition of
/// an abstraction: `Pos(net)` is active when `net` is `1`, `Neg(net)` is active when `net` is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlNet {
    Pos(Net),
    Neg(Net),
}

impl ControlNet {
    pub const ZERO: ControlNet = ControlNet::Pos(Net::ZERO);
    pub const ONE: ControlNet = ControlNet::Pos(Net::ONE);

    pub fn from_net_invert(net: Net, invert: bool) -> Self {
        match invert {
            false => ControlNet::Pos(net),
            true => ControlNet::Neg(net),
        }
    }

    pub fn net(self) -> Net {
        match self {
            Self::Pos(net) => net,
            Self::Neg(net) => net,
        }
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Self::Pos(_))
    }

    pub fn is_active(self) -> Option<bool> {
        match self {
            Self::Pos(net) if net == Net::ZERO => Some(false),
            Self::Neg(net) if net == Net::ONE => Some(false),
            Self::Pos(net) if net == Net::ONE => Some(true),
            Self::Neg(net) if net == Net::ZERO => Some(true),
            _ => None,
        }
    }

    pub fn is_always(self, active: bool) -> bool {
        self.is_active() == Some(active)
    }

}

impl From<Net> for ControlNet {
    fn from(net: Net) -> Self {
        ControlNet::Pos(net)
    }
}

impl Display for ControlNet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlNet::Pos(net) => write!(f, "{net}"),
            ControlNet::Neg(net) => write!(f, "!{net}"),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{Const, ControlNet, Net, Trit, Value, WireId};

    #[test]
    fn test_net() {
        assert_eq!(Net::from(Trit::Zero), Net::ZERO);
        assert_eq!(Net::from(Trit::One), Net::ONE);
        assert_eq!(Net::from(Trit::Undef), Net::UNDEF);
        assert_eq!(Net::wire(WireId::from_index(3), 1).as_wire(), Some((WireId::from_index(3), 1)));
    }

    #[test]
    fn test_net_order() {
        let wire = Net::wire(WireId::from_index(0), 0);
        assert!(Net::ZERO < wire);
        assert!(Net::ONE < wire);
        assert!(Net::UNDEF < wire);
    }

    #[test]
    fn test_net_debug() {
        assert_eq!(format!("{:?}", Net::ZERO), "Net::ZERO");
        assert_eq!(format!("{:?}", Net::ONE), "Net::ONE");
        assert_eq!(format!("{:?}", Net::UNDEF), "Net::UNDEF");
    }

    #[test]
    fn test_value() {
        let v01 = Value::from_iter([Net::ONE, Net::ZERO]);
        assert_eq!(v01.clone().into_iter().collect::<Vec<_>>(), vec![Net::ONE, Net::ZERO]);
        assert_eq!(v01.as_const(), Some(Const::from_iter([Trit::One, Trit::Zero])));
        let wire = Value::from_wire(WireId::from_index(0), 3);
        assert_eq!(wire.len(), 3);
        assert_eq!(wire.as_const(), None);
        assert_eq!(wire.slice(1..), Value::from_iter([Net::wire(WireId::from_index(0), 1), Net::wire(WireId::from_index(0), 2)]));
    }

    #[test]
    fn test_control_net() {
        assert!(ControlNet::ONE.is_always(true));
        assert!(ControlNet::Neg(Net::ZERO).is_always(true));
        assert!(!ControlNet::Pos(Net::wire(WireId::from_index(0), 0)).is_always(true));
        assert_eq!(ControlNet::from_net_invert(Net::ONE, true).is_active(), Some(false));
    }
}

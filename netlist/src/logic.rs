use std::fmt::{Debug, Display};
use std::ops::{Index, IndexMut};
use std::slice::SliceIndex;
use std::str::FromStr;

/// A three-valued logic state: `0`, `1`, or unknown (`x`).
///
/// The `z` state of RTLIL is not represented separately; it is read as `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Trit {
    Undef = -1,
    Zero = 0,
    One = 1,
}

impl Trit {
    pub fn from_char(chr: char) -> Result<Self, ()> {
        match chr {
            '0' => Ok(Trit::Zero),
            '1' => Ok(Trit::One),
            'x' | 'X' | 'z' | 'Z' | '-' | '?' => Ok(Trit::Undef),
            _ => Err(()),
        }
    }
}

impl Display for Trit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trit::Undef => write!(f, "x"),
            Trit::Zero => write!(f, "0"),
            Trit::One => write!(f, "1"),
        }
    }
}

impl From<bool> for Trit {
    fn from(value: bool) -> Self {
        match value {
            false => Trit::Zero,
            true => Trit::One,
        }
    }
}

impl TryFrom<Trit> for bool {
    type Error = ();

    fn try_from(value: Trit) -> Result<Self, Self::Error> {
        match value {
            Trit::Undef => Err(()),
            Trit::Zero => Ok(false),
            Trit::One => Ok(true),
        }
    }
}

impl std::ops::Not for Trit {
    type Output = Trit;

    fn not(self) -> Self::Output {
        match self {
            Trit::Undef => Trit::Undef,
            Trit::Zero => Trit::One,
            Trit::One => Trit::Zero,
        }
    }
}

/// A constant is a (possibly empty) sequence of [`Trit`]s, least significant first.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Const {
    trits: Vec<Trit>,
}

impl Const {
    pub fn new() -> Self {
        Const { trits: Vec::new() }
    }

    pub fn undef(width: usize) -> Self {
        Const { trits: vec![Trit::Undef; width] }
    }

    pub fn zero(width: usize) -> Self {
        Const { trits: vec![Trit::Zero; width] }
    }

    pub fn ones(width: usize) -> Self {
        Const { trits: vec![Trit::One; width] }
    }

    pub fn from_uint(value: u64, width: usize) -> Self {
        Const::from_iter((0..width).map(|index| Trit::from(index < 64 && (value >> index) & 1 != 0)))
    }

    pub fn len(&self) -> usize {
        self.trits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trits.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Trit> + ExactSizeIterator + '_ {
        self.trits.iter().copied()
    }

    pub fn push(&mut self, trit: impl Into<Trit>) {
        self.trits.push(trit.into());
    }

    pub fn is_undef(&self) -> bool {
        self.iter().all(|trit| trit == Trit::Undef)
    }

    pub fn is_zero(&self) -> bool {
        self.iter().all(|trit| trit == Trit::Zero)
    }

    pub fn is_ones(&self) -> bool {
        self.iter().all(|trit| trit == Trit::One)
    }

    pub fn has_undef(&self) -> bool {
        self.iter().any(|trit| trit == Trit::Undef)
    }

    pub fn slice(&self, range: impl std::ops::RangeBounds<usize>) -> Const {
        Const::from(&self.trits[(range.start_bound().cloned(), range.end_bound().cloned())])
    }

    pub fn concat(&self, other: impl Into<Const>) -> Const {
        Const::from_iter(self.iter().chain(other.into().iter()))
    }

    pub fn not(&self) -> Const {
        Const::from_iter(self.iter().map(|trit| !trit))
    }

    /// Interprets the constant as an unsigned integer, if it is fully defined and fits.
    pub fn as_uint(&self) -> Option<u64> {
        let mut result = 0u64;
        for (index, trit) in self.iter().enumerate() {
            match trit {
                Trit::Undef => return None,
                Trit::Zero => (),
                Trit::One if index < 64 => result |= 1 << index,
                Trit::One => return None,
            }
        }
        Some(result)
    }

    /// Interprets the constant as a boolean flag, the way cell parameters such as `CLK_POLARITY` are read.
    pub fn as_bool(&self) -> bool {
        self.iter().any(|trit| trit == Trit::One)
    }
}

impl Debug for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Const::from_str(\"")?;
        for trit in self.iter().rev() {
            write!(f, "{trit}")?;
        }
        write!(f, "\")")
    }
}

/// Formats the constant in RTLIL syntax, e.g. `4'01x0`.
impl Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}'", self.len())?;
        for trit in self.iter().rev() {
            write!(f, "{trit}")?;
        }
        Ok(())
    }
}

/// Parses a string of trits, most significant first, e.g. `01x0`.
impl FromStr for Const {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut trits = Vec::with_capacity(s.len());
        for chr in s.chars().rev() {
            trits.push(Trit::from_char(chr)?);
        }
        Ok(Const { trits })
    }
}

impl<I: SliceIndex<[Trit]>> Index<I> for Const {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.trits[index]
    }
}

impl<I: SliceIndex<[Trit]>> IndexMut<I> for Const {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.trits[index]
    }
}

impl From<Trit> for Const {
    fn from(trit: Trit) -> Self {
        Const { trits: vec![trit] }
    }
}

impl From<&[Trit]> for Const {
    fn from(trits: &[Trit]) -> Self {
        Const { trits: trits.to_vec() }
    }
}

impl From<Vec<Trit>> for Const {
    fn from(trits: Vec<Trit>) -> Self {
        Const { trits }
    }
}

impl FromIterator<Trit> for Const {
    fn from_iter<T: IntoIterator<Item = Trit>>(iter: T) -> Self {
        Const { trits: iter.into_iter().collect() }
    }
}

impl Extend<Trit> for Const {
    fn extend<T: IntoIterator<Item = Trit>>(&mut self, iter: T) {
        self.trits.extend(iter)
    }
}

impl<'a> IntoIterator for &'a Const {
    type Item = Trit;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Trit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trits.iter().copied()
    }
}

impl IntoIterator for Const {
    type Item = Trit;
    type IntoIter = std::vec::IntoIter<Trit>;

    fn into_iter(self) -> Self::IntoIter {
        self.trits.into_iter()
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{Const, Trit};

    #[test]
    fn test_from_str() {
        let value = Const::from_str("01x").unwrap();
        assert_eq!(value.iter().collect::<Vec<_>>(), vec![Trit::Undef, Trit::One, Trit::Zero]);
        assert!(Const::from_str("012").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Const::from_str("01x0").unwrap().to_string(), "4'01x0");
        assert_eq!(Const::new().to_string(), "0'");
    }

    #[test]
    fn test_uint() {
        assert_eq!(Const::from_uint(5, 4).to_string(), "4'0101");
        assert_eq!(Const::from_uint(5, 4).as_uint(), Some(5));
        assert_eq!(Const::from_str("1x").unwrap().as_uint(), None);
    }

    #[test]
    fn test_not() {
        assert_eq!(Const::from_str("01x").unwrap().not(), Const::from_str("10x").unwrap());
    }
}

use std::fmt::Display;
use std::ops::Range;

use abstractor_netlist::{Module, Wire};

use crate::Error;

/// How the indices of a [`Slice`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexConvention {
    /// Indices as declared in the HDL source (`-slice`); see [`Wire::from_hdl_index`].
    Declared,
    /// Raw offsets into the wire, starting at 0 for the least significant bit (`-rtlilslice`).
    Raw,
}

/// A range of bits of a single wire, given as `first` or `first:last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slice {
    pub convention: IndexConvention,
    pub first: i64,
    pub last: i64,
}

impl Slice {
    pub fn new(convention: IndexConvention, first: i64, last: i64) -> Self {
        Slice { convention, first, last }
    }

    pub fn parse(text: &str, convention: IndexConvention) -> Result<Slice, Error> {
        let syntax_error = || Error::Syntax { slice: text.to_string() };
        let parse_index = |index: &str| -> Result<i64, Error> {
            if index.is_empty() || !index.bytes().all(|byte| byte.is_ascii_digit()) {
                return Err(syntax_error());
            }
            index.parse().map_err(|_| syntax_error())
        };
        if text.is_empty() {
            return Err(syntax_error());
        }
        let (first, last) = match text.split_once(':') {
            Some((first, last)) => (parse_index(first)?, parse_index(last)?),
            None => {
                let single = parse_index(text)?;
                (single, single)
            }
        };
        Ok(Slice { convention, first, last })
    }

    fn offset(&self, module: &Module, wire: &Wire, index: i64) -> Result<usize, Error> {
        let offset = match self.convention {
            IndexConvention::Declared => wire.from_hdl_index(index),
            IndexConvention::Raw => usize::try_from(index).ok().filter(|&offset| offset < wire.width),
        };
        offset.ok_or_else(|| Error::OutOfBounds {
            slice: self.to_string(),
            wire: wire.name.clone(),
            module: module.name().to_string(),
        })
    }

    /// Resolves the slice against `wire` into a half-open range of raw offsets.
    pub fn resolve(&self, module: &Module, wire: &Wire) -> Result<Range<usize>, Error> {
        let first = self.offset(module, wire, self.first)?;
        let last = self.offset(module, wire, self.last)?;
        Ok(first.min(last)..first.max(last) + 1)
    }
}

/// Formats the slice as the pass option that would produce it, e.g. `-slice 3:1`.
impl Display for Slice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let option = match self.convention {
            IndexConvention::Declared => "-slice",
            IndexConvention::Raw => "-rtlilslice",
        };
        if self.first == self.last {
            write!(f, "{option} {}", self.first)
        } else {
            write!(f, "{option} {}:{}", self.first, self.last)
        }
    }
}

#[cfg(test)]
mod test {
    use abstractor_netlist::{Module, Wire};

    use super::{IndexConvention, Slice};
    use crate::Error;

    #[test]
    fn test_parse() {
        assert_eq!(Slice::parse("3", IndexConvention::Raw), Ok(Slice::new(IndexConvention::Raw, 3, 3)));
        assert_eq!(Slice::parse("2:5", IndexConvention::Declared), Ok(Slice::new(IndexConvention::Declared, 2, 5)));
        assert_eq!(Slice::parse("5:2", IndexConvention::Declared).unwrap().to_string(), "-slice 5:2");
        assert_eq!(Slice::parse("7", IndexConvention::Raw).unwrap().to_string(), "-rtlilslice 7");
        for text in ["", ":", "1:", ":1", "1:2:3", "a", "1a", "-1", "+1", " 1", "99999999999999999999"] {
            assert_eq!(
                Slice::parse(text, IndexConvention::Declared),
                Err(Error::Syntax { slice: text.to_string() }),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_resolve() {
        let module = Module::new("\\top");
        let wire = Wire::new("\\q", 4);
        let slice = Slice::parse("2:1", IndexConvention::Declared).unwrap();
        assert_eq!(slice.resolve(&module, &wire), Ok(1..3));
        let slice = Slice::parse("1:2", IndexConvention::Raw).unwrap();
        assert_eq!(slice.resolve(&module, &wire), Ok(1..3));
        let slice = Slice::parse("3:4", IndexConvention::Raw).unwrap();
        assert_eq!(
            slice.resolve(&module, &wire).unwrap_err().to_string(),
            "Slice -rtlilslice 3:4 is out of bounds for wire \\q in module \\top"
        );
    }

    #[test]
    fn test_resolve_declared() {
        let module = Module::new("\\top");
        let wire = Wire::new("\\q", 4).with_start_offset(8).with_upto(true);
        let slice = Slice::parse("8", IndexConvention::Declared).unwrap();
        assert_eq!(slice.resolve(&module, &wire), Ok(3..4));
        let slice = Slice::parse("3", IndexConvention::Declared).unwrap();
        assert!(matches!(slice.resolve(&module, &wire), Err(Error::OutOfBounds { .. })));
        let slice = Slice::parse("3", IndexConvention::Raw).unwrap();
        assert_eq!(slice.resolve(&module, &wire), Ok(3..4));
    }

    #[test]
    fn test_bounds() {
        let module = Module::new("\\top");
        for width in 1..6 {
            let wire = Wire::new("\\w", width);
            for first in 0..width as i64 + 2 {
                for last in 0..width as i64 + 2 {
                    let slice = Slice::new(IndexConvention::Declared, first, last);
                    match slice.resolve(&module, &wire) {
                        Ok(range) => {
                            assert!(first < width as i64 && last < width as i64);
                            assert!(range.start < range.end && range.end <= width);
                        }
                        Err(error) => {
                            assert!(first >= width as i64 || last >= width as i64);
                            assert!(matches!(error, Error::OutOfBounds { .. }));
                        }
                    }
                }
            }
        }
    }
}

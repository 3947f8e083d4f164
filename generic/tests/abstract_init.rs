use std::str::FromStr;

use abstractor_generic::{AbstractMode, ConfigError, Error, abstract_pass};
use abstractor_netlist::{Const, Design};

fn design() -> Design {
    Design::from_str(concat!(
        "module \\top\n",
        "  attribute \\init 4'1010\n",
        "  wire width 4 \\q\n",
        "  attribute \\init 2'01\n",
        "  wire width 2 \\r\n",
        "  wire width 2 \\s\n",
        "  connect \\s \\q [1:0]\n",
        "end\n",
    ))
    .unwrap()
}

#[test]
fn test_init_whole_wire() {
    let mut design = design();
    let report = abstract_pass(&mut design, &["-init", "q"]).unwrap();
    assert_eq!(report.mode, AbstractMode::Init);
    assert_eq!(report.changed, 4);
    assert_eq!(report.to_string(), "Abstracted 4 init bits.");
    let module = design.module("\\top").unwrap();
    assert_eq!(module.wire(module.find_wire("\\q").unwrap()).init_value(), None);
    assert_eq!(
        module.wire(module.find_wire("\\r").unwrap()).init_value(),
        Some(Const::from_str("01").unwrap())
    );
}

#[test]
fn test_init_alias_and_slice() {
    let mut design = design();
    // `\s` aliases the low half of `\q`; bit 1 of `\s` is bit 1 of `\q`.
    let report = abstract_pass(&mut design, &["-init", "-rtlilslice", "1", "s"]).unwrap();
    assert_eq!(report.changed, 1);
    let module = design.module("\\top").unwrap();
    assert_eq!(
        module.wire(module.find_wire("\\q").unwrap()).init_value(),
        Some(Const::from_str("10x0").unwrap())
    );
}

#[test]
fn test_init_counts_unconstrained_bits() {
    let mut design = design();
    // `\s` has no init attribute of its own, but its bits alias `\q`.
    let report = abstract_pass(&mut design, &["-init", "s", "r"]).unwrap();
    assert_eq!(report.changed, 4);
    let module = design.module("\\top").unwrap();
    assert_eq!(
        module.wire(module.find_wire("\\q").unwrap()).init_value(),
        Some(Const::from_str("10xx").unwrap())
    );
    assert_eq!(module.wire(module.find_wire("\\r").unwrap()).init_value(), None);

    let mut design = self::design();
    let report = abstract_pass(&mut design, &["-init", "s"]).unwrap();
    assert_eq!(report.changed, 2);
    let report = abstract_pass(&mut design, &["-init", "s"]).unwrap();
    assert_eq!(report.changed, 2);
}

#[test]
fn test_init_with_enable() {
    let mut design = design();
    assert_eq!(
        abstract_pass(&mut design, &["-init", "-enable", "en", "q"]).unwrap_err(),
        Error::Configuration(ConfigError::EnableWithInit)
    );
}

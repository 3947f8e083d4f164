use std::io;
use std::str::FromStr;

use abstractor_netlist::{Const, Design, ParamValue, SigMap};
use abstractor_yosys_json::{export, import};

fn roundtrip(design: &Design) -> Design {
    let mut buffer = Vec::<u8>::new();
    export(&mut buffer, design).unwrap();
    let mut cursor = io::Cursor::new(&buffer);
    import(&mut cursor).unwrap()
}

#[test]
fn test_roundtrip() {
    let design = Design::from_str(concat!(
        "attribute \\top 1\n",
        "module \\top\n",
        "  wire \\clk\n",
        "  wire width 4 input 1 \\d\n",
        "  attribute \\init 4'x01x\n",
        "  wire width 4 offset 2 output 2 \\q\n",
        "  wire width 2 \\lo\n",
        "  cell $dff \\ff\n",
        "    attribute \\src \"top.v:3.1-5.4\"\n",
        "    parameter \\WIDTH 4\n",
        "    parameter \\CLK_POLARITY 1'1\n",
        "    connect \\CLK \\clk\n",
        "    connect \\D \\d\n",
        "    connect \\Q \\q\n",
        "  end\n",
        "  connect \\lo \\q [1:0]\n",
        "end\n",
    ))
    .unwrap();
    let design2 = roundtrip(&design);

    let module = design2.module("\\top").unwrap();
    assert_eq!(module.attributes.get("\\top"), Some(&ParamValue::Int(1)));
    let q = module.wire(module.find_wire("\\q").unwrap());
    assert_eq!((q.width, q.start_offset, q.port_id, q.port_output), (4, 2, 2, true));
    assert_eq!(q.init_value(), Some(Const::from_str("x01x").unwrap()));

    let ff = module.cell(module.find_cell("\\ff").unwrap());
    assert_eq!(ff.kind, "$dff");
    assert_eq!(ff.param("WIDTH"), Some(&ParamValue::Int(4)));
    assert_eq!(ff.param_bool("CLK_POLARITY"), true);
    assert_eq!(ff.attributes.get("\\src"), Some(&ParamValue::String("top.v:3.1-5.4".into())));

    // Aliasing survives as shared bits, and comes back as a connection.
    let sigmap = SigMap::new(module);
    let lo = sigmap.apply_wire(module, module.find_wire("\\lo").unwrap());
    let q = sigmap.apply_wire(module, module.find_wire("\\q").unwrap());
    assert_eq!(lo, q.slice(0..2));
    assert_eq!(sigmap.apply(ff.port("Q").unwrap()), q);

    // A second trip through the format is stable.
    let mut first = Vec::new();
    export(&mut first, &design2).unwrap();
    let mut second = Vec::new();
    export(&mut second, &roundtrip(&design2)).unwrap();
    assert_eq!(String::from_utf8(first).unwrap(), String::from_utf8(second).unwrap());
}

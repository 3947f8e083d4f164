use std::fmt::{Formatter, Result};

use indexmap::IndexMap;

use crate::module::{Chunk, chunks};
use crate::{Const, Design, Module, ParamValue, Value};

fn write_name(f: &mut Formatter, name: &str) -> Result {
    if name.starts_with('\\') || name.starts_with('$') { write!(f, "{name}") } else { write!(f, "\\{name}") }
}

fn write_attributes(f: &mut Formatter, indent: &str, attributes: &IndexMap<String, ParamValue>) -> Result {
    for (name, value) in attributes {
        write!(f, "{indent}attribute ")?;
        write_name(f, name)?;
        writeln!(f, " {value}")?;
    }
    Ok(())
}

fn write_sigspec(f: &mut Formatter, module: &Module, value: &Value) -> Result {
    let chunks = chunks(value);
    let write_chunk = |f: &mut Formatter, chunk: &Chunk| match chunk {
        Chunk::Const(trits) => write!(f, "{}", Const::from(trits.as_slice())),
        Chunk::Wire { wire, offset, width } => {
            let wire = module.wire(*wire);
            if *offset == 0 && *width == wire.width {
                write!(f, "{}", wire.name)
            } else if *width == 1 {
                write!(f, "{} [{}]", wire.name, offset)
            } else {
                write!(f, "{} [{}:{}]", wire.name, offset + width - 1, offset)
            }
        }
    };
    match chunks.as_slice() {
        [chunk] => write_chunk(f, chunk),
        chunks => {
            write!(f, "{{")?;
            for chunk in chunks.iter().rev() {
                write!(f, " ")?;
                write_chunk(f, chunk)?;
            }
            write!(f, " }}")
        }
    }
}

fn write_module(f: &mut Formatter, module: &Module) -> Result {
    write_attributes(f, "", &module.attributes)?;
    writeln!(f, "module {}", module.name())?;
    for (_, wire) in module.wires() {
        write_attributes(f, "  ", &wire.attributes)?;
        write!(f, "  wire")?;
        if wire.width != 1 {
            write!(f, " width {}", wire.width)?;
        }
        if wire.upto {
            write!(f, " upto")?;
        }
        if wire.start_offset != 0 {
            write!(f, " offset {}", wire.start_offset)?;
        }
        match (wire.port_input, wire.port_output) {
            (true, true) => write!(f, " inout {}", wire.port_id)?,
            (true, false) => write!(f, " input {}", wire.port_id)?,
            (false, true) => write!(f, " output {}", wire.port_id)?,
            (false, false) => (),
        }
        writeln!(f, " {}", wire.name)?;
    }
    for (_, cell) in module.cells() {
        write_attributes(f, "  ", &cell.attributes)?;
        writeln!(f, "  cell {} {}", cell.kind, cell.name)?;
        for (name, value) in &cell.parameters {
            write!(f, "    parameter ")?;
            write_name(f, name)?;
            writeln!(f, " {value}")?;
        }
        for (port, value) in &cell.connections {
            write!(f, "    connect ")?;
            write_name(f, port)?;
            write!(f, " ")?;
            write_sigspec(f, module, value)?;
            writeln!(f)?;
        }
        writeln!(f, "  end")?;
    }
    for (lhs, rhs) in module.connections() {
        write!(f, "  connect ")?;
        write_sigspec(f, module, lhs)?;
        write!(f, " ")?;
        write_sigspec(f, module, rhs)?;
        writeln!(f)?;
    }
    writeln!(f, "end")
}

pub(crate) fn write_design(f: &mut Formatter, design: &Design) -> Result {
    for module in design.modules() {
        write_module(f, module)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use crate::{Design, Module, Net, Wire};

    #[test]
    fn test_print_reparse() {
        let text = concat!(
            "attribute \\top 1\n",
            "module \\top\n",
            "  attribute \\init 2'1x\n",
            "  wire width 2 upto offset 3 input 1 \\a\n",
            "  wire output 2 \\y\n",
            "  cell $reduce_or $0\n",
            "    parameter \\A_WIDTH 2\n",
            "    parameter \\NAME \"x\"\n",
            "    connect \\A { 1'0 \\a [1] }\n",
            "    connect \\Y \\y\n",
            "  end\n",
            "  connect \\y \\a [0]\n",
            "end\n",
        );
        let design = Design::from_str(text).unwrap();
        assert_eq!(design.to_string(), text);
    }

    #[test]
    fn test_print_built() {
        let mut module = Module::new("\\m");
        let a = module.add_wire(Wire::new("\\a", 3));
        let y = module.add_anyseq(2);
        module.connect(module.wire_value(a).slice(1..3), &y);
        module.connect(Net::wire(a, 0), Net::ZERO);
        let mut design = Design::new();
        design.add_module(module);
        assert_eq!(
            design.to_string(),
            concat!(
                "module \\m\n",
                "  wire width 3 \\a\n",
                "  wire width 2 $abstract$1\n",
                "  cell $anyseq $abstract$2\n",
                "    parameter \\WIDTH 2\n",
                "    connect \\Y $abstract$1\n",
                "  end\n",
                "  connect \\a [2:1] $abstract$1\n",
                "  connect \\a [0] 1'0\n",
                "end\n",
            )
        );
    }
}

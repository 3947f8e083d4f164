use std::collections::HashMap;

use json::JsonValue;

use abstractor_netlist::{Cell, Design, Module, Net, ParamValue, Value, Wire};

use crate::yosys::{Bit, bits_from_json, escape_id, param_from_json};

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(json::Error),
    Syntax(String),
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl From<json::Error> for Error {
    fn from(error: json::Error) -> Self {
        Self::Json(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(error) => write!(f, "I/O error: {}", error),
            Error::Json(error) => write!(f, "JSON parse error: {}", error),
            Error::Syntax(message) => write!(f, "malformed Yosys JSON: {}", message),
        }
    }
}

impl std::error::Error for Error {}

fn syntax(message: impl Into<String>) -> Error {
    Error::Syntax(message.into())
}

fn attributes_from_json(value: &JsonValue, context: &str) -> Result<Vec<(String, ParamValue)>, Error> {
    let mut attributes = Vec::new();
    for (name, value) in value.entries() {
        let value = param_from_json(value).ok_or_else(|| syntax(format!("invalid attribute {name} of {context}")))?;
        attributes.push((escape_id(name), value));
    }
    Ok(attributes)
}

struct ModuleImporter<'a> {
    json: &'a JsonValue,
    module: Module,
    nets: HashMap<usize, Net>,
}

impl ModuleImporter<'_> {
    fn bits(&self, value: &JsonValue, context: &str) -> Result<Vec<Bit>, Error> {
        bits_from_json(value).ok_or_else(|| syntax(format!("invalid bits of {context}")))
    }

    /// Returns the net for `bit`, creating an anonymous wire for it if no net name covers it.
    fn net(&mut self, bit: Bit) -> Net {
        match bit {
            Bit::Zero => Net::ZERO,
            Bit::One => Net::ONE,
            Bit::Undef => Net::UNDEF,
            Bit::Net(index) => match self.nets.get(&index) {
                Some(&net) => net,
                None => {
                    let net = self.module.add_fresh_wire(1)[0];
                    self.nets.insert(index, net);
                    net
                }
            },
        }
    }

    fn add_wire(&mut self, name: &str, details: &JsonValue, port: Option<(usize, &JsonValue)>) -> Result<(), Error> {
        let context = format!("net {name}");
        if self.module.find_wire(&escape_id(name)).is_some() {
            return Err(syntax(format!("duplicate {context}")));
        }
        let bits = self.bits(&details["bits"], &context)?;
        let mut wire = Wire::new(escape_id(name), bits.len())
            .with_start_offset(details["offset"].as_i64().unwrap_or(0))
            .with_upto(details["upto"].as_u32().unwrap_or(0) != 0);
        for (name, value) in attributes_from_json(&details["attributes"], &context)? {
            wire.attributes.insert(name, value);
        }
        if let Some((port_id, port)) = port {
            wire.port_id = port_id;
            match port["direction"].as_str() {
                Some("input") => wire.port_input = true,
                Some("output") => wire.port_output = true,
                Some("inout") => (wire.port_input, wire.port_output) = (true, true),
                _ => return Err(syntax(format!("invalid direction of port {name}"))),
            }
        }
        let wire_id = self.module.add_wire(wire);

        let (mut lhs, mut rhs) = (Value::new(), Value::new());
        for (offset, bit) in bits.into_iter().enumerate() {
            let net = Net::wire(wire_id, offset);
            match bit {
                Bit::Net(index) if !self.nets.contains_key(&index) => {
                    self.nets.insert(index, net);
                }
                bit => {
                    lhs.push(net);
                    rhs.push(self.net(bit));
                }
            }
        }
        self.module.connect(lhs, rhs);
        Ok(())
    }

    fn handle_wires(&mut self) -> Result<(), Error> {
        let json = self.json;
        let ports: Vec<(&str, &JsonValue)> = json["ports"].entries().collect();
        let port = |name: &str| {
            ports.iter().position(|&(port_name, _)| port_name == name).map(|index| (index + 1, ports[index].1))
        };
        for (name, details) in json["netnames"].entries() {
            self.add_wire(name, details, port(name))?;
        }
        for (index, &(name, details)) in ports.iter().enumerate() {
            if !json["netnames"].has_key(name) {
                self.add_wire(name, details, Some((index + 1, details)))?;
            }
        }
        Ok(())
    }

    fn handle_cell(&mut self, name: &str, details: &JsonValue) -> Result<(), Error> {
        let context = format!("cell {name}");
        if self.module.find_cell(&escape_id(name)).is_some() {
            return Err(syntax(format!("duplicate {context}")));
        }
        let kind = details["type"].as_str().ok_or_else(|| syntax(format!("missing type of {context}")))?;
        let mut cell = Cell::new(escape_id(name), escape_id(kind));
        for (param_name, value) in details["parameters"].entries() {
            let value =
                param_from_json(value).ok_or_else(|| syntax(format!("invalid parameter {param_name} of {context}")))?;
            cell.parameters.insert(param_name.to_string(), value);
        }
        for (name, value) in attributes_from_json(&details["attributes"], &context)? {
            cell.attributes.insert(name, value);
        }
        for (port_name, bits) in details["connections"].entries() {
            let bits = self.bits(bits, &context)?;
            let value = Value::from_iter(bits.into_iter().map(|bit| self.net(bit)));
            cell.connections.insert(port_name.to_string(), value);
        }
        self.module.add_cell(cell);
        Ok(())
    }
}

fn import_module(name: &str, json: &JsonValue) -> Result<Module, Error> {
    let mut importer = ModuleImporter { json, module: Module::new(escape_id(name)), nets: HashMap::new() };
    for (attribute, value) in attributes_from_json(&json["attributes"], &format!("module {name}"))? {
        importer.module.attributes.insert(attribute, value);
    }
    importer.handle_wires()?;
    for (name, details) in json["cells"].entries() {
        importer.handle_cell(name, details)?;
    }
    Ok(importer.module)
}

pub fn import(reader: &mut impl std::io::Read) -> Result<Design, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let json = json::parse(text.as_str())?;
    if !json["modules"].is_object() {
        return Err(syntax("missing modules"));
    }
    let mut design = Design::new();
    for (name, module) in json["modules"].entries() {
        if design.has_module(&escape_id(name)) {
            return Err(syntax(format!("duplicate module {name}")));
        }
        design.add_module(import_module(name, module)?);
    }
    Ok(design)
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use abstractor_netlist::{Const, Net, Value};

    use super::{Error, import};

    #[test]
    fn test_import() {
        let text = r#"{
            "creator": "test",
            "modules": {
                "top": {
                    "attributes": { "top": "00000000000000000000000000000001" },
                    "ports": {
                        "a": { "direction": "input", "bits": [2, 3] },
                        "y": { "direction": "output", "bits": [4, 5] }
                    },
                    "cells": {
                        "$not$1": {
                            "hide_name": 1,
                            "type": "$not",
                            "parameters": { "A_SIGNED": 0, "A_WIDTH": "00000000000000000000000000000010", "Y_WIDTH": 2 },
                            "attributes": {},
                            "connections": { "A": [2, 3], "Y": [4, 6] }
                        }
                    },
                    "netnames": {
                        "a": { "bits": [2, 3], "attributes": {} },
                        "y": { "bits": [4, 5], "upto": 1, "offset": 1, "attributes": { "init": "x1" } },
                        "alias": { "bits": [5, "0"], "attributes": {} }
                    }
                }
            }
        }"#;
        let design = import(&mut text.as_bytes()).unwrap();
        let module = design.module("\\top").unwrap();
        assert!(module.attributes.contains_key("\\top"));

        let y = module.wire(module.find_wire("\\y").unwrap());
        assert_eq!((y.port_id, y.port_output, y.start_offset, y.upto), (2, true, 1, true));
        assert_eq!(y.init_value(), Some(Const::from_str("x1").unwrap()));

        // Net 6 is only used by the cell, and gets an anonymous wire.
        assert_eq!(module.wire_count(), 4);
        let cell = module.cell(module.find_cell("$not$1").unwrap());
        assert_eq!(cell.kind, "$not");
        assert_eq!(cell.param("Y_WIDTH").and_then(|value| value.as_int()), Some(2));
        assert_eq!(cell.param("A_WIDTH").and_then(|value| value.as_int()), Some(2));
        let output = cell.port("Y").unwrap();
        assert_eq!(output[0], Net::wire(module.find_wire("\\y").unwrap(), 0));
        assert!(output[1].as_wire().is_some_and(|(wire_id, _)| !module.wire(wire_id).is_public()));

        let alias = module.wire_value(module.find_wire("\\alias").unwrap());
        let y = module.wire_value(module.find_wire("\\y").unwrap());
        assert_eq!(module.connections(), &[(alias, Value::from(vec![y[1], Net::ZERO]))]);
    }

    #[test]
    fn test_import_errors() {
        let import = |text: &str| import(&mut text.as_bytes());
        assert!(matches!(import("{"), Err(Error::Json(_))));
        assert!(matches!(import("{}"), Err(Error::Syntax(_))));
        let error = import(r#"{"modules": {"top": {"netnames": {"a": {"bits": ["q"]}}}}}"#).unwrap_err();
        assert_eq!(error.to_string(), "malformed Yosys JSON: invalid bits of net a");
        let error = import(r#"{"modules": {"top": {"cells": {"c": {"connections": {}}}}}}"#).unwrap_err();
        assert_eq!(error.to_string(), "malformed Yosys JSON: missing type of cell c");
    }
}

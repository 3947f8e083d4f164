use std::collections::HashMap;
use std::io::Write;

use indexmap::IndexMap;
use json::JsonValue;

use abstractor_netlist::{CellTypes, Design, Module, Net, ParamValue, PortDirection, SigMap, Value, Wire};

use crate::yosys::{param_to_json, trit_to_json, unescape_id};

fn attributes_to_json(attributes: &IndexMap<String, ParamValue>) -> JsonValue {
    let mut json = JsonValue::new_object();
    for (name, value) in attributes {
        json[unescape_id(name)] = param_to_json(value);
    }
    json
}

fn hide_name(name: &str) -> JsonValue {
    u32::from(name.starts_with('$')).into()
}

fn direction_to_json(direction: PortDirection) -> JsonValue {
    match direction {
        PortDirection::Input => "input".into(),
        PortDirection::Output => "output".into(),
        PortDirection::InOut => "inout".into(),
    }
}

fn add_range(json: &mut JsonValue, wire: &Wire) {
    if wire.start_offset != 0 {
        json["offset"] = wire.start_offset.into();
    }
    if wire.upto {
        json["upto"] = 1u32.into();
    }
}

struct ModuleExporter<'a> {
    module: &'a Module,
    cell_types: &'a CellTypes,
    sigmap: SigMap,
    indices: HashMap<Net, usize>,
}

impl ModuleExporter<'_> {
    /// Nets are numbered from 2 upwards, in order of first use; aliased nets share a number.
    fn net_to_json(&mut self, net: Net) -> JsonValue {
        let net = self.sigmap.apply_net(net);
        if let Some(trit) = net.as_const() {
            return trit_to_json(trit);
        }
        let next_index = self.indices.len() + 2;
        (*self.indices.entry(net).or_insert(next_index)).into()
    }

    fn value_to_json(&mut self, value: &Value) -> JsonValue {
        JsonValue::Array(value.iter().map(|net| self.net_to_json(net)).collect())
    }

    fn ports(&mut self) -> JsonValue {
        let module = self.module;
        let mut ports: Vec<_> = module.wires().filter(|(_, wire)| wire.is_port()).collect();
        ports.sort_by_key(|(_, wire)| wire.port_id);
        let mut json = JsonValue::new_object();
        for (wire_id, wire) in ports {
            let direction = match (wire.port_input, wire.port_output) {
                (true, true) => PortDirection::InOut,
                (true, false) => PortDirection::Input,
                _ => PortDirection::Output,
            };
            let mut port = JsonValue::new_object();
            port["direction"] = direction_to_json(direction);
            port["bits"] = self.value_to_json(&module.wire_value(wire_id));
            add_range(&mut port, wire);
            json[unescape_id(&wire.name)] = port;
        }
        json
    }

    fn cells(&mut self) -> JsonValue {
        let module = self.module;
        let mut json = JsonValue::new_object();
        for (_, cell) in module.cells() {
            let mut parameters = JsonValue::new_object();
            for (name, value) in &cell.parameters {
                parameters[name.as_str()] = param_to_json(value);
            }
            let mut directions = JsonValue::new_object();
            let mut connections = JsonValue::new_object();
            for (port, value) in &cell.connections {
                if let Some(direction) = self.cell_types.port_direction(&cell.kind, port) {
                    directions[port.as_str()] = direction_to_json(direction);
                }
                connections[port.as_str()] = self.value_to_json(value);
            }

            let mut details = JsonValue::new_object();
            details["hide_name"] = hide_name(&cell.name);
            details["type"] = unescape_id(&cell.kind).into();
            details["parameters"] = parameters;
            details["attributes"] = attributes_to_json(&cell.attributes);
            if self.cell_types.is_known(&cell.kind) {
                details["port_directions"] = directions;
            }
            details["connections"] = connections;
            json[unescape_id(&cell.name)] = details;
        }
        json
    }

    fn netnames(&mut self) -> JsonValue {
        let module = self.module;
        let mut json = JsonValue::new_object();
        for (wire_id, wire) in module.wires() {
            let mut details = JsonValue::new_object();
            details["hide_name"] = hide_name(&wire.name);
            details["bits"] = self.value_to_json(&module.wire_value(wire_id));
            add_range(&mut details, wire);
            details["attributes"] = attributes_to_json(&wire.attributes);
            json[unescape_id(&wire.name)] = details;
        }
        json
    }
}

fn export_module(module: &Module, cell_types: &CellTypes) -> JsonValue {
    let mut exporter = ModuleExporter { module, cell_types, sigmap: SigMap::new(module), indices: HashMap::new() };
    let mut json = JsonValue::new_object();
    json["attributes"] = attributes_to_json(&module.attributes);
    json["ports"] = exporter.ports();
    json["cells"] = exporter.cells();
    json["netnames"] = exporter.netnames();
    json
}

pub fn export(writer: &mut impl Write, design: &Design) -> std::io::Result<()> {
    let cell_types = CellTypes::with_design(design);
    let mut modules = JsonValue::new_object();
    for module in design.modules() {
        modules[unescape_id(module.name())] = export_module(module, &cell_types);
    }
    let mut json = JsonValue::new_object();
    json["creator"] = format!("abstractor {}", env!("CARGO_PKG_VERSION")).into();
    json["modules"] = modules;
    json.write_pretty(writer, 2)?;
    writeln!(writer)
}

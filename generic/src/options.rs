use abstractor_netlist::{ControlNet, Module, Net};

use crate::{ConfigError, Error, IndexConvention, Slice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbstractMode {
    /// Abstract the state of flip-flops (`-state`).
    State,
    /// Remove initial values (`-init`).
    Init,
    /// Abstract the outputs of cells (`-value`).
    Value,
}

/// The condition under which abstracted bits take an unconstrained value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EnableCondition {
    #[default]
    Always,
    /// Active when the named single-bit wire is `1` (`-enable`).
    ActiveHigh(String),
    /// Active when the named single-bit wire is `0` (`-enablen`).
    ActiveLow(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbstractOptions {
    pub mode: Option<AbstractMode>,
    pub enable: EnableCondition,
    pub slices: Vec<Slice>,
}

impl AbstractOptions {
    /// Parses pass arguments. Options are recognized up to the first argument that is not an
    /// option; that argument and the ones after it are returned as selection patterns.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<(AbstractOptions, Vec<String>), Error> {
        let mut options = AbstractOptions::default();
        let mut index = 0;
        while index < args.len() {
            let has_value = index + 1 < args.len();
            match args[index].as_ref() {
                "-state" => options.mode = Some(AbstractMode::State),
                "-init" => options.mode = Some(AbstractMode::Init),
                "-value" => options.mode = Some(AbstractMode::Value),
                option @ ("-enable" | "-enablen") if has_value => {
                    if options.enable != EnableCondition::Always {
                        return Err(ConfigError::MultipleEnables.into());
                    }
                    index += 1;
                    let name = args[index].as_ref().to_string();
                    options.enable = match option {
                        "-enable" => EnableCondition::ActiveHigh(name),
                        _ => EnableCondition::ActiveLow(name),
                    };
                }
                option @ ("-slice" | "-rtlilslice") if has_value => {
                    let convention = match option {
                        "-slice" => IndexConvention::Declared,
                        _ => IndexConvention::Raw,
                    };
                    index += 1;
                    options.slices.push(Slice::parse(args[index].as_ref(), convention)?);
                }
                _ => break,
            }
            index += 1;
        }
        let patterns: Vec<String> = args[index..].iter().map(|arg| arg.as_ref().to_string()).collect();
        if let Some(option) = patterns.iter().find(|pattern| pattern.starts_with('-')) {
            return Err(ConfigError::UnknownOption(option.clone()).into());
        }
        Ok((options, patterns))
    }

    /// Checks the options for consistency, and returns the selected mode.
    pub fn validate(&self) -> Result<AbstractMode, ConfigError> {
        match &self.enable {
            EnableCondition::Always => (),
            EnableCondition::ActiveHigh(name) | EnableCondition::ActiveLow(name) => {
                if self.mode == Some(AbstractMode::Init) {
                    return Err(ConfigError::EnableWithInit);
                }
                if name.is_empty() {
                    return Err(ConfigError::EmptyEnable);
                }
            }
        }
        self.mode.ok_or(ConfigError::NoMode)
    }

    /// Resolves the enable condition against the wires of `module`.
    pub fn enable_logic(&self, module: &Module) -> Result<ControlNet, ConfigError> {
        let (name, active_high) = match &self.enable {
            EnableCondition::Always => return Ok(ControlNet::ONE),
            EnableCondition::ActiveHigh(name) => (name, true),
            EnableCondition::ActiveLow(name) => (name, false),
        };
        let Some(wire_id) = module.find_wire(&format!("\\{name}")) else {
            return Err(ConfigError::MissingEnableWire { wire: name.clone(), module: module.name().to_string() });
        };
        let width = module.wire(wire_id).width;
        if width != 1 {
            return Err(ConfigError::EnableWireWidth { wire: name.clone(), width, module: module.name().to_string() });
        }
        Ok(ControlNet::from_net_invert(Net::wire(wire_id, 0), !active_high))
    }
}

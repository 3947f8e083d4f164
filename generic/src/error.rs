use std::fmt::Display;

use abstractor_netlist::SelectError;

/// A problem with the options given to the abstraction pass, or with their meaning in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    NoMode,
    MultipleEnables,
    EmptyEnable,
    EnableWithInit,
    UnknownOption(String),
    MissingEnableWire { wire: String, module: String },
    EnableWireWidth { wire: String, width: usize, module: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoMode => write!(f, "No mode selected, expected one of -state, -init, or -value"),
            ConfigError::MultipleEnables => write!(f, "Multiple enable conditions are not supported"),
            ConfigError::EmptyEnable => write!(f, "Unspecified enable wire"),
            ConfigError::EnableWithInit => write!(f, "Conditional initial value abstraction is not supported"),
            ConfigError::UnknownOption(option) => write!(f, "Unknown option or option in arguments: '{option}'"),
            ConfigError::MissingEnableWire { wire, module } => {
                write!(f, "Enable wire {wire} not found in module {module}")
            }
            ConfigError::EnableWireWidth { wire, width, module } => {
                write!(f, "Enable wire {wire} must have width 1 but has width {width} in module {module}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Syntax { slice: String },
    OutOfBounds { slice: String, wire: String, module: String },
    UnsupportedSelection { module: String },
    UnsupportedFlipFlop { cell: String, module: String },
    MalformedFlipFlop { cell: String, module: String },
    Configuration(ConfigError),
    Select(SelectError),
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Error::Configuration(error)
    }
}

impl From<SelectError> for Error {
    fn from(error: SelectError) -> Self {
        Error::Select(error)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Syntax { slice } => write!(f, "Invalid slice '{slice}', expected '<first>:<last>' or '<single>'"),
            Error::OutOfBounds { slice, wire, module } => {
                write!(f, "Slice {slice} is out of bounds for wire {wire} in module {module}")
            }
            Error::UnsupportedSelection { module } => {
                write!(f, "Slices are only supported for single-wire selections (in module {module})")
            }
            Error::UnsupportedFlipFlop { cell, module } => {
                write!(f, "Flip-flop {cell} in module {module} has per-bit set/reset, which is not supported")
            }
            Error::MalformedFlipFlop { cell, module } => {
                write!(f, "Flip-flop {cell} in module {module} has missing or mismatched ports or parameters")
            }
            Error::Configuration(error) => write!(f, "{error}"),
            Error::Select(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Configuration(error) => Some(error),
            Error::Select(error) => Some(error),
            _ => None,
        }
    }
}

//! Abstraction of netlist signals for formal verification.
//!
//! The pass severs selected bits from their drivers and replaces them with unconstrained values
//! (optionally only while an enable wire is active), or removes their initial values.

use std::fmt::Display;

use tracing::{debug_span, info};

use abstractor_netlist::{CellTypes, Design, Selection};

mod error;
mod slice;
mod gather;
mod free_source;
mod state;
mod value;
mod init;
mod options;

pub use error::{ConfigError, Error};
pub use slice::{IndexConvention, Slice};
pub use gather::{SelectionReason, SelectedBits, gather_selected, explain_selection};
pub use free_source::insert_free_source;
pub use state::abstract_state;
pub use value::abstract_value;
pub use init::abstract_init;
pub use options::{AbstractMode, AbstractOptions, EnableCondition};

/// The outcome of running the pass over a design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbstractReport {
    pub mode: AbstractMode,
    /// Flip-flop ports, cell output ports, or init bits, depending on the mode.
    pub changed: usize,
}

impl Display for AbstractReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            AbstractMode::State => write!(f, "Abstracted {} stateful cells.", self.changed),
            AbstractMode::Value => write!(f, "Abstracted {} driver ports.", self.changed),
            AbstractMode::Init => write!(f, "Abstracted {} init bits.", self.changed),
        }
    }
}

/// Abstracts the selected signals of every selected module, in design order.
///
/// Modules are changed one at a time; if an error occurs, modules processed before it keep
/// their changes.
pub fn abstract_design(
    design: &mut Design,
    options: &AbstractOptions,
    selection: &Selection,
) -> Result<AbstractReport, Error> {
    let mode = options.validate()?;
    let cell_types = CellTypes::with_design(design);
    let mut changed = 0;
    for name in selection.selected_modules(design) {
        let Some(module) = design.module_mut(&name) else { continue };
        let _span = debug_span!("abstract", module = %name).entered();
        changed += match mode {
            AbstractMode::State => {
                let enable = options.enable_logic(module)?;
                abstract_state(module, &cell_types, selection, enable, &options.slices)?
            }
            AbstractMode::Value => {
                let enable = options.enable_logic(module)?;
                abstract_value(module, &cell_types, selection, enable, &options.slices)?
            }
            AbstractMode::Init => abstract_init(module, &cell_types, selection, &options.slices)?,
        };
    }
    let report = AbstractReport { mode, changed };
    info!("{report}");
    Ok(report)
}

/// Runs the pass with command-line style arguments, e.g. `["-state", "-enable", "en", "top/q"]`.
pub fn abstract_pass<S: AsRef<str>>(design: &mut Design, args: &[S]) -> Result<AbstractReport, Error> {
    let (options, patterns) = AbstractOptions::parse(args)?;
    let selection = Selection::parse(&patterns)?;
    abstract_design(design, &options, &selection)
}

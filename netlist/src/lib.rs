//! This library provides the in-memory form of a Yosys-style RTLIL netlist.
//!
//! A [`Design`] is a collection of [`Module`]s. Each module holds named [`Wire`]s, named [`Cell`]s
//! whose ports are connected to [`Value`]s (sequences of wire bits and constants), and direct
//! connections between wire bits. Bits that are joined by direct connections are the same signal;
//! [`SigMap`] computes a canonical representative for each of them.

mod logic;
mod value;
mod param;
mod wire;
mod cell;
mod module;
mod design;
mod sigmap;
mod init;
mod select;
mod print;
mod parse;

pub use logic::{Trit, Const};
pub use value::{Net, ControlNet, Value};
pub use param::ParamValue;
pub use wire::{Wire, WireId};
pub use cell::{Cell, CellId, CellTypes, PortDirection, FlipFlop};
pub use module::Module;
pub use design::Design;
pub use sigmap::SigMap;
pub use init::InitValues;
pub use select::{Selection, SelectError};
pub use parse::{parse, ParseError};

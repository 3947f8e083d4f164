//! Reading and writing netlists in the JSON format of Yosys `write_json`.

mod yosys;
mod import;
mod export;

pub use import::{Error, import};
pub use export::export;

use std::fmt::Display;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::{Module, ParseError};

/// A design is an ordered collection of [`Module`]s, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Design {
    modules: IndexMap<String, Module>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn modules_mut(&mut self) -> impl Iterator<Item = &mut Module> {
        self.modules.values_mut()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn module_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn add_module(&mut self, module: Module) -> &mut Module {
        assert!(!self.modules.contains_key(module.name()), "module {} already exists", module.name());
        let (index, _) = self.modules.insert_full(module.name().to_string(), module);
        &mut self.modules[index]
    }
}

impl FromStr for Design {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        crate::parse(source)
    }
}

/// Formats the design as RTLIL text.
impl Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::print::write_design(f, self)
    }
}

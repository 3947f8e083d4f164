use std::fmt::Display;

use crate::{CellId, Design, Module, WireId};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pattern {
    module: Option<String>,
    member: String,
}

/// A set of selected wires and cells across the modules of a design.
///
/// A selection is described by a list of patterns of the form `module/member` or `member`; the
/// latter is matched against the members of every module. Patterns may use `*` and `?` wildcards.
/// Public names (those starting with `\`) may be written with or without the backslash. An empty
/// list of patterns selects everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectError {
    pub pattern: String,
}

impl Display for SelectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid selection pattern '{}'", self.pattern)
    }
}

impl std::error::Error for SelectError {}

fn glob_match(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| glob_match(rest, &text[skip..])),
        Some(('?', rest)) => !text.is_empty() && glob_match(rest, &text[1..]),
        Some((chr, rest)) => text.first() == Some(chr) && glob_match(rest, &text[1..]),
    }
}

fn name_matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let full: Vec<char> = name.chars().collect();
    if glob_match(&pattern, &full) {
        return true;
    }
    match name.strip_prefix('\\') {
        Some(public) => glob_match(&pattern, &public.chars().collect::<Vec<_>>()),
        None => false,
    }
}

impl Selection {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn parse<S: AsRef<str>>(patterns: &[S]) -> Result<Self, SelectError> {
        let mut selection = Selection::full();
        for pattern in patterns {
            let text = pattern.as_ref();
            let error = || SelectError { pattern: text.to_string() };
            let (module, member) = match text.split_once('/') {
                Some((module, member)) => (Some(module), member),
                None => (None, text),
            };
            if module == Some("") || member.is_empty() {
                return Err(error());
            }
            selection.patterns.push(Pattern { module: module.map(str::to_string), member: member.to_string() });
        }
        Ok(selection)
    }

    pub fn is_full(&self) -> bool {
        self.patterns.is_empty()
    }

    fn patterns_for<'a>(&'a self, module: &'a Module) -> impl Iterator<Item = &'a str> + 'a {
        self.patterns.iter().filter_map(move |pattern| match &pattern.module {
            Some(module_pattern) if !name_matches(module_pattern, module.name()) => None,
            _ => Some(pattern.member.as_str()),
        })
    }

    /// Returns `true` if a wire or cell named `name` in `module` is selected.
    pub fn selects_member(&self, module: &Module, name: &str) -> bool {
        self.is_full() || self.patterns_for(module).any(|member| name_matches(member, name))
    }

    /// Returns the names of modules with at least one selected wire or cell, in design order.
    pub fn selected_modules(&self, design: &Design) -> Vec<String> {
        design
            .modules()
            .filter(|module| {
                self.is_full()
                    || module.selected_wires(self).len() + module.selected_cells(self).len() > 0
                    || self.patterns_for(module).any(|member| member == "*")
            })
            .map(|module| module.name().to_string())
            .collect()
    }
}

impl Module {
    pub fn selected_wires(&self, selection: &Selection) -> Vec<WireId> {
        self.wires().filter(|(_, wire)| selection.selects_member(self, &wire.name)).map(|(wire_id, _)| wire_id).collect()
    }

    pub fn selected_cells(&self, selection: &Selection) -> Vec<CellId> {
        self.cells().filter(|(_, cell)| selection.selects_member(self, &cell.name)).map(|(cell_id, _)| cell_id).collect()
    }
}

//! `Define` collection and `${name}` substitution
//!
//! `Define SRVROOT "/opt/web"` declares a variable that later lines reference
//! as `${SRVROOT}`.

use crate::parser::classifier::classify;
use crate::parser::lexer::tokenize;
use crate::parser::patterns::TypeMatcher;
use httpdconf_core::{ConfigurationLine, ModuleInventory};
use regex::{NoExpand, Regex};
use serde::Serialize;

/// Directive name that declares variables
pub const DEFINE_DIRECTIVE: &str = "Define";

/// A declared variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Define {
    pub name: String,
    pub value: String,
}

impl Define {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build from the text after the `Define` keyword.
    ///
    /// A missing value yields an empty string.
    pub fn from_arguments(arguments: &str) -> Option<Self> {
        let tokens = tokenize(arguments);
        if tokens.head.is_empty() {
            return None;
        }
        let value = tokens.joined_values().replace('\\', "/");
        Some(Self::new(tokens.head, value))
    }

    fn reference_pattern(&self) -> Option<Regex> {
        Regex::new(&format!(r"\$\{{ *{} *\}}", regex::escape(&self.name))).ok()
    }
}

/// Ordered set of Defines with their reference patterns
#[derive(Debug, Clone, Default)]
pub struct DefineTable {
    entries: Vec<(Define, Regex)>,
}

impl DefineTable {
    /// Table that substitutes nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table in declaration order.
    ///
    /// Each value is expanded against the Defines declared before it. A
    /// redefinition is kept as its own entry after the earlier one, so the
    /// first declaration of a name is the one references resolve to.
    pub fn new(defines: Vec<Define>) -> Self {
        let mut table = Self::empty();
        for mut define in defines {
            define.value = table.substitute(&define.value);
            if let Some(pattern) = define.reference_pattern() {
                table.entries.push((define, pattern));
            }
        }
        table
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn defines(&self) -> impl Iterator<Item = &Define> {
        self.entries.iter().map(|(define, _)| define)
    }

    /// Value a `${name}` reference resolves to
    pub fn get(&self, name: &str) -> Option<&str> {
        self.defines()
            .find(|define| define.name == name)
            .map(|define| define.value.as_str())
    }

    /// Replace `${name}` references, one pass per Define in declaration order
    pub fn substitute(&self, line: &str) -> String {
        let mut result = line.to_string();
        for (define, pattern) in &self.entries {
            if pattern.is_match(&result) {
                result = pattern
                    .replace_all(&result, NoExpand(&define.value))
                    .into_owned();
            }
        }
        result
    }
}

/// Harvest every active `Define` in the resolved configuration.
///
/// VirtualHost content is always included and no substitution happens while
/// collecting.
pub fn collect_defines(lines: &[ConfigurationLine], modules: &ModuleInventory) -> Vec<Define> {
    let matcher = TypeMatcher::new(DEFINE_DIRECTIVE);
    let defines: Vec<Define> = classify(lines, &DefineTable::empty(), modules, true)
        .iter()
        .filter(|line| line.is_effective() && matcher.is_directive(line.processed()))
        .filter_map(|line| Define::from_arguments(matcher.directive_remainder(line.processed())))
        .collect();

    tracing::debug!("🔣 Collected {} Define(s)", defines.len());
    defines
}

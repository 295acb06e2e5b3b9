//! Ordered rule registry
//!
//! The registry is the process-wide rule configuration: built once, validated once, then only
//! read. Order matters, since each rule runs over the output of the rules before it.

use std::collections::HashSet;

use super::error::RegistryError;
use super::rule::PatternRule;

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<PatternRule>,
}

impl RuleRegistry {
    /// Build a registry, rejecting duplicate rule names.
    ///
    /// Capture arity is checked when each [PatternRule] is constructed.
    pub fn new(rules: Vec<PatternRule>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name()) {
                return Err(RegistryError::DuplicateRule(rule.name().to_string()));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|rule| rule.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(PatternRule::name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> IntoIterator for &'a RuleRegistry {
    type Item = &'a PatternRule;
    type IntoIter = std::slice::Iter<'a, PatternRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

//! Rule registry.
//!
//! A [`RuleSet`] is built once and then only read. The process-wide default
//! set lives in a `OnceCell` and is shared by reference.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::Config;
use crate::error::{Error, Result};

use super::{DetectorRule, LongFunctionRule, MagicNumberRule, LONG_FUNCTION, MAGIC_NUMBER};

/// Ids of the built-in rules, in default order.
pub const BUILTIN_RULES: &[&str] = &[LONG_FUNCTION, MAGIC_NUMBER];

/// Static storage for the default rule set.
static DEFAULT_RULES: OnceCell<RuleSet> = OnceCell::new();

/// The built-in rules with default settings.
///
/// Initialized on first use; never mutated afterwards.
pub fn default_rules() -> &'static RuleSet {
    DEFAULT_RULES.get_or_init(RuleSet::builtin)
}

/// Ordered, immutable collection of detector rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn DetectorRule>>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Registration order is report order for issues found
    /// on the same node.
    pub fn with<R: DetectorRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append an already shared rule.
    pub fn with_shared(mut self, rule: Arc<dyn DetectorRule>) -> Self {
        self.rules.push(rule);
        self
    }

    /// All built-in rules with default settings.
    pub fn builtin() -> Self {
        Self::new()
            .with(LongFunctionRule::default())
            .with(MagicNumberRule::default())
    }

    /// Rules named by `config`, in its order, with its settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut set = Self::new();
        for id in config.rule_ids() {
            let rule = builtin_rule(&id, config)
                .ok_or_else(|| Error::Config(format!("unknown rule {:?}", id)))?;
            set = set.with_shared(rule);
        }
        Ok(set)
    }

    /// Subset of this set, in the order of `ids`.
    pub fn select(&self, ids: &[&str]) -> Result<Self> {
        let mut set = Self::new();
        for id in ids {
            let rule = self
                .get(id)
                .ok_or_else(|| Error::Config(format!("rule {:?} is not registered", id)))?;
            set = set.with_shared(rule);
        }
        Ok(set)
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn DetectorRule>> {
        self.rules.iter().find(|r| r.id() == id).cloned()
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn DetectorRule>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn builtin_rule(id: &str, config: &Config) -> Option<Arc<dyn DetectorRule>> {
    match id {
        LONG_FUNCTION => Some(Arc::new(LongFunctionRule::new(config.max_statements()))),
        MAGIC_NUMBER => Some(Arc::new(MagicNumberRule::new(
            config.allowed_values(),
            config.allow_assignments(),
        ))),
        _ => None,
    }
}

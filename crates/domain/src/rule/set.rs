//! Rule set — the arena that owns a session's rules and their gate states.
//!
//! Rules reference each other only by [`RuleId`] (or by key within their
//! group), so cycles and forward references need no special handling.

use std::collections::HashMap;

use crate::error::{AutotapError, NotFoundError, ValidationError};
use crate::id::RuleId;
use crate::time::Millis;

use super::{GatePhase, GateState, Rule};

/// Rules in evaluation order plus their gating state.
#[derive(Debug)]
pub struct RuleSet<S> {
    rules: Vec<Rule<S>>,
    positions: HashMap<RuleId, usize>,
    gates: HashMap<RuleId, GateState>,
}

impl<S> Default for RuleSet<S> {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            positions: HashMap::new(),
            gates: HashMap::new(),
        }
    }
}

impl<S> RuleSet<S> {
    /// Take ownership of `rules`, order them by `index` and resolve every
    /// `pre_keys` entry into `pre_rules`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::Validation`] when a rule is invalid, two rules
    /// share an id, a key is used twice within one group, a pre-key names no
    /// rule of the same group, or a pre-rule is not part of the set.
    pub fn new(mut rules: Vec<Rule<S>>) -> Result<Self, AutotapError> {
        rules.sort_by_key(|rule| rule.index);

        let mut keys: HashMap<(i32, i32), RuleId> = HashMap::new();
        let mut positions = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            rule.validate()?;
            if let Some(key) = rule.key {
                if keys.insert((rule.group_key, key), rule.id).is_some() {
                    return Err(ValidationError::DuplicateKey(key).into());
                }
            }
            if positions.insert(rule.id, position).is_some() {
                return Err(ValidationError::DuplicateRuleId(rule.id).into());
            }
        }

        for rule in &mut rules {
            for pre_key in &rule.pre_keys {
                let target = keys.get(&(rule.group_key, *pre_key)).ok_or(
                    ValidationError::UnknownPreKey {
                        rule_key: rule.key,
                        pre_key: *pre_key,
                    },
                )?;
                rule.pre_rules.insert(*target);
            }
            if let Some(unknown) = rule
                .pre_rules
                .iter()
                .find(|id| !positions.contains_key(id))
            {
                return Err(ValidationError::UnknownPreRule(*unknown).into());
            }
        }

        let gates = rules
            .iter()
            .map(|rule| (rule.id, GateState::default()))
            .collect();

        Ok(Self {
            rules,
            positions,
            gates,
        })
    }

    /// Replace the configuration, keeping gate state of rules whose id
    /// survives the reload.
    ///
    /// # Errors
    ///
    /// Same as [`RuleSet::new`]; on error the current set is left untouched.
    pub fn reload(&mut self, rules: Vec<Rule<S>>) -> Result<(), AutotapError> {
        self.replace(Self::new(rules)?);
        Ok(())
    }

    /// Swap in an already built set, carrying over the gate state of rules
    /// present in both.
    pub fn replace(&mut self, mut next: Self) {
        for (id, gate) in &mut next.gates {
            if let Some(previous) = self.gates.get(id) {
                *gate = *previous;
            }
        }
        *self = next;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Rule<S>> {
        self.rules.iter()
    }

    #[must_use]
    pub fn get(&self, id: RuleId) -> Option<&Rule<S>> {
        self.positions.get(&id).map(|&position| &self.rules[position])
    }

    /// Rule at `position` in evaluation order.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&Rule<S>> {
        self.rules.get(position)
    }

    #[must_use]
    pub fn gate(&self, id: RuleId) -> Option<GateState> {
        self.gates.get(&id).copied()
    }

    /// Cooldown elapsed and not inside a delay window.
    ///
    /// Unknown ids are never eligible.
    #[must_use]
    pub fn is_eligible(&self, id: RuleId, now: Millis) -> bool {
        match (self.get(id), self.gates.get(&id)) {
            (Some(rule), Some(gate)) => gate.is_eligible(now, rule.cd, rule.delay),
            _ => false,
        }
    }

    /// Where rule `id` stands at `now`, or `None` for unknown ids.
    #[must_use]
    pub fn phase(&self, id: RuleId, now: Millis) -> Option<GatePhase> {
        let rule = self.get(id)?;
        let gate = self.gates.get(&id)?;
        Some(gate.phase(now, rule.cd, rule.delay))
    }

    /// See [`Rule::pre_rules_satisfied`].
    #[must_use]
    pub fn pre_rules_satisfied(&self, id: RuleId, last_triggered: Option<RuleId>) -> bool {
        self.get(id)
            .is_some_and(|rule| rule.pre_rules_satisfied(last_triggered))
    }

    /// Record that rule `id` fired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::NotFound`] when `id` is not in the set.
    pub fn mark_triggered(&mut self, id: RuleId, now: Millis) -> Result<(), AutotapError> {
        self.gate_mut(id)?.mark_triggered(now);
        Ok(())
    }

    /// Park rule `id` at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::NotFound`] when `id` is not in the set.
    pub fn mark_delayed(&mut self, id: RuleId, now: Millis) -> Result<(), AutotapError> {
        self.gate_mut(id)?.mark_delayed(now);
        Ok(())
    }

    fn gate_mut(&mut self, id: RuleId) -> Result<&mut GateState, NotFoundError> {
        self.gates.get_mut(&id).ok_or_else(|| NotFoundError {
            entity: "Rule",
            id: id.to_string(),
        })
    }
}

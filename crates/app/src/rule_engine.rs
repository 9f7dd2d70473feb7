//! Rule engine — evaluates a rule set against UI-tree snapshots.
//!
//! The host calls [`RuleEngine::process_snapshot`] on its event thread each
//! time the foreground tree changes. Each pass walks the rules in order and
//! fires at most one of them; rules with a delay are parked first and fire
//! on a later pass once their delay has elapsed.

use std::time::Duration;

use autotap_domain::action::ActionResult;
use autotap_domain::error::AutotapError;
use autotap_domain::id::RuleId;
use autotap_domain::rule::{Rule, RuleSet};
use autotap_domain::selector::SelectorEngine;

use crate::actions;
use crate::ports::{AutomationHost, Clock, TriggerRecord, TriggerRegistry};

/// A rule that fired during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredRule {
    pub rule_id: RuleId,
    pub label: String,
    pub result: ActionResult,
}

/// A rule that matched but was parked instead of firing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedRule {
    pub rule_id: RuleId,
    pub label: String,
    /// Evaluate again after this long to let the rule fire.
    pub retry_after: Duration,
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub fired: Option<FiredRule>,
    pub delayed: Vec<DelayedRule>,
}

/// Single-threaded rule evaluator with injected host collaborators.
pub struct RuleEngine<E: SelectorEngine, H, C, R> {
    selectors: E,
    host: H,
    clock: C,
    registry: R,
    rules: RuleSet<E::Selector>,
}

impl<E, H, C, R> RuleEngine<E, H, C, R>
where
    E: SelectorEngine<Node = H::Node>,
    H: AutomationHost,
    C: Clock,
    R: TriggerRegistry,
{
    /// Create a new engine.
    pub fn new(selectors: E, host: H, clock: C, registry: R, rules: RuleSet<E::Selector>) -> Self {
        Self {
            selectors,
            host,
            clock,
            registry,
            rules,
        }
    }

    pub fn rules(&self) -> &RuleSet<E::Selector> {
        &self.rules
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Swap in a new configuration, keeping gate state of surviving rules.
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::Validation`] if the new rules do not form a
    /// valid set; the current rules stay in place.
    #[tracing::instrument(skip(self, rules), fields(count = rules.len()))]
    pub fn reload(&mut self, rules: Vec<Rule<E::Selector>>) -> Result<(), AutotapError> {
        self.rules.reload(rules)
    }

    /// Run one evaluation pass for the current foreground `activity_id`.
    ///
    /// For each rule, in order: skip unless eligible (cooldown over and not
    /// parked inside its delay), its pre-rules are satisfied, the activity
    /// is in scope and the match chain finds a target. A matching rule with
    /// a delay that is not parked yet gets parked and the pass moves on.
    /// Otherwise its action is dispatched, it is marked triggered and the
    /// pass ends.
    #[tracing::instrument(skip(self), fields(rules = self.rules.len()))]
    pub fn process_snapshot(&mut self, activity_id: Option<&str>) -> PassReport {
        let now = self.clock.now_millis();
        let root = self.host.root_node();
        let launcher = self.host.launcher_activity_id();
        let last_triggered = self.registry.last_triggered().map(|record| record.rule_id);
        let mut report = PassReport::default();

        for position in 0..self.rules.len() {
            let Some(rule) = self.rules.at(position) else {
                break;
            };
            let rule_id = rule.id;

            if !self.rules.is_eligible(rule_id, now) {
                let phase = self.rules.phase(rule_id, now);
                tracing::debug!(%rule_id, ?phase, "rule skipped: not eligible");
                continue;
            }
            if !rule.pre_rules_satisfied(last_triggered) {
                tracing::debug!(%rule_id, ?last_triggered, "rule skipped: pre rules not satisfied");
                continue;
            }
            if !rule.matches_activity(activity_id, launcher.as_deref()) {
                tracing::debug!(%rule_id, activity = ?activity_id, "rule skipped: activity out of scope");
                continue;
            }
            let Some(target) = rule.evaluate_match(&self.selectors, root.as_ref()) else {
                tracing::debug!(%rule_id, "rule skipped: no match");
                continue;
            };
            tracing::debug!(%rule_id, "rule matched");

            let label = rule.label();
            let delay = rule.delay;
            let action = rule.action;
            let parked = self.rules.gate(rule_id).is_some_and(|gate| gate.is_parked());

            if !delay.is_zero() && !parked {
                if let Err(err) = self.rules.mark_delayed(rule_id, now) {
                    tracing::warn!(error = %err, rule = %label, "failed to park rule");
                    continue;
                }
                tracing::info!(rule = %label, delay_ms = delay.as_millis(), "rule parked");
                report.delayed.push(DelayedRule {
                    rule_id,
                    label,
                    retry_after: delay,
                });
                continue;
            }

            let result = actions::perform(action, &self.host, &target);
            if let Err(err) = self.rules.mark_triggered(rule_id, now) {
                tracing::warn!(error = %err, rule = %label, "failed to mark rule triggered");
            }
            self.registry.record(TriggerRecord { rule_id, at: now });

            if result.succeeded {
                tracing::info!(rule = %label, action = %result.action, "rule fired");
            } else {
                tracing::warn!(rule = %label, action = %result.action, "rule fired but dispatch failed");
            }

            report.fired = Some(FiredRule {
                rule_id,
                label,
                result,
            });
            break;
        }

        report
    }
}

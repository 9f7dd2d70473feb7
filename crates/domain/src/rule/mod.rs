//! Rule — a declarative "when this is on screen, tap it" instruction.
//!
//! A rule carries immutable configuration only: the selector chains it
//! matches with, the activity scope it is restricted to, its timing
//! parameters and the action it dispatches. Firing history lives in a
//! separate [`GateState`], owned together with the rule by a [`RuleSet`].
//!
//! The selector type `S` is whatever the selector collaborator compiles
//! selectors into; rules never look inside it.

mod gate;
mod scope;
mod set;

pub use gate::{GatePhase, GateState};
pub use scope::ActivityScope;
pub use set::RuleSet;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::action::ActionKind;
use crate::error::{AutotapError, ValidationError};
use crate::id::RuleId;
use crate::selector::SelectorEngine;
use crate::subscription::{AppRaw, GroupRaw, RuleRaw, SubsItem};

/// Cooldown applied when none is configured.
pub const DEFAULT_CD: Duration = Duration::from_millis(1000);

/// Back-references to the raw records a rule was assembled from.
#[derive(Debug, Clone)]
pub struct RuleOrigin {
    pub subs_item: Arc<SubsItem>,
    pub app: Arc<AppRaw>,
    pub group: Arc<GroupRaw>,
    pub rule: Arc<RuleRaw>,
}

/// An automation rule evaluated against UI-tree snapshots.
#[derive(Debug, Clone)]
pub struct Rule<S> {
    pub id: RuleId,
    /// Key used by `pre_keys` of sibling rules in the same group.
    pub key: Option<i32>,
    /// Group the rule belongs to; keys are unique within a group.
    pub group_key: i32,
    /// Evaluation order within a [`RuleSet`].
    pub index: usize,
    /// Chained selectors; each one is evaluated against the previous match.
    pub matches: Vec<S>,
    /// Root-relative selectors that disqualify the rule when any matches.
    pub exclude_matches: Vec<S>,
    /// The rule fires only if one of these fired most recently.
    pub pre_rules: BTreeSet<RuleId>,
    /// Same as `pre_rules`, by key; resolved when the rule joins a set.
    pub pre_keys: BTreeSet<i32>,
    pub cd: Duration,
    pub delay: Duration,
    pub match_launcher: bool,
    pub quick_find: bool,
    pub app_id: String,
    pub scope: ActivityScope,
    pub action: ActionKind,
    pub origin: Option<RuleOrigin>,
}

impl<S> Rule<S> {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder<S> {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::Validation`] when:
    /// - `matches` is empty ([`ValidationError::EmptyMatches`])
    /// - `app_id` is empty ([`ValidationError::EmptyAppId`])
    pub fn validate(&self) -> Result<(), AutotapError> {
        if self.matches.is_empty() {
            return Err(ValidationError::EmptyMatches.into());
        }
        if self.app_id.is_empty() {
            return Err(ValidationError::EmptyAppId.into());
        }
        Ok(())
    }

    /// Human-readable label for logs: the raw rule name, else the key.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(name) = self
            .origin
            .as_ref()
            .and_then(|origin| origin.rule.name.as_deref())
        {
            return name.to_string();
        }
        match self.key {
            Some(key) => format!("{}#{}:{key}", self.app_id, self.group_key),
            None => format!("{}#{}", self.app_id, self.group_key),
        }
    }

    /// Run the match chain against `root`.
    ///
    /// The first selector queries `root`, each following selector queries
    /// the node produced by the previous one. Any missing link fails the
    /// whole evaluation. Exclusion selectors are then checked against
    /// `root`; a hit on any of them also fails. On success the node of the
    /// last `matches` selector is returned.
    pub fn evaluate_match<E>(&self, engine: &E, root: Option<&E::Node>) -> Option<E::Node>
    where
        E: SelectorEngine<Selector = S>,
    {
        let root = root?;
        let (first, rest) = self.matches.split_first()?;
        let mut target = engine.query(root, first, self.quick_find)?;
        for selector in rest {
            target = engine.query(&target, selector, self.quick_find)?;
        }
        let excluded = self
            .exclude_matches
            .iter()
            .any(|selector| engine.query(root, selector, self.quick_find).is_some());
        if excluded {
            return None;
        }
        Some(target)
    }

    /// Whether the current activity is in this rule's scope.
    #[must_use]
    pub fn matches_activity(
        &self,
        activity_id: Option<&str>,
        launcher_activity_id: Option<&str>,
    ) -> bool {
        self.scope
            .matches(activity_id, self.match_launcher, launcher_activity_id)
    }

    /// `true` when the rule has no pre-rules, or `last_triggered` is one of them.
    #[must_use]
    pub fn pre_rules_satisfied(&self, last_triggered: Option<RuleId>) -> bool {
        self.pre_rules.is_empty()
            || last_triggered.is_some_and(|last| self.pre_rules.contains(&last))
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug)]
pub struct RuleBuilder<S> {
    id: Option<RuleId>,
    key: Option<i32>,
    group_key: i32,
    index: usize,
    matches: Vec<S>,
    exclude_matches: Vec<S>,
    pre_rules: BTreeSet<RuleId>,
    pre_keys: BTreeSet<i32>,
    cd: Option<Duration>,
    delay: Duration,
    match_launcher: bool,
    quick_find: bool,
    app_id: Option<String>,
    activity_ids: BTreeSet<String>,
    exclude_activity_ids: BTreeSet<String>,
    action: ActionKind,
    origin: Option<RuleOrigin>,
}

impl<S> Default for RuleBuilder<S> {
    fn default() -> Self {
        Self {
            id: None,
            key: None,
            group_key: 0,
            index: 0,
            matches: Vec::new(),
            exclude_matches: Vec::new(),
            pre_rules: BTreeSet::new(),
            pre_keys: BTreeSet::new(),
            cd: None,
            delay: Duration::ZERO,
            match_launcher: false,
            quick_find: false,
            app_id: None,
            activity_ids: BTreeSet::new(),
            exclude_activity_ids: BTreeSet::new(),
            action: ActionKind::default(),
            origin: None,
        }
    }
}

impl<S> RuleBuilder<S> {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn key(mut self, key: i32) -> Self {
        self.key = Some(key);
        self
    }

    #[must_use]
    pub fn group_key(mut self, group_key: i32) -> Self {
        self.group_key = group_key;
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Append a selector to the match chain.
    #[must_use]
    pub fn matches(mut self, selector: S) -> Self {
        self.matches.push(selector);
        self
    }

    #[must_use]
    pub fn exclude_match(mut self, selector: S) -> Self {
        self.exclude_matches.push(selector);
        self
    }

    #[must_use]
    pub fn pre_rule(mut self, id: RuleId) -> Self {
        self.pre_rules.insert(id);
        self
    }

    #[must_use]
    pub fn pre_key(mut self, key: i32) -> Self {
        self.pre_keys.insert(key);
        self
    }

    #[must_use]
    pub fn cd(mut self, cd: Duration) -> Self {
        self.cd = Some(cd);
        self
    }

    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn match_launcher(mut self, match_launcher: bool) -> Self {
        self.match_launcher = match_launcher;
        self
    }

    #[must_use]
    pub fn quick_find(mut self, quick_find: bool) -> Self {
        self.quick_find = quick_find;
        self
    }

    #[must_use]
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    #[must_use]
    pub fn activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.activity_ids.insert(activity_id.into());
        self
    }

    #[must_use]
    pub fn exclude_activity_id(mut self, activity_id: impl Into<String>) -> Self {
        self.exclude_activity_ids.insert(activity_id.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionKind) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: RuleOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`AutotapError::Validation`] if `matches` or `app_id` is empty.
    pub fn build(self) -> Result<Rule<S>, AutotapError> {
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            key: self.key,
            group_key: self.group_key,
            index: self.index,
            matches: self.matches,
            exclude_matches: self.exclude_matches,
            pre_rules: self.pre_rules,
            pre_keys: self.pre_keys,
            cd: self.cd.unwrap_or(DEFAULT_CD),
            delay: self.delay,
            match_launcher: self.match_launcher,
            quick_find: self.quick_find,
            app_id: self.app_id.unwrap_or_default(),
            scope: ActivityScope::new(self.activity_ids, self.exclude_activity_ids),
            action: self.action,
            origin: self.origin,
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Tree of numbered nodes; a selector names the node it looks for and
    /// finds it among the queried node and its descendants.
    struct FakeEngine {
        parents: HashMap<u32, u32>,
        queries: RefCell<Vec<(u32, u32)>>,
        quick_finds: RefCell<Vec<bool>>,
    }

    impl FakeEngine {
        fn new(edges: &[(u32, u32)]) -> Self {
            Self {
                parents: edges.iter().map(|&(parent, child)| (child, parent)).collect(),
                queries: RefCell::new(Vec::new()),
                quick_finds: RefCell::new(Vec::new()),
            }
        }

        fn is_within(&self, node: u32, ancestor: u32) -> bool {
            let mut current = Some(node);
            while let Some(n) = current {
                if n == ancestor {
                    return true;
                }
                current = self.parents.get(&n).copied();
            }
            false
        }
    }

    impl SelectorEngine for FakeEngine {
        type Node = u32;
        type Selector = u32;

        fn query(&self, node: &u32, selector: &u32, quick_find: bool) -> Option<u32> {
            self.queries.borrow_mut().push((*node, *selector));
            self.quick_finds.borrow_mut().push(quick_find);
            let exists = *selector == 0 || self.parents.contains_key(selector);
            (exists && self.is_within(*selector, *node)).then_some(*selector)
        }
    }

    // 0 ─┬─ 1 ── 2 ── 3
    //    └─ 4
    fn engine() -> FakeEngine {
        FakeEngine::new(&[(0, 1), (1, 2), (2, 3), (0, 4)])
    }

    fn rule(matches: &[u32], excludes: &[u32]) -> Rule<u32> {
        let mut builder = Rule::builder().app_id("com.app");
        for &m in matches {
            builder = builder.matches(m);
        }
        for &e in excludes {
            builder = builder.exclude_match(e);
        }
        builder.build().unwrap()
    }

    #[test]
    fn should_build_rule_with_defaults() {
        let rule = rule(&[1], &[]);
        assert_eq!(rule.cd, DEFAULT_CD);
        assert_eq!(rule.delay, Duration::ZERO);
        assert_eq!(rule.action, ActionKind::Click);
        assert!(rule.scope.matches_any());
        assert!(!rule.quick_find);
        assert!(!rule.match_launcher);
    }

    #[test]
    fn should_return_validation_error_when_matches_is_empty() {
        let result = Rule::<u32>::builder().app_id("com.app").build();
        assert!(matches!(
            result,
            Err(AutotapError::Validation(ValidationError::EmptyMatches))
        ));
    }

    #[test]
    fn should_return_validation_error_when_app_id_is_empty() {
        let result = Rule::builder().matches(1_u32).build();
        assert!(matches!(
            result,
            Err(AutotapError::Validation(ValidationError::EmptyAppId))
        ));
    }

    #[test]
    fn should_return_none_for_missing_root() {
        let rule = rule(&[1], &[]);
        assert_eq!(rule.evaluate_match(&engine(), None), None);
    }

    #[test]
    fn should_return_last_match_of_chain() {
        let rule = rule(&[1, 2, 3], &[]);
        assert_eq!(rule.evaluate_match(&engine(), Some(&0)), Some(3));
    }

    #[test]
    fn should_query_each_selector_against_previous_result() {
        let engine = engine();
        let rule = rule(&[1, 2, 3], &[]);
        rule.evaluate_match(&engine, Some(&0));
        assert_eq!(*engine.queries.borrow(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn should_fail_when_later_selector_is_not_below_previous_match() {
        // 4 exists under the root but not under 1.
        let rule = rule(&[1, 4], &[]);
        assert_eq!(rule.evaluate_match(&engine(), Some(&0)), None);
    }

    #[test]
    fn should_short_circuit_on_first_missing_link() {
        let engine = engine();
        let rule = rule(&[9, 1, 2], &[]);
        assert_eq!(rule.evaluate_match(&engine, Some(&0)), None);
        assert_eq!(engine.queries.borrow().len(), 1);
    }

    #[test]
    fn should_fail_when_any_exclude_matches() {
        let rule = rule(&[1], &[9, 4]);
        assert_eq!(rule.evaluate_match(&engine(), Some(&0)), None);
    }

    #[test]
    fn should_check_excludes_against_root() {
        let engine = engine();
        let rule = rule(&[1, 2], &[9]);
        assert_eq!(rule.evaluate_match(&engine, Some(&0)), Some(2));
        assert_eq!(engine.queries.borrow().last(), Some(&(0, 9)));
    }

    #[test]
    fn should_pass_quick_find_to_every_query() {
        let engine = engine();
        let rule = Rule::builder()
            .app_id("com.app")
            .matches(1_u32)
            .matches(2)
            .exclude_match(9)
            .quick_find(true)
            .build()
            .unwrap();

        assert_eq!(rule.evaluate_match(&engine, Some(&0)), Some(2));
        assert_eq!(*engine.quick_finds.borrow(), vec![true, true, true]);
    }

    #[test]
    fn should_query_without_quick_find_by_default() {
        let engine = engine();
        rule(&[1], &[9]).evaluate_match(&engine, Some(&0));
        assert_eq!(*engine.quick_finds.borrow(), vec![false, false]);
    }

    #[test]
    fn should_delegate_activity_matching_to_scope() {
        let rule = Rule::builder()
            .app_id("com.app")
            .matches(1_u32)
            .activity_id("com.app.Main")
            .match_launcher(true)
            .build()
            .unwrap();
        assert!(rule.matches_activity(Some("com.app.MainSettings"), None));
        assert!(!rule.matches_activity(Some("com.app.Other"), None));
        assert!(rule.matches_activity(Some("com.home.Launcher"), Some("com.home.Launcher")));
    }

    #[test]
    fn should_satisfy_pre_rules_only_for_listed_last_trigger() {
        let pre = RuleId::new();
        let rule = Rule::builder()
            .app_id("com.app")
            .matches(1_u32)
            .pre_rule(pre)
            .build()
            .unwrap();
        assert!(!rule.pre_rules_satisfied(None));
        assert!(!rule.pre_rules_satisfied(Some(RuleId::new())));
        assert!(rule.pre_rules_satisfied(Some(pre)));
    }

    #[test]
    fn should_satisfy_empty_pre_rules_always() {
        let rule = rule(&[1], &[]);
        assert!(rule.pre_rules_satisfied(None));
        assert!(rule.pre_rules_satisfied(Some(RuleId::new())));
    }

    #[test]
    fn should_label_rule_by_key_without_origin() {
        let rule = Rule::builder()
            .app_id("com.app")
            .group_key(2)
            .key(5)
            .matches(1_u32)
            .build()
            .unwrap();
        assert_eq!(rule.label(), "com.app#2:5");
    }
}

//! Rule loader — turns raw subscription records into an evaluable [`RuleSet`].
//!
//! Settings missing on a rule are inherited from its group, then from its
//! app. Selector strings go through an injected compiler so this layer never
//! knows the selector syntax.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use autotap_domain::action::ActionKind;
use autotap_domain::error::{AutotapError, ValidationError};
use autotap_domain::id::RuleId;
use autotap_domain::rule::{Rule, RuleOrigin, RuleSet};
use autotap_domain::subscription::{AppRaw, SubsItem};

/// Build the rule set of one app from its raw records.
///
/// Disabled subscriptions yield an empty set and disabled groups are
/// skipped. Rules are indexed in declaration order. Ids are derived from
/// the subscription id and the rule's position, so loading the same records
/// again yields the same ids and a reload keeps their gate state.
///
/// # Errors
///
/// Returns [`AutotapError::Adapter`] when a selector fails to compile, or
/// [`AutotapError::Validation`] when two groups share a key or the
/// assembled rules are invalid.
#[tracing::instrument(skip_all, fields(subscription = %subs_item.id, app = %app.id))]
pub fn assemble_rules<S, F, CE>(
    subs_item: SubsItem,
    app: AppRaw,
    mut compile: F,
) -> Result<RuleSet<S>, AutotapError>
where
    F: FnMut(&str) -> Result<S, CE>,
    CE: std::error::Error + Send + Sync + 'static,
{
    if !subs_item.enable {
        tracing::debug!("subscription disabled, no rules loaded");
        return RuleSet::new(Vec::new());
    }

    let mut group_keys = HashSet::with_capacity(app.groups.len());
    if let Some(group) = app.groups.iter().find(|group| !group_keys.insert(group.key)) {
        tracing::warn!(group_key = group.key, "group key used more than once");
        return Err(ValidationError::DuplicateGroupKey(group.key).into());
    }

    let subs_item = Arc::new(subs_item);
    let app = Arc::new(app);
    let mut rules = Vec::new();

    for group in app.groups.iter().filter(|group| group.is_enabled()) {
        let group = Arc::new(group.clone());
        for (position, raw) in group.rules.iter().enumerate() {
            let origin = RuleOrigin {
                subs_item: Arc::clone(&subs_item),
                app: Arc::clone(&app),
                group: Arc::clone(&group),
                rule: Arc::new(raw.clone()),
            };
            let rule = assemble_rule(origin, position, rules.len(), &mut compile)?;
            rules.push(rule);
        }
    }

    tracing::info!(count = rules.len(), "rules assembled");
    RuleSet::new(rules)
}

fn assemble_rule<S, F, CE>(
    origin: RuleOrigin,
    position: usize,
    index: usize,
    compile: &mut F,
) -> Result<Rule<S>, AutotapError>
where
    F: FnMut(&str) -> Result<S, CE>,
    CE: std::error::Error + Send + Sync + 'static,
{
    let (app, group, raw) = (&origin.app, &origin.group, &origin.rule);

    let mut builder = Rule::builder()
        .id(stable_rule_id(&origin.subs_item, &app.id, group.key, position))
        .group_key(group.key)
        .index(index)
        .app_id(app.id.clone())
        .action(ActionKind::from_tag(raw.action.as_deref()))
        .delay(Duration::from_millis(raw.delay.or(group.delay).unwrap_or(0)))
        .quick_find(raw.quick_find.or(group.quick_find).unwrap_or(false))
        .match_launcher(raw.match_launcher.or(group.match_launcher).unwrap_or(false));

    if let Some(key) = raw.key {
        builder = builder.key(key);
    }
    if let Some(cd) = raw.cd.or(group.cd).or(app.cd) {
        builder = builder.cd(Duration::from_millis(cd));
    }
    for pre_key in &raw.pre_keys {
        builder = builder.pre_key(*pre_key);
    }
    for source in &raw.matches {
        builder = builder.matches(compile_selector(compile, source)?);
    }
    for source in &raw.exclude_matches {
        builder = builder.exclude_match(compile_selector(compile, source)?);
    }
    let activity_ids = raw
        .activity_ids
        .as_deref()
        .or(group.activity_ids.as_deref())
        .or(app.activity_ids.as_deref())
        .unwrap_or_default();
    for activity_id in activity_ids {
        builder = builder.activity_id(expand_activity_id(&app.id, activity_id));
    }
    let exclude_activity_ids = raw
        .exclude_activity_ids
        .as_deref()
        .or(group.exclude_activity_ids.as_deref())
        .or(app.exclude_activity_ids.as_deref())
        .unwrap_or_default();
    for activity_id in exclude_activity_ids {
        builder = builder.exclude_activity_id(expand_activity_id(&app.id, activity_id));
    }

    builder.origin(origin).build()
}

fn compile_selector<S, F, CE>(compile: &mut F, source: &str) -> Result<S, AutotapError>
where
    F: FnMut(&str) -> Result<S, CE>,
    CE: std::error::Error + Send + Sync + 'static,
{
    compile(source).map_err(|err| {
        tracing::warn!(selector = source, error = %err, "failed to compile selector");
        AutotapError::Adapter(Box::new(err))
    })
}

/// Activity ids starting with `.` are relative to the app id.
fn expand_activity_id(app_id: &str, activity_id: &str) -> String {
    if activity_id.starts_with('.') {
        format!("{app_id}{activity_id}")
    } else {
        activity_id.to_string()
    }
}

fn stable_rule_id(subs_item: &SubsItem, app_id: &str, group_key: i32, position: usize) -> RuleId {
    let name = format!("{app_id}/{group_key}/{position}");
    RuleId::from_uuid(uuid::Uuid::new_v5(&subs_item.id.as_uuid(), name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;
    use autotap_domain::id::SubscriptionId;
    use autotap_domain::rule::DEFAULT_CD;

    #[derive(Debug)]
    struct BadSelector(String);

    impl fmt::Display for BadSelector {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "bad selector {}", self.0)
        }
    }

    impl std::error::Error for BadSelector {}

    // anything starting with `!` fails to compile
    fn compile(source: &str) -> Result<String, BadSelector> {
        if source.starts_with('!') {
            Err(BadSelector(source.to_string()))
        } else {
            Ok(source.to_string())
        }
    }

    fn subs_item() -> SubsItem {
        serde_json::from_value(serde_json::json!({ "id": SubscriptionId::new() })).unwrap()
    }

    fn app(json: serde_json::Value) -> AppRaw {
        serde_json::from_value(json).unwrap()
    }

    fn news_app() -> AppRaw {
        app(serde_json::json!({
            "id": "com.example.news",
            "cd": 3000,
            "activityIds": [".MainActivity"],
            "groups": [
                {
                    "key": 0,
                    "name": "Splash ad",
                    "delay": 200,
                    "activityIds": [".SplashActivity", "com.ads.AdActivity"],
                    "rules": [
                        { "key": 0, "name": "open menu", "matches": ["[id=\"menu\"]"] },
                        {
                            "key": 1,
                            "action": "clickCenter",
                            "matches": ["[id=\"panel\"]", "[text=\"Skip\"]"],
                            "excludeMatches": ["[id=\"vip\"]"],
                            "preKeys": [0],
                            "cd": 500,
                            "delay": 0
                        }
                    ]
                },
                {
                    "key": 1,
                    "name": "Disabled",
                    "enable": false,
                    "rules": [{ "matches": ["[id=\"x\"]"] }]
                },
                {
                    "key": 2,
                    "name": "Update dialog",
                    "quickFind": true,
                    "rules": [{ "action": "swipe", "matches": ["[text=\"Later\"]"] }]
                }
            ]
        }))
    }

    #[test]
    fn should_skip_disabled_groups_and_index_in_declaration_order() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();

        assert_eq!(set.len(), 3);
        let indexes: Vec<_> = set.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        let groups: Vec<_> = set.iter().map(|r| r.group_key).collect();
        assert_eq!(groups, vec![0, 0, 2]);
    }

    #[test]
    fn should_inherit_settings_from_group_then_app() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();
        let rules: Vec<_> = set.iter().collect();

        assert_eq!(rules[0].cd, Duration::from_millis(3000));
        assert_eq!(rules[0].delay, Duration::from_millis(200));
        assert_eq!(rules[1].cd, Duration::from_millis(500));
        assert_eq!(rules[1].delay, Duration::ZERO);
        assert!(rules[2].quick_find);
        assert!(!rules[0].quick_find);
    }

    #[test]
    fn should_apply_default_cooldown_when_none_is_configured() {
        let raw = app(serde_json::json!({
            "id": "com.app",
            "groups": [{ "key": 0, "name": "g", "rules": [{ "matches": ["a"] }] }]
        }));
        let set = assemble_rules(subs_item(), raw, compile).unwrap();
        assert_eq!(set.at(0).unwrap().cd, DEFAULT_CD);
    }

    #[test]
    fn should_expand_relative_activity_ids() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();
        let rules: Vec<_> = set.iter().collect();

        let includes: Vec<_> = rules[0].scope.activity_ids().iter().cloned().collect();
        assert_eq!(
            includes,
            vec![
                "com.ads.AdActivity".to_string(),
                "com.example.news.SplashActivity".to_string(),
            ]
        );
        // no group list: falls back to the app list
        assert!(rules[2].matches_activity(Some("com.example.news.MainActivity"), None));
        assert!(!rules[2].matches_activity(Some("com.example.news.SplashActivity"), None));
    }

    #[test]
    fn should_compile_selectors_and_resolve_action_tags() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();
        let rules: Vec<_> = set.iter().collect();

        assert_eq!(rules[1].matches, vec!["[id=\"panel\"]", "[text=\"Skip\"]"]);
        assert_eq!(rules[1].exclude_matches, vec!["[id=\"vip\"]"]);
        assert_eq!(rules[1].action, ActionKind::ClickCenter);
        assert_eq!(rules[0].action, ActionKind::Click);
        assert_eq!(rules[2].action, ActionKind::Click);
    }

    #[test]
    fn should_resolve_pre_keys_within_group() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();
        let rules: Vec<_> = set.iter().collect();
        assert!(rules[1].pre_rules.contains(&rules[0].id));
    }

    #[test]
    fn should_keep_back_references_to_raw_records() {
        let set = assemble_rules(subs_item(), news_app(), compile).unwrap();
        let rule = set.at(0).unwrap();
        let origin = rule.origin.as_ref().unwrap();

        assert_eq!(origin.app.id, "com.example.news");
        assert_eq!(origin.group.name, "Splash ad");
        assert_eq!(origin.rule.name.as_deref(), Some("open menu"));
        assert_eq!(rule.label(), "open menu");
    }

    #[test]
    fn should_derive_same_ids_on_repeated_load() {
        let item = subs_item();
        let first = assemble_rules(item.clone(), news_app(), compile).unwrap();
        let second = assemble_rules(item, news_app(), compile).unwrap();

        let first: Vec<_> = first.iter().map(|r| r.id).collect();
        let second: Vec<_> = second.iter().map(|r| r.id).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn should_return_empty_set_for_disabled_subscription() {
        let mut item = subs_item();
        item.enable = false;
        let set = assemble_rules(item, news_app(), compile).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn should_return_adapter_error_when_selector_fails_to_compile() {
        let raw = app(serde_json::json!({
            "id": "com.app",
            "groups": [{ "key": 0, "name": "g", "rules": [{ "matches": ["!broken"] }] }]
        }));
        let result = assemble_rules(subs_item(), raw, compile);
        let Err(AutotapError::Adapter(err)) = result else {
            panic!("expected adapter error");
        };
        assert_eq!(err.to_string(), "bad selector !broken");
    }

    #[test]
    fn should_reject_groups_sharing_a_key() {
        let raw = app(serde_json::json!({
            "id": "com.app",
            "groups": [
                { "key": 0, "name": "slow", "rules": [{ "cd": 10000, "matches": ["a"] }] },
                { "key": 0, "name": "fast", "rules": [{ "cd": 0, "matches": ["b"] }] }
            ]
        }));
        let result = assemble_rules(subs_item(), raw, compile);
        assert!(matches!(
            result,
            Err(AutotapError::Validation(ValidationError::DuplicateGroupKey(0)))
        ));
    }

    #[test]
    fn should_return_validation_error_for_unknown_pre_key() {
        let raw = app(serde_json::json!({
            "id": "com.app",
            "groups": [{ "key": 0, "name": "g", "rules": [{ "matches": ["a"], "preKeys": [9] }] }]
        }));
        let result = assemble_rules(subs_item(), raw, compile);
        assert!(matches!(result, Err(AutotapError::Validation(_))));
    }
}

//! Activity scope — which screens of an app a rule applies to.

use std::collections::BTreeSet;

/// Prefix-matched allow/deny sets over activity identities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityScope {
    activity_ids: BTreeSet<String>,
    exclude_activity_ids: BTreeSet<String>,
    match_any: bool,
}

impl ActivityScope {
    /// Build a scope. With both sets empty the scope matches any activity.
    #[must_use]
    pub fn new(activity_ids: BTreeSet<String>, exclude_activity_ids: BTreeSet<String>) -> Self {
        let match_any = activity_ids.is_empty() && exclude_activity_ids.is_empty();
        Self {
            activity_ids,
            exclude_activity_ids,
            match_any,
        }
    }

    /// A scope without any restriction.
    #[must_use]
    pub fn any() -> Self {
        Self::new(BTreeSet::new(), BTreeSet::new())
    }

    #[must_use]
    pub fn activity_ids(&self) -> &BTreeSet<String> {
        &self.activity_ids
    }

    #[must_use]
    pub fn exclude_activity_ids(&self) -> &BTreeSet<String> {
        &self.exclude_activity_ids
    }

    /// `true` when no activity restriction is configured.
    #[must_use]
    pub fn matches_any(&self) -> bool {
        self.match_any
    }

    /// Decide whether `activity_id` is in scope.
    ///
    /// Exclusions win over inclusions. When `match_launcher` is set, the
    /// current launcher activity is in scope even if it is not listed.
    #[must_use]
    pub fn matches(
        &self,
        activity_id: Option<&str>,
        match_launcher: bool,
        launcher_activity_id: Option<&str>,
    ) -> bool {
        if self.match_any {
            return true;
        }
        let Some(activity_id) = activity_id else {
            return false;
        };
        if self
            .exclude_activity_ids
            .iter()
            .any(|prefix| activity_id.starts_with(prefix.as_str()))
        {
            return false;
        }
        if self.activity_ids.is_empty() {
            return true;
        }
        if match_launcher && launcher_activity_id == Some(activity_id) {
            return true;
        }
        self.activity_ids
            .iter()
            .any(|prefix| activity_id.starts_with(prefix.as_str()))
    }
}

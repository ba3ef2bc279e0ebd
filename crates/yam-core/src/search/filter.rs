use super::QueryMatcher;
use crate::config::SharedConfig;
use crate::platform::LauncherPlatform;
use crate::registry::Registry;
use crate::text::normalize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};
use yam_types::{ActiveView, FilterResult, LaunchTarget};

/// One keystroke's worth of filter input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub query: String,
    pub view: ActiveView,
    #[serde(default)]
    pub include_hidden: bool,
    /// A shortcut-binding session is open; auto-launch is suppressed
    #[serde(default)]
    pub binding_session: bool,
}

impl FilterRequest {
    pub fn apps(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            view: ActiveView::Apps,
            ..Default::default()
        }
    }

    pub fn contacts(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            view: ActiveView::Contacts,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_hidden(mut self, include_hidden: bool) -> Self {
        self.include_hidden = include_hidden;
        self
    }

    #[must_use]
    pub fn with_binding_session(mut self, binding_session: bool) -> Self {
        self.binding_session = binding_session;
        self
    }
}

/// Turns a query into a [`FilterResult`].
///
/// A pass is blocking (it re-enumerates the registry or queries contacts),
/// so callers on an interactive context go through
/// [`FilterDispatcher`](super::FilterDispatcher). The pipeline never fails:
/// an unavailable capability yields `NoOp`.
pub struct FilterPipeline {
    registry: Arc<Registry>,
    platform: Arc<dyn LauncherPlatform>,
    config: SharedConfig,
}

impl FilterPipeline {
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        platform: Arc<dyn LauncherPlatform>,
        config: SharedConfig,
    ) -> Self {
        Self {
            registry,
            platform,
            config,
        }
    }

    pub fn filter(&self, request: &FilterRequest) -> FilterResult {
        match request.view {
            ActiveView::Apps => self.filter_apps(request),
            ActiveView::Contacts => self.filter_contacts(&request.query),
        }
    }

    fn filter_apps(&self, request: &FilterRequest) -> FilterResult {
        let search = self.config.get().search.clone();

        let snapshot = match self.registry.enumerate(request.include_hidden) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!("App filter skipped: {}", e);
                return FilterResult::NoOp;
            }
        };

        let Some(query) = normalize(&request.query) else {
            return FilterResult::show_apps(snapshot.to_vec());
        };

        let matcher = QueryMatcher::new(query, search.fuzzy);
        let matches: Vec<LaunchTarget> = snapshot
            .iter()
            .filter(|target| {
                normalize(target.display_label()).is_some_and(|label| matcher.is_match(&label))
            })
            .cloned()
            .collect();

        trace!(
            "Query {:?} matched {}/{} targets (fuzzy={})",
            matcher.query().as_str(),
            matches.len(),
            snapshot.len(),
            matcher.is_fuzzy()
        );

        let armed = search.auto_launch && !request.binding_session;
        if armed && let [target] = matches.as_slice() {
            debug!("Auto-launching {}", target.id);
            return FilterResult::AutoLaunch {
                target: target.clone(),
            };
        }

        FilterResult::show_apps(matches)
    }

    fn filter_contacts(&self, query: &str) -> FilterResult {
        if !self.config.get().contacts.enabled {
            return FilterResult::NoOp;
        }

        let needle = normalize(query);
        let needle = needle.as_ref().map_or("", |n| n.as_str());
        match self.platform.list_contacts(needle) {
            Ok(contacts) => FilterResult::show_contacts(contacts),
            Err(e) => {
                debug!("Contact filter skipped: {}", e);
                FilterResult::NoOp
            }
        }
    }
}

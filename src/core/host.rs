//! Widget host service adapter
//!
//! The widget host is an external service: it hands out widget identifiers,
//! tracks which identifier is bound to which provider, and instantiates the
//! displayable view for a binding. This module defines the thin adapter
//! contract the rest of the crate talks to, plus `SimHost`, an in-process
//! implementation used by tests and the demo shell.

use super::record::WidgetId;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Reference to a widget provider component in another installed app.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderRef(pub String);

impl ProviderRef {
    pub fn new(component: impl Into<String>) -> Self {
        Self(component.into())
    }
}

/// Reference to a provider's configuration activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureRef(pub String);

/// Opaque handle to a provider preview image.
///
/// Icon loading and compositing are owned by a collaborator; this crate only
/// passes the handle through to menu entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(pub String);

/// Provider descriptor: metadata for one widget type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    pub provider: ProviderRef,
    pub label: String,
    pub min_width: i32,
    pub min_height: i32,
    /// Configuration activity, when the provider exposes one.
    pub configure: Option<ConfigureRef>,
    pub preview: Option<PreviewHandle>,
}

/// View handle returned by the host for a bound identifier.
///
/// Content rendering happens in the provider's own process; the handle only
/// identifies what the surface is laying out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub widget_id: WidgetId,
    pub provider: ProviderRef,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// The host service resource set is unavailable, e.g. the host app is
    /// mid-update on the device. Transient; callers retry.
    #[error("widget host resources unavailable")]
    NotReady,
}

/// Thin wrapper over the external widget host service.
///
/// No retries happen at this layer; recovering from a failed `start` is the
/// reconciler's responsibility.
pub trait WidgetHost {
    /// Begin listening for host-side widget updates. On failure the adapter
    /// is left unstarted.
    fn start(&mut self) -> Result<(), HostError>;

    /// Stop listening. Only call after a successful `start`.
    fn stop(&mut self);

    fn is_started(&self) -> bool;

    /// Allocate a fresh widget identifier.
    fn allocate_id(&mut self) -> WidgetId;

    /// Release an identifier and its binding, if any.
    fn delete_id(&mut self, id: WidgetId);

    /// Identifiers currently bound on the host side, or `None` when the
    /// platform cannot enumerate them. An empty set is trustworthy; `None`
    /// means the answer is unknowable and orphan cleanup must be skipped.
    fn bound_ids(&self) -> Option<HashSet<WidgetId>>;

    /// Resolve the provider descriptor for a bound identifier. `None` when
    /// the identifier is unbound or the provider is no longer installed.
    fn provider_info(&self, id: WidgetId) -> Option<ProviderInfo>;

    /// Bind the identifier to the provider if permission was already
    /// granted. Returns false when an explicit permission grant is still
    /// required from the user.
    fn bind_if_allowed(&mut self, id: WidgetId, provider: &ProviderRef) -> bool;

    /// Instantiate a displayable view for a binding. `None` when the
    /// descriptor cannot be resolved, e.g. provider uninstalled.
    fn create_view(&mut self, id: WidgetId, info: &ProviderInfo) -> Option<WidgetView>;
}

/// In-process widget host with scriptable failure injection.
///
/// Stands in for the platform service in tests and the demo shell: start
/// failures, enumeration support and per-provider bind permission are all
/// settable knobs.
#[derive(Debug, Default)]
pub struct SimHost {
    started: bool,
    fail_starts: u32,
    no_enumeration: bool,
    next_id: WidgetId,
    bound: HashMap<WidgetId, ProviderRef>,
    /// Identifiers whose binding carries an explicit permission grant.
    permitted: HashSet<WidgetId>,
    providers: HashMap<ProviderRef, ProviderInfo>,
    pre_granted: HashSet<ProviderRef>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a provider visible to the host. `pre_granted` skips the
    /// explicit bind-permission step for it.
    pub fn register_provider(&mut self, info: ProviderInfo, pre_granted: bool) {
        if pre_granted {
            self.pre_granted.insert(info.provider.clone());
        }
        self.providers.insert(info.provider.clone(), info);
    }

    /// Simulate the provider's app being uninstalled. Bindings stay; the
    /// descriptor stops resolving.
    pub fn unregister_provider(&mut self, provider: &ProviderRef) {
        self.providers.remove(provider);
        self.pre_granted.remove(provider);
    }

    /// The next `n` calls to `start` fail with `HostError::NotReady`.
    pub fn fail_next_starts(&mut self, n: u32) {
        self.fail_starts = n;
    }

    /// Simulate a platform that cannot enumerate bound identifiers.
    pub fn set_enumeration_supported(&mut self, supported: bool) {
        self.no_enumeration = !supported;
    }

    /// Bind an identifier to a provider from outside with full privileges,
    /// the way the system picker or the permission-grant activity does.
    pub fn bind(&mut self, id: WidgetId, provider: ProviderRef) {
        self.bound.insert(id, provider);
        self.permitted.insert(id);
    }

    /// Associate an identifier with a provider without granting bind
    /// permission, the way a picker without host privileges does. The
    /// descriptor resolves but `bind_if_allowed` still fails.
    pub fn pick(&mut self, id: WidgetId, provider: ProviderRef) {
        self.bound.insert(id, provider);
        self.permitted.remove(&id);
    }

    pub fn is_bound(&self, id: WidgetId) -> bool {
        self.bound.contains_key(&id)
    }
}

impl WidgetHost for SimHost {
    fn start(&mut self) -> Result<(), HostError> {
        if self.fail_starts > 0 {
            self.fail_starts -= 1;
            return Err(HostError::NotReady);
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn allocate_id(&mut self) -> WidgetId {
        self.next_id += 1;
        self.next_id
    }

    fn delete_id(&mut self, id: WidgetId) {
        self.bound.remove(&id);
        self.permitted.remove(&id);
    }

    fn bound_ids(&self) -> Option<HashSet<WidgetId>> {
        if self.no_enumeration {
            None
        } else {
            Some(self.bound.keys().copied().collect())
        }
    }

    fn provider_info(&self, id: WidgetId) -> Option<ProviderInfo> {
        let provider = self.bound.get(&id)?;
        self.providers.get(provider).cloned()
    }

    fn bind_if_allowed(&mut self, id: WidgetId, provider: &ProviderRef) -> bool {
        if self.permitted.contains(&id) {
            return true;
        }
        if self.pre_granted.contains(provider) {
            self.bound.insert(id, provider.clone());
            self.permitted.insert(id);
            true
        } else {
            false
        }
    }

    fn create_view(&mut self, id: WidgetId, info: &ProviderInfo) -> Option<WidgetView> {
        if !self.providers.contains_key(&info.provider) {
            return None;
        }
        Some(WidgetView {
            widget_id: id,
            provider: info.provider.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_info() -> ProviderInfo {
        ProviderInfo {
            provider: ProviderRef::new("com.example.clock/Clock"),
            label: "Clock".into(),
            min_width: 160,
            min_height: 80,
            configure: None,
            preview: None,
        }
    }

    #[test]
    fn start_fails_then_recovers() {
        let mut host = SimHost::new();
        host.fail_next_starts(1);

        assert_eq!(host.start(), Err(HostError::NotReady));
        assert!(!host.is_started());
        assert_eq!(host.start(), Ok(()));
        assert!(host.is_started());
    }

    #[test]
    fn bind_requires_grant() {
        let mut host = SimHost::new();
        let info = clock_info();
        host.register_provider(info.clone(), false);

        let id = host.allocate_id();
        assert!(!host.bind_if_allowed(id, &info.provider));
        assert!(!host.is_bound(id));

        host.register_provider(info.clone(), true);
        assert!(host.bind_if_allowed(id, &info.provider));
        assert!(host.is_bound(id));
    }

    #[test]
    fn pick_associates_without_permission() {
        let mut host = SimHost::new();
        let info = clock_info();
        host.register_provider(info.clone(), false);

        let id = host.allocate_id();
        host.pick(id, info.provider.clone());

        // descriptor resolves, but the binding still needs the grant
        assert!(host.provider_info(id).is_some());
        assert!(!host.bind_if_allowed(id, &info.provider));

        host.bind(id, info.provider.clone());
        assert!(host.bind_if_allowed(id, &info.provider));
    }

    #[test]
    fn provider_info_gone_after_uninstall() {
        let mut host = SimHost::new();
        let info = clock_info();
        host.register_provider(info.clone(), true);

        let id = host.allocate_id();
        host.bind(id, info.provider.clone());
        assert!(host.provider_info(id).is_some());

        host.unregister_provider(&info.provider);
        assert!(host.provider_info(id).is_none());
        assert!(host.create_view(id, &info).is_none());
    }

    #[test]
    fn enumeration_toggle() {
        let mut host = SimHost::new();
        assert_eq!(host.bound_ids(), Some(HashSet::new()));

        host.set_enumeration_supported(false);
        assert_eq!(host.bound_ids(), None);
    }
}

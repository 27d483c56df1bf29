//! Widget lifecycle manager
//!
//! Owns the reconciliation between the host's bound identifiers and the
//! record store, the pick→bind→configure creation workflow, and the
//! per-widget move/resize/remove session driven from the context menus.
//!
//! Everything runs on the interactive thread. The only timed element is the
//! startup retry: when the host service is not yet available the whole
//! reconciliation pass is re-armed on a single-slot timer and the embedding
//! loop pumps it through [`WidgetManager::tick`].

use crate::config::SurfaceConfig;
use crate::core::{
    ConfigureRef, ProviderInfo, ProviderRef, RetryTimer, WidgetHost, WidgetId, WidgetRecord,
    WidgetStore,
};
use crate::ui::menu::{
    self, ConfigAction, Menu, MenuEntry, WidgetAction, CFG_WIDGET_MOVE, CFG_WIDGET_MOVE_EXIT,
    CFG_WIDGET_MOVE_SWITCH, CFG_WIDGET_REMOVE, CFG_WIDGET_RESIZE, CFG_WIDGET_RESIZE_EXIT,
    CFG_WIDGET_RESIZE_SWITCH,
};
use crate::ui::{DragCommit, Handle, PagedSurface};
use log::{debug, warn};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

/// Request code carried by the external provider pick flow. The permission
/// bind flow reuses it so that its result re-enters the same decision point.
pub const REQUEST_PICK_WIDGET: u32 = 101;
/// Request code carried by the provider configuration flow.
pub const REQUEST_CREATE_WIDGET: u32 = 102;

/// Delay before reconciliation retries after a failed host start.
pub const RESTORE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Result of an external pick/bind/configure flow. Cancellation is an
/// outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Canceled,
}

/// Payload delivered with an external flow result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultPayload {
    pub widget_id: Option<WidgetId>,
}

impl ResultPayload {
    pub fn widget(id: WidgetId) -> Self {
        Self {
            widget_id: Some(id),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// External action the embedding shell must launch on the manager's behalf.
/// The shell drains these with [`WidgetManager::take_requests`] and reports
/// back through [`WidgetManager::on_activity_result`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalRequest {
    /// Launch the system provider picker carrying the allocated identifier.
    Pick {
        request_code: u32,
        widget_id: WidgetId,
    },
    /// Ask the user to grant bind permission for the provider.
    Bind {
        request_code: u32,
        widget_id: WidgetId,
        provider: ProviderRef,
    },
    /// Launch the provider's configuration activity.
    Configure {
        request_code: u32,
        widget_id: WidgetId,
        configure: ConfigureRef,
    },
}

/// Where the widget creation workflow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum CreateFlow {
    #[default]
    Idle,
    Picking(WidgetId),
    Binding(WidgetId),
    Configuring(WidgetId),
}

impl CreateFlow {
    fn widget_id(self) -> Option<WidgetId> {
        match self {
            CreateFlow::Idle => None,
            CreateFlow::Picking(id) | CreateFlow::Binding(id) | CreateFlow::Configuring(id) => {
                Some(id)
            }
        }
    }
}

/// Display label for a provider, with the placeholder used when the
/// descriptor cannot be resolved.
pub fn widget_name(info: Option<&ProviderInfo>) -> String {
    match info {
        Some(info) => info.label.clone(),
        None => "[null]".to_string(),
    }
}

/// Manages the widgets placed on one paged home surface.
pub struct WidgetManager<H: WidgetHost, S: WidgetStore> {
    host: H,
    store: S,
    surface: PagedSurface,
    /// In-memory record map, rebuilt wholesale on each reconciliation pass.
    widgets: BTreeMap<WidgetId, WidgetRecord>,
    /// Sub-mode reused when a widget re-enters move mode. Shared across all
    /// widgets of this manager.
    last_move: Handle,
    /// Sub-mode reused when a widget re-enters resize mode.
    last_resize: Handle,
    restore_retry: RetryTimer,
    flow: CreateFlow,
    requests: VecDeque<ExternalRequest>,
}

impl<H: WidgetHost, S: WidgetStore> WidgetManager<H, S> {
    pub fn new(host: H, store: S, config: SurfaceConfig) -> Self {
        Self {
            host,
            store,
            surface: PagedSurface::new(config.pages_x, config.pages_y),
            widgets: BTreeMap::new(),
            last_move: Handle::MoveFree,
            last_resize: Handle::ResizeDiagonal,
            restore_retry: RetryTimer::new(),
            flow: CreateFlow::Idle,
            requests: VecDeque::new(),
        }
    }

    pub fn surface(&self) -> &PagedSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PagedSurface {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    pub fn record(&self, id: WidgetId) -> Option<&WidgetRecord> {
        self.widgets.get(&id)
    }

    /// Stop listening for host updates. Safe to call when never started.
    pub fn stop(&mut self) {
        if self.host.is_started() {
            self.host.stop();
        }
    }

    /// Pending external actions for the embedding shell to launch.
    pub fn take_requests(&mut self) -> Vec<ExternalRequest> {
        self.requests.drain(..).collect()
    }

    /// Pump the cooperative timer. Returns true when a deferred
    /// reconciliation pass ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.restore_retry.fire(now) {
            self.restore_widgets(now);
            true
        } else {
            false
        }
    }

    pub fn retry_pending(&self) -> bool {
        self.restore_retry.is_pending()
    }

    /// Reconcile the record store with the host's bound identifiers, then
    /// materialize a view per surviving record.
    ///
    /// When the host cannot be started yet (service mid-update), the whole
    /// pass is re-armed after [`RESTORE_RETRY_DELAY`] without mutating any
    /// record or binding. Long-presses on the placed views route to
    /// [`WidgetManager::widget_menu`].
    pub fn restore_widgets(&mut self, now: Instant) {
        self.surface.remove_all_views();

        if !self.host.is_started() {
            warn!("restore_widgets called before the host listener is up");
            if let Err(err) = self.host.start() {
                warn!(
                    "host start failed ({err}), retrying restore in {}ms",
                    RESTORE_RETRY_DELAY.as_millis()
                );
                self.restore_retry.schedule(now, RESTORE_RETRY_DELAY);
                return;
            }
        }
        self.restore_retry.cancel();

        let records = match self.store.list() {
            Ok(records) => records,
            Err(err) => {
                warn!("failed to load widget records: {err}");
                return;
            }
        };
        self.widgets.clear();
        for rec in records {
            self.widgets.insert(rec.widget_id, rec);
        }

        // sync the store with the host; skipped entirely when the platform
        // cannot enumerate bindings, so valid records survive there
        if let Some(bound) = self.host.bound_ids() {
            for id in bound.iter().copied() {
                if !self.widgets.contains_key(&id) {
                    debug!("deleting host binding {id} with no record");
                    self.remove_widget(id);
                }
            }
            let orphaned: Vec<WidgetId> = self
                .widgets
                .keys()
                .copied()
                .filter(|id| !bound.contains(id))
                .collect();
            for id in orphaned {
                debug!("deleting record {id} with no host binding");
                self.remove_widget(id);
            }
        }

        let survivors: Vec<WidgetRecord> = self.widgets.values().copied().collect();
        for rec in survivors {
            self.restore_widget(rec);
        }
    }

    fn restore_widget(&mut self, rec: WidgetRecord) {
        let id = rec.widget_id;
        let Some(info) = self.host.provider_info(id) else {
            // provider uninstalled; the record waits for a later pass
            debug!("provider for widget {id} not resolved, no view materialized");
            return;
        };
        let Some(view) = self.host.create_view(id, &info) else {
            return;
        };
        self.surface
            .add_view(view, rec.width, rec.height, info.min_width, info.min_height);
    }

    /// Delete the host binding, the record and the placed view together.
    pub fn remove_widget(&mut self, id: WidgetId) {
        self.surface.remove_view(id);
        self.host.delete_id(id);
        if let Err(err) = self.store.delete(id) {
            warn!("failed to delete record for widget {id}: {err}");
        }
        self.widgets.remove(&id);
    }

    // ----- creation workflow -------------------------------------------

    /// Allocate an identifier and request the external provider pick.
    pub fn select_widget(&mut self) -> WidgetId {
        let id = self.host.allocate_id();
        self.flow = CreateFlow::Picking(id);
        self.requests.push_back(ExternalRequest::Pick {
            request_code: REQUEST_PICK_WIDGET,
            widget_id: id,
        });
        id
    }

    /// Deliver the result of an external pick/bind/configure flow.
    /// Returns true when the result was consumed here.
    pub fn on_activity_result(
        &mut self,
        request_code: u32,
        outcome: Outcome,
        payload: ResultPayload,
    ) -> bool {
        match outcome {
            Outcome::Ok => match request_code {
                REQUEST_PICK_WIDGET => {
                    if let Some(id) = payload.widget_id {
                        self.configure_widget(id);
                    }
                    true
                }
                REQUEST_CREATE_WIDGET => {
                    if let Some(id) = payload.widget_id {
                        self.create_widget(id);
                    }
                    true
                }
                _ => false,
            },
            Outcome::Canceled => {
                // prefer the payload identifier, fall back to the one the
                // flow allocated so a cancel can never leak it
                match payload.widget_id.or_else(|| self.flow.widget_id()) {
                    Some(id) => {
                        self.abandon_widget(id);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    fn abandon_widget(&mut self, id: WidgetId) {
        debug!("widget flow canceled, releasing id {id}");
        self.remove_widget(id);
        self.flow = CreateFlow::Idle;
    }

    /// Decision point after a pick or a permission bind: bind if needed,
    /// then configure if the provider asks for it, otherwise finalize.
    fn configure_widget(&mut self, id: WidgetId) {
        let Some(info) = self.host.provider_info(id) else {
            warn!("picked widget {id} has no resolvable provider, abandoning");
            self.abandon_widget(id);
            return;
        };

        if !self.host.bind_if_allowed(id, &info.provider) {
            self.flow = CreateFlow::Binding(id);
            self.requests.push_back(ExternalRequest::Bind {
                request_code: REQUEST_PICK_WIDGET,
                widget_id: id,
                provider: info.provider.clone(),
            });
            return;
        }

        if let Some(configure) = info.configure.clone() {
            self.flow = CreateFlow::Configuring(id);
            self.requests.push_back(ExternalRequest::Configure {
                request_code: REQUEST_CREATE_WIDGET,
                widget_id: id,
                configure,
            });
        } else {
            self.create_widget(id);
        }
    }

    /// Persist the record sized to the provider minimum and place the view.
    fn create_widget(&mut self, id: WidgetId) {
        self.flow = CreateFlow::Idle;
        let Some(info) = self.host.provider_info(id) else {
            warn!("cannot create widget {id}: provider not resolved");
            return;
        };
        let Some(view) = self.host.create_view(id, &info) else {
            return;
        };

        let rec = WidgetRecord::new(id, info.min_width, info.min_height);
        if let Err(err) = self.store.insert(&rec) {
            warn!("failed to persist widget {id}: {err}");
        }
        self.widgets.insert(id, rec);
        self.surface
            .add_view(view, rec.width, rec.height, info.min_width, info.min_height);
    }

    // ----- menus -------------------------------------------------------

    /// Top-level surface menu: add always, configure/remove only when a
    /// widget exists.
    pub fn config_menu(&self) -> Menu {
        let mut m = Menu::new();
        m.push(MenuEntry::Config {
            label: menu::MENU_WIDGET_ADD.into(),
            action: ConfigAction::Add,
        });
        if self.widget_count() > 0 {
            m.push(MenuEntry::Config {
                label: menu::MENU_WIDGET_CONFIGURE.into(),
                action: ConfigAction::Configure,
            });
            m.push(MenuEntry::Config {
                label: menu::MENU_WIDGET_REMOVE.into(),
                action: ConfigAction::Remove,
            });
        }
        m
    }

    /// Picker over the existing widgets.
    pub fn widget_list_menu(&self, title: &str) -> Menu {
        let mut m = Menu::new();
        m.push(MenuEntry::Title(title.to_string()));
        for rec in self.widgets.values() {
            let info = self.host.provider_info(rec.widget_id);
            m.push(MenuEntry::Widget {
                widget_id: rec.widget_id,
                label: widget_name(info.as_ref()),
                preview: info.and_then(|i| i.preview),
            });
        }
        m
    }

    /// Context menu for one placed widget; this is the long-press trigger
    /// attached to every materialized view.
    pub fn widget_menu(&self, id: WidgetId) -> Menu {
        let mut m = Menu::new();
        let Some(rec) = self.widgets.get(&id) else {
            m.push(MenuEntry::Note("ERROR: Not found".into()));
            return m;
        };

        let handle = self.surface.handle_type(id);
        if handle.is_move() {
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_MOVE_SWITCH.into(),
                action: WidgetAction::MoveSwitch,
            });
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_MOVE_EXIT.into(),
                action: WidgetAction::Reset,
            });
        } else {
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_MOVE.into(),
                action: WidgetAction::Move,
            });
        }

        if handle.is_resize() {
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_RESIZE_SWITCH.into(),
                action: WidgetAction::ResizeSwitch,
            });
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_RESIZE_EXIT.into(),
                action: WidgetAction::Reset,
            });
        } else {
            m.push(MenuEntry::WidgetAction {
                label: CFG_WIDGET_RESIZE.into(),
                action: WidgetAction::Resize,
            });
        }

        m.push(MenuEntry::WidgetAction {
            label: CFG_WIDGET_REMOVE.into(),
            action: WidgetAction::Remove,
        });

        if cfg!(debug_assertions) {
            m.push(MenuEntry::Title("Debug info".into()));
            m.push(MenuEntry::Note(format!("ID: {}", rec.widget_id)));
            m.push(MenuEntry::Note(format!(
                "Name: {}",
                widget_name(self.host.provider_info(id).as_ref())
            )));
            m.push(MenuEntry::Note(format!("Width: {}", rec.width)));
            m.push(MenuEntry::Note(format!("Height: {}", rec.height)));
        }
        m
    }

    // ----- per-widget interaction --------------------------------------

    pub fn apply_widget_action(&mut self, id: WidgetId, action: WidgetAction) {
        match action {
            WidgetAction::Move => {
                self.surface.set_click_behavior(id, true);
                self.surface.enable_handle(id, self.last_move);
            }
            WidgetAction::MoveSwitch => self.toggle_move_mode(id),
            WidgetAction::Resize => {
                self.surface.set_click_behavior(id, true);
                self.surface.enable_handle(id, self.last_resize);
            }
            WidgetAction::ResizeSwitch => self.toggle_resize_mode(id),
            WidgetAction::Reset => {
                self.surface.set_click_behavior(id, false);
                self.surface.disable_handle(id);
            }
            WidgetAction::Remove => self.remove_widget(id),
        }
    }

    fn toggle_move_mode(&mut self, id: WidgetId) {
        self.last_move = if self.surface.handle_type(id) == Handle::MoveFree {
            Handle::MoveAxial
        } else {
            Handle::MoveFree
        };
        self.surface.enable_handle(id, self.last_move);
    }

    fn toggle_resize_mode(&mut self, id: WidgetId) {
        self.last_resize = if self.surface.handle_type(id) == Handle::ResizeDiagonal {
            Handle::ResizeAxial
        } else {
            Handle::ResizeDiagonal
        };
        self.surface.enable_handle(id, self.last_resize);
    }

    /// Single click while a handle session is active exits the session.
    pub fn on_widget_click(&mut self, id: WidgetId) -> bool {
        if !self.surface.has_click_behavior(id) {
            return false;
        }
        self.surface.set_click_behavior(id, false);
        self.surface.disable_handle(id);
        true
    }

    /// Double click while a handle session is active toggles the sub-mode
    /// and remembers it for the next session.
    pub fn on_widget_double_click(&mut self, id: WidgetId) -> bool {
        if !self.surface.has_click_behavior(id) {
            return false;
        }
        let handle = self.surface.handle_type(id);
        if handle.is_move() {
            self.toggle_move_mode(id);
        } else if handle.is_resize() {
            self.toggle_resize_mode(id);
        } else {
            return false;
        }
        true
    }

    // ----- drag commits ------------------------------------------------

    pub fn begin_drag(&mut self, id: WidgetId) -> bool {
        self.surface.begin_drag(id)
    }

    pub fn drag_by(&mut self, id: WidgetId, dx: i32, dy: i32) -> bool {
        self.surface.drag_by(id, dx, dy)
    }

    /// Finish a handle drag. A committed resize updates the record; nothing
    /// was persisted while the drag was in progress.
    pub fn end_drag(&mut self, id: WidgetId) -> Option<DragCommit> {
        let commit = self.surface.end_drag(id)?;
        if commit.resized {
            if let Some(rec) = self.widgets.get_mut(&id) {
                rec.width = commit.width;
                rec.height = commit.height;
                let rec = *rec;
                if let Err(err) = self.store.insert(&rec) {
                    warn!("failed to persist resize of widget {id}: {err}");
                }
            }
        }
        Some(commit)
    }

    // ----- scroll plumbing ---------------------------------------------

    /// Follow the wallpaper offset, each component in `[0, 1]`.
    pub fn scroll(&mut self, scroll_x: f32, scroll_y: f32) {
        let page_x = self.surface.horizontal_page_count() as f32 * scroll_x;
        let page_y = self.surface.vertical_page_count() as f32 * scroll_y;
        self.surface.scroll_to_page(page_x, page_y);
    }
}

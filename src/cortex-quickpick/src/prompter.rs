//! Quick pick prompter.
//!
//! [`QuickPickPrompter`] ties the pieces together: it consumes item supplies,
//! keeps the live list and highlight, injects placeholder, error and free-text
//! rows, re-selects recent picks, keeps the step counter up to date, and turns
//! one round of user interaction into a [`PickOutcome`].
//!
//! Everything runs on the caller's task. `load_items` and `prompt_user` take
//! `&self` so they can be joined; the caller must not start a second load while
//! one is still running.
//!
//! Validation, estimation and deferred-value futures are polled without the
//! prompter's state lock held, so they may read the prompter. Synchronous
//! callbacks (comparator, validator, transform, inverse, error-row builder) run
//! under the lock and must not call back into the prompter.

use std::cmp::Ordering;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures::future::{BoxFuture, poll_fn};
use futures::{FutureExt, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::custom_input::{CustomInputController, CustomInputOptions, PendingValidation, ValidationDone};
use crate::error::{PromptError, Result};
use crate::estimate::{StepContext, StepEstimates};
use crate::item::{PickItem, PickOutcome, PickValue, Thunk};
use crate::loader::CachedLoader;
use crate::placeholder::{ErrorItem, PlaceholderInjector};
use crate::recent::{RecentSelection, find_recent};
use crate::settings::PrompterSettings;
use crate::supply::{ItemSupply, SupplyEvent, normalize};
use crate::surface::{ButtonView, ItemId, ItemView, PickerSurface, SurfaceEvent};

/// Id of the free-text row.
pub const CUSTOM_INPUT_ID: ItemId = ItemId(0);

/// Id of the placeholder or error row.
pub const PLACEHOLDER_ID: ItemId = ItemId(u64::MAX);

/// Secondary ordering applied after recently used items.
pub type Comparator<T> = Arc<dyn Fn(&PickItem<T>, &PickItem<T>) -> Ordering + Send + Sync>;

/// Where the prompter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Nothing loaded or shown yet
    Idle,
    /// A load is in flight
    Loading,
    /// Items are settled
    Ready,
    /// A prompt resolved with a pick or a button signal
    Resolved,
    /// The picker was dismissed
    Cancelled,
}

/// What a title button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Resolve with [`PickOutcome::Back`]
    Back,
    /// Resolve with [`PickOutcome::Exit`]
    Exit,
    /// Reload through the configured loader
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickButton {
    pub id: String,
    pub tooltip: String,
    pub action: ButtonAction,
}

impl PickButton {
    pub fn new(id: impl Into<String>, tooltip: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            id: id.into(),
            tooltip: tooltip.into(),
            action,
        }
    }
}

/// Per-prompter configuration.
pub struct PrompterOptions<T> {
    pub settings: PrompterSettings,
    pub no_items: Option<PickItem<T>>,
    pub error_item: ErrorItem<T>,
    pub comparator: Option<Comparator<T>>,
    pub custom_input: Option<CustomInputOptions<T>>,
    pub loader: Option<CachedLoader<T>>,
}

impl<T> Default for PrompterOptions<T> {
    fn default() -> Self {
        Self {
            settings: PrompterSettings::default(),
            no_items: None,
            error_item: ErrorItem::Default,
            comparator: None,
            custom_input: None,
            loader: None,
        }
    }
}

impl<T> PrompterOptions<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: PrompterSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_no_items(mut self, item: PickItem<T>) -> Self {
        self.no_items = Some(item);
        self
    }

    pub fn with_error_item(mut self, error_item: ErrorItem<T>) -> Self {
        self.error_item = error_item;
        self
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&PickItem<T>, &PickItem<T>) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    pub fn with_custom_input(mut self, custom_input: CustomInputOptions<T>) -> Self {
        self.custom_input = Some(custom_input);
        self
    }

    pub fn with_loader(mut self, loader: CachedLoader<T>) -> Self {
        self.loader = Some(loader);
        self
    }
}

/// Per-invocation configuration for [`QuickPickPrompter::prompt_user`].
pub struct PromptConfig<T> {
    pub steps: Option<StepContext<T>>,
    pub recent: Option<RecentSelection<T>>,
    pub buttons: Vec<PickButton>,
}

impl<T> Default for PromptConfig<T> {
    fn default() -> Self {
        Self {
            steps: None,
            recent: None,
            buttons: Vec::new(),
        }
    }
}

impl<T> PromptConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steps(mut self, steps: StepContext<T>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_recent(mut self, recent: RecentSelection<T>) -> Self {
        self.recent = Some(recent);
        self
    }

    pub fn with_button(mut self, button: PickButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// A background computation polled by the prompt loop.
///
/// Replacing the task drops the previous one and wakes the loop so the new
/// task gets polled.
struct TaskSlot<O> {
    task: Option<BoxFuture<'static, O>>,
    waker: Option<Waker>,
    generation: u64,
}

impl<O> Default for TaskSlot<O> {
    fn default() -> Self {
        Self {
            task: None,
            waker: None,
            generation: 0,
        }
    }
}

impl<O> TaskSlot<O> {
    fn set(&mut self, task: Option<BoxFuture<'static, O>>) {
        self.task = task;
        self.generation += 1;
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

/// Poll the task held in a slot of `lock` without holding the lock.
///
/// The task is taken out for the poll and put back only if the slot was not
/// replaced or cleared in the meantime.
fn poll_slot<S, O>(
    lock: &Mutex<S>,
    cx: &mut Context<'_>,
    pick: fn(&mut S) -> &mut TaskSlot<O>,
) -> Poll<O> {
    let (mut task, generation) = {
        let mut guard = lock.lock();
        let slot = pick(&mut guard);
        slot.waker = Some(cx.waker().clone());
        match slot.task.take() {
            Some(task) => (task, slot.generation),
            None => return Poll::Pending,
        }
    };

    let poll = task.poll_unpin(cx);
    if poll.is_pending() {
        let mut guard = lock.lock();
        let slot = pick(&mut guard);
        if slot.generation == generation {
            slot.task = Some(task);
        }
    }
    poll
}

struct Entry<T> {
    id: ItemId,
    item: PickItem<T>,
}

struct StepState<T> {
    step: usize,
    total_steps: usize,
    estimates: Option<StepEstimates<T>>,
    estimated_for: Vec<ItemId>,
}

/// How an accepted row resolves.
enum Resolution<T> {
    Outcome(PickOutcome<T>),
    Deferred { label: String, thunk: Thunk<T> },
}

struct PickerState<T> {
    entries: Vec<Entry<T>>,
    placeholder: PlaceholderInjector<T>,
    custom: Option<CustomInputController<T>>,
    active: Vec<ItemId>,
    next_id: u64,
    pending_loads: usize,
    lifecycle: Lifecycle,
    recent: Option<RecentSelection<T>>,
    recent_settled: bool,
    hidden: CancellationToken,
    steps: Option<StepState<T>>,
    validation: TaskSlot<ValidationDone>,
    estimation: TaskSlot<usize>,
}

impl<T: Clone + Serialize + Send + Sync + 'static> PickerState<T> {
    /// Stop every load started so far; later loads get a fresh token.
    fn abandon_loads(&mut self) {
        std::mem::replace(&mut self.hidden, CancellationToken::new()).cancel();
    }

    fn alloc_id(&mut self) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Free-text row first, then loaded items, then any placeholder or error row.
    fn visible(&self) -> Vec<(ItemId, &PickItem<T>)> {
        let mut rows = Vec::with_capacity(self.entries.len() + 2);
        if let Some(row) = self.custom.as_ref().and_then(|c| c.row()) {
            rows.push((CUSTOM_INPUT_ID, row));
        }
        rows.extend(self.entries.iter().map(|e| (e.id, &e.item)));
        if let Some(row) = self.placeholder.current() {
            rows.push((PLACEHOLDER_ID, row));
        }
        rows
    }

    /// Drop highlights that no longer exist; fall back to the first row.
    fn normalize_active(&mut self) {
        let ids: Vec<ItemId> = self.visible().into_iter().map(|(id, _)| id).collect();
        self.active.retain(|id| ids.contains(id));
        if self.active.is_empty()
            && let Some(first) = ids.first()
        {
            self.active.push(*first);
        }
    }

    fn views(&self) -> Vec<ItemView> {
        self.visible()
            .into_iter()
            .map(|(id, item)| ItemView {
                id,
                label: item.label.clone(),
                description: item.description.clone(),
                detail: item.detail.clone(),
                invalid: item.invalid_selection,
                always_show: item.always_show,
            })
            .collect()
    }

    fn active_items(&self) -> Vec<PickItem<T>> {
        let visible = self.visible();
        self.active
            .iter()
            .filter_map(|id| visible.iter().find(|(vid, _)| vid == id))
            .map(|(_, item)| (*item).clone())
            .collect()
    }

    fn set_custom_text(&mut self, text: &str) {
        if let Some(custom) = self.custom.as_mut() {
            let pending = custom.on_text_changed(text);
            self.validation.set(pending);
        }
    }

    /// Highlight the recent pick if it is loaded. Returns whether it matched.
    fn match_recent(&mut self) -> bool {
        let Some(recent) = &self.recent else {
            return false;
        };
        match find_recent(self.entries.iter().map(|e| &e.item), recent) {
            Some(index) => {
                self.active = vec![self.entries[index].id];
                self.recent = None;
                true
            }
            None => false,
        }
    }

    /// Give up on matching: restore free text through the inverse when possible,
    /// otherwise clear the marker and keep the default highlight.
    fn finish_recent(&mut self, surface: &dyn PickerSurface) {
        let Some(recent) = self.recent.take() else {
            return;
        };
        let text = match (&recent, self.custom.as_ref()) {
            (RecentSelection::Value(value), Some(custom)) => custom.inverse(value),
            _ => None,
        };
        match text {
            Some(text) => {
                surface.set_value(&text);
                self.set_custom_text(&text);
                self.active = vec![CUSTOM_INPUT_ID];
            }
            None => trace!("Recent selection not found in picker items"),
        }
    }

    /// Schedule a step estimate when the highlighted rows changed.
    fn schedule_estimate(&mut self) {
        let Some(steps) = self.steps.as_ref() else {
            return;
        };
        if steps.estimates.is_none() || steps.estimated_for == self.active {
            return;
        }
        let items = self.active_items();
        let active = self.active.clone();
        if let Some(steps) = self.steps.as_mut()
            && let Some(estimates) = steps.estimates.clone()
        {
            steps.estimated_for = active;
            self.estimation
                .set(Some(async move { estimates.max_estimate(&items).await }.boxed()));
        }
    }
}

/// Drives a [`PickerSurface`] through loading, filtering and one pick.
pub struct QuickPickPrompter<T> {
    surface: Arc<dyn PickerSurface>,
    settings: PrompterSettings,
    comparator: Option<Comparator<T>>,
    loader: Option<CachedLoader<T>>,
    state: Mutex<PickerState<T>>,
}

impl<T: Clone + Serialize + Send + Sync + 'static> QuickPickPrompter<T> {
    pub fn new(surface: Arc<dyn PickerSurface>, options: PrompterOptions<T>) -> Self {
        let PrompterOptions {
            settings,
            no_items,
            error_item,
            comparator,
            custom_input,
            loader,
        } = options;

        let mut placeholder = PlaceholderInjector::new(&settings).with_error_item(error_item);
        if let Some(item) = no_items {
            placeholder = placeholder.with_no_items(item);
        }
        let custom = custom_input.map(|options| CustomInputController::new(options, &settings));

        Self {
            surface,
            comparator,
            loader,
            state: Mutex::new(PickerState {
                entries: Vec::new(),
                placeholder,
                custom,
                active: Vec::new(),
                next_id: 1,
                pending_loads: 0,
                lifecycle: Lifecycle::Idle,
                recent: None,
                recent_settled: false,
                hidden: CancellationToken::new(),
                steps: None,
                validation: TaskSlot::default(),
                estimation: TaskSlot::default(),
            }),
            settings,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    pub fn settings(&self) -> &PrompterSettings {
        &self.settings
    }

    /// Loaded items, excluding placeholder and free-text rows.
    pub fn items(&self) -> Vec<PickItem<T>> {
        self.state.lock().entries.iter().map(|e| e.item.clone()).collect()
    }

    /// Whether the placeholder or error row is showing.
    pub fn is_showing_placeholder(&self) -> bool {
        self.state.lock().placeholder.is_showing()
    }

    /// Load items, blocking user input while an asynchronous supply is pending.
    pub async fn load_items(&self, supply: ItemSupply<T>) {
        self.load_items_with(supply, true).await
    }

    /// Load items and append them as they arrive.
    ///
    /// Failures are shown as an error row and never returned. Hiding the picker
    /// stops pulling from a stream.
    pub async fn load_items_with(&self, supply: ItemSupply<T>, disable_input: bool) {
        let is_async = supply.is_async();
        let mode = supply.mode();
        let hidden = {
            let mut state = self.state.lock();
            state.pending_loads += 1;
            if !matches!(state.lifecycle, Lifecycle::Resolved | Lifecycle::Cancelled) {
                state.lifecycle = Lifecycle::Loading;
            }
            state.hidden.clone()
        };
        if is_async {
            self.surface.set_busy(true);
            if disable_input {
                self.surface.set_enabled(false);
            }
        }

        let mut events = normalize(supply);
        loop {
            let event = tokio::select! {
                biased;
                _ = hidden.cancelled() => {
                    trace!(mode, "Picker hidden; abandoning item supply");
                    break;
                }
                event = events.next() => event,
            };
            match event {
                Some(SupplyEvent::Append(items)) => self.append(items),
                Some(SupplyEvent::Failed(err)) => {
                    debug!(mode, error = %err, "Failed to load picker items");
                    self.state.lock().placeholder.on_failure(&err);
                    break;
                }
                None => break,
            }
        }
        drop(events);

        let idle = {
            let mut state = self.state.lock();
            state.pending_loads = state.pending_loads.saturating_sub(1);
            let idle = state.pending_loads == 0;
            let custom_row = state.custom.as_ref().is_some_and(|c| c.row().is_some());
            let visible = state.entries.len() + usize::from(custom_row);
            state.placeholder.after_update(visible, !idle);
            if idle {
                if state.lifecycle == Lifecycle::Loading {
                    state.lifecycle = Lifecycle::Ready;
                }
                if state.recent_settled && !state.match_recent() {
                    state.finish_recent(self.surface.as_ref());
                }
            }
            idle
        };
        if is_async && idle {
            self.surface.set_busy(false);
            self.surface.set_enabled(true);
        }
        self.sync();
    }

    /// Empty the list and drop any placeholder. In-flight loads keep running.
    pub fn clear_items(&self) {
        {
            let mut state = self.state.lock();
            state.entries.clear();
            state.placeholder.clear();
            state.active.clear();
        }
        self.sync();
    }

    /// Invalidate the configured loader, clear and reload.
    pub async fn refresh_items(&self) {
        let Some(loader) = self.loader.clone() else {
            debug!("Refresh requested without a configured loader");
            return;
        };
        loader.invalidate();
        self.clear_items();
        self.load_items(loader.supply()).await;
    }

    /// Reload, keeping the highlighted labels highlighted where they reappear.
    pub async fn clear_and_load_items(&self, supply: ItemSupply<T>) {
        let labels: Vec<String> = {
            let state = self.state.lock();
            state.active_items().into_iter().map(|item| item.label).collect()
        };
        self.clear_items();
        self.load_items(supply).await;
        self.select_items(labels.as_slice());
    }

    /// Highlight rows by label; the first row when none match.
    pub fn select_items<S: AsRef<str>>(&self, labels: &[S]) {
        {
            let mut state = self.state.lock();
            let ids: Vec<ItemId> = state
                .visible()
                .into_iter()
                .filter(|(_, item)| labels.iter().any(|l| l.as_ref() == item.label))
                .map(|(id, _)| id)
                .collect();
            state.active = ids;
        }
        self.sync();
    }

    /// Highlight the row matching a previous pick. Returns whether one matched.
    pub fn select_recent(&self, recent: RecentSelection<T>) -> bool {
        let matched = {
            let mut state = self.state.lock();
            state.recent = Some(recent);
            let matched = state.match_recent();
            if !matched {
                state.active.clear();
                state.finish_recent(self.surface.as_ref());
            }
            matched
        };
        self.sync();
        matched
    }

    /// Show the picker and wait for one outcome.
    ///
    /// Resolves on acceptance of a valid highlighted row, on dismissal (as
    /// [`PickOutcome::Exit`]), or on a Back/Exit button. Once an outcome is
    /// reached the event subscription is dropped, the surface is hidden and any
    /// load still running is abandoned.
    pub async fn prompt_user(&self, config: PromptConfig<T>) -> Result<PickOutcome<T>> {
        let PromptConfig {
            steps,
            recent,
            buttons,
        } = config;

        let mut events = self.surface.subscribe();
        let first = {
            let mut state = self.state.lock();
            state.lifecycle = if state.pending_loads > 0 {
                Lifecycle::Loading
            } else {
                Lifecycle::Ready
            };
            state.recent = recent;
            state.recent_settled = false;
            state.match_recent();
            state
                .visible()
                .first()
                .map(|(id, item)| (*id, (*item).clone()))
        };

        self.surface.set_buttons(
            buttons
                .iter()
                .map(|b| ButtonView {
                    id: b.id.clone(),
                    tooltip: b.tooltip.clone(),
                })
                .collect(),
        );

        if let Some(ctx) = steps {
            let mut extra = 0;
            let mut estimated_for = Vec::new();
            if let (Some(estimates), Some((id, item))) = (&ctx.estimates, first) {
                extra = estimates.estimate(&item).await;
                estimated_for.push(id);
            }
            self.surface
                .set_steps(Some(ctx.step), Some(ctx.total_steps + extra));
            self.state.lock().steps = Some(StepState {
                step: ctx.step,
                total_steps: ctx.total_steps,
                estimates: ctx.estimates,
                estimated_for,
            });
        }

        self.sync();
        self.surface.show();

        let settle = tokio::time::sleep(self.settings.recent_settle());
        tokio::pin!(settle);
        let mut settled = false;
        let mut refresh: Option<Pin<Box<dyn Future<Output = ()> + Send + '_>>> = None;

        let resolution = loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        if let Some(resolution) = self.handle_event(event, &buttons, &mut refresh) {
                            break Ok(resolution);
                        }
                    }
                    None => {
                        let mut state = self.state.lock();
                        state.abandon_loads();
                        state.lifecycle = Lifecycle::Cancelled;
                        break Err(PromptError::SurfaceClosed);
                    }
                },
                _ = &mut settle, if !settled => {
                    settled = true;
                    self.settle_recent();
                }
                done = poll_fn(|cx| poll_slot(&self.state, cx, |s| &mut s.validation)) => {
                    self.apply_validation(done);
                }
                extra = poll_fn(|cx| poll_slot(&self.state, cx, |s| &mut s.estimation)) => {
                    self.apply_estimate(extra);
                }
                _ = async { if let Some(task) = refresh.as_mut() { task.await } }, if refresh.is_some() => {
                    refresh = None;
                }
            }
        };

        drop(events);
        drop(refresh);
        {
            let mut state = self.state.lock();
            state.abandon_loads();
            state.validation.set(None);
            state.estimation.set(None);
            state.steps = None;
            state.recent = None;
        }
        self.surface.hide();

        match resolution? {
            Resolution::Outcome(outcome) => Ok(outcome),
            Resolution::Deferred { label, thunk } => thunk()
                .await
                .map(PickOutcome::Value)
                .map_err(|source| PromptError::Deferred { label, source }),
        }
    }

    fn handle_event<'a>(
        &'a self,
        event: SurfaceEvent,
        buttons: &[PickButton],
        refresh: &mut Option<Pin<Box<dyn Future<Output = ()> + Send + 'a>>>,
    ) -> Option<Resolution<T>> {
        match event {
            SurfaceEvent::Accept => self.accept(),
            SurfaceEvent::Hide => {
                let mut state = self.state.lock();
                state.abandon_loads();
                state.lifecycle = Lifecycle::Cancelled;
                Some(Resolution::Outcome(PickOutcome::Exit))
            }
            SurfaceEvent::ActiveChanged(ids) => {
                {
                    let mut state = self.state.lock();
                    state.active = ids;
                    state.recent = None;
                }
                self.sync();
                None
            }
            SurfaceEvent::ValueChanged(text) => {
                self.state.lock().set_custom_text(&text);
                self.sync();
                None
            }
            SurfaceEvent::ButtonTriggered(id) => {
                let Some(button) = buttons.iter().find(|b| b.id == id) else {
                    trace!(button = %id, "Ignoring unknown picker button");
                    return None;
                };
                match button.action {
                    ButtonAction::Back => {
                        self.state.lock().lifecycle = Lifecycle::Resolved;
                        Some(Resolution::Outcome(PickOutcome::Back))
                    }
                    ButtonAction::Exit => {
                        self.state.lock().lifecycle = Lifecycle::Resolved;
                        Some(Resolution::Outcome(PickOutcome::Exit))
                    }
                    ButtonAction::Refresh => {
                        *refresh = Some(Box::pin(self.refresh_items()));
                        None
                    }
                }
            }
        }
    }

    /// Accept the highlighted rows.
    ///
    /// `on_click` callbacks fire for every highlighted row first, even invalid
    /// ones; a returned signal resolves the prompt. Otherwise the first row is
    /// picked unless any highlighted row is invalid.
    fn accept(&self) -> Option<Resolution<T>> {
        let picked = self.state.lock().active_items();
        if picked.is_empty() {
            return None;
        }

        let mut signal = None;
        for item in &picked {
            if let Some(on_click) = &item.on_click
                && let Some(s) = on_click()
            {
                if signal.is_none() {
                    signal = Some(s);
                }
            }
        }

        let mut state = self.state.lock();
        if let Some(signal) = signal {
            state.lifecycle = Lifecycle::Resolved;
            return Some(Resolution::Outcome(signal.into()));
        }
        if picked.iter().any(|item| item.invalid_selection) {
            return None;
        }

        let first = picked.into_iter().next()?;
        let resolution = match first.value {
            PickValue::Immediate(value) => Resolution::Outcome(PickOutcome::Value(value)),
            PickValue::Deferred(thunk) => Resolution::Deferred {
                label: first.label,
                thunk,
            },
            PickValue::CustomInput => Resolution::Outcome(state.custom.as_ref()?.accept()),
            PickValue::None => return None,
        };
        state.lifecycle = Lifecycle::Resolved;
        Some(resolution)
    }

    fn settle_recent(&self) {
        {
            let mut state = self.state.lock();
            state.recent_settled = true;
            if !state.match_recent() && state.pending_loads == 0 {
                state.finish_recent(self.surface.as_ref());
            }
        }
        self.sync();
    }

    fn apply_validation(&self, done: ValidationDone) {
        {
            let mut state = self.state.lock();
            let next: Option<PendingValidation> = match state.custom.as_mut() {
                Some(custom) => custom.apply_validation(done),
                None => None,
            };
            if next.is_some() {
                state.validation.set(next);
            }
        }
        self.sync();
    }

    fn apply_estimate(&self, extra: usize) {
        let steps = self
            .state
            .lock()
            .steps
            .as_ref()
            .map(|s| (s.step, s.total_steps));
        if let Some((step, total_steps)) = steps {
            self.surface.set_steps(Some(step), Some(total_steps + extra));
        }
    }

    fn append(&self, items: Vec<PickItem<T>>) {
        {
            let mut state = self.state.lock();
            state.placeholder.clear();
            for mut item in items {
                if item.recently_used {
                    let suffix = &self.settings.recent_suffix;
                    item.description = Some(match item.description.take() {
                        Some(description) => format!("{description} {suffix}"),
                        None => suffix.clone(),
                    });
                }
                let id = state.alloc_id();
                state.entries.push(Entry { id, item });
            }

            let comparator = self.comparator.clone();
            state.entries.sort_by(|a, b| {
                b.item.recently_used.cmp(&a.item.recently_used).then_with(|| {
                    comparator
                        .as_ref()
                        .map_or(Ordering::Equal, |cmp| cmp(&a.item, &b.item))
                })
            });
            state.match_recent();
        }
        self.sync();
    }

    /// Push the visible rows and highlight to the surface.
    fn sync(&self) {
        let (views, active) = {
            let mut state = self.state.lock();
            state.normalize_active();
            state.schedule_estimate();
            (state.views(), state.active.clone())
        };
        self.surface.set_items(views);
        self.surface.set_active(active);
    }
}

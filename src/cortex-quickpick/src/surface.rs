//! Picker surface interface.
//!
//! The prompter does not render anything itself. It pushes item views and
//! widget state into a [`PickerSurface`] and receives user interaction back
//! as [`SurfaceEvent`]s. [`MemorySurface`] is a complete in-memory surface
//! for headless runs and tests.

use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Stable identity of a row for the lifetime of a prompter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

/// What the surface needs to display a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: ItemId,
    pub label: String,
    pub description: Option<String>,
    pub detail: Option<String>,
    /// Shown but not acceptable
    pub invalid: bool,
    /// Exempt from the surface's own text filtering
    pub always_show: bool,
}

/// A button shown in the surface's title area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonView {
    pub id: String,
    pub tooltip: String,
}

/// User interaction reported by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Accept the highlighted rows
    Accept,
    /// The picker was dismissed
    Hide,
    /// The highlighted rows changed
    ActiveChanged(Vec<ItemId>),
    /// The filter text changed
    ValueChanged(String),
    /// A title button was pressed
    ButtonTriggered(String),
}

/// The rendering widget driven by the prompter.
///
/// Setters are called from the prompter only; the surface reports user actions
/// through the channel returned by [`subscribe`](PickerSurface::subscribe).
pub trait PickerSurface: Send + Sync {
    fn set_items(&self, items: Vec<ItemView>);

    fn set_active(&self, ids: Vec<ItemId>);

    /// Show a progress indicator.
    fn set_busy(&self, busy: bool);

    /// Allow or block user input.
    fn set_enabled(&self, enabled: bool);

    fn set_steps(&self, step: Option<usize>, total_steps: Option<usize>);

    fn set_buttons(&self, buttons: Vec<ButtonView>);

    fn value(&self) -> String;

    /// Replace the filter text. Must not echo a [`SurfaceEvent::ValueChanged`].
    fn set_value(&self, value: &str);

    fn show(&self);

    /// Close the widget once a prompt has resolved. Must not emit
    /// [`SurfaceEvent::Hide`].
    fn hide(&self);

    /// Start delivering events to a new receiver.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<SurfaceEvent>;
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<ItemView>,
    active: Vec<ItemId>,
    buttons: Vec<ButtonView>,
    busy: bool,
    enabled: bool,
    step: Option<usize>,
    total_steps: Option<usize>,
    value: String,
    visible: bool,
    events: Option<mpsc::UnboundedSender<SurfaceEvent>>,
}

/// In-memory surface.
///
/// Keeps whatever the prompter last pushed and lets a driver play the user's
/// part through [`type_text`](MemorySurface::type_text), [`accept`](MemorySurface::accept),
/// [`dismiss`](MemorySurface::dismiss) and friends.
#[derive(Debug)]
pub struct MemorySurface {
    state: Mutex<MemoryState>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                enabled: true,
                ..Default::default()
            }),
        }
    }

    /// Deliver an event. Returns false when nobody is subscribed.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        let state = self.state.lock();
        match &state.events {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Replace the filter text as if typed.
    pub fn type_text(&self, text: &str) -> bool {
        self.state.lock().value = text.to_string();
        self.emit(SurfaceEvent::ValueChanged(text.to_string()))
    }

    pub fn accept(&self) -> bool {
        self.emit(SurfaceEvent::Accept)
    }

    /// Hide the picker as the user would.
    pub fn dismiss(&self) -> bool {
        self.state.lock().visible = false;
        self.emit(SurfaceEvent::Hide)
    }

    pub fn press_button(&self, id: &str) -> bool {
        self.emit(SurfaceEvent::ButtonTriggered(id.to_string()))
    }

    /// Move the highlight to the rows with the given labels.
    pub fn highlight(&self, labels: &[&str]) -> bool {
        let ids: Vec<ItemId> = {
            let mut state = self.state.lock();
            let ids: Vec<ItemId> = state
                .items
                .iter()
                .filter(|view| labels.contains(&view.label.as_str()))
                .map(|view| view.id)
                .collect();
            state.active = ids.clone();
            ids
        };
        self.emit(SurfaceEvent::ActiveChanged(ids))
    }

    /// Drop the event channel, as a surface torn down mid-prompt would.
    pub fn close(&self) {
        self.state.lock().events = None;
    }

    pub fn items(&self) -> Vec<ItemView> {
        self.state.lock().items.clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.state.lock().items.iter().map(|v| v.label.clone()).collect()
    }

    pub fn active_labels(&self) -> Vec<String> {
        let state = self.state.lock();
        state
            .active
            .iter()
            .filter_map(|id| state.items.iter().find(|v| v.id == *id))
            .map(|v| v.label.clone())
            .collect()
    }

    pub fn buttons(&self) -> Vec<ButtonView> {
        self.state.lock().buttons.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.lock().busy
    }

    pub fn is_enabled(&self) -> bool {
        self.state.lock().enabled
    }

    pub fn steps(&self) -> (Option<usize>, Option<usize>) {
        let state = self.state.lock();
        (state.step, state.total_steps)
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock().visible
    }

    /// Whether a live receiver is attached.
    pub fn is_subscribed(&self) -> bool {
        self.state
            .lock()
            .events
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

impl PickerSurface for MemorySurface {
    fn set_items(&self, items: Vec<ItemView>) {
        self.state.lock().items = items;
    }

    fn set_active(&self, ids: Vec<ItemId>) {
        self.state.lock().active = ids;
    }

    fn set_busy(&self, busy: bool) {
        self.state.lock().busy = busy;
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn set_steps(&self, step: Option<usize>, total_steps: Option<usize>) {
        let mut state = self.state.lock();
        state.step = step;
        state.total_steps = total_steps;
    }

    fn set_buttons(&self, buttons: Vec<ButtonView>) {
        self.state.lock().buttons = buttons;
    }

    fn value(&self) -> String {
        self.state.lock().value.clone()
    }

    fn set_value(&self, value: &str) {
        self.state.lock().value = value.to_string();
    }

    fn show(&self) {
        self.state.lock().visible = true;
    }

    fn hide(&self) {
        self.state.lock().visible = false;
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<SurfaceEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().events = Some(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: u64, label: &str) -> ItemView {
        ItemView {
            id: ItemId(id),
            label: label.to_string(),
            description: None,
            detail: None,
            invalid: false,
            always_show: false,
        }
    }

    #[test]
    fn test_emit_requires_subscription() {
        let surface = MemorySurface::new();
        assert!(!surface.accept());

        let mut rx = surface.subscribe();
        assert!(surface.is_subscribed());
        assert!(surface.accept());
        assert_eq!(rx.try_recv().unwrap(), SurfaceEvent::Accept);

        drop(rx);
        assert!(!surface.is_subscribed());
        assert!(!surface.accept());
    }

    #[test]
    fn test_highlight_by_label() {
        let surface = MemorySurface::new();
        let mut rx = surface.subscribe();
        surface.set_items(vec![view(1, "a"), view(2, "b")]);

        surface.highlight(&["b"]);
        assert_eq!(surface.active_labels(), vec!["b"]);
        assert_eq!(rx.try_recv().unwrap(), SurfaceEvent::ActiveChanged(vec![ItemId(2)]));
    }

    #[test]
    fn test_type_text_and_dismiss() {
        let surface = MemorySurface::new();
        let mut rx = surface.subscribe();
        surface.show();

        surface.type_text("abc");
        assert_eq!(surface.value(), "abc");
        assert_eq!(rx.try_recv().unwrap(), SurfaceEvent::ValueChanged("abc".into()));

        surface.dismiss();
        assert!(!surface.is_visible());
        assert_eq!(rx.try_recv().unwrap(), SurfaceEvent::Hide);
    }

    #[test]
    fn test_hide_is_silent() {
        let surface = MemorySurface::new();
        let mut rx = surface.subscribe();
        surface.show();
        assert!(surface.is_visible());

        surface.hide();
        assert!(!surface.is_visible());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_set_value_does_not_echo() {
        let surface = MemorySurface::new();
        let mut rx = surface.subscribe();
        surface.set_value("quiet");
        assert_eq!(surface.value(), "quiet");
        assert!(rx.try_recv().is_err());
    }
}

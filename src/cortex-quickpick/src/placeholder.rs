//! Placeholder and error rows.
//!
//! When a load leaves the list empty, or fails, a single informational row is
//! shown in place of real items. Accepting it sends the flow back one step.

use std::sync::Arc;

use crate::item::{FlowSignal, PickItem};
use crate::settings::PrompterSettings;

/// Builds the row shown for a failed load.
pub type ErrorItemFn<T> = Arc<dyn Fn(&anyhow::Error) -> PickItem<T> + Send + Sync>;

/// How the error row is configured.
pub enum ErrorItem<T> {
    /// Default label, error message as detail
    Default,
    /// Custom label, error message as detail
    Label(String),
    /// A fixed row; the error message fills its detail when unset
    Item(PickItem<T>),
    /// Built from the error
    Custom(ErrorItemFn<T>),
}

impl<T> Default for ErrorItem<T> {
    fn default() -> Self {
        ErrorItem::Default
    }
}

/// Tracks the placeholder currently shown, if any.
pub struct PlaceholderInjector<T> {
    no_items: Option<PickItem<T>>,
    error: ErrorItem<T>,
    no_items_label: String,
    error_label: String,
    current: Option<PickItem<T>>,
}

impl<T: Clone> PlaceholderInjector<T> {
    pub fn new(settings: &PrompterSettings) -> Self {
        Self {
            no_items: None,
            error: ErrorItem::Default,
            no_items_label: settings.no_items_label.clone(),
            error_label: settings.error_label.clone(),
            current: None,
        }
    }

    /// Replace the default "no items" row.
    pub fn with_no_items(mut self, item: PickItem<T>) -> Self {
        self.no_items = Some(item);
        self
    }

    pub fn with_error_item(mut self, error: ErrorItem<T>) -> Self {
        self.error = error;
        self
    }

    pub fn current(&self) -> Option<&PickItem<T>> {
        self.current.as_ref()
    }

    pub fn is_showing(&self) -> bool {
        self.current.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Show the "no items" row if the list is empty and nothing else is coming.
    ///
    /// An error row already showing is kept.
    pub fn after_update(&mut self, visible_len: usize, load_pending: bool) {
        if visible_len == 0 && !load_pending && self.current.is_none() {
            self.current = Some(self.no_items_item());
        }
    }

    /// Show the error row for a failed load.
    pub fn on_failure(&mut self, err: &anyhow::Error) {
        self.current = Some(self.error_item(err));
    }

    fn no_items_item(&self) -> PickItem<T> {
        let item = match &self.no_items {
            Some(item) => item.clone(),
            None => PickItem::informational(self.no_items_label.clone()),
        };
        informational_back_row(item)
    }

    fn error_item(&self, err: &anyhow::Error) -> PickItem<T> {
        let message = err.to_string();
        let item = match &self.error {
            ErrorItem::Default => {
                PickItem::informational(self.error_label.clone()).with_detail(message)
            }
            ErrorItem::Label(label) => PickItem::informational(label.clone()).with_detail(message),
            ErrorItem::Item(item) => {
                let mut item = item.clone();
                if item.detail.is_none() {
                    item.detail = Some(message);
                }
                item
            }
            ErrorItem::Custom(build) => build(err),
        };
        informational_back_row(item)
    }
}

fn informational_back_row<T>(mut item: PickItem<T>) -> PickItem<T> {
    item.invalid_selection = true;
    item.skip_estimate = true;
    item.always_show = true;
    if item.on_click.is_none() {
        item.on_click = Some(Arc::new(|| Some(FlowSignal::Back)));
    }
    item
}

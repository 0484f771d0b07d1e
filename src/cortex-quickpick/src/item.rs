//! Pick item model.
//!
//! A [`PickItem`] is a single selectable row. Its value is either ready
//! ([`PickValue::Immediate`]) or produced on demand by a thunk
//! ([`PickValue::Deferred`]). Rows injected by the prompter itself carry
//! [`PickValue::CustomInput`] (the free-text row) or [`PickValue::None`]
//! (placeholder and error rows).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

/// Produces an item's value when it is selected or estimated.
pub type Thunk<T> = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<T>> + Send + Sync>;

/// Side effect fired when an item is accepted. Returning a signal resolves the prompt with it.
pub type OnClick = Arc<dyn Fn() -> Option<FlowSignal> + Send + Sync>;

/// Control signals exchanged with the enclosing multi-step flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowSignal {
    /// Return to the previous step
    Back,
    /// Abort the whole flow
    Exit,
}

/// What a prompt resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome<T> {
    /// A value was picked
    Value(T),
    /// The user asked to go back one step
    Back,
    /// The user dismissed the picker or aborted the flow
    Exit,
}

impl<T> PickOutcome<T> {
    /// Returns the picked value, if any.
    pub fn value(self) -> Option<T> {
        match self {
            PickOutcome::Value(v) => Some(v),
            PickOutcome::Back | PickOutcome::Exit => None,
        }
    }

    pub fn is_signal(&self) -> bool {
        !matches!(self, PickOutcome::Value(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PickOutcome<U> {
        match self {
            PickOutcome::Value(v) => PickOutcome::Value(f(v)),
            PickOutcome::Back => PickOutcome::Back,
            PickOutcome::Exit => PickOutcome::Exit,
        }
    }
}

impl<T> From<FlowSignal> for PickOutcome<T> {
    fn from(signal: FlowSignal) -> Self {
        match signal {
            FlowSignal::Back => PickOutcome::Back,
            FlowSignal::Exit => PickOutcome::Exit,
        }
    }
}

/// The value attached to a pick item.
pub enum PickValue<T> {
    /// The final result
    Immediate(T),
    /// Resolved asynchronously when the item is accepted
    Deferred(Thunk<T>),
    /// The free-text row; the typed text is transformed on acceptance
    CustomInput,
    /// Informational row without a value
    None,
}

impl<T> PickValue<T> {
    pub fn is_deferred(&self) -> bool {
        matches!(self, PickValue::Deferred(_))
    }

    pub fn as_immediate(&self) -> Option<&T> {
        match self {
            PickValue::Immediate(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Clone> Clone for PickValue<T> {
    fn clone(&self) -> Self {
        match self {
            PickValue::Immediate(v) => PickValue::Immediate(v.clone()),
            PickValue::Deferred(thunk) => PickValue::Deferred(Arc::clone(thunk)),
            PickValue::CustomInput => PickValue::CustomInput,
            PickValue::None => PickValue::None,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PickValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PickValue::Immediate(v) => f.debug_tuple("Immediate").field(v).finish(),
            PickValue::Deferred(_) => f.write_str("Deferred(<thunk>)"),
            PickValue::CustomInput => f.write_str("CustomInput"),
            PickValue::None => f.write_str("None"),
        }
    }
}

/// A selectable row.
pub struct PickItem<T> {
    /// Display text, also the identity used for selection matching
    pub label: String,
    pub description: Option<String>,
    pub detail: Option<String>,
    pub value: PickValue<T>,
    /// Can be highlighted but never accepted
    pub invalid_selection: bool,
    /// Excluded from step estimation
    pub skip_estimate: bool,
    /// Came from a previous invocation; sorted first
    pub recently_used: bool,
    /// Shown regardless of the surface's filter
    pub always_show: bool,
    pub on_click: Option<OnClick>,
}

impl<T> PickItem<T> {
    /// Create an item holding a final value.
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self::with_value(label, PickValue::Immediate(value))
    }

    /// Create an item whose value is produced on acceptance.
    ///
    /// Deferred items take part in step estimation by default.
    pub fn deferred<F, Fut>(label: impl Into<String>, thunk: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let thunk: Thunk<T> = Arc::new(move || thunk().boxed());
        Self::with_value(label, PickValue::Deferred(thunk))
    }

    /// Create an informational row that can never be accepted.
    pub fn informational(label: impl Into<String>) -> Self {
        let mut item = Self::with_value(label, PickValue::None);
        item.invalid_selection = true;
        item
    }

    pub fn with_value(label: impl Into<String>, value: PickValue<T>) -> Self {
        let skip_estimate = !value.is_deferred();
        Self {
            label: label.into(),
            description: None,
            detail: None,
            value,
            invalid_selection: false,
            skip_estimate,
            recently_used: false,
            always_show: false,
            on_click: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Mark as coming from a previous invocation.
    pub fn recently_used(mut self) -> Self {
        self.recently_used = true;
        self
    }

    /// Mark as not acceptable.
    pub fn invalid(mut self) -> Self {
        self.invalid_selection = true;
        self
    }

    /// Override whether the step estimator evaluates this item.
    pub fn skip_estimate(mut self, skip: bool) -> Self {
        self.skip_estimate = skip;
        self
    }

    pub fn always_show(mut self) -> Self {
        self.always_show = true;
        self
    }

    pub fn on_click<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Option<FlowSignal> + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(f));
        self
    }

    /// Whether accepting this item can produce a result.
    pub fn is_selectable(&self) -> bool {
        !self.invalid_selection && !matches!(self.value, PickValue::None)
    }
}

impl<T: Clone> Clone for PickItem<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            description: self.description.clone(),
            detail: self.detail.clone(),
            value: self.value.clone(),
            invalid_selection: self.invalid_selection,
            skip_estimate: self.skip_estimate,
            recently_used: self.recently_used,
            always_show: self.always_show,
            on_click: self.on_click.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PickItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickItem")
            .field("label", &self.label)
            .field("description", &self.description)
            .field("detail", &self.detail)
            .field("value", &self.value)
            .field("invalid_selection", &self.invalid_selection)
            .field("skip_estimate", &self.skip_estimate)
            .field("recently_used", &self.recently_used)
            .field("on_click", &self.on_click.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_estimate_defaults() {
        let immediate = PickItem::new("a", 1);
        assert!(immediate.skip_estimate);

        let deferred = PickItem::deferred("b", || async { Ok(2) });
        assert!(!deferred.skip_estimate);

        let forced = PickItem::new("c", 3).skip_estimate(false);
        assert!(!forced.skip_estimate);
    }

    #[test]
    fn test_selectable() {
        assert!(PickItem::new("a", 1).is_selectable());
        assert!(!PickItem::new("a", 1).invalid().is_selectable());
        assert!(!PickItem::<i32>::informational("info").is_selectable());
        assert!(PickItem::<i32>::with_value("free", PickValue::CustomInput).is_selectable());
    }

    #[test]
    fn test_outcome_from_signal() {
        assert_eq!(PickOutcome::<i32>::from(FlowSignal::Back), PickOutcome::Back);
        assert_eq!(PickOutcome::<i32>::from(FlowSignal::Exit), PickOutcome::Exit);
        assert_eq!(PickOutcome::Value(2).map(|v| v * 2), PickOutcome::Value(4));
        assert!(PickOutcome::<i32>::Back.is_signal());
        assert_eq!(PickOutcome::<i32>::Exit.value(), None);
    }

    #[tokio::test]
    async fn test_deferred_thunk_runs() {
        let item = PickItem::deferred("b", || async { Ok(7) });
        let PickValue::Deferred(thunk) = &item.value else {
            panic!("expected deferred value");
        };
        assert_eq!(thunk().await.unwrap(), 7);
    }
}

//! Free text as a pick item.
//!
//! When enabled, whatever the user types shows up as an extra row at the top
//! of the list. The row is validated on every change; asynchronous validators
//! are debounced and only the latest text's result is ever shown.
//!
//! The controller owns no timers or tasks. [`CustomInputController::on_text_changed`]
//! hands back the pending validation as a future; the caller polls it and feeds
//! the result into [`CustomInputController::apply_validation`]. Dropping a
//! pending future supersedes it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::item::{PickItem, PickOutcome, PickValue};
use crate::settings::PrompterSettings;

/// Result of validating typed text. `None` means valid.
pub enum Validation {
    Ready(Option<String>),
    Deferred(BoxFuture<'static, Option<String>>),
}

impl Validation {
    pub fn valid() -> Self {
        Validation::Ready(None)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Validation::Ready(Some(message.into()))
    }

    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Option<String>> + Send + 'static,
    {
        Validation::Deferred(future.boxed())
    }
}

pub type Validator = Arc<dyn Fn(&str) -> Validation + Send + Sync>;
pub type Transform<T> = Arc<dyn Fn(&str) -> PickOutcome<T> + Send + Sync>;
pub type Inverse<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Free-text configuration.
pub struct CustomInputOptions<T> {
    /// Description of the free-text row
    pub label: Option<String>,
    /// Turns the accepted text into the prompt's result
    pub transform: Transform<T>,
    pub validator: Option<Validator>,
    /// Recovers the text that produced a result, used for recency
    pub inverse: Option<Inverse<T>>,
}

impl<T> CustomInputOptions<T> {
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&str) -> PickOutcome<T> + Send + Sync + 'static,
    {
        Self {
            label: None,
            transform: Arc::new(transform),
            validator: None,
            inverse: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str) -> Validation + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_inverse<F>(mut self, inverse: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.inverse = Some(Arc::new(inverse));
        self
    }
}

/// A finished asynchronous validation and the text it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDone {
    pub text: String,
    pub message: Option<String>,
}

pub type PendingValidation = BoxFuture<'static, ValidationDone>;

/// Maintains the synthetic free-text row.
pub struct CustomInputController<T> {
    options: CustomInputOptions<T>,
    description: String,
    checking_label: String,
    debounce: Duration,
    text: String,
    row: Option<PickItem<T>>,
}

impl<T> CustomInputController<T> {
    pub fn new(options: CustomInputOptions<T>, settings: &PrompterSettings) -> Self {
        let description = options
            .label
            .clone()
            .unwrap_or_else(|| settings.custom_input_description.clone());
        Self {
            options,
            description,
            checking_label: settings.checking_label.clone(),
            debounce: settings.validation_debounce(),
            text: String::new(),
            row: None,
        }
    }

    /// The current free-text row, if the text is non-empty.
    pub fn row(&self) -> Option<&PickItem<T>> {
        self.row.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// React to new filter text.
    ///
    /// The previous row is removed first. Returns the debounced validation to
    /// await when the validator answers asynchronously; any earlier pending
    /// validation must be dropped by the caller.
    pub fn on_text_changed(&mut self, text: &str) -> Option<PendingValidation> {
        self.text = text.to_string();
        self.row = None;
        if text.is_empty() {
            return None;
        }

        let validation = match &self.options.validator {
            Some(validate) => validate(text),
            None => Validation::valid(),
        };

        match validation {
            Validation::Ready(message) => {
                self.row = Some(self.build_row(message, false));
                None
            }
            Validation::Deferred(result) => {
                self.row = Some(self.build_row(None, true));
                let debounce = self.debounce;
                let text = text.to_string();
                Some(
                    async move {
                        tokio::time::sleep(debounce).await;
                        let message = result.await;
                        ValidationDone { text, message }
                    }
                    .boxed(),
                )
            }
        }
    }

    /// Apply a finished validation.
    ///
    /// A result computed for text that is no longer current is not shown;
    /// validation restarts for the current text instead.
    pub fn apply_validation(&mut self, done: ValidationDone) -> Option<PendingValidation> {
        if done.text != self.text {
            tracing::trace!(
                stale = %done.text,
                current = %self.text,
                "Revalidating free text after stale result"
            );
            let current = self.text.clone();
            return self.on_text_changed(&current);
        }
        self.row = Some(self.build_row(done.message, false));
        None
    }

    /// Result of accepting the free-text row.
    pub fn accept(&self) -> PickOutcome<T> {
        (self.options.transform)(&self.text)
    }

    /// Text that would have produced `value`, if the caller can recover it.
    pub fn inverse(&self, value: &T) -> Option<String> {
        self.options.inverse.as_ref().and_then(|inverse| inverse(value))
    }

    fn build_row(&self, message: Option<String>, checking: bool) -> PickItem<T> {
        let mut row = PickItem::with_value(self.text.clone(), PickValue::CustomInput)
            .with_description(self.description.clone())
            .always_show();
        row.invalid_selection = checking || message.is_some();
        row.detail = if checking {
            Some(self.checking_label.clone())
        } else {
            message
        };
        row
    }
}

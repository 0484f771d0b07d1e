//! Quick pick prompter for Cortex.
//!
//! Drives a single-selection picker widget: loads items from immediate,
//! deferred or streamed sources, shows placeholder and error rows, offers a
//! validated free-text option, re-selects recent picks and keeps a step
//! counter for multi-step flows.

pub mod custom_input;
pub mod error;
pub mod estimate;
pub mod item;
pub mod loader;
pub mod placeholder;
pub mod prompter;
pub mod recent;
pub mod settings;
pub mod supply;
pub mod surface;

pub use custom_input::{CustomInputOptions, Validation};
pub use error::{PromptError, Result};
pub use estimate::{StepContext, StepEstimateCache, StepEstimates, StepEstimator, estimator_fn};
pub use item::{FlowSignal, PickItem, PickOutcome, PickValue};
pub use loader::CachedLoader;
pub use placeholder::ErrorItem;
pub use prompter::{
    ButtonAction, Lifecycle, PickButton, PromptConfig, PrompterOptions, QuickPickPrompter,
};
pub use recent::RecentSelection;
pub use settings::PrompterSettings;
pub use supply::{ItemSupply, SupplyChunk};
pub use surface::{ItemId, ItemView, MemorySurface, PickerSurface, SurfaceEvent};

//! Wells: identity, status, control properties and completions.

pub mod completion;
pub mod properties;
pub mod well;

pub use completion::{
    Completion, CompletionDirection, CompletionOrder, CompletionSet, CompletionState,
};
pub use properties::{
    GuideRatePhase, InjectionProperties, InjectorControlMode, InjectorType, Phase,
    ProducerControlMode, ProductionProperties, WellStatus,
};
pub use well::{Well, WellView};

//! Few-shot example selection and prompt composition.

pub mod composer;
pub mod selector;
pub mod types;

pub use composer::{sanitize_braces, PromptComposer};
pub use selector::ExampleSelector;
pub use types::{ComposedPrompt, Example, ExampleStore};

//! Prompt type definitions.

use concierge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A few-shot example pairing a sample question with the answer format the
/// model should imitate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Example {
    /// Sample user question
    pub input: String,

    /// Reference answer in the desired format
    pub output: String,
}

/// A validated, non-empty collection of few-shot examples.
#[derive(Debug, Clone)]
pub struct ExampleStore {
    examples: Vec<Example>,
}

impl ExampleStore {
    /// Create a store from examples, rejecting an empty collection.
    pub fn new(examples: Vec<Example>) -> AppResult<Self> {
        if examples.is_empty() {
            return Err(AppError::Config(
                "Example store must contain at least one example".to_string(),
            ));
        }
        Ok(Self { examples })
    }

    /// Load a store from a YAML file containing a list of examples.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let examples: Vec<Example> = serde_yaml::from_str(&content)?;
        Self::new(examples)
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// A rendered prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposedPrompt {
    /// Optional system message
    pub system: Option<String>,

    /// User message carrying example, context, history, and the query
    pub user: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_rejected() {
        let result = ExampleStore::new(vec![]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least one example"));
    }

    #[test]
    fn test_store_holds_examples() {
        let store = ExampleStore::new(vec![Example {
            input: "recommend a wine".to_string(),
            output: "Name: Merlot".to_string(),
        }])
        .unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.yaml");
        std::fs::write(
            &path,
            "- input: recommend a wine\n  output: \"Name: Merlot\"\n",
        )
        .unwrap();

        let store = ExampleStore::load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.examples()[0].input, "recommend a wine");
    }

    #[test]
    fn test_load_empty_yaml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examples.yaml");
        std::fs::write(&path, "[]\n").unwrap();
        assert!(ExampleStore::load(&path).is_err());
    }
}

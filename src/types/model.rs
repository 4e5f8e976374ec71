use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A chat model the playground is allowed to talk to.
///
/// The set is a fixed allow-list; switching between entries never touches the
/// conversation history.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    /// Mistral 7B Instruct, v0.2.
    #[default]
    #[serde(rename = "mistralai/Mistral-7B-Instruct-v0.2")]
    Mistral7BInstructV02,

    /// Mistral 7B Instruct, v0.1.
    #[serde(rename = "mistralai/Mistral-7B-Instruct-v0.1")]
    Mistral7BInstructV01,
}

impl Model {
    /// Every model on the allow-list, in the order they are offered.
    pub const ALL: [Model; 2] = [Model::Mistral7BInstructV02, Model::Mistral7BInstructV01];

    /// The upstream model identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Model::Mistral7BInstructV02 => "mistralai/Mistral-7B-Instruct-v0.2",
            Model::Mistral7BInstructV01 => "mistralai/Mistral-7B-Instruct-v0.1",
        }
    }

    /// Looks a model up by its 1-based position in [`Model::ALL`].
    pub fn from_index(index: usize) -> Option<Model> {
        index
            .checked_sub(1)
            .and_then(|i| Model::ALL.get(i))
            .copied()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Model::ALL
            .iter()
            .find(|model| model.id().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                Error::validation(
                    format!("{s} is not an available model"),
                    Some("model".to_string()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_uses_upstream_id() {
        let json = serde_json::to_string(&Model::Mistral7BInstructV01).unwrap();
        assert_eq!(json, r#""mistralai/Mistral-7B-Instruct-v0.1""#);

        let model: Model = serde_json::from_str(r#""mistralai/Mistral-7B-Instruct-v0.2""#).unwrap();
        assert_eq!(model, Model::Mistral7BInstructV02);
    }

    #[test]
    fn display() {
        assert_eq!(
            Model::default().to_string(),
            "mistralai/Mistral-7B-Instruct-v0.2"
        );
    }

    #[test]
    fn parse_allow_list() {
        let model: Model = "mistralai/mistral-7b-instruct-v0.1".parse().unwrap();
        assert_eq!(model, Model::Mistral7BInstructV01);

        let err = "gpt2".parse::<Model>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn index_lookup() {
        assert_eq!(Model::from_index(1), Some(Model::Mistral7BInstructV02));
        assert_eq!(Model::from_index(2), Some(Model::Mistral7BInstructV01));
        assert_eq!(Model::from_index(0), None);
        assert_eq!(Model::from_index(3), None);
    }
}

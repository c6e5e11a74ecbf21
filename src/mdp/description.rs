//! JSON problem descriptions.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use super::model::{Mdp, MdpBuilder};
use crate::{
    Error, Result,
    identifiers::{ActionId, StateId},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDescription {
    pub to: StateId,
    pub reward: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescription {
    pub id: ActionId,
    pub from: StateId,
    pub transitions: Vec<TransitionDescription>,
}

/// Serialized form of a decision problem.
///
/// ```json
/// {
///   "states": [0, 1, 2],
///   "actions": [
///     { "id": 0, "from": 0, "transitions": [{ "to": 1, "reward": 0.5 }] },
///     { "id": 1, "from": 1, "transitions": [{ "to": 2, "reward": 1.0 }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdpDescription {
    pub states: Vec<StateId>,
    #[serde(default)]
    pub actions: Vec<ActionDescription>,
}

impl MdpDescription {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::io(format!("open problem file {}", path.display()), e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn into_mdp(self) -> Result<Mdp> {
        let mut builder = MdpBuilder::new();
        for state in self.states {
            builder = builder.state(state);
        }
        for action in &self.actions {
            builder = builder.action(action.id, action.from);
        }
        for action in self.actions {
            for transition in action.transitions {
                builder = builder.transition(action.id, transition.to, transition.reward);
            }
        }
        builder.build()
    }
}

impl Mdp {
    /// Load and validate a problem from a JSON description file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        MdpDescription::load_from_file(path)?.into_mdp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_builds_model() {
        let json = r#"{
            "states": [0, 1, 2],
            "actions": [
                { "id": 0, "from": 0, "transitions": [{ "to": 1, "reward": 0.5 }] },
                { "id": 1, "from": 1, "transitions": [{ "to": 2, "reward": 1.0 }] }
            ]
        }"#;
        let description: MdpDescription = serde_json::from_str(json).unwrap();
        let mdp = description.into_mdp().unwrap();
        assert_eq!(mdp.state_count(), 3);
        assert_eq!(mdp.action_count(), 2);
        let action = mdp.action(ActionId::new(1)).unwrap();
        assert_eq!(action.outcome().reward(), 1.0);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Mdp::load("/nonexistent/problem.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/problem.json"));
    }
}

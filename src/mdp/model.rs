//! States, actions and transitions of a decision problem.

use std::collections::HashMap;

use crate::{
    Error, Result,
    identifiers::{ActionId, StateId},
};

/// Outcome of an action: the state it leads to and the reward collected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    to: StateId,
    reward: f64,
}

impl Transition {
    pub fn new(to: StateId, reward: f64) -> Self {
        Self { to, reward }
    }

    /// Target state of the transition.
    pub fn to(&self) -> StateId {
        self.to
    }

    /// Scalar reward observed when the transition is taken.
    pub fn reward(&self) -> f64 {
        self.reward
    }
}

/// An action available from exactly one state.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    id: ActionId,
    from: StateId,
    transitions: Vec<Transition>,
}

impl Action {
    pub fn id(&self) -> ActionId {
        self.id
    }

    /// State this action originates from.
    pub fn from(&self) -> StateId {
        self.from
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Deterministic outcome used by the engine.
    ///
    /// Only the first transition is ever followed; further transitions of a
    /// stochastic action are kept in the model but never sampled.
    pub fn outcome(&self) -> Transition {
        // The builder refuses actions without transitions.
        self.transitions[0]
    }
}

/// A state and the ordered list of actions available from it.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    id: StateId,
    actions: Vec<ActionId>,
}

impl State {
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Actions available from this state, in declaration order.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    /// Whether the agent can act from this state.
    pub fn is_dead_end(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Immutable decision problem.
#[derive(Debug, Clone)]
pub struct Mdp {
    states: Vec<State>,
    actions: Vec<Action>,
    state_index: HashMap<StateId, usize>,
    action_index: HashMap<ActionId, usize>,
}

impl Mdp {
    /// All states, in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// All actions, in declaration order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn state(&self, id: StateId) -> Option<&State> {
        self.state_index.get(&id).map(|&index| &self.states[index])
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.action_index.get(&id).map(|&index| &self.actions[index])
    }

    /// State at a position of the ordered state list.
    pub fn state_at(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    /// Action objects available from `state`, in declaration order.
    pub fn actions_of<'a>(&'a self, state: &'a State) -> impl Iterator<Item = &'a Action> + 'a {
        state.actions.iter().filter_map(|&id| self.action(id))
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }
}

/// Builder that validates references while assembling an [`Mdp`].
///
/// # Examples
///
/// ```
/// use marl::mdp::MdpBuilder;
///
/// let mdp = MdpBuilder::new()
///     .state(0)
///     .state(1)
///     .action(0, 0)
///     .transition(0, 1, 1.0)
///     .build()?;
/// assert_eq!(mdp.state_count(), 2);
/// # Ok::<(), marl::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MdpBuilder {
    states: Vec<StateId>,
    actions: Vec<(ActionId, StateId)>,
    transitions: Vec<(ActionId, Transition)>,
}

impl MdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state.
    pub fn state(mut self, id: impl Into<StateId>) -> Self {
        self.states.push(id.into());
        self
    }

    /// Declare an action available from state `from`.
    pub fn action(mut self, id: impl Into<ActionId>, from: impl Into<StateId>) -> Self {
        self.actions.push((id.into(), from.into()));
        self
    }

    /// Append a transition to a previously declared action.
    pub fn transition(
        mut self,
        action: impl Into<ActionId>,
        to: impl Into<StateId>,
        reward: f64,
    ) -> Self {
        self.transitions
            .push((action.into(), Transition::new(to.into(), reward)));
        self
    }

    pub fn build(self) -> Result<Mdp> {
        let mut states = Vec::with_capacity(self.states.len());
        let mut state_index = HashMap::with_capacity(self.states.len());
        for id in self.states {
            if state_index.insert(id, states.len()).is_some() {
                return Err(Error::DuplicateState { state: id });
            }
            states.push(State {
                id,
                actions: Vec::new(),
            });
        }

        let mut actions: Vec<Action> = Vec::with_capacity(self.actions.len());
        let mut action_index = HashMap::with_capacity(self.actions.len());
        for (id, from) in self.actions {
            let Some(&origin) = state_index.get(&from) else {
                return Err(Error::UnknownState { state: from });
            };
            if action_index.insert(id, actions.len()).is_some() {
                return Err(Error::DuplicateAction { action: id });
            }
            states[origin].actions.push(id);
            actions.push(Action {
                id,
                from,
                transitions: Vec::new(),
            });
        }

        for (action, transition) in self.transitions {
            let Some(&index) = action_index.get(&action) else {
                return Err(Error::UnknownAction { action });
            };
            if !state_index.contains_key(&transition.to) {
                return Err(Error::UnknownState {
                    state: transition.to,
                });
            }
            actions[index].transitions.push(transition);
        }

        if let Some(action) = actions.iter().find(|a| a.transitions.is_empty()) {
            return Err(Error::ActionWithoutTransitions { action: action.id });
        }

        Ok(Mdp {
            states,
            actions,
            state_index,
            action_index,
        })
    }
}

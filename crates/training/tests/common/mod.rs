#![allow(dead_code)]

use std::cell::Cell;

use rl::{Agent, AgentError, Env, EnvError, Step, Terminal};

/// Environment whose episodes last exactly `length` steps and end with
/// `ending`. Every step pays 1.0.
///
/// The state is `[position, steps]`: `position` starts at the reset count
/// and moves by the action, `steps` counts executes since construction.
pub struct ScriptedEnv {
    length: usize,
    ending: Terminal,
    since_reset: usize,
    position: f32,
    pub resets: usize,
    pub executes: usize,
}

impl ScriptedEnv {
    pub fn new(length: usize, ending: Terminal) -> Self {
        Self {
            length,
            ending,
            since_reset: 0,
            position: 0.0,
            resets: 0,
            executes: 0,
        }
    }

    /// Ends every episode with a failure on its first step.
    pub fn failing() -> Self {
        Self::new(1, Terminal::Failure)
    }
}

impl Env for ScriptedEnv {
    type Action = i64;

    fn reset(&mut self) -> Result<Vec<f32>, EnvError> {
        self.resets += 1;
        self.since_reset = 0;
        self.position = self.resets as f32;
        Ok(vec![self.position, self.executes as f32])
    }

    fn execute(&mut self, action: &i64) -> Result<Step, EnvError> {
        if *action < 0 {
            return Err(EnvError::InvalidAction(*action));
        }
        self.executes += 1;
        self.since_reset += 1;
        self.position += *action as f32;
        let terminal = if self.since_reset >= self.length {
            self.ending
        } else {
            Terminal::Ongoing
        };
        Ok(Step {
            next_state: vec![self.position, self.executes as f32],
            terminal,
            reward: 1.0,
        })
    }

    fn state_dim(&self) -> usize {
        2
    }
}

/// Agent that always pushes by one and counts how it was called.
#[derive(Default)]
pub struct CountingAgent {
    pub acts: usize,
    pub observes: usize,
    pub independent: Cell<usize>,
    pub seen: Vec<Vec<f32>>,
    pub terminals: Vec<Terminal>,
    /// Fail the observe call with this (1-based) number.
    pub fail_on_observe: Option<usize>,
}

impl Agent for CountingAgent {
    type Action = i64;
    type Internals = ();

    fn act(&mut self, states: &[f32]) -> Result<i64, AgentError> {
        rl::agent::validate_states(states, 2)?;
        self.acts += 1;
        self.seen.push(states.to_vec());
        Ok(1)
    }

    fn act_independent(
        &self,
        states: &[f32],
        internals: (),
        _deterministic: bool,
    ) -> Result<(i64, ()), AgentError> {
        rl::agent::validate_states(states, 2)?;
        self.independent.set(self.independent.get() + 1);
        Ok((0, internals))
    }

    fn observe(&mut self, _reward: f32, terminal: Terminal) -> Result<(), AgentError> {
        self.observes += 1;
        if self.fail_on_observe == Some(self.observes) {
            return Err(AgentError::ObserveWithoutAct);
        }
        self.terminals.push(terminal);
        Ok(())
    }

    fn initial_internals(&self) -> Self::Internals {}
}

use std::collections::VecDeque;

use rl::Agent;
use runtime::{Document, Event, RecordSink, SinkError};

use crate::{
    policy_step, EpisodeState, EpisodeSummary, Observation, ObservationKeys, TerminalPolicy,
    TrainingError,
};

/// Record subscriber that turns each recorded step into the next action.
///
/// The callback owns the action queue the driver loop pulls from. Only
/// events are acted on; other documents pass through untouched.
pub struct PolicyCallback<'a, A: Agent> {
    agent: &'a mut A,
    keys: ObservationKeys,
    episode_count: usize,
    terminal_policy: TerminalPolicy,
    episode: EpisodeState,
    queue: VecDeque<A::Action>,
    completed: Vec<EpisodeSummary>,
}

impl<'a, A: Agent> PolicyCallback<'a, A> {
    pub fn new(
        agent: &'a mut A,
        keys: ObservationKeys,
        episode_count: usize,
        terminal_policy: TerminalPolicy,
    ) -> Self {
        Self {
            agent,
            keys,
            episode_count,
            terminal_policy,
            episode: EpisodeState::default(),
            queue: VecDeque::new(),
            completed: Vec::new(),
        }
    }

    #[must_use]
    pub fn agent(&self) -> &A {
        &*self.agent
    }

    pub fn agent_mut(&mut self) -> &mut A {
        &mut *self.agent
    }

    #[must_use]
    pub fn episode(&self) -> EpisodeState {
        self.episode
    }

    #[must_use]
    pub fn completed(&self) -> &[EpisodeSummary] {
        &self.completed
    }

    pub fn enqueue(&mut self, action: A::Action) {
        self.queue.push_back(action);
    }

    /// Take the most recently queued action.
    pub fn pop(&mut self) -> Option<A::Action> {
        self.queue.pop_back()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Hand one recorded step to the agent.
    ///
    /// # Errors
    ///
    /// Malformed events and agent failures are returned unchanged.
    pub fn on_record(&mut self, event: &Event) -> Result<(), TrainingError> {
        let observation = Observation::from_event(event, &self.keys)?;
        let outcome = policy_step(
            &mut *self.agent,
            self.episode,
            &observation,
            self.episode_count,
            self.terminal_policy,
        )?;
        self.episode = outcome.episode;
        self.completed.extend(outcome.completed);
        if let Some(action) = outcome.action {
            self.enqueue(action);
        }
        Ok(())
    }

    #[must_use]
    pub fn into_completed(self) -> Vec<EpisodeSummary> {
        self.completed
    }
}

impl<A: Agent> RecordSink for PolicyCallback<'_, A> {
    fn on_document(&mut self, doc: &Document) -> Result<(), SinkError> {
        match doc {
            Document::Event(event) => self.on_record(event).map_err(SinkError::new),
            _ => Ok(()),
        }
    }
}

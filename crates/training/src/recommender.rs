//! The training loop restated as a tell/ask mailbox.
//!
//! A [`Recommender`] is told the outcome of each step and asked for the next
//! action, instead of being pushed records. It shares [`policy_step`] with
//! [`PolicyCallback`](crate::PolicyCallback), so both drive identical episodes.

use rl::{Agent, Env};
use runtime::{emit, Device, RecordSink, RunBundler, Value};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::driver::{within_run, STREAM_NAME};
use crate::{
    policy_step, EnvDevice, EpisodeState, EpisodeSummary, Observation, ObservationKeys,
    ProtocolError, TerminalPolicy, TrainingError, TrainingReport, PLAN_NAME,
};

pub struct Recommender<'a, A: Agent> {
    agent: &'a mut A,
    keys: ObservationKeys,
    episode_count: usize,
    terminal_policy: TerminalPolicy,
    episode: EpisodeState,
    pending: Option<A::Action>,
    completed: Vec<EpisodeSummary>,
}

impl<'a, A: Agent> Recommender<'a, A> {
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
            pending: None,
            completed: Vec::new(),
        }
    }

    #[must_use]
    pub fn episode(&self) -> EpisodeState {
        self.episode
    }

    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.episode_count
    }

    #[must_use]
    pub fn completed(&self) -> &[EpisodeSummary] {
        &self.completed
    }

    /// Ask the agent for the first action of a run.
    ///
    /// # Errors
    ///
    /// Agent errors are returned unchanged.
    pub fn begin(&mut self, reset_state: &[f32]) -> Result<A::Action, TrainingError> {
        Ok(self.agent.act(reset_state)?)
    }

    /// Report one step. `independent` holds the applied action and is not
    /// inspected; `dependent` holds `[next_state, reward, terminal,
    /// state_after_reset]`.
    ///
    /// # Errors
    ///
    /// Malformed values are a [`ProtocolError`]; agent errors pass through.
    pub fn tell(&mut self, independent: &[Value], dependent: &[Value]) -> Result<(), TrainingError> {
        debug!(actions = independent.len(), "tell");
        let observation = Observation::from_values(dependent, &self.keys)?;
        let outcome = policy_step(
            &mut *self.agent,
            self.episode,
            &observation,
            self.episode_count,
            self.terminal_policy,
        )?;
        self.episode = outcome.episode;
        self.completed.extend(outcome.completed);
        self.pending = outcome.action;
        Ok(())
    }

    /// Report a batch of steps. Only batches of at most one step are
    /// supported.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::BatchedTell`] for more than one pair.
    pub fn tell_many(
        &mut self,
        independent: &[Vec<Value>],
        dependent: &[Vec<Value>],
    ) -> Result<(), TrainingError> {
        let len = independent.len().max(dependent.len());
        if len > 1 {
            return Err(ProtocolError::BatchedTell(len).into());
        }
        match (independent.first(), dependent.first()) {
            (Some(independent), Some(dependent)) => self.tell(independent, dependent),
            (None, None) => Ok(()),
            (Some(_), None) => Err(ProtocolError::MissingField("dependent".to_string()).into()),
            (None, Some(_)) => Err(ProtocolError::MissingField("independent".to_string()).into()),
        }
    }

    /// Take up to `n` pending actions; never more than one is pending.
    pub fn ask(&mut self, n: usize) -> Vec<A::Action> {
        if n == 0 {
            return Vec::new();
        }
        self.pending.take().into_iter().collect()
    }
}

/// Run the training loop through `recommender`.
///
/// Behaves like [`train_agent`](crate::train_agent) without evaluation: the
/// first action comes from the post-reset state, then each step is recorded
/// and emitted to `sinks` and told to the recommender, which is asked for the
/// next action until it has none.
///
/// # Errors
///
/// Any error ends the run after a `fail` run stop has been emitted.
pub fn adaptive_plan<E, A>(
    device: &mut EnvDevice<E>,
    recommender: &mut Recommender<'_, A>,
    sinks: &mut [&mut dyn RecordSink],
) -> Result<TrainingReport, TrainingError>
where
    E: Env,
    E::Action: Serialize,
    A: Agent<Action = E::Action>,
{
    let metadata = json!({
        "plan_name": PLAN_NAME,
        "episode_count": recommender.episode_count(),
        "terminal_policy": recommender.terminal_policy.to_string(),
        "mode": "recommender",
    });
    let mut bundler = RunBundler::new();

    within_run(&mut bundler, sinks, metadata, |bundler, sinks| {
        let run_uid = bundler.run_uid().unwrap_or_default().to_string();

        device.stage()?;
        let steps = ask_tell_steps(device, recommender, bundler, sinks);
        let unstaged = device.unstage();
        let event_uids = steps?;
        unstaged?;

        Ok(TrainingReport {
            run_uid,
            event_uids,
            episodes: recommender.completed().to_vec(),
            evaluations: Vec::new(),
            final_episode: recommender.episode(),
        })
    })
}

fn ask_tell_steps<E, A>(
    device: &mut EnvDevice<E>,
    recommender: &mut Recommender<'_, A>,
    bundler: &mut RunBundler,
    sinks: &mut [&mut dyn RecordSink],
) -> Result<Vec<String>, TrainingError>
where
    E: Env,
    E::Action: Serialize,
    A: Agent<Action = E::Action>,
{
    let reset_state = device
        .state_after_reset()
        .ok_or(ProtocolError::MissingResetState)?
        .to_vec();

    let mut next = Some(recommender.begin(&reset_state)?);
    let mut event_uids = Vec::new();
    let mut described = false;

    while let Some(action) = next.take() {
        device.set_action(action);
        device.trigger()?;
        let readings = device.read();

        if !described {
            let descriptor = bundler.describe(STREAM_NAME, device.describe())?;
            emit(&descriptor, sinks)?;
            described = true;
        }
        let doc = bundler.event(readings)?;
        emit(&doc, sinks)?;

        let Some(event) = doc.as_event() else {
            continue;
        };
        event_uids.push(event.uid.clone());

        let keys = device.keys();
        let independent = vec![event
            .data
            .get(&keys.action)
            .cloned()
            .ok_or_else(|| ProtocolError::MissingField(keys.action.clone()))?];
        let dependent = keys
            .dependent()
            .into_iter()
            .map(|key| {
                event
                    .data
                    .get(key)
                    .cloned()
                    .ok_or_else(|| ProtocolError::MissingField(key.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        recommender.tell_many(&[independent], &[dependent])?;
        next = recommender.ask(1).pop();
    }
    Ok(event_uids)
}

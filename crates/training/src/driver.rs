//! The queue-driven training loop.

use rl::{Agent, ConfigError, Env};
use runtime::{emit, Device, Document, ExitStatus, RecordSink, RunBundler, SinkError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use tracing::{info, warn};

use crate::{
    EnvDevice, EpisodeState, EpisodeSummary, EvaluationConfig, EvaluationResult,
    EvaluationRunner, PolicyCallback, ProtocolError, TerminalPolicy, TrainingError,
};

pub const PLAN_NAME: &str = "rl_training_plan";
pub(crate) const STREAM_NAME: &str = "primary";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episodes to train before the loop drains
    pub episode_count: usize,
    pub terminal_policy: TerminalPolicy,
    pub evaluation: EvaluationConfig,
    /// Extra run-start metadata; objects are merged, other values go under `user`
    pub metadata: serde_json::Value,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episode_count: 100,
            terminal_policy: TerminalPolicy::default(),
            evaluation: EvaluationConfig::default(),
            metadata: json!({}),
        }
    }
}

impl TrainingConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty episode budget or an
    /// evaluation cadence that can never produce a result.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episode_count == 0 {
            return Err(ConfigError::Invalid {
                field: "training.episode_count",
                reason: "must be at least 1".to_string(),
            });
        }
        self.evaluation.validate()
    }

    fn run_metadata(&self, evaluating: bool) -> serde_json::Value {
        let mut metadata = match &self.metadata {
            serde_json::Value::Object(map) => map.clone(),
            serde_json::Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("user".to_string(), other.clone());
                map
            }
        };
        metadata.insert("plan_name".to_string(), json!(PLAN_NAME));
        metadata.insert("episode_count".to_string(), json!(self.episode_count));
        metadata.insert(
            "terminal_policy".to_string(),
            json!(self.terminal_policy.to_string()),
        );
        let evaluation = if evaluating {
            json!(self.evaluation)
        } else {
            serde_json::Value::Null
        };
        metadata.insert("evaluation".to_string(), evaluation);
        serde_json::Value::Object(metadata)
    }
}

/// What a completed training run produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingReport {
    pub run_uid: String,
    pub event_uids: Vec<String>,
    pub episodes: Vec<EpisodeSummary>,
    pub evaluations: Vec<EvaluationResult>,
    pub final_episode: EpisodeState,
}

/// Open a run, execute `body` inside it, and close the run.
///
/// The run stop records `fail` with the error message when `body` fails; the
/// body's error is returned even if emitting the stop fails too.
pub(crate) fn within_run<T>(
    bundler: &mut RunBundler,
    sinks: &mut [&mut dyn RecordSink],
    metadata: serde_json::Value,
    body: impl FnOnce(&mut RunBundler, &mut [&mut dyn RecordSink]) -> Result<T, TrainingError>,
) -> Result<T, TrainingError> {
    let start = bundler.open_run(metadata)?;
    emit(&start, sinks)?;

    let result = body(bundler, &mut *sinks);

    let (exit_status, reason) = match &result {
        Ok(_) => (ExitStatus::Success, String::new()),
        Err(err) => (ExitStatus::Fail, err.to_string()),
    };
    let stop = bundler.close_run(exit_status, reason)?;
    let emitted = emit(&stop, sinks);
    match (result, emitted) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), emitted) => {
            if let Err(stop_err) = emitted {
                warn!(%stop_err, "failed to emit run stop after error");
            }
            Err(err)
        }
    }
}

/// Train `agent` on the environment behind `device` for
/// `config.episode_count` episodes, recording every step.
///
/// Each event is emitted to `sinks` in order and then to the policy
/// callback, which queues the next action. When `evaluator` is given, it runs
/// before the first step of every episode its cadence selects and the average
/// reward is attached to that step's event. The evaluator must carry the same
/// settings as `config.evaluation`.
///
/// # Errors
///
/// Any error ends the run: invalid configuration before anything is
/// emitted, otherwise after the device is unstaged and a `fail` run stop
/// has been emitted.
pub fn train_agent<E, A>(
    device: &mut EnvDevice<E>,
    agent: &mut A,
    evaluator: Option<&mut EvaluationRunner<E>>,
    config: &TrainingConfig,
    sinks: &mut [&mut dyn RecordSink],
) -> Result<TrainingReport, TrainingError>
where
    E: Env,
    E::Action: Serialize,
    A: Agent<Action = E::Action>,
{
    config.validate()?;
    if let Some(runner) = evaluator.as_deref() {
        if runner.config() != &config.evaluation {
            return Err(ConfigError::Invalid {
                field: "training.evaluation",
                reason: format!(
                    "evaluation runner uses {:?} but the run is configured with {:?}",
                    runner.config(),
                    config.evaluation
                ),
            }
            .into());
        }
    }
    let metadata = config.run_metadata(evaluator.is_some());
    let mut bundler = RunBundler::new();

    within_run(&mut bundler, sinks, metadata, |bundler, sinks| {
        let run_uid = bundler.run_uid().unwrap_or_default().to_string();

        device.stage()?;
        let steps = run_steps(device, agent, evaluator, config, bundler, sinks);
        let unstaged = device.unstage();
        let steps = steps?;
        unstaged?;

        info!(
            steps = steps.event_uids.len(),
            episodes = steps.episodes.len(),
            evaluations = steps.evaluations.len(),
            "training finished"
        );
        Ok(TrainingReport {
            run_uid,
            event_uids: steps.event_uids,
            episodes: steps.episodes,
            evaluations: steps.evaluations,
            final_episode: steps.final_episode,
        })
    })
}

/// What the step loop of a staged device produced.
struct Steps {
    event_uids: Vec<String>,
    episodes: Vec<EpisodeSummary>,
    evaluations: Vec<EvaluationResult>,
    final_episode: EpisodeState,
}

fn run_steps<E, A>(
    device: &mut EnvDevice<E>,
    agent: &mut A,
    mut evaluator: Option<&mut EvaluationRunner<E>>,
    config: &TrainingConfig,
    bundler: &mut RunBundler,
    sinks: &mut [&mut dyn RecordSink],
) -> Result<Steps, TrainingError>
where
    E: Env,
    E::Action: Serialize,
    A: Agent<Action = E::Action>,
{
    let reset_state = device
        .state_after_reset()
        .ok_or(ProtocolError::MissingResetState)?
        .to_vec();
    let first = agent.act(&reset_state)?;

    let mut callback = PolicyCallback::new(
        agent,
        device.keys().clone(),
        config.episode_count,
        config.terminal_policy,
    );
    callback.enqueue(first);

    let mut event_uids = Vec::new();
    let mut evaluations = Vec::new();
    let mut described = false;

    while let Some(action) = callback.pop() {
        let episode = callback.episode();
        if let Some(runner) = evaluator.as_deref_mut() {
            if runner.is_due(&episode) {
                let average_reward = runner.run(callback.agent())?;
                evaluations.push(EvaluationResult {
                    episode_index: episode.episode_index,
                    average_reward,
                });
                device.set_evaluation_metric(average_reward);
            }
        }

        device.set_action(action);
        device.trigger()?;
        let readings = device.read();
        device.clear_evaluation_metric();

        if !described {
            let descriptor = bundler.describe(STREAM_NAME, device.describe())?;
            emit(&descriptor, sinks)?;
            described = true;
        }
        let doc = bundler.event(readings)?;
        if let Some(event) = doc.as_event() {
            event_uids.push(event.uid.clone());
        }
        emit_event(&doc, sinks, &mut callback)?;
    }

    Ok(Steps {
        event_uids,
        final_episode: callback.episode(),
        episodes: callback.into_completed(),
        evaluations,
    })
}

/// Emit `doc` to every sink and then to the policy callback.
fn emit_event(
    doc: &Document,
    sinks: &mut [&mut dyn RecordSink],
    callback: &mut dyn RecordSink,
) -> Result<(), SinkError> {
    emit(doc, sinks)?;
    emit(doc, &mut [callback])
}

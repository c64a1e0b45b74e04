use rl::Agent;
use tracing::info;

use crate::{EpisodeState, EpisodeSummary, Observation, TerminalPolicy, TrainingError};

/// Result of handing one observation to the agent.
#[derive(Debug)]
pub struct PolicyOutcome<Action> {
    pub episode: EpisodeState,
    pub completed: Option<EpisodeSummary>,
    /// Next action to execute; `None` once the episode budget is spent.
    pub action: Option<Action>,
}

/// Feed one observation to the agent and ask it for the next action.
///
/// Nothing happens once `episode` is past `episode_count`. Otherwise the
/// agent observes the reward, the episode state advances, and, unless that
/// step spent the budget, the agent acts on the post-reset state (after a
/// terminal step) or on the new state.
///
/// # Errors
///
/// Agent errors are returned unchanged; a terminal observation without a
/// reset state is a protocol error.
pub fn policy_step<A: Agent>(
    agent: &mut A,
    episode: EpisodeState,
    observation: &Observation,
    episode_count: usize,
    terminal_policy: TerminalPolicy,
) -> Result<PolicyOutcome<A::Action>, TrainingError> {
    if episode.exhausted(episode_count) {
        return Ok(PolicyOutcome {
            episode,
            completed: None,
            action: None,
        });
    }

    agent.observe(observation.reward, observation.terminal)?;
    let (episode, completed) =
        episode.observe(observation.reward, observation.terminal, terminal_policy);
    if let Some(summary) = &completed {
        info!(
            episode = summary.episode_index,
            steps = summary.steps,
            total_reward = summary.total_reward,
            terminal = summary.terminal.code(),
            "end of episode"
        );
    }

    if episode.exhausted(episode_count) {
        return Ok(PolicyOutcome {
            episode,
            completed,
            action: None,
        });
    }

    let action = agent.act(observation.next_states()?)?;
    Ok(PolicyOutcome {
        episode,
        completed,
        action: Some(action),
    })
}

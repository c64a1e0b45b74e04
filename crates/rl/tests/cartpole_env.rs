use rl::{CartPoleAction, CartPoleEnv, CartPoleEnvConfig, Env, EnvError, Terminal};

fn env_with_horizon(max_episode_timesteps: usize) -> CartPoleEnv {
    CartPoleEnv::new(
        CartPoleEnvConfig {
            max_episode_timesteps,
            ..Default::default()
        },
        42,
    )
    .unwrap()
}

#[test]
fn execute_before_reset_is_rejected() {
    let mut env = env_with_horizon(10);
    assert_eq!(env.execute(&CartPoleAction::PushLeft), Err(EnvError::NotReset));
}

#[test]
fn alternating_pushes_reach_the_horizon() {
    let mut env = env_with_horizon(5);
    env.reset().unwrap();
    let mut last = Terminal::Ongoing;
    for i in 0..5 {
        let action = if i % 2 == 0 {
            CartPoleAction::PushLeft
        } else {
            CartPoleAction::PushRight
        };
        let step = env.execute(&action).unwrap();
        assert_eq!(step.reward, 1.0);
        assert_eq!(step.next_state.len(), env.state_dim());
        last = step.terminal;
    }
    assert_eq!(last, Terminal::Horizon);
    assert_eq!(
        env.execute(&CartPoleAction::PushLeft),
        Err(EnvError::EpisodeOver)
    );
}

#[test]
fn constant_push_topples_the_pole() {
    let mut env = env_with_horizon(500);
    env.reset().unwrap();
    let mut steps = 0;
    loop {
        let step = env.execute(&CartPoleAction::PushRight).unwrap();
        steps += 1;
        if step.terminal.is_terminal() {
            assert_eq!(step.terminal, Terminal::Failure);
            break;
        }
        assert!(steps < 500, "pole should fall long before the horizon");
    }
}

#[test]
fn reset_starts_a_new_episode() {
    let mut env = env_with_horizon(1);
    env.reset().unwrap();
    let step = env.execute(&CartPoleAction::PushLeft).unwrap();
    assert_eq!(step.terminal, Terminal::Horizon);
    env.reset().unwrap();
    assert_eq!(env.timestep(), 0);
    assert!(env.execute(&CartPoleAction::PushLeft).is_ok());
}

#[test]
fn codes_serialize_as_integers() {
    assert_eq!(serde_json::to_string(&Terminal::Horizon).unwrap(), "2");
    assert_eq!(serde_json::to_string(&CartPoleAction::PushRight).unwrap(), "1");
    let terminal: Terminal = serde_json::from_str("1").unwrap();
    assert_eq!(terminal, Terminal::Failure);
    assert!(serde_json::from_str::<Terminal>("3").is_err());
}

#[test]
fn environment_config_reads_flattened_physics() {
    let config: CartPoleEnvConfig =
        serde_json::from_str(r#"{"tau": 0.01, "max_episode_timesteps": 200}"#).unwrap();
    assert_eq!(config.max_episode_timesteps, 200);
    assert!((config.physics.tau - 0.01).abs() < 1e-9);
    assert!((config.physics.gravity - 9.8).abs() < 1e-6);
}

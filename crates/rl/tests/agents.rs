use rl::{
    build_agent, A2cAgent, Agent, AgentConfig, AgentError, AgentKind, ConfigError, RandomAgent,
    ReinforceAgent, Terminal,
};

const STATE: [f32; 4] = [0.01, 0.0, -0.02, 0.0];

fn assert_rejects_invalid_states<A: Agent>(agent: &mut A) {
    let sentinel = [f32::NAN; 4];
    assert!(matches!(agent.act(&sentinel), Err(AgentError::NonFiniteState(0))));
    assert!(matches!(
        agent.act(&[0.0, f32::INFINITY, 0.0, 0.0]),
        Err(AgentError::NonFiniteState(1))
    ));
    assert!(matches!(
        agent.act(&[0.0; 5]),
        Err(AgentError::StateDim {
            expected: 4,
            got: 5
        })
    ));
    let internals = agent.initial_internals();
    assert!(matches!(
        agent.act_independent(&sentinel, internals, true),
        Err(AgentError::NonFiniteState(0))
    ));
    let internals = agent.initial_internals();
    assert!(matches!(
        agent.act_independent(&[0.0; 3], internals, false),
        Err(AgentError::StateDim {
            expected: 4,
            got: 3
        })
    ));
}

#[test]
fn unknown_agent_name_is_a_config_error() {
    let err = "dqn".parse::<AgentKind>().unwrap_err();
    assert_eq!(err, ConfigError::UnknownAgent("dqn".to_string()));
    assert!(err.to_string().contains("'dqn' is not recognized"));
}

#[test]
fn agent_kinds_round_trip_through_names() {
    for kind in [AgentKind::Random, AgentKind::Reinforce, AgentKind::A2c] {
        assert_eq!(kind.name().parse::<AgentKind>().unwrap(), kind);
    }
}

#[test]
fn config_file_rejects_unknown_agent() {
    let result = serde_json::from_str::<AgentConfig>(r#"{"kind": "ppo2"}"#);
    assert!(result.is_err());
}

#[test]
fn nan_sentinel_is_never_accepted_as_state() {
    for kind in [AgentKind::Random, AgentKind::Reinforce, AgentKind::A2c] {
        let config = AgentConfig {
            kind,
            ..Default::default()
        };
        let mut agent = build_agent(&config, 4, 1).unwrap();
        let sentinel = [f32::NAN; 4];
        assert_eq!(agent.act(&sentinel), Err(AgentError::NonFiniteState(0)));
        assert_eq!(
            agent.act(&[0.0; 3]),
            Err(AgentError::StateDim {
                expected: 4,
                got: 3
            })
        );
    }
}

#[test]
fn every_agent_rejects_invalid_states() {
    assert_rejects_invalid_states(&mut RandomAgent::new(4, 1));
    assert_rejects_invalid_states(&mut ReinforceAgent::new(4, 0.01, 0.99, 1));
    assert_rejects_invalid_states(&mut A2cAgent::new(4, 0.01, 0.99, 5, 1));
}

#[test]
fn learning_agents_require_act_before_observe() {
    let mut agent = ReinforceAgent::new(4, 0.01, 0.99, 0);
    assert_eq!(
        agent.observe(1.0, Terminal::Ongoing),
        Err(AgentError::ObserveWithoutAct)
    );

    let mut agent = A2cAgent::new(4, 0.01, 0.99, 5, 0);
    assert_eq!(
        agent.observe(1.0, Terminal::Ongoing),
        Err(AgentError::ObserveWithoutAct)
    );
    // Each act licenses exactly one observe.
    agent.act(&STATE).unwrap();
    agent.observe(1.0, Terminal::Ongoing).unwrap();
    assert_eq!(
        agent.observe(1.0, Terminal::Ongoing),
        Err(AgentError::ObserveWithoutAct)
    );
}

#[test]
fn random_agent_observes_without_acting() {
    let mut agent = RandomAgent::new(4, 0);
    assert_eq!(agent.observe(1.0, Terminal::Failure), Ok(()));
}

#[test]
fn a2c_updates_every_horizon_and_at_episode_end() {
    let mut agent = A2cAgent::new(4, 0.01, 0.99, 3, 7);
    for _ in 0..3 {
        agent.act(&STATE).unwrap();
        agent.observe(1.0, Terminal::Ongoing).unwrap();
    }
    assert_eq!(agent.updates(), 0);

    // The fourth act finds a full horizon and bootstraps from its state.
    agent.act(&STATE).unwrap();
    assert_eq!(agent.updates(), 1);
    agent.observe(1.0, Terminal::Ongoing).unwrap();
    assert_eq!(agent.updates(), 1);

    agent.act(&STATE).unwrap();
    agent.observe(1.0, Terminal::Failure).unwrap();
    assert_eq!(agent.updates(), 2);

    // A fresh episode starts with an empty buffer.
    agent.act(&STATE).unwrap();
    agent.observe(1.0, Terminal::Horizon).unwrap();
    assert_eq!(agent.updates(), 3);
}

#[test]
fn reinforce_updates_once_per_episode() {
    let mut agent = ReinforceAgent::new(4, 0.01, 0.99, 0);
    for step in 0..3 {
        agent.act(&[0.01, 0.0, -0.02, 0.0]).unwrap();
        let terminal = if step == 2 {
            Terminal::Failure
        } else {
            Terminal::Ongoing
        };
        agent.observe(1.0, terminal).unwrap();
    }
    assert_eq!(agent.updates(), 1);

    for step in 0..4 {
        agent.act(&STATE).unwrap();
        assert_eq!(agent.updates(), 1);
        let terminal = if step == 3 {
            Terminal::Horizon
        } else {
            Terminal::Ongoing
        };
        agent.observe(1.0, terminal).unwrap();
    }
    assert_eq!(agent.updates(), 2);
}

#[test]
fn deterministic_independent_actions_are_repeatable() {
    let config = AgentConfig {
        kind: AgentKind::A2c,
        ..Default::default()
    };
    let agent = build_agent(&config, 4, 9).unwrap();
    let states = [0.03, -0.01, 0.02, 0.04];
    let internals = agent.initial_internals();
    let (first, internals) = agent.act_independent(&states, internals, true).unwrap();
    let (second, _) = agent.act_independent(&states, internals, true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn independent_actions_leave_the_policy_unchanged() {
    let states: Vec<[f32; 4]> = (0..50)
        .map(|i| {
            let t = i as f32 / 10.0;
            [t.sin() * 0.1, t.cos(), -t.sin() * 0.2, t * 0.01]
        })
        .collect();
    let greedy = |agent: &A2cAgent| -> Vec<_> {
        states
            .iter()
            .map(|s| agent.act_independent(s, (), true).unwrap().0)
            .collect()
    };

    let mut evaluated = A2cAgent::new(4, 0.05, 0.99, 2, 3);
    let mut untouched = A2cAgent::new(4, 0.05, 0.99, 2, 3);
    for step in 0..6 {
        let terminal = if step == 5 {
            Terminal::Failure
        } else {
            Terminal::Ongoing
        };
        evaluated.act(&states[step]).unwrap();
        evaluated.observe(1.0, terminal).unwrap();
        untouched.act(&states[step]).unwrap();
        untouched.observe(1.0, terminal).unwrap();
    }

    let updates = evaluated.updates();
    let before = greedy(&evaluated);
    for s in &states {
        let _ = evaluated.act_independent(s, (), false).unwrap();
    }
    assert_eq!(greedy(&evaluated), before);
    assert_eq!(evaluated.updates(), updates);
    assert_eq!(greedy(&untouched), before);

    // Training continues identically after evaluation.
    for s in &states[..10] {
        assert_eq!(evaluated.act(s).unwrap(), untouched.act(s).unwrap());
        evaluated.observe(1.0, Terminal::Ongoing).unwrap();
        untouched.observe(1.0, Terminal::Ongoing).unwrap();
    }
}

#[test]
fn invalid_hyperparameters_are_rejected() {
    let config = AgentConfig {
        discount: 1.5,
        ..Default::default()
    };
    assert!(matches!(
        build_agent(&config, 4, 0),
        Err(ConfigError::Invalid {
            field: "agent.discount",
            ..
        })
    ));
}

#[test]
fn build_agent_validates_every_setting() {
    let cases = [
        (
            AgentConfig {
                learning_rate: 0.0,
                ..Default::default()
            },
            "agent.learning_rate",
        ),
        (
            AgentConfig {
                learning_rate: f32::NAN,
                ..Default::default()
            },
            "agent.learning_rate",
        ),
        (
            AgentConfig {
                kind: AgentKind::A2c,
                horizon: 0,
                ..Default::default()
            },
            "agent.horizon",
        ),
        (
            AgentConfig {
                discount: -0.1,
                ..Default::default()
            },
            "agent.discount",
        ),
    ];
    for (config, expected) in cases {
        match build_agent(&config, 4, 0) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("{expected} should be rejected"),
        }
    }
}

//! Save/load round-trips: a reloaded agent must be indistinguishable from
//! the original, in both text and binary modes.

use mcaixi_core::agent::{Agent, Hive};
use mcaixi_core::config::Config;
use mcaixi_common::Symbol;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::tempdir;

fn test_config() -> Config {
    Config {
        observation_bits: 2,
        reward_bits: 1,
        num_actions: 3,
        ct_depth: 5,
        horizon: 4,
        bootstrapped_playouts: true,
        ..Config::default()
    }
}

fn trained_agent(seed: u64) -> Agent {
    let config = test_config();
    let mut agent = Agent::new(&config, 0);
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..80 {
        let percept: Vec<Symbol> = (0..3)
            .map(|_| Symbol::from_bit(rng.gen::<f64>() < 0.4))
            .collect();
        agent.model_update_percept(&percept);
        let action = agent.select_random_action(&mut rng);
        agent.model_update_action(action);
    }
    agent
}

fn all_percepts(bits: u32) -> Vec<Vec<Symbol>> {
    (0..1u32 << bits)
        .map(|pattern| {
            (0..bits)
                .map(|i| Symbol::from_bit(pattern & (1 << (bits - i - 1)) != 0))
                .collect()
        })
        .collect()
}

fn assert_indistinguishable(original: &mut Agent, loaded: &mut Agent) {
    assert_eq!(loaded.hash(), original.hash());
    assert_eq!(loaded.age(), original.age());
    assert_eq!(loaded.reward(), original.reward());
    assert_eq!(loaded.history_size(), original.history_size());
    assert_eq!(loaded.horizon(), original.horizon());
    assert_eq!(loaded.num_actions(), original.num_actions());
    assert_eq!(loaded.model_size(), original.model_size());

    for percept in all_percepts(3) {
        let expected = original.percept_probability(&percept);
        let actual = loaded.percept_probability(&percept);
        assert!(
            (expected - actual).abs() < 1e-12,
            "prediction mismatch on {percept:?}: {expected} vs {actual}"
        );
    }

    for action in 0..original.num_actions() {
        assert_eq!(
            loaded.hash_after_action(action),
            original.hash_after_action(action)
        );
        let expected = original.predicted_action_prob(action);
        let actual = loaded.predicted_action_prob(action);
        assert!((expected - actual).abs() < 1e-12);
    }
}

#[test]
fn text_mode_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("agent.json");

    let mut agent = trained_agent(42);
    agent.save(&path, false).expect("save text agent");
    let mut loaded = Agent::load(&path, false).expect("load text agent");

    assert_indistinguishable(&mut agent, &mut loaded);
}

#[test]
fn binary_mode_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("agent.bin");

    let mut agent = trained_agent(43);
    agent.save(&path, true).expect("save binary agent");
    let mut loaded = Agent::load(&path, true).expect("load binary agent");

    assert_indistinguishable(&mut agent, &mut loaded);
}

#[test]
fn reloaded_agent_continues_identically() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("agent.json");

    let mut agent = trained_agent(44);
    agent.save(&path, false).expect("save agent");
    let mut loaded = Agent::load(&path, false).expect("load agent");

    // Identical future traffic must keep the two agents identical.
    let percept = [Symbol::On, Symbol::Off, Symbol::On];
    agent.model_update_percept(&percept);
    loaded.model_update_percept(&percept);
    agent.model_update_action(2);
    loaded.model_update_action(2);

    assert_indistinguishable(&mut agent, &mut loaded);
}

#[test]
fn load_failure_reports_io_error() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("no-such-agent.json");
    assert!(Agent::load(&missing, false).is_err());
}

#[test]
fn hive_from_file_deep_copies() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("agent.json");

    let agent = trained_agent(45);
    agent.save(&path, false).expect("save agent");

    let mut hive = Hive::from_file(3, &path, false).expect("load hive");
    assert_eq!(hive.count(), 3);
    for idx in 0..3 {
        let member = hive.agent(idx).expect("member");
        assert_eq!(member.id(), idx);
        assert_eq!(member.hash(), agent.hash());
        assert_eq!(member.age(), agent.age());
    }

    // Copies are independent: updating the hive does not touch the saved
    // original.
    hive.model_update_percept(&[Symbol::On, Symbol::On, Symbol::On]);
    assert_ne!(hive.primary().hash(), agent.hash());
}

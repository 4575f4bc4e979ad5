//! The agent/environment communication loop and colon commands.
//!
//! Percepts arrive one per line on the input channel; actions leave one per
//! line on the output channel. Lines starting with `:` are commands. All
//! diagnostics go to the log (stderr); the output channel carries only
//! actions, command payloads, and the final session summary.

use crate::agent::Hive;
use crate::config::Config;
use crate::exit_codes::ExitCode;
use crate::search::Search;
use mcaixi_common::{symbols_to_string, Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{BufRead, Write};
use tracing::{error, info};

// name, help text
const COMMANDS: &[(&str, &str)] = &[
    ("help", "show a short usage message"),
    ("quit", "terminates the agent <-> environment loop"),
    ("load", "load [filename] - loads an agent from disk"),
    ("reset", "reset the state of an agent"),
    ("save", "save [filename] - saves agent to disk"),
    ("age", "show the age of the agent in life cycles"),
    ("horizon", "show the search horizon length"),
];

enum CommandOutcome {
    Handled,
    Unknown,
    Quit(i32),
}

/// Execute a colon command against the hive.
fn dispatch_command(
    hive: &mut Hive,
    config: &Config,
    line: &str,
    out: &mut impl Write,
) -> Result<CommandOutcome> {
    info!(command = %line, "received command");

    let mut tokens = line[1..].split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(CommandOutcome::Unknown);
    };
    let arg = tokens.next();

    match name {
        "help" => {
            for (cmd, help) in COMMANDS {
                writeln!(out, "{cmd}\t\t{help}")?;
            }
        }
        "quit" => {
            if let Some(path) = &config.agent_save {
                if let Err(err) = hive.primary().save(path, config.binary_io) {
                    error!(%err, path = %path.display(), "failed to save agent on quit");
                }
                return Ok(CommandOutcome::Quit(ExitCode::SavedOnQuit as i32));
            }
            return Ok(CommandOutcome::Quit(ExitCode::Clean as i32));
        }
        "load" => {
            let path = arg
                .map(std::path::PathBuf::from)
                .or_else(|| config.agent_load.clone());
            match path {
                Some(path) => match Hive::from_file(config.threads, &path, config.binary_io) {
                    Ok(loaded) => *hive = loaded,
                    Err(err) => error!(%err, "command failed: load"),
                },
                None => error!("command failed: load has no filename"),
            }
        }
        "save" => {
            let path = arg
                .map(std::path::PathBuf::from)
                .or_else(|| config.agent_save.clone());
            match path {
                Some(path) => {
                    if let Err(err) = hive.primary().save(&path, config.binary_io) {
                        error!(%err, "command failed: save");
                    }
                }
                None => error!("command failed: save has no filename"),
            }
        }
        "reset" => {
            hive.reset();
            info!("reset command: agents reset");
        }
        "age" => writeln!(out, "{}", hive.primary().age())?,
        "horizon" => writeln!(out, "{}", hive.primary().horizon())?,
        _ => return Ok(CommandOutcome::Unknown),
    }

    Ok(CommandOutcome::Handled)
}

/// The agent/environment main loop. Returns the process exit code.
pub fn run(config: &Config, input: impl BufRead, mut output: impl Write) -> Result<i32> {
    let mut rng = StdRng::from_entropy();

    // One agent per search thread.
    let mut hive = match &config.agent_load {
        Some(path) => Hive::from_file(config.threads, path, config.binary_io)?,
        None => Hive::new(config.threads, config),
    };
    let mut search = Search::new(config);

    let explore = config.exploration.is_some();
    let mut explore_rate = config.exploration.unwrap_or(0.0);

    let terminate_age = config
        .terminate_age
        .map(|cycles| hive.primary().age() + cycles);

    // Session statistics.
    let start_age = hive.primary().age();
    let start_reward = hive.primary().reward();
    let mut avg_percept_prob = 0.0;

    for line in input.lines() {
        let line = line?;

        if line.starts_with(':') {
            match dispatch_command(&mut hive, config, &line, &mut output)? {
                CommandOutcome::Handled => {}
                CommandOutcome::Unknown => error!(command = %line, "could not find command"),
                CommandOutcome::Quit(code) => return Ok(code),
            }
            output.flush()?;
            continue;
        }

        if terminate_age.is_some_and(|t| hive.primary().age() > t) {
            info!("terminating agent");
            break;
        }

        // Gather a percept from the environment -> agent channel.
        let percept = hive
            .primary()
            .percept_to_symbols(&line)
            .ok_or_else(|| Error::BadPercept(line.clone()))?;

        // Track predictive accuracy across the session.
        let percept_prob = hive.primary_mut().percept_probability(&percept);
        let cycles = (hive.primary().age() - start_age) as f64;
        avg_percept_prob = (percept_prob + cycles * avg_percept_prob) / (cycles + 1.0);
        info!(percept_prob, avg_percept_prob, "percept prediction");

        let reward = hive.primary().reward_from_percept(&percept);
        info!(reward, age = hive.primary().age(), "received reward");

        // Update the hive's model with the new percept.
        hive.model_update_percept(&percept);

        // Determine the best exploitive action, or explore.
        let action = if explore && rng.gen::<f64>() < explore_rate {
            info!(explore_rate, "exploring");
            hive.primary().select_random_action(&mut rng)
        } else {
            search.best_action(&mut hive)
        };
        info!(
            action,
            num_actions = hive.primary().num_actions(),
            "selected action"
        );

        // Send the action across the agent -> environment channel.
        let action_syms = hive.primary().encode_action(action);
        writeln!(output, "{}", symbols_to_string(&action_syms))?;
        output.flush()?;

        // Update the hive's model with the action just performed.
        hive.model_update_action(action);

        if explore {
            explore_rate *= config.explore_decay;
        }

        hive.primary().log_dynamic_properties();
    }

    let cycles = (hive.primary().age() - start_age).saturating_sub(1);
    let summary = format!(
        "Session summary: {} reward from {} cycles.",
        hive.primary().reward() - start_reward,
        cycles
    );
    info!("{summary}");
    writeln!(output, "{summary}")?;
    output.flush()?;

    Ok(ExitCode::Clean as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Controller;
    use std::io::Cursor;

    fn random_controller_config() -> Config {
        Config {
            controller: Controller::Random,
            observation_bits: 1,
            reward_bits: 1,
            num_actions: 2,
            ..Config::default()
        }
    }

    fn run_session(config: &Config, input: &str) -> (i32, String) {
        let mut output = Vec::new();
        let code = run(config, Cursor::new(input.to_string()), &mut output).expect("session runs");
        (code, String::from_utf8(output).expect("utf8 output"))
    }

    #[test]
    fn quit_exits_clean_without_save() {
        let (code, _) = run_session(&random_controller_config(), ":quit\n");
        assert_eq!(code, 0);
    }

    #[test]
    fn quit_with_save_exits_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config {
            agent_save: Some(dir.path().join("agent.json")),
            ..random_controller_config()
        };
        let (code, _) = run_session(&config, ":quit\n");
        assert_eq!(code, 1);
        assert!(dir.path().join("agent.json").exists());
    }

    #[test]
    fn age_and_horizon_commands_answer_on_the_channel() {
        let (_, output) = run_session(&random_controller_config(), ":age\n:horizon\n:quit\n");
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("0"));
        assert_eq!(lines.next(), Some("16"));
    }

    #[test]
    fn help_lists_every_command() {
        let (_, output) = run_session(&random_controller_config(), ":help\n:quit\n");
        for (cmd, _) in COMMANDS {
            assert!(output.contains(cmd), "missing {cmd} in help output");
        }
    }

    #[test]
    fn percepts_produce_action_lines() {
        let (_, output) = run_session(&random_controller_config(), "10\n11\n");
        let lines: Vec<&str> = output.lines().collect();
        // Two actions (1 bit each for 2 actions) and the session summary.
        assert_eq!(lines.len(), 3);
        for action_line in &lines[..2] {
            assert_eq!(action_line.len(), 1);
            assert!(matches!(*action_line, "0" | "1"));
        }
        assert!(lines[2].starts_with("Session summary:"));
    }

    #[test]
    fn malformed_percept_aborts_the_session() {
        let config = random_controller_config();
        let mut output = Vec::new();
        let result = run(&config, Cursor::new("10\n1x\n".to_string()), &mut output);
        assert!(matches!(result, Err(Error::BadPercept(_))));
    }

    #[test]
    fn reset_command_zeroes_age() {
        let input = "10\n:age\n:reset\n:age\n:quit\n";
        let (_, output) = run_session(&random_controller_config(), input);
        let lines: Vec<&str> = output.lines().collect();
        // action, age=1, age=0 after reset
        assert_eq!(lines[1], "1");
        assert_eq!(lines[2], "0");
    }

    #[test]
    fn terminate_age_stops_the_loop() {
        let config = Config {
            terminate_age: Some(1),
            ..random_controller_config()
        };
        let (code, output) = run_session(&config, "10\n11\n10\n11\n10\n");
        assert_eq!(code, 0);
        let action_lines = output
            .lines()
            .filter(|l| !l.starts_with("Session summary:"))
            .count();
        // Age exceeds start + 1 after two cycles; the third percept hits
        // the termination check.
        assert_eq!(action_lines, 2);
    }

    #[test]
    fn save_and_load_commands_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.json");
        let save_input = format!("10\n11\n:save {}\n:quit\n", path.display());
        run_session(&random_controller_config(), &save_input);
        assert!(path.exists());

        let load_input = format!(":load {}\n:age\n:quit\n", path.display());
        let (_, output) = run_session(&random_controller_config(), &load_input);
        // The loaded agent remembers its two completed cycles.
        assert_eq!(output.lines().next(), Some("2"));
    }
}

//! `xmatch run` / `xmatch validate`.

use std::path::{Path, PathBuf};

use xmatch_matcher::{load_events, EventRecord, MatchConfig, MatchError, Matcher, RunResult};

use crate::CliError;

fn load_config(path: &Path) -> Result<MatchConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::config(format!("cannot read config {}: {e}", path.display())))?;

    MatchConfig::from_toml(&text).map_err(|e| {
        let err = CliError::config(format!("{}: {e}", path.display()));
        match e {
            MatchError::ConfigParse(_) => err.with_hint("check the TOML syntax and field names"),
            _ => err,
        }
    })
}

fn load_event_file(path: &Path) -> Result<Vec<EventRecord>, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::events(format!("cannot read events {}: {e}", path.display())))?;

    load_events(&text).map_err(|e| {
        CliError::events(format!("{}: {e}", path.display()))
            .with_hint("expected a JSON array of event objects")
    })
}

fn summary_line(result: &RunResult) -> String {
    let s = &result.summary;
    format!(
        "{}: {} events, {} candidates ({} unscored), {} pandora + {} spine matches",
        result.meta.config_name, s.events, s.candidates, s.unscored, s.matches.pandora, s.matches.spine,
    )
}

pub fn cmd_run(
    config_path: PathBuf,
    events_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let records = load_event_file(&events_path)?;
    log::info!("loaded {} events from {}", records.len(), events_path.display());

    let matcher = Matcher::new(config).map_err(|e| CliError::config(e.to_string()))?;
    let result = matcher.run(&records);

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    eprintln!("{}", summary_line(&result));
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "{}: ok (cutoff {}, timing {}, unresolved timing: {})",
        config.name,
        config.score_cutoff,
        if config.timing.enabled { "on" } else { "off" },
        config.timing.on_unresolved,
    );
    Ok(())
}

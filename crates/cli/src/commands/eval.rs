use std::path::Path;

use pricerule_eval::{EngineConfig, RuleEngine};
use pricerule_storage::MemorySupply;
use tracing::debug;

use super::{load_record, load_settings};
use crate::config::CliConfig;
use crate::{fail, OutputFormat};

pub(crate) struct EvalOptions<'a> {
    pub rules: &'a Path,
    pub record: &'a Path,
    pub rule_id: Option<&'a str>,
    pub start: i64,
    pub config: Option<&'a Path>,
}

pub(crate) fn cmd_eval(opts: EvalOptions<'_>, output: OutputFormat, quiet: bool) {
    let engine_config = match opts.config {
        Some(path) => match CliConfig::load(path) {
            Ok(config) => config.engine,
            Err(msg) => fail(&msg, output, quiet),
        },
        None => EngineConfig::default(),
    };

    let settings = load_settings(opts.rules).unwrap_or_else(|msg| fail(&msg, output, quiet));
    let mut record = load_record(opts.record).unwrap_or_else(|msg| fail(&msg, output, quiet));

    let supply = match MemorySupply::with_settings(&settings) {
        Ok(supply) => supply,
        Err(e) => fail(&format!("error: loading rule supply: {}", e), output, quiet),
    };
    let engine = RuleEngine::with_config(supply, engine_config);

    let verdict = match opts.rule_id {
        Some(rule_id) => {
            debug!(rule_id, start = opts.start, "evaluating rule chain");
            engine.apply_rule(&mut record, rule_id, opts.start)
        }
        None => {
            debug!(count = settings.len(), "evaluating rules file in order");
            engine.apply_settings(&mut record, &settings)
        }
    };
    let passed = match verdict {
        Ok(passed) => passed,
        Err(e) => fail(&format!("error: evaluation failed: {}", e), output, quiet),
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "passed": passed,
                "record": record,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json)
                    .unwrap_or_else(|e| format!("serialization error: {}", e))
            );
        }
        OutputFormat::Text => {
            println!("{}", if passed { "passed" } else { "failed" });
            for (name, value) in record.iter() {
                let rendered = serde_json::to_string(value)
                    .unwrap_or_else(|e| format!("serialization error: {}", e));
                println!("  {} = {}", name, rendered);
            }
        }
    }
}

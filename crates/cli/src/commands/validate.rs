use std::collections::BTreeMap;
use std::path::Path;

use pricerule_eval::check_sequence;
use pricerule_model::RuleSetting;
use pricerule_storage::MemorySupply;

use super::load_settings;
use crate::{fail, OutputFormat};

/// Group settings by rule id, keeping file order within each group.
fn group_by_rule(settings: Vec<RuleSetting>) -> BTreeMap<String, Vec<RuleSetting>> {
    let mut groups: BTreeMap<String, Vec<RuleSetting>> = BTreeMap::new();
    for setting in settings {
        groups.entry(setting.rule_id.clone()).or_default().push(setting);
    }
    groups
}

pub(crate) fn cmd_validate(rules_path: &Path, output: OutputFormat, quiet: bool) {
    let settings = load_settings(rules_path).unwrap_or_else(|msg| fail(&msg, output, quiet));
    // Counts are reported as stored: settings sharing an id collapse into one.
    let stored = MemorySupply::with_settings(&settings)
        .and_then(|supply| supply.rule_ids())
        .unwrap_or_else(|e| fail(&format!("error: storing rules: {}", e), output, quiet));
    let groups = group_by_rule(settings);

    let mut errors = Vec::new();
    for (rule_id, group) in &groups {
        if let Err(e) = check_sequence(group) {
            errors.push(format!("{}: {}", rule_id, e));
        }
    }

    if !errors.is_empty() {
        if !quiet {
            match output {
                OutputFormat::Text => {
                    eprintln!("invalid rules");
                    for err in &errors {
                        eprintln!("  - {}", err);
                    }
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({ "valid": false, "errors": errors });
                    eprintln!(
                        "{}",
                        serde_json::to_string_pretty(&json).unwrap_or_default()
                    );
                }
            }
        }
        std::process::exit(1);
    }

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            println!("valid");
            for (rule_id, count) in &stored {
                println!("  {}: {} settings", rule_id, count);
            }
        }
        OutputFormat::Json => {
            let counts: BTreeMap<&str, usize> = stored
                .iter()
                .map(|(rule_id, count)| (rule_id.as_str(), *count))
                .collect();
            let json = serde_json::json!({ "valid": true, "rules": counts });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricerule_model::Rule;

    #[test]
    fn grouping_keeps_file_order() {
        let settings = vec![
            RuleSetting::new("promo", 2, Rule::default()),
            RuleSetting::new("base", 0, Rule::default()),
            RuleSetting::new("promo", 1, Rule::default()),
        ];
        let groups = group_by_rule(settings);
        assert_eq!(groups.len(), 2);
        let promo: Vec<i64> = groups["promo"].iter().map(|s| s.sequence).collect();
        assert_eq!(promo, vec![2, 1]);
        assert!(check_sequence(&groups["promo"]).is_err());
        assert!(check_sequence(&groups["base"]).is_ok());
    }
}

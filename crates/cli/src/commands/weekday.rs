use pricerule_model::{weekday_epoch, weekday_from_name};

use crate::{fail, OutputFormat};

pub(crate) fn cmd_weekday(name: &str, output: OutputFormat, quiet: bool) {
    let weekday = match weekday_from_name(name) {
        Some(weekday) => weekday,
        None => fail(&format!("error: unknown weekday '{}'", name), output, quiet),
    };
    if quiet {
        return;
    }
    let epoch = weekday_epoch(weekday);
    match output {
        OutputFormat::Text => println!("{}", epoch),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "weekday": weekday.to_string(), "epoch": epoch })
        ),
    }
}

//! Output rendering.

use serde_json::json;

use condor::model::{GlobalSettings, StreamEntry, Tristate};

use crate::error::Result;

pub fn print_check(
    url: &str,
    platform: &str,
    is_live: bool,
    note: Option<&str>,
    json_output: bool,
) -> Result<()> {
    if json_output {
        let doc = json!({
            "url": url,
            "platform": platform,
            "is_live": is_live,
            "note": note,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    let state = if is_live { "LIVE" } else { "offline" };
    match note {
        Some(note) => println!("{url}: {state} [{platform}] ({note})"),
        None => println!("{url}: {state} [{platform}]"),
    }
    Ok(())
}

pub fn print_list(
    entries: &[StreamEntry],
    settings: &GlobalSettings,
    json_output: bool,
) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("no streams configured");
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<10} {:<9} {:<9} URL",
        "NAME", "TYPE", "QUALITY", "CHECK", "NOTIFY"
    );
    for entry in entries {
        println!(
            "{:<24} {:<10} {:<10} {:<9} {:<9} {}",
            entry.display_name(),
            entry.kind_or_unknown(),
            entry.effective_quality(settings),
            toggle(entry.check, settings.monitoring_enabled),
            toggle(entry.notify, settings.default_notify),
            entry.url
        );
    }
    Ok(())
}

/// Render a tristate with its inherited effective value visible.
fn toggle(value: Tristate, default: bool) -> String {
    match value {
        Tristate::On => "on".to_string(),
        Tristate::Off => "off".to_string(),
        Tristate::Unset => format!("auto({})", if default { "on" } else { "off" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_shows_inherited_value() {
        assert_eq!(toggle(Tristate::On, false), "on");
        assert_eq!(toggle(Tristate::Off, true), "off");
        assert_eq!(toggle(Tristate::Unset, true), "auto(on)");
        assert_eq!(toggle(Tristate::Unset, false), "auto(off)");
    }
}

//! `parley config` - print the effective configuration.

use console::style;
use serde::Serialize;

use parley_types::config::RelayConfig;

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    #[serde(flatten)]
    config: &'a RelayConfig,
    api_key: &'static str,
}

/// Render the configuration as JSON or toml. The API key is reported only as
/// set or not set.
pub fn render_config(config: &RelayConfig, api_key_set: bool, json: bool) -> anyhow::Result<String> {
    if json {
        let effective = EffectiveConfig {
            config,
            api_key: if api_key_set { "<redacted>" } else { "<not set>" },
        };
        return Ok(serde_json::to_string_pretty(&effective)?);
    }
    Ok(toml::to_string_pretty(config)?)
}

pub fn show_config(config: &RelayConfig, api_key_set: bool, json: bool) -> anyhow::Result<()> {
    let rendered = render_config(config, api_key_set, json)?;
    if json {
        println!("{rendered}");
        return Ok(());
    }

    let key_status = if api_key_set {
        style("set").green().to_string()
    } else {
        style("not set").red().bold().to_string()
    };
    println!("{}", style("# Effective Parley configuration").dim());
    println!("{}", style(format!("# OPENAI_API_KEY: {key_status}")).dim());
    println!();
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_json_redacts_key() {
        let rendered = render_config(&RelayConfig::default(), true, true).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["api_key"], "<redacted>");
        assert_eq!(json["port"], 3003);
        assert_eq!(json["upstream"]["voice"], "coral");
    }

    #[test]
    fn test_render_toml_round_trips() {
        let config = RelayConfig {
            task_title: "Airport small talk".to_string(),
            ..RelayConfig::default()
        };
        let rendered = render_config(&config, false, false).unwrap();
        let parsed: RelayConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{de::Deserializer, Deserialize, Serialize};

use pulsar_domain::{HorizonChoice, ZoomChoice};

/// Stores user-configurable shell preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub horizon: HorizonChoice,
    #[serde(default, deserialize_with = "lenient_choice")]
    pub zoom: ZoomChoice,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the ledger CSV files. Defaults to `<base>/data`.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: Self::default_currency_symbol(),
            horizon: HorizonChoice::default(),
            zoom: ZoomChoice::default(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            data_root: None,
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "$".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_root(&self, base: &Path) -> PathBuf {
        match &self.data_root {
            Some(path) => path.clone(),
            None => base.join("data"),
        }
    }

    /// Formats `amount` with the configured symbol, sign first: `-$12.50`.
    pub fn format_amount(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{sign}{}{:.2}", self.currency_symbol, amount.abs())
    }
}

// Unknown labels from an older or hand-edited file fall back to the default.
fn lenient_choice<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|label| label.parse().ok())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_carry_sign_before_symbol() {
        let cfg = Config::default();
        assert_eq!(cfg.format_amount(1234.5), "$1234.50");
        assert_eq!(cfg.format_amount(-12.0), "-$12.00");
        assert_eq!(cfg.format_amount(0.0), "$0.00");
    }

    #[test]
    fn data_root_defaults_under_base() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.resolve_data_root(Path::new("/tmp/pulsar")),
            PathBuf::from("/tmp/pulsar/data")
        );
        cfg.data_root = Some(PathBuf::from("/srv/ledger"));
        assert_eq!(
            cfg.resolve_data_root(Path::new("/tmp/pulsar")),
            PathBuf::from("/srv/ledger")
        );
    }
}

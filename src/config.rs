use crate::agc::AgcParams;
use crate::car::CarParams;
use crate::ears::Ears;
use crate::error::DesignError;
use crate::ihc::IhcParams;
use crate::output::OutputSelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Everything needed to design a set of ears, as stored in a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarfacConfig {
    #[serde(default = "CarfacConfig::default_sample_rate")]
    pub sample_rate: f32,
    #[serde(default = "CarfacConfig::default_n_ears")]
    pub n_ears: usize,
    #[serde(default)]
    pub car: CarParams,
    #[serde(default)]
    pub ihc: IhcParams,
    #[serde(default)]
    pub agc: AgcParams,
    #[serde(default)]
    pub output: OutputSelection,
}

impl CarfacConfig {
    fn default_sample_rate() -> f32 {
        22_050.0
    }
    fn default_n_ears() -> usize {
        1
    }
}

impl Default for CarfacConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
            n_ears: Self::default_n_ears(),
            car: CarParams::default(),
            ihc: IhcParams::default(),
            agc: AgcParams::default(),
            output: OutputSelection::default(),
        }
    }
}

impl CarfacConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Design `n_ears` ears sharing one design.
    pub fn design_ears(&self) -> Result<Ears, DesignError> {
        Ears::new(self.n_ears, self.sample_rate, &self.car, &self.ihc, &self.agc)
    }

    fn format_f32_compact(x: f32) -> String {
        let mut s = format!("{:.6}", x);
        while s.contains('.') && s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        if s.is_empty() || s == "-0" { "0".to_string() } else { s }
    }

    /// Comment out every key line, shortening f32 noise such as `0.10000000149011612`.
    fn commented_template(text: &str) -> String {
        let mut commented = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                commented.push('\n');
                continue;
            }
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                commented.push_str(line);
                commented.push('\n');
                continue;
            }
            let mut out_line = line.to_string();
            if let Some((lhs, rhs)) = line.split_once('=') {
                let rhs_trim = rhs.trim();
                if rhs_trim.contains('.') && !rhs_trim.starts_with('[') {
                    if let Ok(val) = rhs_trim.parse::<f32>() {
                        let mut formatted = Self::format_f32_compact(val);
                        if !formatted.contains('.') && !formatted.contains('e') {
                            formatted.push_str(".0");
                        }
                        out_line = format!("{} = {}", lhs.trim(), formatted);
                    }
                }
            }
            commented.push_str("# ");
            commented.push_str(&out_line);
            commented.push('\n');
        }
        commented
    }

    /// Read `path`; on a read or parse failure warn and use defaults.
    /// A missing file gets a commented template of the defaults written to it.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match Self::from_toml_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        let default_cfg = Self::default();
        match default_cfg.to_toml_string() {
            Ok(text) => {
                if let Err(err) = fs::write(path_obj, Self::commented_template(&text)) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize default config: {err}"),
        }
        default_cfg
    }
}

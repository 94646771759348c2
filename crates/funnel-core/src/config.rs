use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FunnelError, Result};

/// Top-level configuration for a funnel page.
///
/// Loaded from a TOML file. Every section falls back to its defaults, so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunnelConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub exit_intent: ExitIntentConfig,
    #[serde(default)]
    pub forms: FormConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
}

impl FunnelConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FunnelConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing,
    /// unparseable, or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Render the configuration as pretty-printed TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let mut previous: Option<u8> = None;
        for &value in &self.scroll.milestones {
            if value == 0 || value > 100 {
                return Err(FunnelError::InvalidMilestone {
                    value,
                    reason: "must be between 1 and 100".to_string(),
                });
            }
            if previous.is_some_and(|p| p >= value) {
                return Err(FunnelError::InvalidMilestone {
                    value,
                    reason: "milestones must be strictly ascending".to_string(),
                });
            }
            previous = Some(value);
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(FunnelError::Config(format!(
                "reveal.threshold must be within 0.0..=1.0, got {}",
                self.reveal.threshold
            )));
        }
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Which recording sink tracked events go to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Structured log output.
    #[default]
    Console,
    /// Google Analytics 4 (`gtag`).
    Ga4,
    /// Facebook pixel (`fbq`).
    Pixel,
    /// Discard everything.
    Noop,
}

/// Event tracking settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub sink: SinkKind,
}

/// Scroll-depth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Percentage thresholds, strictly ascending, each in 1..=100.
    pub milestones: Vec<u8>,
    /// Quiet period before a scroll position is sampled.
    pub debounce_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            milestones: vec![25, 50, 75, 100],
            debounce_ms: 100,
        }
    }
}

/// Rules that identify affiliate links.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Substring that marks an href as an affiliate destination.
    pub affiliate_href_fragment: String,
    /// CSS classes that mark a link as an affiliate call-to-action.
    pub affiliate_classes: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            affiliate_href_fragment: "guardio".to_string(),
            affiliate_classes: vec!["btn-primary".to_string(), "btn-accent".to_string()],
        }
    }
}

/// Exit-intent detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitIntentConfig {
    /// Pointer exits with a client Y below this many pixels count as intent.
    pub threshold_px: f64,
}

impl Default for ExitIntentConfig {
    fn default() -> Self {
        Self { threshold_px: 10.0 }
    }
}

/// Form submission UX settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Delay before a disabled submit button is re-enabled.
    pub reenable_delay_ms: u64,
    /// Button label while a submission is in flight.
    pub submitting_label: String,
    /// Button label once re-enabled.
    pub idle_label: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reenable_delay_ms: 2000,
            submitting_label: "Submitting...".to_string(),
            idle_label: "Submit".to_string(),
        }
    }
}

/// Reveal-on-scroll settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Fraction of the element that must be visible, 0.0 to 1.0.
    pub threshold: f64,
    /// Pixels trimmed from the bottom of the viewport before intersecting.
    pub bottom_margin_px: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            bottom_margin_px: 50.0,
        }
    }
}

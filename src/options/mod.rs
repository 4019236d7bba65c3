//! Motion options with TOML preset support.
//!
//! Every tunable timing (natural and reduced profiles, counter duration,
//! scroll thresholds, idle loops) lives here. Options serialize to and from
//! TOML so a site can ship presets; durations are written in seconds.

mod continuous;
mod counter;
pub(crate) mod seconds;
mod viewport;

use std::path::Path;

pub use continuous::ContinuousOptions;
pub use counter::CounterOptions;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
pub use viewport::ViewportOptions;

use crate::error::FolioError;
use crate::policy::{MotionProfile, PolicyResolver};
use crate::util::easing::EasingFunction;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[viewport]`) work correctly.
///
/// A partially specified `[reduced]` table fills its missing keys from the
/// reduced defaults, so overriding only its duration keeps linear easing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct MotionOptions {
    /// Timing for sections with no motion restriction.
    pub natural: MotionProfile,
    /// Timing applied when the user prefers reduced motion.
    #[serde(deserialize_with = "reduced_profile")]
    #[schemars(with = "MotionProfile")]
    pub reduced: MotionProfile,
    /// Counter timing and formatting.
    pub counter: CounterOptions,
    /// Scroll-trigger thresholds.
    pub viewport: ViewportOptions,
    /// Idle loop parameters.
    pub continuous: ContinuousOptions,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self {
            natural: MotionProfile::natural(),
            reduced: MotionProfile::reduced(),
            counter: CounterOptions::default(),
            viewport: ViewportOptions::default(),
            continuous: ContinuousOptions::default(),
        }
    }
}

/// `[reduced]` keys, defaulting to [`MotionProfile::reduced`].
#[derive(Deserialize)]
#[serde(default)]
struct ReducedTable {
    #[serde(with = "seconds")]
    duration: Duration,
    easing: EasingFunction,
    #[serde(with = "seconds")]
    stagger: Duration,
}

impl Default for ReducedTable {
    fn default() -> Self {
        let MotionProfile {
            duration,
            easing,
            stagger,
        } = MotionProfile::reduced();
        Self {
            duration,
            easing,
            stagger,
        }
    }
}

fn reduced_profile<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<MotionProfile, D::Error> {
    let table = ReducedTable::deserialize(deserializer)?;
    Ok(MotionProfile::new(table.duration, table.easing, table.stagger))
}

impl MotionOptions {
    /// Generate JSON Schema describing the options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(MotionOptions)
    }

    /// Resolver applying this file's reduced profile.
    #[must_use]
    pub fn resolver(&self) -> PolicyResolver {
        PolicyResolver::new(self.reduced)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, FolioError> {
        toml::from_str(content)
            .map_err(|e| FolioError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, FolioError> {
        let content = std::fs::read_to_string(path).map_err(FolioError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), FolioError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FolioError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(FolioError::Io)?;
        }
        std::fs::write(path, content).map_err(FolioError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::Trigger;
    use crate::preference::MotionPreference;
    use crate::util::easing::EasingFunction;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = MotionOptions::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = MotionOptions::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
[natural]
duration = 0.8
easing = "cubic_in_out"

[viewport]
replay = true
"#;
        let opts = MotionOptions::from_toml(toml_str).unwrap();
        assert_eq!(opts.natural.duration, Duration::from_millis(800));
        assert_eq!(opts.natural.easing, EasingFunction::CubicInOut);
        // Everything else should be default
        assert_eq!(opts.natural.stagger, Duration::from_millis(100));
        assert_eq!(opts.reduced, MotionProfile::reduced());
        assert_eq!(
            opts.viewport.entrance_trigger(),
            Trigger::Viewport {
                threshold: 0.2,
                replay: true
            }
        );
        assert_eq!(opts.counter.duration, Duration::from_secs(2));
    }

    #[test]
    fn negative_durations_are_rejected() {
        let err = MotionOptions::from_toml("[natural]\nduration = -1.0\n");
        assert!(matches!(err, Err(FolioError::OptionsParse(_))));
    }

    #[test]
    fn resolver_uses_configured_reduced_profile() {
        let opts = MotionOptions::from_toml(
            "[reduced]\nduration = 0.05\neasing = \"linear\"\nstagger = 0.0\n",
        )
        .unwrap();
        let policy = opts
            .resolver()
            .resolve(MotionPreference::Reduce, &opts.natural);
        assert_eq!(policy.duration, Duration::from_millis(50));
        assert_eq!(policy.stagger, Duration::ZERO);
    }

    #[test]
    fn partial_reduced_table_keeps_reduced_defaults() {
        let opts =
            MotionOptions::from_toml("[reduced]\nduration = 0.05\n").unwrap();
        assert_eq!(opts.reduced.duration, Duration::from_millis(50));
        assert_eq!(opts.reduced.easing, EasingFunction::Linear);
        assert_eq!(opts.reduced.stagger, Duration::from_millis(50));

        let policy = opts
            .resolver()
            .resolve(MotionPreference::Reduce, &opts.natural);
        assert_eq!(policy.easing, EasingFunction::Linear);
        assert_eq!(policy.duration, Duration::from_millis(50));
    }

    #[test]
    fn counter_format_follows_grouping_flag() {
        let mut opts = MotionOptions::default();
        assert_eq!(opts.counter.format().format(12_345.0), "12,345");
        opts.counter.group_thousands = false;
        assert_eq!(opts.counter.format().format(12_345.0), "12345");
    }

    #[test]
    fn save_load_and_list_presets() {
        let dir = std::env::temp_dir()
            .join(format!("folio-presets-{}", std::process::id()));
        let mut opts = MotionOptions::default();
        opts.continuous.bounce_amplitude = 6.0;
        opts.save(&dir.join("calm.toml")).unwrap();
        MotionOptions::default().save(&dir.join("default.toml")).unwrap();

        assert_eq!(MotionOptions::list_presets(&dir), vec!["calm", "default"]);
        let loaded = MotionOptions::load(&dir.join("calm.toml")).unwrap();
        assert_eq!(loaded, opts);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn schema_has_expected_properties() {
        let schema_value =
            serde_json::to_value(MotionOptions::json_schema()).unwrap();
        let props = schema_value["properties"].as_object().unwrap();

        for key in ["natural", "reduced", "counter", "viewport", "continuous"] {
            assert!(props.contains_key(key), "{key}");
        }
        let viewport = &props["viewport"]["properties"];
        assert!(viewport.get("entrance_threshold").is_some());
        assert!(viewport.get("replay").is_some());
    }
}

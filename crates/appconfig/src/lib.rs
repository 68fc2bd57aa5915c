use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Configuration format version understood by this crate.
pub const CONFIG_VERSION: u32 = 1;

/// Accepted range for `circle.segments`.
pub const SEGMENT_RANGE: std::ops::RangeInclusive<u32> = 3..=4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub version: u32,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub circle: CircleSection,
    #[serde(default)]
    pub assets: AssetsSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
    pub resizable: bool,
    /// RGBA, each component in `[0, 1]`.
    pub clear_color: [f64; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSection {
    /// Draw polygons as outlines in lessons that support it.
    pub wireframe: bool,
    #[serde(
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_after: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircleSection {
    pub radius: f64,
    pub segments: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetsSection {
    /// Root for shader and texture files; relative entries below resolve
    /// against it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    pub texture: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            window: WindowSection::default(),
            render: RenderSection::default(),
            circle: CircleSection::default(),
            assets: AssetsSection::default(),
        }
    }
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1368,
            height: 768,
            title: "Spacecraft".to_string(),
            vsync: true,
            resizable: true,
            clear_color: [0.072, 0.13, 0.17, 1.0],
        }
    }
}

impl Default for CircleSection {
    fn default() -> Self {
        Self {
            radius: 0.5,
            segments: 100,
        }
    }
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            dir: None,
            texture: PathBuf::from("textures/container.png"),
        }
    }
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_secs(v as u64)))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_secs(v)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be a non-negative number"));
            }
            Duration::try_from_secs_f64(v)
                .map(Some)
                .map_err(|err| E::custom(format!("duration out of range: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

fn serialize_duration_opt<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(duration) => {
            serializer.serialize_str(&humantime::format_duration(*duration).to_string())
        }
        None => serializer.serialize_none(),
    }
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: AppConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        let window = &self.window;
        if window.width == 0 || window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero (got {}x{})",
                window.width, window.height
            )));
        }
        if window.title.trim().is_empty() {
            return Err(ConfigError::Invalid("window.title may not be empty".into()));
        }
        for (index, component) in window.clear_color.iter().enumerate() {
            if !(0.0..=1.0).contains(component) {
                return Err(ConfigError::Invalid(format!(
                    "window.clear_color[{index}] must be within [0, 1] (got {component})"
                )));
            }
        }

        let circle = &self.circle;
        if !(circle.radius > 0.0 && circle.radius <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "circle.radius must be within (0, 1] (got {})",
                circle.radius
            )));
        }
        if !SEGMENT_RANGE.contains(&circle.segments) {
            return Err(ConfigError::Invalid(format!(
                "circle.segments must be within {}..={} (got {})",
                SEGMENT_RANGE.start(),
                SEGMENT_RANGE.end(),
                circle.segments
            )));
        }

        if self.assets.texture.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("assets.texture may not be empty".into()));
        }

        Ok(())
    }

    /// Clear colour narrowed for GL.
    pub fn clear_color(&self) -> [f32; 4] {
        self.window.clear_color.map(|component| component as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[window]
width = 800
height = 600
title = "Lesson"
vsync = false
clear_color = [0.2, 0.3, 0.3, 1.0]

[render]
wireframe = true
exit_after = "1m 30s"

[circle]
radius = 0.25
segments = 64

[assets]
dir = "/opt/spacecraft/assets"
texture = "textures/wall.jpg"
"#;

    #[test]
    fn parses_sample_config() {
        let config = AppConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!((config.window.width, config.window.height), (800, 600));
        assert_eq!(config.window.title, "Lesson");
        assert!(!config.window.vsync);
        assert!(config.window.resizable);
        assert!(config.render.wireframe);
        assert_eq!(config.render.exit_after, Some(Duration::from_secs(90)));
        assert_eq!(config.circle.segments, 64);
        assert_eq!(
            config.assets.dir.as_deref(),
            Some(Path::new("/opt/spacecraft/assets"))
        );
        assert_eq!(config.clear_color(), [0.2, 0.3, 0.3, 1.0]);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = AppConfig::from_toml_str("version = 1\n[window]\ntitle = \"Mine\"\n").unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.window.title, "Mine");
        assert_eq!(config.window.width, defaults.window.width);
        assert_eq!(config.circle, defaults.circle);
        assert_eq!(config.assets, defaults.assets);
        assert_eq!(config.render.exit_after, None);
    }

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn numeric_exit_after_is_seconds() {
        let config = AppConfig::from_toml_str("version = 1\n[render]\nexit_after = 3\n").unwrap();
        assert_eq!(config.render.exit_after, Some(Duration::from_secs(3)));

        let config =
            AppConfig::from_toml_str("version = 1\n[render]\nexit_after = 0.5\n").unwrap();
        assert_eq!(config.render.exit_after, Some(Duration::from_millis(500)));
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            "version = 2\n",
            "version = 1\n[window]\nwidth = 0\n",
            "version = 1\n[window]\ntitle = \"  \"\n",
            "version = 1\n[window]\nclear_color = [0.0, 1.5, 0.0, 1.0]\n",
            "version = 1\n[circle]\nradius = 0.0\n",
            "version = 1\n[circle]\nsegments = 2\n",
            "version = 1\n[assets]\ntexture = \"\"\n",
        ];
        for case in cases {
            let err = AppConfig::from_toml_str(case).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{case}: {err}");
        }
    }

    #[test]
    fn rejects_malformed_toml_and_durations() {
        assert!(matches!(
            AppConfig::from_toml_str("version = ").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            AppConfig::from_toml_str("version = 1\n[render]\nexit_after = \"soon\"\n").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            AppConfig::from_toml_str("version = 1\n[render]\nexit_after = -4\n").unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn out_of_range_exit_after_is_a_parse_error() {
        let err = AppConfig::from_toml_str("version = 1\n[render]\nexit_after = 1e30\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        match AppConfig::load(&path).unwrap_err() {
            ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.assets.texture, PathBuf::from("textures/wall.jpg"));
    }

    #[test]
    fn printed_config_parses_back() {
        let config = AppConfig::from_toml_str(SAMPLE).unwrap();
        let printed = config.to_toml_string().unwrap();
        assert!(printed.contains("exit_after = \"1m 30s\""));
        assert_eq!(AppConfig::from_toml_str(&printed).unwrap(), config);
    }
}

//! Configuration module for scene_cam
//!
//! Supports loading configuration from a TOML file.
//! Configuration is stored in a standard location:
//! - Windows: %APPDATA%\scene_cam\config.toml
//! - Linux/macOS: ~/.config/scene_cam/config.toml

use crate::device::traits::FacingMode;
use crate::resolver::engine::ResolverConfig;
use crate::scene::catalog::SceneId;
use crate::session::capture::{CaptureAction, DEFAULT_FLASH_MS, DEFAULT_JPEG_QUALITY};
use crate::session::overlay::GridType;
use crate::storage::gallery::DEFAULT_QUOTA_BYTES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application name used for config directory
const APP_NAME: &str = "scene_cam";

/// Default config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Local file names checked before the standard location
const LOCAL_CONFIG_FILES: [&str; 2] = ["./scene_cam.toml", "./config.toml"];

/// Get the standard configuration directory for the application.
///
/// Returns:
/// - Windows: %APPDATA%\scene_cam
/// - Linux/macOS: ~/.config/scene_cam
pub fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_NAME))
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map(|home| home.join(".config").join(APP_NAME))
    }
}

/// Get the standard configuration file path.
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Ensure the configuration directory exists.
pub fn ensure_config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir = get_config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)
            .map_err(|e| ConfigError::WriteError(config_dir.clone(), e.to_string()))?;
    }

    Ok(config_dir)
}

/// Initialize the configuration file if it doesn't exist.
///
/// With `reset` the file is overwritten with the commented template.
/// Returns the path to the config file.
pub fn init_config(reset: bool) -> Result<PathBuf, ConfigError> {
    let config_dir = ensure_config_dir()?;
    let config_path = config_dir.join(CONFIG_FILE_NAME);

    if reset || !config_path.exists() {
        fs::write(&config_path, Config::generate_default_config())
            .map_err(|e| ConfigError::WriteError(config_path.clone(), e.to_string()))?;
    }

    Ok(config_path)
}

/// Where photos go when nothing else is configured
fn default_gallery_dir() -> PathBuf {
    dirs::picture_dir()
        .map(|dir| dir.join("SceneCam"))
        .unwrap_or_else(|| PathBuf::from("./scene_cam_gallery"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Camera settings
    pub camera: CameraConfig,

    /// Initial session state
    pub session: SessionDefaults,

    /// Scene resolver settings
    pub resolver: ResolverSettings,

    /// Scene classifier settings
    pub classifier: ClassifierConfig,

    /// Capture and gallery settings
    pub capture: CaptureConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Which camera to open first
    pub facing: FacingMode,

    /// Preferred frame width
    pub ideal_width: u32,

    /// Preferred frame height
    pub ideal_height: u32,

    /// Image file or directory the replay camera reads frames from.
    /// `mock` selects the built-in synthetic camera.
    pub source: Option<PathBuf>,
}

/// What a new session starts with
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionDefaults {
    /// Scene applied before the first frame
    pub default_scene: SceneId,

    /// Composition grid shown at start
    pub default_grid: GridType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    /// Run periodic scene detection in automatic mode
    pub enabled: bool,

    pub interval_ms: u64,

    pub warmup_ms: u64,

    pub sample_width: u32,

    pub sample_quality: u8,

    /// How long a detected scene's tip stays up
    pub scene_hint_ms: u64,

    /// How long the "using standard settings" notice stays up
    pub fallback_hint_ms: u64,
}

/// Which classifier backs the resolver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    /// Google Gemini over HTTPS
    #[default]
    Gemini,
    /// No network; every cycle answers `auto`
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub provider: ClassifierProvider,

    /// Model name (Gemini default when unset)
    pub model: Option<String>,

    /// API base URL (Gemini default when unset)
    pub endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub jpeg_quality: u8,

    /// Length of the shutter flash acknowledgment
    pub flash_ms: u64,

    /// Root of the local photo gallery
    pub gallery_dir: PathBuf,

    /// Bytes the gallery may hold, trash included; 0 for no limit
    pub storage_quota_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,

    pub log_to_file: bool,

    pub log_file: PathBuf,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: 1920,
            ideal_height: 1080,
            source: None,
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        let defaults = ResolverConfig::default();
        Self {
            enabled: true,
            interval_ms: defaults.interval.as_millis() as u64,
            warmup_ms: defaults.warmup.as_millis() as u64,
            sample_width: defaults.sample_width,
            sample_quality: defaults.sample_quality,
            scene_hint_ms: defaults.scene_hint_ttl.as_millis() as u64,
            fallback_hint_ms: defaults.fallback_hint_ttl.as_millis() as u64,
        }
    }
}

impl ResolverSettings {
    /// Convert to the resolver's runtime configuration
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            interval: Duration::from_millis(self.interval_ms.max(1)),
            warmup: Duration::from_millis(self.warmup_ms),
            sample_width: self.sample_width.max(1),
            sample_quality: self.sample_quality.clamp(1, 100),
            scene_hint_ttl: Duration::from_millis(self.scene_hint_ms),
            fallback_hint_ttl: Duration::from_millis(self.fallback_hint_ms),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::Gemini,
            model: None,
            endpoint: None,
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 20,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            flash_ms: DEFAULT_FLASH_MS,
            gallery_dir: default_gallery_dir(),
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl CaptureConfig {
    /// Build the capture action these settings describe
    pub fn to_capture_action(&self) -> CaptureAction {
        CaptureAction::new()
            .with_quality(self.jpeg_quality)
            .with_flash(Duration::from_millis(self.flash_ms))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: false,
            log_file: PathBuf::from("./scene_cam.log"),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;

        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./scene_cam.toml
    /// 2. ./config.toml
    /// 3. Standard config location
    ///
    /// If no config file is found, returns default configuration.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::find_existing() {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Get the path where the config file is (or would be) located.
    pub fn get_active_config_path() -> PathBuf {
        Self::find_existing()
            .or_else(get_config_path)
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }

    fn find_existing() -> Option<PathBuf> {
        LOCAL_CONFIG_FILES
            .iter()
            .map(PathBuf::from)
            .chain(get_config_path())
            .find(|path| path.exists())
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::WriteError(path.as_ref().to_path_buf(), e.to_string()))?;

        Ok(())
    }

    /// Generate a default config file with comments
    pub fn generate_default_config() -> String {
        include_str!("../../config.example.toml").to_string()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path
    FileNotFound(PathBuf),
    /// Failed to read the configuration file
    ReadError(PathBuf, String),
    /// Failed to parse the configuration file (invalid TOML)
    ParseError(PathBuf, String),
    /// Failed to serialize configuration to TOML
    SerializeError(String),
    /// Failed to write configuration file
    WriteError(PathBuf, String),
    /// Could not determine config directory
    ConfigDirNotFound,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ReadError(path, err) => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ParseError(path, err) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::SerializeError(err) => {
                write!(f, "Failed to serialize configuration: {}", err)
            }
            ConfigError::WriteError(path, err) => {
                write!(
                    f,
                    "Failed to write config file '{}': {}",
                    path.display(),
                    err
                )
            }
            ConfigError::ConfigDirNotFound => {
                write!(f, "Could not determine configuration directory")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_resolver_defaults() {
        let config = Config::default();
        assert!(config.resolver.enabled);
        assert_eq!(config.resolver.to_resolver_config(), ResolverConfig::default());
        assert_eq!(config.camera.facing, FacingMode::Environment);
        assert_eq!(config.classifier.provider, ClassifierProvider::Gemini);
        assert_eq!(config.capture.jpeg_quality, DEFAULT_JPEG_QUALITY);
        assert_eq!(config.capture.storage_quota_bytes, DEFAULT_QUOTA_BYTES);
        assert_eq!(config.session.default_scene, SceneId::Auto);
        assert_eq!(config.session.default_grid, GridType::None);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(&Config::generate_default_config()).unwrap();
        assert_eq!(config.resolver.interval_ms, 3000);
        assert_eq!(config.resolver.warmup_ms, 500);
        assert_eq!(config.classifier.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.session, SessionDefaults::default());
        assert_eq!(config.capture.storage_quota_bytes, DEFAULT_QUOTA_BYTES);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            facing = "user"

            [resolver]
            interval_ms = 1000

            [classifier]
            provider = "offline"

            [session]
            default_scene = "night"
            default_grid = "thirds"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.facing, FacingMode::User);
        assert_eq!(config.camera.ideal_width, 1920);
        assert_eq!(config.resolver.interval_ms, 1000);
        assert_eq!(config.resolver.warmup_ms, 500);
        assert_eq!(config.classifier.provider, ClassifierProvider::Offline);
        assert_eq!(config.session.default_scene, SceneId::Night);
        assert_eq!(config.session.default_grid, GridType::Thirds);
    }

    #[test]
    fn test_resolver_conversion_clamps() {
        let settings = ResolverSettings {
            interval_ms: 0,
            sample_quality: 0,
            ..ResolverSettings::default()
        };
        let resolver = settings.to_resolver_config();
        assert_eq!(resolver.interval, Duration::from_millis(1));
        assert_eq!(resolver.sample_quality, 1);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.capture.gallery_dir = dir.path().join("gallery");
        config.capture.flash_ms = 80;
        config.camera.source = Some(PathBuf::from("frames"));
        config.session.default_scene = SceneId::Portrait;
        config.session.default_grid = GridType::Golden;
        config.capture.storage_quota_bytes = 0;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::FileNotFound(_))
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "[resolver\ninterval_ms = ").unwrap();
        let err = Config::load(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_, _)));
        assert!(err.to_string().contains("broken.toml"));
    }
}

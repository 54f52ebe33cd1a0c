use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::config::Source;
use crate::icons::LOCAL_ICON_DIR;
use crate::theme::ColorScheme;
use crate::variant::{self, IconSource, Variant};

pub const DEFAULT_PATH: &str = "linkpage.toml";
pub const DEFAULT_PAGE_URL: &str = "http://localhost/";
pub const DEFAULT_PREFS: &str = ".linkpage/prefs.json";
pub const DEFAULT_OUTPUT: &str = "index.html";

/// Pipeline settings from `linkpage.toml`. Every field is optional; command
/// line flags override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub variant: Option<String>,
    /// Config document location: URL or file path.
    pub config: Option<String>,
    pub page_url: Option<String>,
    pub prefs: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub icon_source: Option<IconSource>,
    pub icon_dir: Option<PathBuf>,
    pub color_scheme: Option<ColorScheme>,
}

/// Load settings from `path`. A missing file means defaults.
pub fn load(path: &Path) -> Result<Settings, String> {
    if !path.exists() {
        debug!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let settings = parse(&text).map_err(|e| format!("{}: {}", path.display(), e))?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn parse(text: &str) -> Result<Settings, String> {
    toml::from_str(text).map_err(|e| e.to_string())
}

impl Settings {
    pub fn variant(&self) -> Result<&'static Variant, String> {
        match &self.variant {
            None => Ok(&variant::CLASSIC),
            Some(name) => variant::by_name(name).ok_or_else(|| {
                let known: Vec<&str> = variant::PRESETS.iter().map(|v| v.name).collect();
                format!("unknown variant {:?} (expected one of: {})", name, known.join(", "))
            }),
        }
    }

    /// Where to load the config document from; defaults to the preset's path.
    pub fn source(&self, variant: &Variant) -> Source {
        Source::parse(self.config.as_deref().unwrap_or(variant.config_path))
    }

    pub fn page_url(&self) -> &str {
        self.page_url.as_deref().unwrap_or(DEFAULT_PAGE_URL)
    }

    pub fn prefs(&self) -> PathBuf {
        self.prefs.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PREFS))
    }

    pub fn output(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.icon_dir.clone().unwrap_or_else(|| PathBuf::from(LOCAL_ICON_DIR))
    }

    /// Explicit setting first, then the config document, then the CDN.
    pub fn icon_source(&self, configured: Option<IconSource>) -> IconSource {
        self.icon_source.or(configured).unwrap_or_default()
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme.unwrap_or_default()
    }
}

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::page::Page;
use crate::store::PreferenceStore;
use crate::variant::StorageKeys;

/// Root class set while a custom background is showing.
pub const ACTIVE_CLASS: &str = "has-bg-image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    #[default]
    Cover,
    Contain,
}

impl Fit {
    pub fn as_css(self) -> &'static str {
        match self {
            Fit::Cover => "cover",
            Fit::Contain => "contain",
        }
    }
}

/// Background descriptor. Plain strings normalize to `{ image }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub image: String,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
}

impl Background {
    pub fn from_image(image: &str) -> Self {
        Background {
            image: image.to_string(),
            fit: Fit::Cover,
            position: None,
            blur: None,
            overlay: None,
        }
    }

    /// Read a background from a config value: a string, or an object with
    /// `image`/`url`/`src` plus optional `fit`, `position`, `blur`, `overlay`.
    /// Anything without a usable image is `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::from_image(s.trim())),
            Value::Object(obj) => {
                let image = ["image", "url", "src"]
                    .iter()
                    .filter_map(|k| obj.get(*k).and_then(|v| v.as_str()))
                    .map(str::trim)
                    .find(|s| !s.is_empty())?;

                let fit = match obj.get("fit").and_then(|v| v.as_str()) {
                    Some("contain") => Fit::Contain,
                    _ => Fit::Cover,
                };
                let position = obj
                    .get("position")
                    .and_then(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
                let blur = obj.get("blur").filter(|v| !v.is_null()).map(blur_px);
                let overlay = obj.get("overlay").and_then(scalar_text);

                Some(Background {
                    image: image.to_string(),
                    fit,
                    position,
                    blur,
                    overlay,
                })
            }
            _ => None,
        }
    }

    /// Decode a stored preference: a JSON descriptor or a bare image string.
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.starts_with('{') {
            if let Ok(v) = serde_json::from_str::<Value>(raw) {
                return Self::from_value(&v);
            }
        }
        Some(Self::from_image(raw))
    }

    /// Encode for storage. Image-only descriptors stay a bare string.
    pub fn to_stored(&self) -> String {
        if self.is_image_only() {
            return self.image.clone();
        }
        serde_json::to_string(self).unwrap_or_else(|_| self.image.clone())
    }

    pub fn is_image_only(&self) -> bool {
        self.fit == Fit::Cover
            && self.position.is_none()
            && self.blur.is_none()
            && self.overlay.is_none()
    }

    pub fn is_data_url(&self) -> bool {
        self.image.starts_with("data:")
    }

    /// Computed inline style for the background layer, in application order.
    pub fn style(&self) -> Vec<(&'static str, String)> {
        let mut props = vec![
            ("background-image", css_url(&self.image)),
            ("background-size", self.fit.as_css().to_string()),
        ];
        if let Some(pos) = &self.position {
            props.push(("background-position", pos.clone()));
        }
        if let Some(blur) = self.blur {
            props.push(("--bg-blur", format!("{}px", blur)));
        }
        if let Some(overlay) = &self.overlay {
            props.push(("--overlay", overlay.clone()));
        }
        props
    }
}

/// Style properties this module may have written on the layer.
const LAYER_PROPS: &[&str] = &[
    "background-image",
    "background-size",
    "background-position",
    "--bg-blur",
    "--overlay",
];

/// `url('…')` with backslashes and single quotes escaped. Line breaks cannot
/// appear in a quoted CSS string and are dropped.
pub fn css_url(image: &str) -> String {
    let escaped: String = image
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\x0c'))
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('\'', "\\'");
    format!("url('{}')", escaped)
}

fn blur_px(v: &Value) -> f64 {
    let n = match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Paint `bg` onto the page, replacing whatever was there.
pub fn apply(page: &mut Page, bg: &Background) {
    clear(page);
    for (prop, value) in bg.style() {
        page.background.set_style(prop, &value);
    }
    page.background.hidden = false;
    page.root.add_class(ACTIVE_CLASS);
}

/// Remove the applied background from the page (storage untouched).
pub fn clear(page: &mut Page) {
    for prop in LAYER_PROPS {
        page.background.remove_style(prop);
    }
    page.background.hidden = true;
    page.root.remove_class(ACTIVE_CLASS);
}

/// Effective background: a stored preference wins outright over the config.
pub fn resolve(
    store: &dyn PreferenceStore,
    keys: &StorageKeys,
    configured: Option<&Background>,
) -> Option<Background> {
    for key in keys.background_keys() {
        if let Some(bg) = store.get_non_empty(key).and_then(|raw| Background::from_stored(&raw)) {
            return Some(bg);
        }
    }
    configured.cloned()
}

/// Persist a preference. With a separate URL key, uploads and links each
/// evict the other.
pub fn persist(
    store: &dyn PreferenceStore,
    keys: &StorageKeys,
    bg: &Background,
) -> Result<(), String> {
    let value = bg.to_stored();
    match keys.background_url {
        Some(url_key) if !bg.is_data_url() => {
            store.remove(keys.background)?;
            store.set(url_key, &value)
        }
        Some(url_key) => {
            store.remove(url_key)?;
            store.set(keys.background, &value)
        }
        None => store.set(keys.background, &value),
    }
}

pub fn forget(store: &dyn PreferenceStore, keys: &StorageKeys) -> Result<(), String> {
    for key in keys.background_keys() {
        store.remove(key)?;
    }
    Ok(())
}

/// Validate a user-typed image URL, resolving it against the page URL the
/// way a browser would. Blank input is `Ok(None)`.
pub fn parse_url(input: &str, base: Option<&str>) -> Result<Option<String>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let parsed = match base.and_then(|b| Url::parse(b).ok()) {
        Some(base) => base.join(input),
        None => Url::parse(input),
    };
    parsed
        .map(|u| Some(u.to_string()))
        .map_err(|e| format!("invalid URL {:?}: {}", input, e))
}

/// Read a local image file into a `data:` URL.
pub fn read_data_url(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let mime = mime_for(&bytes, path);
    info!("Read {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(data_url(mime, &bytes))
}

pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Sniff the image format, falling back to the file extension.
pub fn mime_for(bytes: &[u8], path: &Path) -> &'static str {
    match image::guess_format(bytes) {
        Ok(format) => format.to_mime_type(),
        Err(_) => {
            let name = path.to_string_lossy();
            let mime = mime_from_extension(&name);
            if mime == "application/octet-stream" {
                warn!("Could not determine image type of {}", name);
            }
            mime
        }
    }
}

fn mime_from_extension(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

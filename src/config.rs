use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{info, warn};
use serde_json::{json, Value};

use crate::background::Background;
use crate::variant::{IconSource, Schema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub handle: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub verified: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_image: Option<String>,
    pub share_url: Option<String>,
    pub theme: Option<String>,
    pub accent_color: Option<String>,
    pub background: Option<Background>,
    pub icon_source: Option<IconSource>,
}

/// One outbound link as declared. `url` may be empty; such entries are
/// dropped at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkEntry {
    pub url: String,
    pub label: Option<String>,
    pub kind: Option<String>,
}

/// The site configuration after the single normalization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub profile: Profile,
    pub site: Site,
    pub links: Vec<LinkEntry>,
}

/// Where the configuration document lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    pub fn parse(location: &str) -> Self {
        let lower = location.trim().to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(location.trim().to_string())
        } else {
            Source::Path(PathBuf::from(location.trim()))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(u) => write!(f, "{}", u),
            Source::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Load and normalize the configuration. Never fails: any transport, status
/// or parse error yields the built-in fallback document.
pub fn load(source: &Source, schema: Schema) -> Config {
    match fetch(source) {
        Ok(doc) => {
            info!("Loaded configuration from {}", source);
            normalize(&doc, schema)
        }
        Err(e) => {
            warn!("Could not load {}, using the default configuration: {}", source, e);
            fallback()
        }
    }
}

/// Retrieve the raw document. Caching is disabled for remote sources.
pub fn fetch(source: &Source) -> Result<Value, String> {
    let body = match source {
        Source::Url(url) => {
            // no deadline: a hung fetch leaves the page in its pre-load state
            let client = reqwest::blocking::Client::builder()
                .timeout(None::<Duration>)
                .build()
                .map_err(|e| e.to_string())?;
            let resp = client
                .get(url)
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache")
                .send()
                .map_err(|e| e.to_string())?;
            if !resp.status().is_success() {
                return Err(format!("HTTP {}", resp.status()));
            }
            resp.text().map_err(|e| e.to_string())?
        }
        Source::Path(path) => fs::read_to_string(path).map_err(|e| e.to_string())?,
    };
    parse(&body)
}

/// Parse a document body. Only a JSON object counts as a configuration.
pub fn parse(body: &str) -> Result<Value, String> {
    let doc: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    if !doc.is_object() {
        return Err("configuration is not a JSON object".to_string());
    }
    Ok(doc)
}

/// Fold a raw document into `Config`. Missing, empty or wrong-typed fields
/// are absent; nothing here can fail.
pub fn normalize(doc: &Value, schema: Schema) -> Config {
    let (profile, site) = match schema {
        Schema::Nested => {
            let p = doc.get("profile").unwrap_or(&Value::Null);
            let s = doc.get("site").unwrap_or(&Value::Null);
            let profile = Profile {
                name: text(p, "name"),
                handle: text(p, "username").or_else(|| text(p, "handle")),
                bio: text(p, "bio"),
                avatar: text(p, "avatar"),
                verified: p.get("verified").map(truthy).unwrap_or(false),
                location: text(p, "location"),
            };
            let site = Site {
                title: text(s, "title"),
                description: text(s, "description"),
                og_image: text(s, "ogImage"),
                share_url: text(s, "shareUrl"),
                theme: text(s, "theme"),
                accent_color: text(s, "accentColor"),
                background: s
                    .get("background")
                    .and_then(Background::from_value)
                    .or_else(|| s.get("backgroundImage").and_then(Background::from_value)),
                icon_source: text(s, "iconSource").and_then(|v| IconSource::parse(&v)),
            };
            (profile, site)
        }
        Schema::Flat => {
            let profile = Profile {
                name: text(doc, "name"),
                handle: text(doc, "handle").or_else(|| text(doc, "username")),
                bio: text(doc, "bio"),
                avatar: text(doc, "avatar"),
                verified: doc.get("verified").map(truthy).unwrap_or(false),
                location: text(doc, "location"),
            };
            let site = Site {
                title: text(doc, "title"),
                description: text(doc, "description"),
                og_image: text(doc, "ogImage"),
                share_url: text(doc, "shareUrl"),
                theme: text(doc, "theme").or_else(|| text(doc, "defaultTheme")),
                accent_color: text(doc, "accentColor"),
                background: doc.get("background").and_then(Background::from_value),
                icon_source: text(doc, "iconSource").and_then(|v| IconSource::parse(&v)),
            };
            (profile, site)
        }
    };

    let links = match doc.get("links") {
        Some(Value::Array(items)) => items.iter().map(link_entry).collect(),
        _ => Vec::new(),
    };

    Config {
        profile,
        site,
        links,
    }
}

fn link_entry(item: &Value) -> LinkEntry {
    LinkEntry {
        url: text(item, "url").map(|u| u.trim().to_string()).unwrap_or_default(),
        label: text(item, "label").or_else(|| text(item, "title")),
        kind: text(item, "type").or_else(|| text(item, "icon")),
    }
}

/// Non-empty string field, or `None`.
fn text(v: &Value, key: &str) -> Option<String> {
    v.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// The document used whenever the real one cannot be loaded.
pub fn fallback_document() -> Value {
    json!({
        "name": "Ваш ник",
        "bio": "Короткое био — кто вы и чем занимаетесь",
        "avatar": "assets/images/avatar.jpg",
        "background": "",
        "links": [
            { "type": "telegram", "url": "https://t.me/username" },
            { "type": "instagram", "url": "https://instagram.com/username" },
            { "type": "x", "url": "https://x.com/username" },
            { "type": "github", "url": "https://github.com/username" },
            { "type": "youtube", "url": "https://youtube.com/@username" },
            { "type": "email", "url": "mailto:you@example.com" }
        ]
    })
}

pub fn fallback() -> Config {
    normalize(&fallback_document(), Schema::Flat)
}

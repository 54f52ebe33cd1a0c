use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use url::Url;

use crate::svg_sanitizer::sanitize_icon;
use crate::variant::IconSource;

pub const SIMPLE_ICONS_BASE: &str = "https://cdn.simpleicons.org/";
pub const TABLER_CDN_BASE: &str = "https://unpkg.com/@tabler/icons@2.47.0/icons";
pub const LOCAL_ICON_DIR: &str = "assets/icons";

/// Glyph for link types the table does not know.
pub const GENERIC_GLYPH: &str = "external-link";

pub const MAIL_SVG: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.6" aria-hidden="true"><rect x="3" y="5" width="18" height="14" rx="2"/><path d="m3 7 9 6 9-6"/></svg>"#;

pub const CHAIN_SVG: &str = r#"<svg width="24" height="24" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.6" aria-hidden="true"><path d="M10.5 13.5 9 15a5 5 0 0 1-7-7l2-2a5 5 0 0 1 7 7"/><path d="M13.5 10.5 15 9a5 5 0 1 1 7 7l-2 2a5 5 0 0 1-7-7"/></svg>"#;

/// (normalized type, display name, glyph)
const KNOWN_TYPES: &[(&str, &str, &str)] = &[
    ("telegram", "Telegram", "brand-telegram"),
    ("instagram", "Instagram", "brand-instagram"),
    ("x", "X (Twitter)", "brand-x"),
    ("github", "GitHub", "brand-github"),
    ("youtube", "YouTube", "brand-youtube"),
    ("whatsapp", "WhatsApp", "brand-whatsapp"),
    ("vk", "VK", "brand-vk"),
    ("tiktok", "TikTok", "brand-tiktok"),
    ("discord", "Discord", "brand-discord"),
    ("mail", "Email", "mail"),
    ("website", "Сайт", "world"),
    ("link", "Ссылка", "link"),
];

/// Lowercase, trim and collapse aliases. Blank means the generic `link`.
pub fn normalize_type(raw: Option<&str>) -> String {
    let t = raw.unwrap_or("").trim().to_lowercase();
    match t.as_str() {
        "" => "link".to_string(),
        "twitter" => "x".to_string(),
        "email" | "e-mail" => "mail".to_string(),
        "site" | "web" | "www" | "globe" => "website".to_string(),
        _ => t,
    }
}

pub fn display_name(kind: &str) -> Option<&'static str> {
    KNOWN_TYPES
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, name, _)| *name)
}

pub fn glyph(kind: &str) -> &'static str {
    KNOWN_TYPES
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, _, g)| *g)
        .unwrap_or(GENERIC_GLYPH)
}

/// How one link's icon is drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// Trusted inline SVG markup (built in or sanitized).
    Svg(String),
    /// Remote image badge.
    Image { src: String },
    /// Icon-font class list.
    Font { class: String },
    /// First-letter placeholder when nothing else is available.
    Letter(char),
}

/// Badge strategy: inline SVG for mail and plain links, Simple Icons keyed by
/// the type name for everything else.
pub fn badge(kind: &str) -> Icon {
    match kind {
        "mail" => Icon::Svg(MAIL_SVG.to_string()),
        "link" | "website" => Icon::Svg(CHAIN_SVG.to_string()),
        _ => match simple_icons_url(kind) {
            Some(src) => Icon::Image { src },
            None => Icon::Svg(CHAIN_SVG.to_string()),
        },
    }
}

/// `https://cdn.simpleicons.org/<kind>/ffffff` with `kind` percent-encoded.
pub fn simple_icons_url(kind: &str) -> Option<String> {
    let mut url = Url::parse(SIMPLE_ICONS_BASE).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(kind).push("ffffff");
    Some(url.to_string())
}

pub fn font(kind: &str) -> Icon {
    Icon::Font {
        class: format!("ti ti-{}", glyph(kind)),
    }
}

pub fn letter(label: &str) -> Icon {
    let c = label
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('•');
    Icon::Letter(c)
}

/// Retrieves raw SVG markup for a glyph name.
pub trait IconFetcher: Send + Sync {
    fn fetch(&self, glyph: &str) -> Result<String, String>;

    /// Whether fetched icons need `stroke="currentColor"` forced on the root.
    fn forces_current_color(&self) -> bool {
        false
    }
}

/// Icons from the public Tabler CDN.
pub struct CdnFetcher {
    client: reqwest::blocking::Client,
    base: String,
}

impl CdnFetcher {
    pub fn new(base: &str) -> Result<Self, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| e.to_string())?;
        Ok(CdnFetcher {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }
}

impl IconFetcher for CdnFetcher {
    fn fetch(&self, glyph: &str) -> Result<String, String> {
        let url = format!("{}/{}.svg", self.base, glyph);
        let resp = self.client.get(&url).send().map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {} for {}", resp.status(), url));
        }
        resp.text().map_err(|e| e.to_string())
    }
}

/// Icons from `<dir>/<glyph>.svg` on disk.
pub struct LocalFetcher {
    dir: PathBuf,
}

impl LocalFetcher {
    pub fn new(dir: &Path) -> Self {
        LocalFetcher {
            dir: dir.to_path_buf(),
        }
    }
}

impl IconFetcher for LocalFetcher {
    fn fetch(&self, glyph: &str) -> Result<String, String> {
        if glyph.contains('/') || glyph.contains('\\') || glyph.contains("..") {
            return Err(format!("refusing icon name {:?}", glyph));
        }
        let path = self.dir.join(format!("{}.svg", glyph));
        fs::read_to_string(&path).map_err(|e| format!("{}: {}", path.display(), e))
    }

    fn forces_current_color(&self) -> bool {
        true
    }
}

pub fn fetcher_for(source: IconSource, dir: &Path) -> Result<Box<dyn IconFetcher>, String> {
    Ok(match source {
        IconSource::Cdn => Box::new(CdnFetcher::new(TABLER_CDN_BASE)?),
        IconSource::Local => Box::new(LocalFetcher::new(dir)),
    })
}

/// Upper bound on icon requests in flight at once.
pub const MAX_ICON_WORKERS: usize = 8;

/// Fetch and sanitize every glyph, at most `MAX_ICON_WORKERS` at a time. The
/// result lines up with `glyphs`; a failed icon is `None` and never affects
/// the others.
pub fn fetch_all(glyphs: &[&str], fetcher: &dyn IconFetcher) -> Vec<Option<String>> {
    let mut out = Vec::with_capacity(glyphs.len());
    for batch in glyphs.chunks(MAX_ICON_WORKERS) {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|glyph| scope.spawn(move || fetch_one(fetcher, glyph)))
                .collect();
            out.extend(handles.into_iter().map(|h| h.join().unwrap_or(None)));
        });
    }
    out
}

fn fetch_one(fetcher: &dyn IconFetcher, glyph: &str) -> Option<String> {
    let raw = match fetcher.fetch(glyph) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Icon load error {}: {}", glyph, e);
            return None;
        }
    };
    match sanitize_icon(&raw, fetcher.forces_current_color()) {
        Some(svg) => {
            debug!("Loaded icon {}", glyph);
            Some(svg)
        }
        None => {
            warn!("Icon {} is not usable SVG", glyph);
            None
        }
    }
}

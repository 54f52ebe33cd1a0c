use serde::Deserialize;

use crate::page::ButtonId;

/// Which field layout the site configuration document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// `{ profile: {...}, site: {...}, links: [...] }`
    Nested,
    /// `{ name, bio, avatar, theme, background, links: [...] }`
    Flat,
}

/// Where the active theme is marked on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMarker {
    /// `data-theme="<name>"` on the root element.
    RootAttribute,
    /// `theme-<name>` class on the root element.
    RootClass,
    /// `theme-<name>` class on the body element.
    BodyClass,
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeSet {
    pub names: &'static [&'static str],
    /// Order the theme button walks through; wraps around.
    pub cycle: &'static [&'static str],
    pub fallback: &'static str,
    /// Theme that defers to the OS color-scheme preference, if the set has one.
    pub follows_os: Option<&'static str>,
    /// Themes painted on a dark surface.
    pub dark: &'static [&'static str],
    pub marker: ThemeMarker,
    /// Whether the page shows one swatch per theme.
    pub swatches: bool,
}

impl ThemeSet {
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.names.iter().copied().find(|n| *n == name)
    }
}

/// Storage keys for persisted preferences.
#[derive(Debug, Clone, Copy)]
pub struct StorageKeys {
    pub theme: &'static str,
    /// Background preference. When `background_url` is set this key only
    /// holds data-URLs (uploads).
    pub background: &'static str,
    pub background_url: Option<&'static str>,
}

impl StorageKeys {
    pub fn background_keys(&self) -> Vec<&'static str> {
        let mut keys = vec![self.background];
        keys.extend(self.background_url);
        keys
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconStrategy {
    /// Inline SVG for mail/link, image badge from the Simple Icons CDN otherwise.
    Badge,
    /// Icon-font class names.
    Font,
    /// SVG markup fetched per icon and inlined.
    RemoteSvg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSource {
    #[default]
    Cdn,
    Local,
}

impl IconSource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cdn" => Some(IconSource::Cdn),
            "local" => Some(IconSource::Local),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Full-width rows with icon and label.
    List,
    /// Icon-only tiles; the label moves to `title`/`aria-label`.
    Tiles,
}

/// One flavour of the page. The three presets differ only in data here.
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub name: &'static str,
    pub config_path: &'static str,
    pub schema: Schema,
    pub theme: ThemeSet,
    pub keys: StorageKeys,
    pub icons: IconStrategy,
    pub layout: Layout,
    /// Tile tooltips read `Label • url` instead of just the label.
    pub tooltip_with_url: bool,
    pub buttons: &'static [ButtonId],
    pub settings_panel: bool,
    pub default_name: &'static str,
    pub default_bio: &'static str,
    pub default_avatar: &'static str,
    pub empty_hint: Option<&'static str>,
}

pub const CLASSIC: Variant = Variant {
    name: "classic",
    config_path: "data.json",
    schema: Schema::Nested,
    theme: ThemeSet {
        names: &["auto", "light", "dark"],
        cycle: &["auto", "dark", "light"],
        fallback: "auto",
        follows_os: Some("auto"),
        dark: &["dark"],
        marker: ThemeMarker::RootAttribute,
        swatches: false,
    },
    keys: StorageKeys {
        theme: "theme",
        background: "bioBg",
        background_url: None,
    },
    icons: IconStrategy::Badge,
    layout: Layout::List,
    tooltip_with_url: false,
    buttons: &[ButtonId::Share, ButtonId::Copy, ButtonId::Theme],
    settings_panel: false,
    default_name: "Профиль",
    default_bio: "",
    default_avatar: "assets/images/avatar.jpg",
    empty_hint: None,
};

pub const TILES: Variant = Variant {
    name: "tiles",
    config_path: "data/config.json",
    schema: Schema::Flat,
    theme: ThemeSet {
        names: &["acid", "pink", "neon"],
        cycle: &["acid", "pink", "neon"],
        fallback: "pink",
        follows_os: None,
        dark: &["acid", "pink", "neon"],
        marker: ThemeMarker::RootClass,
        swatches: true,
    },
    keys: StorageKeys {
        theme: "theme",
        background: "bioBg",
        background_url: None,
    },
    icons: IconStrategy::Font,
    layout: Layout::Tiles,
    tooltip_with_url: true,
    buttons: &[
        ButtonId::BackgroundUpload,
        ButtonId::BackgroundLink,
        ButtonId::BackgroundReset,
    ],
    settings_panel: false,
    default_name: "Ваш ник",
    default_bio: "Короткое био — кто вы и чем занимаетесь",
    default_avatar: "assets/images/avatar.jpg",
    empty_hint: Some("Добавьте ссылки в data/config.json (поле \"links\")."),
};

pub const PANEL: Variant = Variant {
    name: "panel",
    config_path: "config.json",
    schema: Schema::Flat,
    theme: ThemeSet {
        names: &["acid", "pinkpurple", "neon"],
        cycle: &["acid", "pinkpurple", "neon"],
        fallback: "acid",
        follows_os: None,
        dark: &["acid", "pinkpurple", "neon"],
        marker: ThemeMarker::BodyClass,
        swatches: true,
    },
    keys: StorageKeys {
        theme: "bio_theme",
        background: "bio_custom_bg",
        background_url: Some("bio_custom_bg_url"),
    },
    icons: IconStrategy::RemoteSvg,
    layout: Layout::Tiles,
    tooltip_with_url: false,
    buttons: &[ButtonId::Settings, ButtonId::BackgroundReset],
    settings_panel: true,
    default_name: "Имя",
    default_bio: "",
    default_avatar: "assets/images/avatar.jpg",
    empty_hint: None,
};

pub const PRESETS: &[&Variant] = &[&CLASSIC, &TILES, &PANEL];

pub fn by_name(name: &str) -> Option<&'static Variant> {
    let wanted = name.trim().to_lowercase();
    PRESETS.iter().copied().find(|v| v.name == wanted)
}

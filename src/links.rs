use url::Url;

use crate::config::LinkEntry;
use crate::icons::{self, Icon, IconFetcher};
use crate::page::Page;
use crate::variant::{IconStrategy, Variant};

/// View-model for one rendered link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkView {
    pub href: String,
    pub label: String,
    /// `title`/`aria-label` text.
    pub tooltip: String,
    /// Normalized link type.
    pub kind: String,
    pub icon: Icon,
    pub external: bool,
}

impl LinkView {
    pub fn target(&self) -> &'static str {
        if self.external {
            "_blank"
        } else {
            "_self"
        }
    }

    pub fn rel(&self) -> Option<&'static str> {
        self.external.then_some("noopener noreferrer")
    }
}

/// `http`/`https` URLs open in a new browsing context.
pub fn is_external(url: &str) -> bool {
    Url::parse(url)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Explicit label, else the type's display name (or the type itself,
/// capitalized), else the raw URL.
pub fn label_for(entry: &LinkEntry, kind: &str) -> String {
    if let Some(label) = &entry.label {
        return label.clone();
    }
    if entry.kind.is_some() {
        if let Some(name) = icons::display_name(kind) {
            return name.to_string();
        }
        return capitalize(kind);
    }
    entry.url.clone()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Map declared entries to view-models in declaration order. Entries without
/// a URL are dropped. Remote icons are fetched concurrently; a failed fetch
/// degrades to a first-letter badge.
pub fn build(
    entries: &[LinkEntry],
    variant: &Variant,
    fetcher: Option<&dyn IconFetcher>,
) -> Vec<LinkView> {
    let kept: Vec<&LinkEntry> = entries.iter().filter(|e| !e.url.trim().is_empty()).collect();
    let kinds: Vec<String> = kept
        .iter()
        .map(|e| icons::normalize_type(e.kind.as_deref()))
        .collect();

    let mut fetched: Vec<Option<String>> = match (variant.icons, fetcher) {
        (IconStrategy::RemoteSvg, Some(fetcher)) => {
            let glyphs: Vec<&str> = kinds.iter().map(|k| icons::glyph(k)).collect();
            icons::fetch_all(&glyphs, fetcher)
        }
        _ => vec![None; kept.len()],
    };

    kept.iter()
        .zip(kinds)
        .enumerate()
        .map(|(i, (entry, kind))| {
            let href = entry.url.trim().to_string();
            let label = label_for(entry, &kind);
            let tooltip = if variant.tooltip_with_url {
                format!("{} • {}", label, href)
            } else {
                label.clone()
            };
            let icon = match variant.icons {
                IconStrategy::Badge => icons::badge(&kind),
                IconStrategy::Font => icons::font(&kind),
                IconStrategy::RemoteSvg => match fetched[i].take() {
                    Some(svg) => Icon::Svg(svg),
                    None => icons::letter(&label),
                },
            };
            LinkView {
                external: is_external(&href),
                href,
                label,
                tooltip,
                kind,
                icon,
            }
        })
        .collect()
}

/// Replace the page's link list. An empty declaration shows the variant's
/// hint, if it has one.
pub fn apply(
    page: &mut Page,
    entries: &[LinkEntry],
    variant: &Variant,
    fetcher: Option<&dyn IconFetcher>,
) {
    page.links = build(entries, variant, fetcher);
    page.empty_hint = if entries.is_empty() {
        variant.empty_hint.map(str::to_string)
    } else {
        None
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::tests::StubFetcher;
    use crate::variant::{CLASSIC, PANEL, TILES};
    use std::collections::HashMap;

    fn entry(url: &str, label: Option<&str>, kind: Option<&str>) -> LinkEntry {
        LinkEntry {
            url: url.to_string(),
            label: label.map(str::to_string),
            kind: kind.map(str::to_string),
        }
    }

    #[test]
    fn test_is_external() {
        assert!(is_external("https://x.com/a"));
        assert!(is_external("HTTP://example.com"));
        assert!(!is_external("mailto:a@b.c"));
        assert!(!is_external("tel:+100"));
        assert!(!is_external("/relative"));
        assert!(!is_external("httpfoo"));
    }

    #[test]
    fn test_label_precedence() {
        assert_eq!(label_for(&entry("u", Some("Mine"), Some("x")), "x"), "Mine");
        assert_eq!(label_for(&entry("u", None, Some("twitter")), "x"), "X (Twitter)");
        assert_eq!(label_for(&entry("u", None, Some("mastodon")), "mastodon"), "Mastodon");
        assert_eq!(label_for(&entry("https://a.example", None, None), "link"), "https://a.example");
    }

    #[test]
    fn test_entries_without_url_are_dropped_in_order() {
        let entries = vec![
            entry("https://a.example", None, Some("github")),
            entry("", Some("nothing"), Some("x")),
            entry("   ", None, None),
            entry("mailto:me@e.com", None, Some("email")),
            entry("https://a.example", None, Some("github")),
        ];
        let views = build(&entries, &CLASSIC, None);
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].kind, "github");
        assert_eq!(views[1].kind, "mail");
        // duplicates are kept
        assert_eq!(views[2].href, views[0].href);
    }

    #[test]
    fn test_targets() {
        let views = build(
            &[
                entry("https://x.com/a", None, Some("x")),
                entry("mailto:me@e.com", None, Some("mail")),
            ],
            &CLASSIC,
            None,
        );
        assert_eq!(views[0].target(), "_blank");
        assert_eq!(views[0].rel(), Some("noopener noreferrer"));
        assert_eq!(views[1].target(), "_self");
        assert_eq!(views[1].rel(), None);
    }

    #[test]
    fn test_tiles_tooltip_and_font_icon() {
        let views = build(&[entry("https://t.me/me", None, Some("telegram"))], &TILES, None);
        assert_eq!(views[0].tooltip, "Telegram • https://t.me/me");
        assert_eq!(
            views[0].icon,
            Icon::Font {
                class: "ti ti-brand-telegram".to_string()
            }
        );
    }

    #[test]
    fn test_remote_icons_degrade_to_letter() {
        let mut icons = HashMap::new();
        icons.insert("brand-github", r#"<svg viewBox="0 0 24 24"><path d="M9 19"/></svg>"#);
        let fetcher = StubFetcher { icons };
        let views = build(
            &[
                entry("https://github.com/me", None, Some("github")),
                entry("https://vk.com/me", Some("vk page"), Some("vk")),
            ],
            &PANEL,
            Some(&fetcher as &dyn IconFetcher),
        );
        assert!(matches!(&views[0].icon, Icon::Svg(s) if s.contains("M9 19")));
        assert_eq!(views[1].icon, Icon::Letter('V'));

        let offline = build(&[entry("https://github.com/me", None, Some("github"))], &PANEL, None);
        assert_eq!(offline[0].icon, Icon::Letter('G'));
    }

    #[test]
    fn test_empty_hint_only_for_empty_declaration() {
        let mut page = Page::new(&TILES);
        apply(&mut page, &[], &TILES, None);
        assert!(page.links.is_empty());
        assert!(page.empty_hint.as_deref().unwrap().contains("links"));

        apply(&mut page, &[entry("https://a.example", None, None)], &TILES, None);
        assert_eq!(page.links.len(), 1);
        assert!(page.empty_hint.is_none());

        let mut classic = Page::new(&CLASSIC);
        apply(&mut classic, &[], &CLASSIC, None);
        assert!(classic.empty_hint.is_none());
    }
}

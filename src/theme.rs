use crate::page::Page;
use crate::variant::{ThemeMarker, ThemeSet};

/// `theme-color` meta values.
pub const DARK_META: &str = "#0b0b0f";
pub const LIGHT_META: &str = "#ffffff";

/// The visitor's OS color-scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(ColorScheme::Light),
            "dark" => Some(ColorScheme::Dark),
            _ => None,
        }
    }
}

/// Map a requested name onto the set; anything unknown or absent becomes
/// the fallback.
pub fn validate(set: &ThemeSet, name: Option<&str>) -> &'static str {
    name.and_then(|n| set.get(n.trim())).unwrap_or(set.fallback)
}

/// Effective theme: stored preference, then the configured default, then
/// the fallback. The first candidate that names a real theme wins.
pub fn resolve(set: &ThemeSet, stored: Option<&str>, configured: Option<&str>) -> &'static str {
    stored
        .and_then(|s| set.get(s.trim()))
        .or_else(|| configured.and_then(|c| set.get(c.trim())))
        .unwrap_or(set.fallback)
}

/// The theme after `current` in the set's cycle order.
pub fn next(set: &ThemeSet, current: &str) -> &'static str {
    match set.cycle.iter().position(|t| *t == current) {
        Some(i) => set.cycle[(i + 1) % set.cycle.len()],
        None => set.cycle.first().copied().unwrap_or(set.fallback),
    }
}

pub fn is_dark(set: &ThemeSet, name: &str, scheme: ColorScheme) -> bool {
    if set.follows_os == Some(name) {
        return scheme == ColorScheme::Dark;
    }
    set.dark.contains(&name)
}

/// Make `name` (or the fallback) the single active theme marker, refresh
/// the `theme-color` meta and the swatch highlight. Returns the theme that
/// was actually applied.
pub fn apply(page: &mut Page, set: &ThemeSet, name: Option<&str>, scheme: ColorScheme) -> &'static str {
    let theme = validate(set, name);

    match set.marker {
        ThemeMarker::RootAttribute => page.root.set_attr("data-theme", theme),
        ThemeMarker::RootClass | ThemeMarker::BodyClass => {
            let el = if set.marker == ThemeMarker::RootClass {
                &mut page.root
            } else {
                &mut page.body
            };
            for t in set.names {
                el.remove_class(&format!("theme-{}", t));
            }
            el.add_class(&format!("theme-{}", theme));
        }
    }

    page.theme_color = if is_dark(set, theme, scheme) {
        DARK_META.to_string()
    } else {
        LIGHT_META.to_string()
    };

    for swatch in page.swatches.iter_mut() {
        swatch.active = swatch.theme == theme;
    }

    theme
}

/// Active theme markers currently on the page.
pub fn markers(page: &Page, set: &ThemeSet) -> Vec<String> {
    match set.marker {
        ThemeMarker::RootAttribute => page.root.attr("data-theme").map(str::to_string).into_iter().collect(),
        ThemeMarker::RootClass => theme_classes(&page.root.classes),
        ThemeMarker::BodyClass => theme_classes(&page.body.classes),
    }
}

/// Set or clear the `--accent` custom property on the root.
pub fn apply_accent(page: &mut Page, accent: Option<&str>) {
    match accent.map(str::trim).filter(|a| !a.is_empty()) {
        Some(color) => page.root.set_style("--accent", color),
        None => page.root.remove_style("--accent"),
    }
}

fn theme_classes(classes: &std::collections::BTreeSet<String>) -> Vec<String> {
    classes
        .iter()
        .filter(|c| c.starts_with("theme-"))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{CLASSIC, PANEL, TILES};

    #[test]
    fn test_validate_maps_unknown_to_fallback() {
        assert_eq!(validate(&CLASSIC.theme, Some("dark")), "dark");
        assert_eq!(validate(&CLASSIC.theme, Some("sepia")), "auto");
        assert_eq!(validate(&CLASSIC.theme, None), "auto");
        assert_eq!(validate(&TILES.theme, Some("light")), "pink");
    }

    #[test]
    fn test_resolution_precedence() {
        let set = &CLASSIC.theme;
        assert_eq!(resolve(set, Some("light"), Some("dark")), "light");
        assert_eq!(resolve(set, None, Some("dark")), "dark");
        assert_eq!(resolve(set, Some("bogus"), Some("dark")), "dark");
        assert_eq!(resolve(set, None, None), "auto");
        assert_eq!(resolve(&PANEL.theme, None, Some("neon")), "neon");
    }

    #[test]
    fn test_classic_cycle() {
        let set = &CLASSIC.theme;
        assert_eq!(next(set, "auto"), "dark");
        assert_eq!(next(set, "dark"), "light");
        assert_eq!(next(set, "light"), "auto");
        assert_eq!(next(set, "???"), "auto");
    }

    #[test]
    fn test_apply_is_idempotent_with_one_marker() {
        for variant in [&CLASSIC, &TILES, &PANEL] {
            let set = &variant.theme;
            let mut page = Page::new(variant);
            for name in set.names.iter().copied() {
                apply(&mut page, set, Some(name), ColorScheme::Light);
                let once = page.clone();
                apply(&mut page, set, Some(name), ColorScheme::Light);
                assert_eq!(page, once);
                let marks = markers(&page, set);
                assert_eq!(marks.len(), 1, "{} {}", variant.name, name);
                assert!(marks[0].ends_with(name));
            }
        }
    }

    #[test]
    fn test_apply_invalid_uses_fallback() {
        let mut page = Page::new(&TILES);
        let applied = apply(&mut page, &TILES.theme, Some("acid"), ColorScheme::Light);
        assert_eq!(applied, "acid");
        let applied = apply(&mut page, &TILES.theme, Some("nope"), ColorScheme::Light);
        assert_eq!(applied, "pink");
        assert_eq!(markers(&page, &TILES.theme), vec!["theme-pink".to_string()]);
        let active: Vec<_> = page.swatches.iter().filter(|s| s.active).map(|s| s.theme).collect();
        assert_eq!(active, vec!["pink"]);
    }

    #[test]
    fn test_meta_color_follows_os_for_auto() {
        let mut page = Page::new(&CLASSIC);
        apply(&mut page, &CLASSIC.theme, Some("auto"), ColorScheme::Dark);
        assert_eq!(page.theme_color, DARK_META);
        apply(&mut page, &CLASSIC.theme, Some("auto"), ColorScheme::Light);
        assert_eq!(page.theme_color, LIGHT_META);
        apply(&mut page, &CLASSIC.theme, Some("dark"), ColorScheme::Light);
        assert_eq!(page.theme_color, DARK_META);
        apply(&mut page, &CLASSIC.theme, Some("light"), ColorScheme::Dark);
        assert_eq!(page.theme_color, LIGHT_META);
    }

    #[test]
    fn test_body_marker_leaves_root_alone() {
        let mut page = Page::new(&PANEL);
        apply(&mut page, &PANEL.theme, Some("neon"), ColorScheme::Light);
        assert!(page.body.has_class("theme-neon"));
        assert!(page.root.classes.is_empty());
    }

    #[test]
    fn test_accent() {
        let mut page = Page::new(&CLASSIC);
        apply_accent(&mut page, Some(" #ff00aa "));
        assert_eq!(page.root.style("--accent"), Some("#ff00aa"));
        apply_accent(&mut page, Some(""));
        assert!(page.root.style("--accent").is_none());
    }
}

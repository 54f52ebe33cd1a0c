use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::links::LinkView;
use crate::variant::Variant;

/// A single element's mutable presentation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub hidden: bool,
    pub attrs: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub style: BTreeMap<String, String>,
}

impl Element {
    pub fn hidden() -> Self {
        Element {
            hidden: true,
            ..Default::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    pub fn style(&self, prop: &str) -> Option<&str> {
        self.style.get(prop).map(String::as_str)
    }

    pub fn set_style(&mut self, prop: &str, value: &str) {
        self.style.insert(prop.to_string(), value.to_string());
    }

    pub fn remove_style(&mut self, prop: &str) {
        self.style.remove(prop);
    }
}

/// A text slot in the profile card.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    pub text: String,
    pub hidden: bool,
}

impl Slot {
    fn visible(text: &str) -> Self {
        Slot {
            text: text.to_string(),
            hidden: false,
        }
    }

    fn hidden() -> Self {
        Slot {
            text: String::new(),
            hidden: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ButtonId {
    Share,
    Copy,
    Theme,
    Settings,
    BackgroundUpload,
    BackgroundLink,
    BackgroundReset,
}

impl ButtonId {
    pub fn dom_id(self) -> &'static str {
        match self {
            ButtonId::Share => "share",
            ButtonId::Copy => "copy",
            ButtonId::Theme => "theme",
            ButtonId::Settings => "settingsBtn",
            ButtonId::BackgroundUpload => "bgUploadBtn",
            ButtonId::BackgroundLink => "bgLinkBtn",
            ButtonId::BackgroundReset => "bgResetBtn",
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            ButtonId::Share => "Поделиться",
            ButtonId::Copy => "Копировать ссылку",
            ButtonId::Theme => "Тема",
            ButtonId::Settings => "Настройки",
            ButtonId::BackgroundUpload => "Загрузить фон",
            ButtonId::BackgroundLink => "Фон по ссылке",
            ButtonId::BackgroundReset => "Сбросить фон",
        }
    }
}

/// Temporary label swap on a button after an action.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub original: String,
    pub revert_after: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub theme: &'static str,
    pub active: bool,
}

/// Headless stand-in for the document: everything the renderers and
/// controllers write ends up here, and `render` serializes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub title: String,
    /// `<meta property=... content=...>` tags in insertion order.
    pub meta: Vec<(String, String)>,
    pub theme_color: String,
    pub root: Element,
    pub body: Element,
    /// Full-bleed layer that carries the background image.
    pub background: Element,
    pub name: Slot,
    pub handle: Slot,
    pub bio: Slot,
    pub avatar: String,
    pub verified: Slot,
    pub location: Slot,
    pub links: Vec<LinkView>,
    pub empty_hint: Option<String>,
    pub buttons: BTreeMap<ButtonId, Button>,
    pub swatches: Vec<Swatch>,
    pub settings_open: bool,
    pub background_url_field: String,
}

impl Page {
    /// The page as served before any configuration is applied.
    pub fn new(variant: &Variant) -> Self {
        let buttons = variant
            .buttons
            .iter()
            .map(|id| {
                (
                    *id,
                    Button {
                        label: id.default_label().to_string(),
                        feedback: None,
                    },
                )
            })
            .collect();

        let swatches = if variant.theme.swatches {
            variant
                .theme
                .names
                .iter()
                .map(|t| Swatch {
                    theme: *t,
                    active: false,
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut verified = Slot::hidden();
        verified.text = "✔".to_string();

        Page {
            title: variant.default_name.to_string(),
            meta: Vec::new(),
            theme_color: "#ffffff".to_string(),
            root: Element::default(),
            body: Element::default(),
            background: Element::hidden(),
            name: Slot::visible(variant.default_name),
            handle: Slot::visible(""),
            bio: Slot::visible(variant.default_bio),
            avatar: variant.default_avatar.to_string(),
            verified,
            location: Slot::hidden(),
            links: Vec::new(),
            empty_hint: None,
            buttons,
            swatches,
            settings_open: false,
            background_url_field: String::new(),
        }
    }

    /// Create the meta tag if absent, otherwise update its content in place.
    pub fn set_meta(&mut self, property: &str, content: &str) {
        match self.meta.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = content.to_string(),
            None => self.meta.push((property.to_string(), content.to_string())),
        }
    }

    pub fn meta(&self, property: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, c)| c.as_str())
    }

    pub fn button_label(&self, id: ButtonId) -> Option<&str> {
        self.buttons.get(&id).map(|b| b.label.as_str())
    }

    /// Swap a button's label for `message`. A second call while feedback is
    /// showing keeps the first original label.
    pub fn show_feedback(&mut self, id: ButtonId, message: &str, revert_after: Duration) {
        if let Some(button) = self.buttons.get_mut(&id) {
            let original = match &button.feedback {
                Some(f) => f.original.clone(),
                None => button.label.clone(),
            };
            button.label = message.to_string();
            button.feedback = Some(Feedback {
                original,
                revert_after,
            });
        }
    }

    pub fn revert_feedback(&mut self, id: ButtonId) {
        if let Some(button) = self.buttons.get_mut(&id) {
            if let Some(f) = button.feedback.take() {
                button.label = f.original;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{CLASSIC, PANEL, TILES};

    #[test]
    fn test_set_meta_creates_then_updates() {
        let mut page = Page::new(&CLASSIC);
        page.set_meta("og:title", "One");
        page.set_meta("og:url", "https://a.example/");
        page.set_meta("og:title", "Two");
        assert_eq!(page.meta.len(), 2);
        assert_eq!(page.meta("og:title"), Some("Two"));
        assert_eq!(page.meta[0].0, "og:title");
    }

    #[test]
    fn test_initial_state_follows_variant() {
        let page = Page::new(&TILES);
        assert_eq!(page.name.text, "Ваш ник");
        assert_eq!(page.swatches.len(), 3);
        assert!(page.buttons.contains_key(&ButtonId::BackgroundUpload));
        assert!(!page.buttons.contains_key(&ButtonId::Share));
        assert!(page.background.hidden);
        assert!(page.verified.hidden);
        assert!(page.location.hidden);

        let classic = Page::new(&CLASSIC);
        assert!(classic.swatches.is_empty());
        assert!(classic.buttons.contains_key(&ButtonId::Share));

        assert_eq!(Page::new(&PANEL).name.text, "Имя");
    }

    #[test]
    fn test_feedback_reverts_to_original() {
        let mut page = Page::new(&CLASSIC);
        let delay = Duration::from_millis(1200);
        page.show_feedback(ButtonId::Copy, "Скопировано ✔", delay);
        page.show_feedback(ButtonId::Copy, "Скопировано ✔", delay);
        assert_eq!(page.button_label(ButtonId::Copy), Some("Скопировано ✔"));
        page.revert_feedback(ButtonId::Copy);
        assert_eq!(page.button_label(ButtonId::Copy), Some("Копировать ссылку"));
        assert!(page.buttons[&ButtonId::Copy].feedback.is_none());
    }

    #[test]
    fn test_feedback_on_missing_button_is_ignored() {
        let mut page = Page::new(&PANEL);
        page.show_feedback(ButtonId::Share, "x", Duration::from_millis(1));
        assert!(page.button_label(ButtonId::Share).is_none());
    }
}

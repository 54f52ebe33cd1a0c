use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::actions::{self, Platform, ShareData};
use crate::background::{self, Background};
use crate::config::Config;
use crate::icons::IconFetcher;
use crate::links;
use crate::page::{ButtonId, Page};
use crate::profile;
use crate::render;
use crate::store::PreferenceStore;
use crate::theme::{self, ColorScheme};
use crate::variant::Variant;

pub const URL_PROMPT: &str = "Вставьте ссылку на изображение (URL):";
pub const INVALID_URL_ALERT: &str = "Невалидный URL";

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Share,
    Copy,
    CycleTheme,
    PickTheme(String),
    UploadBackground(PathBuf),
    /// `None` asks the visitor for the URL.
    BackgroundLink(Option<String>),
    ResetBackground,
    ToggleSettings,
    CloseSettings,
}

/// A booted page plus the controllers that mutate it.
pub struct App {
    pub variant: &'static Variant,
    pub config: Config,
    pub page: Page,
    pub page_url: String,
    pub scheme: ColorScheme,
    /// Theme currently applied.
    pub theme: &'static str,
    store: Arc<dyn PreferenceStore>,
}

impl App {
    /// Apply profile, links, theme, accent and background in that order.
    /// Stored preferences win over configured values.
    pub fn boot(
        variant: &'static Variant,
        config: Config,
        store: Arc<dyn PreferenceStore>,
        fetcher: Option<&dyn IconFetcher>,
        page_url: &str,
        scheme: ColorScheme,
    ) -> Self {
        let mut page = Page::new(variant);

        profile::apply(&mut page, &config, page_url);
        links::apply(&mut page, &config.links, variant, fetcher);

        let stored = store.get(variant.keys.theme);
        let wanted = theme::resolve(&variant.theme, stored.as_deref(), config.site.theme.as_deref());
        let applied = theme::apply(&mut page, &variant.theme, Some(wanted), scheme);
        theme::apply_accent(&mut page, config.site.accent_color.as_deref());

        if let Some(bg) = background::resolve(store.as_ref(), &variant.keys, config.site.background.as_ref()) {
            background::apply(&mut page, &bg);
        }

        info!(
            "Booted {} page: {} link(s), theme {}",
            variant.name,
            page.links.len(),
            applied
        );

        App {
            variant,
            config,
            page,
            page_url: page_url.to_string(),
            scheme,
            theme: applied,
            store,
        }
    }

    /// Handle one action. Preferences are written before the page changes;
    /// a failed write is logged and the page still updates. Only an
    /// unreadable upload file is an error.
    pub fn dispatch(&mut self, action: Action, platform: &mut dyn Platform) -> Result<(), String> {
        debug!("Dispatching {:?}", action);
        match action {
            Action::Share => {
                let data = ShareData::new(&self.page, &self.config, &self.page_url);
                actions::share(&mut self.page, &data, platform);
            }
            Action::Copy => {
                let url = ShareData::new(&self.page, &self.config, &self.page_url).url;
                actions::copy(&mut self.page, &url, platform);
            }
            Action::CycleTheme => {
                let next = theme::next(&self.variant.theme, self.theme);
                self.set_theme(next);
            }
            Action::PickTheme(name) => {
                // an unknown name falls back to the configured default first
                let name = theme::resolve(
                    &self.variant.theme,
                    Some(&name),
                    self.config.site.theme.as_deref(),
                );
                self.set_theme(name);
            }
            Action::UploadBackground(path) => {
                let data_url = background::read_data_url(&path)?;
                self.set_background(&Background::from_image(&data_url));
            }
            Action::BackgroundLink(input) => {
                let input = match input {
                    Some(text) => text,
                    None => match platform.prompt(URL_PROMPT, "") {
                        Some(text) => text,
                        None => return Ok(()),
                    },
                };
                match background::parse_url(&input, Some(&self.page_url)) {
                    Ok(Some(url)) => {
                        self.page.background_url_field = url.clone();
                        self.set_background(&Background::from_image(&url));
                    }
                    Ok(None) => debug!("Empty background URL ignored"),
                    Err(e) => {
                        debug!("{}", e);
                        platform.alert(INVALID_URL_ALERT);
                    }
                }
            }
            Action::ResetBackground => {
                if let Err(e) = background::forget(self.store.as_ref(), &self.variant.keys) {
                    warn!("Could not clear stored background: {}", e);
                }
                background::clear(&mut self.page);
                self.page.background_url_field.clear();
                info!("Background reset");
            }
            Action::ToggleSettings => {
                if self.variant.settings_panel {
                    self.page.settings_open = !self.page.settings_open;
                }
            }
            Action::CloseSettings => self.page.settings_open = false,
        }
        Ok(())
    }

    fn set_theme(&mut self, name: &'static str) {
        if let Err(e) = self.store.set(self.variant.keys.theme, name) {
            warn!("Could not persist theme {}: {}", name, e);
        }
        self.theme = theme::apply(&mut self.page, &self.variant.theme, Some(name), self.scheme);
        info!("Theme set to {}", self.theme);
    }

    fn set_background(&mut self, bg: &Background) {
        if let Err(e) = background::persist(self.store.as_ref(), &self.variant.keys, bg) {
            warn!("Could not persist background: {}", e);
        }
        background::apply(&mut self.page, bg);
        info!("Background applied");
    }

    /// Revert every pending button feedback, returning the messages that
    /// were showing.
    pub fn settle_feedback(&mut self) -> Vec<(ButtonId, String)> {
        let pending: Vec<(ButtonId, String)> = self
            .page
            .buttons
            .iter()
            .filter(|(_, b)| b.feedback.is_some())
            .map(|(id, b)| (*id, b.label.clone()))
            .collect();
        for (id, _) in &pending {
            self.page.revert_feedback(*id);
        }
        pending
    }

    pub fn render(&self) -> String {
        render::render_page(&self.page, self.variant)
    }
}

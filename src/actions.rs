use std::time::Duration;

use log::debug;

use crate::config::Config;
use crate::page::{ButtonId, Page};

/// How long a button shows its feedback text before reverting.
pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1200);

pub const SHARE_FALLBACK_TEXT: &str = "Мои ссылки";
pub const SHARED_MESSAGE: &str = "Ссылка скопирована ✔";
pub const COPIED_MESSAGE: &str = "Скопировано ✔";
pub const COPY_PROMPT: &str = "Скопируйте ссылку:";

#[derive(Debug, Clone, PartialEq)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareData {
    pub fn new(page: &Page, config: &Config, page_url: &str) -> Self {
        ShareData {
            title: page.title.clone(),
            text: config
                .profile
                .bio
                .clone()
                .unwrap_or_else(|| SHARE_FALLBACK_TEXT.to_string()),
            url: config
                .site
                .share_url
                .clone()
                .unwrap_or_else(|| page_url.to_string()),
        }
    }
}

/// Host capabilities the action handlers rely on: native share sheet,
/// clipboard and blocking dialogs.
pub trait Platform {
    fn can_share(&self) -> bool;
    fn share(&mut self, data: &ShareData) -> Result<(), String>;
    fn clipboard_write(&mut self, text: &str) -> Result<(), String>;
    /// Blocking text prompt. `None` when dismissed.
    fn prompt(&mut self, message: &str, default: &str) -> Option<String>;
    fn alert(&mut self, message: &str);
}

/// Share through the platform if it can, otherwise copy the URL and flash
/// feedback on the share button. Failures are swallowed.
pub fn share(page: &mut Page, data: &ShareData, platform: &mut dyn Platform) {
    if platform.can_share() {
        if let Err(e) = platform.share(data) {
            debug!("Share dismissed or failed: {}", e);
        }
        return;
    }

    copy_to_clipboard(&data.url, platform);
    page.show_feedback(ButtonId::Share, SHARED_MESSAGE, FEEDBACK_DELAY);
}

pub fn copy(page: &mut Page, url: &str, platform: &mut dyn Platform) {
    copy_to_clipboard(url, platform);
    page.show_feedback(ButtonId::Copy, COPIED_MESSAGE, FEEDBACK_DELAY);
}

/// Write to the clipboard; when it refuses, hand the text to the visitor in
/// a prompt instead.
fn copy_to_clipboard(text: &str, platform: &mut dyn Platform) {
    if let Err(e) = platform.clipboard_write(text) {
        debug!("Clipboard write failed, prompting: {}", e);
        let _ = platform.prompt(COPY_PROMPT, text);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::variant::CLASSIC;

    /// Records every call; capabilities are switched by the flags.
    #[derive(Default)]
    pub(crate) struct RecordingPlatform {
        pub share_supported: bool,
        pub share_fails: bool,
        pub clipboard_denied: bool,
        pub prompt_answer: Option<String>,
        pub shared: Vec<ShareData>,
        pub clipboard: Vec<String>,
        pub prompts: Vec<(String, String)>,
        pub alerts: Vec<String>,
    }

    impl Platform for RecordingPlatform {
        fn can_share(&self) -> bool {
            self.share_supported
        }

        fn share(&mut self, data: &ShareData) -> Result<(), String> {
            if self.share_fails {
                return Err("AbortError".to_string());
            }
            self.shared.push(data.clone());
            Ok(())
        }

        fn clipboard_write(&mut self, text: &str) -> Result<(), String> {
            if self.clipboard_denied {
                return Err("NotAllowedError".to_string());
            }
            self.clipboard.push(text.to_string());
            Ok(())
        }

        fn prompt(&mut self, message: &str, default: &str) -> Option<String> {
            self.prompts.push((message.to_string(), default.to_string()));
            self.prompt_answer.clone()
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }
    }

    fn data() -> ShareData {
        ShareData {
            title: "Ann — ссылки".into(),
            text: SHARE_FALLBACK_TEXT.into(),
            url: "https://ann.example/".into(),
        }
    }

    #[test]
    fn test_share_uses_native_sheet() {
        let mut page = Page::new(&CLASSIC);
        let mut platform = RecordingPlatform {
            share_supported: true,
            ..Default::default()
        };
        share(&mut page, &data(), &mut platform);
        assert_eq!(platform.shared, vec![data()]);
        assert!(platform.clipboard.is_empty());
        assert_eq!(page.button_label(ButtonId::Share), Some("Поделиться"));
    }

    #[test]
    fn test_share_falls_back_to_clipboard_with_feedback() {
        let mut page = Page::new(&CLASSIC);
        let mut platform = RecordingPlatform::default();
        share(&mut page, &data(), &mut platform);
        assert_eq!(platform.clipboard, vec!["https://ann.example/".to_string()]);
        assert_eq!(page.button_label(ButtonId::Share), Some(SHARED_MESSAGE));
        let feedback = page.buttons[&ButtonId::Share].feedback.clone().unwrap();
        assert_eq!(feedback.revert_after, FEEDBACK_DELAY);
        assert_eq!(feedback.original, "Поделиться");
    }

    #[test]
    fn test_share_failures_are_silent() {
        let mut page = Page::new(&CLASSIC);
        let mut platform = RecordingPlatform {
            share_supported: true,
            share_fails: true,
            ..Default::default()
        };
        share(&mut page, &data(), &mut platform);
        assert!(platform.alerts.is_empty());
        assert!(platform.prompts.is_empty());
        assert!(platform.clipboard.is_empty());
    }

    #[test]
    fn test_share_prompts_when_clipboard_denied() {
        let mut page = Page::new(&CLASSIC);
        let mut platform = RecordingPlatform {
            clipboard_denied: true,
            ..Default::default()
        };
        share(&mut page, &data(), &mut platform);
        assert_eq!(
            platform.prompts,
            vec![(COPY_PROMPT.to_string(), "https://ann.example/".to_string())]
        );
        assert!(platform.alerts.is_empty());
        assert_eq!(page.button_label(ButtonId::Share), Some(SHARED_MESSAGE));
    }

    #[test]
    fn test_copy_prompts_when_clipboard_denied() {
        let mut page = Page::new(&CLASSIC);
        let mut platform = RecordingPlatform {
            clipboard_denied: true,
            ..Default::default()
        };
        copy(&mut page, "https://ann.example/", &mut platform);
        assert_eq!(
            platform.prompts,
            vec![(COPY_PROMPT.to_string(), "https://ann.example/".to_string())]
        );
        assert!(platform.clipboard.is_empty());
        assert_eq!(page.button_label(ButtonId::Copy), Some(COPIED_MESSAGE));

        page.revert_feedback(ButtonId::Copy);
        let mut platform = RecordingPlatform::default();
        copy(&mut page, "https://ann.example/", &mut platform);
        assert_eq!(platform.clipboard, vec!["https://ann.example/".to_string()]);
        assert!(platform.prompts.is_empty());
        assert_eq!(page.button_label(ButtonId::Copy), Some(COPIED_MESSAGE));
    }

    #[test]
    fn test_share_data_fallbacks() {
        let page = Page::new(&CLASSIC);
        let mut config = Config::default();
        let d = ShareData::new(&page, &config, "http://localhost/");
        assert_eq!(d.text, SHARE_FALLBACK_TEXT);
        assert_eq!(d.url, "http://localhost/");

        config.profile.bio = Some("Designer".into());
        config.site.share_url = Some("https://ann.example/".into());
        let d = ShareData::new(&page, &config, "http://localhost/");
        assert_eq!(d.text, "Designer");
        assert_eq!(d.url, "https://ann.example/");
    }
}

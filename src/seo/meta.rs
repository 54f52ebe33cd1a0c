use crate::config::Config;
use crate::page::Page;
use crate::render::html_escape;

pub const DEFAULT_PROFILE_NAME: &str = "Профиль";
pub const DEFAULT_DESCRIPTION: &str = "Все мои ссылки";
pub const DEFAULT_OG_IMAGE: &str = "assets/og-banner.png";

/// Social-preview metadata for the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
}

/// Fallback chain per field: explicit site value, then a value derived from
/// the profile, then a fixed default.
pub fn derive(config: &Config, page_url: &str) -> PageMeta {
    let site = &config.site;
    let profile = &config.profile;

    let title = site.title.clone().unwrap_or_else(|| {
        format!(
            "{} — ссылки",
            profile.name.as_deref().unwrap_or(DEFAULT_PROFILE_NAME)
        )
    });
    let description = site
        .description
        .clone()
        .or_else(|| profile.bio.clone())
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let image = site
        .og_image
        .clone()
        .unwrap_or_else(|| DEFAULT_OG_IMAGE.to_string());
    let url = site
        .share_url
        .clone()
        .unwrap_or_else(|| page_url.to_string());

    PageMeta {
        title,
        description,
        image,
        url,
    }
}

/// Write title and `og:*` tags onto the page, updating existing tags in place.
pub fn apply(page: &mut Page, meta: &PageMeta) {
    page.title = meta.title.clone();
    page.set_meta("og:title", &meta.title);
    page.set_meta("og:description", &meta.description);
    page.set_meta("og:image", &meta.image);
    page.set_meta("og:url", &meta.url);
}

/// Build the head tags for a page
pub fn build_meta(page: &Page) -> String {
    let mut meta = String::new();

    meta.push_str(&format!("<title>{}</title>", html_escape(&page.title)));
    if let Some(desc) = page.meta("og:description") {
        meta.push_str(&format!(
            "\n<meta name=\"description\" content=\"{}\">",
            html_escape(desc)
        ));
    }
    if let Some(url) = page.meta("og:url") {
        meta.push_str(&format!(
            "\n<link rel=\"canonical\" href=\"{}\">",
            html_escape(url)
        ));
    }

    // Open Graph
    for (property, content) in &page.meta {
        meta.push_str(&format!(
            "\n<meta property=\"{}\" content=\"{}\">",
            html_escape(property),
            html_escape(content)
        ));
    }
    meta.push_str("\n<meta property=\"og:type\" content=\"website\">");

    // Twitter Cards
    meta.push_str("\n<meta name=\"twitter:card\" content=\"summary_large_image\">");

    meta.push_str(&format!(
        "\n<meta id=\"theme-color\" name=\"theme-color\" content=\"{}\">",
        html_escape(&page.theme_color)
    ));

    meta
}

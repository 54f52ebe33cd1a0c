use crate::config::Config;
use crate::page::Page;
use crate::seo::meta;

/// Copy profile fields into their slots. Absent fields leave the slot as it
/// was; the verified badge and location line toggle visibility instead.
/// Also derives the title and social-preview tags.
pub fn apply(page: &mut Page, config: &Config, page_url: &str) {
    let profile = &config.profile;

    if let Some(avatar) = &profile.avatar {
        page.avatar = avatar.clone();
    }
    if let Some(name) = &profile.name {
        page.name.text = name.clone();
    }
    if let Some(handle) = &profile.handle {
        page.handle.text = handle.clone();
    }
    if let Some(bio) = &profile.bio {
        page.bio.text = bio.clone();
    }

    page.verified.hidden = !profile.verified;

    match &profile.location {
        Some(location) => {
            page.location.hidden = false;
            page.location.text = format!("· {}", location);
        }
        None => page.location.hidden = true,
    }

    meta::apply(page, &meta::derive(config, page_url));
}

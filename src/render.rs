use crate::icons::Icon;
use crate::links::LinkView;
use crate::page::{Element, Page};
use crate::seo;
use crate::variant::{Layout, Variant};

/// Serialize the page into a complete static HTML document.
pub fn render_page(page: &Page, variant: &Variant) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!doctype html>\n");
    html.push_str(&format!("<html lang=\"ru\"{}>\n", element_attrs(&page.root)));
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&seo::build_meta(page));
    html.push_str("\n<link rel=\"stylesheet\" href=\"assets/style.css\">\n</head>\n");

    html.push_str(&format!("<body{}>\n", element_attrs(&page.body)));
    html.push_str(&format!(
        "<div id=\"bgImage\" class=\"bg-image\"{}></div>\n",
        element_attrs(&page.background)
    ));

    html.push_str("<main class=\"card\">\n");
    html.push_str(&format!(
        "  <img id=\"avatar\" class=\"avatar\" src=\"{}\" alt=\"\">\n",
        html_escape(&page.avatar)
    ));
    html.push_str(&format!(
        "  <h1><span id=\"name\">{}</span> <span id=\"verified\" class=\"verified\"{}>{}</span></h1>\n",
        html_escape(&page.name.text),
        hidden(page.verified.hidden),
        html_escape(&page.verified.text)
    ));
    html.push_str(&format!(
        "  <p class=\"sub\"><span id=\"username\">{}</span> <span id=\"location\"{}>{}</span></p>\n",
        html_escape(&page.handle.text),
        hidden(page.location.hidden),
        html_escape(&page.location.text)
    ));
    html.push_str(&format!(
        "  <p id=\"bio\"{}>{}</p>\n",
        hidden(page.bio.hidden),
        html_escape(&page.bio.text)
    ));

    html.push_str(&render_links(&page.links, variant.layout));
    if let Some(hint) = &page.empty_hint {
        html.push_str(&format!("  <p class=\"hint\">{}</p>\n", html_escape(hint)));
    }

    if !page.buttons.is_empty() {
        html.push_str("  <div class=\"actions\">\n");
        for (id, button) in &page.buttons {
            html.push_str(&format!(
                "    <button id=\"{}\" type=\"button\">{}</button>\n",
                id.dom_id(),
                html_escape(&button.label)
            ));
        }
        html.push_str("  </div>\n");
    }

    let swatches = render_swatches(page);
    if variant.settings_panel {
        html.push_str(&format!(
            "  <aside id=\"settingsPanel\" class=\"settings-panel\"{}>\n",
            hidden(!page.settings_open)
        ));
        html.push_str(&swatches);
        html.push_str(&format!(
            "    <input id=\"bgUrl\" type=\"url\" value=\"{}\" placeholder=\"https://\">\n",
            html_escape(&page.background_url_field)
        ));
        html.push_str("    <button id=\"bgApplyUrl\" type=\"button\">OK</button>\n");
        html.push_str("    <input id=\"bgFile\" type=\"file\" accept=\"image/*\">\n");
        html.push_str("    <button id=\"closeSettings\" type=\"button\">×</button>\n");
        html.push_str("  </aside>\n");
    } else {
        html.push_str(&swatches);
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// The `<ul id="links">` block.
pub fn render_links(links: &[LinkView], layout: Layout) -> String {
    let class = match layout {
        Layout::List => "links",
        Layout::Tiles => "icons",
    };
    let mut html = format!("  <ul id=\"links\" class=\"{}\">\n", class);

    for link in links {
        let rel = link
            .rel()
            .map(|r| format!(" rel=\"{}\"", r))
            .unwrap_or_default();
        match layout {
            Layout::List => html.push_str(&format!(
                "    <li><a href=\"{}\" target=\"{}\"{}><span class=\"i\">{}</span><span class=\"l\">{}</span></a></li>\n",
                html_escape(&link.href),
                link.target(),
                rel,
                render_icon(&link.icon),
                html_escape(&link.label)
            )),
            Layout::Tiles => html.push_str(&format!(
                "    <li><a class=\"icon-tile\" href=\"{}\" target=\"{}\"{} title=\"{}\" aria-label=\"{}\">{}</a></li>\n",
                html_escape(&link.href),
                link.target(),
                rel,
                html_escape(&link.tooltip),
                html_escape(&link.tooltip),
                render_icon(&link.icon)
            )),
        }
    }

    html.push_str("  </ul>\n");
    html
}

pub fn render_icon(icon: &Icon) -> String {
    match icon {
        // built-in or already sanitized
        Icon::Svg(svg) => svg.clone(),
        Icon::Image { src } => format!(
            "<img class=\"icon\" src=\"{}\" alt=\"\" loading=\"lazy\" decoding=\"async\">",
            html_escape(src)
        ),
        Icon::Font { class } => format!("<i class=\"{}\"></i>", html_escape(class)),
        Icon::Letter(c) => format!(
            "<span class=\"letter\">{}</span>",
            html_escape(&c.to_string())
        ),
    }
}

fn render_swatches(page: &Page) -> String {
    if page.swatches.is_empty() {
        return String::new();
    }
    let mut html = String::from("    <div class=\"swatches\">\n");
    for swatch in &page.swatches {
        html.push_str(&format!(
            "      <button class=\"swatch{}\" data-theme=\"{}\" type=\"button\"></button>\n",
            if swatch.active { " active" } else { "" },
            html_escape(swatch.theme)
        ));
    }
    html.push_str("    </div>\n");
    html
}

/// ` attr="…" class="…" style="…" hidden` for an element, in that order.
fn element_attrs(el: &Element) -> String {
    let mut out = String::new();
    for (name, value) in &el.attrs {
        out.push_str(&format!(" {}=\"{}\"", name, html_escape(value)));
    }
    if !el.classes.is_empty() {
        let classes: Vec<&str> = el.classes.iter().map(String::as_str).collect();
        out.push_str(&format!(" class=\"{}\"", html_escape(&classes.join(" "))));
    }
    if !el.style.is_empty() {
        let style: Vec<String> = el
            .style
            .iter()
            .map(|(prop, value)| format!("{}: {}", prop, value))
            .collect();
        out.push_str(&format!(" style=\"{}\"", html_escape(&style.join("; "))));
    }
    out.push_str(hidden(el.hidden));
    out
}

fn hidden(is_hidden: bool) -> &'static str {
    if is_hidden {
        " hidden"
    } else {
        ""
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ButtonId;
    use crate::variant::{CLASSIC, PANEL, TILES};

    fn view(href: &str, label: &str, icon: Icon) -> LinkView {
        LinkView {
            href: href.to_string(),
            label: label.to_string(),
            tooltip: label.to_string(),
            kind: "link".to_string(),
            icon,
            external: crate::links::is_external(href),
        }
    }

    #[test]
    fn test_html_escape_all_five() {
        assert_eq!(html_escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
    }

    #[test]
    fn test_user_text_is_escaped_in_links() {
        let hostile = r#"<img src=x onerror="alert('1')">&"#;
        let links = vec![view(&format!("https://e.com/?q={}", hostile), hostile, Icon::Letter('<'))];
        for layout in [Layout::List, Layout::Tiles] {
            let html = render_links(&links, layout);
            assert!(!html.contains(hostile));
            assert!(!html.contains("<img src=x"));
            assert!(!html.contains("'1'"));
            assert!(html.contains("&lt;img src=x onerror=&quot;alert(&#039;1&#039;)&quot;&gt;&amp;"));
            assert!(html.contains("<span class=\"letter\">&lt;</span>"));
        }
    }

    #[test]
    fn test_link_targets_in_markup() {
        let links = vec![
            view("https://x.com/a", "X", Icon::Letter('X')),
            view("mailto:a@b.c", "Mail", Icon::Letter('M')),
        ];
        let html = render_links(&links, Layout::List);
        assert!(html.contains("href=\"https://x.com/a\" target=\"_blank\" rel=\"noopener noreferrer\""));
        assert!(html.contains("href=\"mailto:a@b.c\" target=\"_self\">"));
    }

    #[test]
    fn test_image_icon_markup() {
        let icon = Icon::Image {
            src: "https://cdn.simpleicons.org/github/ffffff".to_string(),
        };
        assert_eq!(
            render_icon(&icon),
            "<img class=\"icon\" src=\"https://cdn.simpleicons.org/github/ffffff\" alt=\"\" loading=\"lazy\" decoding=\"async\">"
        );
    }

    #[test]
    fn test_render_page_sections() {
        let mut page = Page::new(&CLASSIC);
        page.root.set_attr("data-theme", "dark");
        page.background.hidden = false;
        page.background.set_style("background-image", "url('a\\'b.png')");
        let html = render_page(&page, &CLASSIC);
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<html lang=\"ru\" data-theme=\"dark\">"));
        assert!(html.contains("style=\"background-image: url(&#039;a\\&#039;b.png&#039;)\""));
        assert!(html.contains("id=\"share\""));
        assert!(!html.contains("settingsPanel"));
        assert!(html.contains("<span id=\"verified\" class=\"verified\" hidden>"));
    }

    #[test]
    fn test_render_panel_and_tiles_extras() {
        let mut page = Page::new(&PANEL);
        page.settings_open = true;
        page.background_url_field = "https://e.com/\"bg\".png".to_string();
        let html = render_page(&page, &PANEL);
        assert!(html.contains("<aside id=\"settingsPanel\" class=\"settings-panel\">"));
        assert!(html.contains("value=\"https://e.com/&quot;bg&quot;.png\""));
        assert!(html.contains("data-theme=\"pinkpurple\""));

        let mut tiles = Page::new(&TILES);
        tiles.empty_hint = Some("Добавьте ссылки".to_string());
        tiles.show_feedback(ButtonId::BackgroundReset, "<ok>", std::time::Duration::from_millis(1));
        let html = render_page(&tiles, &TILES);
        assert!(html.contains("<p class=\"hint\">Добавьте ссылки</p>"));
        assert!(html.contains("&lt;ok&gt;"));
        assert!(html.contains("class=\"icons\""));
    }
}

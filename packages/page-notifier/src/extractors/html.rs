//! Helpers for the HTML fragments feeds embed in their entries.

use scraper::{Html, Selector};

/// Visible text of an HTML fragment, one text node per line.
pub fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let lines: Vec<&str> = fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    lines.join("\n")
}

/// Every `<img src>` in document order, skipping inline `data:` images.
pub fn image_urls(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let fragment = Html::parse_fragment(html);
    let urls = fragment
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(String::from)
        .collect();
    urls
}

pub fn first_image(html: &str) -> Option<String> {
    image_urls(html).into_iter().next()
}

/// Id for entries that carry none: hex md5 of link followed by title.
pub fn fallback_id(link: &str, title: &str) -> String {
    format!("{:x}", md5::compute(format!("{}{}", link, title)))
}

// src/extract.rs
// Pull media links out of a saved HTML page

use crate::playlist::Entry;
use once_cell::sync::Lazy;
use regex::Regex;

// https URL ending in `.mp3?s=<token>`; the token stops before `&`, whitespace or `"`
static MEDIA_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https://[^\s"]+?\.mp3\?s=[^&\s"]+"#).expect("media link pattern is valid")
});

/// Find signed MP3 links in `html`, in document order (duplicates kept)
pub fn find_media_links(html: &str) -> Vec<String> {
    MEDIA_LINK
        .find_iter(html)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Give each link a title from its file stem, or `Track_<n>` when there is none
pub fn links_to_entries(links: &[String]) -> Vec<Entry> {
    links
        .iter()
        .enumerate()
        .map(|(idx, link)| {
            let title = title_from_url(link).unwrap_or_else(|| format!("Track_{}", idx + 1));
            Entry {
                title,
                url: link.clone(),
            }
        })
        .collect()
}

fn title_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let segment = path.rsplit('/').next()?;
    let stem = segment
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(segment);
    if stem.is_empty() || stem.contains(':') {
        None
    } else {
        Some(stem.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <a href="https://cdn.example.com/mix/first-set.mp3?s=abc123&amp;t=9">one</a>
        <div data-src="https://cdn.example.com/other.mp3?s=XYZ">two</div>
        <a href="http://insecure.example.com/x.mp3?s=nope">skip</a>
        <a href="https://cdn.example.com/no-token.mp3">skip</a>
        <span>https://cdn.example.com/mix/first-set.mp3?s=abc123 again</span>
    "#;

    #[test]
    fn test_finds_signed_links_in_order() {
        assert_eq!(
            find_media_links(PAGE),
            vec![
                "https://cdn.example.com/mix/first-set.mp3?s=abc123",
                "https://cdn.example.com/other.mp3?s=XYZ",
                "https://cdn.example.com/mix/first-set.mp3?s=abc123",
            ]
        );
    }

    #[test]
    fn test_no_links() {
        assert!(find_media_links("<html><body>nothing</body></html>").is_empty());
    }

    #[test]
    fn test_links_to_entries_titles() {
        let links = vec![
            "https://cdn.example.com/mix/first-set.mp3?s=abc".to_string(),
            "https://cdn.example.com/.mp3?s=abc".to_string(),
        ];
        let entries = links_to_entries(&links);
        assert_eq!(entries[0].title, "first-set");
        assert_eq!(entries[1].title, "Track_2");
        assert_eq!(entries[1].url, links[1]);
    }
}

//! Rewrites attachment URLs inside memo and comment bodies.

use super::attachments::AttachmentMap;

/// Replace every literal occurrence of each map entry's source URL with its
/// destination URL, applying entries in list order.
///
/// Pure text substitution, used identically for memo bodies and comment
/// bodies. Earlier replacements are not re-scanned, so when one source URL
/// could be a substring of another the caller must order entries longest
/// first — [`order_for_rewrite`] does exactly that, and the driver applies
/// it before every rewrite.
#[must_use]
pub fn rewrite_attachment_urls(body: &str, maps: &[AttachmentMap]) -> String {
    maps.iter().fold(body.to_owned(), |text, map| {
        text.replace(&map.source_url, &map.dest_url)
    })
}

/// Order map entries so no source URL can shadow a longer one during
/// rewriting (descending source-URL length).
#[must_use]
pub fn order_for_rewrite(mut maps: Vec<AttachmentMap>) -> Vec<AttachmentMap> {
    maps.sort_by(|a, b| b.source_url.len().cmp(&a.source_url.len()));
    maps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(name: &str, source_url: &str, dest_url: &str) -> AttachmentMap {
        AttachmentMap {
            name: name.to_owned(),
            source_url: source_url.to_owned(),
            dest_url: dest_url.to_owned(),
        }
    }

    #[test]
    fn replaces_every_occurrence_of_every_url() {
        let maps = vec![
            map("a.png", "https://x/a.png", "https://y/a.png"),
            map("b.png", "https://x/b.png", "https://y/b.png"),
        ];
        let body = "one https://x/a.png two https://x/b.png three https://x/a.png";
        let rewritten = rewrite_attachment_urls(body, &maps);
        assert_eq!(
            rewritten,
            "one https://y/a.png two https://y/b.png three https://y/a.png"
        );
    }

    #[test]
    fn urls_not_in_the_map_are_untouched() {
        let maps = vec![map("a.png", "https://x/a.png", "https://y/a.png")];
        let body = "see https://x/other.png";
        assert_eq!(rewrite_attachment_urls(body, &maps), body);
    }

    #[test]
    fn empty_map_is_identity() {
        assert_eq!(rewrite_attachment_urls("unchanged", &[]), "unchanged");
    }

    #[test]
    fn longest_first_ordering_protects_prefix_urls() {
        // "https://x/a.png" is a prefix of "https://x/a.png.orig"; rewriting
        // the shorter one first would corrupt the longer occurrence.
        let maps = order_for_rewrite(vec![
            map("a.png", "https://x/a.png", "https://y/a.png"),
            map("a.png.orig", "https://x/a.png.orig", "https://y/a.png.orig"),
        ]);
        assert_eq!(maps[0].name, "a.png.orig");
        let body = "short https://x/a.png long https://x/a.png.orig";
        assert_eq!(
            rewrite_attachment_urls(body, &maps),
            "short https://y/a.png long https://y/a.png.orig"
        );
    }
}

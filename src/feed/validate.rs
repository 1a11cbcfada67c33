/// Signature of a content check run against every delivered 2xx body.
pub type Validator = fn(&str) -> bool;

const RSS_MARKER: &str = "<rss";
const CHANNEL_MARKER: &str = "<channel>";

/// Returns true when the body textually looks like an RSS document.
///
/// This is a syntactic check, not an XML parse: the body must contain an
/// `<rss` opening tag marker and a `<channel>` tag marker somewhere. Relay
/// services tend to answer with HTML error pages and a 200 status, which this
/// rejects.
pub fn looks_like_rss(body: &str) -> bool {
    body.contains(RSS_MARKER) && body.contains(CHANNEL_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_minimal_rss_accepted() {
        assert!(looks_like_rss(
            r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#
        ));
    }

    #[test]
    fn test_html_error_page_rejected() {
        assert!(!looks_like_rss(
            "<html><body><h1>403 Forbidden</h1></body></html>"
        ));
    }

    #[test]
    fn test_atom_feed_rejected() {
        assert!(!looks_like_rss(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>x</title></feed>"#
        ));
    }

    #[test]
    fn test_rss_without_channel_rejected() {
        assert!(!looks_like_rss(r#"<rss version="2.0"></rss>"#));
    }

    #[test]
    fn test_channel_with_attributes_rejected() {
        // The marker is the literal `<channel>` tag.
        assert!(!looks_like_rss(r#"<rss><channel id="a"></channel></rss>"#));
    }

    #[test]
    fn test_empty_body_rejected() {
        assert!(!looks_like_rss(""));
    }

    proptest! {
        #[test]
        fn prop_markers_anywhere_accepted(prefix in ".*", middle in ".*", suffix in ".*") {
            let body = format!("{prefix}<rss{middle}<channel>{suffix}");
            prop_assert!(looks_like_rss(&body));
        }

        #[test]
        fn prop_without_angle_brackets_rejected(body in "[^<]*") {
            prop_assert!(!looks_like_rss(&body));
        }
    }
}

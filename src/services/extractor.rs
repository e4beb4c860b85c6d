use itertools::Itertools;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{
    fragment::Fragment,
    html_tag::{HtmlTag, JUNK_SELECTORS},
};

/// One element's normalized text and resolved link.
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    pub text: String,
    pub href: Option<String>,
}

/// The handful of document operations the extractor needs from an HTML parser.
pub trait PageDocument {
    fn remove_matching(&mut self, selectors: &str);
    fn remove_comments(&mut self);
    fn elements(&self, tag: HtmlTag) -> Vec<PageElement>;
    fn body_text(&self) -> String;
}

pub struct HtmlPage {
    html: Html,
}

impl HtmlPage {
    pub fn parse(source: &str) -> Self {
        HtmlPage {
            html: Html::parse_document(source),
        }
    }
}

impl PageDocument for HtmlPage {
    fn remove_matching(&mut self, selectors: &str) {
        let selector = match Selector::parse(selectors) {
            Ok(selector) => selector,
            Err(e) => {
                log::error!("Invalid selector {}: {:?}", selectors, e);
                return;
            }
        };

        let ids: Vec<_> = self.html.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fn remove_comments(&mut self) {
        let ids: Vec<_> = self
            .html
            .tree
            .root()
            .descendants()
            .filter(|node| node.value().is_comment())
            .map(|node| node.id())
            .collect();

        for id in ids {
            if let Some(mut node) = self.html.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    fn elements(&self, tag: HtmlTag) -> Vec<PageElement> {
        let selector = match Selector::parse(tag.selector()) {
            Ok(selector) => selector,
            Err(e) => {
                log::error!("Invalid selector {}: {:?}", tag.selector(), e);
                return vec![];
            }
        };

        self.html
            .select(&selector)
            .map(|el| PageElement {
                text: normalize(&el.text().collect::<String>()),
                href: resolve_href(el),
            })
            .collect()
    }

    fn body_text(&self) -> String {
        match Selector::parse("body") {
            Ok(selector) => normalize(
                &self
                    .html
                    .select(&selector)
                    .flat_map(|body| body.text())
                    .collect::<String>(),
            ),
            Err(_) => String::new(),
        }
    }
}

/// Collapses whitespace runs (non-breaking spaces included) to one space and trims.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// Nearest enclosing anchor's href (the element itself counts), else the element's own href.
fn resolve_href(el: ElementRef) -> Option<String> {
    let anchor_href = std::iter::once(el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find(|e| e.value().name() == "a")
        .and_then(|a| a.value().attr("href"));

    anchor_href
        .or_else(|| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Strips non-content nodes, then collects fragments from every candidate element kind.
/// Fragments shorter than `min_chars` are dropped.
pub fn extract_fragments<D: PageDocument>(document: &mut D, min_chars: usize) -> Vec<Fragment> {
    document.remove_matching(JUNK_SELECTORS);
    document.remove_comments();

    HtmlTag::CANDIDATES
        .iter()
        .flat_map(|tag| document.elements(*tag))
        .filter(|el| el.text.chars().count() >= min_chars)
        .map(|el| Fragment {
            text: el.text,
            href: el.href,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(fragments: &[Fragment]) -> Vec<&str> {
        fragments.iter().map(|f| f.text.as_str()).collect()
    }

    #[test]
    fn normalize_collapses_whitespace_and_nbsp() {
        assert_eq!(normalize("  Save\u{00A0}\u{00A0}20%\n\t now "), "Save 20% now");
        assert_eq!(normalize(" \n "), "");
    }

    #[test]
    fn junk_nodes_are_removed_before_reading_text() {
        let mut page = HtmlPage::parse(
            r#"<html><head><style>.promo { color: red }</style></head><body>
            <div>Visible deal<script>var coupon = "HIDDEN99";</script></div>
            <!-- coupon code SECRET10 -->
            <noscript><p>Enable JS for discount</p></noscript>
            </body></html>"#,
        );

        let fragments = extract_fragments(&mut page, 3);

        assert_eq!(texts(&fragments), vec!["Visible deal"]);
        assert!(!page.body_text().contains("SECRET10"));
        assert!(!page.body_text().contains("HIDDEN99"));
    }

    #[test]
    fn kinds_are_visited_in_order_and_short_text_dropped() {
        let mut page = HtmlPage::parse(
            r#"<body>
            <p>Paragraph offer</p>
            <div>ok</div>
            <a href="/x">Anchor deal</a>
            <li>List coupon</li>
            <button>Apply code</button>
            </body>"#,
        );

        let fragments = extract_fragments(&mut page, 3);

        assert_eq!(
            texts(&fragments),
            vec!["Anchor deal", "Paragraph offer", "List coupon", "Apply code"]
        );
    }

    #[test]
    fn href_prefers_enclosing_anchor() {
        let mut page = HtmlPage::parse(
            r#"<body>
            <a href=" https://shop.example/sale "><span>Half price deal</span></a>
            <p>No link here</p>
            </body>"#,
        );

        let fragments = extract_fragments(&mut page, 3);
        let span = fragments
            .iter()
            .find(|f| f.text == "Half price deal" && f.href.is_some())
            .unwrap();
        let paragraph = fragments.iter().find(|f| f.text == "No link here").unwrap();

        assert_eq!(span.href.as_deref(), Some("https://shop.example/sale"));
        assert_eq!(paragraph.href, None);
    }

    #[test]
    fn element_text_includes_descendants() {
        let mut page = HtmlPage::parse("<body><div>Use code <b>SAVE20</b> today</div></body>");

        let fragments = extract_fragments(&mut page, 3);

        assert_eq!(texts(&fragments), vec!["Use code SAVE20 today"]);
    }
}

/// Element kinds visited by the extractor, in visiting order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HtmlTag {
    ATag,
    DivTag,
    SpanTag,
    PTag,
    LiTag,
    ButtonTag,
}

impl HtmlTag {
    pub const CANDIDATES: [HtmlTag; 6] = [
        HtmlTag::ATag,
        HtmlTag::DivTag,
        HtmlTag::SpanTag,
        HtmlTag::PTag,
        HtmlTag::LiTag,
        HtmlTag::ButtonTag,
    ];

    pub fn selector(&self) -> &'static str {
        match self {
            HtmlTag::ATag => "a",
            HtmlTag::DivTag => "div",
            HtmlTag::SpanTag => "span",
            HtmlTag::PTag => "p",
            HtmlTag::LiTag => "li",
            HtmlTag::ButtonTag => "button",
        }
    }
}

/// Nodes that never carry visible offer text. Comments are stripped separately.
pub const JUNK_SELECTORS: &str =
    "script, style, noscript, iframe, svg, meta, link[rel='stylesheet']";

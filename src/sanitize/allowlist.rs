//! Tag and attribute allow-lists

/// Tags kept by the sanitizer
const ALLOWED_TAGS: &[&str] = &[
    // structural
    "div", "section", "article", "main", "aside", "header", "footer", "nav",
    // headings
    "h1", "h2", "h3", "h4", "h5", "h6",
    // text
    "p", "span", "br",
    // lists
    "ul", "ol", "li", "dl", "dt", "dd",
    // inline formatting
    "strong", "b", "em", "i", "u", "del", "s", "code", "pre", "blockquote",
    // media and links
    "a", "img",
    // tables
    "table", "thead", "tbody", "tfoot", "tr", "th", "td", "caption", "col", "colgroup",
    // misc
    "hr", "figure", "figcaption", "mark",
];

/// Tags removed together with their content
const DROP_CONTENT_TAGS: &[&str] = &[
    "script", "style", "template", "noscript", "iframe", "object", "embed", "head", "title",
];

/// Attributes kept by the sanitizer, besides `data-*`
const ALLOWED_ATTRS: &[&str] = &[
    "href", "src", "alt", "title", "class", "id", "colspan", "rowspan", "scope", "target",
    "rel", "width", "height",
];

const URL_ATTRS: &[&str] = &["href", "src"];

const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:"];

pub fn is_allowed_tag(tag: &str) -> bool {
    ALLOWED_TAGS.contains(&tag)
}

pub fn drops_content(tag: &str) -> bool {
    DROP_CONTENT_TAGS.contains(&tag)
}

pub fn is_allowed_attr(name: &str) -> bool {
    ALLOWED_ATTRS.contains(&name) || (name.len() > 5 && name.starts_with("data-"))
}

/// Check an attribute name/value pair, including URL schemes
pub fn is_safe_attr(name: &str, value: &str) -> bool {
    if !is_allowed_attr(name) {
        return false;
    }
    if URL_ATTRS.contains(&name) {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control())
            .collect::<String>()
            .to_ascii_lowercase();
        return !BLOCKED_SCHEMES.iter().any(|s| normalized.starts_with(s));
    }
    true
}

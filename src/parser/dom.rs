use scraper::{ElementRef, Html};

/// Every element of a document in pre-order, so "the next N elements after X"
/// is a slice instead of a tree walk.
pub struct DocIndex<'a> {
    order: Vec<ElementRef<'a>>,
}

impl<'a> DocIndex<'a> {
    pub fn new(doc: &'a Html) -> Self {
        let order = doc
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .collect();
        DocIndex { order }
    }

    pub fn position(&self, el: ElementRef<'a>) -> Option<usize> {
        self.order.iter().position(|e| e.id() == el.id())
    }

    /// Elements strictly after `el` in document order (its own descendants first).
    pub fn following(&self, el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        let start = self.position(el).map_or(self.order.len(), |p| p + 1);
        self.order[start..].iter().copied()
    }

    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'a>> + '_ {
        self.order.iter().copied()
    }
}

pub fn is_tag(el: ElementRef<'_>, name: &str) -> bool {
    el.value().name().eq_ignore_ascii_case(name)
}

/// Descendant elements with the given tag name, excluding `el` itself.
pub fn find_all<'a>(el: ElementRef<'a>, name: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(move |e| is_tag(*e, name))
}

pub fn find_first<'a>(el: ElementRef<'a>, name: &'a str) -> Option<ElementRef<'a>> {
    find_all(el, name).next()
}

/// Nearest ancestor with the given tag name.
pub fn find_parent<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| is_tag(*a, name))
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

pub fn next_sibling_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.next_siblings().filter_map(ElementRef::wrap)
}

/// Text pieces trimmed and concatenated with nothing in between.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    joined_text(el, "")
}

/// Text pieces trimmed, empties dropped, joined by `sep`.
pub fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

/// True when any `<th>` under `table` mentions one of `keywords`.
pub fn has_header(table: ElementRef<'_>, keywords: &[&str]) -> bool {
    find_all(table, "th").any(|th| {
        let text = stripped_text(th);
        !text.is_empty() && keywords.iter().any(|k| text.contains(k))
    })
}

pub fn href(el: ElementRef<'_>) -> Option<&str> {
    el.value().attr("href")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn following_starts_with_descendants() {
        let doc = Html::parse_document("<div id='a'><p>x</p></div><span>y</span>");
        let index = DocIndex::new(&doc);
        let div = index.elements().find(|e| is_tag(*e, "div")).unwrap();
        let names: Vec<_> = index.following(div).map(|e| e.value().name().to_string()).collect();
        assert_eq!(names, vec!["p", "span"]);
    }

    #[test]
    fn text_helpers() {
        let doc = Html::parse_fragment("<div> CS&nbsp;201 <b> Intro </b>\n</div>");
        let div = doc.root_element().descendants().filter_map(ElementRef::wrap).find(|e| is_tag(*e, "div")).unwrap();
        assert_eq!(stripped_text(div), "CS\u{a0}201Intro");
        assert_eq!(joined_text(div, " "), "CS\u{a0}201 Intro");
    }

    #[test]
    fn header_keywords() {
        let doc = Html::parse_document("<table><tr><th>Course</th><th>ECTS</th></tr></table>");
        let table = DocIndex::new(&doc).elements().find(|e| is_tag(*e, "table")).unwrap();
        assert!(has_header(table, &["ECTS"]));
        assert!(!has_header(table, &["SU Credits"]));
    }

    #[test]
    fn header_keywords_match_mixed_content() {
        let doc = Html::parse_document("<table><tr><th><b>Course</b> code</th></tr></table>");
        let table = DocIndex::new(&doc).elements().find(|e| is_tag(*e, "table")).unwrap();
        assert!(has_header(table, &["Course"]));
    }
}

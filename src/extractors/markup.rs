// src/extractors/markup.rs

//! The five tree primitives every extractor is written against.
//!
//! Paths are `/`-separated steps over *direct* element children, each step a
//! tag name optionally followed by `.class` (e.g. `div.sel_box/div`). Text
//! nodes and comments never match a step.

use scraper::ElementRef;

/// One `tag[.class]` step of a child path.
#[derive(Debug, Clone, Copy)]
struct Step<'p> {
    tag: &'p str,
    class: Option<&'p str>,
}

impl<'p> Step<'p> {
    fn parse(raw: &'p str) -> Self {
        match raw.split_once('.') {
            Some((tag, class)) => Self { tag, class: Some(class) },
            None => Self { tag: raw, class: None },
        }
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        element.value().name().eq_ignore_ascii_case(self.tag)
            && self.class.map_or(true, |c| element.has_class(c))
    }
}

fn steps(path: &str) -> impl Iterator<Item = Step<'_>> {
    path.split('/').filter(|s| !s.is_empty()).map(Step::parse)
}

pub trait NodeExt<'a> {
    /// First element reached by following `path` through direct children.
    fn child_by(&self, path: &str) -> Option<ElementRef<'a>>;

    /// Every element reached by following `path`, in document order.
    fn children_by(&self, path: &str) -> Vec<ElementRef<'a>>;

    /// Concatenated descendant text, entities already decoded.
    fn inner_text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<&'a str>;

    fn has_class(&self, class: &str) -> bool;
}

impl<'a> NodeExt<'a> for ElementRef<'a> {
    fn child_by(&self, path: &str) -> Option<ElementRef<'a>> {
        self.children_by(path).into_iter().next()
    }

    fn children_by(&self, path: &str) -> Vec<ElementRef<'a>> {
        let mut current = vec![*self];
        for step in steps(path) {
            current = current
                .iter()
                .flat_map(|parent| parent.children().filter_map(ElementRef::wrap))
                .filter(|child| step.matches(child))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    fn inner_text(&self) -> String {
        self.text().collect()
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn has_class(&self, class: &str) -> bool {
        self.value().classes().any(|c| c == class)
    }
}

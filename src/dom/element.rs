use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Owned snapshot of an element matched in an HTML document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomElement {
    /// Position among the matches of the query that produced it.
    pub index: usize,
    pub tag_name: String,
    pub element_id: Option<String>,
    pub class_name: Option<String>,
    pub text_content: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub css_selector: String,
}

impl DomElement {
    pub fn new(tag_name: impl Into<String>, index: usize) -> Self {
        let tag_name = tag_name.into();
        Self {
            index,
            css_selector: tag_name.clone(),
            tag_name,
            element_id: None,
            class_name: None,
            text_content: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_text_content(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            "id" => self.element_id = Some(value.clone()),
            "class" => self.class_name = Some(value.clone()),
            _ => {}
        }
        self.attributes.insert(key, value);
        self.css_selector = self.build_css_selector();
        self
    }

    pub(crate) fn from_element_ref(element_ref: &ElementRef<'_>, index: usize) -> Self {
        let element = element_ref.value();
        let mut dom_element = DomElement::new(element.name(), index);

        for (name, value) in element.attrs() {
            dom_element = dom_element.with_attribute(name, value);
        }

        let text = element_ref.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            dom_element = dom_element.with_text_content(text);
        }

        dom_element
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name
            .as_deref()
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Text content cut to at most `max_chars` characters.
    pub fn text_truncated(&self, max_chars: usize) -> Option<String> {
        self.text_content
            .as_ref()
            .map(|text| text.chars().take(max_chars).collect())
    }

    /// Short human-readable description, e.g. `link with ID 'home' containing 'Home'`.
    pub fn describe(&self) -> String {
        let mut parts = vec![];

        match self.tag_name.as_str() {
            "input" => match self.attributes.get("type") {
                Some(input_type) => parts.push(format!("{} input field", input_type)),
                None => parts.push("text input field".to_string()),
            },
            "a" => parts.push("link".to_string()),
            "select" => parts.push("dropdown menu".to_string()),
            "textarea" => parts.push("text area".to_string()),
            other => parts.push(format!("{} element", other)),
        }

        if let Some(name) = self.attributes.get("name") {
            parts.push(format!("named '{}'", name));
        }
        if let Some(id) = &self.element_id {
            parts.push(format!("with ID '{}'", id));
        }
        if let Some(text) = &self.text_content {
            if text.len() < 100 {
                parts.push(format!("containing '{}'", text));
            }
        }

        parts.join(" ")
    }

    fn build_css_selector(&self) -> String {
        if let Some(id) = &self.element_id {
            format!("{}#{}", self.tag_name, css_escape(id))
        } else if let Some(name) = self.attributes.get("name") {
            format!("{}[name='{}']", self.tag_name, name)
        } else if let Some(class) = &self.class_name {
            let classes: Vec<&str> = class.split_whitespace().collect();
            if classes.is_empty() {
                self.tag_name.clone()
            } else {
                format!("{}.{}", self.tag_name, classes.join("."))
            }
        } else {
            self.tag_name.clone()
        }
    }
}

fn css_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' | '.' | '#' | ':' | '[' | ']' | '(' | ')' | '\'' | '"' => format!("\\{}", c),
            _ => c.to_string(),
        })
        .collect()
}

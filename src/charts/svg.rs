//! SVG Document Builder
//! A small element tree that serializes to standalone SVG markup.

use std::fmt::Write;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl ToString) -> Self {
        self.attrs.push((name, value.to_string()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    fn write_to(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.name);
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }

        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }

        // Text-only elements stay on one line so whitespace is not rendered
        if let [Node::Text(text)] = self.children.as_slice() {
            let _ = writeln!(out, ">{}</{}>", escape(text), self.name);
            return;
        }

        out.push_str(">\n");
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(out, depth + 1),
                Node::Text(text) => {
                    let _ = writeln!(out, "{indent}  {}", escape(text));
                }
            }
        }
        let _ = writeln!(out, "{indent}</{}>", self.name);
    }
}

/// Root `<svg>` element of the given pixel size.
pub fn svg_root(width: f64, height: f64) -> Element {
    Element::new("svg")
        .attr("xmlns", SVG_NS)
        .attr("width", width)
        .attr("height", height)
        .attr("viewBox", format!("0 0 {width} {height}"))
}

/// Serialize a root element as a standalone document.
pub fn document(root: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    root.write_to(&mut out, 0);
    out
}

pub fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", super::curve::num(x), super::curve::num(y))
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! Arena-backed XML document.
//!
//! Every node lives in a single `Vec` owned by [`Document`] and is addressed
//! through a copyable [`NodeId`]. Nodes that get detached (cleared, replaced)
//! stay in the arena until the document is dropped, so a handle is never
//! dangling for the lifetime of its document.
//!
//! Text is modelled as child nodes rather than lxml-style `text`/`tail`
//! fields; [`Document::text`] recovers the leading text run of an element.

use anyhow::{Context, Result, bail};
use quick_xml::escape::{escape, partial_escape, unescape};
use std::borrow::Cow;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Handle to a node owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An element's qualified name and its attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Name without its namespace prefix (`xliff:g` -> `g`).
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Namespace prefix, if the name carries one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic node that owns the prolog, the root element and the epilog.
    Document,
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document that owns all of its nodes.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document holding only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parses an XML string.
    ///
    /// Literal line breaks are normalized to `\n` as XML requires; other
    /// whitespace is kept exactly as written. Entities are unescaped after
    /// that, so a `&#xD;` reference still becomes a carriage return.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut doc = Self::new();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut stack = vec![doc.root()];

        loop {
            let event = reader.read_event().context("Invalid XML in XLF file")?;
            let Some(&parent) = stack.last() else {
                bail!("Invalid XML in XLF file: unbalanced closing tag");
            };

            match event {
                Event::Start(start) => {
                    let id = doc.push(NodeKind::Element(element_from(&start)?));
                    doc.append_child(parent, id);
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let id = doc.push(NodeKind::Element(element_from(&start)?));
                    doc.append_child(parent, id);
                }
                Event::End(_) => {
                    if stack.len() <= 1 {
                        bail!("Invalid XML in XLF file: unbalanced closing tag");
                    }
                    stack.pop();
                }
                Event::Text(text) => {
                    let raw = utf8(&text)?;
                    let text = unescape(&normalize_line_endings(&raw))
                        .context("Invalid XML in XLF file")?
                        .into_owned();
                    if !text.is_empty() {
                        let id = doc.push(NodeKind::Text(text));
                        doc.append_child(parent, id);
                    }
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .context("CDATA section is not valid UTF-8")?;
                    let text = normalize_line_endings(&text).into_owned();
                    let id = doc.push(NodeKind::CData(text));
                    doc.append_child(parent, id);
                }
                Event::Comment(comment) => {
                    let comment = normalize_line_endings(&utf8(&comment)?).into_owned();
                    let id = doc.push(NodeKind::Comment(comment));
                    doc.append_child(parent, id);
                }
                Event::PI(pi) => {
                    let id = doc.push(NodeKind::ProcessingInstruction(utf8(&pi)?));
                    doc.append_child(parent, id);
                }
                Event::DocType(doctype) => {
                    let id = doc.push(NodeKind::DocType(utf8(&doctype)?));
                    doc.append_child(parent, id);
                }
                // The declaration is regenerated on output.
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        if stack.len() != 1 {
            bail!("Invalid XML in XLF file: unexpected end of document");
        }
        if doc.root_element().is_none() {
            bail!("Invalid XML in XLF file: no root element");
        }

        Ok(doc)
    }

    /// Serializes the document with a UTF-8 XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .context("Failed to write XML declaration")?;

        let prolog_has_text = self
            .children(self.root())
            .first()
            .is_some_and(|&first| matches!(self.kind(first), NodeKind::Text(_)));
        if !prolog_has_text {
            writer
                .write_event(Event::Text(BytesText::from_escaped("\n")))
                .context("Failed to write XML declaration")?;
        }

        for &child in self.children(self.root()) {
            self.write_node(&mut writer, child)?;
        }

        String::from_utf8(writer.into_inner()).context("Serialized document is not valid UTF-8")
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<()> {
        let event = match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(writer, child)?;
                }
                return Ok(());
            }
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for (key, value) in &element.attributes {
                    let value = escape_attribute(value);
                    start.push_attribute((key.as_bytes(), value.as_bytes()));
                }

                let children = self.children(id);
                if children.is_empty() {
                    Event::Empty(start)
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .with_context(|| format!("Failed to write <{}>", element.name))?;
                    for &child in children {
                        self.write_node(writer, child)?;
                    }
                    Event::End(BytesEnd::new(element.name.as_str()))
                }
            }
            NodeKind::Text(text) => Event::Text(BytesText::from_escaped(escape_text(text))),
            NodeKind::CData(text) => Event::CData(BytesCData::new(text.as_str())),
            NodeKind::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
            NodeKind::ProcessingInstruction(text) => {
                Event::PI(BytesText::from_escaped(text.as_str()))
            }
            NodeKind::DocType(text) => Event::DocType(BytesText::from_escaped(text.as_str())),
        };

        writer
            .write_event(event)
            .context("Failed to serialize XML node")?;
        Ok(())
    }

    /// The synthetic document node.
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The single top-level element (`<xliff>` for XLIFF files).
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::local_name)
    }

    /// Returns `true` if `id` is an element with the given local name.
    pub fn is_element(&self, id: NodeId, local_name: &str) -> bool {
        self.local_name(id) == Some(local_name)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attr(name))
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Position of `child` among its parent's children.
    pub fn index_in_parent(&self, child: NodeId) -> Option<usize> {
        let parent = self.parent(child)?;
        self.children(parent).iter().position(|&c| c == child)
    }

    /// All nodes below `id` in document (pre-)order, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }

        out
    }

    /// Descendant elements with the given local name, in document order.
    pub fn descendant_elements(&self, id: NodeId, local_name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| self.is_element(node, local_name))
            .collect()
    }

    /// First child element with the given local name.
    pub fn find_child(&self, id: NodeId, local_name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.is_element(child, local_name))
    }

    /// Leading text of an element, up to its first non-text child.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Text(text) | NodeKind::CData(text) => out.push_str(text),
                _ => break,
            }
        }
        out
    }

    /// Concatenation of every text and CDATA node below `id`.
    pub fn all_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(name)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.node(child).parent {
            self.node_mut(parent).children.retain(|&c| c != child);
            self.node_mut(child).parent = None;
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Inserts `child` at `index` (clamped to the child count).
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Removes all children and, for elements, all attributes.
    pub fn clear(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.node_mut(id).children);
        for child in children {
            self.node_mut(child).parent = None;
        }
        if let NodeKind::Element(element) = &mut self.node_mut(id).kind {
            element.attributes.clear();
        }
    }

    /// Sets or replaces an attribute. No-op on non-element nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(element) = &mut self.node_mut(id).kind {
            if let Some(slot) = element.attributes.iter_mut().find(|(key, _)| key == name) {
                slot.1 = value.to_string();
            } else {
                element
                    .attributes
                    .push((name.to_string(), value.to_string()));
            }
        }
    }

    /// Replaces the leading text run of an element, leaving child elements
    /// and the text between them untouched.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let leading: Vec<NodeId> = self
            .children(id)
            .iter()
            .copied()
            .take_while(|&child| {
                matches!(self.kind(child), NodeKind::Text(_) | NodeKind::CData(_))
            })
            .collect();

        for child in leading {
            self.detach(child);
        }

        if !text.is_empty() {
            let node = self.create_text(text);
            self.insert_child(id, 0, node);
        }
    }

    /// Builds a detached copy of the subtree rooted at `source`.
    pub fn deep_copy(&mut self, source: NodeId) -> NodeId {
        let kind = self.kind(source).clone();
        let children = self.children(source).to_vec();

        let copy = self.push(kind);
        for child in children {
            let child_copy = self.deep_copy(child);
            self.append_child(copy, child_copy);
        }

        copy
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .context("Element name is not valid UTF-8")?
        .to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.with_context(|| format!("Malformed attribute on <{name}>"))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .context("Attribute name is not valid UTF-8")?
            .to_string();
        let raw = std::str::from_utf8(&attr.value)
            .with_context(|| format!("Attribute '{key}' on <{name}> is not valid UTF-8"))?;
        let value = unescape(&normalize_line_endings(raw))
            .with_context(|| format!("Malformed value for attribute '{key}' on <{name}>"))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element { name, attributes })
}

fn utf8(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)
        .context("XML content is not valid UTF-8")?
        .to_string())
}

/// `\r\n` and lone `\r` become `\n`, as an XML processor must do before
/// anything else.
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

// Carriage returns are written as character references so they survive
// end-of-line normalization when the file is parsed again.
fn escape_text(text: &str) -> String {
    partial_escape(text).replace('\r', "&#xD;")
}

fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\r', "&#xD;")
        .replace('\n', "&#xA;")
        .replace('\t', "&#x9;")
}

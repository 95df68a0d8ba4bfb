use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use crate::error::Result;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Element(NodeId),
    Text(String),
    CData(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Element tree stored in an arena, so that finished elements stay
/// addressable (usages are appended to declarations after the fact).
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new(root: &str) -> Self {
        Self {
            elements: vec![Element {
                name: root.to_owned(),
                attributes: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Element {
        &self.elements[id.0]
    }

    pub fn append_element(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = NodeId(self.elements.len());
        self.elements.push(Element {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
        });
        self.elements[parent.0].children.push(Content::Element(id));
        id
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: &str) {
        self.elements[id.0]
            .attributes
            .push((key.to_owned(), value.to_owned()));
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        self.elements[parent.0]
            .children
            .push(Content::Text(text.to_owned()));
    }

    pub fn append_cdata(&mut self, parent: NodeId, text: &str) {
        self.elements[parent.0]
            .children
            .push(Content::CData(text.to_owned()));
    }

    /// Child elements of `parent`, in document order.
    pub fn child_elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(parent).children.iter().filter_map(|c| match c {
            Content::Element(id) => Some(*id),
            _ => None,
        })
    }

    /// Every element named `name` below `parent`, depth first.
    pub fn descendants_named(&self, parent: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        for child in self.child_elements(parent) {
            if self.get(child).name == name {
                found.push(child);
            }
            found.extend(self.descendants_named(child, name));
        }
        found
    }

    /// Concatenated text and CDATA below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.get(id).children {
            match child {
                Content::Element(child) => out.push_str(&self.text_content(*child)),
                Content::Text(text) | Content::CData(text) => out.push_str(text),
            }
        }
        out
    }

    /// Serializes the tree as indented XML (two spaces per level).
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.write_element(&mut writer, self.root())?;

        let bytes = writer.into_inner().into_inner();
        let mut xml = String::from_utf8(bytes)?;
        if !xml.ends_with('\n') {
            xml.push('\n');
        }
        Ok(xml)
    }

    fn write_element(&self, writer: &mut Writer<Cursor<Vec<u8>>>, id: NodeId) -> Result<()> {
        let element = self.get(id);
        let mut start = BytesStart::new(element.name.as_str());
        for (key, value) in &element.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if element.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &element.children {
            match child {
                Content::Element(child) => self.write_element(writer, *child)?,
                Content::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                Content::CData(text) => write_cdata(writer, text)?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        Ok(())
    }
}

/// Writes `text` as CDATA, splitting it into adjacent sections wherever it
/// contains the `]]>` terminator.
fn write_cdata(writer: &mut Writer<Cursor<Vec<u8>>>, text: &str) -> Result<()> {
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        let (head, tail) = rest.split_at(pos + 2);
        writer.write_event(Event::CData(BytesCData::new(head)))?;
        rest = tail;
    }
    writer.write_event(Event::CData(BytesCData::new(rest)))?;
    Ok(())
}

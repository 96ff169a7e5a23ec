//! Small convenience layer over the quick-xml event writer.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;

/// An indented XML document under construction.
pub(crate) struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    /// Start a document with the UTF-8 declaration.
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        Ok(Self { writer })
    }

    /// Open `<name attrs...>`.
    pub fn open(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<()> {
        let start = element(name, attrs);
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    /// Close `</name>`.
    pub fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Self-closing `<name attrs.../>`.
    pub fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<()> {
        let start = element(name, attrs);
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    /// `<name>text</name>`.
    pub fn text(&mut self, name: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Finish and return the document text.
    pub fn finish(self) -> Result<String> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}

fn element<'a>(name: &'a str, attrs: &'a [(&'a str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

/// Space-separated list, the way numeric arrays appear in the descriptors.
pub(crate) fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

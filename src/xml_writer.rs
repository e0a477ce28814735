// Stateful XML document builder.
//
// `XmlBuilder` keeps a stack of open elements on top of a `quick_xml::Writer`
// and refuses operations that would produce malformed output. A start tag is
// held back until the first piece of content arrives so attributes can still
// be attached to it; an element closed with no content is written
// self-closing.
//
// Raw fragments are spliced verbatim and never re-validated.

use crate::error::XmlError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub struct XmlBuilder {
    writer: Writer<Vec<u8>>,
    open: Vec<String>,
    pending: Option<BytesStart<'static>>,
    in_document: bool,
}

impl Default for XmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlBuilder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
            open: Vec::new(),
            pending: None,
            in_document: false,
        }
    }

    // Discard whatever is in progress and start from an empty buffer
    pub fn flush(&mut self) {
        self.writer = Writer::new(Vec::new());
        self.open.clear();
        self.pending = None;
        self.in_document = false;
    }

    pub fn start_document(&mut self) -> Result<(), XmlError> {
        if self.in_document || !self.is_empty() {
            return Err(XmlError::DocumentAlreadyStarted);
        }
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.in_document = true;
        Ok(())
    }

    // Closes every element still open, leaving the stack empty
    pub fn end_document(&mut self) -> Result<(), XmlError> {
        if !self.in_document {
            return Err(XmlError::DocumentNotStarted);
        }
        while !self.open.is_empty() {
            self.end_element()?;
        }
        self.in_document = false;
        Ok(())
    }

    pub fn start_element(&mut self, name: &str) -> Result<(), XmlError> {
        self.commit_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    pub fn end_element(&mut self) -> Result<(), XmlError> {
        let name = self.open.pop().ok_or(XmlError::NoOpenElement)?;
        match self.pending.take() {
            Some(start) => self.write(Event::Empty(start)),
            None => self.write(Event::End(BytesEnd::new(name))),
        }
    }

    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<(), XmlError> {
        let start = self
            .pending
            .as_mut()
            .ok_or_else(|| XmlError::AttributeOutOfPosition {
                name: name.to_string(),
            })?;
        start.push_attribute((name, value));
        Ok(())
    }

    // start + escaped text + end; an empty value yields `<name/>`
    pub fn write_element(&mut self, name: &str, value: &str) -> Result<(), XmlError> {
        self.start_element(name)?;
        if !value.is_empty() {
            self.write_text(value)?;
        }
        self.end_element()
    }

    pub fn write_text(&mut self, value: &str) -> Result<(), XmlError> {
        self.commit_pending()?;
        self.write(Event::Text(BytesText::new(value)))
    }

    pub fn write_raw(&mut self, fragment: &str) -> Result<(), XmlError> {
        self.commit_pending()?;
        self.write(Event::Text(BytesText::from_escaped(fragment)))
    }

    pub fn content(&self) -> Result<String, XmlError> {
        if !self.open.is_empty() {
            return Err(XmlError::UnclosedElements(self.open.clone()));
        }
        if self.in_document {
            return Err(XmlError::DocumentNotEnded);
        }
        String::from_utf8(self.writer.get_ref().clone()).map_err(|e| XmlError::Write(e.to_string()))
    }

    pub fn open_elements(&self) -> &[String] {
        &self.open
    }

    pub fn is_empty(&self) -> bool {
        self.writer.get_ref().is_empty() && self.pending.is_none()
    }

    fn commit_pending(&mut self) -> Result<(), XmlError> {
        match self.pending.take() {
            Some(start) => self.write(Event::Start(start)),
            None => Ok(()),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), XmlError> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlError::Write(e.to_string()))
    }
}

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use super::element::Element;
use crate::core::FacturxError;

fn xml_io(e: std::io::Error) -> FacturxError {
    FacturxError::Xml(format!("XML write error: {e}"))
}

/// Serializes an [`Element`] tree as an indented UTF-8 document.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, FacturxError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    /// Finish the document; the result ends with a newline.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut buf = self.writer.into_inner().into_inner();
        buf.push(b'\n');
        buf
    }

    pub fn write_element(&mut self, element: &Element) -> Result<&mut Self, FacturxError> {
        let name = element.qualified_name();
        let mut start = BytesStart::new(name.as_str());
        for (key, value) in element.attributes() {
            start.push_attribute((*key, value.as_str()));
        }
        self.writer
            .write_event(Event::Start(start))
            .map_err(xml_io)?;

        if let Some(text) = element.text() {
            self.writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_io)?;
        }
        for child in element.children() {
            self.write_element(child)?;
        }

        self.writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(xml_io)?;
        Ok(self)
    }
}

/// Serialize `root` as a complete document with an XML declaration.
pub fn to_document_bytes(root: &Element) -> Result<Vec<u8>, FacturxError> {
    let mut w = XmlWriter::new()?;
    w.write_element(root)?;
    Ok(w.into_bytes())
}

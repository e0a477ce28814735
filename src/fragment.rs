use crate::error::XmlError;
use crate::xml_writer::XmlBuilder;

// A self-contained piece of a request document.
//
// Implementors write their subtree in the carrier's fixed element order and
// never look at the state of the service that owns them.
pub trait Fragment {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError>;

    fn render(&self) -> Result<String, XmlError> {
        let mut xml = XmlBuilder::new();
        self.write_to(&mut xml)?;
        xml.content()
    }
}

// Writes `name` only when the value is present and non-empty
pub(crate) fn write_optional(
    xml: &mut XmlBuilder,
    name: &str,
    value: &str,
) -> Result<(), XmlError> {
    if value.is_empty() {
        Ok(())
    } else {
        xml.write_element(name, value)
    }
}

// Well-formedness check used by the fragment tests
#[cfg(test)]
pub(crate) fn assert_well_formed(fragment: &str) {
    use quick_xml::events::Event;
    use quick_xml::reader::Reader;

    let wrapped = format!("<root>{}</root>", fragment);
    let mut reader = Reader::from_str(&wrapped);
    let mut depth = 0i32;
    loop {
        match reader.read_event() {
            Ok(Event::Start(_)) => depth += 1,
            Ok(Event::End(_)) => depth -= 1,
            Ok(Event::Eof) => break,
            Err(e) => panic!("Fragment is not well-formed: {:?}\n{}", e, fragment),
            _ => (),
        }
    }
    assert_eq!(depth, 0, "Unbalanced fragment: {}", fragment);
}

use crate::error::XmlError;
use crate::xml_writer::XmlBuilder;
use tracing::debug;

// How one kind of request document is put together. The builder drives the
// document lifecycle; assemblers only say what goes inside it.
pub trait RequestAssembler {
    fn kind(&self) -> &'static str;

    fn open_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError>;

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<(), XmlError>;

    fn close_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError>;
}

// Flushes the builder and produces one complete document
pub fn assemble<A>(xml: &mut XmlBuilder, assembler: &A) -> Result<String, XmlError>
where
    A: RequestAssembler + ?Sized,
{
    xml.flush();
    xml.start_document()?;
    assembler.open_envelope(xml)?;
    assembler.write_body(xml)?;
    assembler.close_envelope(xml)?;
    xml.end_document()?;

    let content = xml.content()?;
    debug!(
        kind = assembler.kind(),
        bytes = content.len(),
        "request document assembled"
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting<'a> {
        names: &'a [&'a str],
        leave_open: bool,
    }

    impl RequestAssembler for Greeting<'_> {
        fn kind(&self) -> &'static str {
            "greeting"
        }

        fn open_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
            xml.start_element("Hello")?;
            xml.write_attribute("version", "1")
        }

        fn write_body(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
            for name in self.names {
                xml.write_element("Name", name)?;
            }
            Ok(())
        }

        fn close_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
            if self.leave_open {
                Ok(())
            } else {
                xml.end_element()
            }
        }
    }

    #[test]
    fn test_assemble_flushes_previous_state() {
        let mut xml = XmlBuilder::new();
        xml.start_element("Leftover").unwrap();

        let doc = assemble(
            &mut xml,
            &Greeting {
                names: &["a", "b"],
                leave_open: false,
            },
        )
        .unwrap();

        assert_eq!(
            doc,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Hello version=\"1\"><Name>a</Name><Name>b</Name></Hello>"
        );
    }

    #[test]
    fn test_end_document_closes_what_assembler_left_open() {
        let mut xml = XmlBuilder::new();
        let doc = assemble(
            &mut xml,
            &Greeting {
                names: &["a"],
                leave_open: true,
            },
        )
        .unwrap();
        assert!(doc.ends_with("<Name>a</Name></Hello>"));
    }
}

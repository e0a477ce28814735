use crate::error::{ServiceError, XmlError};
use crate::fragment::Fragment;
use crate::xml_writer::XmlBuilder;

// Documents the carrier can print for a booked consignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrintDocument {
    Connote,
    Label,
    Manifest,
    Invoice,
}

impl PrintDocument {
    fn element(&self) -> &'static str {
        match self {
            PrintDocument::Connote => "CONNOTE",
            PrintDocument::Label => "LABEL",
            PrintDocument::Manifest => "MANIFEST",
            PrintDocument::Invoice => "INVOICE",
        }
    }

    const ORDER: [PrintDocument; 4] = [
        PrintDocument::Connote,
        PrintDocument::Label,
        PrintDocument::Manifest,
        PrintDocument::Invoice,
    ];
}

// Steps the carrier should run on the submitted consignments.
//
// Nothing is rendered until at least one step is requested, so a shipment
// without activity leaves the section out of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activity {
    create: Vec<String>,
    rate: Vec<String>,
    book: Vec<String>,
    show_booking_ref: bool,
    ship: Vec<String>,
    print: Vec<(PrintDocument, Vec<String>)>,
    email_to: String,
    email_from: String,
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, conrefs: &[&str]) -> &mut Self {
        self.create = to_owned(conrefs);
        self
    }

    pub fn rate(&mut self, conrefs: &[&str]) -> &mut Self {
        self.rate = to_owned(conrefs);
        self
    }

    pub fn book(&mut self, conrefs: &[&str], show_booking_ref: bool) -> &mut Self {
        self.book = to_owned(conrefs);
        self.show_booking_ref = show_booking_ref;
        self
    }

    pub fn ship(&mut self, conrefs: &[&str]) -> &mut Self {
        self.ship = to_owned(conrefs);
        self
    }

    pub fn print(&mut self, document: PrintDocument, conrefs: &[&str]) -> &mut Self {
        self.print.retain(|(doc, _)| *doc != document);
        self.print.push((document, to_owned(conrefs)));
        self
    }

    // Emailing rides on the PRINT step, so request a document first
    pub fn email_documents(&mut self, to: &str, from: &str) -> Result<&mut Self, ServiceError> {
        if self.print.is_empty() {
            return Err(ServiceError::InvalidInput(
                "documents can only be emailed once a print step is requested".to_string(),
            ));
        }
        self.email_to = to.to_string();
        self.email_from = from.to_string();
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.create.is_empty()
            && self.rate.is_empty()
            && self.book.is_empty()
            && self.ship.is_empty()
            && self.print.is_empty()
    }
}

fn to_owned(conrefs: &[&str]) -> Vec<String> {
    conrefs.iter().map(|c| c.to_string()).collect()
}

fn write_step(xml: &mut XmlBuilder, name: &str, conrefs: &[String]) -> Result<(), XmlError> {
    xml.start_element(name)?;
    for conref in conrefs {
        xml.write_element("CONREF", conref)?;
    }
    xml.end_element()
}

impl Fragment for Activity {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        if self.is_empty() {
            return Ok(());
        }

        xml.start_element("ACTIVITY")?;
        if !self.create.is_empty() {
            write_step(xml, "CREATE", &self.create)?;
        }
        if !self.rate.is_empty() {
            write_step(xml, "RATE", &self.rate)?;
        }
        if !self.book.is_empty() {
            xml.start_element("BOOK")?;
            if self.show_booking_ref {
                xml.write_attribute("ShowBookingRef", "Y")?;
            }
            for conref in &self.book {
                xml.write_element("CONREF", conref)?;
            }
            xml.end_element()?;
        }
        if !self.ship.is_empty() {
            write_step(xml, "SHIP", &self.ship)?;
        }
        if !self.print.is_empty() {
            xml.start_element("PRINT")?;
            // Carrier order, not request order
            for document in PrintDocument::ORDER {
                if let Some((_, conrefs)) = self.print.iter().find(|(doc, _)| *doc == document) {
                    write_step(xml, document.element(), conrefs)?;
                }
            }
            if !self.email_to.is_empty() {
                xml.write_element("EMAILTO", &self.email_to)?;
                xml.write_element("EMAILFROM", &self.email_from)?;
            }
            xml.end_element()?;
        }
        xml.end_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::assert_well_formed;

    #[test]
    fn test_empty_activity_renders_nothing() {
        assert_eq!(Activity::new().render().unwrap(), "");
    }

    #[test]
    fn test_full_activity() {
        let mut activity = Activity::new();
        activity
            .create(&["REF-1", "REF-2"])
            .book(&["REF-1"], true)
            .ship(&["REF-1"])
            .print(PrintDocument::Label, &["REF-1"])
            .print(PrintDocument::Connote, &["REF-1"])
            .email_documents("ops@example.com", "noreply@example.com")
            .unwrap();

        let xml = activity.render().unwrap();
        assert_well_formed(&xml);
        assert_eq!(
            xml,
            "<ACTIVITY>\
             <CREATE><CONREF>REF-1</CONREF><CONREF>REF-2</CONREF></CREATE>\
             <BOOK ShowBookingRef=\"Y\"><CONREF>REF-1</CONREF></BOOK>\
             <SHIP><CONREF>REF-1</CONREF></SHIP>\
             <PRINT><CONNOTE><CONREF>REF-1</CONREF></CONNOTE><LABEL><CONREF>REF-1</CONREF></LABEL>\
             <EMAILTO>ops@example.com</EMAILTO><EMAILFROM>noreply@example.com</EMAILFROM></PRINT>\
             </ACTIVITY>"
        );
    }

    #[test]
    fn test_email_without_print_rejected() {
        let mut activity = Activity::new();
        activity.ship(&["REF-1"]);

        let result = activity.email_documents("ops@example.com", "noreply@example.com");
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
        assert!(!activity.render().unwrap().contains("EMAILTO"));
    }

    #[test]
    fn test_print_request_replaces_previous() {
        let mut activity = Activity::new();
        activity
            .print(PrintDocument::Label, &["A"])
            .print(PrintDocument::Label, &["B"]);

        let xml = activity.render().unwrap();
        assert!(xml.contains("<LABEL><CONREF>B</CONREF></LABEL>"));
        assert!(!xml.contains("<CONREF>A</CONREF>"));
    }
}

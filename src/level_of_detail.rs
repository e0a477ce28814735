use crate::error::XmlError;
use crate::fragment::Fragment;
use crate::xml_writer::XmlBuilder;

// Parts of the complete view that can be switched on individually
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompleteDetail {
    pub origin_address: bool,
    pub destination_address: bool,
    pub package: bool,
    pub shipment: bool,
    pub pod_summary: bool,
    pub pod_detail: bool,
}

impl CompleteDetail {
    pub fn all() -> Self {
        Self {
            origin_address: true,
            destination_address: true,
            package: true,
            shipment: true,
            pod_summary: true,
            pod_detail: true,
        }
    }
}

// How much event detail the tracking reply carries.
//
// Defaults to the summary view, the carrier's minimum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelOfDetail {
    complete: Option<CompleteDetail>,
    pod_url: bool,
}

impl LevelOfDetail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_summary(&mut self) -> &mut Self {
        self.complete = None;
        self
    }

    pub fn set_complete(&mut self, detail: CompleteDetail) -> &mut Self {
        self.complete = Some(detail);
        self
    }

    // Ask for a proof-of-delivery image link
    pub fn set_pod_url(&mut self, enabled: bool) -> &mut Self {
        self.pod_url = enabled;
        self
    }

    pub fn is_summary(&self) -> bool {
        self.complete.is_none()
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl Fragment for LevelOfDetail {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.start_element("LevelOfDetail")?;
        match &self.complete {
            None => {
                xml.start_element("Summary")?;
                xml.end_element()?;
            }
            Some(detail) => {
                xml.start_element("Complete")?;
                xml.write_attribute("originAddress", flag(detail.origin_address))?;
                xml.write_attribute("destinationAddress", flag(detail.destination_address))?;
                xml.write_attribute("package", flag(detail.package))?;
                xml.write_attribute("shipment", flag(detail.shipment))?;
                xml.write_attribute("podSummary", flag(detail.pod_summary))?;
                xml.write_attribute("podDetail", flag(detail.pod_detail))?;
                xml.end_element()?;
            }
        }
        if self.pod_url {
            xml.start_element("POD")?;
            xml.write_attribute("format", "URL")?;
            xml.end_element()?;
        }
        xml.end_element()
    }
}

use crate::address::Address;
use crate::error::{ServiceError, XmlError};
use crate::fragment::{write_optional, Fragment};
use crate::xml_writer::XmlBuilder;
use chrono::{NaiveDate, NaiveTime};

// Pickup window, rendered as HHMM pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

impl TimeWindow {
    pub fn new(from: NaiveTime, to: NaiveTime) -> Self {
        Self { from, to }
    }

    fn write_to(&self, xml: &mut XmlBuilder, name: &str) -> Result<(), XmlError> {
        xml.start_element(name)?;
        xml.write_element("FROM", &self.from.format("%H%M").to_string())?;
        xml.write_element("TO", &self.to.format("%H%M").to_string())?;
        xml.end_element()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    address: Address,
    ship_date: Option<NaiveDate>,
    preferred: Option<TimeWindow>,
    alternative: Option<TimeWindow>,
    instructions: String,
}

impl Collection {
    // Starts from a copy of the given address, usually the sender's
    pub fn new(address: Address) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    pub fn address_mut(&mut self) -> &mut Address {
        &mut self.address
    }

    pub fn set_address(&mut self, address: Address) -> &mut Self {
        self.address = address;
        self
    }

    pub fn set_ship_date(&mut self, date: NaiveDate) -> &mut Self {
        self.ship_date = Some(date);
        self
    }

    pub fn set_preferred_time(&mut self, from: NaiveTime, to: NaiveTime) -> &mut Self {
        self.preferred = Some(TimeWindow::new(from, to));
        self
    }

    pub fn set_alternative_time(&mut self, from: NaiveTime, to: NaiveTime) -> &mut Self {
        self.alternative = Some(TimeWindow::new(from, to));
        self
    }

    pub fn set_instructions(&mut self, instructions: &str) -> &mut Self {
        self.instructions = instructions.to_string();
        self
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn ship_date(&self) -> Option<NaiveDate> {
        self.ship_date
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.ship_date.is_none() {
            return Err(ServiceError::MissingConfiguration("collection ship date"));
        }
        let preferred = self
            .preferred
            .ok_or(ServiceError::MissingConfiguration("collection time window"))?;
        for window in std::iter::once(preferred).chain(self.alternative) {
            if window.from >= window.to {
                return Err(ServiceError::InvalidInput(format!(
                    "collection window {} - {} is empty",
                    window.from, window.to
                )));
            }
        }
        self.address.validate()
    }
}

impl Fragment for Collection {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.start_element("COLLECTIONADDRESS")?;
        self.address.write_to(xml)?;
        xml.end_element()?;

        let ship_date = self
            .ship_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default();
        xml.write_element("SHIPDATE", &ship_date)?;

        match &self.preferred {
            Some(window) => window.write_to(xml, "PREFCOLLECTTIME")?,
            None => xml.write_element("PREFCOLLECTTIME", "")?,
        }
        if let Some(window) = &self.alternative {
            window.write_to(xml, "ALTCOLLECTTIME")?;
        }
        write_optional(xml, "COLLINSTRUCTIONS", &self.instructions)
    }
}

use crate::error::{ServiceError, XmlError};
use crate::fragment::{write_optional, Fragment};
use crate::xml_writer::XmlBuilder;

// The carrier accepts at most three street lines
pub const MAX_STREET_LINES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    company_name: String,
    street_lines: Vec<String>,
    city: String,
    province: String,
    postcode: String,
    country: String,
    vat: String,
    contact_name: String,
    contact_dial_code: String,
    contact_telephone: String,
    contact_email: String,
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_company_name(&mut self, name: &str) -> &mut Self {
        self.company_name = name.to_string();
        self
    }

    // Appends one street line; lines past the third are rejected by `validate`
    pub fn add_street_line(&mut self, line: &str) -> &mut Self {
        self.street_lines.push(line.to_string());
        self
    }

    pub fn set_city(&mut self, city: &str) -> &mut Self {
        self.city = city.to_string();
        self
    }

    pub fn set_province(&mut self, province: &str) -> &mut Self {
        self.province = province.to_string();
        self
    }

    pub fn set_postcode(&mut self, postcode: &str) -> &mut Self {
        self.postcode = postcode.to_string();
        self
    }

    pub fn set_country(&mut self, country_code: &str) -> &mut Self {
        self.country = country_code.trim().to_ascii_uppercase();
        self
    }

    pub fn set_vat(&mut self, vat: &str) -> &mut Self {
        self.vat = vat.to_string();
        self
    }

    pub fn set_contact_name(&mut self, name: &str) -> &mut Self {
        self.contact_name = name.to_string();
        self
    }

    pub fn set_contact_phone(&mut self, dial_code: &str, telephone: &str) -> &mut Self {
        self.contact_dial_code = dial_code.to_string();
        self.contact_telephone = telephone.to_string();
        self
    }

    pub fn set_contact_email(&mut self, email: &str) -> &mut Self {
        self.contact_email = email.to_string();
        self
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.country.len() != 2 || !self.country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ServiceError::InvalidInput(format!(
                "country code must be two letters, got {:?}",
                self.country
            )));
        }
        if self.street_lines.len() > MAX_STREET_LINES {
            return Err(ServiceError::InvalidInput(format!(
                "at most {} street lines allowed, got {}",
                MAX_STREET_LINES,
                self.street_lines.len()
            )));
        }
        Ok(())
    }
}

impl Fragment for Address {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.write_element("COMPANYNAME", &self.company_name)?;
        let first = self.street_lines.first().map(String::as_str).unwrap_or("");
        xml.write_element("STREETADDRESS1", first)?;
        for (idx, line) in self
            .street_lines
            .iter()
            .enumerate()
            .take(MAX_STREET_LINES)
            .skip(1)
        {
            xml.write_element(&format!("STREETADDRESS{}", idx + 1), line)?;
        }
        xml.write_element("CITY", &self.city)?;
        write_optional(xml, "PROVINCE", &self.province)?;
        xml.write_element("POSTCODE", &self.postcode)?;
        xml.write_element("COUNTRY", &self.country)?;
        write_optional(xml, "VAT", &self.vat)?;
        write_optional(xml, "CONTACTNAME", &self.contact_name)?;
        write_optional(xml, "CONTACTDIALCODE", &self.contact_dial_code)?;
        write_optional(xml, "CONTACTTELEPHONE", &self.contact_telephone)?;
        write_optional(xml, "CONTACTEMAIL", &self.contact_email)
    }
}

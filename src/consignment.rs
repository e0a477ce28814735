use crate::address::Address;
use crate::error::{ServiceError, XmlError};
use crate::fragment::{write_optional, Fragment};
use crate::xml_writer::XmlBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsignmentType {
    #[default]
    NonDocument,
    Document,
}

impl ConsignmentType {
    pub fn code(&self) -> &'static str {
        match self {
            ConsignmentType::NonDocument => "N",
            ConsignmentType::Document => "D",
        }
    }
}

// Who pays for the shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentIndicator {
    #[default]
    Sender,
    Receiver,
}

impl PaymentIndicator {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentIndicator::Sender => "S",
            PaymentIndicator::Receiver => "R",
        }
    }
}

// Dimensions in metres, weight in kilograms, per item
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub items: u32,
    pub description: String,
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub weight: f64,
}

impl Package {
    pub fn new(items: u32, length: f64, height: f64, width: f64, weight: f64) -> Self {
        Self {
            items,
            description: String::new(),
            length,
            height,
            width,
            weight,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    fn volume(&self) -> f64 {
        self.length * self.height * self.width * f64::from(self.items)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consignment {
    conref: String,
    receiver: Address,
    delivery: Option<Address>,
    con_number: String,
    customer_ref: String,
    con_type: ConsignmentType,
    payment: PaymentIndicator,
    account_number: String,
    account_country: String,
    items: Option<u32>,
    total_weight: Option<f64>,
    total_volume: Option<f64>,
    currency: String,
    goods_value: Option<f64>,
    insurance_value: Option<f64>,
    insurance_currency: String,
    service: String,
    options: Vec<String>,
    description: String,
    delivery_instructions: String,
    packages: Vec<Package>,
}

impl Consignment {
    // Account fields come from the owning service only
    pub(crate) fn with_account(account_number: &str, account_country: &str) -> Self {
        Self {
            account_number: account_number.to_string(),
            account_country: account_country.to_string(),
            ..Self::default()
        }
    }

    pub fn set_conref(&mut self, conref: &str) -> &mut Self {
        self.conref = conref.to_string();
        self
    }

    pub fn receiver_mut(&mut self) -> &mut Address {
        &mut self.receiver
    }

    // Separate delivery address; the receiver's is used when never called
    pub fn delivery_mut(&mut self) -> &mut Address {
        self.delivery.get_or_insert_with(Address::new)
    }

    pub fn set_con_number(&mut self, con_number: &str) -> &mut Self {
        self.con_number = con_number.to_string();
        self
    }

    pub fn set_customer_reference(&mut self, reference: &str) -> &mut Self {
        self.customer_ref = reference.to_string();
        self
    }

    pub fn set_type(&mut self, con_type: ConsignmentType) -> &mut Self {
        self.con_type = con_type;
        self
    }

    pub fn set_payment(&mut self, payment: PaymentIndicator) -> &mut Self {
        self.payment = payment;
        self
    }

    pub fn set_items(&mut self, items: u32) -> &mut Self {
        self.items = Some(items);
        self
    }

    pub fn set_total_weight(&mut self, kilograms: f64) -> &mut Self {
        self.total_weight = Some(kilograms);
        self
    }

    pub fn set_total_volume(&mut self, cubic_metres: f64) -> &mut Self {
        self.total_volume = Some(cubic_metres);
        self
    }

    pub fn set_goods_value(&mut self, value: f64, currency: &str) -> &mut Self {
        self.goods_value = Some(value);
        self.currency = currency.to_string();
        self
    }

    pub fn set_insurance(&mut self, value: f64, currency: &str) -> &mut Self {
        self.insurance_value = Some(value);
        self.insurance_currency = currency.to_string();
        self
    }

    pub fn set_service(&mut self, service: &str) -> &mut Self {
        self.service = service.to_string();
        self
    }

    pub fn add_option(&mut self, option: &str) -> &mut Self {
        self.options.push(option.to_string());
        self
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.description = description.to_string();
        self
    }

    pub fn set_delivery_instructions(&mut self, instructions: &str) -> &mut Self {
        self.delivery_instructions = instructions.to_string();
        self
    }

    pub fn add_package(&mut self, package: Package) -> &mut Self {
        self.packages.push(package);
        self
    }

    pub fn conref(&self) -> &str {
        &self.conref
    }

    pub fn account(&self) -> (&str, &str) {
        (&self.account_number, &self.account_country)
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn total_items(&self) -> u32 {
        self.items
            .unwrap_or_else(|| self.packages.iter().map(|p| p.items).sum())
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight.unwrap_or_else(|| {
            self.packages
                .iter()
                .map(|p| p.weight * f64::from(p.items))
                .sum()
        })
    }

    pub fn total_volume(&self) -> f64 {
        self.total_volume
            .unwrap_or_else(|| self.packages.iter().map(Package::volume).sum())
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.account_number.is_empty() {
            return Err(ServiceError::MissingConfiguration("account_number"));
        }
        if self.conref.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "consignment reference is required".to_string(),
            ));
        }
        if self.service.trim().is_empty() {
            return Err(ServiceError::InvalidInput(format!(
                "consignment {} has no service code",
                self.conref
            )));
        }
        if self.total_items() == 0 {
            return Err(ServiceError::InvalidInput(format!(
                "consignment {} has no items",
                self.conref
            )));
        }
        self.receiver.validate()?;
        if let Some(delivery) = &self.delivery {
            delivery.validate()?;
        }
        Ok(())
    }
}

impl Fragment for Consignment {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.write_element("CONREF", &self.conref)?;
        xml.start_element("DETAILS")?;

        xml.start_element("RECEIVER")?;
        self.receiver.write_to(xml)?;
        xml.end_element()?;

        xml.start_element("DELIVERY")?;
        self.delivery.as_ref().unwrap_or(&self.receiver).write_to(xml)?;
        xml.end_element()?;

        write_optional(xml, "CONNUMBER", &self.con_number)?;
        write_optional(xml, "CUSTOMERREF", &self.customer_ref)?;
        xml.write_element("CONTYPE", self.con_type.code())?;
        xml.write_element("PAYMENTIND", self.payment.code())?;
        xml.write_element("ACCOUNT", &self.account_number)?;
        xml.write_element("ACCOUNTCOUNTRY", &self.account_country)?;
        xml.write_element("ITEMS", &self.total_items().to_string())?;
        xml.write_element("TOTALWEIGHT", &format!("{:.2}", self.total_weight()))?;
        xml.write_element("TOTALVOLUME", &format!("{:.3}", self.total_volume()))?;

        if let Some(value) = self.goods_value {
            xml.write_element("CURRENCY", &self.currency)?;
            xml.write_element("GOODSVALUE", &format!("{:.2}", value))?;
        }
        if let Some(value) = self.insurance_value {
            xml.write_element("INSURANCEVALUE", &format!("{:.2}", value))?;
            xml.write_element("INSURANCECURRENCY", &self.insurance_currency)?;
        }

        xml.write_element("SERVICE", &self.service)?;
        for option in &self.options {
            xml.write_element("OPTION", option)?;
        }
        write_optional(xml, "DESCRIPTION", &self.description)?;
        write_optional(xml, "DELIVERYINST", &self.delivery_instructions)?;

        for package in &self.packages {
            xml.start_element("PACKAGE")?;
            xml.write_element("ITEMS", &package.items.to_string())?;
            xml.write_element("DESCRIPTION", &package.description)?;
            xml.write_element("LENGTH", &format!("{:.3}", package.length))?;
            xml.write_element("HEIGHT", &format!("{:.3}", package.height))?;
            xml.write_element("WIDTH", &format!("{:.3}", package.width))?;
            xml.write_element("WEIGHT", &format!("{:.2}", package.weight))?;
            xml.end_element()?;
        }

        xml.end_element()
    }
}

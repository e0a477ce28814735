// Shipping service facade.
//
// Collects a sender, a collection and any number of consignments, then turns
// them into one `ESHIPPER` document on `ShippingService::send`. A document
// supplied through `ShippingService::set_xml_content` bypasses all of that
// and is sent unchanged.

use crate::activity::Activity;
use crate::address::Address;
use crate::collection::Collection;
use crate::config::ClientConfig;
use crate::consignment::Consignment;
use crate::error::{ServiceError, XmlError};
use crate::fragment::Fragment;
use crate::service::{assemble, RequestAssembler};
use crate::shipping_response::ShippingResponse;
use crate::transport::{HttpTransport, Transport};
use crate::xml_writer::XmlBuilder;
use tracing::{info, warn};

pub const SHIPPING_APP_ID: &str = "0";
pub const SHIPPING_APP_VERSION: &str = "3.0";

// The carrier recommends about three consignments per request and refuses
// more than this many
pub const MAX_CONSIGNMENTS: usize = 50;

// Requests that retrieve what an accepted submission produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingDocument {
    Result,
    Label,
    Manifest,
    Connote,
    Invoice,
}

impl ShippingDocument {
    pub fn command(&self) -> &'static str {
        match self {
            ShippingDocument::Result => "GET_RESULT",
            ShippingDocument::Label => "GET_LABEL",
            ShippingDocument::Manifest => "GET_MANIFEST",
            ShippingDocument::Connote => "GET_CONNOTE",
            ShippingDocument::Invoice => "GET_INVOICE",
        }
    }
}

struct ShipRequest<'a> {
    user_id: &'a str,
    password: &'a str,
    account_number: &'a str,
    sender: &'a Address,
    collection: &'a Collection,
    consignments: &'a [Consignment],
    activity: &'a Activity,
}

impl RequestAssembler for ShipRequest<'_> {
    fn kind(&self) -> &'static str {
        "shipping"
    }

    fn open_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.start_element("ESHIPPER")?;
        xml.start_element("LOGIN")?;
        xml.write_element("COMPANY", self.user_id)?;
        xml.write_element("PASSWORD", self.password)?;
        xml.write_element("APPID", SHIPPING_APP_ID)?;
        xml.write_element("APPVERSION", SHIPPING_APP_VERSION)?;
        xml.end_element()?;
        xml.start_element("CONSIGNMENTBATCH")
    }

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.start_element("SENDER")?;
        xml.write_raw(&self.sender.render()?)?;
        xml.start_element("COLLECTION")?;
        xml.write_raw(&self.collection.render()?)?;
        xml.end_element()?;
        xml.write_element("ACCOUNT", self.account_number)?;
        xml.end_element()?;

        for consignment in self.consignments {
            xml.start_element("CONSIGNMENT")?;
            xml.write_raw(&consignment.render()?)?;
            xml.end_element()?;
        }
        Ok(())
    }

    fn close_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.end_element()?;
        xml.write_raw(&self.activity.render()?)?;
        xml.end_element()
    }
}

// Facade over the carrier's shipping endpoint.
pub struct ShippingService<T: Transport> {
    config: ClientConfig,
    transport: T,
    xml: XmlBuilder,
    sender: Option<Address>,
    collection: Option<Collection>,
    consignments: Vec<Consignment>,
    activity: Activity,
    user_xml: Option<String>,
}

impl ShippingService<HttpTransport> {
    pub fn http(config: ClientConfig) -> Result<Self, ServiceError> {
        let transport = HttpTransport::new(&config.shipping_url, &config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> ShippingService<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            xml: XmlBuilder::new(),
            sender: None,
            collection: None,
            consignments: Vec::new(),
            activity: Activity::new(),
            user_xml: None,
        }
    }

    // Starts a fresh sender address, replacing any previous one
    pub fn set_sender(&mut self) -> &mut Address {
        self.sender.insert(Address::new())
    }

    // Starts a collection from a copy of the current sender address
    pub fn set_collection(&mut self) -> &mut Collection {
        let address = self.sender.clone().unwrap_or_default();
        self.collection.insert(Collection::new(address))
    }

    // New consignment billed to the configured account
    pub fn add_consignment(&mut self) -> &mut Consignment {
        let consignment = Consignment::with_account(
            &self.config.account_number,
            &self.config.account_country_code,
        );
        let index = self.consignments.len();
        self.consignments.push(consignment);
        &mut self.consignments[index]
    }

    pub fn activity(&mut self) -> &mut Activity {
        &mut self.activity
    }

    pub fn sender(&self) -> Option<&Address> {
        self.sender.as_ref()
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    pub fn consignments(&self) -> &[Consignment] {
        &self.consignments
    }

    // Send this document verbatim instead of building one
    pub fn set_xml_content(&mut self, xml: impl Into<String>) -> &mut Self {
        self.user_xml = Some(xml.into());
        self
    }

    pub fn clear_xml_content(&mut self) -> &mut Self {
        self.user_xml = None;
        self
    }

    pub fn build_request(&mut self) -> Result<String, ServiceError> {
        if let Some(xml) = &self.user_xml {
            return Ok(xml.clone());
        }

        let (user_id, password) = self.config.require_login()?;
        let (account_number, _) = self.config.require_account()?;
        let sender = self
            .sender
            .as_ref()
            .ok_or(ServiceError::MissingConfiguration("sender address"))?;
        sender.validate()?;
        let collection = self
            .collection
            .as_ref()
            .ok_or(ServiceError::MissingConfiguration("collection"))?;
        collection.validate()?;

        if self.consignments.is_empty() {
            return Err(ServiceError::InvalidInput(
                "at least one consignment is required".to_string(),
            ));
        }
        if self.consignments.len() > MAX_CONSIGNMENTS {
            warn!(
                count = self.consignments.len(),
                limit = MAX_CONSIGNMENTS,
                "consignment batch exceeds the carrier limit"
            );
        }
        for consignment in &self.consignments {
            consignment.validate()?;
        }

        let request = ShipRequest {
            user_id,
            password,
            account_number,
            sender,
            collection,
            consignments: &self.consignments,
            activity: &self.activity,
        };
        Ok(assemble(&mut self.xml, &request)?)
    }

    pub fn send(&mut self) -> Result<ShippingResponse, ServiceError> {
        let request = self.build_request()?;

        info!(
            consignments = self.consignments.len(),
            user_document = self.user_xml.is_some(),
            "sending shipping request"
        );
        let reply = self.transport.send(&request)?;
        Ok(ShippingResponse::new(reply, request))
    }

    pub fn fetch(
        &self,
        document: ShippingDocument,
        access_key: &str,
    ) -> Result<ShippingResponse, ServiceError> {
        let key = access_key.trim();
        if key.is_empty() {
            return Err(ServiceError::InvalidInput("empty access key".to_string()));
        }
        let request = format!("{}:{}", document.command(), key);

        info!(command = document.command(), "fetching shipping document");
        let reply = self.transport.send(&request)?;
        Ok(ShippingResponse::new(reply, request))
    }

    pub fn fetch_result(&self, access_key: &str) -> Result<ShippingResponse, ServiceError> {
        self.fetch(ShippingDocument::Result, access_key)
    }

    pub fn fetch_label(&self, access_key: &str) -> Result<ShippingResponse, ServiceError> {
        self.fetch(ShippingDocument::Label, access_key)
    }

    pub fn fetch_manifest(&self, access_key: &str) -> Result<ShippingResponse, ServiceError> {
        self.fetch(ShippingDocument::Manifest, access_key)
    }

    pub fn fetch_connote(&self, access_key: &str) -> Result<ShippingResponse, ServiceError> {
        self.fetch(ShippingDocument::Connote, access_key)
    }

    pub fn fetch_invoice(&self, access_key: &str) -> Result<ShippingResponse, ServiceError> {
        self.fetch(ShippingDocument::Invoice, access_key)
    }
}

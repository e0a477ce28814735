use crate::error::ResponseError;
use crate::fault::{gateway_fault, root_element, CarrierFault};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::cell::OnceCell;
use tracing::warn;

// Prefix of the access key returned for an accepted submission
pub const ACCESS_KEY_PREFIX: &str = "COMPLETE:";

// Root of a GET_RESULT reply
const RESULT_ROOT: &str = "document";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
struct XmlShipDocument {
    #[serde(rename = "CREATE")]
    create: Vec<XmlResultEntry>,
    book: XmlConsignmentGroup,
    ship: XmlConsignmentGroup,
    print: XmlPrint,
    #[serde(rename = "ERROR")]
    errors: Vec<XmlShipError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlConsignmentGroup {
    #[serde(rename = "CONSIGNMENT")]
    consignments: Vec<XmlResultEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
struct XmlResultEntry {
    conref: String,
    connumber: String,
    success: String,
    bookingref: String,
    firsttimetrader: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
struct XmlPrint {
    connote: String,
    label: String,
    manifest: String,
    invoice: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "UPPERCASE")]
struct XmlShipError {
    code: String,
    description: String,
    source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipStep {
    Create,
    Book,
    Ship,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsignmentResult {
    pub step: ShipStep,
    pub conref: String,
    pub con_number: Option<String>,
    pub success: bool,
    pub booking_ref: Option<String>,
    pub first_time_trader: Option<bool>,
}

// Values the carrier reports for each printable document, e.g. "CREATED"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrintStatus {
    pub connote: Option<String>,
    pub label: Option<String>,
    pub manifest: Option<String>,
    pub invoice: Option<String>,
}

impl PrintStatus {
    pub fn label_created(&self) -> bool {
        is_created(&self.label)
    }

    pub fn manifest_created(&self) -> bool {
        is_created(&self.manifest)
    }

    pub fn connote_created(&self) -> bool {
        is_created(&self.connote)
    }

    pub fn invoice_created(&self) -> bool {
        is_created(&self.invoice)
    }
}

fn is_created(value: &Option<String>) -> bool {
    value.as_deref().map_or(false, |v| v.eq_ignore_ascii_case("CREATED"))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn yes_no(value: &str) -> Option<bool> {
    match value.trim() {
        "Y" | "y" => Some(true),
        "N" | "n" => Some(false),
        _ => None,
    }
}

impl XmlResultEntry {
    fn into_result(self, step: ShipStep) -> ConsignmentResult {
        ConsignmentResult {
            step,
            success: yes_no(&self.success).unwrap_or(false),
            first_time_trader: yes_no(&self.firsttimetrader),
            conref: self.conref.trim().to_string(),
            con_number: non_empty(self.connumber),
            booking_ref: non_empty(self.bookingref),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ShipReply {
    results: Vec<ConsignmentResult>,
    print: PrintStatus,
    faults: Vec<CarrierFault>,
}

fn parse(reply_xml: &str) -> Result<ShipReply, ResponseError> {
    if reply_xml.trim_start().starts_with(ACCESS_KEY_PREFIX) {
        return Ok(ShipReply::default());
    }

    let root = root_element(reply_xml)?;
    if let Some(fault) = gateway_fault(&root, reply_xml)? {
        return Ok(ShipReply {
            faults: vec![fault],
            ..ShipReply::default()
        });
    }
    // Label, manifest and other printable documents are passed through as-is
    if root != RESULT_ROOT {
        return Ok(ShipReply::default());
    }

    let document: XmlShipDocument =
        from_str(reply_xml).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    let mut results = Vec::new();
    results.extend(document.create.into_iter().map(|e| e.into_result(ShipStep::Create)));
    results.extend(
        document
            .book
            .consignments
            .into_iter()
            .map(|e| e.into_result(ShipStep::Book)),
    );
    results.extend(
        document
            .ship
            .consignments
            .into_iter()
            .map(|e| e.into_result(ShipStep::Ship)),
    );

    Ok(ShipReply {
        results,
        print: PrintStatus {
            connote: non_empty(document.print.connote),
            label: non_empty(document.print.label),
            manifest: non_empty(document.print.manifest),
            invoice: non_empty(document.print.invoice),
        },
        faults: document
            .errors
            .into_iter()
            .map(|e| CarrierFault {
                code: e.code,
                message: e.description,
                source: non_empty(e.source),
            })
            .collect(),
    })
}

// Reply to a shipping request, kept together with the request that produced it.
#[derive(Debug)]
pub struct ShippingResponse {
    request_xml: String,
    reply_xml: String,
    parsed: OnceCell<Result<ShipReply, ResponseError>>,
}

impl ShippingResponse {
    pub fn new(reply_xml: String, request_xml: String) -> Self {
        Self {
            request_xml,
            reply_xml,
            parsed: OnceCell::new(),
        }
    }

    pub fn request_xml(&self) -> &str {
        &self.request_xml
    }

    pub fn reply_xml(&self) -> &str {
        &self.reply_xml
    }

    // Key used to fetch results and documents for an accepted submission
    pub fn access_key(&self) -> Option<&str> {
        self.reply_xml
            .trim()
            .strip_prefix(ACCESS_KEY_PREFIX)
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    fn parsed(&self) -> Result<&ShipReply, ResponseError> {
        self.parsed
            .get_or_init(|| {
                let result = parse(&self.reply_xml);
                match &result {
                    Ok(reply) if !reply.faults.is_empty() => {
                        warn!(faults = reply.faults.len(), "shipping reply carries carrier faults")
                    }
                    Err(e) => warn!(error = %e, "shipping reply could not be parsed"),
                    _ => (),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn results(&self) -> Result<&[ConsignmentResult], ResponseError> {
        Ok(&self.parsed()?.results)
    }

    pub fn print_status(&self) -> Result<&PrintStatus, ResponseError> {
        Ok(&self.parsed()?.print)
    }

    pub fn faults(&self) -> Result<&[CarrierFault], ResponseError> {
        Ok(&self.parsed()?.faults)
    }

    // Consignment number the carrier assigned to `conref`
    pub fn consignment_number(&self, conref: &str) -> Option<&str> {
        self.results()
            .ok()?
            .iter()
            .filter(|r| r.conref == conref)
            .find_map(|r| r.con_number.as_deref())
    }

    pub fn failed_consignments(&self) -> Vec<&ConsignmentResult> {
        self.results()
            .map(|results| results.iter().filter(|r| !r.success).collect())
            .unwrap_or_default()
    }

    // True for carrier faults and for replies that cannot be parsed
    pub fn has_error(&self) -> bool {
        !matches!(self.faults(), Ok(faults) if faults.is_empty())
    }
}

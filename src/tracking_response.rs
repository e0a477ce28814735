use crate::error::ResponseError;
use crate::fault::{gateway_fault, root_element, CarrierFault};
use chrono::{NaiveDate, NaiveTime};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::cell::OnceCell;
use tracing::warn;

// Structures for XML deserialization
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlTrackResponse {
    #[serde(rename = "Consignment")]
    consignments: Vec<XmlConsignment>,
    #[serde(rename = "Error")]
    errors: Vec<XmlTrackError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlConsignment {
    #[serde(rename = "@access")]
    access: String,
    consignment_number: String,
    customer_reference: String,
    summary_code: String,
    origin_depot: String,
    destination_depot: String,
    origin_country: XmlCountry,
    destination_country: XmlCountry,
    piece_quantity: String,
    #[serde(rename = "StatusData")]
    status_data: Vec<XmlStatusData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlCountry {
    country_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlStatusData {
    status_code: String,
    status_description: String,
    local_event_date: XmlFormatted,
    local_event_time: XmlFormatted,
    depot: String,
    depot_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlFormatted {
    #[serde(rename = "$value")]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct XmlTrackError {
    code: String,
    message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryCode {
    Delivered,
    InTransit,
    Exception,
    NotFound,
    Other(String),
}

impl From<&str> for SummaryCode {
    fn from(code: &str) -> Self {
        match code.trim() {
            "DEL" => SummaryCode::Delivered,
            "INT" => SummaryCode::InTransit,
            "EXC" => SummaryCode::Exception,
            "CNF" => SummaryCode::NotFound,
            other => SummaryCode::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub code: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub depot: String,
    pub depot_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedConsignment {
    pub access: String,
    pub number: String,
    pub customer_reference: Option<String>,
    pub summary: SummaryCode,
    pub origin_depot: String,
    pub destination_depot: String,
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    pub piece_quantity: Option<u32>,
    pub events: Vec<StatusEvent>,
}

impl TrackedConsignment {
    pub fn is_delivered(&self) -> bool {
        self.summary == SummaryCode::Delivered
    }

    // Most recent event as reported by the carrier (first in the list)
    pub fn latest_event(&self) -> Option<&StatusEvent> {
        self.events.first()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl From<XmlStatusData> for StatusEvent {
    fn from(item: XmlStatusData) -> Self {
        StatusEvent {
            code: item.status_code,
            description: item.status_description,
            date: NaiveDate::parse_from_str(item.local_event_date.value.trim(), "%Y%m%d").ok(),
            time: NaiveTime::parse_from_str(item.local_event_time.value.trim(), "%H%M").ok(),
            depot: item.depot,
            depot_name: item.depot_name,
        }
    }
}

impl From<XmlConsignment> for TrackedConsignment {
    fn from(item: XmlConsignment) -> Self {
        TrackedConsignment {
            access: item.access,
            summary: SummaryCode::from(item.summary_code.as_str()),
            number: item.consignment_number,
            customer_reference: non_empty(item.customer_reference),
            origin_depot: item.origin_depot,
            destination_depot: item.destination_depot,
            origin_country: non_empty(item.origin_country.country_code),
            destination_country: non_empty(item.destination_country.country_code),
            piece_quantity: item.piece_quantity.trim().parse().ok(),
            events: item.status_data.into_iter().map(StatusEvent::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TrackReply {
    consignments: Vec<TrackedConsignment>,
    faults: Vec<CarrierFault>,
}

fn parse(reply_xml: &str) -> Result<TrackReply, ResponseError> {
    let root = root_element(reply_xml)?;
    if let Some(fault) = gateway_fault(&root, reply_xml)? {
        return Ok(TrackReply {
            consignments: Vec::new(),
            faults: vec![fault],
        });
    }

    let response: XmlTrackResponse =
        from_str(reply_xml).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    Ok(TrackReply {
        consignments: response
            .consignments
            .into_iter()
            .map(TrackedConsignment::from)
            .collect(),
        faults: response
            .errors
            .into_iter()
            .map(|e| CarrierFault {
                code: e.code,
                message: e.message,
                source: None,
            })
            .collect(),
    })
}

// Reply to a tracking search, kept together with the request that produced it.
//
// The reply is parsed on first access and the result cached.
#[derive(Debug)]
pub struct TrackingResponse {
    request_xml: String,
    reply_xml: String,
    parsed: OnceCell<Result<TrackReply, ResponseError>>,
}

impl TrackingResponse {
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

    fn parsed(&self) -> Result<&TrackReply, ResponseError> {
        self.parsed
            .get_or_init(|| {
                let result = parse(&self.reply_xml);
                match &result {
                    Ok(reply) if !reply.faults.is_empty() => {
                        warn!(faults = reply.faults.len(), "tracking reply carries carrier faults")
                    }
                    Err(e) => warn!(error = %e, "tracking reply could not be parsed"),
                    _ => (),
                }
                result
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn consignments(&self) -> Result<&[TrackedConsignment], ResponseError> {
        Ok(&self.parsed()?.consignments)
    }

    pub fn faults(&self) -> Result<&[CarrierFault], ResponseError> {
        Ok(&self.parsed()?.faults)
    }

    // True for carrier faults and for replies that are not valid tracking XML
    pub fn has_error(&self) -> bool {
        !matches!(self.faults(), Ok(faults) if faults.is_empty())
    }

    pub fn find(&self, consignment_number: &str) -> Option<&TrackedConsignment> {
        self.consignments()
            .ok()?
            .iter()
            .find(|c| c.number == consignment_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELIVERED_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TrackResponse>
  <Consignment access="public">
    <ConsignmentNumber>GD12345678</ConsignmentNumber>
    <CustomerReference>PO-77</CustomerReference>
    <SummaryCode>DEL</SummaryCode>
    <OriginDepot>LBA</OriginDepot>
    <DestinationDepot>CDG</DestinationDepot>
    <OriginCountry><CountryCode>GB</CountryCode><CountryName>United Kingdom</CountryName></OriginCountry>
    <DestinationCountry><CountryCode>FR</CountryCode><CountryName>France</CountryName></DestinationCountry>
    <StatusData>
      <StatusCode>OK</StatusCode>
      <StatusDescription>Shipment Delivered in Good Condition</StatusDescription>
      <LocalEventDate format="YYYYMMDD">20240108</LocalEventDate>
      <LocalEventTime format="HHMM">1046</LocalEventTime>
      <Depot>CDG</Depot>
      <DepotName>Paris</DepotName>
    </StatusData>
    <StatusData>
      <StatusCode>IR</StatusCode>
      <StatusDescription>Shipment In Transit</StatusDescription>
      <LocalEventDate format="YYYYMMDD">20240107</LocalEventDate>
      <LocalEventTime format="HHMM">2210</LocalEventTime>
      <Depot>LBA</Depot>
      <DepotName>Leeds</DepotName>
    </StatusData>
    <PieceQuantity>2</PieceQuantity>
  </Consignment>
  <Consignment access="public">
    <ConsignmentNumber>XX00000000</ConsignmentNumber>
    <SummaryCode>CNF</SummaryCode>
  </Consignment>
</TrackResponse>"#;

    #[test]
    fn test_parse_delivered_consignment() {
        let response = TrackingResponse::new(DELIVERED_REPLY.to_string(), "<req/>".to_string());
        assert!(!response.has_error());
        assert_eq!(response.request_xml(), "<req/>");

        let consignments = response.consignments().unwrap();
        assert_eq!(consignments.len(), 2);

        let delivered = response.find("GD12345678").unwrap();
        assert!(delivered.is_delivered());
        assert_eq!(delivered.access, "public");
        assert_eq!(delivered.customer_reference.as_deref(), Some("PO-77"));
        assert_eq!(delivered.origin_country.as_deref(), Some("GB"));
        assert_eq!(delivered.destination_country.as_deref(), Some("FR"));
        assert_eq!(delivered.piece_quantity, Some(2));
        assert_eq!(delivered.events.len(), 2);

        let latest = delivered.latest_event().unwrap();
        assert_eq!(latest.code, "OK");
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 1, 8));
        assert_eq!(latest.time, NaiveTime::from_hms_opt(10, 46, 0));
        assert_eq!(latest.depot_name, "Paris");
    }

    #[test]
    fn test_not_found_is_not_a_fault() {
        let response = TrackingResponse::new(DELIVERED_REPLY.to_string(), String::new());
        let missing = response.find("XX00000000").unwrap();
        assert_eq!(missing.summary, SummaryCode::NotFound);
        assert!(missing.events.is_empty());
        assert!(!response.has_error());
    }

    #[test]
    fn test_error_node_is_reported() {
        let reply = "<TrackResponse><Error><Code>P1</Code>\
                     <Message>Invalid consignment number</Message></Error></TrackResponse>";
        let response = TrackingResponse::new(reply.to_string(), String::new());

        assert!(response.has_error());
        let faults = response.faults().unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].code, "P1");
        assert_eq!(faults[0].message, "Invalid consignment number");
        assert!(response.consignments().unwrap().is_empty());
    }

    #[test]
    fn test_errors_between_consignments() {
        let reply = "<TrackResponse>\
                     <Consignment access=\"public\"><ConsignmentNumber>GD1</ConsignmentNumber>\
                     <SummaryCode>INT</SummaryCode>\
                     <StatusData><StatusCode>IR</StatusCode></StatusData>\
                     <PieceQuantity>3</PieceQuantity>\
                     <StatusData><StatusCode>PU</StatusCode></StatusData></Consignment>\
                     <Error><Code>P1</Code><Message>Unknown consignment XX2</Message></Error>\
                     <Consignment access=\"public\"><ConsignmentNumber>GD3</ConsignmentNumber>\
                     <SummaryCode>DEL</SummaryCode></Consignment>\
                     </TrackResponse>";
        let response = TrackingResponse::new(reply.to_string(), String::new());

        assert!(response.has_error());
        let faults = response.faults().unwrap();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].code, "P1");

        let consignments = response.consignments().unwrap();
        assert_eq!(consignments.len(), 2);
        assert_eq!(consignments[0].piece_quantity, Some(3));
        let codes: Vec<&str> = consignments[0].events.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["IR", "PU"]);
        assert!(response.find("GD3").unwrap().is_delivered());
    }

    #[test]
    fn test_gateway_error_is_reported() {
        let reply = "<runtime_error><error_reason>Authentication failed</error_reason></runtime_error>";
        let response = TrackingResponse::new(reply.to_string(), String::new());

        assert!(response.has_error());
        assert_eq!(response.faults().unwrap()[0].message, "Authentication failed");
    }

    #[test]
    fn test_malformed_reply() {
        let response = TrackingResponse::new("<TrackResponse><Consignment>".to_string(), String::new());
        assert!(response.has_error());
        assert!(matches!(response.consignments(), Err(ResponseError::Malformed(_))));
    }

    #[test]
    fn test_summary_codes() {
        assert_eq!(SummaryCode::from("INT"), SummaryCode::InTransit);
        assert_eq!(SummaryCode::from("EXC"), SummaryCode::Exception);
        assert_eq!(SummaryCode::from("ABC"), SummaryCode::Other("ABC".to_string()));
    }
}

// End-to-end flows against a scripted in-memory carrier

use chrono::{NaiveDate, NaiveTime};
use express_connect::{
    ClientConfig, CompleteDetail, Package, PrintDocument, ServiceError, ShippingService,
    SummaryCode, TrackingService, Transport, TransportError,
};
use std::cell::RefCell;

// Answers like the carrier would, keyed on what the request looks like
#[derive(Default)]
struct ScriptedCarrier {
    requests: RefCell<Vec<String>>,
}

impl ScriptedCarrier {
    fn tracking_reply(request: &str) -> String {
        let mut reply = String::from("<TrackResponse>");
        for number in extract_all(request, "ConsignmentNumber") {
            if number.starts_with("GD") {
                reply.push_str(&format!(
                    "<Consignment access=\"public\"><ConsignmentNumber>{}</ConsignmentNumber>\
                     <SummaryCode>INT</SummaryCode><StatusData><StatusCode>IR</StatusCode>\
                     <StatusDescription>In transit</StatusDescription>\
                     <LocalEventDate format=\"YYYYMMDD\">20240301</LocalEventDate>\
                     <LocalEventTime format=\"HHMM\">0815</LocalEventTime>\
                     <Depot>LBA</Depot><DepotName>Leeds</DepotName></StatusData></Consignment>",
                    number
                ));
            } else {
                reply.push_str(&format!(
                    "<Error><Code>P1</Code><Message>Unknown consignment {}</Message></Error>",
                    number
                ));
            }
        }
        reply.push_str("</TrackResponse>");
        reply
    }

    fn shipping_reply(request: &str) -> String {
        if request.starts_with("GET_RESULT:") {
            let mut reply = String::from("<document>");
            for (idx, conref) in ["REF-1", "REF-2"].iter().enumerate() {
                reply.push_str(&format!(
                    "<CREATE><CONREF>{}</CONREF><CONNUMBER>GE00000{}WW</CONNUMBER><SUCCESS>Y</SUCCESS></CREATE>",
                    conref, idx
                ));
            }
            reply.push_str("<PRINT><LABEL>CREATED</LABEL></PRINT></document>");
            reply
        } else if request.starts_with("GET_LABEL:") {
            "<labelResponse><consignment key=\"GE000000WW\"/></labelResponse>".to_string()
        } else {
            "COMPLETE:987654".to_string()
        }
    }
}

impl Transport for ScriptedCarrier {
    fn send(&self, body: &str) -> Result<String, TransportError> {
        self.requests.borrow_mut().push(body.to_string());
        if body.contains("<TrackRequest") {
            Ok(Self::tracking_reply(body))
        } else {
            Ok(Self::shipping_reply(body))
        }
    }
}

fn extract_all(xml: &str, tag: &str) -> Vec<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut values = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(&close) else {
            break;
        };
        values.push(after[..end].to_string());
        rest = &after[end + close.len()..];
    }
    values
}

fn config() -> ClientConfig {
    ClientConfig::new("ACME", "secret")
        .with_account("000123", "GB")
        .with_origin_country("GB")
}

#[test]
fn tracking_mixed_known_and_unknown_numbers() -> anyhow::Result<()> {
    let carrier = ScriptedCarrier::default();
    let mut tracking = TrackingService::new(config(), &carrier);
    tracking
        .set_market_type_international()
        .level_of_detail()
        .set_complete(CompleteDetail::all());

    let numbers = ["GD111", "XX222", "GD333"];
    let response = tracking.search_by_consignment(&numbers)?;

    assert_eq!(extract_all(response.request_xml(), "ConsignmentNumber"), numbers);
    assert!(response.has_error());
    assert_eq!(response.faults()?.len(), 1);

    let consignments = response.consignments()?;
    assert_eq!(consignments.len(), 2);
    assert_eq!(consignments[0].summary, SummaryCode::InTransit);
    let event = consignments[1].latest_event().expect("status event");
    assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 3, 1));
    Ok(())
}

#[test]
fn tracking_instance_is_reusable_across_modes() -> anyhow::Result<()> {
    let carrier = ScriptedCarrier::default();
    let mut tracking = TrackingService::new(config(), &carrier);

    tracking.search_by_customer_reference(&["PO-1", "PO-2"])?;
    let response = tracking.search_by_consignment(&["GD1"])?;

    assert!(!response.request_xml().contains("CustomerReference"));
    assert!(!response.has_error());
    assert_eq!(carrier.requests.borrow().len(), 2);
    Ok(())
}

#[test]
fn shipping_submit_then_fetch() -> anyhow::Result<()> {
    let carrier = ScriptedCarrier::default();
    let mut shipping = ShippingService::new(config(), &carrier);

    shipping
        .set_sender()
        .set_company_name("Acme")
        .add_street_line("1 High Street")
        .set_city("Leeds")
        .set_postcode("LS1 1AA")
        .set_country("GB")
        .set_contact_name("Jane Doe");
    shipping
        .set_collection()
        .set_ship_date(NaiveDate::from_ymd_opt(2024, 3, 7).expect("date"))
        .set_preferred_time(
            NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
            NaiveTime::from_hms_opt(17, 0, 0).expect("time"),
        )
        .set_instructions("Goods in at rear");

    for conref in ["REF-1", "REF-2"] {
        let consignment = shipping.add_consignment();
        consignment
            .set_conref(conref)
            .set_service("15N")
            .add_package(Package::new(2, 0.3, 0.2, 0.2, 4.5).with_description("Carton"));
        consignment
            .receiver_mut()
            .set_company_name("Receiver SARL")
            .add_street_line("2 Rue Basse")
            .set_city("Paris")
            .set_postcode("75001")
            .set_country("FR");
    }
    shipping
        .activity()
        .create(&["REF-1", "REF-2"])
        .ship(&["REF-1", "REF-2"])
        .print(PrintDocument::Label, &["REF-1", "REF-2"]);

    let submitted = shipping.send()?;
    let key = submitted.access_key().expect("access key");
    assert_eq!(key, "987654");
    assert!(submitted.request_xml().contains("<ACTIVITY>"));

    let result = shipping.fetch_result(key)?;
    assert!(!result.has_error());
    assert_eq!(result.consignment_number("REF-2"), Some("GE000001WW"));
    assert!(result.print_status()?.label_created());

    let label = shipping.fetch_label(key)?;
    assert!(label.reply_xml().starts_with("<labelResponse>"));

    let sent = carrier.requests.borrow();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1], "GET_RESULT:987654");
    assert_eq!(sent[2], "GET_LABEL:987654");
    Ok(())
}

#[test]
fn shipping_without_sender_never_reaches_carrier() {
    let carrier = ScriptedCarrier::default();
    let mut shipping = ShippingService::new(config(), &carrier);
    shipping.add_consignment().set_conref("REF-1");

    let result = shipping.send();
    assert!(matches!(
        result,
        Err(ServiceError::MissingConfiguration("sender address"))
    ));
    assert!(carrier.requests.borrow().is_empty());
}

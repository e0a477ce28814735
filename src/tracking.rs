// Tracking service facade.
//
// Every search entry point replaces the active `SearchMode` and rebuilds the
// request from scratch, so the last search method called decides what is
// sent. The level of detail is kept across searches.

use crate::config::ClientConfig;
use crate::error::{ServiceError, XmlError};
use crate::fragment::Fragment;
use crate::level_of_detail::LevelOfDetail;
use crate::search::{DateRange, MarketType, SearchMode, DEFAULT_SEARCH_DAYS};
use crate::service::{assemble, RequestAssembler};
use crate::tracking_response::TrackingResponse;
use crate::transport::{HttpTransport, Transport};
use crate::xml_writer::XmlBuilder;
use chrono::NaiveDate;
use tracing::info;

pub const TRACKING_VERSION: &str = "3.1";
pub const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Idle,
    CriteriaSet,
    DocumentBuilt,
    ResponseReceived,
}

struct TrackRequest<'a> {
    locale: &'a str,
    market_type: MarketType,
    origin_country: &'a str,
    criteria: &'a SearchMode,
    level_of_detail: &'a LevelOfDetail,
}

impl RequestAssembler for TrackRequest<'_> {
    fn kind(&self) -> &'static str {
        "tracking"
    }

    fn open_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.start_element("TrackRequest")?;
        xml.write_attribute("locale", self.locale)?;
        xml.write_attribute("version", TRACKING_VERSION)?;
        xml.start_element("SearchCriteria")?;
        xml.write_attribute("marketType", self.market_type.as_str())?;
        xml.write_attribute("originCountry", self.origin_country)
    }

    fn write_body(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        self.criteria.write_to(xml)
    }

    fn close_envelope(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        xml.end_element()?;
        xml.write_raw(&self.level_of_detail.render()?)?;
        xml.end_element()
    }
}

// Facade over the carrier's tracking endpoint.
//
// Not meant to be shared: each call rebuilds the request in the one builder
// this instance owns. Use one instance per concurrent caller.
pub struct TrackingService<T: Transport> {
    config: ClientConfig,
    transport: T,
    xml: XmlBuilder,
    locale: String,
    market_type: MarketType,
    level_of_detail: Option<LevelOfDetail>,
    criteria: Option<SearchMode>,
    state: TrackingState,
}

impl TrackingService<HttpTransport> {
    pub fn http(config: ClientConfig) -> Result<Self, ServiceError> {
        let transport = HttpTransport::new(&config.tracking_url, &config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> TrackingService<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            xml: XmlBuilder::new(),
            locale: DEFAULT_LOCALE.to_string(),
            market_type: MarketType::default(),
            level_of_detail: None,
            criteria: None,
            state: TrackingState::Idle,
        }
    }

    // Status descriptions are translated where the carrier supports the locale
    pub fn set_locale(&mut self, locale: &str) -> &mut Self {
        self.locale = locale.to_string();
        self
    }

    pub fn set_market_type_domestic(&mut self) -> &mut Self {
        self.market_type = MarketType::Domestic;
        self
    }

    pub fn set_market_type_international(&mut self) -> &mut Self {
        self.market_type = MarketType::International;
        self
    }

    // Created on first use, then reused by every later search
    pub fn level_of_detail(&mut self) -> &mut LevelOfDetail {
        self.level_of_detail.get_or_insert_with(LevelOfDetail::new)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn market_type(&self) -> MarketType {
        self.market_type
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn criteria(&self) -> Option<&SearchMode> {
        self.criteria.as_ref()
    }

    pub fn search_by_consignment<S: AsRef<str>>(
        &mut self,
        numbers: &[S],
    ) -> Result<TrackingResponse, ServiceError> {
        let numbers = numbers.iter().map(|n| n.as_ref().to_string()).collect();
        self.search(SearchMode::ByConsignment(numbers))
    }

    pub fn search_by_customer_reference<S: AsRef<str>>(
        &mut self,
        references: &[S],
    ) -> Result<TrackingResponse, ServiceError> {
        let references = references.iter().map(|r| r.as_ref().to_string()).collect();
        self.search(SearchMode::ByReference(references))
    }

    // `days` defaults to three and is ignored by the carrier when `date_to` is given
    pub fn search_by_date(
        &mut self,
        date_from: NaiveDate,
        date_to: Option<NaiveDate>,
        days: Option<u32>,
    ) -> Result<TrackingResponse, ServiceError> {
        self.reset();
        let (account_number, account_country) = self.config.require_account()?;
        if let Some(to) = date_to {
            if to < date_from {
                return Err(ServiceError::InvalidInput(format!(
                    "date range ends ({}) before it starts ({})",
                    to, date_from
                )));
            }
        }

        let range = DateRange {
            account_number: account_number.to_string(),
            account_country: account_country.to_string(),
            date_from,
            date_to,
            days: days.unwrap_or(DEFAULT_SEARCH_DAYS),
        };
        self.search(SearchMode::ByDateRange(range))
    }

    // Document for the active criteria without sending it
    pub fn build_request(&mut self) -> Result<String, ServiceError> {
        let criteria = self
            .criteria
            .as_ref()
            .ok_or_else(|| ServiceError::InvalidInput("no search criteria set".to_string()))?;
        let origin_country = self.config.require_origin()?;
        let default_detail = LevelOfDetail::default();
        let request = TrackRequest {
            locale: &self.locale,
            market_type: self.market_type,
            origin_country,
            criteria,
            level_of_detail: self.level_of_detail.as_ref().unwrap_or(&default_detail),
        };
        let document = assemble(&mut self.xml, &request)?;
        self.state = TrackingState::DocumentBuilt;
        Ok(document)
    }

    fn reset(&mut self) {
        self.state = TrackingState::Idle;
        self.criteria = None;
        self.xml.flush();
    }

    fn search(&mut self, mode: SearchMode) -> Result<TrackingResponse, ServiceError> {
        self.reset();
        let mode_name = mode.name();
        self.criteria = Some(mode);
        self.state = TrackingState::CriteriaSet;

        let request = self.build_request()?;

        info!(mode = mode_name, locale = %self.locale, "sending tracking request");
        let reply = self.transport.send(&request)?;
        self.state = TrackingState::ResponseReceived;

        Ok(TrackingResponse::new(reply, request))
    }
}

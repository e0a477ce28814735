use crate::error::XmlError;
use crate::fragment::Fragment;
use crate::xml_writer::XmlBuilder;
use chrono::NaiveDate;

// Days searched after `date_from` when the caller gives no end date
pub const DEFAULT_SEARCH_DAYS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarketType {
    #[default]
    Domestic,
    International,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Domestic => "DOMESTIC",
            MarketType::International => "INTERNATIONAL",
        }
    }
}

// Account-scoped search over a shipping period. The carrier ignores
// `days` when `date_to` is present, but both are always sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub account_number: String,
    pub account_country: String,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub days: u32,
}

// Exactly one mode is active per tracking request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    ByConsignment(Vec<String>),
    ByReference(Vec<String>),
    ByDateRange(DateRange),
}

impl SearchMode {
    pub fn name(&self) -> &'static str {
        match self {
            SearchMode::ByConsignment(_) => "consignment",
            SearchMode::ByReference(_) => "customer_reference",
            SearchMode::ByDateRange(_) => "date_range",
        }
    }
}

fn yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

impl Fragment for SearchMode {
    fn write_to(&self, xml: &mut XmlBuilder) -> Result<(), XmlError> {
        match self {
            SearchMode::ByConsignment(numbers) => {
                for number in numbers {
                    xml.write_element("ConsignmentNumber", number)?;
                }
                Ok(())
            }
            SearchMode::ByReference(references) => {
                for reference in references {
                    xml.write_element("CustomerReference", reference)?;
                }
                Ok(())
            }
            SearchMode::ByDateRange(range) => {
                xml.start_element("Account")?;
                xml.write_element("Number", &range.account_number)?;
                xml.write_element("CountryCode", &range.account_country)?;
                xml.end_element()?;

                xml.start_element("Period")?;
                xml.write_element("DateFrom", &yyyymmdd(range.date_from))?;
                let date_to = range.date_to.map(yyyymmdd).unwrap_or_default();
                xml.write_element("DateTo", &date_to)?;
                xml.write_element("NumberOfDays", &range.days.to_string())?;
                xml.end_element()
            }
        }
    }
}

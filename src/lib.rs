// Client library for the carrier's XML-over-HTTP shipping and tracking API

// Document building
pub mod fragment;
pub mod service;
pub mod xml_writer;

// Request fragments
pub mod activity;
pub mod address;
pub mod collection;
pub mod consignment;
pub mod level_of_detail;
pub mod search;

// Service facades and their replies
pub mod fault;
pub mod shipping;
pub mod shipping_response;
pub mod tracking;
pub mod tracking_response;

pub mod config;
pub mod error;
pub mod transport;

// Re-export key types for convenience
pub use activity::{Activity, PrintDocument};
pub use address::Address;
pub use collection::Collection;
pub use config::ClientConfig;
pub use consignment::{Consignment, ConsignmentType, Package, PaymentIndicator};
pub use error::{ConfigError, ResponseError, ServiceError, TransportError, XmlError};
pub use fault::CarrierFault;
pub use fragment::Fragment;
pub use level_of_detail::{CompleteDetail, LevelOfDetail};
pub use search::{DateRange, MarketType, SearchMode};
pub use shipping::{ShippingDocument, ShippingService};
pub use shipping_response::{ConsignmentResult, PrintStatus, ShipStep, ShippingResponse};
pub use tracking::{TrackingService, TrackingState};
pub use tracking_response::{StatusEvent, SummaryCode, TrackedConsignment, TrackingResponse};
pub use transport::{HttpTransport, Transport};
pub use xml_writer::XmlBuilder;

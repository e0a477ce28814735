use crate::error::ResponseError;
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;

// A logical failure reported by the carrier inside a well-formed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierFault {
    pub code: String,
    pub message: String,
    pub source: Option<String>,
}

impl std::fmt::Display for CarrierFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

// Whole-document failures the gateway sends instead of a service reply
pub(crate) const RUNTIME_ERROR: &str = "runtime_error";
pub(crate) const PARSE_ERROR: &str = "parse_error";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlGatewayError {
    error_reason: String,
    #[serde(rename = "error_srcText")]
    error_src_text: String,
    error_line: String,
    error_linepos: String,
}

// Name of the first element in the reply
pub(crate) fn root_element(xml: &str) -> Result<String, ResponseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => {
                return Err(ResponseError::Malformed("reply has no root element".to_string()))
            }
            Err(e) => {
                return Err(ResponseError::Malformed(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => (),
        }
    }
}

// Some(fault) when the whole reply is a gateway error document
pub(crate) fn gateway_fault(root: &str, xml: &str) -> Result<Option<CarrierFault>, ResponseError> {
    if root != RUNTIME_ERROR && root != PARSE_ERROR {
        return Ok(None);
    }
    let error: XmlGatewayError =
        from_str(xml).map_err(|e| ResponseError::Malformed(e.to_string()))?;

    let source = match (error.error_src_text.is_empty(), error.error_line.is_empty()) {
        (true, true) => None,
        (false, true) => Some(error.error_src_text),
        (true, false) => Some(format!("line {}:{}", error.error_line, error.error_linepos)),
        (false, false) => Some(format!(
            "{} at line {}:{}",
            error.error_src_text, error.error_line, error.error_linepos
        )),
    };

    Ok(Some(CarrierFault {
        code: root.to_string(),
        message: error.error_reason,
        source,
    }))
}

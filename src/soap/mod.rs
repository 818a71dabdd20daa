//! SOAP dialect: envelope template, retrieve-request bodies and response trees.

mod xml;

pub use xml::{Namespaces, SoapDocument, XmlElement};

use quick_xml::escape::escape;

/// SOAP 1.2 envelope namespace.
pub const SOAP_ENVELOPE_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// Marketing Cloud partner API namespace.
pub const PARTNER_API_NS: &str = "http://exacttarget.com/wsdl/partnerAPI";

const ADDRESSING_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
const WSS_UTILITY_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// Path to the result rows of a `Retrieve` response.
pub const RETRIEVE_RESULTS_PATH: &str = ".//s:Body/default:RetrieveResponseMsg/default:Results";

/// `s` → envelope, `default` → partner API.
pub fn response_namespaces() -> Namespaces {
    Namespaces::new()
        .with("s", SOAP_ENVELOPE_NS)
        .with("default", PARTNER_API_NS)
}

/// Wrap a body fragment in the fixed envelope. The token travels in a
/// `fueloauth` header element; the fragment is inserted verbatim.
pub fn envelope(token: &str, body: &str) -> String {
    [
        r#"<?xml version="1.0" encoding="UTF-8"?>"#.to_string(),
        format!(
            r#"<s:Envelope xmlns:s="{}" xmlns:a="{}" xmlns:u="{}">"#,
            SOAP_ENVELOPE_NS, ADDRESSING_NS, WSS_UTILITY_NS
        ),
        "   <s:Header>".to_string(),
        format!("      <fueloauth>{}</fueloauth>", escape(token)),
        "   </s:Header>".to_string(),
        format!(
            r#"   <s:Body xmlns:xsi="{}" xmlns:xsd="{}">"#,
            XSI_NS, XSD_NS
        ),
        format!("      {}", body),
        "   </s:Body>".to_string(),
        "</s:Envelope>".to_string(),
    ]
    .join("\n")
}

/// A `RetrieveRequestMsg` with a fixed property list and a single
/// `equals` filter.
#[derive(Debug, Clone)]
pub struct RetrieveRequest<'a> {
    pub object_type: &'a str,
    pub properties: &'a [&'a str],
    pub filter_property: &'a str,
    pub filter_value: &'a str,
}

impl RetrieveRequest<'_> {
    pub fn to_xml(&self) -> String {
        let mut lines = vec![
            format!(r#"<RetrieveRequestMsg xmlns="{}">"#, PARTNER_API_NS),
            "    <RetrieveRequest>".to_string(),
            format!("        <ObjectType>{}</ObjectType>", self.object_type),
        ];
        lines.extend(
            self.properties
                .iter()
                .map(|p| format!("        <Properties>{}</Properties>", p)),
        );
        lines.extend([
            r#"        <Filter xsi:type="SimpleFilterPart">"#.to_string(),
            format!("            <Property>{}</Property>", self.filter_property),
            "            <SimpleOperator>equals</SimpleOperator>".to_string(),
            format!("            <Value>{}</Value>", escape(self.filter_value)),
            "        </Filter>".to_string(),
            "    </RetrieveRequest>".to_string(),
            "</RetrieveRequestMsg>".to_string(),
        ]);
        lines.join("\n")
    }
}

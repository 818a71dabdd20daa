//! The three request shapes, defined once.
//!
//! Both HTTP clients build requests and decode responses through these
//! functions; they differ only in how the request is sent.

use serde_json::Value;
use url::Url;

use super::request::{HttpRequest, HttpResponse, Method, RequestBody};
use super::settings::{Endpoints, HttpSettings};
use crate::error::{Error, RequestKind, Result};
use crate::soap::{self, SoapDocument};

const CONTENT_TYPE_JSON: &str = "application/json";
const CONTENT_TYPE_XML: &str = "text/xml";

pub(crate) fn auth_request(
    settings: &HttpSettings,
    method: Method,
    url: Url,
    payload: &Value,
) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![
            ("Content-Type", CONTENT_TYPE_JSON.to_string()),
            ("User-Agent", settings.user_agent.clone()),
        ],
        body: Some(RequestBody::Json(payload.clone())),
    }
}

pub(crate) fn rest_request(
    settings: &HttpSettings,
    endpoints: &Endpoints,
    method: Method,
    path: &str,
    token: &str,
    payload: Option<&Value>,
) -> Result<HttpRequest> {
    Ok(HttpRequest {
        method,
        url: endpoints.rest_url(path)?,
        headers: vec![
            ("Authorization", format!("Bearer {}", token)),
            ("Content-Type", CONTENT_TYPE_JSON.to_string()),
            ("User-Agent", settings.user_agent.clone()),
        ],
        body: payload.cloned().map(RequestBody::Json),
    })
}

pub(crate) fn soap_request(
    settings: &HttpSettings,
    endpoints: &Endpoints,
    action: &str,
    token: &str,
    body: &str,
) -> HttpRequest {
    HttpRequest {
        method: Method::Post,
        url: endpoints.soap.clone(),
        headers: vec![
            ("Content-Type", CONTENT_TYPE_XML.to_string()),
            ("SOAPAction", action.to_string()),
            ("User-Agent", settings.user_agent.clone()),
        ],
        body: Some(RequestBody::Xml(soap::envelope(token, body))),
    }
}

fn check_status(settings: &HttpSettings, kind: RequestKind, response: &HttpResponse) -> Result<()> {
    if settings.is_success(response.status) {
        Ok(())
    } else {
        Err(Error::status_failure(kind, response.status, &response.body))
    }
}

fn decode_json(kind: RequestKind, response: HttpResponse) -> Result<Value> {
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| {
        Error::request_source(
            kind,
            Some(response.status),
            format!("Failed to parse {} response: {}", kind, e),
            e,
        )
    })
}

pub(crate) fn decode_auth(settings: &HttpSettings, response: HttpResponse) -> Result<Value> {
    check_status(settings, RequestKind::Auth, &response)?;
    decode_json(RequestKind::Auth, response)
}

pub(crate) fn decode_rest(settings: &HttpSettings, response: HttpResponse) -> Result<Value> {
    check_status(settings, RequestKind::Rest, &response)?;
    decode_json(RequestKind::Rest, response)
}

pub(crate) fn decode_soap(settings: &HttpSettings, response: HttpResponse) -> Result<SoapDocument> {
    check_status(settings, RequestKind::Soap, &response)?;
    SoapDocument::parse(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn fixtures() -> (HttpSettings, Endpoints) {
        let settings = HttpSettings::default();
        let endpoints = Endpoints::new("tenant", &settings.domain).unwrap();
        (settings, endpoints)
    }

    #[test]
    fn test_rest_request_headers() {
        let (settings, endpoints) = fixtures();
        let req = rest_request(
            &settings,
            &endpoints,
            Method::Post,
            "/data/v1/customobjects",
            "abc123",
            Some(&json!({"name": "x"})),
        )
        .unwrap();

        assert_eq!(req.header("Authorization"), Some("Bearer abc123"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(
            req.url.as_str(),
            "https://tenant.rest.marketingcloudapis.com/data/v1/customobjects"
        );
        assert_eq!(req.body, Some(RequestBody::Json(json!({"name": "x"}))));
    }

    #[test]
    fn test_soap_request_wraps_body() {
        let (settings, endpoints) = fixtures();
        let req = soap_request(&settings, &endpoints, "Retrieve", "abc123", "<Body/>");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("SOAPAction"), Some("Retrieve"));
        assert_eq!(req.header("Content-Type"), Some("text/xml"));
        match req.body {
            Some(RequestBody::Xml(xml)) => {
                assert!(xml.contains("<fueloauth>abc123</fueloauth>"));
                assert!(xml.contains("<Body/>"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_decode_rest_failure_embeds_status_and_body() {
        let (settings, _) = fixtures();
        let err = decode_rest(&settings, HttpResponse::new(403, "Forbidden")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("403 - Forbidden"));
    }

    #[test]
    fn test_decode_rest_respects_configured_success_set() {
        let settings = HttpSettings::default().with_success_codes(vec![200, 204]);
        let value = decode_rest(&settings, HttpResponse::new(204, "")).unwrap();
        assert_eq!(value, Value::Null);

        let err = decode_rest(&settings, HttpResponse::new(201, "{}")).unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[test]
    fn test_decode_rest_invalid_json() {
        let (settings, _) = fixtures();
        let err = decode_rest(&settings, HttpResponse::new(200, "<html>")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_soap_unparsable_body() {
        let (settings, _) = fixtures();
        let err = decode_soap(&settings, HttpResponse::new(200, "not xml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(err.to_string().contains("SOAP response parsing failed"));
    }
}

//! Owned XML tree for SOAP responses.
//!
//! `roxmltree` parses the body; the result is copied into [`XmlElement`]s so
//! the document can outlive the response text and be handed to callers.

use std::collections::HashMap;

use crate::error::{Error, RequestKind, Result};

/// Prefix → namespace URI map used to resolve lookup paths.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    prefixes: HashMap<String, String>,
}

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, prefix: &str, uri: &str) -> Self {
        self.prefixes.insert(prefix.to_string(), uri.to_string());
        self
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    namespace: Option<String>,
    name: String,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let text = node
            .first_child()
            .filter(|child| child.is_text())
            .and_then(|child| child.text())
            .map(str::to_string);

        Self {
            namespace: tag.namespace().map(str::to_string),
            name: tag.name().to_string(),
            text,
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(XmlElement::from_node)
                .collect(),
        }
    }

    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Text directly inside this element, before its first child element.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    fn matches(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    /// Depth-first, document order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = &XmlElement> + '_ {
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    /// Text of the first child named `prefix:name`.
    pub fn child_text(&self, qualified: &str, namespaces: &Namespaces) -> Option<&str> {
        self.find(qualified, namespaces).and_then(XmlElement::text)
    }

    /// First element matching an ElementTree-style path such as
    /// `.//s:Body/default:RetrieveResponseMsg/default:Results`.
    pub fn find(&self, path: &str, namespaces: &Namespaces) -> Option<&XmlElement> {
        self.find_all(path, namespaces).into_iter().next()
    }

    /// Every element matching the path, in document order.
    ///
    /// A leading `.//` matches the first step at any depth; each `/` then
    /// steps to direct children. An unknown prefix matches nothing.
    pub fn find_all(&self, path: &str, namespaces: &Namespaces) -> Vec<&XmlElement> {
        let (anywhere, rest) = match path.strip_prefix(".//") {
            Some(rest) => (true, rest),
            None => (false, path.strip_prefix("./").unwrap_or(path)),
        };

        let mut steps = Vec::new();
        for step in rest.split('/').filter(|s| !s.is_empty()) {
            match parse_step(step, namespaces) {
                Some(parsed) => steps.push(parsed),
                None => return Vec::new(),
            }
        }

        let Some(((first_ns, first_name), remaining)) = steps.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&XmlElement> = if anywhere {
            self.descendants()
                .filter(|el| el.matches(*first_ns, first_name))
                .collect()
        } else {
            self.children
                .iter()
                .filter(|el| el.matches(*first_ns, first_name))
                .collect()
        };

        for (ns, name) in remaining {
            current = current
                .into_iter()
                .flat_map(|el| el.children.iter())
                .filter(|el| el.matches(*ns, name))
                .collect();
        }

        current
    }
}

fn parse_step<'a>(step: &'a str, namespaces: &'a Namespaces) -> Option<(Option<&'a str>, &'a str)> {
    match step.split_once(':') {
        Some((prefix, name)) => namespaces.resolve(prefix).map(|uri| (Some(uri), name)),
        None => Some((None, step)),
    }
}

/// A parsed SOAP response: the raw text plus its element tree.
#[derive(Debug, Clone)]
pub struct SoapDocument {
    raw: String,
    root: XmlElement,
}

impl SoapDocument {
    /// Parse response text. Parse failures are reported as SOAP request
    /// errors wrapping the parser's error.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let root = {
            let doc = roxmltree::Document::parse(&raw).map_err(|e| {
                Error::request_source(
                    RequestKind::Soap,
                    None,
                    format!("SOAP response parsing failed: {}", e),
                    e,
                )
            })?;
            XmlElement::from_node(doc.root_element())
        };

        Ok(Self { raw, root })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The document element (normally `s:Envelope`).
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn find(&self, path: &str, namespaces: &Namespaces) -> Option<&XmlElement> {
        self.root.find(path, namespaces)
    }

    pub fn find_all(&self, path: &str, namespaces: &Namespaces) -> Vec<&XmlElement> {
        self.root.find_all(path, namespaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <RetrieveResponseMsg xmlns="http://exacttarget.com/wsdl/partnerAPI">
      <OverallStatus>OK</OverallStatus>
      <Results xsi:type="DataExtension" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
        <CustomerKey>first</CustomerKey>
      </Results>
      <Results>
        <CustomerKey>second</CustomerKey>
      </Results>
    </RetrieveResponseMsg>
  </soap:Body>
</soap:Envelope>"#;

    fn namespaces() -> Namespaces {
        Namespaces::new()
            .with("s", "http://www.w3.org/2003/05/soap-envelope")
            .with("default", "http://exacttarget.com/wsdl/partnerAPI")
    }

    #[test]
    fn test_find_results_by_qualified_path() {
        let doc = SoapDocument::parse(RESPONSE).unwrap();
        let ns = namespaces();

        let results = doc.find_all(".//s:Body/default:RetrieveResponseMsg/default:Results", &ns);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0].child_text("default:CustomerKey", &ns),
            Some("first")
        );
        assert_eq!(
            results[1].child_text("default:CustomerKey", &ns),
            Some("second")
        );
        assert_eq!(
            results[0].attribute("type"),
            Some("DataExtension")
        );
    }

    #[test]
    fn test_prefix_resolves_by_uri_not_by_literal_prefix() {
        let doc = SoapDocument::parse(RESPONSE).unwrap();
        let status = doc.find(".//default:OverallStatus", &namespaces());
        assert_eq!(status.and_then(XmlElement::text), Some("OK"));
    }

    #[test]
    fn test_missing_path_and_unknown_prefix() {
        let doc = SoapDocument::parse(RESPONSE).unwrap();
        let ns = namespaces();
        assert!(doc.find(".//s:Body/default:Nope", &ns).is_none());
        assert!(doc.find(".//x:Body", &ns).is_none());
        // Unqualified names only match elements without a namespace.
        assert!(doc.find(".//Results", &ns).is_none());
    }

    #[test]
    fn test_parse_failure_is_soap_request_error() {
        let err = SoapDocument::parse("<not-closed>").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Request);
        assert!(err.to_string().starts_with("SOAP request failed: SOAP response parsing failed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_empty_body_is_not_an_empty_document() {
        assert!(SoapDocument::parse("").is_err());
    }
}

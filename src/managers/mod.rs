//! Typed helpers for common Marketing Cloud objects.
//!
//! Every manager is generic over the dispatcher it talks through:
//! `Manager<Dispatcher>` exposes blocking methods and
//! `Manager<AsyncDispatcher>` exposes the same operations as `async fn`s.
//! Request bodies and response parsing are plain functions shared by both.

mod automations;
mod data_extensions;
mod queries;
mod subscribers;

pub use automations::{Automation, AutomationManager};
pub use data_extensions::{DataExtension, DataExtensionManager};
pub use queries::{QueryDefinition, QueryManager};
pub use subscribers::{Subscriber, SubscriberManager};

use crate::soap::{response_namespaces, Namespaces, SoapDocument, XmlElement, RETRIEVE_RESULTS_PATH};

/// SOAP action used by every object lookup.
pub(crate) const RETRIEVE_ACTION: &str = "Retrieve";

/// First `Results` row of a `Retrieve` response, if the server returned any.
pub(crate) fn first_result(doc: &SoapDocument) -> Option<&XmlElement> {
    doc.find(RETRIEVE_RESULTS_PATH, &response_namespaces())
}

/// Text of a partner-API child of `parent`. `tag` may be a nested path
/// such as `SendableSubscriberField/Name`.
pub(crate) fn soap_text(parent: &XmlElement, tag: &str, namespaces: &Namespaces) -> Option<String> {
    let path = tag
        .split('/')
        .map(|step| format!("default:{}", step))
        .collect::<Vec<_>>()
        .join("/");
    parent.child_text(&path, namespaces).map(str::to_string)
}

/// Encode a value for use inside a REST query string.
pub(crate) fn query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

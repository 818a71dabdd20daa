use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::{first_result, soap_text, RETRIEVE_ACTION};
use crate::client::{AsyncDispatcher, Dispatcher};
use crate::error::Result;
use crate::soap::{response_namespaces, RetrieveRequest, SoapDocument};

const PROPERTIES: &[&str] = &[
    "ID",
    "CreatedDate",
    "EmailAddress",
    "SubscriberKey",
    "UnsubscribedDate",
    "Status",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscriber {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    #[serde(rename = "CreatedDate")]
    pub created_date: Option<String>,
    #[serde(rename = "EmailAddress")]
    pub email_address: Option<String>,
    #[serde(rename = "SubscriberKey")]
    pub subscriber_key: Option<String>,
    #[serde(rename = "UnsubscribedDate")]
    pub unsubscribed_date: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

fn retrieve_by_key(subscriber_key: &str) -> String {
    RetrieveRequest {
        object_type: "Subscriber",
        properties: PROPERTIES,
        filter_property: "SubscriberKey",
        filter_value: subscriber_key,
    }
    .to_xml()
}

fn parse_subscriber(doc: &SoapDocument) -> Option<Subscriber> {
    let ns = response_namespaces();
    let row = first_result(doc)?;
    Some(Subscriber {
        id: soap_text(row, "ID", &ns),
        created_date: soap_text(row, "CreatedDate", &ns),
        email_address: soap_text(row, "EmailAddress", &ns),
        subscriber_key: soap_text(row, "SubscriberKey", &ns),
        unsubscribed_date: soap_text(row, "UnsubscribedDate", &ns),
        status: soap_text(row, "Status", &ns),
    })
}

#[derive(Debug)]
pub struct SubscriberManager<D> {
    dispatcher: Arc<D>,
}

impl<D> SubscriberManager<D> {
    pub(crate) fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }
}

impl SubscriberManager<Dispatcher> {
    pub fn get_by_key(&self, subscriber_key: &str) -> Result<Option<Subscriber>> {
        debug!("Retrieving subscriber {}", subscriber_key);
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(subscriber_key))?;
        Ok(parse_subscriber(&doc))
    }
}

impl SubscriberManager<AsyncDispatcher> {
    pub async fn get_by_key(&self, subscriber_key: &str) -> Result<Option<Subscriber>> {
        debug!("Retrieving subscriber {}", subscriber_key);
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(subscriber_key))
            .await?;
        Ok(parse_subscriber(&doc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::fixtures::retrieve_response;

    #[test]
    fn test_parse_subscriber() {
        let doc = SoapDocument::parse(retrieve_response(
            "<Results>
               <ID>42</ID>
               <CreatedDate>2024-03-01T10:00:00</CreatedDate>
               <EmailAddress>jo@example.com</EmailAddress>
               <SubscriberKey>jo-1</SubscriberKey>
               <Status>Active</Status>
             </Results>",
        ))
        .unwrap();

        let subscriber = parse_subscriber(&doc).unwrap();
        assert_eq!(subscriber.id.as_deref(), Some("42"));
        assert_eq!(subscriber.email_address.as_deref(), Some("jo@example.com"));
        assert_eq!(subscriber.status.as_deref(), Some("Active"));
        assert_eq!(subscriber.unsubscribed_date, None);
    }

    #[test]
    fn test_retrieve_body_filters_on_subscriber_key() {
        let body = retrieve_by_key("jo-1");
        assert!(body.contains("<ObjectType>Subscriber</ObjectType>"));
        assert!(body.contains("<Property>SubscriberKey</Property>"));
        assert!(body.contains("<Value>jo-1</Value>"));
    }
}

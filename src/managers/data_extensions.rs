use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{first_result, query_value, soap_text, RETRIEVE_ACTION};
use crate::client::{AsyncDispatcher, Dispatcher};
use crate::error::Result;
use crate::http::Method;
use crate::soap::{response_namespaces, RetrieveRequest, SoapDocument};

const CUSTOM_OBJECTS: &str = "data/v1/customobjects";

const PROPERTIES: &[&str] = &[
    "ObjectID",
    "CustomerKey",
    "Name",
    "IsSendable",
    "SendableSubscriberField.Name",
];

/// Data extension summary returned by a SOAP lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataExtension {
    #[serde(rename = "ObjectID")]
    pub object_id: Option<String>,
    #[serde(rename = "CustomerKey")]
    pub customer_key: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "IsSendable")]
    pub is_sendable: Option<bool>,
    #[serde(rename = "SendableSubscriberFieldName")]
    pub sendable_subscriber_field: Option<String>,
}

fn retrieve_by_key(key: &str) -> String {
    RetrieveRequest {
        object_type: "DataExtension",
        properties: PROPERTIES,
        filter_property: "CustomerKey",
        filter_value: key,
    }
    .to_xml()
}

fn parse_data_extension(doc: &SoapDocument) -> Option<DataExtension> {
    let ns = response_namespaces();
    let row = first_result(doc)?;
    Some(DataExtension {
        object_id: soap_text(row, "ObjectID", &ns),
        customer_key: soap_text(row, "CustomerKey", &ns),
        name: soap_text(row, "Name", &ns),
        is_sendable: soap_text(row, "IsSendable", &ns).map(|v| v.eq_ignore_ascii_case("true")),
        sendable_subscriber_field: soap_text(row, "SendableSubscriberField/Name", &ns),
    })
}

fn search_path(name: &str) -> String {
    format!("{}?$search={}", CUSTOM_OBJECTS, query_value(name))
}

fn by_id_path(id: &str) -> String {
    format!("{}/{}", CUSTOM_OBJECTS, id)
}

fn fields_path(id: &str) -> String {
    format!("{}/{}/fields", CUSTOM_OBJECTS, id)
}

/// `items` of a search response, absent when the body has none.
fn search_items(response: Value) -> Option<Vec<Value>> {
    match response {
        Value::Object(mut body) => match body.remove("items") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// `id` of the first search match.
fn first_match_id(items: Option<Vec<Value>>) -> Option<String> {
    let first = items?.into_iter().next()?;
    match first.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Data extension lookups (SOAP by customer key, REST for search, fields
/// and creation).
#[derive(Debug)]
pub struct DataExtensionManager<D> {
    dispatcher: Arc<D>,
}

impl<D> DataExtensionManager<D> {
    pub(crate) fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }
}

impl DataExtensionManager<Dispatcher> {
    /// `None` when no data extension has this customer key.
    pub fn get_by_key(&self, key: &str) -> Result<Option<DataExtension>> {
        debug!("Retrieving data extension {}", key);
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))?;
        Ok(parse_data_extension(&doc))
    }

    /// Data extensions whose name matches or contains `name`.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Vec<Value>>> {
        let response = self.dispatcher.rest(&search_path(name), Method::Get, None)?;
        Ok(search_items(response))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None)
    }

    /// Fields of the first data extension matching `name`.
    pub fn get_fields(&self, name: &str) -> Result<Option<Value>> {
        let Some(id) = first_match_id(self.get_by_name(name)?) else {
            return Ok(None);
        };
        self.dispatcher
            .rest(&fields_path(&id), Method::Get, None)
            .map(Some)
    }

    pub fn create(&self, definition: &Value) -> Result<Value> {
        self.dispatcher
            .rest(CUSTOM_OBJECTS, Method::Post, Some(definition))
    }
}

impl DataExtensionManager<AsyncDispatcher> {
    pub async fn get_by_key(&self, key: &str) -> Result<Option<DataExtension>> {
        debug!("Retrieving data extension {}", key);
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))
            .await?;
        Ok(parse_data_extension(&doc))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Vec<Value>>> {
        let response = self
            .dispatcher
            .rest(&search_path(name), Method::Get, None)
            .await?;
        Ok(search_items(response))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None).await
    }

    pub async fn get_fields(&self, name: &str) -> Result<Option<Value>> {
        let Some(id) = first_match_id(self.get_by_name(name).await?) else {
            return Ok(None);
        };
        self.dispatcher
            .rest(&fields_path(&id), Method::Get, None)
            .await
            .map(Some)
    }

    pub async fn create(&self, definition: &Value) -> Result<Value> {
        self.dispatcher
            .rest(CUSTOM_OBJECTS, Method::Post, Some(definition))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::fixtures::retrieve_response;
    use serde_json::json;

    #[test]
    fn test_retrieve_body() {
        let body = retrieve_by_key("orders_de");
        assert!(body.contains("<ObjectType>DataExtension</ObjectType>"));
        assert!(body.contains("<Properties>SendableSubscriberField.Name</Properties>"));
        assert!(body.contains("<Value>orders_de</Value>"));
    }

    #[test]
    fn test_parse_data_extension() {
        let doc = SoapDocument::parse(retrieve_response(
            r#"<Results xsi:type="DataExtension" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
                 <ObjectID>6f1c</ObjectID>
                 <CustomerKey>orders_de</CustomerKey>
                 <Name>Orders</Name>
                 <IsSendable>true</IsSendable>
                 <SendableSubscriberField><Name>Subscriber Key</Name></SendableSubscriberField>
               </Results>"#,
        ))
        .unwrap();

        let de = parse_data_extension(&doc).unwrap();
        assert_eq!(de.object_id.as_deref(), Some("6f1c"));
        assert_eq!(de.customer_key.as_deref(), Some("orders_de"));
        assert_eq!(de.name.as_deref(), Some("Orders"));
        assert_eq!(de.is_sendable, Some(true));
        assert_eq!(de.sendable_subscriber_field.as_deref(), Some("Subscriber Key"));
    }

    #[test]
    fn test_search_items() {
        assert_eq!(
            search_items(json!({"items": ["item1", "item2"]})),
            Some(vec![json!("item1"), json!("item2")])
        );
        assert_eq!(search_items(json!({"count": 0})), None);
        assert_eq!(search_items(Value::Null), None);
    }

    #[test]
    fn test_first_match_id() {
        assert_eq!(
            first_match_id(Some(vec![json!({"id": "abc"}), json!({"id": "def"})])),
            Some("abc".to_string())
        );
        assert_eq!(first_match_id(Some(vec![])), None);
        assert_eq!(first_match_id(Some(vec![json!({"name": "x"})])), None);
        assert_eq!(first_match_id(None), None);
    }

    #[test]
    fn test_rest_paths() {
        assert_eq!(search_path("My DE"), "data/v1/customobjects?$search=My+DE");
        assert_eq!(fields_path("abc"), "data/v1/customobjects/abc/fields");
    }
}

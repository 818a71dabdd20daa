use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{first_result, soap_text, RETRIEVE_ACTION};
use crate::client::{AsyncDispatcher, Dispatcher};
use crate::error::Result;
use crate::http::Method;
use crate::soap::{response_namespaces, RetrieveRequest, SoapDocument};

const PROPERTIES: &[&str] = &[
    "ObjectID",
    "CustomerKey",
    "Name",
    "QueryText",
    "TargetType",
    "DataExtensionTarget.Name",
    "TargetUpdateType",
];

/// A query activity: its SQL and where the results land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDefinition {
    #[serde(rename = "ObjectID")]
    pub object_id: Option<String>,
    #[serde(rename = "CustomerKey")]
    pub customer_key: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "QueryText")]
    pub query_text: Option<String>,
    #[serde(rename = "TargetType")]
    pub target_type: Option<String>,
    #[serde(rename = "DataExtensionTargetName")]
    pub target_name: Option<String>,
    #[serde(rename = "TargetUpdateType")]
    pub target_update_type: Option<String>,
}

fn retrieve_by_key(key: &str) -> String {
    RetrieveRequest {
        object_type: "QueryDefinition",
        properties: PROPERTIES,
        filter_property: "CustomerKey",
        filter_value: key,
    }
    .to_xml()
}

fn parse_query(doc: &SoapDocument) -> Option<QueryDefinition> {
    let ns = response_namespaces();
    let row = first_result(doc)?;
    Some(QueryDefinition {
        object_id: soap_text(row, "ObjectID", &ns),
        customer_key: soap_text(row, "CustomerKey", &ns),
        name: soap_text(row, "Name", &ns),
        query_text: soap_text(row, "QueryText", &ns),
        target_type: soap_text(row, "TargetType", &ns),
        target_name: soap_text(row, "DataExtensionTarget/Name", &ns),
        target_update_type: soap_text(row, "TargetUpdateType", &ns),
    })
}

fn by_id_path(id: &str) -> String {
    format!("automation/v1/queries/{}", id)
}

#[derive(Debug)]
pub struct QueryManager<D> {
    dispatcher: Arc<D>,
}

impl<D> QueryManager<D> {
    pub(crate) fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }
}

impl QueryManager<Dispatcher> {
    pub fn get_by_key(&self, key: &str) -> Result<Option<QueryDefinition>> {
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))?;
        Ok(parse_query(&doc))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None)
    }
}

impl QueryManager<AsyncDispatcher> {
    pub async fn get_by_key(&self, key: &str) -> Result<Option<QueryDefinition>> {
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))
            .await?;
        Ok(parse_query(&doc))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::fixtures::retrieve_response;

    #[test]
    fn test_parse_query_definition() {
        let doc = SoapDocument::parse(retrieve_response(
            "<Results>
               <ObjectID>q-9</ObjectID>
               <CustomerKey>active_subs</CustomerKey>
               <Name>Active subscribers</Name>
               <QueryText>SELECT SubscriberKey FROM _Subscribers WHERE Status = 'active'</QueryText>
               <TargetType>DE</TargetType>
               <DataExtensionTarget><Name>Active</Name></DataExtensionTarget>
               <TargetUpdateType>Overwrite</TargetUpdateType>
             </Results>",
        ))
        .unwrap();

        let query = parse_query(&doc).unwrap();
        assert_eq!(query.object_id.as_deref(), Some("q-9"));
        assert!(query.query_text.unwrap().starts_with("SELECT SubscriberKey"));
        assert_eq!(query.target_name.as_deref(), Some("Active"));
        assert_eq!(query.target_update_type.as_deref(), Some("Overwrite"));
    }

    #[test]
    fn test_retrieve_body() {
        let body = retrieve_by_key("active_subs");
        assert!(body.contains("<ObjectType>QueryDefinition</ObjectType>"));
        assert!(body.contains("<Properties>DataExtensionTarget.Name</Properties>"));
    }
}

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{first_result, soap_text, RETRIEVE_ACTION};
use crate::client::{AsyncDispatcher, Dispatcher};
use crate::error::Result;
use crate::http::Method;
use crate::soap::{response_namespaces, RetrieveRequest, SoapDocument};

const PROPERTIES: &[&str] = &["ProgramID", "CustomerKey", "Name", "Description", "Status"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Automation {
    #[serde(rename = "ProgramID")]
    pub program_id: Option<String>,
    #[serde(rename = "CustomerKey")]
    pub customer_key: Option<String>,
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    /// Numeric status code as sent by the server.
    #[serde(rename = "Status")]
    pub status: Option<String>,
}

fn retrieve_by_key(key: &str) -> String {
    RetrieveRequest {
        object_type: "Automation",
        properties: PROPERTIES,
        filter_property: "CustomerKey",
        filter_value: key,
    }
    .to_xml()
}

fn parse_automation(doc: &SoapDocument) -> Option<Automation> {
    let ns = response_namespaces();
    let row = first_result(doc)?;
    Some(Automation {
        program_id: soap_text(row, "ProgramID", &ns),
        customer_key: soap_text(row, "CustomerKey", &ns),
        name: soap_text(row, "Name", &ns),
        description: soap_text(row, "Description", &ns),
        status: soap_text(row, "Status", &ns),
    })
}

fn by_id_path(id: &str) -> String {
    format!("automation/v1/automations/{}", id)
}

#[derive(Debug)]
pub struct AutomationManager<D> {
    dispatcher: Arc<D>,
}

impl<D> AutomationManager<D> {
    pub(crate) fn new(dispatcher: Arc<D>) -> Self {
        Self { dispatcher }
    }
}

impl AutomationManager<Dispatcher> {
    pub fn get_by_key(&self, key: &str) -> Result<Option<Automation>> {
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))?;
        Ok(parse_automation(&doc))
    }

    pub fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None)
    }
}

impl AutomationManager<AsyncDispatcher> {
    pub async fn get_by_key(&self, key: &str) -> Result<Option<Automation>> {
        let doc = self
            .dispatcher
            .soap(RETRIEVE_ACTION, &retrieve_by_key(key))
            .await?;
        Ok(parse_automation(&doc))
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Value> {
        self.dispatcher.rest(&by_id_path(id), Method::Get, None).await
    }
}

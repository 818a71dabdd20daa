use std::sync::{Arc, OnceLock};

use serde_json::Value;

use super::dispatcher::AsyncDispatcher;
use crate::auth::{AsyncAuthManager, Clock};
use crate::config::Config;
use crate::error::Result;
use crate::http::{AsyncHttpClient, AsyncTransport, HttpSettings, IntoMethod};
use crate::managers::{AutomationManager, DataExtensionManager, QueryManager, SubscriberManager};
use crate::soap::SoapDocument;

/// Async Marketing Cloud client; the same surface as
/// [`Client`](super::Client) with `async fn`s.
pub struct AsyncClient {
    core: Arc<AsyncDispatcher>,
    data_extensions: OnceLock<DataExtensionManager<AsyncDispatcher>>,
    automations: OnceLock<AutomationManager<AsyncDispatcher>>,
    queries: OnceLock<QueryManager<AsyncDispatcher>>,
    subscribers: OnceLock<SubscriberManager<AsyncDispatcher>>,
}

impl AsyncClient {
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn builder(config: Config) -> AsyncClientBuilder {
        AsyncClientBuilder {
            config,
            settings: HttpSettings::default(),
            transport: None,
            clock: None,
        }
    }

    pub fn from_parts(
        config: Config,
        http: AsyncHttpClient,
        auth: Option<Arc<AsyncAuthManager>>,
    ) -> Self {
        Self::from_dispatcher(AsyncDispatcher::new(Arc::new(config), http, auth))
    }

    fn from_dispatcher(core: AsyncDispatcher) -> Self {
        Self {
            core: Arc::new(core),
            data_extensions: OnceLock::new(),
            automations: OnceLock::new(),
            queries: OnceLock::new(),
            subscribers: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.core.config()
    }

    pub fn auth(&self) -> &AsyncAuthManager {
        self.core.auth()
    }

    pub fn http(&self) -> &AsyncHttpClient {
        self.core.http()
    }

    pub fn is_token_expired(&self) -> bool {
        self.core.auth().is_token_expired()
    }

    pub async fn make_rest_request(
        &self,
        endpoint: &str,
        method: impl IntoMethod,
        data: Option<&Value>,
    ) -> Result<Value> {
        self.core.rest(endpoint, method, data).await
    }

    pub async fn make_soap_request(&self, action: &str, body: &str) -> Result<SoapDocument> {
        self.core.soap(action, body).await
    }

    pub fn data_extensions(&self) -> &DataExtensionManager<AsyncDispatcher> {
        self.data_extensions
            .get_or_init(|| DataExtensionManager::new(self.core.clone()))
    }

    pub fn automations(&self) -> &AutomationManager<AsyncDispatcher> {
        self.automations
            .get_or_init(|| AutomationManager::new(self.core.clone()))
    }

    pub fn queries(&self) -> &QueryManager<AsyncDispatcher> {
        self.queries.get_or_init(|| QueryManager::new(self.core.clone()))
    }

    pub fn subscribers(&self) -> &SubscriberManager<AsyncDispatcher> {
        self.subscribers
            .get_or_init(|| SubscriberManager::new(self.core.clone()))
    }
}

impl std::fmt::Debug for AsyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncClient").field("core", &self.core).finish()
    }
}

pub struct AsyncClientBuilder {
    config: Config,
    settings: HttpSettings,
    transport: Option<Arc<dyn AsyncTransport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl AsyncClientBuilder {
    pub fn settings(mut self, settings: HttpSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn AsyncTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<AsyncClient> {
        let http = match self.transport {
            Some(transport) => {
                AsyncHttpClient::with_transport(&self.config, self.settings, transport)?
            }
            None => AsyncHttpClient::new(&self.config, self.settings)?,
        };

        let config = Arc::new(self.config);
        let mut auth = AsyncAuthManager::new(config.clone(), http.clone());
        if let Some(clock) = self.clock {
            auth = auth.with_clock(clock);
        }

        Ok(AsyncClient::from_dispatcher(AsyncDispatcher::new(
            config,
            http,
            Some(Arc::new(auth)),
        )))
    }
}

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use super::dispatcher::Dispatcher;
use crate::auth::{ensure_blocking_context, AuthManager, Clock};
use crate::config::Config;
use crate::error::Result;
use crate::http::{HttpClient, HttpSettings, IntoMethod, Transport};
use crate::managers::{AutomationManager, DataExtensionManager, QueryManager, SubscriberManager};
use crate::soap::SoapDocument;

/// Blocking Marketing Cloud client.
///
/// Safe to share between threads (wrap it in an `Arc`); all threads share
/// one token and one connection pool. Must not be used from inside a Tokio
/// runtime; use [`AsyncClient`](super::AsyncClient) there.
pub struct Client {
    core: Arc<Dispatcher>,
    data_extensions: OnceLock<DataExtensionManager<Dispatcher>>,
    automations: OnceLock<AutomationManager<Dispatcher>>,
    queries: OnceLock<QueryManager<Dispatcher>>,
    subscribers: OnceLock<SubscriberManager<Dispatcher>>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Client configured from the `SFMC_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder {
            config,
            settings: HttpSettings::default(),
            transport: None,
            clock: None,
        }
    }

    /// Assemble a client from prebuilt parts. `http` is given `auth` as its
    /// token source; a fresh auth manager is created when none is passed.
    pub fn from_parts(config: Config, http: HttpClient, auth: Option<Arc<AuthManager>>) -> Self {
        Self::from_dispatcher(Dispatcher::new(Arc::new(config), http, auth))
    }

    fn from_dispatcher(core: Dispatcher) -> Self {
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

    pub fn auth(&self) -> &AuthManager {
        self.core.auth()
    }

    pub fn http(&self) -> &HttpClient {
        self.core.http()
    }

    pub fn is_token_expired(&self) -> bool {
        self.core.auth().is_token_expired()
    }

    /// Call a REST endpoint (path relative to the tenant's REST host).
    ///
    /// Only GET, POST, PUT and DELETE are accepted; anything else is a usage
    /// error raised before authenticating or touching the network.
    pub fn make_rest_request(
        &self,
        endpoint: &str,
        method: impl IntoMethod,
        data: Option<&Value>,
    ) -> Result<Value> {
        self.core.rest(endpoint, method, data)
    }

    /// Post a SOAP body fragment under `action` and return the parsed
    /// response.
    pub fn make_soap_request(&self, action: &str, body: &str) -> Result<SoapDocument> {
        self.core.soap(action, body)
    }

    pub fn data_extensions(&self) -> &DataExtensionManager<Dispatcher> {
        self.data_extensions
            .get_or_init(|| DataExtensionManager::new(self.core.clone()))
    }

    pub fn automations(&self) -> &AutomationManager<Dispatcher> {
        self.automations
            .get_or_init(|| AutomationManager::new(self.core.clone()))
    }

    pub fn queries(&self) -> &QueryManager<Dispatcher> {
        self.queries.get_or_init(|| QueryManager::new(self.core.clone()))
    }

    pub fn subscribers(&self) -> &SubscriberManager<Dispatcher> {
        self.subscribers
            .get_or_init(|| SubscriberManager::new(self.core.clone()))
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("core", &self.core).finish()
    }
}

pub struct ClientBuilder {
    config: Config,
    settings: HttpSettings,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ClientBuilder {
    pub fn settings(mut self, settings: HttpSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the default `reqwest` blocking transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Client> {
        let http = match self.transport {
            Some(transport) => HttpClient::with_transport(&self.config, self.settings, transport)?,
            None => {
                // The blocking reqwest client owns a runtime of its own.
                ensure_blocking_context("Client::new")?;
                HttpClient::new(&self.config, self.settings)?
            }
        };

        let config = Arc::new(self.config);
        let mut auth = AuthManager::new(config.clone(), http.clone());
        if let Some(clock) = self.clock {
            auth = auth.with_clock(clock);
        }

        Ok(Client::from_dispatcher(Dispatcher::new(
            config,
            http,
            Some(Arc::new(auth)),
        )))
    }
}

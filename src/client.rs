use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client; // blocking calls, requests are issued strictly in sequence
use reqwest::{Proxy, StatusCode};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::errors::RequestResult;
use crate::names::annotate_resource_tree;
use crate::render::{self, Renderer};
use crate::request::{
    PreparedRequest, RequestParams, ORIGINATING_TIMESTAMP_HEADER, RELEASE_VERSION_HEADER,
    REQUEST_IDENTIFIER_HEADER, STATUS_CODE_HEADER,
};
use crate::session::Session;
use crate::types::Operation;

pub const UPPER_TESTER_COMMAND_HEADER: &str = "X-M2M-UTCMD";
const RESOURCE_TREE_PATH: &str = "/__structure__/text";
const RESET_PATH: &str = "/__reset__";

/// Failure to complete one HTTP exchange with the CSE
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Response body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

/// Everything captured from one response
#[derive(Debug, Clone, PartialEq)]
pub struct CseResponse {
    pub http_status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    /// oneM2M response status code, `-1` if the response carried none
    pub rsc: i64,
    /// Decoded body, `None` for an empty body
    pub content: Option<Value>,
    pub request_identifier: Option<String>,
    pub release_version: Option<String>,
    pub originating_timestamp: Option<String>,
    /// The response as a oneM2M primitive (`m2m:rsp`)
    pub description: Value,
}

impl CseResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

/// Result of one iteration of a (possibly repeated) request
pub type Outcome = Result<CseResponse, TransportError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCheck {
    Reachable,
    /// The host answered but the CSE address is wrong
    WrongAddress(String),
    Unreachable(String),
}

impl ConnectionCheck {
    pub fn problem(&self) -> Option<&str> {
        match self {
            ConnectionCheck::Reachable => None,
            ConnectionCheck::WrongAddress(message) | ConnectionCheck::Unreachable(message) => {
                Some(message)
            }
        }
    }
}

/// HTTP client for one CSE. Clones share the HTTP connection settings and
/// the [`Session`].
#[derive(Clone)]
pub struct CseClient {
    client: Client,
    settings: Settings,
    session: Session,
    renderer: Arc<Renderer>,
}

impl CseClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let mut builder = Client::builder().timeout(Duration::from_secs(60));
        if let Some(proxy) = &settings.proxy.http {
            builder = builder.proxy(Proxy::http(proxy)?);
        }
        if let Some(proxy) = &settings.proxy.https {
            builder = builder.proxy(Proxy::https(proxy)?);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            session: Session::new(&settings.output),
            renderer: Arc::new(Renderer::new(settings.output.theme.clone())),
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn host(&self) -> &str {
        &self.settings.cse.host
    }

    pub fn create(&self, params: &RequestParams) -> RequestResult<Vec<Outcome>> {
        self.send_and_report(Operation::Create, params)
    }

    pub fn retrieve(&self, params: &RequestParams) -> RequestResult<Vec<Outcome>> {
        self.send_and_report(Operation::Retrieve, params)
    }

    pub fn update(&self, params: &RequestParams) -> RequestResult<Vec<Outcome>> {
        self.send_and_report(Operation::Update, params)
    }

    pub fn delete(&self, params: &RequestParams) -> RequestResult<Vec<Outcome>> {
        self.send_and_report(Operation::Delete, params)
    }

    fn send_and_report(
        &self,
        operation: Operation,
        params: &RequestParams,
    ) -> RequestResult<Vec<Outcome>> {
        let result = self.send(operation, params);
        if let Err(e) = &result {
            render::print_error(&e.to_string(), None);
        }
        result
    }

    /// Validate `params` and send the request as often as it asks for.
    /// Nothing is sent if validation fails.
    pub fn send(&self, operation: Operation, params: &RequestParams) -> RequestResult<Vec<Outcome>> {
        let request = params.prepare(operation)?;
        Ok(self.execute(&request))
    }

    /// Send a prepared request `request.repeat` times. A failed exchange is
    /// reported and does not stop the following iterations.
    pub fn execute(&self, request: &PreparedRequest) -> Vec<Outcome> {
        let url = request.url(self.host());
        let verbose = request.is_verbose(self.session.is_verbose());
        self.session.clear_response();

        (0..request.repeat)
            .map(|_| {
                let outcome = self.exchange(request, &url);
                match &outcome {
                    Ok(response) => {
                        if let Err(e) = self.display(request, &url, response, verbose) {
                            warn!("Failed to render response: {}", e);
                        }
                    }
                    Err(e) => {
                        warn!("Request to {} failed: {}", url, e);
                        render::print_connection_error(&e.to_string());
                    }
                }
                outcome
            })
            .collect()
    }

    fn exchange(&self, request: &PreparedRequest, url: &str) -> Outcome {
        let method = request.operation.http_method();
        debug!("{} {}", method, url);

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let response = builder.send()?;

        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let text = response.text()?;
        let content = if text.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(&text)?)
        };

        let rsc = header_value(&headers, STATUS_CODE_HEADER)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(-1);
        let request_identifier = non_empty_header(&headers, REQUEST_IDENTIFIER_HEADER);
        let release_version = non_empty_header(&headers, RELEASE_VERSION_HEADER);
        let originating_timestamp = non_empty_header(&headers, ORIGINATING_TIMESTAMP_HEADER);

        let mut description = Map::new();
        description.insert("to".into(), json!(request.originator));
        description.insert("fr".into(), json!(request.to));
        description.insert("rsc".into(), json!(rsc));
        if let Some(rvi) = &release_version {
            description.insert("rvi".into(), json!(rvi));
        }
        if let Some(rqi) = &request_identifier {
            description.insert("rqi".into(), json!(rqi));
        }
        if let Some(ot) = &originating_timestamp {
            description.insert("ot".into(), json!(ot));
        }
        if let Some(content) = &content {
            description.insert("pc".into(), content.clone());
        }

        debug!("{} {} -> {} (rsc {})", request.operation, url, status, rsc);
        self.session.record(content.clone(), rsc);

        Ok(CseResponse {
            http_status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            rsc,
            content,
            request_identifier,
            release_version,
            originating_timestamp,
            description: Value::Object(description),
        })
    }

    fn display(
        &self,
        request: &PreparedRequest,
        url: &str,
        response: &CseResponse,
        verbose: bool,
    ) -> Result<()> {
        if verbose {
            let long_names = self.session.long_names();
            self.renderer.print_request(request, url, long_names)?;
            self.renderer.print_curl(request, url)?;
            self.renderer.print_response(response, long_names)?;
            if let Err(e) = self.show_resource_tree(true, "CSE Resource Tree") {
                warn!("Could not retrieve the resource tree: {}", e);
            }
            self.renderer.markdown("---")?;
        } else if request.silent.is_none() {
            self.renderer
                .print_short_response(response, self.session.with_results())?;
        }
        Ok(())
    }

    /// Retrieve the CSE's resource tree as text, `None` unless the CSE
    /// answers with HTTP 200.
    pub fn resource_tree(&self) -> Result<Option<String>> {
        let response = self
            .client
            .get(format!("{}{}", self.host(), RESOURCE_TREE_PATH))
            .send()?;
        if response.status() != StatusCode::OK {
            debug!("Resource tree not available: {}", response.status());
            return Ok(None);
        }
        Ok(Some(response.text()?))
    }

    /// Print the resource tree; returns whether one was available.
    pub fn show_resource_tree(&self, section: bool, title: &str) -> Result<bool> {
        match self.resource_tree()? {
            Some(tree) => {
                let tree = annotate_resource_tree(&tree, self.session.long_names());
                self.renderer.print_resource_tree(&tree, title, section)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Send a command to the upper tester interface. Succeeds on HTTP 200.
    pub fn run_script(&self, script: &str) -> Result<bool> {
        let Some(upper_tester) = &self.settings.cse.upper_tester else {
            render::print_failure("No command interface available");
            return Ok(false);
        };
        let response = self
            .client
            .post(upper_tester)
            .header(UPPER_TESTER_COMMAND_HEADER, script)
            .send()?;
        info!("Upper tester command '{}': {}", script, response.status());
        Ok(response.status() == StatusCode::OK)
    }

    pub fn reset_cse(&self, verbose: bool) -> Result<bool> {
        if !self.run_script("reset")? {
            if verbose {
                render::print_failure("Error during reset");
            }
            return Ok(false);
        }
        if verbose {
            render::print_success("CSE successfully reset");
        }
        Ok(true)
    }

    /// Ask the CSE to create the initial resources for a notebook `kind`.
    pub fn setup_initial_resource_structure(&self, kind: &str, verbose: bool) -> Result<bool> {
        if !self.run_script(&format!("notebooksPrepareResources {}", kind))? {
            if verbose {
                render::print_failure("Error during resource preparation");
            }
            return Ok(false);
        }
        if verbose {
            render::print_success("Resources prepared");
        }
        Ok(true)
    }

    /// Reset the CSE through its built-in reset endpoint.
    pub fn clean_cse(&self) -> bool {
        match self
            .client
            .get(format!("{}{}", self.host(), RESET_PATH))
            .send()
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                warn!("Could not clean the CSE: {}", e);
                false
            }
        }
    }

    /// Check that the CSE answers for the resource `id`.
    pub fn check_connection(&self, id: &str) -> ConnectionCheck {
        match self.client.get(format!("{}/{}", self.host(), id)).send() {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                ConnectionCheck::WrongAddress(
                    StatusCode::NOT_FOUND
                        .canonical_reason()
                        .unwrap_or("Not Found")
                        .to_string(),
                )
            }
            Ok(_) => ConnectionCheck::Reachable,
            Err(e) => ConnectionCheck::Unreachable(e.to_string()),
        }
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn non_empty_header(headers: &[(String, String)], name: &str) -> Option<String> {
    header_value(headers, name)
        .filter(|value| !value.is_empty())
        .map(String::from)
}

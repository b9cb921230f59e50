use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::{json, Value};
use strum::IntoEnumIterator;

use onem2m_notebook::client::{CseClient, Outcome};
use onem2m_notebook::errors::RequestResult;
use onem2m_notebook::render;
use onem2m_notebook::request::{FilterValue, PrimitiveContent, RequestParams};
use onem2m_notebook::types::{Operation, ResourceType};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Target resource, e.g. /cse-in/Notebook-AE
    #[arg(long)]
    to: Option<String>,

    /// Originator, defaults to the configured cse.originator
    #[arg(long)]
    originator: Option<String>,

    /// Resource type as number or name (AE, Container, ...)
    #[arg(long, value_parser = parse_resource_type)]
    ty: Option<i64>,

    /// JSON content, or @file to read it from a file
    #[arg(long)]
    content: Option<String>,

    /// Request identifier, a random one if not given
    #[arg(long)]
    rqi: Option<String>,

    /// Release version indicator
    #[arg(long)]
    rvi: Option<String>,

    /// Filter usage
    #[arg(long)]
    fu: Option<i64>,

    /// Result content
    #[arg(long)]
    rcn: Option<i64>,

    /// Discovery level
    #[arg(long)]
    lvl: Option<i64>,

    /// Resource type filter for discovery, as number or name
    #[arg(long, value_parser = parse_resource_type)]
    child_type: Option<i64>,

    /// Filter criteria as key=value, the value may be JSON
    #[arg(long = "fc", value_parser = parse_key_value)]
    filters: Vec<(String, String)>,

    /// Additional query argument as key=value
    #[arg(long = "arg", value_parser = parse_key_value)]
    args: Vec<(String, String)>,

    /// Suppress the output of this request
    #[arg(long)]
    silent: bool,

    /// Send the request this many times
    #[arg(long)]
    repeat: Option<u32>,
}

impl RequestArgs {
    pub fn into_params(self, default_originator: &str) -> Result<RequestParams> {
        let primitive_content = match self.content {
            Some(content) => Some(PrimitiveContent::Text(read_content(&content)?)),
            None => None,
        };
        Ok(RequestParams {
            to: self.to,
            primitive_content,
            resource_type: self.ty,
            originator: Some(
                self.originator
                    .unwrap_or_else(|| default_originator.to_string()),
            ),
            request_identifier: self.rqi,
            release_version_indicator: self.rvi,
            filter_usage: self.fu,
            filter_criteria: self
                .filters
                .into_iter()
                .map(|(key, value)| (key, filter_value(&value)))
                .collect(),
            result_content: self.rcn,
            level: self.lvl,
            child_type: self.child_type,
            silent: self.silent.then_some(true),
            repeat: self.repeat,
            extra: self.args,
        })
    }
}

pub fn execute(client: &CseClient, operation: Operation, args: RequestArgs) -> Result<bool> {
    let params = args.into_params(&client.settings().cse.originator)?;
    Ok(succeeded(&perform(client, operation, &params)))
}

/// Send a request file: a JSON object with an "operation" key and the
/// request parameters in long form, e.g. `"to"`, `"originator"`,
/// `"primitiveContent"`.
pub fn send_file(client: &CseClient, file: &Path) -> Result<bool> {
    let Some((operation, params)) = load_request_file(client, file)? else {
        return Ok(false);
    };
    Ok(succeeded(&perform(client, operation, &params)))
}

/// Read a request file. Validation errors are printed and yield `None`.
pub fn load_request_file(
    client: &CseClient,
    file: &Path,
) -> Result<Option<(Operation, RequestParams)>> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read request file {}", file.display()))?;
    let mut bag: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let object = bag
        .as_object_mut()
        .ok_or_else(|| anyhow!("{} must contain a JSON object", file.display()))?;

    let operation = object
        .remove("operation")
        .and_then(|operation| operation.as_str().map(Operation::from_str))
        .ok_or_else(|| anyhow!("{} has no \"operation\" key", file.display()))?
        .map_err(|_| anyhow!("operation must be one of create, retrieve, update or delete"))?;
    object
        .entry("originator")
        .or_insert_with(|| json!(client.settings().cse.originator));

    match RequestParams::from_value(operation, &bag) {
        Ok(params) => Ok(Some((operation, params))),
        Err(e) => {
            render::print_error(&e.to_string(), None);
            Ok(None)
        }
    }
}

pub fn perform(
    client: &CseClient,
    operation: Operation,
    params: &RequestParams,
) -> RequestResult<Vec<Outcome>> {
    match operation {
        Operation::Create => client.create(params),
        Operation::Retrieve => client.retrieve(params),
        Operation::Update => client.update(params),
        Operation::Delete => client.delete(params),
    }
}

fn succeeded(result: &RequestResult<Vec<Outcome>>) -> bool {
    match result {
        Ok(outcomes) => outcomes.iter().all(|outcome| {
            outcome
                .as_ref()
                .is_ok_and(|response| render::is_success(response.http_status))
        }),
        Err(_) => false,
    }
}

fn read_content(content: &str) -> Result<String> {
    match content.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read content file {}", path)),
        None => Ok(content.to_string()),
    }
}

fn filter_value(value: &str) -> FilterValue {
    match serde_json::from_str::<Value>(value) {
        Ok(json) if !json.is_object() && !json.is_null() => FilterValue::from(&json),
        _ => FilterValue::from(value),
    }
}

fn parse_resource_type(value: &str) -> Result<i64, String> {
    if let Ok(code) = value.parse::<i64>() {
        return Ok(code);
    }
    ResourceType::iter()
        .find(|ty| ty.to_string().eq_ignore_ascii_case(value))
        .map(i64::from)
        .ok_or_else(|| format!("unknown resource type '{}'", value))
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    let (key, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", value))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", value));
    }
    Ok((key.to_string(), value.to_string()))
}

//! Assembly and validation of oneM2M requests.
//!
//! A request is described either with the [`RequestParams`] builder or with a
//! dynamic parameter bag (a JSON object, as found in request files) via
//! [`RequestParams::from_value`]. [`RequestParams::prepare`] validates it and
//! produces the headers, query string, body and request description that the
//! client sends and renders.

use rand::Rng;
use serde_json::{json, Map, Value};

use crate::errors::{RequestError, RequestResult};
use crate::names::{json_long_to_short, long_to_short};
use crate::types::Operation;

pub const ORIGINATOR_HEADER: &str = "X-M2M-Origin";
pub const REQUEST_IDENTIFIER_HEADER: &str = "X-M2M-RI";
pub const RELEASE_VERSION_HEADER: &str = "X-M2M-RVI";
pub const STATUS_CODE_HEADER: &str = "X-M2M-RSC";
pub const ORIGINATING_TIMESTAMP_HEADER: &str = "X-M2M-OT";

pub const DEFAULT_RELEASE_VERSION: &str = "3";

const INTEGER: &str = "an integer number";
const STRING: &str = "a string";

/// Parameter names with dedicated handling. Anything else in a parameter bag
/// is passed through to the query string.
const KNOWN_PARAMETERS: &[&str] = &[
    "to",
    "primitiveContent",
    "resourceType",
    "originator",
    "requestIdentifier",
    "releaseVersionIndicator",
    "filterUsage",
    "filterCriteria",
    "resultContent",
    "level",
    "type",
    "_silent",
    "_repeat",
];

/// The request body, either as ready JSON text or as a JSON document
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveContent {
    Text(String),
    Json(Value),
}

impl From<Value> for PrimitiveContent {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => PrimitiveContent::Text(text),
            other => PrimitiveContent::Json(other),
        }
    }
}

impl From<&str> for PrimitiveContent {
    fn from(text: &str) -> Self {
        PrimitiveContent::Text(text.to_string())
    }
}

/// A filter criteria value as it is written into the query string
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    Number(serde_json::Number),
}

impl FilterValue {
    /// Booleans are lower case, lists are joined with `+`
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Text(text) => text.clone(),
            FilterValue::Bool(flag) => flag.to_string(),
            FilterValue::List(items) => items.join("+"),
            FilterValue::Number(number) => number.to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Text(text) => json!(text),
            FilterValue::Bool(flag) => json!(flag),
            FilterValue::List(items) => json!(items),
            FilterValue::Number(number) => Value::Number(number.clone()),
        }
    }
}

impl From<&Value> for FilterValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::String(text) => FilterValue::Text(text.clone()),
            Value::Bool(flag) => FilterValue::Bool(*flag),
            Value::Number(number) => FilterValue::Number(number.clone()),
            Value::Array(items) => FilterValue::List(items.iter().map(plain_string).collect()),
            other => FilterValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(text: &str) -> Self {
        FilterValue::Text(text.to_string())
    }
}

impl From<bool> for FilterValue {
    fn from(flag: bool) -> Self {
        FilterValue::Bool(flag)
    }
}

impl From<i64> for FilterValue {
    fn from(number: i64) -> Self {
        FilterValue::Number(number.into())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(items: Vec<&str>) -> Self {
        FilterValue::List(items.into_iter().map(String::from).collect())
    }
}

/// All options a request can carry. Unset required fields are reported by
/// [`RequestParams::prepare`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestParams {
    pub to: Option<String>,
    pub primitive_content: Option<PrimitiveContent>,
    pub resource_type: Option<i64>,
    pub originator: Option<String>,
    pub request_identifier: Option<String>,
    pub release_version_indicator: Option<String>,
    pub filter_usage: Option<i64>,
    /// Long or short form keys, in query order
    pub filter_criteria: Vec<(String, FilterValue)>,
    pub result_content: Option<i64>,
    pub level: Option<i64>,
    pub child_type: Option<i64>,
    /// `Some(true)` suppresses all output of this request
    pub silent: Option<bool>,
    pub repeat: Option<u32>,
    /// Passed through verbatim as query pairs
    pub extra: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new(to: impl Into<String>, originator: impl Into<String>) -> Self {
        Self {
            to: Some(to.into()),
            originator: Some(originator.into()),
            ..Default::default()
        }
    }

    pub fn content(mut self, content: impl Into<PrimitiveContent>) -> Self {
        self.primitive_content = Some(content.into());
        self
    }

    pub fn resource_type(mut self, ty: impl Into<i64>) -> Self {
        self.resource_type = Some(ty.into());
        self
    }

    pub fn request_identifier(mut self, rqi: impl Into<String>) -> Self {
        self.request_identifier = Some(rqi.into());
        self
    }

    pub fn release_version(mut self, rvi: impl Into<String>) -> Self {
        self.release_version_indicator = Some(rvi.into());
        self
    }

    pub fn filter_usage(mut self, fu: impl Into<i64>) -> Self {
        self.filter_usage = Some(fu.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter_criteria.push((key.into(), value.into()));
        self
    }

    pub fn result_content(mut self, rcn: impl Into<i64>) -> Self {
        self.result_content = Some(rcn.into());
        self
    }

    pub fn level(mut self, lvl: i64) -> Self {
        self.level = Some(lvl);
        self
    }

    pub fn child_type(mut self, ty: impl Into<i64>) -> Self {
        self.child_type = Some(ty.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = Some(silent);
        self
    }

    pub fn repeat(mut self, times: u32) -> Self {
        self.repeat = Some(times);
        self
    }

    pub fn arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Build parameters from a dynamic parameter bag such as
    /// `{"to": "/cse-in", "originator": "CAdmin", "resultContent": 4}`.
    ///
    /// Parameters are checked in the same order as [`RequestParams::prepare`]
    /// checks them, so the first violation reported is the same one.
    pub fn from_value(operation: Operation, parameters: &Value) -> RequestResult<Self> {
        let bag = parameters.as_object().ok_or(RequestError::InvalidType {
            field: "parameters",
            expected: "a mapping",
        })?;
        let mut params = RequestParams::default();

        params.to = string_field(bag, "to", "to")?;
        require(params.to.is_some(), "to")?;

        params.primitive_content = present(bag, "primitiveContent")
            .cloned()
            .map(PrimitiveContent::from);
        require(
            params.primitive_content.is_some() || !operation.requires_content(),
            "primitiveContent",
        )?;

        params.resource_type = integer_field(bag, "resourceType", "resourceType")?;
        require(
            params.resource_type.is_some() || !operation.requires_resource_type(),
            "resourceType",
        )?;

        params.originator = string_field(bag, "originator", "originator")?;
        require(params.originator.is_some(), "originator")?;

        params.request_identifier = string_field(bag, "requestIdentifier", "requestIdentifier")?;
        not_empty(&params.request_identifier, "requestIdentifier")?;

        params.release_version_indicator =
            string_field(bag, "releaseVersionIndicator", "releaseVersionIndicator")?;
        not_empty(&params.release_version_indicator, "releaseVersionIndicator")?;

        params.filter_usage = integer_field(bag, "filterUsage", "filterUsage")?;

        if let Some(criteria) = present(bag, "filterCriteria") {
            let criteria = criteria.as_object().ok_or(RequestError::InvalidType {
                field: "filterCriteria",
                expected: "a dictionary",
            })?;
            params.filter_criteria = criteria
                .iter()
                .map(|(key, value)| (key.clone(), FilterValue::from(value)))
                .collect();
        }

        params.result_content = integer_field(bag, "resultContent", "resultContent")?;
        params.level = integer_field(bag, "level", "level")?;
        params.child_type = integer_field(bag, "type", "childType")?;

        if let Some(silent) = present(bag, "_silent") {
            params.silent = Some(silent.as_bool().ok_or(RequestError::InvalidType {
                field: "_silent",
                expected: "a boolean",
            })?);
        }

        if let Some(repeat) = present(bag, "_repeat") {
            let times = repeat
                .as_u64()
                .and_then(|times| u32::try_from(times).ok())
                .ok_or(RequestError::InvalidType {
                    field: "_repeat",
                    expected: "a non-negative integer number",
                })?;
            params.repeat = Some(times);
        }

        params.extra = bag
            .iter()
            .filter(|(key, _)| !KNOWN_PARAMETERS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), plain_string(value)))
            .collect();

        Ok(params)
    }

    /// Validate the parameters for `operation` and assemble the request.
    pub fn prepare(&self, operation: Operation) -> RequestResult<PreparedRequest> {
        let mut description = Map::new();

        let to = self
            .to
            .clone()
            .ok_or(RequestError::MissingParameter { field: "to" })?;
        description.insert("to".into(), json!(to));

        require(
            self.primitive_content.is_some() || !operation.requires_content(),
            "primitiveContent",
        )?;

        let resource_type = self.resource_type;
        require(
            resource_type.is_some() || !operation.requires_resource_type(),
            "resourceType",
        )?;
        if let Some(ty) = resource_type {
            description.insert("ty".into(), json!(ty));
        }

        let originator = self
            .originator
            .clone()
            .ok_or(RequestError::MissingParameter {
                field: "originator",
            })?;
        description.insert("fr".into(), json!(originator));

        not_empty(&self.request_identifier, "requestIdentifier")?;
        let rqi = self
            .request_identifier
            .clone()
            .unwrap_or_else(random_request_identifier);
        description.insert("rqi".into(), json!(rqi));

        not_empty(&self.release_version_indicator, "releaseVersionIndicator")?;
        let rvi = self
            .release_version_indicator
            .clone()
            .unwrap_or_else(|| DEFAULT_RELEASE_VERSION.to_string());
        description.insert("rvi".into(), json!(rvi));

        let content_type = match resource_type {
            Some(ty) => format!("application/json;ty={}", ty),
            None => "application/json".to_string(),
        };
        let headers = vec![
            (ORIGINATOR_HEADER.to_string(), originator.clone()),
            (REQUEST_IDENTIFIER_HEADER.to_string(), rqi),
            (RELEASE_VERSION_HEADER.to_string(), rvi),
            ("Content-Type".to_string(), content_type),
            ("Accept".to_string(), "application/json".to_string()),
        ];

        let mut query: Vec<(String, String)> = Vec::new();
        let mut filter_criteria = Map::new();

        if let Some(fu) = self.filter_usage {
            query.push(("fu".into(), fu.to_string()));
            filter_criteria.insert("fu".into(), json!(fu));
        }
        for (key, value) in &self.filter_criteria {
            let short = long_to_short(key).to_string();
            query.push((short.clone(), value.to_query_value()));
            filter_criteria.insert(short, value.to_json());
        }
        for (short, value) in [
            ("rcn", self.result_content),
            ("lvl", self.level),
            ("ty", self.child_type),
        ] {
            if let Some(value) = value {
                query.push((short.into(), value.to_string()));
                filter_criteria.insert(short.into(), json!(value));
            }
        }
        query.extend(self.extra.iter().cloned());

        if !filter_criteria.is_empty() {
            description.insert("fc".into(), Value::Object(filter_criteria));
        }

        let body = match &self.primitive_content {
            Some(content) => {
                let document = match content {
                    PrimitiveContent::Text(text) => serde_json::from_str::<Value>(text).map_err(
                        |e| RequestError::InvalidContent {
                            field: "primitiveContent",
                            reason: e.to_string(),
                        },
                    )?,
                    PrimitiveContent::Json(document) => document.clone(),
                };
                let short = json_long_to_short(&document);
                let text = serde_json::to_string(&short).map_err(|e| {
                    RequestError::InvalidContent {
                        field: "primitiveContent",
                        reason: e.to_string(),
                    }
                })?;
                description.insert("pc".into(), short);
                Some(text)
            }
            None => None,
        };

        Ok(PreparedRequest {
            operation,
            to,
            originator,
            headers,
            query: query
                .iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
                .join("&"),
            body,
            description: Value::Object(description),
            repeat: self.repeat.unwrap_or(1),
            silent: self.silent,
        })
    }
}

/// A validated request, ready to be sent `repeat` times
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub operation: Operation,
    pub to: String,
    pub originator: String,
    /// In sending order
    pub headers: Vec<(String, String)>,
    /// Without the leading `?`, empty if there are no query parameters
    pub query: String,
    pub body: Option<String>,
    /// The request as a oneM2M primitive with short names (`m2m:rqp`)
    pub description: Value,
    pub repeat: u32,
    pub silent: Option<bool>,
}

impl PreparedRequest {
    pub fn url(&self, host: &str) -> String {
        if self.query.is_empty() {
            format!("{}{}", host, self.to)
        } else {
            format!("{}{}?{}", host, self.to, self.query)
        }
    }

    /// Whether this request renders the full request and response
    pub fn is_verbose(&self, session_verbose: bool) -> bool {
        match self.silent {
            Some(silent) => !silent,
            None => session_verbose,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A fresh `ri-<n>` request identifier
pub fn random_request_identifier() -> String {
    format!("ri-{}", rand::thread_rng().gen_range(1..=i64::MAX))
}

fn present<'a>(bag: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    bag.get(key).filter(|value| !value.is_null())
}

fn string_field(
    bag: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> RequestResult<Option<String>> {
    match present(bag, key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(RequestError::InvalidType {
            field,
            expected: STRING,
        }),
    }
}

fn integer_field(
    bag: &Map<String, Value>,
    key: &str,
    field: &'static str,
) -> RequestResult<Option<i64>> {
    match present(bag, key) {
        None => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or(RequestError::InvalidType {
            field,
            expected: INTEGER,
        }),
    }
}

fn require(condition: bool, field: &'static str) -> RequestResult<()> {
    if condition {
        Ok(())
    } else {
        Err(RequestError::MissingParameter { field })
    }
}

fn not_empty(value: &Option<String>, field: &'static str) -> RequestResult<()> {
    match value {
        Some(text) if text.is_empty() => Err(RequestError::EmptyParameter { field }),
        _ => Ok(()),
    }
}

fn plain_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FilterUsage, ResourceType, ResultContent};
    use regex::Regex;

    fn ae_content() -> Value {
        json!({"m2m:ae": {"resourceName": "Notebook-AE", "App-ID": "NnotebookAE", "requestReachability": true, "supportedReleaseVersions": ["3"]}})
    }

    #[test]
    fn test_missing_required_fields() {
        let cases = vec![
            (Operation::Retrieve, RequestParams::default(), "to"),
            (
                Operation::Retrieve,
                RequestParams {
                    to: Some("/cse-in".into()),
                    ..Default::default()
                },
                "originator",
            ),
            (
                Operation::Create,
                RequestParams::new("/cse-in", "CAdmin").resource_type(ResourceType::Ae),
                "primitiveContent",
            ),
            (
                Operation::Create,
                RequestParams::new("/cse-in", "CAdmin").content(ae_content()),
                "resourceType",
            ),
            (
                Operation::Update,
                RequestParams::new("/cse-in/Notebook-AE", "CAdmin"),
                "primitiveContent",
            ),
        ];

        for (operation, params, field) in cases {
            let err = params.prepare(operation).unwrap_err();
            assert_eq!(err, RequestError::MissingParameter { field }, "{}", operation);
            assert_eq!(err.to_string(), format!("{} parameter is missing", field));
        }
    }

    #[test]
    fn test_retrieve_and_delete_need_no_content() -> RequestResult<()> {
        let params = RequestParams::new("/cse-in", "CAdmin");
        assert!(params.prepare(Operation::Retrieve)?.body.is_none());
        assert!(params.prepare(Operation::Delete)?.body.is_none());
        Ok(())
    }

    #[test]
    fn test_create_headers_and_body() -> RequestResult<()> {
        let prepared = RequestParams::new("/cse-in", "CAdmin")
            .resource_type(ResourceType::Ae)
            .content(ae_content())
            .request_identifier("123")
            .prepare(Operation::Create)?;

        let names: Vec<&str> = prepared.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["X-M2M-Origin", "X-M2M-RI", "X-M2M-RVI", "Content-Type", "Accept"]
        );
        assert_eq!(prepared.header("x-m2m-origin"), Some("CAdmin"));
        assert_eq!(prepared.header("X-M2M-RI"), Some("123"));
        assert_eq!(prepared.header("X-M2M-RVI"), Some("3"));
        assert_eq!(prepared.header("Content-Type"), Some("application/json;ty=2"));
        assert_eq!(prepared.header("Accept"), Some("application/json"));

        let body: Value = serde_json::from_str(prepared.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"m2m:ae": {"rn": "Notebook-AE", "api": "NnotebookAE", "rr": true, "srv": ["3"]}})
        );
        assert_eq!(prepared.description["pc"], body);
        assert_eq!(prepared.description["ty"], json!(2));
        assert_eq!(prepared.description["fr"], json!("CAdmin"));
        assert_eq!(prepared.description["rqi"], json!("123"));
        assert_eq!(prepared.description["rvi"], json!("3"));
        assert!(prepared.description.get("fc").is_none());
        assert_eq!(prepared.url("http://localhost:8080"), "http://localhost:8080/cse-in");
        Ok(())
    }

    #[test]
    fn test_textual_content_is_parsed_and_shortened() -> RequestResult<()> {
        let prepared = RequestParams::new("/cse-in/ae", "Cae")
            .content(r#"{"m2m:cnt": {"resourceName": "c"}}"#)
            .prepare(Operation::Update)?;
        assert_eq!(prepared.body.as_deref(), Some(r#"{"m2m:cnt":{"rn":"c"}}"#));
        assert_eq!(prepared.header("Content-Type"), Some("application/json"));

        let err = RequestParams::new("/cse-in/ae", "Cae")
            .content("not json")
            .prepare(Operation::Update)
            .unwrap_err();
        assert_eq!(err.field(), "primitiveContent");
        Ok(())
    }

    #[test]
    fn test_default_request_identifier() -> RequestResult<()> {
        let pattern = Regex::new(r"^ri-\d+$").unwrap();
        for _ in 0..20 {
            let prepared = RequestParams::new("/cse-in", "CAdmin").prepare(Operation::Retrieve)?;
            let rqi = prepared.header("X-M2M-RI").unwrap();
            assert!(pattern.is_match(rqi), "{}", rqi);
        }
        Ok(())
    }

    #[test]
    fn test_empty_identifiers_rejected() {
        let err = RequestParams::new("/cse-in", "CAdmin")
            .request_identifier("")
            .prepare(Operation::Retrieve)
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::EmptyParameter {
                field: "requestIdentifier"
            }
        );

        let err = RequestParams::new("/cse-in", "CAdmin")
            .release_version("")
            .prepare(Operation::Retrieve)
            .unwrap_err();
        assert_eq!(err.field(), "releaseVersionIndicator");
    }

    #[test]
    fn test_query_string_order_and_filter_criteria() -> RequestResult<()> {
        let prepared = RequestParams::new("/cse-in", "CAdmin")
            .filter_usage(FilterUsage::DiscoveryCriteria)
            .filter("labels", vec!["tag:a", "tag:b"])
            .filter("createdBefore", "20240101T000000")
            .filter("disableRetrieval", true)
            .filter("limit", 10i64)
            .result_content(ResultContent::ChildResourceReferences)
            .level(2)
            .child_type(ResourceType::Container)
            .arg("atrl", "x")
            .prepare(Operation::Retrieve)?;

        assert_eq!(
            prepared.query,
            "fu=1&lbl=tag:a+tag:b&crb=20240101T000000&disr=true&lim=10&rcn=6&lvl=2&ty=3&atrl=x"
        );
        assert_eq!(
            prepared.description["fc"],
            json!({
                "fu": 1,
                "lbl": ["tag:a", "tag:b"],
                "crb": "20240101T000000",
                "disr": true,
                "lim": 10,
                "rcn": 6,
                "lvl": 2,
                "ty": 3
            })
        );
        assert_eq!(
            prepared.url("http://h"),
            format!("http://h/cse-in?{}", prepared.query)
        );
        Ok(())
    }

    #[test]
    fn test_boolean_filters_are_lower_case() -> RequestResult<()> {
        let prepared = RequestParams::new("/cse-in", "CAdmin")
            .filter("disableRetrieval", false)
            .prepare(Operation::Retrieve)?;
        assert_eq!(prepared.query, "disr=false");
        Ok(())
    }

    #[test]
    fn test_verbosity_override() -> RequestResult<()> {
        let plain = RequestParams::new("/cse-in", "CAdmin").prepare(Operation::Retrieve)?;
        assert!(plain.is_verbose(true));
        assert!(!plain.is_verbose(false));

        let silent = RequestParams::new("/cse-in", "CAdmin")
            .silent(true)
            .prepare(Operation::Retrieve)?;
        assert!(!silent.is_verbose(true));

        let loud = RequestParams::new("/cse-in", "CAdmin")
            .silent(false)
            .prepare(Operation::Retrieve)?;
        assert!(loud.is_verbose(false));
        assert_eq!(loud.repeat, 1);
        Ok(())
    }

    #[test]
    fn test_from_value() -> RequestResult<()> {
        let bag = json!({
            "to": "/cse-in",
            "originator": "CAdmin",
            "resultContent": 4,
            "filterCriteria": {"labels": ["a", "b"], "disableRetrieval": true},
            "_repeat": 3,
            "_silent": true,
            "drt": 2
        });
        let params = RequestParams::from_value(Operation::Retrieve, &bag)?;
        assert_eq!(params.result_content, Some(4));
        assert_eq!(params.repeat, Some(3));
        assert_eq!(params.silent, Some(true));
        assert_eq!(params.extra, vec![("drt".to_string(), "2".to_string())]);

        let prepared = params.prepare(Operation::Retrieve)?;
        assert_eq!(prepared.query, "lbl=a+b&disr=true&rcn=4&drt=2");
        Ok(())
    }

    #[test]
    fn test_from_value_type_errors() {
        let cases = vec![
            (json!({"to": "/x", "originator": 1}), "originator must be a string"),
            (
                json!({"to": "/x", "originator": "C", "resourceType": "2"}),
                "resourceType must be an integer number",
            ),
            (
                json!({"to": "/x", "originator": "C", "filterUsage": 1.5}),
                "filterUsage must be an integer number",
            ),
            (
                json!({"to": "/x", "originator": "C", "filterCriteria": [1]}),
                "filterCriteria must be a dictionary",
            ),
            (
                json!({"to": "/x", "originator": "C", "type": "cnt"}),
                "childType must be an integer number",
            ),
            (
                json!({"to": "/x", "originator": "C", "_silent": "yes"}),
                "_silent must be a boolean",
            ),
            (
                json!({"to": "/x", "originator": "C", "_repeat": -1}),
                "_repeat must be a non-negative integer number",
            ),
        ];
        for (bag, message) in cases {
            let err = RequestParams::from_value(Operation::Retrieve, &bag).unwrap_err();
            assert_eq!(err.to_string(), message.replacen(" must", " parameter must", 1));
        }
    }

    #[test]
    fn test_from_value_reports_first_violation() {
        let bag = json!({"originator": 5, "resourceType": "x"});
        let err = RequestParams::from_value(Operation::Create, &bag).unwrap_err();
        assert_eq!(err, RequestError::MissingParameter { field: "to" });

        let bag = json!({"to": "/cse-in", "originator": 5});
        let err = RequestParams::from_value(Operation::Create, &bag).unwrap_err();
        assert_eq!(
            err,
            RequestError::MissingParameter {
                field: "primitiveContent"
            }
        );
    }
}

//! Terminal presentation of requests, responses and errors.
//!
//! Headings and tables are Markdown, JSON documents are pretty printed, and
//! both are syntax highlighted with `bat`. The string builders are kept
//! separate from the printing functions so they can be checked in tests.

use anyhow::{anyhow, Result};
use bat::{PrettyPrinter, WrappingMode};
use console::style;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::client::CseResponse;
use crate::names::{annotate_rsc, annotate_short_names, header_parameter, highlight_debug_line};
use crate::request::{PreparedRequest, STATUS_CODE_HEADER};

/// HTTP headers that are not shown in header tables
pub const EXCLUDED_HEADERS: &[&str] = &[
    "Access-Control-Allow-Origin",
    "Authorization",
    "Connection",
    "Content-Length",
    "Date",
    "ETag",
    "request-context",
    "Server",
    "Strict-Transport-Security",
    "Transfer-Encoding",
];

lazy_static! {
    static ref SHELL_SAFE: Regex = Regex::new(r"^[A-Za-z0-9@%+=:,./_-]+$").unwrap();
}

pub struct Renderer {
    theme: String,
}

impl Renderer {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
        }
    }

    pub fn markdown(&self, content: &str) -> Result<()> {
        PrettyPrinter::new()
            .input_from_bytes(content.as_bytes())
            .theme(&self.theme)
            .language("Markdown")
            .wrapping_mode(WrappingMode::Character)
            .print()
            .map_err(|e| anyhow!("Failed to render output: {}", e))?;
        Ok(())
    }

    /// Pretty print a JSON document, highlighting the `m2m:dbg` line and
    /// annotating short names with their long names if requested.
    pub fn json(&self, document: &Value, long_names: bool) -> Result<()> {
        let pretty = serde_json::to_string_pretty(document)?;
        let annotated = annotate_short_names(&pretty, long_names);

        let mut printer = PrettyPrinter::new();
        printer
            .input_from_bytes(annotated.as_bytes())
            .theme(&self.theme)
            .language("JSON")
            .grid(true)
            .wrapping_mode(WrappingMode::Character);
        if let Some(line) = highlight_debug_line(&annotated) {
            printer.highlight(line);
        }
        printer
            .print()
            .map_err(|e| anyhow!("Failed to render output: {}", e))?;
        Ok(())
    }

    pub fn print_request(
        &self,
        request: &PreparedRequest,
        url: &str,
        long_names: bool,
    ) -> Result<()> {
        self.markdown("### HTTP Request\n\n#### Target URL\n")?;
        println!("{}", style(url).cyan());
        self.markdown("\n#### Headers\n")?;
        self.markdown(&parameters_table(
            request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))?;

        if let Some(body) = &request.body {
            self.markdown("\n#### Request Content | Body\n")?;
            let document: Value = serde_json::from_str(body)?;
            self.json(&document, long_names)?;
        }
        self.print_primitive("m2m:rqp", &request.description)
    }

    pub fn print_curl(&self, request: &PreparedRequest, url: &str) -> Result<()> {
        self.markdown("\n#### cURL Request\n")?;
        println!(
            "{}",
            curl_command(
                request.operation.http_method().as_str(),
                url,
                &request.headers,
                request.body.as_deref(),
            )
        );
        Ok(())
    }

    pub fn print_response(&self, response: &CseResponse, long_names: bool) -> Result<()> {
        self.markdown("---\n### HTTP Response\n")?;
        print_status_code(response.http_status, &response.reason);
        self.markdown(&parameters_table(
            response.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        ))?;
        if let Some(content) = &response.content {
            self.markdown("\n**Response Content | Body**\n")?;
            self.json(content, long_names)?;
        }
        self.print_primitive("m2m:rsp", &response.description)
    }

    /// Terse output: failures always, successes only when asked for
    pub fn print_short_response(&self, response: &CseResponse, with_results: bool) -> Result<()> {
        if !is_success(response.http_status) {
            print_status_code(response.http_status, &response.reason);
            if let Some(content) = &response.content {
                self.json(content, false)?;
            }
        } else if with_results {
            print_status_code(response.http_status, &response.reason);
        }
        Ok(())
    }

    pub fn print_resource_tree(&self, tree: &str, title: &str, section: bool) -> Result<()> {
        if section {
            self.markdown("---")?;
        }
        self.markdown(&format!("### {}\n", title))?;
        println!("{}", tree);
        Ok(())
    }

    fn print_primitive(&self, wrapper: &str, description: &Value) -> Result<()> {
        println!(
            "{}",
            style("Whole oneM2M request / response with short names").bold()
        );
        let mut document = serde_json::Map::new();
        document.insert(wrapper.to_string(), description.clone());
        println!("{}", serde_json::to_string_pretty(&document)?);
        Ok(())
    }
}

/// Render a header table; transport headers are skipped and the response
/// status code is annotated with its name.
pub fn parameters_table<'a>(headers: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut table = String::from("| HTTP Header | oneM2M Parameter | Value |\n|:---|:---|:---|\n");
    for (name, value) in headers {
        if EXCLUDED_HEADERS
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(name))
        {
            continue;
        }
        let value = if name.eq_ignore_ascii_case(STATUS_CODE_HEADER) {
            annotate_rsc(value)
        } else {
            value.to_string()
        };
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            name,
            header_parameter(name).unwrap_or(""),
            value
        ));
    }
    table
}

/// The equivalent cURL command line for a request
pub fn curl_command(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> String {
    let headers = headers
        .iter()
        .map(|(name, value)| format!("-H {}", single_quote(&format!("{}:{}", name, value))))
        .collect::<Vec<_>>()
        .join(" ");
    match body {
        Some(body) if !body.is_empty() => format!(
            "curl -X {} {} -d {} {}",
            method,
            headers,
            shell_quote(body),
            shell_quote(url)
        ),
        _ => format!("curl -X {} {} {}", method, headers, shell_quote(url)),
    }
}

/// Quote a string for a POSIX shell
pub fn shell_quote(text: &str) -> String {
    if !text.is_empty() && SHELL_SAFE.is_match(text) {
        return text.to_string();
    }
    single_quote(text)
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r#"'"'"'"#))
}

pub fn is_success(http_status: u16) -> bool {
    (200..300).contains(&http_status)
}

pub fn status_line(http_status: u16, reason: &str) -> String {
    format!("{} ({})", http_status, reason)
}

pub fn print_status_code(http_status: u16, reason: &str) {
    let line = status_line(http_status, reason);
    if is_success(http_status) {
        println!("{}", style(line).green().bold());
    } else {
        println!("{}", style(line).red().bold());
    }
}

pub fn print_success(message: &str) {
    println!("{}", style(message).green().bold());
}

pub fn print_failure(message: &str) {
    println!("{}", style(message).red().bold());
}

pub fn print_error(message: &str, details: Option<&str>) {
    println!("{}", style("Error").red().bold());
    println!("{}", style(message).red());
    if let Some(details) = details {
        println!("{} {}", style("Details:").bold(), details);
    }
}

pub fn print_connection_error(details: &str) {
    print_error(
        &[
            "Cannot access the CSE, or the CSE is not running.",
            "Please start the CSE or check the configuration file (onem2m.toml) and the ONEM2M_* environment variables.",
            "Did you specify the correct address, credentials, and proxy server?",
        ]
        .join("\n"),
        Some(details),
    );
}

use std::time::Duration;

use anyhow::Result;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

use onem2m_notebook::client::CseClient;
use onem2m_notebook::config::Settings;
use onem2m_notebook::repeat::Repeat;
use onem2m_notebook::request::RequestParams;
use onem2m_notebook::types::{Operation, ResourceType, ResultContent};
use onem2m_notebook::xpath::find_xpath;

/// A CSE stand-in and a quiet client talking to it
struct CseTester {
    server: ServerGuard,
    client: CseClient,
}

impl CseTester {
    fn new() -> Result<Self> {
        let server = Server::new();
        let mut settings = Settings::default();
        settings.cse.host = server.url();
        settings.cse.upper_tester = Some(format!("{}/__ut__", server.url()));
        settings.output.verbose = false;
        let client = CseClient::new(settings)?;
        Ok(Self { server, client })
    }

    fn respond(&mut self, method: &str, path: &str, rsc: i64, body: Value, hits: usize) -> Mock {
        let status = if rsc == 2001 { 201 } else { 200 };
        self.server
            .mock(method, Matcher::Regex(format!("^{}", path)))
            .with_status(status)
            .with_header("X-M2M-RSC", &rsc.to_string())
            .with_header("Content-Type", "application/json")
            .with_body(body.to_string())
            .expect(hits)
            .create()
    }
}

#[test]
fn test_create_then_discover() -> Result<()> {
    let mut tester = CseTester::new()?;
    let created = tester.respond(
        "POST",
        "/cse-in/Notebook-AE",
        2001,
        json!({"m2m:cnt": {"rn": "Container", "ri": "cnt1234", "cni": 0}}),
        1,
    );
    let discovered = tester.respond(
        "GET",
        "/cse-in",
        2000,
        json!({"m2m:uril": ["cse-in/Notebook-AE/Container", "cse-in/Notebook-AE/Other"]}),
        1,
    );

    let create = RequestParams::new("/cse-in/Notebook-AE", "Cnotebook")
        .resource_type(ResourceType::Container)
        .content(json!({"m2m:cnt": {"resourceName": "Container"}}));
    tester.client.create(&create)?;
    created.assert();

    let session = tester.client.session();
    assert_eq!(session.last_response_status(), 2001);
    let last = session.last_response().unwrap_or_default();
    assert_eq!(find_xpath(&last, "m2m:cnt/ri", Value::Null), "cnt1234");

    let discover = RequestParams::new("/cse-in", "Cnotebook")
        .filter_usage(1)
        .child_type(ResourceType::Container)
        .result_content(ResultContent::ChildResourceReferences);
    tester.client.retrieve(&discover)?;
    discovered.assert();

    assert!(session.retrieve_ok());
    let last = session.last_response().unwrap_or_default();
    assert_eq!(
        find_xpath(&last, "m2m:uril/{1}", Value::Null),
        "cse-in/Notebook-AE/Other"
    );
    assert_eq!(find_xpath(&last, "m2m:uril/{}", Value::Null).as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn test_request_file_parameters() -> Result<()> {
    let mut tester = CseTester::new()?;
    let updated = tester
        .server
        .mock("PUT", "/cse-in/Notebook-AE")
        .match_header("X-M2M-Origin", "Cnotebook")
        .match_body(Matcher::Json(json!({"m2m:ae": {"lbl": ["tag:green"]}})))
        .with_status(200)
        .with_header("X-M2M-RSC", "2004")
        .with_body(r#"{"m2m:ae": {"lbl": ["tag:green"]}}"#)
        .create();

    let bag = json!({
        "to": "/cse-in/Notebook-AE",
        "originator": "Cnotebook",
        "primitiveContent": {"m2m:ae": {"labels": ["tag:green"]}},
    });
    let params = RequestParams::from_value(Operation::Update, &bag)?;
    let outcomes = tester.client.update(&params)?;

    updated.assert();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(tester.client.session().last_response_status(), 2004);
    Ok(())
}

#[test]
fn test_repeat_retrieves_in_background() -> Result<()> {
    let mut tester = CseTester::new()?;
    let retrieved = tester.respond(
        "GET",
        "/cse-in/Notebook-AE",
        2000,
        json!({"m2m:ae": {"rn": "Notebook-AE"}}),
        3,
    );

    let worker = tester.client.clone();
    let params = RequestParams::new("/cse-in/Notebook-AE", "Cnotebook");
    let handle = Repeat::new(3)
        .interval(Duration::from_millis(10))
        .spawn(tester.client.session().clone(), move || {
            let _ = worker.retrieve(&params);
        });
    let summary = handle.join()?;

    retrieved.assert();
    assert_eq!(summary.issued, 3);
    assert_eq!(summary.last_status, 2000);
    assert!(summary.success);
    Ok(())
}

#[test]
fn test_repeat_reports_errors() -> Result<()> {
    let mut tester = CseTester::new()?;
    let _deleted = tester.respond(
        "DELETE",
        "/cse-in/missing",
        4004,
        json!({"m2m:dbg": "resource not found"}),
        2,
    );

    let params = RequestParams::new("/cse-in/missing", "Cnotebook").repeat(2);
    let client = tester.client.clone();
    let summary = Repeat::new(1).run(tester.client.session(), || {
        let outcomes = client.delete(&params).unwrap_or_default();
        assert_eq!(outcomes.len(), 2);
    })?;

    assert_eq!(summary.last_status, 4004);
    assert!(!summary.success);
    Ok(())
}

#[test]
fn test_prepare_notebook() -> Result<()> {
    let mut tester = CseTester::new()?;
    let reset = tester
        .server
        .mock("POST", "/__ut__")
        .match_header("X-M2M-UTCMD", "reset")
        .with_status(200)
        .create();
    let prepare = tester
        .server
        .mock("POST", "/__ut__")
        .match_header("X-M2M-UTCMD", "notebooksPrepareResources basic")
        .with_status(200)
        .create();

    assert!(tester.client.reset_cse(false)?);
    assert!(tester.client.setup_initial_resource_structure("basic", false)?);
    reset.assert();
    prepare.assert();
    Ok(())
}

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use console::style;

use onem2m_notebook::client::CseClient;
use onem2m_notebook::repeat::Repeat;

use super::request::{load_request_file, perform};

/// Send the request from `file` `times` times on a background thread. Ctrl-C
/// stops the run after the request in flight.
pub fn execute(client: &CseClient, file: &Path, times: u32, interval: f64) -> Result<bool> {
    if !interval.is_finite() || interval < 0.0 {
        bail!("interval must be a non-negative number of seconds");
    }
    let Some((operation, params)) = load_request_file(client, file)? else {
        return Ok(false);
    };

    let worker = client.clone();
    let handle = Repeat::new(times)
        .interval(Duration::from_secs_f64(interval))
        .spawn(client.session().clone(), move || {
            // failures are reported by the client
            let _ = perform(&worker, operation, &params);
        });

    let token = handle.cancel_token();
    ctrlc::set_handler(move || token.cancel())?;

    let summary = handle.join()?;
    if summary.cancelled {
        println!(
            "{}",
            style(format!("Cancelled after {} of {} requests", summary.issued, times)).dim()
        );
    }
    Ok(summary.success)
}

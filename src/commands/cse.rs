use anyhow::Result;
use cliclack::spinner;
use tracing::debug;

use onem2m_notebook::client::CseClient;
use onem2m_notebook::render;

pub fn check(client: &CseClient) -> bool {
    let rn = &client.settings().cse.rn;
    let spin = spinner();
    spin.start(format!("Connecting to {}", client.host()));
    let check = client.check_connection(rn);
    spin.stop("");
    debug!("Connection check for {}: {:?}", rn, check);

    match check.problem() {
        None => {
            render::print_success(&format!("Configuration Ready ({})", rn));
            true
        }
        Some(problem) => {
            render::print_connection_error(problem);
            false
        }
    }
}

/// Check the connection; with a `kind`, also reset the CSE and create the
/// resources that kind of notebook starts from.
pub fn init(client: &CseClient, kind: Option<&str>) -> Result<bool> {
    if !check(client) {
        return Ok(false);
    }
    let Some(kind) = kind else {
        return Ok(true);
    };
    if !client.reset_cse(true)? || !client.setup_initial_resource_structure(kind, true)? {
        return Ok(false);
    }
    client.show_resource_tree(false, "Initial Resource Tree")?;
    Ok(true)
}

pub fn tree(client: &CseClient) -> Result<bool> {
    if client.show_resource_tree(false, "CSE Resource Tree")? {
        return Ok(true);
    }
    render::print_failure("Resource tree not available");
    Ok(false)
}

pub fn clean(client: &CseClient) -> bool {
    if client.clean_cse() {
        render::print_success("CSE cleaned");
        true
    } else {
        render::print_failure("Error during clean");
        false
    }
}

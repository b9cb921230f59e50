use anyhow::Result;
use console::style;

use onem2m_notebook::client::CseClient;
use onem2m_notebook::notifications::NotificationPoller;

/// Poll the notification server until Ctrl-C is pressed.
pub fn execute(client: &CseClient) -> Result<bool> {
    let watch = NotificationPoller::new(client.clone()).spawn();
    let token = watch.cancel_token();
    ctrlc::set_handler(move || token.cancel())?;

    let received = watch.join()?;
    println!(
        "{}",
        style(format!("Received {} notification(s)", received)).dim()
    );
    Ok(true)
}

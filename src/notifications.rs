//! Polling of the notification server, which buffers the notifications the
//! CSE sends to subscribers and hands out those received after `ts`.

use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::CseClient;
use crate::render;
use crate::repeat::Pause;

pub struct NotificationPoller {
    client: CseClient,
    interval: Duration,
    max_polls: Option<u32>,
}

impl NotificationPoller {
    pub fn new(client: CseClient) -> Self {
        Self {
            client,
            interval: Duration::from_secs(1),
            max_polls: None,
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop after `max_polls` queries instead of running until cancelled
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Query the server once for notifications received after `since`.
    pub fn poll(&self, since: f64) -> Result<Option<String>> {
        let url = format!("{}?ts={}", self.client.settings().notifications.url(), since);
        let body = self.client.http().get(&url).send()?.text()?;
        Ok(Some(body).filter(|body| !body.is_empty()))
    }

    /// Poll until cancelled or the poll limit is reached. Returns the number
    /// of notifications received.
    pub fn run(&self, token: &CancellationToken) -> Result<u32> {
        let pause = Pause::new()?;
        let mut last_run = unix_time();
        let mut received = 0;
        let mut polls = 0;
        render::print_success("Waiting for notifications");

        while !token.is_cancelled() {
            let notification = self.poll(last_run)?;
            last_run = unix_time();
            polls += 1;

            if let Some(notification) = notification {
                received += 1;
                self.client.renderer().markdown(&format!(
                    "### Received Notification - {}\n",
                    chrono::Local::now()
                ))?;
                println!("{}", notification);
            }
            if self.max_polls.is_some_and(|max| polls >= max) || pause.wait(token, self.interval) {
                break;
            }
        }
        debug!("Notification polling stopped after {} polls", polls);
        Ok(received)
    }

    /// Poll on a background thread.
    pub fn spawn(self) -> NotificationWatch {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let thread = thread::spawn(move || self.run(&worker_token));
        NotificationWatch { token, thread }
    }
}

/// A notification poller running in the background
pub struct NotificationWatch {
    token: CancellationToken,
    thread: JoinHandle<Result<u32>>,
}

impl NotificationWatch {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the poller to stop and return the number of notifications
    /// received.
    pub fn join(self) -> Result<u32> {
        self.thread
            .join()
            .map_err(|_| anyhow!("Notification poller panicked"))?
    }
}

fn unix_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use mockito::{Matcher, Server, ServerGuard};

    fn client_for(server: &ServerGuard) -> CseClient {
        let mut settings = Settings::default();
        settings.notifications.url_base = "http://127.0.0.1".to_string();
        settings.notifications.port = server.socket_address().port();
        settings.output.verbose = false;
        CseClient::new(settings).unwrap()
    }

    #[test]
    fn test_poll_passes_timestamp() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", Matcher::Regex(r"^/".to_string()))
            .match_query(Matcher::Regex(r"^ts=\d+(\.\d+)?$".to_string()))
            .with_status(200)
            .with_body(r#"{"m2m:sgn": {"vrq": true}}"#)
            .expect(1)
            .create();

        let poller = NotificationPoller::new(client_for(&server));
        let body = poller.poll(1704067200.25).unwrap();

        mock.assert();
        assert_eq!(body.as_deref(), Some(r#"{"m2m:sgn": {"vrq": true}}"#));
    }

    #[test]
    fn test_run_counts_notifications() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", Matcher::Regex(r"^/".to_string()))
            .with_status(200)
            .with_body(r#"{"m2m:sgn": {"nev": {"rep": {}}}}"#)
            .expect(3)
            .create();

        let poller = NotificationPoller::new(client_for(&server))
            .interval(Duration::from_millis(5))
            .max_polls(3);
        let received = poller.run(&CancellationToken::new()).unwrap();

        mock.assert();
        assert_eq!(received, 3);
    }

    #[test]
    fn test_empty_responses_are_not_notifications() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", Matcher::Regex(r"^/".to_string()))
            .with_status(200)
            .create();

        let poller = NotificationPoller::new(client_for(&server))
            .interval(Duration::from_millis(5))
            .max_polls(2);
        assert_eq!(poller.run(&CancellationToken::new()).unwrap(), 0);
    }

    #[test]
    fn test_background_watch_stops() {
        let mut server = Server::new();
        let _mock = server
            .mock("GET", Matcher::Regex(r"^/".to_string()))
            .with_status(200)
            .create();

        let watch = NotificationPoller::new(client_for(&server))
            .interval(Duration::from_secs(30))
            .spawn();
        thread::sleep(Duration::from_millis(100));
        watch.stop();
        assert_eq!(watch.join().unwrap(), 0);
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let mut settings = Settings::default();
        settings.notifications.url_base = "http://127.0.0.1".to_string();
        settings.notifications.port = 1;
        let poller = NotificationPoller::new(CseClient::new(settings).unwrap()).max_polls(1);
        assert!(poller.run(&CancellationToken::new()).is_err());
    }
}

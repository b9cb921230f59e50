use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::config::OutputSettings;

#[derive(Debug, Clone)]
struct SessionState {
    last_response: Option<Value>,
    last_status: i64,
    verbose: bool,
    with_results: bool,
    long_names: bool,
}

/// Last response and output flags shared by all requests issued through a
/// client, including requests repeated in the background. Cloning yields a
/// handle to the same state.
#[derive(Debug, Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
}

impl Session {
    pub fn new(output: &OutputSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState {
                last_response: None,
                last_status: 0,
                verbose: output.verbose,
                with_results: output.with_results,
                long_names: output.long_names,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // the state stays consistent even if a holder panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, response: Option<Value>, status: i64) {
        let mut state = self.lock();
        state.last_response = response;
        state.last_status = status;
    }

    /// Forget the last response before a new request is sent
    pub fn clear_response(&self) {
        self.lock().last_response = None;
    }

    pub fn last_response(&self) -> Option<Value> {
        self.lock().last_response.clone()
    }

    /// The oneM2M status code of the last response, `0` before any request
    /// and `-1` if the last response carried none.
    pub fn last_response_status(&self) -> i64 {
        self.lock().last_status
    }

    pub fn retrieve_ok(&self) -> bool {
        self.last_response_status() == 2000
    }

    /// Switch verbose output on or off and return the previous setting.
    pub fn verbose(&self, verbose: bool, with_results: bool) -> bool {
        let mut state = self.lock();
        let old = state.verbose;
        state.verbose = verbose;
        state.with_results = with_results;
        old
    }

    pub fn noverbose(&self, with_results: bool) {
        self.verbose(false, with_results);
    }

    pub fn is_verbose(&self) -> bool {
        self.lock().verbose
    }

    pub fn with_results(&self) -> bool {
        self.lock().with_results
    }

    pub fn long_names(&self) -> bool {
        self.lock().long_names
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&crate::config::Settings::default().output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn test_record_and_read() {
        let session = Session::default();
        assert_eq!(session.last_response_status(), 0);
        assert!(session.last_response().is_none());

        session.record(Some(json!({"m2m:cb": {"rn": "cse-in"}})), 2000);
        assert!(session.retrieve_ok());
        assert_eq!(session.last_response().unwrap()["m2m:cb"]["rn"], "cse-in");

        session.clear_response();
        assert!(session.last_response().is_none());
        assert_eq!(session.last_response_status(), 2000);

        session.record(None, 2001);
        assert!(!session.retrieve_ok());
    }

    #[test]
    fn test_verbose_returns_previous() {
        let session = Session::default();
        assert!(session.is_verbose());
        assert!(session.verbose(false, true));
        assert!(!session.is_verbose());
        assert!(session.with_results());

        session.noverbose(false);
        assert!(!session.with_results());
        assert!(!session.verbose(true, false));
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::default();
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let session = session.clone();
                thread::spawn(move || session.record(None, 2000 + i))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!((2000..2004).contains(&session.last_response_status()));
    }
}

use radio_sync_server::fetcher::{FetchError, FetchRequest, HttpFetcher};
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers from a URL-to-body table; unknown URLs are unreachable.
#[derive(Default)]
pub struct ScriptedFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn set_body(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.into());
    }

    pub fn remove(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    #[allow(dead_code)]
    pub fn requests_to(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

impl HttpFetcher for ScriptedFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(request.url.clone());
        self.bodies
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::Unreachable {
                url: request.url.clone(),
                reason: "no scripted response".to_string(),
            })
    }
}

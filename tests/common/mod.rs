//! In-memory control plane served through wiremock
//!
//! Behaves like the real service for the paths llmctl uses: stores models
//! and keys, generates a key secret on create and never echoes write-only
//! values back.

#![allow(dead_code)]

use llmctl::api::ApiClient;
use llmctl::config::ProviderConfig;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{bearer_token, header, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const ADMIN_KEY: &str = "test-admin-key";

/// Client pointed at a mock server
pub fn client_for(server: &MockServer) -> ApiClient {
    let config = ProviderConfig::new(ADMIN_KEY, &server.uri()).expect("valid config");
    ApiClient::new(config).expect("client builds")
}

#[derive(Default)]
struct State {
    models: BTreeMap<String, Value>,
    keys: BTreeMap<String, Value>,
    secrets_issued: u32,
    requests: usize,
}

#[derive(Clone, Default)]
pub struct FakeControlPlane {
    state: Arc<Mutex<State>>,
}

impl FakeControlPlane {
    /// Start a server with the fake mounted on `/api/models` and `/api/keys`
    pub async fn start() -> (MockServer, Self) {
        let server = MockServer::start().await;
        let fake = Self::default();

        Mock::given(path_regex(r"^/api/(models|keys)(/[^/]+)?$"))
            .and(bearer_token(ADMIN_KEY))
            .and(header("content-type", "application/json"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;

        (server, fake)
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    /// Raw stored record, as the service holds it
    pub fn stored(&self, collection: &str, id: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        match collection {
            "models" => state.models.get(id).cloned(),
            _ => state.keys.get(id).cloned(),
        }
    }

    /// Simulate a change made outside of llmctl
    pub fn tamper(&self, collection: &str, id: &str, field: &str, value: Value) {
        let mut state = self.state.lock().unwrap();
        let store = match collection {
            "models" => &mut state.models,
            _ => &mut state.keys,
        };
        if let Some(record) = store.get_mut(id) {
            record[field] = value;
        }
    }

    /// Simulate an out-of-band deletion
    pub fn remove(&self, collection: &str, id: &str) {
        let mut state = self.state.lock().unwrap();
        match collection {
            "models" => state.models.remove(id),
            _ => state.keys.remove(id),
        };
    }
}

fn error(status: u16, code: &str, message: String) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({"code": code, "message": message}))
}

/// What the service sends back: never the upstream api_key, never the key secret
fn public_view(record: &Value) -> Value {
    let mut view = record.clone();
    if let Some(map) = view.as_object_mut() {
        map.remove("api_key");
        map.remove("key");
    }
    view
}

impl Respond for FakeControlPlane {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.requests += 1;

        let segments: Vec<&str> = request.url.path().trim_start_matches('/').split('/').collect();
        let collection = segments[1];
        let id = segments
            .get(2)
            .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_default());
        let id_field = if collection == "models" { "name" } else { "key_alias" };

        let store = if collection == "models" {
            &mut state.models
        } else {
            &mut state.keys
        };

        match (request.method.as_str(), id) {
            ("POST", None) => {
                let Ok(mut body) = serde_json::from_slice::<Value>(&request.body) else {
                    return error(400, "bad_request", "body is not JSON".to_string());
                };
                let id = body[id_field].as_str().unwrap_or_default().to_string();
                if store.contains_key(&id) {
                    return error(409, "conflict", format!("{} already exists", id));
                }
                store.insert(id, body.clone());

                if collection == "keys" {
                    state.secrets_issued += 1;
                    let mut echo = public_view(&body);
                    echo["key"] = json!(format!("sk-generated-{}", state.secrets_issued));
                    return ResponseTemplate::new(200).set_body_json(echo);
                }
                body = public_view(&body);
                ResponseTemplate::new(200).set_body_json(body)
            }
            ("GET", Some(id)) => match store.get(&id) {
                Some(record) => ResponseTemplate::new(200).set_body_json(public_view(record)),
                None => error(404, "not_found", format!("{} not found", id)),
            },
            ("PUT", Some(id)) => {
                if !store.contains_key(&id) {
                    return error(404, "not_found", format!("{} not found", id));
                }
                let Ok(mut body) = serde_json::from_slice::<Value>(&request.body) else {
                    return error(400, "bad_request", "body is not JSON".to_string());
                };
                body[id_field] = json!(id);
                store.insert(id, body.clone());
                ResponseTemplate::new(200).set_body_json(public_view(&body))
            }
            ("DELETE", Some(id)) => match store.remove(&id) {
                Some(_) => ResponseTemplate::new(200).set_body_json(json!({"deleted": id})),
                None => error(404, "not_found", format!("{} not found", id)),
            },
            (method, _) => error(405, "method_not_allowed", format!("{} not allowed", method)),
        }
    }
}

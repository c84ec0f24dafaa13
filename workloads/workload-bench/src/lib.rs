//! Spin component serving the synthetic workloads.
//!
//! Each request gets a fresh component instance, so the `delay` workload
//! parks only its own instance and the host keeps serving other requests.
//!
//! `spin.toml` mounts no files, so `io` answers 500 unless the host exposes a
//! writable `/tmp`.

use std::sync::Arc;

use edge_core::ResponderConfig;
use edge_responder::{InstanceDelay, WorkloadResponder, WorkloadResponse};

/// Runtime identifier reported by this component.
pub const RUNTIME: &str = "spin";

/// Temp directory inside the component sandbox.
const COMPONENT_TEMP_DIR: &str = "/tmp";

/// Build the component's responder config, honoring `EDGE_BENCH_*` variables
/// from the component environment.
pub fn component_config(lookup: impl Fn(&str) -> Option<String>) -> ResponderConfig {
    ResponderConfig::new(RUNTIME)
        .with_temp_dir(COMPONENT_TEMP_DIR)
        .with_overrides(lookup)
}

/// Responder used for one request.
pub fn component_responder(config: ResponderConfig) -> WorkloadResponder {
    WorkloadResponder::with_delay(config, Arc::new(InstanceDelay))
}

/// Split a responder result into the parts Spin's response builder takes.
pub fn response_parts(response: WorkloadResponse) -> (u16, Vec<(String, String)>, String) {
    (response.status.as_u16(), response.headers, response.body)
}

#[cfg(target_arch = "wasm32")]
mod component {
    use spin_sdk::http::{IntoResponse, Method, Request, Response};
    use spin_sdk::http_component;

    use super::{component_config, component_responder, response_parts};

    fn method_name(method: &Method) -> String {
        match method {
            Method::Get => "GET".to_string(),
            Method::Head => "HEAD".to_string(),
            Method::Post => "POST".to_string(),
            Method::Put => "PUT".to_string(),
            Method::Delete => "DELETE".to_string(),
            Method::Connect => "CONNECT".to_string(),
            Method::Options => "OPTIONS".to_string(),
            Method::Trace => "TRACE".to_string(),
            Method::Patch => "PATCH".to_string(),
            Method::Other(other) => other.clone(),
        }
    }

    #[http_component]
    async fn handle_workload(req: Request) -> anyhow::Result<impl IntoResponse> {
        let responder = component_responder(component_config(|key| std::env::var(key).ok()));
        let response = responder.handle(&method_name(req.method()), req.query()).await;

        let (status, headers, body) = response_parts(response);
        let mut builder = Response::builder();
        builder.status(status);
        for (name, value) in headers {
            builder.header(name, value);
        }
        Ok(builder.body(body).build())
    }
}

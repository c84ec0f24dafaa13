//! Single in-process invocation.

use anyhow::{bail, Result};
use edge_responder::{WorkloadResponder, WorkloadResponse};

use super::InvokeArgs;
use crate::context::Context;
use crate::output::{format_ms, status_badge};

/// Run the invoke command.
pub async fn run(args: InvokeArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.responder.clone();
    if let Some(runtime) = args.runtime {
        config.runtime = runtime;
    }
    config.validate()?;

    let responder = WorkloadResponder::new(config);
    ctx.output
        .debug(&format!("{} ?{}", args.method, args.query.trim_start_matches('?')));

    let response = responder.handle(&args.method, &args.query).await;

    if ctx.output.is_json() {
        println!("{}", response.body);
    } else {
        ctx.output.header("Response");
        for (name, value) in summary_rows(&response) {
            ctx.output.kv(&name, &value);
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)?;
        ctx.output.json(&body);
    }

    if !response.status.is_success() {
        bail!("Invocation failed with status {}", response.status);
    }

    Ok(())
}

/// Status, result summary and every response header, in print order.
fn summary_rows(response: &WorkloadResponse) -> Vec<(String, String)> {
    let mut rows = vec![("status".to_string(), status_badge(response.status.as_u16()))];
    if let Some(result) = &response.result {
        rows.push(("workload".to_string(), result.workload.clone()));
        rows.push(("duration".to_string(), format_ms(result.duration_ms)));
    }
    rows.extend(response.headers.iter().cloned());
    rows
}

#[cfg(test)]
mod tests {
    use edge_core::ResponderConfig;

    use super::*;

    #[tokio::test]
    async fn test_summary_rows_include_headers() {
        let mut config = ResponderConfig::new("native");
        config.logging.level = "error".to_string();
        let response = WorkloadResponder::new(config)
            .handle("GET", "workload=cpu&iterations=10")
            .await;

        let rows = summary_rows(&response);
        let names: Vec<&str> = rows.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            ["status", "workload", "duration", "content-type", "x-runtime", "x-request-id"]
        );
        assert!(rows.contains(&("x-runtime".to_string(), "native".to_string())));
    }
}

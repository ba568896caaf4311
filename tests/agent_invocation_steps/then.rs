//! Then steps for agent invocation BDD scenarios.

use super::world::{InvocationWorld, run_async};
use concierge::jsonrpc::JsonRpcResponse;
use rstest_bdd_macros::then;
use serde_json::Value;

fn last_response(world: &InvocationWorld) -> Result<&JsonRpcResponse, eyre::Report> {
    world
        .last_response
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no response recorded in scenario world"))
}

#[then("the task is completed")]
fn task_completed(world: &InvocationWorld) -> Result<(), eyre::Report> {
    let response = last_response(world)?;
    let state = response
        .result
        .as_ref()
        .and_then(|task| task.pointer("/status/state"))
        .and_then(Value::as_str);
    if state != Some("completed") {
        return Err(eyre::eyre!("expected a completed task, got {response:?}"));
    }
    Ok(())
}

#[then(r#"the result came from version "{version}" of agent "{agent_id}""#)]
fn result_came_from(
    world: &InvocationWorld,
    version: String,
    agent_id: String,
) -> Result<(), eyre::Report> {
    let outcome = world.artifact()?;
    let actual_agent = outcome.get("agent_id").and_then(Value::as_str);
    let actual_version = outcome.get("version").and_then(Value::as_str);
    if actual_agent != Some(agent_id.as_str()) || actual_version != Some(version.as_str()) {
        return Err(eyre::eyre!(
            "expected {agent_id}@{version}, got {actual_agent:?}@{actual_version:?}"
        ));
    }
    Ok(())
}

#[then(r#"the remote agent received the input "{input}""#)]
fn remote_received(world: &InvocationWorld, input: String) -> Result<(), eyre::Report> {
    let server = world
        .remote
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no remote agent started in scenario world"))?;
    let requests = run_async(server.received_requests()).unwrap_or_default();
    let received = requests
        .first()
        .ok_or_else(|| eyre::eyre!("remote agent received no request"))?;
    let body: Value = received
        .body_json()
        .map_err(|err| eyre::eyre!("remote request body is not JSON: {err}"))?;
    let content = body.pointer("/input/0/content").and_then(Value::as_str);
    if content != Some(input.as_str()) {
        return Err(eyre::eyre!("expected input '{input}', remote got {body}"));
    }
    Ok(())
}

#[then(r#"the call fails with kind "{kind}""#)]
fn call_fails_with(world: &InvocationWorld, kind: String) -> Result<(), eyre::Report> {
    let response = last_response(world)?;
    let actual = response
        .error
        .as_ref()
        .and_then(|error| error.data.as_ref())
        .and_then(|data| data.get("kind"))
        .and_then(Value::as_str);
    if actual != Some(kind.as_str()) {
        return Err(eyre::eyre!("expected failure kind {kind}, got {response:?}"));
    }
    Ok(())
}

#[then("no result is returned")]
fn no_result(world: &InvocationWorld) -> Result<(), eyre::Report> {
    if last_response(world)?.result.is_some() {
        return Err(eyre::eyre!("expected an error-only response"));
    }
    Ok(())
}

#[then(r#"the listed agents are "{ids}""#)]
fn listed_agents(world: &InvocationWorld, ids: String) -> Result<(), eyre::Report> {
    let listing = world.artifact()?;
    let actual: Vec<&str> = listing
        .get("agents")
        .and_then(Value::as_array)
        .map(|agents| {
            agents
                .iter()
                .filter_map(|agent| agent.get("agent_id").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    let expected: Vec<&str> = ids.split(',').map(str::trim).collect();
    if actual != expected {
        return Err(eyre::eyre!("expected agents {expected:?}, got {actual:?}"));
    }
    Ok(())
}

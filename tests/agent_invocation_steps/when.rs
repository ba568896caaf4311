//! When steps for agent invocation BDD scenarios.

use super::world::{InvocationWorld, run_async, send_message};
use rstest_bdd_macros::when;
use serde_json::json;

#[when(r#"a client sends agent "{agent_id}" the input "{input}""#)]
fn client_sends(world: &mut InvocationWorld, agent_id: String, input: String) {
    let request = send_message(&json!({"agent_id": agent_id, "input": input}));
    let gateway = world.gateway();
    world.last_response = Some(run_async(gateway.handle(&request)));
}

#[when("a client asks the gateway to list agents")]
fn client_lists(world: &mut InvocationWorld) {
    let request = send_message(&json!({"action": "list_agents"}));
    let gateway = world.gateway();
    world.last_response = Some(run_async(gateway.handle(&request)));
}

//! Behaviour tests for invoking registered agents through the gateway.

mod agent_invocation_steps;

use agent_invocation_steps::world::{InvocationWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/agent_invocation.feature",
    name = "Call an agent at its default version"
)]
#[tokio::test(flavor = "multi_thread")]
async fn call_default_version(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/agent_invocation.feature",
    name = "Call an unknown agent"
)]
#[tokio::test(flavor = "multi_thread")]
async fn call_unknown_agent(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/agent_invocation.feature",
    name = "Call an agent that answers too slowly"
)]
#[tokio::test(flavor = "multi_thread")]
async fn call_slow_agent(world: InvocationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/agent_invocation.feature",
    name = "List discoverable agents"
)]
#[tokio::test(flavor = "multi_thread")]
async fn list_discoverable_agents(world: InvocationWorld) {
    let _ = world;
}

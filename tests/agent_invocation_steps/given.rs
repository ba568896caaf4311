//! Given steps for agent invocation BDD scenarios.

use std::time::Duration;

use super::world::{InvocationWorld, run_async};
use concierge::registry::services::{PublishVersionRequest, RegisterAgentRequest};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn start_remote(world: &mut InvocationWorld, route: String, delay: Duration) {
    let server = run_async(MockServer::start());
    run_async(
        Mock::given(method("POST"))
            .and(path(route.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "ok"}))
                    .set_delay(delay),
            )
            .mount(&server),
    );
    world.remote = Some(server);
    world.remote_path = Some(route);
}

#[given(r#"a remote agent answering at "{route}""#)]
fn remote_agent(world: &mut InvocationWorld, route: String) {
    start_remote(world, route, Duration::ZERO);
}

#[given(r#"a remote agent answering at "{route}" after {millis:u64} milliseconds"#)]
fn slow_remote_agent(world: &mut InvocationWorld, route: String, millis: u64) {
    start_remote(world, route, Duration::from_millis(millis));
}

#[given(r#"agent "{agent_id}" is registered with default version "{version}" at that remote agent"#)]
fn agent_at_remote(
    world: &mut InvocationWorld,
    agent_id: String,
    version: String,
) -> Result<(), eyre::Report> {
    let serving_url = world.remote_url()?;
    run_async(
        world.registration.register_agent(RegisterAgentRequest::new(
            agent_id.as_str(),
            agent_id.as_str(),
            "platform",
        )),
    )
    .wrap_err("register agent for scenario")?;
    run_async(world.registration.publish_version(
        PublishVersionRequest::new(agent_id.as_str(), version, serving_url).as_default(),
    ))
    .wrap_err("publish default version for scenario")?;
    Ok(())
}

#[given(r#"agent "{agent_id}" is disabled"#)]
fn agent_disabled(world: &mut InvocationWorld, agent_id: String) -> Result<(), eyre::Report> {
    run_async(world.registration.disable(&agent_id)).wrap_err("disable agent for scenario")?;
    Ok(())
}

#[given("the gateway waits at most {millis:u64} milliseconds for remote agents")]
fn gateway_timeout(world: &mut InvocationWorld, millis: u64) {
    world.timeout = Duration::from_millis(millis);
}

use pretty_assertions::assert_eq;
use serde_json::json;
use weather_api::{StreamRequest, WeatherApiConfig};

#[test]
fn payload_matches_agent_wire_shape() {
    let request = StreamRequest::user_message(
        &WeatherApiConfig::default(),
        "thread_1760000000000_abcdefghi",
        "What's the weather in Oslo?",
    );

    assert_eq!(
        serde_json::to_value(&request).expect("payload should serialize"),
        json!({
            "messages": [{"role": "user", "content": "What's the weather in Oslo?"}],
            "runId": "weatherAgent",
            "maxRetries": 2,
            "maxSteps": 5,
            "temperature": 0.5,
            "topP": 1.0,
            "runtimeContext": {},
            "threadId": "thread_1760000000000_abcdefghi",
            "resourceId": "weatherAgent",
        })
    );
}

#[test]
fn agent_id_flows_into_run_and_resource_ids() {
    let config = WeatherApiConfig::new()
        .with_agent_id("forecaster")
        .with_resource_id("team-a");
    let request = StreamRequest::user_message(&config, "thread_1", "hi");

    assert_eq!(request.run_id, "forecaster");
    assert_eq!(request.resource_id, "team-a");
}

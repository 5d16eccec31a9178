//local shortcuts
use crate::support::{error_envelope, ok_envelope, FakeHttpTransport, NullWsConnector};

//third-party shortcuts
use braincloud_s2s::{Context, ContextConfig};
use serde_json::{json, Value};

//standard shortcuts
use std::sync::{Arc, Mutex};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

fn context_with(responses: Vec<Result<String, braincloud_s2s::HttpTransportError>>, auto_auth: bool) -> Arc<Context>
{
    Context::create_with_transports(
        "app1",
        "server1",
        "secret1",
        "https://fake.example.com/s2sdispatcher",
        auto_auth,
        ContextConfig::default(),
        Arc::new(FakeHttpTransport::new(responses)),
        Arc::new(NullWsConnector),
    ).expect("valid constructor arguments")
}

fn drain_until(context: &Arc<Context>, mut done: impl FnMut() -> bool)
{
    for _ in 0..500
    {
        if done() { return; }
        context.run_callbacks(Duration::from_millis(20));
    }
    panic!("timed out waiting for callbacks");
}

//-------------------------------------------------------------------------------------------------------------------

#[test]
fn happy_auth_then_script_request()
{
    let context = context_with(
        vec![
            ok_envelope(0, json!({ "sessionId": "sess-1" })),
            ok_envelope(1, json!({ "result": 3 })),
        ],
        false,
    );

    let auth_result: Value = serde_json::from_str(&context.authenticate_sync()).unwrap();
    assert_eq!(auth_result["status"], 200);

    let script_result: Value = serde_json::from_str(&context.request_sync(
        &json!({ "service": "script", "operation": "RUN", "data": { "scriptName": "AddTwoNumbers" } }).to_string(),
    )).unwrap();
    assert_eq!(script_result["status"], 200);
}

#[test]
fn auto_auth_pipelines_five_requests_with_monotonic_packet_ids()
{
    let responses = vec![
        ok_envelope(0, json!({ "sessionId": "sess-1" })),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
    ];
    let transport = Arc::new(FakeHttpTransport::new(responses));
    let context = Context::create_with_transports(
        "app1", "server1", "secret1", "https://fake.example.com/s2sdispatcher", true,
        ContextConfig::default(), transport.clone(), Arc::new(NullWsConnector),
    ).unwrap();

    let results = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..5
    {
        let results = Arc::clone(&results);
        context.request(
            &json!({ "service": "time", "operation": "READ", "data": {} }).to_string(),
            Some(Box::new(move |payload| results.lock().unwrap().push(payload))),
        );
    }

    drain_until(&context, || results.lock().unwrap().len() == 5);

    let results = results.lock().unwrap();
    for payload in results.iter()
    {
        let value: Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value["status"], 200);
    }

    let sent = transport.requests();
    assert_eq!(sent.len(), 6); // 1 auth + 5 user requests
    for (index, body) in sent.iter().skip(1).enumerate()
    {
        let value: Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["packetId"], (index as i64) + 1);
    }
}

#[test]
fn bad_secret_fans_out_failure_to_every_queued_request()
{
    let responses = vec![error_envelope(0, 401, None)];
    let context = context_with(responses, true);

    let results = Arc::new(Mutex::new(Vec::new()));
    for _ in 0..5
    {
        let results = Arc::clone(&results);
        context.request(
            &json!({ "service": "time", "operation": "READ", "data": {} }).to_string(),
            Some(Box::new(move |payload| results.lock().unwrap().push(payload))),
        );
    }

    drain_until(&context, || results.lock().unwrap().len() == 5);

    for payload in results.lock().unwrap().iter()
    {
        let value: Value = serde_json::from_str(payload).unwrap();
        assert_ne!(value["status"], 200);
    }
}

#[test]
fn malformed_user_json_fails_locally_without_contacting_dispatcher()
{
    let transport = Arc::new(FakeHttpTransport::new(vec![]));
    let context = Context::create_with_transports(
        "app1", "server1", "secret1", "https://fake.example.com/s2sdispatcher", true,
        ContextConfig::default(), transport.clone(), Arc::new(NullWsConnector),
    ).unwrap();

    let result = Arc::new(Mutex::new(None));
    let result_clone = Arc::clone(&result);
    context.request("Bad Request", Some(Box::new(move |payload| *result_clone.lock().unwrap() = Some(payload))));

    drain_until(&context, || result.lock().unwrap().is_some());

    let payload: Value = serde_json::from_str(&result.lock().unwrap().clone().unwrap()).unwrap();
    assert_eq!(payload["status"], 900);
    assert_eq!(payload["message"], "Failed to parse user json");
    assert!(transport.requests().is_empty());
}

#[test]
fn one_bad_request_among_a_batch_does_not_affect_the_others()
{
    let responses = vec![
        ok_envelope(0, json!({ "sessionId": "sess-1" })),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
        error_envelope(1, 450, None),
        ok_envelope(1, json!({})),
        ok_envelope(1, json!({})),
    ];
    let context = context_with(responses, true);

    let results = Arc::new(Mutex::new(Vec::new()));
    let good = json!({ "service": "time", "operation": "READ", "data": {} }).to_string();
    let bad = json!({ "service": "timey", "operation": "READ_MUH_TIME" }).to_string();

    for body in [&good, &good, &bad, &good, &good]
    {
        let results = Arc::clone(&results);
        context.request(body, Some(Box::new(move |payload| results.lock().unwrap().push(payload))));
    }

    drain_until(&context, || results.lock().unwrap().len() == 5);

    let statuses: Vec<i64> = results.lock().unwrap().iter()
        .map(|payload| serde_json::from_str::<Value>(payload).unwrap()["status"].as_i64().unwrap())
        .collect();
    assert_eq!(statuses.iter().filter(|&&s| s == 200).count(), 4);
    assert_eq!(statuses.iter().filter(|&&s| s != 200).count(), 1);
}

#[test]
fn session_expiry_without_auto_auth_surfaces_error_verbatim()
{
    let context = context_with(
        vec![
            ok_envelope(0, json!({ "sessionId": "sess-1" })),
            error_envelope(1, 401, Some(40365)),
        ],
        false,
    );

    let auth_result: Value = serde_json::from_str(&context.authenticate_sync()).unwrap();
    assert_eq!(auth_result["status"], 200);

    let result = Arc::new(Mutex::new(None));
    let result_clone = Arc::clone(&result);
    context.request(
        &json!({ "service": "time", "operation": "READ", "data": {} }).to_string(),
        Some(Box::new(move |payload| *result_clone.lock().unwrap() = Some(payload))),
    );

    // Would hang forever pre-fix: without autoAuth there is nothing to re-authenticate the session, so a plain
    // re-queue would sit at the head of the queue (a UserMessage never dispatches while Disconnected).
    drain_until(&context, || result.lock().unwrap().is_some());

    let payload: Value = serde_json::from_str(&result.lock().unwrap().clone().unwrap()).unwrap();
    assert_eq!(payload["status"], 401);
    assert_eq!(payload["reason_code"], 40365);
}

#[test]
fn session_expiry_is_retried_exactly_once()
{
    let responses = vec![
        ok_envelope(0, json!({ "sessionId": "sess-1" })),
        error_envelope(1, 401, Some(40365)),
        ok_envelope(0, json!({ "sessionId": "sess-2" })),
        ok_envelope(1, json!({ "recovered": true })),
    ];
    let context = context_with(responses, true);

    let result = Arc::new(Mutex::new(None));
    let result_clone = Arc::clone(&result);
    context.request(
        &json!({ "service": "time", "operation": "READ", "data": {} }).to_string(),
        Some(Box::new(move |payload| *result_clone.lock().unwrap() = Some(payload))),
    );

    drain_until(&context, || result.lock().unwrap().is_some());

    let payload: Value = serde_json::from_str(&result.lock().unwrap().clone().unwrap()).unwrap();
    assert_eq!(payload["status"], 200);
    assert_eq!(payload["data"]["recovered"], true);
}

//-------------------------------------------------------------------------------------------------------------------

//local shortcuts
use crate::support::{ok_envelope, FakeHttpTransport, FakeWsConnector};

//third-party shortcuts
use braincloud_s2s::{Context, ContextConfig, RttConnectOutcome};
use serde_json::{json, Value};

//standard shortcuts
use std::sync::{Arc, Mutex};
use std::time::Duration;

//-------------------------------------------------------------------------------------------------------------------

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
fn rtt_connects_and_delivers_a_subscribed_chat_event()
{
    let registration_response = ok_envelope(1, json!({
            "endpoints": [ { "host": "events.example.com", "port": 443, "protocol": "ws", "ssl": true } ],
            "auth": { "token": "abc123" },
        }));

    let transport = FakeHttpTransport::new(vec![
        ok_envelope(0, json!({ "sessionId": "sess-1" })),
        registration_response,
    ]);

    let connect_reply = json!({
            "service": "rtt",
            "operation": "CONNECT",
            "data": { "heartbeatSeconds": 30, "cxId": "cx-123" },
        }).to_string();
    let chat_push = json!({
            "service": "chat",
            "operation": "SYS_CHANNEL_MESSAGE",
            "data": { "channelId": "20001:sy:test", "text": "hi" },
        }).to_string();

    let connector = FakeWsConnector::new(vec![connect_reply, chat_push]);

    let context = Context::create_with_transports(
        "app1", "server1", "secret1", "https://fake.example.com/s2sdispatcher", true,
        ContextConfig::default(), Arc::new(transport), Arc::new(connector),
    ).unwrap();

    let chat_events = Arc::new(Mutex::new(Vec::new()));
    let chat_events_clone = Arc::clone(&chat_events);
    context.rtt_service().register_rtt_callback("chat", Arc::new(move |payload| {
        chat_events_clone.lock().unwrap().push(payload);
    }));

    let connect_outcome = Arc::new(Mutex::new(None));
    let connect_outcome_clone = Arc::clone(&connect_outcome);
    context.rtt_service().enable_rtt(
        Some(Box::new(move |outcome| *connect_outcome_clone.lock().unwrap() = Some(outcome))),
        true,
    );

    drain_until(&context, || connect_outcome.lock().unwrap().is_some());
    match connect_outcome.lock().unwrap().take().unwrap()
    {
        RttConnectOutcome::Success => {}
        RttConnectOutcome::Failure(message) => panic!("expected rtt connect to succeed, got: {message}"),
    }

    assert!(context.rtt_service().get_rtt_enabled());
    assert_eq!(context.rtt_service().get_rtt_connection_id(), "cx-123");

    drain_until(&context, || !chat_events.lock().unwrap().is_empty());
    let received: Value = serde_json::from_str(&chat_events.lock().unwrap()[0]).unwrap();
    assert_eq!(received["service"], "chat");
}

#[test]
fn disable_rtt_is_idempotent()
{
    let transport = FakeHttpTransport::new(vec![ok_envelope(0, json!({ "sessionId": "sess-1" }))]);
    let context = Context::create_with_transports(
        "app1", "server1", "secret1", "https://fake.example.com/s2sdispatcher", true,
        ContextConfig::default(), Arc::new(transport), Arc::new(FakeWsConnector::new(vec![])),
    ).unwrap();

    context.rtt_service().disable_rtt();
    context.rtt_service().disable_rtt();

    assert_eq!(context.rtt_service().get_connection_status(), braincloud_s2s::RttConnectionStatus::Disconnected);
}

//-------------------------------------------------------------------------------------------------------------------

//! End-to-end workflow through the [`Console`] facade with test doubles.

use std::sync::Arc;
use std::time::Duration;

use console::{
    BotSettingsUpdate, ConfirmOutcome, Console, ConsoleConfig, ConsoleServices,
    RestaurantInfoUpdate,
};
use console_core::{CallRecord, CallStatus, ConsoleError, Mode, ProfileStore};
use mock_services::{MemoryStore, MockTransport, MockVoicePlatform, ScriptedCompletion};

struct Harness {
    console: Console,
    store: Arc<MemoryStore>,
    platform: Arc<MockVoicePlatform>,
    completion: Arc<ScriptedCompletion>,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let platform = Arc::new(MockVoicePlatform::new());
    let completion = Arc::new(ScriptedCompletion::new());
    let console = Console::new(
        ConsoleServices {
            store: store.clone(),
            completion: completion.clone(),
            platform: platform.clone(),
            transport: Arc::new(MockTransport::new()),
        },
        ConsoleConfig::builder()
            .analytics_max_attempts(3)
            .analytics_interval(Duration::from_secs(1))
            .build(),
    );

    Harness {
        console,
        store,
        platform,
        completion,
    }
}

async fn onboard(h: &Harness) {
    h.console
        .settings()
        .update_restaurant_info(
            "owner-1",
            RestaurantInfoUpdate {
                name: Some("Luigi's".to_string()),
                address: Some("12 Mulberry St".to_string()),
                seating_capacity: Some(40),
                menu: Some("Margherita, Carbonara".to_string()),
            },
        )
        .await
        .unwrap();
    h.console
        .settings()
        .update_bot_settings(
            "owner-1",
            Mode::Customer,
            BotSettingsUpdate {
                bot_name: Some("Mia".to_string()),
                tone: Some("friendly".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    h.console
        .provisioner()
        .provision_mode("owner-1", Mode::Customer)
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_onboard_edit_and_call() {
    let h = harness();
    onboard(&h).await;

    let created = h.platform.created_llms();
    assert_eq!(created.len(), 1);
    assert!(created[0].general_prompt.contains("Your name is Mia"));
    assert_eq!(created[0].model, "gpt-4o");

    // Edit the prompt through the conversational editor.
    h.completion.push_reply(
        serde_json::json!({
            "prompt": "You are {{botName}} from {{restaurantName}}. Keep it casual.",
            "summary": "Shorter, casual prompt"
        })
        .to_string(),
    );
    h.console
        .editor()
        .send_message("owner-1", Mode::Customer, "make the greeting more casual")
        .await
        .unwrap();
    let outcome = h.console.editor().confirm("owner-1", Mode::Customer).await.unwrap();
    assert!(matches!(outcome, ConfirmOutcome::Applied(_)));
    let updates = h.platform.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].1.general_prompt,
        "You are Mia from Luigi's. Keep it casual."
    );

    // Place a call and let analytics arrive on the second poll.
    let handle = h.console.calls().start_call("owner-1", Mode::Customer).await.unwrap();
    h.platform.ready_after(
        &handle.call_id,
        1,
        CallRecord {
            call_id: handle.call_id.clone(),
            transcript: Some("User: Are you open late?".to_string()),
            ..Default::default()
        },
    );
    h.console.calls().stop_call("owner-1").await.unwrap();
    h.console.calls().wait_for_analytics(&handle.call_id).await;

    assert_eq!(h.console.calls().status("owner-1"), CallStatus::Inactive);
    let profile = h.store.get("owner-1").await.unwrap();
    assert!(profile.calls(Mode::Customer).contains_key(&handle.call_id));
}

#[tokio::test]
async fn test_calls_require_provisioning() {
    let h = harness();
    h.console
        .settings()
        .update_restaurant_info(
            "owner-1",
            RestaurantInfoUpdate {
                name: Some("Luigi's".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        h.console.calls().start_call("owner-1", Mode::Sales).await,
        Err(ConsoleError::NotProvisioned { .. })
    ));
    assert!(matches!(
        h.console.sync().sync_agent("owner-1", Mode::Sales).await,
        Err(ConsoleError::NotProvisioned { .. })
    ));
}

use async_trait::async_trait;
use codegen_gate::config::Config;
use codegen_gate::constants::notices;
use codegen_gate::domain::events::{Notice, SessionEvent};
use codegen_gate::domain::{Language, Role, UserId};
use codegen_gate::models::{GeneratedCode, GenerationRequest};
use codegen_gate::services::{
    CodeGenerator, GenerationError, LocalAuthService, LocalSubscriptionRegistry, MockCodeGenerator,
    SubscriptionOpError,
};
use codegen_gate::session::{SendOutcome, SessionGate};
use codegen_gate::state::Collaborators;
use codegen_gate::store::Store;
use std::sync::{Arc, Mutex};

const ADMIN: &str = "admin@codegen.ai";

/// Records every request and answers with a fixed snippet.
#[derive(Default)]
struct RecordingGenerator {
    calls: Mutex<Vec<GenerationRequest>>,
}

impl RecordingGenerator {
    const CODE: &'static str = "print(sorted([3, 1, 2]))";

    fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedCode, GenerationError> {
        self.calls.lock().unwrap().push(request.clone());
        Ok(GeneratedCode {
            code: Self::CODE.to_string(),
            language: Some(request.language),
        })
    }
}

struct FailingGenerator;

#[async_trait]
impl CodeGenerator for FailingGenerator {
    async fn generate(&self, _: &GenerationRequest) -> Result<GeneratedCode, GenerationError> {
        Err(GenerationError::Unavailable("connection refused".to_string()))
    }
}

struct PanickingGenerator;

#[async_trait]
impl CodeGenerator for PanickingGenerator {
    async fn generate(&self, _: &GenerationRequest) -> Result<GeneratedCode, GenerationError> {
        panic!("generator blew up");
    }
}

fn gate_with(store: &Store, generator: Arc<dyn CodeGenerator>) -> SessionGate {
    SessionGate::new(
        Arc::new(LocalAuthService::new(store.clone())),
        Arc::new(LocalSubscriptionRegistry::new(store.clone()).with_duration_days(30)),
        generator,
    )
}

fn admin_store() -> Store {
    Store::with_admins([ADMIN])
}

async fn entitled_gate(store: &Store, generator: Arc<dyn CodeGenerator>) -> SessionGate {
    let mut admin = gate_with(store, Arc::new(MockCodeGenerator::instant()));
    admin.login(ADMIN, "Root").await.unwrap();

    let mut gate = gate_with(store, generator);
    let user = gate.login("a@x.com", "A").await.unwrap();
    admin.grant_subscription(user.id).await.unwrap();
    gate.login("a@x.com", "A").await.unwrap();
    assert!(gate.can_send());
    gate
}

#[tokio::test]
async fn test_inactive_user_cannot_send() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = gate_with(&store, generator.clone());
    let mut events = gate.subscribe();

    let user = gate.login("a@x.com", "A").await.unwrap();
    assert!(!user.subscription.is_active);
    assert!(!gate.can_send());

    let outcome = gate.send("print hi", Language::Python).await;

    assert_eq!(outcome, SendOutcome::Blocked(Notice::SubscriptionRequired));
    assert!(gate.state().messages.is_empty());
    assert!(!gate.state().pending);
    assert!(generator.calls().is_empty());

    let mut saw_notice = false;
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Notice(notice) = event {
            assert_eq!(notice.to_string(), notices::SUBSCRIPTION_REQUIRED);
            saw_notice = true;
        }
    }
    assert!(saw_notice);
}

#[tokio::test]
async fn test_logged_out_send_asks_for_login() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = gate_with(&store, generator.clone());

    let outcome = gate.send("print hi", Language::Lua).await;
    assert_eq!(outcome, SendOutcome::Blocked(Notice::LoginRequired));
    assert!(gate.state().messages.is_empty());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_blank_input_is_ignored() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = entitled_gate(&store, generator.clone()).await;

    assert_eq!(gate.send("   \n", Language::Python).await, SendOutcome::Ignored);
    assert!(gate.state().messages.is_empty());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_entitled_send_appends_user_then_assistant() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = entitled_gate(&store, generator.clone()).await;

    let outcome = gate.send("sort a list", Language::Python).await;

    assert_eq!(
        generator.calls(),
        vec![GenerationRequest::new("sort a list", Language::Python)]
    );

    let messages = &gate.state().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "sort a list");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, RecordingGenerator::CODE);
    assert_eq!(messages[1].language, Some(Language::Python));
    assert_eq!(outcome, SendOutcome::Answered(messages[1].clone()));
    assert!(!gate.state().pending);

    gate.send("now in lua", Language::Lua).await;
    assert_eq!(gate.state().messages.len(), 4);
    assert_eq!(generator.calls()[1].language, Language::Lua);
}

#[tokio::test]
async fn test_submit_input_uses_selected_language() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = entitled_gate(&store, generator.clone()).await;

    gate.select_language(Language::Lua);
    gate.set_input("  greet  ");
    gate.submit_input().await;

    assert_eq!(
        generator.calls(),
        vec![GenerationRequest::new("greet", Language::Lua)]
    );
    assert!(gate.state().input.is_empty());
}

#[tokio::test]
async fn test_generation_failure_becomes_assistant_message() {
    let store = admin_store();
    let mut gate = entitled_gate(&store, Arc::new(FailingGenerator)).await;

    let outcome = gate.send("sort a list", Language::Python).await;

    let messages = &gate.state().messages;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, notices::GENERATION_FAILED);
    assert_eq!(outcome, SendOutcome::Failed(messages[1].clone()));
    assert!(!gate.state().pending);
}

#[tokio::test]
async fn test_panicking_generator_clears_pending() {
    let store = admin_store();
    let mut gate = entitled_gate(&store, Arc::new(PanickingGenerator)).await;

    let outcome = gate.send("sort a list", Language::Python).await;

    assert!(matches!(outcome, SendOutcome::Failed(_)));
    assert!(!gate.state().pending);
    assert_eq!(gate.state().messages[1].content, notices::GENERATION_FAILED);
}

#[tokio::test]
async fn test_send_event_order() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = entitled_gate(&store, generator).await;
    let mut events = gate.subscribe();

    gate.send("sort a list", Language::Python).await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert!(matches!(
        &seen[..],
        [
            SessionEvent::MessageAppended { index: 0, .. },
            SessionEvent::PendingChanged { pending: true },
            SessionEvent::MessageAppended { index: 1, .. },
            SessionEvent::PendingChanged { pending: false },
        ]
    ));
}

#[tokio::test]
async fn test_grant_then_revoke_returns_can_send_to_false() {
    let store = admin_store();
    let mut admin = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    let me = admin.login(ADMIN, "Root").await.unwrap();
    assert!(!admin.can_send());

    let granted = admin.grant_subscription(me.id).await.unwrap();
    assert!(granted.is_active);
    assert!(admin.can_send());

    let revoked = admin.revoke_subscription(me.id).await.unwrap();
    assert!(!revoked.is_active);
    assert!(!admin.can_send());

    let directory = &admin.state().directory;
    assert_eq!(directory.len(), 1);
    assert!(!directory[0].subscription.is_active);
}

#[tokio::test]
async fn test_admin_operations_require_admin() {
    let store = admin_store();
    let mut gate = gate_with(&store, Arc::new(MockCodeGenerator::instant()));

    assert!(matches!(
        gate.grant_subscription(UserId::new(1)).await,
        Err(SubscriptionOpError::NotLoggedIn)
    ));

    let user = gate.login("a@x.com", "A").await.unwrap();
    assert!(matches!(
        gate.grant_subscription(user.id).await,
        Err(SubscriptionOpError::Forbidden)
    ));
    assert!(matches!(
        gate.refresh_directory().await,
        Err(SubscriptionOpError::Forbidden)
    ));
    assert!(matches!(
        gate.toggle_admin_panel().await,
        Err(SubscriptionOpError::Forbidden)
    ));
    assert!(!gate.state().admin_panel_open);
    assert!(!gate.can_send());
}

#[tokio::test]
async fn test_admin_panel_loads_directory() {
    let store = admin_store();
    let mut user_gate = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    user_gate.login("a@x.com", "A").await.unwrap();

    let mut admin = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    admin.login(ADMIN, "Root").await.unwrap();

    assert!(admin.toggle_admin_panel().await.unwrap());
    assert_eq!(admin.state().directory.len(), 2);
    assert!(!admin.toggle_admin_panel().await.unwrap());
}

#[tokio::test]
async fn test_revoke_without_subscription_reports_notice() {
    let store = admin_store();
    let mut admin = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    let me = admin.login(ADMIN, "Root").await.unwrap();
    let mut events = admin.subscribe();

    let err = admin.revoke_subscription(me.id).await.unwrap_err();
    assert!(matches!(err, SubscriptionOpError::SubscriptionNotFound(id) if id == me.id));

    let notice = std::iter::from_fn(|| events.try_recv().ok()).find_map(|event| match event {
        SessionEvent::Notice(notice) => Some(notice),
        _ => None,
    });
    assert!(matches!(notice, Some(Notice::SubscriptionOpFailed(_))));
}

#[tokio::test]
async fn test_failed_login_keeps_session() {
    let store = admin_store();
    let mut gate = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    gate.login("a@x.com", "A").await.unwrap();

    assert!(gate.login("   ", "B").await.is_err());
    assert_eq!(gate.current_user().unwrap().email, "a@x.com");
}

#[tokio::test]
async fn test_local_collaborators_from_config() {
    let mut config = Config::default();
    config.generation.mock_delay_ms = 0;
    let store = Store::with_admins(&config.server.admin_emails);
    let mut gate = Collaborators::local(&config, store)
        .into_gate(tokio::sync::broadcast::channel(16).0);

    let admin = gate.login(ADMIN, "").await.unwrap();
    assert!(admin.is_admin);
    gate.grant_subscription(admin.id).await.unwrap();

    match gate.send("greet the world", Language::Lua).await {
        SendOutcome::Answered(message) => {
            assert!(message.content.starts_with("```lua\n-- Request: greet the world"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_closes_prompt() {
    let store = admin_store();
    let mut gate = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    assert!(gate.state().login_prompt_open);

    gate.login("a@x.com", "").await.unwrap();
    assert!(!gate.state().login_prompt_open);
    assert_eq!(gate.current_user().unwrap().name, "User");

    gate.open_login_prompt();
    assert!(gate.state().login_prompt_open);
}

#[tokio::test]
async fn test_purchase_unlocks_sending_without_admin() {
    let store = admin_store();
    let generator = Arc::new(RecordingGenerator::default());
    let mut gate = gate_with(&store, generator.clone());

    let user = gate.login("a@x.com", "A").await.unwrap();
    assert!(!user.is_admin);
    assert!(!gate.can_send());

    let record = gate.purchase_subscription().await.unwrap();
    assert!(record.is_active);
    assert!(gate.can_send());

    match gate.send("sort a list", Language::Python).await {
        SendOutcome::Answered(message) => assert_eq!(message.content, RecordingGenerator::CODE),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(generator.calls().len(), 1);

    let relogin = gate.login("a@x.com", "A").await.unwrap();
    assert!(relogin.subscription.is_active);
}

#[tokio::test]
async fn test_purchase_requires_login() {
    let store = admin_store();
    let mut gate = gate_with(&store, Arc::new(MockCodeGenerator::instant()));
    let mut events = gate.subscribe();

    assert!(matches!(
        gate.purchase_subscription().await,
        Err(SubscriptionOpError::NotLoggedIn)
    ));
    assert!(matches!(
        events.try_recv(),
        Ok(SessionEvent::Notice(Notice::LoginRequired))
    ));
}

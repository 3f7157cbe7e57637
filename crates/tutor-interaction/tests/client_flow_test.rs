//! Session, conversation and list working together against a mock service.

use std::sync::Arc;

use serde_json::json;
use tutor_core::auth::{Credentials, SignupForm};
use tutor_core::conversation::{ConversationController, ConversationList, Message};
use tutor_core::session::{MemorySessionProvider, SessionProvider, SessionStore};
use tutor_core::ChatGateway;
use tutor_interaction::HttpChatGateway;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GREETING: &str = "Hello! How can I help you with Python today?";

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_then_sidebar_fetch() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-1").await;
    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chat_ids": ["chat_1700000000000", "chat_1700000500000"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::new(&server.uri()).unwrap());
    let provider = Arc::new(MemorySessionProvider::new());
    let mut store = SessionStore::new(provider.clone());

    let session = store
        .login(gateway.as_ref(), Credentials::new("a@b.com", "password1"))
        .await
        .unwrap()
        .clone();
    assert_eq!(session.token, "tok-1");
    assert_eq!(provider.read().unwrap(), Some(session.clone()));

    let controller = ConversationController::new(gateway.clone(), GREETING);
    let mut list = ConversationList::new(gateway.clone());
    assert!(list.sync(&session, controller.refresh_epoch()).await.unwrap());
    // Same epoch: no second fetch.
    assert!(!list.sync(&session, controller.refresh_epoch()).await.unwrap());

    let ids: Vec<&str> = list.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["chat_1700000500000", "chat_1700000000000"]);
}

#[tokio::test]
async fn test_rejected_login_keeps_anonymous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&server)
        .await;

    let gateway = HttpChatGateway::new(&server.uri()).unwrap();
    let mut store = SessionStore::new(Arc::new(MemorySessionProvider::new()));

    let err = store
        .login(&gateway, Credentials::new("a@b.com", "wrong-pass"))
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.inline_message(), Some("Incorrect email or password"));
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_signup_mismatch_makes_no_request() {
    let server = MockServer::start().await;
    let gateway = HttpChatGateway::new(&server.uri()).unwrap();
    let mut store = SessionStore::new(Arc::new(MemorySessionProvider::new()));

    let err = store
        .signup(&gateway, SignupForm::new("a@b.com", "password1", "password2"))
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_first_message_creates_conversation_and_refreshes_list() {
    let server = MockServer::start().await;
    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::new(&server.uri()).unwrap());
    let session = tutor_core::session::Session::new("tok-2", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chat_ids": []})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reponse": "Use a list comprehension."})))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = ConversationController::new(gateway.clone(), GREETING);
    let mut list = ConversationList::new(gateway.clone());
    list.sync(&session, controller.refresh_epoch()).await.unwrap();
    assert!(list.is_empty());

    let outcome = controller
        .send_message(&session, "How do I map a list?")
        .await
        .unwrap();
    assert!(outcome.created);
    assert_eq!(
        controller.messages(),
        &[
            Message::user("How do I map a list?"),
            Message::assistant("Use a list comprehension.")
        ]
    );

    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chat_ids": [outcome.conversation_id.as_str()]
        })))
        .mount(&server)
        .await;

    assert!(list.sync(&session, controller.refresh_epoch()).await.unwrap());
    assert_eq!(list.position(&outcome.conversation_id), Some(0));

    let requests = server.received_requests().await.unwrap();
    let ask = requests
        .iter()
        .find(|request| request.url.path() == "/ask")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&ask.body).unwrap();
    assert_eq!(body["chat_id"], outcome.conversation_id.as_str());
    assert_eq!(body["question"], "How do I map a list?");
}

#[tokio::test]
async fn test_delete_active_conversation_returns_to_greeting() {
    let server = MockServer::start().await;
    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::new(&server.uri()).unwrap());
    let session = tutor_core::session::Session::new("tok-3", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chat_ids": ["chat_1700000000000"]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"chat_ids": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/history/chat_1700000000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/history/chat_1700000000000"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = ConversationController::new(gateway.clone(), GREETING);
    let mut list = ConversationList::new(gateway.clone());
    list.sync(&session, controller.refresh_epoch()).await.unwrap();

    let id = list.get(0).unwrap().id.clone();
    list.select(&mut controller, &session, id.clone()).await.unwrap();
    assert_eq!(controller.messages().len(), 2);

    assert!(list.toggle_menu(&id));
    let request = list.request_delete().unwrap();
    list.confirm_delete(request, &mut controller, &session)
        .await
        .unwrap();

    assert!(controller.active_id().is_none());
    assert!(controller.is_greeting_only());
    assert!(list.is_empty());
    assert!(list.open_menu().is_none());
}

#[tokio::test]
async fn test_failed_delete_leaves_everything_in_place() {
    let server = MockServer::start().await;
    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::new(&server.uri()).unwrap());
    let session = tutor_core::session::Session::new("tok-4", "a@b.com");

    Mock::given(method("GET"))
        .and(path("/history/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chat_ids": ["chat_1700000000000"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/history/chat_1700000000000"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Chat not found"})))
        .mount(&server)
        .await;

    let mut controller = ConversationController::new(gateway.clone(), GREETING);
    let mut list = ConversationList::new(gateway.clone());
    list.sync(&session, controller.refresh_epoch()).await.unwrap();
    let epoch = controller.refresh_epoch();

    let id = list.get(0).unwrap().id.clone();
    list.toggle_menu(&id);
    let request = list.request_delete().unwrap();
    let err = list
        .confirm_delete(request, &mut controller, &session)
        .await
        .unwrap_err();

    assert!(err.is_delete());
    assert_eq!(controller.error(), Some("Chat not found"));
    assert_eq!(controller.refresh_epoch(), epoch);
    assert_eq!(list.entries().len(), 1);
}

#[tokio::test]
async fn test_revoked_token_keeps_session() {
    let server = MockServer::start().await;
    mount_login(&server, "tok-5").await;
    Mock::given(method("POST"))
        .and(path("/ask"))
        .and(header("authorization", "Bearer tok-5"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::new(&server.uri()).unwrap());
    let mut store = SessionStore::new(Arc::new(MemorySessionProvider::new()));
    let session = store
        .login(gateway.as_ref(), Credentials::new("a@b.com", "password1"))
        .await
        .unwrap()
        .clone();

    let mut controller = ConversationController::new(gateway.clone(), GREETING);
    let err = controller.send_message(&session, "hello").await.unwrap_err();

    assert!(err.is_send());
    assert_eq!(err.inline_message(), Some("Could not validate credentials"));
    assert_eq!(controller.error(), Some("Could not validate credentials"));
    assert!(controller.messages().is_empty());
    assert!(store.is_authenticated());
    assert_eq!(store.session(), Some(&session));
}

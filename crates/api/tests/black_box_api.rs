use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;

use taskhive_api::app;
use taskhive_api::app::services::{AppServices, build_services_with_mailer};
use taskhive_api::config::ApiConfig;
use taskhive_infra::{EmailSender, FailingMailer};

/// Captures outbound mail so tests can pull tokens out of the links.
#[derive(Default)]
struct CapturingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl CapturingMailer {
    /// Last token mailed to `to`, pulled out of the email link.
    fn token_for(&self, to: &str) -> Option<String> {
        let sent = self.sent.lock().unwrap();
        sent.iter().rev().find(|(rcpt, _, _)| rcpt == to).and_then(|(_, _, body)| {
            let (_, rest) = body.split_once("token=").or_else(|| body.split_once("tk="))?;
            let end = rest.find('"')?;
            Some(rest[..end].to_string())
        })
    }
}

impl EmailSender for CapturingMailer {
    fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), html_body.to_string()));
        true
    }
}

struct TestServer {
    base_url: String,
    mailer: Arc<CapturingMailer>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let mailer = Arc::new(CapturingMailer::default());
        Self::spawn_with_transport(Arc::clone(&mailer) as Arc<dyn EmailSender>, mailer).await
    }

    /// Server whose mail transport always reports failure. No mail means no
    /// tokens, so the capture side stays empty.
    async fn spawn_failing() -> Self {
        Self::spawn_with_transport(Arc::new(FailingMailer), Arc::new(CapturingMailer::default()))
            .await
    }

    async fn spawn_with_transport(
        transport: Arc<dyn EmailSender>,
        mailer: Arc<CapturingMailer>,
    ) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let config = ApiConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            token_secret: "test-secret".to_string(),
            frontend_base_url: "http://localhost:5173".to_string(),
        };
        let services: Arc<AppServices> =
            Arc::new(build_services_with_mailer(&config, transport));
        let app = app::build_app_with_services(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            mailer,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Register + verify + login; returns the session token.
async fn signup(srv: &TestServer, client: &reqwest::Client, email: &str, name: &str) -> String {
    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "email": email, "name": name, "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let token = srv.mailer.token_for(email).expect("verification email");
    let res = client
        .post(format!("{}/auth/verify-email", srv.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": email, "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// The notification channel is eventually consistent; poll briefly.
async fn unread_eventually(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    at_least: u64,
) -> u64 {
    for _ in 0..100 {
        let res = client
            .get(format!("{}/notifications/unread-count", base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        let unread = body["unread"].as_u64().unwrap();
        if unread >= at_least {
            return unread;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("notifications never arrived");
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // A correctly signed non-session token does not open a session.
    let verify_token = {
        let res = client
            .post(format!("{}/auth/register", srv.base_url))
            .json(&json!({ "email": "a@example.com", "name": "A", "password": "hunter2hunter2" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        srv.mailer.token_for("a@example.com").unwrap()
    };
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(verify_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_requires_verified_email() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "email": "b@example.com", "name": "B", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // No session before verification; the pending token is still live, so
    // the retry hint is a conflict.
    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "b@example.com", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Wrong password reads identically to an unknown email.
    let wrong = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "b@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    let unknown = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "nobody@example.com", "password": "whatever1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let wrong: serde_json::Value = wrong.json().await.unwrap();
    let unknown: serde_json::Value = unknown.json().await.unwrap();
    assert_eq!(wrong["message"], unknown["message"]);
}

#[tokio::test]
async fn verification_token_is_single_use() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "email": "c@example.com", "name": "C", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let token = srv.mailer.token_for("c@example.com").unwrap();

    let first = client
        .post(format!("{}/auth/verify-email", srv.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    // Replay loses: the record is gone.
    let replay = client
        .post(format!("{}/auth/verify-email", srv.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_reset_request_conflicts() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    signup(&srv, &client, "d@example.com", "D").await;

    let first = client
        .post(format!("{}/auth/reset-password-request", srv.base_url))
        .json(&json!({ "email": "d@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = client
        .post(format!("{}/auth/reset-password-request", srv.base_url))
        .json(&json!({ "email": "d@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The outstanding token still works, once.
    let token = srv.mailer.token_for("d@example.com").unwrap();
    let res = client
        .post(format!("{}/auth/reset-password", srv.base_url))
        .json(&json!({
            "token": token,
            "new_password": "n3w-password!",
            "confirm_password": "n3w-password!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "d@example.com", "password": "n3w-password!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn email_transport_failure_is_surfaced() {
    let srv = TestServer::spawn_failing().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/register", srv.base_url))
        .json(&json!({ "email": "e@example.com", "name": "E", "password": "hunter2hunter2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn workspace_lifecycle_and_authorization() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let owner = signup(&srv, &client, "owner@example.com", "Olive").await;
    let member = signup(&srv, &client, "member@example.com", "Miles").await;

    let res = client
        .post(format!("{}/workspaces", srv.base_url))
        .bearer_auth(&owner)
        .json(&json!({ "name": "Acme", "description": "The works" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    let ws_id = body["workspace"]["id"].as_str().unwrap().to_string();

    // Outsiders can't see or edit the workspace.
    let res = client
        .get(format!("{}/workspaces/{}", srv.base_url, ws_id))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Shareable-link join, then a non-owner update still fails.
    let res = client
        .post(format!("{}/workspaces/{}/accept-invite", srv.base_url, ws_id))
        .bearer_auth(&member)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(format!("{}/workspaces/{}", srv.base_url, ws_id))
        .bearer_auth(&member)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Owner partial update keeps untouched fields.
    let res = client
        .patch(format!("{}/workspaces/{}", srv.base_url, ws_id))
        .bearer_auth(&owner)
        .json(&json!({ "color": "#ff8800" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["workspace"]["name"], "Acme");
    assert_eq!(body["workspace"]["color"], "#ff8800");

    // Only the owner may grant admin.
    let member_id = {
        let res = client
            .get(format!("{}/whoami", srv.base_url))
            .bearer_auth(&member)
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = res.json().await.unwrap();
        body["id"].as_str().unwrap().to_string()
    };
    let res = client
        .patch(format!(
            "{}/workspaces/{}/members/{}",
            srv.base_url, ws_id, member_id
        ))
        .bearer_auth(&owner)
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn invite_join_cascade_and_notifications() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let owner = signup(&srv, &client, "lead@example.com", "Lena").await;
    let invitee = signup(&srv, &client, "new@example.com", "Noor").await;
    let bystander = signup(&srv, &client, "plain@example.com", "Pat").await;

    let res = client
        .post(format!("{}/workspaces", srv.base_url))
        .bearer_auth(&owner)
        .json(&json!({ "name": "Studio" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let ws_id = body["workspace"]["id"].as_str().unwrap().to_string();

    // Two projects exist before the invitee joins.
    for title in ["Alpha", "Beta"] {
        let res = client
            .post(format!("{}/workspaces/{}/projects", srv.base_url, ws_id))
            .bearer_auth(&owner)
            .json(&json!({ "title": title }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // A regular member is part of the roster before the invite goes out.
    let res = client
        .post(format!("{}/workspaces/{}/accept-invite", srv.base_url, ws_id))
        .bearer_auth(&bystander)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/workspaces/{}/invite", srv.base_url, ws_id))
        .bearer_auth(&owner)
        .json(&json!({ "email": "new@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // A second invite while the first is live conflicts.
    let res = client
        .post(format!("{}/workspaces/{}/invite", srv.base_url, ws_id))
        .bearer_auth(&owner)
        .json(&json!({ "email": "new@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // The invitee sees the invitation notification.
    unread_eventually(&client, &srv.base_url, &invitee, 1).await;

    let invite_token = srv.mailer.token_for("new@example.com").unwrap();

    // Someone else redeeming the token gets the same opaque rejection as
    // a garbage token, and the token survives for its real owner.
    let res = client
        .post(format!("{}/workspaces/accept-invite-token", srv.base_url))
        .bearer_auth(&bystander)
        .json(&json!({ "token": invite_token.clone() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid or expired token");

    let res = client
        .post(format!("{}/workspaces/accept-invite-token", srv.base_url))
        .bearer_auth(&invitee)
        .json(&json!({ "token": invite_token.clone() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["workspace"]["members"].as_array().unwrap().len(), 3);

    // Cascade: the invitee is a contributor in both pre-existing projects.
    let res = client
        .get(format!("{}/workspaces/{}/projects", srv.base_url, ws_id))
        .bearer_auth(&invitee)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);

    // Replaying the invite token loses.
    let res = client
        .post(format!("{}/workspaces/accept-invite-token", srv.base_url))
        .bearer_auth(&invitee)
        .json(&json!({ "token": invite_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Joins announce to the owner (and admins) only; the joiner gets a
    // welcome instead.
    unread_eventually(&client, &srv.base_url, &owner, 2).await;
    let res = client
        .get(format!("{}/notifications?unread_only=true", srv.base_url))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["type"] == "workspace_member_joined"
                && n["metadata"]["memberName"] == "Noor")
    );

    // Invitation plus welcome for the invitee.
    unread_eventually(&client, &srv.base_url, &invitee, 2).await;
    let res = client
        .get(format!("{}/notifications", srv.base_url))
        .bearer_auth(&invitee)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert!(items.iter().all(|n| n["type"] != "workspace_member_joined"));
    assert!(
        items
            .iter()
            .any(|n| n["message"].as_str().unwrap().starts_with("You joined"))
    );

    // The regular member never hears about the join. Their inbox holds
    // only their own welcome by now.
    let res = client
        .get(format!("{}/notifications", srv.base_url))
        .bearer_auth(&bystander)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert!(items.iter().all(|n| n["type"] != "workspace_member_joined"));
}

#[tokio::test]
async fn removal_and_leave_notify_the_right_people() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let owner = signup(&srv, &client, "boss@example.com", "Bo").await;
    let removed = signup(&srv, &client, "out@example.com", "Orla").await;
    let leaver = signup(&srv, &client, "gone@example.com", "Gus").await;

    let res = client
        .post(format!("{}/workspaces", srv.base_url))
        .bearer_auth(&owner)
        .json(&json!({ "name": "Foundry" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let ws_id = body["workspace"]["id"].as_str().unwrap().to_string();

    let mut ids = Vec::new();
    for token in [&removed, &leaver] {
        let res = client
            .post(format!("{}/workspaces/{}/accept-invite", srv.base_url, ws_id))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = client
            .get(format!("{}/whoami", srv.base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = res.json().await.unwrap();
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    // Kicked members are told, by whom and from where.
    let res = client
        .delete(format!(
            "{}/workspaces/{}/members/{}",
            srv.base_url, ws_id, ids[0]
        ))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    unread_eventually(&client, &srv.base_url, &removed, 2).await;
    let res = client
        .get(format!("{}/notifications", srv.base_url))
        .bearer_auth(&removed)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(
        body["items"].as_array().unwrap().iter().any(|n| {
            n["message"] == "You were removed from \"Foundry\" by Bo"
        })
    );

    // A voluntary leave is reported to the roster managers instead.
    let res = client
        .delete(format!(
            "{}/workspaces/{}/members/{}",
            srv.base_url, ws_id, ids[1]
        ))
        .bearer_auth(&leaver)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    unread_eventually(&client, &srv.base_url, &owner, 3).await;
    let res = client
        .get(format!("{}/notifications", srv.base_url))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(
        body["items"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["message"] == "Gus left the workspace \"Foundry\"")
    );

    // Deleting the workspace clears every inbox it touched.
    let res = client
        .delete(format!("{}/workspaces/{}", srv.base_url, ws_id))
        .bearer_auth(&owner)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for token in [&owner, &removed, &leaver] {
        let res = client
            .get(format!("{}/notifications", srv.base_url))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["total"].as_u64().unwrap(), 0, "inbox not swept");
    }
}

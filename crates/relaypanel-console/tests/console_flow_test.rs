//! End-to-end console flow against a real panel backend.

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Router};
use relaypanel_api::{store::GrantStore, ApiServer, ApiServerConfig};
use relaypanel_console::{
    BulkOp, ClientError, ConsoleError, ConsoleSession, GrantForm, PanelClient, PanelOps,
};
use relaypanel_grants::wire::GrantQuery;
use relaypanel_grants::{PortAllocator, ServerInfo};

async fn spawn_panel() -> SocketAddr {
    let config = ApiServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: false,
    };
    let dashboards = vec![ServerInfo {
        name: "eu-1".to_string(),
        dashboard_addr: "10.0.0.5".to_string(),
        dashboard_port: 7500,
    }];
    let server = ApiServer::new(config, GrantStore::new(), dashboards, 0);
    let router = server.build_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn form(user: &str, ports: &str) -> GrantForm {
    GrantForm {
        user: user.to_string(),
        token: "s3cret!".to_string(),
        comment: "integration".to_string(),
        server: "eu-1".to_string(),
        ports: ports.to_string(),
        domains: String::new(),
        subdomains: String::new(),
        expire_date: String::new(),
    }
}

#[tokio::test]
async fn full_console_flow() {
    let addr = spawn_panel().await;
    let client = PanelClient::new(format!("http://{}", addr)).unwrap();
    let mut session = ConsoleSession::new(PortAllocator::new(10_000));
    let ops = PanelOps::new(client.clone(), session.busy().clone());

    // dashboards populate the session cache
    ops.refresh_dashboards(&mut session).await.unwrap();
    assert_eq!(session.dashboards().len(), 1);
    assert_eq!(session.current_dashboard().unwrap().name, "eu-1");

    // create the first user with a manual port
    ops.create(&form("alice", "7000")).await.unwrap();

    // allocation session proposes above alice's port
    ops.begin_allocation(&mut session).await.unwrap();
    let range = session.propose("eu-1", 5).unwrap().unwrap();
    assert_eq!(range.to_string(), "7001-7006");

    // a server without grants starts at the floor
    let fresh = session.propose("us-1", 2).unwrap().unwrap();
    assert_eq!(fresh.to_string(), "10001-10003");

    // the proposal flows into the next user's form
    let mut bob = form("bob", "");
    bob.apply_proposal(&range);
    ops.create(&bob).await.unwrap();

    let grants = client.list_tokens(&GrantQuery::default()).await.unwrap();
    assert_eq!(grants.len(), 2);

    // the new high-water mark includes bob's range end
    assert_eq!(client.max_port("eu-1").await.unwrap(), 7006);

    // edit alice's comment through before/after snapshots
    let alice = grants.iter().find(|g| g.user == "alice").unwrap().clone();
    let mut edited = alice.clone();
    edited.comment = "rotated".to_string();
    ops.save_edit(alice, edited).await.unwrap();

    let grants = client
        .list_tokens(&GrantQuery {
            user: Some("alice".to_string()),
            ..GrantQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].comment, "rotated");

    // disable then remove both users
    let all = client.list_tokens(&GrantQuery::default()).await.unwrap();
    ops.bulk(BulkOp::Disable, all.clone()).await.unwrap();
    let disabled = client.list_tokens(&GrantQuery::default()).await.unwrap();
    assert!(disabled.iter().all(|g| !g.enable));

    ops.bulk(BulkOp::Remove, disabled).await.unwrap();
    assert!(client
        .list_tokens(&GrantQuery::default())
        .await
        .unwrap()
        .is_empty());

    // everything settled, nothing left holding the busy flag
    assert!(!session.busy().is_busy());
}

#[tokio::test]
async fn backend_rejections_surface_their_code() {
    let addr = spawn_panel().await;
    let client = PanelClient::new(format!("http://{}", addr)).unwrap();
    let session = ConsoleSession::new(PortAllocator::default());
    let ops = PanelOps::new(client, session.busy().clone());

    ops.create(&form("alice", "")).await.unwrap();

    let err = ops.create(&form("alice", "")).await.unwrap_err();
    match err {
        ConsoleError::Client(ClientError::Rejected(kind)) => {
            assert_eq!(kind.message(), "user exists");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn local_validation_blocks_submission() {
    // deliberately unroutable client: a validation failure must not try the
    // network at all
    let client = PanelClient::new("http://127.0.0.1:1").unwrap();
    let session = ConsoleSession::new(PortAllocator::default());
    let ops = PanelOps::new(client, session.busy().clone());

    let err = ops.create(&form("bad user", "2000-1000")).await.unwrap_err();
    match err {
        ConsoleError::Invalid(fields) => assert_eq!(fields.len(), 2),
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn bulk_with_empty_selection_is_refused_locally() {
    let client = PanelClient::new("http://127.0.0.1:1").unwrap();
    let session = ConsoleSession::new(PortAllocator::default());
    let ops = PanelOps::new(client, session.busy().clone());

    let err = ops.bulk(BulkOp::Remove, Vec::new()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::NothingSelected));
}

#[tokio::test]
async fn a_401_invalidates_the_session() {
    // stand-in backend whose endpoints all answer 401
    let router = Router::new().route(
        "/tokens",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let client = PanelClient::new(format!("http://{}", addr)).unwrap();
    let err = client.list_tokens(&GrantQuery::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionExpired));
}

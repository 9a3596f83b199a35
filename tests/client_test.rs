use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use chrono::NaiveDate;
use tokio::net::TcpListener;

use jobtrack::analysis::{Dashboard, FilterCriteria};
use jobtrack::client::ApiClient;
use jobtrack::error::ClientError;
use jobtrack::models::{ApplicationStatus, Deadline, NewApplication};
use jobtrack::server::serve_on;
use jobtrack::store::ApplicationStore;

/// Run a server on an ephemeral port for the rest of the test process.
fn spawn_server(store: ApplicationStore) -> SocketAddr {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            serve_on(listener, store, std::future::pending()).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(&format!("http://{}/api/applications", addr)).unwrap()
}

fn new_app(company: &str, status: ApplicationStatus) -> NewApplication {
    NewApplication {
        company: company.to_string(),
        role: "Engineer".to_string(),
        deadline: Deadline::new("2025-08-20"),
        status,
    }
}

#[test]
fn create_update_then_list_round_trips() {
    let client = client_for(spawn_server(ApplicationStore::empty()));
    let fields = new_app("Acme", ApplicationStatus::Applied);

    let created = client.create(&fields).unwrap();
    client
        .update_status(&created.id, &ApplicationStatus::Interviewed)
        .unwrap();

    let records = client.list().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, created.id);
    assert_eq!(record.company, fields.company);
    assert_eq!(record.role, fields.role);
    assert_eq!(record.deadline, fields.deadline);
    assert_eq!(record.status, ApplicationStatus::Interviewed);
}

#[test]
fn mutations_on_missing_ids_report_not_found() {
    let client = client_for(spawn_server(ApplicationStore::with_sample_data()));

    let update = client.update_status("missing", &ApplicationStatus::Offered);
    assert!(matches!(update, Err(ClientError::NotFound(id)) if id == "missing"));

    assert_eq!(
        client.delete("5").unwrap(),
        "Application deleted successfully"
    );
    assert!(matches!(client.delete("5"), Err(ClientError::NotFound(_))));
    assert_eq!(client.list().unwrap().len(), 4);
}

#[test]
fn unreachable_server_reads_as_no_data() {
    let client = ApiClient::new("http://127.0.0.1:1/api/applications").unwrap();

    assert!(matches!(client.list(), Err(ClientError::Transport(_))));
    assert!(client.fetch_applications().is_empty());
}

#[test]
fn non_success_listing_reads_as_no_data() {
    let addr = spawn_server(ApplicationStore::with_sample_data());
    let client = ApiClient::new(&format!("http://{}/api/nothing-here", addr)).unwrap();

    assert!(matches!(
        client.list(),
        Err(ClientError::Status { status: 404, .. })
    ));
    assert!(client.fetch_applications().is_empty());
}

#[test]
fn dashboard_over_fetched_records() {
    let client = client_for(spawn_server(ApplicationStore::with_sample_data()));
    let today = NaiveDate::from_ymd_opt(2025, 8, 8).unwrap();

    let records = client.fetch_applications();
    let criteria = FilterCriteria {
        company: Some("tech".to_string()),
        ..Default::default()
    };
    let dashboard = Dashboard::build(&records, &criteria, today);

    assert_eq!(dashboard.total, 5);
    assert_eq!(dashboard.rows.len(), 1);
    assert_eq!(dashboard.rows[0].record.company, "Global Tech");

    let upcoming: Vec<&str> = dashboard.upcoming.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(upcoming, vec!["1", "3"]);
    let past: Vec<&str> = dashboard.past.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(past, vec!["2", "4"]);
    let follow_up: Vec<&str> = dashboard.follow_up.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(follow_up, vec!["2"]);
    let pending: Vec<&str> = dashboard.pending.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(pending, vec!["1", "3", "5"]);
}

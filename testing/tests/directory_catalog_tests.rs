//! Registration, profile projection and workshop browsing.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use openhouse_core::DomainError;
use openhouse_core::catalog::{SortKey, SortOrder, WorkshopCatalog, WorkshopQuery};
use openhouse_core::directory::UserDirectory;
use openhouse_core::types::{ParticipantType, WorkshopId};
use openhouse_core::validation::{EnumCatalog, Validator};
use openhouse_testing::InMemoryGateway;
use openhouse_testing::fixtures::{WorkshopSeed, identity, registration_form};
use serde_json::json;
use std::sync::Arc;
use tracing_test::traced_test;

fn validator() -> Validator {
    Validator::new(Arc::new(EnumCatalog::builtin().unwrap()))
}

fn directory(gateway: &Arc<InMemoryGateway>) -> UserDirectory<InMemoryGateway> {
    UserDirectory::new(Arc::clone(gateway), validator())
}

fn catalog(gateway: &Arc<InMemoryGateway>) -> WorkshopCatalog<InMemoryGateway> {
    WorkshopCatalog::new(Arc::clone(gateway), validator())
}

#[tokio::test]
async fn test_register_binds_verified_email() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user = directory(&gateway)
        .register(
            &identity("ada@example.com"),
            registration_form(ParticipantType::Student),
        )
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.participant_type, ParticipantType::Student);
    assert_eq!(user.attendance_dates.len(), 2);
    assert_eq!(user.extra_attributes["school_name"], "Triam Udom Suksa");
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let gateway = Arc::new(InMemoryGateway::new());
    let directory = directory(&gateway);
    let ada = identity("ada@example.com");

    directory
        .register(&ada, registration_form(ParticipantType::Intania))
        .await
        .unwrap();
    assert_eq!(
        directory
            .register(&ada, registration_form(ParticipantType::Intania))
            .await,
        Err(DomainError::UserAlreadyExists)
    );
}

#[tokio::test]
#[traced_test]
async fn test_registration_failures_log_by_severity() {
    let gateway = Arc::new(InMemoryGateway::new());
    let directory = directory(&gateway);
    let ada = identity("ada@example.com");

    directory
        .register(&ada, registration_form(ParticipantType::Student))
        .await
        .unwrap();
    let conflict = directory
        .register(&ada, registration_form(ParticipantType::Student))
        .await;
    assert_eq!(conflict, Err(DomainError::UserAlreadyExists));
    assert!(logs_contain("Registration rejected"));
    assert!(!logs_contain("Registration failed"));

    gateway.set_unavailable(true);
    let outage = directory
        .register(&identity("bob@example.com"), registration_form(ParticipantType::Student))
        .await;
    assert!(matches!(outage, Err(DomainError::Database(_))));
    assert!(logs_contain("Registration failed"));
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let gateway = Arc::new(InMemoryGateway::new());
    let directory = directory(&gateway);
    let ada = identity("ada@example.com");

    let mut form = registration_form(ParticipantType::Student);
    form.gender = "robot".to_string();
    assert_eq!(
        directory.register(&ada, form).await,
        Err(DomainError::InvalidEnumValue {
            field: "gender",
            value: "robot".to_string()
        })
    );

    let mut form = registration_form(ParticipantType::Student);
    form.attendance_dates = vec!["14/03/2026".to_string()];
    assert_eq!(
        directory.register(&ada, form).await,
        Err(DomainError::InvalidDate {
            value: "14/03/2026".to_string()
        })
    );

    let mut form = registration_form(ParticipantType::Teacher);
    form.extra_attributes = Some(json!({ "intania_generation": "108" }));
    assert!(matches!(
        directory.register(&ada, form).await,
        Err(DomainError::InvalidExtraAttributes { .. })
    ));

    let mut form = registration_form(ParticipantType::Student);
    form.extra_attributes = None;
    assert!(matches!(
        directory.register(&ada, form).await,
        Err(DomainError::InvalidExtraAttributes { .. })
    ));

    assert_eq!(
        directory.profile(&ada, None).await,
        Err(DomainError::UserNotFound)
    );
}

#[tokio::test]
async fn test_other_participant_stores_empty_attributes() {
    let gateway = Arc::new(InMemoryGateway::new());
    let mut form = registration_form(ParticipantType::Other);
    form.extra_attributes = None;

    let user = directory(&gateway)
        .register(&identity("parent@example.com"), form)
        .await
        .unwrap();
    assert_eq!(user.extra_attributes, json!({}));
}

#[tokio::test]
async fn test_profile_projection() {
    let gateway = Arc::new(InMemoryGateway::new());
    let directory = directory(&gateway);
    let ada = identity("ada@example.com");
    directory
        .register(&ada, registration_form(ParticipantType::Student))
        .await
        .unwrap();

    let default = directory.profile(&ada, None).await.unwrap();
    assert_eq!(
        serde_json::to_value(&default).unwrap(),
        json!({ "email": "ada@example.com" })
    );

    let projected = directory
        .profile(&ada, Some("first_name, participant_type,first_name"))
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&projected).unwrap(),
        json!({ "first_name": "Somchai", "participant_type": "student" })
    );

    assert_eq!(
        directory.profile(&ada, Some("email,password")).await,
        Err(DomainError::UnknownField {
            field: "password".to_string()
        })
    );
}

async fn seed_catalog(gateway: &InMemoryGateway) -> Vec<WorkshopId> {
    let mut ids = Vec::new();
    for seed in [
        WorkshopSeed::new("Robotics", "2026-03-14T05:00:00Z", "2026-03-14T06:00:00Z")
            .category("Club")
            .description("Build a line follower"),
        WorkshopSeed::new("Circuits", "2026-03-14T03:00:00Z", "2026-03-14T04:00:00Z")
            .seats(2)
            .registered(2),
        WorkshopSeed::new("Welding", "2026-03-15T03:00:00Z", "2026-03-15T04:00:00Z"),
    ] {
        ids.push(gateway.add_workshop(seed.into_workshop()).await.0);
    }
    ids
}

fn names(workshops: &[openhouse_core::types::Workshop]) -> Vec<&str> {
    workshops.iter().map(|w| w.name.as_str()).collect()
}

#[tokio::test]
async fn test_list_default_order_is_start_time() {
    let gateway = Arc::new(InMemoryGateway::new());
    seed_catalog(&gateway).await;

    let all = catalog(&gateway).list(WorkshopQuery::default()).await.unwrap();
    assert_eq!(names(&all), vec!["Circuits", "Robotics", "Welding"]);
}

#[tokio::test]
async fn test_list_filters() {
    let gateway = Arc::new(InMemoryGateway::new());
    seed_catalog(&gateway).await;
    let catalog = catalog(&gateway);

    let found = catalog
        .list(WorkshopQuery {
            search: Some("LINE".to_string()),
            ..WorkshopQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(names(&found), vec!["Robotics"]);

    let clubs = catalog
        .list(WorkshopQuery {
            category: Some("Club".to_string()),
            ..WorkshopQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(names(&clubs), vec!["Robotics"]);

    let sunday = catalog
        .list(WorkshopQuery {
            event_date: Some("2026-03-15".to_string()),
            ..WorkshopQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(names(&sunday), vec!["Welding"]);

    let open = catalog
        .list(WorkshopQuery {
            hide_full: true,
            sort_by: SortKey::Name,
            order: SortOrder::Desc,
            ..WorkshopQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(names(&open), vec!["Welding", "Robotics"]);

    let blank = catalog
        .list(WorkshopQuery {
            search: Some("  ".to_string()),
            category: Some(String::new()),
            ..WorkshopQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(blank.len(), 3);
}

#[tokio::test]
async fn test_list_rejects_bad_filters() {
    let gateway = Arc::new(InMemoryGateway::new());
    let catalog = catalog(&gateway);

    assert_eq!(
        catalog
            .list(WorkshopQuery {
                category: Some("Lab".to_string()),
                ..WorkshopQuery::default()
            })
            .await,
        Err(DomainError::InvalidEnumValue {
            field: "category",
            value: "Lab".to_string()
        })
    );
    assert_eq!(
        catalog
            .list(WorkshopQuery {
                event_date: Some("tomorrow".to_string()),
                ..WorkshopQuery::default()
            })
            .await,
        Err(DomainError::InvalidDate {
            value: "tomorrow".to_string()
        })
    );
}

#[tokio::test]
async fn test_get_with_projection() {
    let gateway = Arc::new(InMemoryGateway::new());
    let ids = seed_catalog(&gateway).await;
    let catalog = catalog(&gateway);

    let default = catalog.get(ids[0], None).await.unwrap();
    assert_eq!(
        serde_json::to_value(&default).unwrap(),
        json!({ "name": "Robotics" })
    );

    let seats = catalog
        .get(ids[1], Some("total_seats,registered_count"))
        .await
        .unwrap();
    assert_eq!(seats.total_seats, Some(2));
    assert_eq!(seats.registered_count, Some(2));
    assert_eq!(seats.name, None);

    assert_eq!(
        catalog.get(ids[0], Some("check_in_code")).await,
        Err(DomainError::UnknownField {
            field: "check_in_code".to_string()
        })
    );
    assert_eq!(
        catalog.get(WorkshopId::new(9_999), None).await,
        Err(DomainError::WorkshopNotFound)
    );
}

use forage_core::db::open_db_in_memory;
use forage_core::{
    EditFlow, EditState, Forageable, ForageableInput, ForageableService, ForageableServiceError,
    ForageableValidationError, NavigationSignal, SqliteForageableStore, SubscriptionClosed,
};
use rusqlite::Connection;

fn service(conn: &Connection) -> ForageableService<SqliteForageableStore<'_>> {
    let store = SqliteForageableStore::try_new(conn).unwrap();
    ForageableService::new(store).unwrap()
}

fn morel() -> ForageableInput {
    ForageableInput::new("Morel patch", "123 Forest Rd")
        .with_notes("near the creek")
        .with_in_season(true)
        .with_remind_text("check weekly")
}

#[test]
fn is_valid_entry_matches_required_field_gate() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    assert!(!service.is_valid_entry("", "addr"));
    assert!(!service.is_valid_entry("name", ""));
    assert!(!service.is_valid_entry("  ", "addr"));
    assert!(service.is_valid_entry("name", "addr"));
}

#[test]
fn end_to_end_add_update_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let id = service.add_forageable(&morel()).unwrap();
    let listing = service.list_forageables().unwrap();
    assert_eq!(listing, vec![Forageable::from_input(id, morel())]);

    let updated = service
        .update_forageable(id, &morel().with_in_season(false))
        .unwrap();
    assert_eq!(updated.id, id);
    let loaded = service.get_forageable(id).unwrap().unwrap();
    assert!(!loaded.in_season);
    assert_eq!(loaded.name, "Morel patch");

    service.delete_forageable(&loaded).unwrap();
    assert!(service.list_forageables().unwrap().is_empty());
    assert!(service.get_forageable(id).unwrap().is_none());
}

#[test]
fn invalid_add_returns_validation_error_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut listing = service.retrieve_all_forageables();
    assert_eq!(listing.poll_update(), Some(Vec::new()));

    let err = service
        .add_forageable(&ForageableInput::new("Morel", "   "))
        .unwrap_err();
    assert!(matches!(
        err,
        ForageableServiceError::ValidationFailed(ForageableValidationError::EmptyLocationAddress)
    ));
    assert!(service.list_forageables().unwrap().is_empty());
    assert_eq!(listing.poll_update(), None);
}

#[test]
fn update_and_delete_missing_ids_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service.update_forageable(5, &morel()).unwrap_err();
    assert!(matches!(err, ForageableServiceError::NotFound(5)));

    let ghost = Forageable::from_input(6, morel());
    let err = service.delete_forageable(&ghost).unwrap_err();
    assert!(matches!(err, ForageableServiceError::NotFound(6)));
}

#[test]
fn listing_subscription_tracks_every_mutation() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut listing = service.retrieve_all_forageables();
    assert_eq!(listing.poll_update(), Some(Vec::new()));

    let id = service.add_forageable(&morel()).unwrap();
    let snapshot = listing.poll_update().expect("listing after add");
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, id);

    service
        .update_forageable(id, &morel().with_notes("moved upstream"))
        .unwrap();
    let snapshot = listing.poll_update().expect("listing after update");
    assert_eq!(snapshot[0].notes, "moved upstream");

    service.delete_by_id(id).unwrap();
    assert_eq!(listing.poll_update(), Some(Vec::new()));
    assert_eq!(listing.poll_update(), None);
}

#[test]
fn record_subscription_sees_initial_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.add_forageable(&morel()).unwrap();

    let mut record = service.retrieve_forageable(id).unwrap();
    let initial = record.poll_update().expect("initial snapshot").unwrap();
    assert_eq!(initial, Forageable::from_input(id, morel()));

    service
        .update_forageable(id, &morel().with_in_season(false))
        .unwrap();
    let updated = record.poll_update().expect("update snapshot").unwrap();
    assert!(!updated.in_season);

    service.delete_by_id(id).unwrap();
    assert_eq!(record.poll_update(), Some(None));
    assert_eq!(record.current(), None);
}

#[test]
fn record_subscription_ignores_other_records() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let watched = service.add_forageable(&morel()).unwrap();
    let other = service
        .add_forageable(&ForageableInput::new("Ramps", "Creek bed"))
        .unwrap();

    let mut record = service.retrieve_forageable(watched).unwrap();
    record.poll_update();

    service
        .update_forageable(other, &ForageableInput::new("Ramps", "North bank"))
        .unwrap();
    assert_eq!(record.poll_update(), None);
}

#[test]
fn subscribing_before_creation_sees_the_new_record() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut record = service.retrieve_forageable(1).unwrap();
    assert_eq!(record.poll_update(), Some(None));

    let id = service.add_forageable(&morel()).unwrap();
    assert_eq!(id, 1);
    assert_eq!(
        record.poll_update(),
        Some(Some(Forageable::from_input(id, morel())))
    );
}

#[test]
fn cancelled_subscriptions_are_released() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = service.add_forageable(&morel()).unwrap();

    let listing = service.retrieve_all_forageables();
    let record = service.retrieve_forageable(id).unwrap();
    assert_eq!(service.feed().listing_subscribers(), 1);
    assert_eq!(service.feed().record_channels(), 1);

    listing.cancel();
    record.cancel();
    service
        .update_forageable(id, &morel().with_notes("after cancel"))
        .unwrap();

    assert_eq!(service.feed().listing_subscribers(), 0);
    assert_eq!(service.feed().record_channels(), 0);
}

#[test]
fn service_seeds_listing_from_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    {
        let store = SqliteForageableStore::try_new(&conn).unwrap();
        let seeded = ForageableService::new(store).unwrap();
        seeded.add_forageable(&morel()).unwrap();
    }

    let service = service(&conn);
    let mut listing = service.retrieve_all_forageables();
    assert_eq!(listing.poll_update().map(|rows| rows.len()), Some(1));
}

#[test]
fn schema_rejects_control_whitespace_only_fields() {
    let conn = open_db_in_memory().unwrap();

    for blank in ["char(9)", "char(10)", "char(13)", "' ' || char(9) || char(10)"] {
        let name_insert = conn.execute(
            &format!(
                "INSERT INTO forageables (name, location_address) VALUES ({blank}, 'Forest Rd');"
            ),
            [],
        );
        assert!(name_insert.is_err(), "name {blank} was accepted");

        let address_insert = conn.execute(
            &format!("INSERT INTO forageables (name, location_address) VALUES ('Morel', {blank});"),
            [],
        );
        assert!(address_insert.is_err(), "address {blank} was accepted");
    }

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM forageables;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn committed_save_succeeds_when_listing_refresh_fails() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut listing = service.retrieve_all_forageables();
    assert_eq!(listing.poll_update(), Some(Vec::new()));

    // A row that breaks every later `list()` call.
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO forageables (name, location_address) VALUES (char(9), 'Forest Rd');
         PRAGMA ignore_check_constraints = OFF;",
    )
    .unwrap();
    assert!(service.list_forageables().is_err());

    let mut flow = EditFlow::open(&service, 0);
    let signal = flow.save(&morel()).unwrap();
    let NavigationSignal::EntrySaved { id } = signal else {
        panic!("expected EntrySaved, got {signal:?}");
    };
    assert_eq!(flow.state(), EditState::Persisted(id));
    assert_eq!(
        service.get_forageable(id).unwrap(),
        Some(Forageable::from_input(id, morel()))
    );

    // Retrying updates the same row instead of inserting another one.
    assert_eq!(
        flow.save(&morel().with_notes("second visit")).unwrap(),
        NavigationSignal::EntrySaved { id }
    );
    let morel_rows: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM forageables WHERE name = 'Morel patch';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(morel_rows, 1);

    // The listing keeps its last good snapshot.
    assert_eq!(listing.poll_update(), None);
    assert_eq!(listing.current(), Vec::new());

    flow.delete().unwrap();
    assert!(service.get_forageable(id).unwrap().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn async_subscriber_awaits_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let mut listing = service.retrieve_all_forageables();

    assert_eq!(listing.changed().await, Ok(Vec::new()));
    let id = service.add_forageable(&morel()).unwrap();
    let snapshot = listing.changed().await.unwrap();
    assert_eq!(snapshot.iter().map(|r| r.id).collect::<Vec<_>>(), vec![id]);

    drop(service);
    assert_eq!(listing.changed().await, Err(SubscriptionClosed));
}

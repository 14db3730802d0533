mod common;

use chrono::NaiveDate;
use common::{default_now, TestApp};
use ecotrack::{
    domain::models::{
        booking::{Booking, BookingStatus, NewBookingParams, TimeSlot, WasteType},
        complaint::{Complaint, ComplaintStatus},
        sell_request::{Materials, SellRequest, SellRequestStatus},
        user::{NewUserParams, Role, User, UserStatus},
    },
    domain::services::defaults::DEFAULT_BROADCAST_MESSAGE,
    error::AppError,
};

fn booking_for(household_id: &str, date: NaiveDate, fee: Option<i64>) -> Booking {
    Booking::new(NewBookingParams {
        household_id: household_id.to_string(),
        date,
        time_slot: TimeSlot::Morning,
        waste_type: WasteType::EventWaste,
        notes: Some("Community hall".to_string()),
        attendee_count: Some(120),
        booking_fee: fee,
    })
}

#[tokio::test]
async fn test_delete_user_cascades_owned_records_only() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let jane_payments = repo.payments_for("HH-JANE-9876").await.len();
    let jane_complaints = repo.complaints_for("HH-JANE-9876").await.len();
    assert!(!repo.payments_for("HH-ASHA-0001").await.is_empty());
    assert!(!repo.messages_for("HH-ASHA-0001").await.is_empty());

    repo.delete_user("HH-ASHA-0001").await.unwrap();

    assert!(repo.find_user("HH-ASHA-0001").await.is_none());
    assert!(repo.payments_for("HH-ASHA-0001").await.is_empty());
    assert!(repo.complaints_for("HH-ASHA-0001").await.is_empty());
    assert!(repo.bookings_for("HH-ASHA-0001").await.is_empty());
    assert!(repo.messages_for("HH-ASHA-0001").await.is_empty());
    assert!(!repo.credentials().has_identifier("9800000001").await);

    assert_eq!(repo.payments_for("HH-JANE-9876").await.len(), jane_payments);
    assert_eq!(repo.complaints_for("HH-JANE-9876").await.len(), jane_complaints);
    assert_eq!(repo.users().await.len(), 4);

    assert!(matches!(repo.delete_user("HH-ASHA-0001").await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_add_user_rejects_collisions() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let params = |household_id: &str, identifier: &str| NewUserParams {
        name: "Admin Provisioned".to_string(),
        household_id: household_id.to_string(),
        identifier: identifier.to_string(),
        role: Role::Employee,
        email: None,
        family_size: 1,
        address: None,
        gram_panchayat: None,
        outstanding_balance: 0,
    };

    let err = repo
        .add_user(User::new(params("HH-JANE-9876", "9700000000"), default_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateAccount(_)));

    let err = repo
        .add_user(User::new(params("STAFF-EMP-01", "9800000030"), default_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateAccount(_)));

    let user = repo
        .add_user(User::new(params("STAFF-EMP-01", "9700000000"), default_now()))
        .await
        .unwrap();
    assert_eq!(repo.users().await.last(), Some(&user));
}

#[tokio::test]
async fn test_warning_lifecycle() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    assert!(matches!(repo.warn_user("HH-ASHA-0001", "   ").await, Err(AppError::Validation(_))));

    let warned = repo.warn_user("HH-ASHA-0001", "Please segregate wet and dry waste.").await.unwrap();
    assert_eq!(warned.status, UserStatus::Warned);
    assert_eq!(warned.warning_message.as_deref(), Some("Please segregate wet and dry waste."));

    let cleared = repo.clear_user_warning("HH-ASHA-0001").await.unwrap();
    assert_eq!(cleared.status, UserStatus::Active);
    assert_eq!(cleared.warning_message, None);

    // Clearing does not unblock.
    repo.set_user_blocked("HH-JANE-9876", true).await.unwrap();
    let still_blocked = repo.clear_user_warning("HH-JANE-9876").await.unwrap();
    assert_eq!(still_blocked.status, UserStatus::Blocked);

    let unblocked = repo.set_user_blocked("HH-JANE-9876", false).await.unwrap();
    assert_eq!(unblocked.status, UserStatus::Active);
}

#[tokio::test]
async fn test_booking_fee_is_charged_once() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;
    let date = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();

    let booking = repo.add_booking(booking_for("HH-ASHA-0001", date, Some(200))).await.unwrap();
    assert_eq!(repo.find_user("HH-ASHA-0001").await.unwrap().outstanding_balance, 275);
    assert_eq!(repo.bookings_for("HH-ASHA-0001").await[0].id, booking.id);

    let mut completed = booking.clone();
    completed.status = BookingStatus::Completed;
    repo.update_booking(completed.clone()).await.unwrap();
    assert_eq!(repo.find_user("HH-ASHA-0001").await.unwrap().outstanding_balance, 275);

    let mut reopened = completed;
    reopened.status = BookingStatus::Scheduled;
    assert!(matches!(repo.update_booking(reopened).await, Err(AppError::Validation(_))));

    repo.add_booking(booking_for("HH-ASHA-0001", date, Some(0))).await.unwrap();
    repo.add_booking(booking_for("HH-ASHA-0001", date, None)).await.unwrap();
    assert_eq!(repo.find_user("HH-ASHA-0001").await.unwrap().outstanding_balance, 275);

    let orphan = booking_for("HH-NOBODY-0000", date, Some(100));
    assert!(matches!(repo.add_booking(orphan).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_booking_reminder_for_tomorrow() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;
    let today = NaiveDate::from_ymd_opt(2024, 8, 9).unwrap();
    let tomorrow = NaiveDate::from_ymd_opt(2024, 8, 10).unwrap();

    assert!(repo.upcoming_booking_reminder("HH-ASHA-0001", today).await.is_none());

    let booking = repo.add_booking(booking_for("HH-ASHA-0001", tomorrow, None)).await.unwrap();
    let reminder = repo.upcoming_booking_reminder("HH-ASHA-0001", today).await.unwrap();
    assert_eq!(reminder.id, booking.id);

    let mut user = repo.find_user("HH-ASHA-0001").await.unwrap();
    user.booking_reminders = false;
    repo.update_user(user).await.unwrap();
    assert!(repo.upcoming_booking_reminder("HH-ASHA-0001", today).await.is_none());
}

#[tokio::test]
async fn test_complaint_status_moves_forward() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let complaint = Complaint::new(
        "HH-ASHA-0001".into(),
        "Overflowing Bin".into(),
        "The community bin has not been emptied for three days.".into(),
        None,
        default_now(),
    );
    let added = repo.add_complaint(complaint).await.unwrap();
    assert_eq!(repo.complaints_for("HH-ASHA-0001").await[0].id, added.id);

    let mut in_progress = added.clone();
    in_progress.status = ComplaintStatus::InProgress;
    repo.update_complaint(in_progress.clone()).await.unwrap();

    let mut back = in_progress;
    back.status = ComplaintStatus::Pending;
    assert!(matches!(repo.update_complaint(back).await, Err(AppError::Validation(_))));

    let resolved = repo.complaints().await.into_iter().find(|c| c.id == "CMPT-001").unwrap();
    assert_eq!(resolved.status, ComplaintStatus::Resolved);
    let mut details_only = resolved.clone();
    details_only.details = "Collector arrived the next day.".into();
    repo.update_complaint(details_only).await.unwrap();
}

#[tokio::test]
async fn test_messages_mark_read_is_idempotent() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    repo.add_message("HH-JANE-9876", "Your bulk pickup is confirmed.").await.unwrap();
    repo.add_message("HH-JANE-9876", "Please keep the waste at the gate.").await.unwrap();

    let inbox = repo.messages_for("HH-JANE-9876").await;
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].text, "Please keep the waste at the gate.");
    assert_eq!(inbox[0].timestamp, default_now());

    assert_eq!(repo.mark_messages_as_read("HH-JANE-9876").await.unwrap(), 2);
    assert_eq!(repo.mark_messages_as_read("HH-JANE-9876").await.unwrap(), 0);
    assert!(repo.messages_for("HH-JANE-9876").await.iter().all(|m| m.read));

    // Other recipients untouched.
    assert!(repo.messages_for("HH-ASHA-0001").await.iter().all(|m| !m.read));
}

#[tokio::test]
async fn test_sell_request_flow_and_chat() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let empty = SellRequest::new("HH-ASHA-0001".into(), Materials::default(), 5.0, default_now());
    assert!(matches!(repo.add_sell_request(empty).await, Err(AppError::Validation(_))));

    let materials = Materials { bottles: true, glass: true, ..Materials::default() };
    let weightless = SellRequest::new("HH-ASHA-0001".into(), materials.clone(), 0.0, default_now());
    assert!(matches!(repo.add_sell_request(weightless).await, Err(AppError::Validation(_))));

    let request = repo
        .add_sell_request(SellRequest::new("HH-ASHA-0001".into(), materials, 8.5, default_now()))
        .await
        .unwrap();
    assert_eq!(repo.sell_requests_for("HH-ASHA-0001").await[0].id, request.id);

    let approved = repo.update_sell_request_status(&request.id, SellRequestStatus::Approved).await.unwrap();
    assert_eq!(approved.status, SellRequestStatus::Approved);
    assert!(matches!(
        repo.update_sell_request_status(&request.id, SellRequestStatus::Pending).await,
        Err(AppError::Validation(_))
    ));
    repo.update_sell_request_status(&request.id, SellRequestStatus::Completed).await.unwrap();

    repo.add_sell_request_message(&request.id, "HH-ASHA-0001", "When will you collect?").await.unwrap();
    repo.add_sell_request_message(&request.id, "ADMIN-0001", "Tomorrow morning.").await.unwrap();
    assert!(matches!(
        repo.add_sell_request_message(&request.id, "ADMIN-0001", "  ").await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        repo.add_sell_request_message("SELL-404", "ADMIN-0001", "Hello").await,
        Err(AppError::NotFound(_))
    ));

    let thread = repo.sell_request_messages(&request.id).await;
    let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["When will you collect?", "Tomorrow morning."]);
    assert!(repo.sell_request_messages("SELL-001").await.is_empty());
}

#[tokio::test]
async fn test_broadcast_messages() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    assert_eq!(repo.broadcast_message().await.as_deref(), Some(DEFAULT_BROADCAST_MESSAGE));
    assert_eq!(repo.staff_broadcast_message().await, None);

    repo.update_staff_broadcast_message(Some(" Report at depot by 8 AM ".into())).await.unwrap();
    assert_eq!(repo.staff_broadcast_message().await.as_deref(), Some("Report at depot by 8 AM"));

    repo.update_broadcast_message(Some("   ".into())).await.unwrap();
    assert_eq!(repo.broadcast_message().await, None);

    let restarted = app.restart(false).await;
    assert_eq!(restarted.repo.broadcast_message().await, None);
    assert_eq!(restarted.repo.staff_broadcast_message().await.as_deref(), Some("Report at depot by 8 AM"));
}

#[tokio::test]
async fn test_update_user_keeps_identifiers_unique() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let mut jane = repo.find_user("HH-JANE-9876").await.unwrap();
    jane.identifier = "9800000001".to_string();
    let err = repo.update_user(jane.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::DuplicateAccount(_)));

    let holders = repo.users().await.into_iter().filter(|u| u.identifier == "9800000001").count();
    assert_eq!(holders, 1);
    assert_eq!(repo.find_user("HH-JANE-9876").await.unwrap().identifier, "jane.doe@example.com");
}

#[tokio::test]
async fn test_changed_identifier_carries_the_credential() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;

    let mut jane = repo.find_user("HH-JANE-9876").await.unwrap();
    jane.identifier = "jane@ecotrack.example".to_string();
    repo.update_user(jane).await.unwrap();

    assert!(!repo.credentials().has_identifier("jane.doe@example.com").await);
    assert!(repo.credentials().verify("jane@ecotrack.example", "password456").await.unwrap());

    let restarted = app.restart(false).await;
    let outcome = restarted.auth_service.login("jane@ecotrack.example", "password456", false).await.unwrap();
    assert_eq!(outcome.user.household_id, "HH-JANE-9876");
}

#[tokio::test]
async fn test_duplicate_record_ids_are_rejected() {
    let app = TestApp::new().await;
    let repo = &app.state.repo;
    let date = NaiveDate::from_ymd_opt(2024, 8, 20).unwrap();

    let booking = booking_for("HH-JANE-9876", date, Some(500));
    let balance = repo.find_user("HH-JANE-9876").await.unwrap().outstanding_balance;
    repo.add_booking(booking.clone()).await.unwrap();
    assert!(matches!(repo.add_booking(booking.clone()).await, Err(AppError::Validation(_))));

    assert_eq!(repo.find_user("HH-JANE-9876").await.unwrap().outstanding_balance, balance + 500);
    assert_eq!(repo.bookings().await.iter().filter(|b| b.id == booking.id).count(), 1);

    let complaint = Complaint::new(
        "HH-JANE-9876".into(),
        "Missed Pickup".into(),
        "Nobody came on Tuesday.".into(),
        None,
        default_now(),
    );
    repo.add_complaint(complaint.clone()).await.unwrap();
    assert!(matches!(repo.add_complaint(complaint).await, Err(AppError::Validation(_))));

    let materials = Materials { bottles: true, ..Materials::default() };
    let request = SellRequest::new("HH-JANE-9876".into(), materials, 3.0, default_now());
    repo.add_sell_request(request.clone()).await.unwrap();
    assert!(matches!(repo.add_sell_request(request).await, Err(AppError::Validation(_))));
}

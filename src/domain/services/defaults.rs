use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::error;

use crate::domain::models::{
    booking::{Booking, BookingStatus, TimeSlot, WasteType},
    complaint::{Complaint, ComplaintStatus},
    credential::Credential,
    message::Message,
    payment::{Payment, PaymentStatus},
    sell_request::{Materials, SellRequest, SellRequestStatus},
    user::{NewUserParams, Role, User},
};
use crate::domain::services::credentials::hash_password;

pub const DEFAULT_BROADCAST_MESSAGE: &str =
    "Welcome! A friendly reminder that monthly payments are due by the end of the week. Thank you!";

/// Mock dataset written on first start.
pub struct SeedData {
    pub users: Vec<User>,
    pub payments: Vec<Payment>,
    pub complaints: Vec<Complaint>,
    pub bookings: Vec<Booking>,
    pub messages: Vec<Message>,
    pub sell_requests: Vec<SellRequest>,
}

struct SeedAccount {
    name: &'static str,
    household_id: &'static str,
    identifier: &'static str,
    password: &'static str,
    role: Role,
    email: Option<&'static str>,
    family_size: u32,
    balance: i64,
    gram_panchayat: Option<&'static str>,
}

const SEED_ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        name: "Asha Roy",
        household_id: "HH-ASHA-0001",
        identifier: "9800000001",
        password: "password123",
        role: Role::Household,
        email: Some("asha.roy@example.com"),
        family_size: 5,
        balance: 75,
        gram_panchayat: Some("Barasat-I"),
    },
    SeedAccount {
        name: "Jane Doe",
        household_id: "HH-JANE-9876",
        identifier: "jane.doe@example.com",
        password: "password456",
        role: Role::Household,
        email: Some("jane.doe@example.com"),
        family_size: 3,
        balance: 0,
        gram_panchayat: Some("Barasat-I"),
    },
    SeedAccount {
        name: "Ravi Kumar",
        household_id: "ADMIN-0001",
        identifier: "9800000010",
        password: "Admin@1234",
        role: Role::Admin,
        email: Some("admin@ecotrack.example"),
        family_size: 1,
        balance: 0,
        gram_panchayat: None,
    },
    SeedAccount {
        name: "Sunil Das",
        household_id: "STAFF-CAPT-01",
        identifier: "9800000020",
        password: "Captain@123",
        role: Role::Captain,
        email: None,
        family_size: 1,
        balance: 0,
        gram_panchayat: Some("Barasat-I"),
    },
    SeedAccount {
        name: "Meena Paul",
        household_id: "STAFF-SW-01",
        identifier: "9800000030",
        password: "Worker@123",
        role: Role::SanitaryWorker,
        email: None,
        family_size: 1,
        balance: 0,
        gram_panchayat: Some("Barasat-I"),
    },
];

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().unwrap_or_default()
}

fn day(y: i32, mo: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, mo, d).unwrap_or_default()
}

pub fn seed_data(now: DateTime<Utc>) -> SeedData {
    let users = SEED_ACCOUNTS
        .iter()
        .map(|a| {
            let mut user = User::new(
                NewUserParams {
                    name: a.name.to_string(),
                    household_id: a.household_id.to_string(),
                    identifier: a.identifier.to_string(),
                    role: a.role,
                    email: a.email.map(str::to_string),
                    family_size: a.family_size,
                    address: None,
                    gram_panchayat: a.gram_panchayat.map(str::to_string),
                    outstanding_balance: a.balance,
                },
                utc(2024, 6, 1, 0, 0, 0),
            );
            user.has_green_badge = a.household_id == "HH-ASHA-0001";
            user
        })
        .collect();

    let payments = vec![
        Payment {
            id: "TXN445566".into(),
            household_id: "HH-JANE-9876".into(),
            date: now,
            amount: 75,
            status: PaymentStatus::PendingVerification,
            screenshot: Some("https://via.placeholder.com/300x600.png?text=Sample+Screenshot".into()),
            rejection_reason: None,
        },
        Payment {
            id: "TXN789123".into(),
            household_id: "HH-ASHA-0001".into(),
            date: utc(2024, 7, 15, 10, 30, 12),
            amount: 75,
            status: PaymentStatus::Paid,
            screenshot: None,
            rejection_reason: None,
        },
        Payment {
            id: "TXN112233".into(),
            household_id: "HH-JANE-9876".into(),
            date: utc(2024, 7, 14, 8, 0, 0),
            amount: 75,
            status: PaymentStatus::Paid,
            screenshot: None,
            rejection_reason: None,
        },
        Payment {
            id: "TXN654321".into(),
            household_id: "HH-ASHA-0001".into(),
            date: utc(2024, 6, 14, 9, 15, 45),
            amount: 75,
            status: PaymentStatus::Paid,
            screenshot: None,
            rejection_reason: None,
        },
    ];

    let complaints = vec![
        Complaint {
            id: "CMPT-002".into(),
            household_id: "HH-ASHA-0001".into(),
            date: now,
            issue: "Driver Behavior".into(),
            details: "The driver was rude.".into(),
            status: ComplaintStatus::Pending,
            photo: None,
        },
        Complaint {
            id: "CMPT-003".into(),
            household_id: "HH-JANE-9876".into(),
            date: utc(2024, 7, 20, 0, 0, 0),
            issue: "Payment Issue".into(),
            details: "My payment is not reflecting in the app.".into(),
            status: ComplaintStatus::InProgress,
            photo: None,
        },
        Complaint {
            id: "CMPT-001".into(),
            household_id: "HH-ASHA-0001".into(),
            date: utc(2024, 7, 10, 0, 0, 0),
            issue: "Missed Pickup".into(),
            details: "Collector did not arrive on the scheduled day.".into(),
            status: ComplaintStatus::Resolved,
            photo: None,
        },
    ];

    let bookings = vec![
        Booking {
            id: "BK-002".into(),
            household_id: "HH-JANE-9876".into(),
            date: day(2024, 8, 5),
            time_slot: TimeSlot::Afternoon,
            waste_type: WasteType::BulkHousehold,
            status: BookingStatus::Scheduled,
            notes: None,
            attendee_count: None,
            booking_fee: None,
        },
        Booking {
            id: "BK-001".into(),
            household_id: "HH-ASHA-0001".into(),
            date: day(2024, 7, 28),
            time_slot: TimeSlot::Morning,
            waste_type: WasteType::GardenWaste,
            status: BookingStatus::Completed,
            notes: None,
            attendee_count: None,
            booking_fee: None,
        },
    ];

    let messages = vec![Message {
        id: "MSG-001".into(),
        recipient_id: "HH-ASHA-0001".into(),
        text: "Your garden waste pickup has been completed. Thank you for segregating!".into(),
        timestamp: utc(2024, 7, 28, 12, 0, 0),
        read: false,
    }];

    let sell_requests = vec![SellRequest {
        id: "SELL-001".into(),
        household_id: "HH-JANE-9876".into(),
        date: utc(2024, 7, 22, 11, 0, 0),
        materials: Materials { plastic: true, paper: true, ..Materials::default() },
        weight_kg: 12.5,
        status: SellRequestStatus::Pending,
    }];

    SeedData { users, payments, complaints, bookings, messages, sell_requests }
}

/// Hashes the seed passwords. Only called when no credential set is stored yet.
pub fn seed_credentials(now: DateTime<Utc>) -> Vec<Credential> {
    SEED_ACCOUNTS
        .iter()
        .filter_map(|a| match hash_password(a.password) {
            Ok(password_hash) => Some(Credential {
                identifier: a.identifier.to_string(),
                household_id: a.household_id.to_string(),
                password_hash,
                updated_at: now,
            }),
            Err(e) => {
                error!("Skipping seed credential for {}: {}", a.household_id, e);
                None
            }
        })
        .collect()
}

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};

use crate::domain::models::{
    booking::{Booking, BookingStatus},
    complaint::Complaint,
    message::Message,
    payment::{Payment, PaymentStatus},
    sell_request::{SellRequest, SellRequestMessage, SellRequestStatus},
    user::{Location, User, UserStatus},
};
use crate::domain::ports::{Clock, VerificationOutcome, VerificationPolicy};
use crate::domain::services::credentials::{
    drop_household_credentials, rekey_credential, CredentialStore, CREDENTIALS_KEY,
};
use crate::domain::services::defaults::{self, DEFAULT_BROADCAST_MESSAGE};
use crate::domain::services::persistent_store::{PersistentStore, WriteBatch};
use crate::domain::services::tracking::find_active_captain;
use crate::error::AppError;

pub mod keys {
    pub const USERS: &str = "ecotrack-users";
    pub const PAYMENTS: &str = "ecotrack-payments";
    pub const COMPLAINTS: &str = "ecotrack-complaints";
    pub const BOOKINGS: &str = "ecotrack-bookings";
    pub const MESSAGES: &str = "ecotrack-messages";
    pub const SELL_REQUESTS: &str = "ecotrack-sell-requests";
    pub const SELL_REQUEST_MESSAGES: &str = "ecotrack-sell-request-messages";
    pub const BROADCAST: &str = "ecotrack-broadcast";
    pub const STAFF_BROADCAST: &str = "ecotrack-staff-broadcast";
}

struct Collections {
    users: Vec<User>,
    payments: Vec<Payment>,
    complaints: Vec<Complaint>,
    bookings: Vec<Booking>,
    messages: Vec<Message>,
    sell_requests: Vec<SellRequest>,
    sell_request_messages: Vec<SellRequestMessage>,
    broadcast_message: Option<String>,
    staff_broadcast_message: Option<String>,
}

impl Collections {
    fn ensure_user(&self, household_id: &str) -> Result<(), AppError> {
        if self.users.iter().any(|u| u.household_id == household_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User {} not found", household_id)))
        }
    }
}

fn find_user_mut<'a>(users: &'a mut [User], household_id: &str) -> Result<&'a mut User, AppError> {
    users
        .iter_mut()
        .find(|u| u.household_id == household_id)
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", household_id)))
}

fn retained<T: Clone>(items: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.iter().filter(|item| keep(item)).cloned().collect()
}

fn duplicate_identifier() -> AppError {
    AppError::DuplicateAccount("An account with this mobile number or email already exists.".into())
}

struct Inner {
    store: PersistentStore,
    credentials: CredentialStore,
    clock: Arc<dyn Clock>,
    verifier: Arc<dyn VerificationPolicy>,
    data: RwLock<Collections>,
}

/// Owner of every collection.
///
/// Mutations hold the write lock, stage the change on copies of the affected
/// collections and write those through to storage. Memory is only updated
/// once storage has accepted the write, so a failed save leaves both sides
/// as they were.
#[derive(Clone)]
pub struct DataRepository {
    inner: Arc<Inner>,
}

/// Result of [`DataRepository::add_payment`].
pub enum PaymentVerification {
    Settled(Payment),
    Pending { payment: Payment, handle: JoinHandle<Result<Payment, AppError>> },
}

impl PaymentVerification {
    /// The record as inserted, before any verification outcome.
    pub fn payment(&self) -> &Payment {
        match self {
            PaymentVerification::Settled(p) => p,
            PaymentVerification::Pending { payment, .. } => payment,
        }
    }

    /// Waits for the verification outcome. A rejection comes back as
    /// `AppError::VerificationRejected` carrying the rejected record.
    pub async fn outcome(self) -> Result<Payment, AppError> {
        match self {
            PaymentVerification::Settled(p) => Ok(p),
            PaymentVerification::Pending { handle, .. } => handle
                .await
                .map_err(|e| AppError::InternalWithMsg(format!("Verification task failed: {}", e)))?,
        }
    }
}

fn forward_only<S: Ord + std::fmt::Debug>(what: &str, from: S, to: S) -> Result<(), AppError> {
    if to < from {
        return Err(AppError::Validation(format!("{} status cannot move from {:?} back to {:?}", what, from, to)));
    }
    Ok(())
}

fn paid_amount(payment: &Payment) -> i64 {
    if payment.status == PaymentStatus::Paid { payment.amount } else { 0 }
}

impl DataRepository {
    /// Loads every collection, seeding the mock dataset where nothing is stored.
    pub async fn load(
        store: PersistentStore,
        clock: Arc<dyn Clock>,
        verifier: Arc<dyn VerificationPolicy>,
    ) -> Result<Self, AppError> {
        let now = clock.now();
        let seed = defaults::seed_data(now);

        let data = Collections {
            users: store.load(keys::USERS, seed.users).await?,
            payments: store.load(keys::PAYMENTS, seed.payments).await?,
            complaints: store.load(keys::COMPLAINTS, seed.complaints).await?,
            bookings: store.load(keys::BOOKINGS, seed.bookings).await?,
            messages: store.load(keys::MESSAGES, seed.messages).await?,
            sell_requests: store.load(keys::SELL_REQUESTS, seed.sell_requests).await?,
            sell_request_messages: store.load(keys::SELL_REQUEST_MESSAGES, Vec::new()).await?,
            broadcast_message: store
                .load(keys::BROADCAST, Some(DEFAULT_BROADCAST_MESSAGE.to_string()))
                .await?,
            staff_broadcast_message: store.load(keys::STAFF_BROADCAST, None).await?,
        };

        let credentials = CredentialStore::load(store.clone(), || defaults::seed_credentials(now)).await?;

        info!(
            users = data.users.len(),
            payments = data.payments.len(),
            "Data repository loaded"
        );

        Ok(Self {
            inner: Arc::new(Inner { store, credentials, clock, verifier, data: RwLock::new(data) }),
        })
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    // --- Users ---

    pub async fn users(&self) -> Vec<User> {
        self.inner.data.read().await.users.clone()
    }

    pub async fn find_user(&self, household_id: &str) -> Option<User> {
        self.inner.data.read().await.users.iter().find(|u| u.household_id == household_id).cloned()
    }

    /// Expects an already-normalized identifier.
    pub async fn find_user_by_identifier(&self, identifier: &str) -> Option<User> {
        self.inner.data.read().await.users.iter().find(|u| u.identifier == identifier).cloned()
    }

    pub async fn add_user(&self, user: User) -> Result<User, AppError> {
        let mut data = self.inner.data.write().await;
        if data.users.iter().any(|u| u.household_id == user.household_id) {
            return Err(AppError::DuplicateAccount(format!("Household ID {} is already in use.", user.household_id)));
        }
        if data.users.iter().any(|u| u.identifier == user.identifier) {
            return Err(duplicate_identifier());
        }

        let mut users = data.users.clone();
        users.push(user.clone());
        self.inner.store.save(keys::USERS, &users).await?;
        data.users = users;
        info!("Created user {}", user.household_id);
        Ok(user)
    }

    /// Full-record replace keyed by household id. A changed login identifier
    /// must be unused and carries the user's credential along with it.
    pub async fn update_user(&self, user: User) -> Result<User, AppError> {
        let mut data = self.inner.data.write().await;
        if data.users.iter().any(|u| u.identifier == user.identifier && u.household_id != user.household_id) {
            return Err(duplicate_identifier());
        }

        let mut users = data.users.clone();
        let slot = find_user_mut(&mut users, &user.household_id)?;
        let previous_identifier = std::mem::replace(slot, user.clone()).identifier;

        if previous_identifier == user.identifier {
            self.inner.store.save(keys::USERS, &users).await?;
            data.users = users;
            return Ok(user);
        }

        let mut credentials = self.inner.credentials.lock().await;
        if credentials.iter().any(|c| c.identifier == user.identifier && c.household_id != user.household_id) {
            return Err(duplicate_identifier());
        }
        let rekeyed = rekey_credential(&credentials, &user.household_id, &previous_identifier, &user.identifier);

        let mut batch = WriteBatch::new();
        batch.stage(keys::USERS, &users)?;
        batch.stage(CREDENTIALS_KEY, &rekeyed)?;
        self.inner.store.commit(batch).await?;

        data.users = users;
        *credentials = rekeyed;
        info!(household_id = %user.household_id, "Login identifier changed");
        Ok(user)
    }

    /// Removes the user with their payments, complaints, bookings, received
    /// messages and credential. Either all of it is removed or none of it.
    pub async fn delete_user(&self, household_id: &str) -> Result<(), AppError> {
        let mut data = self.inner.data.write().await;
        data.ensure_user(household_id)?;
        let mut credentials = self.inner.credentials.lock().await;

        let users = retained(&data.users, |u| u.household_id != household_id);
        let payments = retained(&data.payments, |p| p.household_id != household_id);
        let complaints = retained(&data.complaints, |c| c.household_id != household_id);
        let bookings = retained(&data.bookings, |b| b.household_id != household_id);
        let messages = retained(&data.messages, |m| m.recipient_id != household_id);
        let remaining_credentials = drop_household_credentials(&credentials, household_id);

        let mut batch = WriteBatch::new();
        batch.stage(keys::USERS, &users)?;
        batch.stage(keys::PAYMENTS, &payments)?;
        batch.stage(keys::COMPLAINTS, &complaints)?;
        batch.stage(keys::BOOKINGS, &bookings)?;
        batch.stage(keys::MESSAGES, &messages)?;
        batch.stage(CREDENTIALS_KEY, &remaining_credentials)?;
        self.inner.store.commit(batch).await?;

        data.users = users;
        data.payments = payments;
        data.complaints = complaints;
        data.bookings = bookings;
        data.messages = messages;
        *credentials = remaining_credentials;

        info!("Deleted user {} and owned records", household_id);
        Ok(())
    }

    /// The only way out of `warned`. Active users are left as they are.
    pub async fn clear_user_warning(&self, household_id: &str) -> Result<User, AppError> {
        self.modify_user(household_id, |user| {
            if user.status == UserStatus::Warned {
                user.status = UserStatus::Active;
            }
            user.warning_message = None;
        })
        .await
    }

    pub async fn warn_user(&self, household_id: &str, message: &str) -> Result<User, AppError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation("Warning message cannot be empty.".into()));
        }
        self.modify_user(household_id, |user| {
            user.status = UserStatus::Warned;
            user.warning_message = Some(message.to_string());
        })
        .await
    }

    pub async fn set_user_blocked(&self, household_id: &str, blocked: bool) -> Result<User, AppError> {
        let user = self
            .modify_user(household_id, |user| {
                user.status = if blocked { UserStatus::Blocked } else { UserStatus::Active };
            })
            .await?;
        info!(household_id, blocked, "User block state changed");
        Ok(user)
    }

    pub async fn update_user_location(&self, household_id: &str, location: Location) -> Result<User, AppError> {
        self.modify_user(household_id, |user| user.last_location = Some(location)).await
    }

    /// Captain currently on duty, judged by location freshness.
    pub async fn active_captain(&self) -> Option<User> {
        let now = self.inner.clock.now();
        let data = self.inner.data.read().await;
        find_active_captain(&data.users, now).cloned()
    }

    async fn modify_user<F>(&self, household_id: &str, change: F) -> Result<User, AppError>
    where
        F: FnOnce(&mut User),
    {
        let mut data = self.inner.data.write().await;
        let mut users = data.users.clone();
        let user = find_user_mut(&mut users, household_id)?;
        change(user);
        let updated = user.clone();
        self.inner.store.save(keys::USERS, &users).await?;
        data.users = users;
        Ok(updated)
    }

    // --- Payments ---

    pub async fn payments(&self) -> Vec<Payment> {
        self.inner.data.read().await.payments.clone()
    }

    pub async fn payments_for(&self, household_id: &str) -> Vec<Payment> {
        let data = self.inner.data.read().await;
        data.payments.iter().filter(|p| p.household_id == household_id).cloned().collect()
    }

    /// Inserts the payment right away. A pending payment gets one deferred
    /// verification whose outcome is available through the returned handle.
    pub async fn add_payment(&self, payment: Payment) -> Result<PaymentVerification, AppError> {
        if payment.amount <= 0 {
            return Err(AppError::Validation("Payment amount must be greater than zero.".into()));
        }

        {
            let mut data = self.inner.data.write().await;
            data.ensure_user(&payment.household_id)?;
            if data.payments.iter().any(|p| p.id == payment.id) {
                return Err(AppError::Validation(format!("Payment {} already exists", payment.id)));
            }
            let mut payments = data.payments.clone();
            payments.insert(0, payment.clone());
            self.inner.store.save(keys::PAYMENTS, &payments).await?;
            data.payments = payments;
        }

        if payment.status != PaymentStatus::PendingVerification {
            return Ok(PaymentVerification::Settled(payment));
        }

        let repo = self.clone();
        let payment_id = payment.id.clone();
        let span = info_span!("payment_verification", payment_id = %payment_id);
        let handle = tokio::spawn(
            async move {
                tokio::time::sleep(repo.inner.verifier.delay()).await;
                repo.resolve_payment(&payment_id).await
            }
            .instrument(span),
        );

        Ok(PaymentVerification::Pending { payment, handle })
    }

    async fn resolve_payment(&self, payment_id: &str) -> Result<Payment, AppError> {
        let mut data = self.inner.data.write().await;
        let idx = data
            .payments
            .iter()
            .position(|p| p.id == payment_id)
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment_id)))?;

        // Settled by an admin in the meantime.
        match data.payments[idx].status {
            PaymentStatus::Paid => return Ok(data.payments[idx].clone()),
            PaymentStatus::Rejected => {
                return Err(AppError::VerificationRejected(Box::new(data.payments[idx].clone())));
            }
            PaymentStatus::PendingVerification => {}
        }

        let mut payments = data.payments.clone();
        let outcome = self.inner.verifier.verify(&payments[idx]);
        match outcome {
            VerificationOutcome::Approved => {
                payments[idx].status = PaymentStatus::Paid;
                let paid = payments[idx].clone();
                let mut users = data.users.clone();
                match find_user_mut(&mut users, &paid.household_id) {
                    Ok(owner) => owner.outstanding_balance -= paid.amount,
                    Err(_) => warn!("Owner {} of payment {} no longer exists", paid.household_id, paid.id),
                }

                let mut batch = WriteBatch::new();
                batch.stage(keys::PAYMENTS, &payments)?;
                batch.stage(keys::USERS, &users)?;
                self.inner.store.commit(batch).await?;
                data.payments = payments;
                data.users = users;
                info!(amount = paid.amount, "Payment verified");
                Ok(paid)
            }
            VerificationOutcome::Rejected { reason } => {
                payments[idx].status = PaymentStatus::Rejected;
                payments[idx].rejection_reason = Some(reason);
                let rejected = payments[idx].clone();
                self.inner.store.save(keys::PAYMENTS, &payments).await?;
                data.payments = payments;
                info!("Payment rejected");
                Err(AppError::VerificationRejected(Box::new(rejected)))
            }
        }
    }

    /// Admin override. Balances follow the change in what counts as paid.
    pub async fn update_payment(&self, payment: Payment) -> Result<Payment, AppError> {
        let mut data = self.inner.data.write().await;
        let idx = data
            .payments
            .iter()
            .position(|p| p.id == payment.id)
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found", payment.id)))?;
        data.ensure_user(&payment.household_id)?;

        let mut payments = data.payments.clone();
        let previous = std::mem::replace(&mut payments[idx], payment.clone());
        let restored = paid_amount(&previous);
        let charged = paid_amount(&payment);

        let mut batch = WriteBatch::new();
        batch.stage(keys::PAYMENTS, &payments)?;
        let users = if restored != 0 || charged != 0 {
            let mut users = data.users.clone();
            if restored != 0 && let Ok(owner) = find_user_mut(&mut users, &previous.household_id) {
                owner.outstanding_balance += restored;
            }
            find_user_mut(&mut users, &payment.household_id)?.outstanding_balance -= charged;
            batch.stage(keys::USERS, &users)?;
            Some(users)
        } else {
            None
        };
        self.inner.store.commit(batch).await?;

        data.payments = payments;
        if let Some(users) = users {
            data.users = users;
        }
        info!("Payment {} overridden to {:?}", payment.id, payment.status);
        Ok(payment)
    }

    // --- Complaints ---

    pub async fn complaints(&self) -> Vec<Complaint> {
        self.inner.data.read().await.complaints.clone()
    }

    pub async fn complaints_for(&self, household_id: &str) -> Vec<Complaint> {
        let data = self.inner.data.read().await;
        data.complaints.iter().filter(|c| c.household_id == household_id).cloned().collect()
    }

    pub async fn add_complaint(&self, complaint: Complaint) -> Result<Complaint, AppError> {
        let mut data = self.inner.data.write().await;
        data.ensure_user(&complaint.household_id)?;
        if data.complaints.iter().any(|c| c.id == complaint.id) {
            return Err(AppError::Validation(format!("Complaint {} already exists", complaint.id)));
        }
        let mut complaints = data.complaints.clone();
        complaints.insert(0, complaint.clone());
        self.inner.store.save(keys::COMPLAINTS, &complaints).await?;
        data.complaints = complaints;
        Ok(complaint)
    }

    pub async fn update_complaint(&self, complaint: Complaint) -> Result<Complaint, AppError> {
        let mut data = self.inner.data.write().await;
        let mut complaints = data.complaints.clone();
        let slot = complaints
            .iter_mut()
            .find(|c| c.id == complaint.id)
            .ok_or_else(|| AppError::NotFound(format!("Complaint {} not found", complaint.id)))?;
        forward_only("Complaint", slot.status, complaint.status)?;
        *slot = complaint.clone();
        self.inner.store.save(keys::COMPLAINTS, &complaints).await?;
        data.complaints = complaints;
        Ok(complaint)
    }

    // --- Bookings ---

    pub async fn bookings(&self) -> Vec<Booking> {
        self.inner.data.read().await.bookings.clone()
    }

    pub async fn bookings_for(&self, household_id: &str) -> Vec<Booking> {
        let data = self.inner.data.read().await;
        data.bookings.iter().filter(|b| b.household_id == household_id).cloned().collect()
    }

    /// Inserts the booking and charges its fee to the owner. A booking id is
    /// only ever inserted, and charged, once.
    pub async fn add_booking(&self, booking: Booking) -> Result<Booking, AppError> {
        let mut data = self.inner.data.write().await;
        data.ensure_user(&booking.household_id)?;
        if data.bookings.iter().any(|b| b.id == booking.id) {
            return Err(AppError::Validation(format!("Booking {} already exists", booking.id)));
        }

        let mut bookings = data.bookings.clone();
        bookings.insert(0, booking.clone());
        let mut batch = WriteBatch::new();
        batch.stage(keys::BOOKINGS, &bookings)?;

        let users = match booking.chargeable_fee() {
            Some(fee) => {
                let mut users = data.users.clone();
                find_user_mut(&mut users, &booking.household_id)?.outstanding_balance += fee;
                batch.stage(keys::USERS, &users)?;
                Some(users)
            }
            None => None,
        };
        self.inner.store.commit(batch).await?;

        data.bookings = bookings;
        if let Some(users) = users {
            data.users = users;
        }
        Ok(booking)
    }

    /// Full replace. Fees are never re-applied here.
    pub async fn update_booking(&self, booking: Booking) -> Result<Booking, AppError> {
        let mut data = self.inner.data.write().await;
        let mut bookings = data.bookings.clone();
        let slot = bookings
            .iter_mut()
            .find(|b| b.id == booking.id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking.id)))?;
        forward_only("Booking", slot.status, booking.status)?;
        *slot = booking.clone();
        self.inner.store.save(keys::BOOKINGS, &bookings).await?;
        data.bookings = bookings;
        Ok(booking)
    }

    /// Scheduled booking dated the day after `today`, if the user wants reminders.
    pub async fn upcoming_booking_reminder(&self, household_id: &str, today: NaiveDate) -> Option<Booking> {
        let tomorrow = today.checked_add_days(Days::new(1))?;
        let data = self.inner.data.read().await;
        let user = data.users.iter().find(|u| u.household_id == household_id)?;
        if !user.booking_reminders {
            return None;
        }
        data.bookings
            .iter()
            .find(|b| b.household_id == household_id && b.date == tomorrow && b.status == BookingStatus::Scheduled)
            .cloned()
    }

    // --- Sell requests ---

    pub async fn sell_requests(&self) -> Vec<SellRequest> {
        self.inner.data.read().await.sell_requests.clone()
    }

    pub async fn sell_requests_for(&self, household_id: &str) -> Vec<SellRequest> {
        let data = self.inner.data.read().await;
        data.sell_requests.iter().filter(|r| r.household_id == household_id).cloned().collect()
    }

    pub async fn add_sell_request(&self, request: SellRequest) -> Result<SellRequest, AppError> {
        if request.materials.is_empty() || request.weight_kg.is_nan() || request.weight_kg <= 0.0 {
            return Err(AppError::Validation("Please select at least one material and enter the weight.".into()));
        }

        let mut data = self.inner.data.write().await;
        data.ensure_user(&request.household_id)?;
        if data.sell_requests.iter().any(|r| r.id == request.id) {
            return Err(AppError::Validation(format!("Sell request {} already exists", request.id)));
        }
        let mut sell_requests = data.sell_requests.clone();
        sell_requests.insert(0, request.clone());
        self.inner.store.save(keys::SELL_REQUESTS, &sell_requests).await?;
        data.sell_requests = sell_requests;
        info!("Sell request {} submitted by {}", request.id, request.household_id);
        Ok(request)
    }

    pub async fn update_sell_request_status(
        &self,
        request_id: &str,
        status: SellRequestStatus,
    ) -> Result<SellRequest, AppError> {
        let mut data = self.inner.data.write().await;
        let mut sell_requests = data.sell_requests.clone();
        let request = sell_requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or_else(|| AppError::NotFound(format!("Sell request {} not found", request_id)))?;
        forward_only("Sell request", request.status, status)?;
        request.status = status;
        let updated = request.clone();
        self.inner.store.save(keys::SELL_REQUESTS, &sell_requests).await?;
        data.sell_requests = sell_requests;
        Ok(updated)
    }

    pub async fn add_sell_request_message(
        &self,
        request_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<SellRequestMessage, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message cannot be empty.".into()));
        }

        let mut data = self.inner.data.write().await;
        if !data.sell_requests.iter().any(|r| r.id == request_id) {
            return Err(AppError::NotFound(format!("Sell request {} not found", request_id)));
        }
        let message = SellRequestMessage {
            id: uuid::Uuid::new_v4().to_string(),
            sell_request_id: request_id.to_string(),
            sender_id: sender_id.to_string(),
            text: text.to_string(),
            timestamp: self.inner.clock.now(),
        };
        let mut thread = data.sell_request_messages.clone();
        thread.push(message.clone());
        self.inner.store.save(keys::SELL_REQUEST_MESSAGES, &thread).await?;
        data.sell_request_messages = thread;
        Ok(message)
    }

    /// Chat thread for one sell request, oldest first.
    pub async fn sell_request_messages(&self, request_id: &str) -> Vec<SellRequestMessage> {
        let data = self.inner.data.read().await;
        data.sell_request_messages.iter().filter(|m| m.sell_request_id == request_id).cloned().collect()
    }

    // --- Messages & notices ---

    pub async fn messages_for(&self, household_id: &str) -> Vec<Message> {
        let data = self.inner.data.read().await;
        data.messages.iter().filter(|m| m.recipient_id == household_id).cloned().collect()
    }

    pub async fn add_message(&self, recipient_id: &str, text: &str) -> Result<Message, AppError> {
        let message = Message::new(recipient_id.to_string(), text.to_string(), self.inner.clock.now());
        let mut data = self.inner.data.write().await;
        let mut messages = data.messages.clone();
        messages.insert(0, message.clone());
        self.inner.store.save(keys::MESSAGES, &messages).await?;
        data.messages = messages;
        Ok(message)
    }

    /// Idempotent. Returns how many messages flipped to read.
    pub async fn mark_messages_as_read(&self, household_id: &str) -> Result<usize, AppError> {
        let mut data = self.inner.data.write().await;
        let mut messages = data.messages.clone();
        let mut changed = 0;
        for message in messages.iter_mut().filter(|m| m.recipient_id == household_id && !m.read) {
            message.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.inner.store.save(keys::MESSAGES, &messages).await?;
            data.messages = messages;
        }
        Ok(changed)
    }

    pub async fn broadcast_message(&self) -> Option<String> {
        self.inner.data.read().await.broadcast_message.clone()
    }

    pub async fn update_broadcast_message(&self, message: Option<String>) -> Result<(), AppError> {
        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let mut data = self.inner.data.write().await;
        self.inner.store.save(keys::BROADCAST, &message).await?;
        data.broadcast_message = message;
        Ok(())
    }

    pub async fn staff_broadcast_message(&self) -> Option<String> {
        self.inner.data.read().await.staff_broadcast_message.clone()
    }

    pub async fn update_staff_broadcast_message(&self, message: Option<String>) -> Result<(), AppError> {
        let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
        let mut data = self.inner.data.write().await;
        self.inner.store.save(keys::STAFF_BROADCAST, &message).await?;
        data.staff_broadcast_message = message;
        Ok(())
    }
}

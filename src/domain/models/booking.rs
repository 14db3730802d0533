use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    Morning,
    Afternoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WasteType {
    #[serde(rename = "Event Waste")]
    EventWaste,
    #[serde(rename = "Bulk Household")]
    BulkHousehold,
    #[serde(rename = "Garden Waste")]
    GardenWaste,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookingStatus {
    Scheduled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub household_id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub waste_type: WasteType,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_fee: Option<i64>,
}

pub struct NewBookingParams {
    pub household_id: String,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub waste_type: WasteType,
    pub notes: Option<String>,
    pub attendee_count: Option<u32>,
    pub booking_fee: Option<i64>,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            household_id: params.household_id,
            date: params.date,
            time_slot: params.time_slot,
            waste_type: params.waste_type,
            status: BookingStatus::Scheduled,
            notes: params.notes,
            attendee_count: params.attendee_count,
            booking_fee: params.booking_fee,
        }
    }

    /// Fee charged to the owner at creation, if any.
    pub fn chargeable_fee(&self) -> Option<i64> {
        self.booking_fee.filter(|fee| *fee > 0)
    }
}

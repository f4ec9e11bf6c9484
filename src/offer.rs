// Wire model for the Duffel flight search API (v2).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Cabin classes accepted by the provider. Serialized with the provider's
// snake_case names in request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    // Human-readable label for reports and alert messages.
    pub fn label(&self) -> &'static str {
        match self {
            CabinClass::Economy => "Economy",
            CabinClass::PremiumEconomy => "Premium Economy",
            CabinClass::Business => "Business",
            CabinClass::First => "First",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug)]
#[error("unknown cabin class: {0}")]
pub struct ParseCabinError(String);

impl FromStr for CabinClass {
    type Err = ParseCabinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "economy" => Ok(CabinClass::Economy),
            "premium_economy" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            other => Err(ParseCabinError(other.to_string())),
        }
    }
}

// Request body for POST /air/offer_requests.
#[derive(Debug, Serialize)]
pub struct OfferRequestBody {
    pub data: OfferRequestData,
}

#[derive(Debug, Serialize)]
pub struct OfferRequestData {
    pub slices: Vec<SliceRequest>,
    pub passengers: Vec<Passenger>,
    pub cabin_class: CabinClass,
}

#[derive(Debug, Serialize)]
pub struct SliceRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct Passenger {
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
}

impl OfferRequestBody {
    // One-way search for a single adult in the given cabin.
    pub fn one_way(origin: &str, destination: &str, date: NaiveDate, cabin: CabinClass) -> Self {
        Self {
            data: OfferRequestData {
                slices: vec![SliceRequest {
                    origin: origin.to_string(),
                    destination: destination.to_string(),
                    departure_date: date,
                }],
                passengers: vec![Passenger {
                    passenger_type: PassengerType::Adult,
                }],
                cabin_class: cabin,
            },
        }
    }
}

// Response envelope for POST /air/offer_requests.
#[derive(Debug, Deserialize)]
pub struct CreatedOfferRequest {
    pub data: OfferRequestRef,
}

#[derive(Debug, Deserialize)]
pub struct OfferRequestRef {
    pub id: String,
}

// Response envelope for GET /air/offers.
#[derive(Debug, Deserialize)]
pub struct OfferList {
    pub data: Vec<Offer>,
}

// A priced, bookable itinerary proposal. Amounts arrive as decimal strings
// on the wire; `total_currency` is an ISO currency code.
#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Offer {
    pub id: String,
    pub total_amount: String,
    pub total_currency: String,
    pub slices: Vec<Slice>,
}

impl Offer {
    // Connections in the first slice: segment count minus one. A one-way
    // offer carries exactly one slice.
    pub fn stops(&self) -> u32 {
        self.slices
            .first()
            .map(|s| s.segments.len().saturating_sub(1))
            .unwrap_or(0) as u32
    }
}

// One directional portion of an itinerary, composed of one or more segments.
#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Slice {
    pub duration: Option<String>,
    pub segments: Vec<Segment>,
}

// A single flight number's travel between two airports.
#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Segment {
    pub origin: Airport,
    pub destination: Airport,
    pub departing_at: String,
    pub arriving_at: String,
    pub marketing_carrier: Option<Carrier>,
    pub marketing_flight_number: Option<String>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Airport {
    pub iata_code: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Carrier {
    pub name: Option<String>,
    pub iata_code: Option<String>,
}

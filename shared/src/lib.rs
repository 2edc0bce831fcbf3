use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a trip's viatic balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceType {
    /// Balance > 0: the driver owes money back to the company
    AFavor,
    /// Balance < 0: the company owes the driver
    EnContra,
    /// Balance == 0
    Neutro,
}

impl BalanceType {
    /// Storage representation (matches the persisted TEXT column)
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceType::AFavor => "A_FAVOR",
            BalanceType::EnContra => "EN_CONTRA",
            BalanceType::Neutro => "NEUTRO",
        }
    }

    /// Parse the storage representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A_FAVOR" => Some(BalanceType::AFavor),
            "EN_CONTRA" => Some(BalanceType::EnContra),
            "NEUTRO" => Some(BalanceType::Neutro),
            _ => None,
        }
    }

    /// Human-readable label used in the share summary
    pub fn label(&self) -> &'static str {
        match self {
            BalanceType::AFavor => "A favor",
            BalanceType::EnContra => "En contra",
            BalanceType::Neutro => "Neutro",
        }
    }
}

impl fmt::Display for BalanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a trip. Closing is a one-way toggle at the edit
/// surface; storage itself never rejects writes to a closed trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Abierto,
    Cerrado,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Abierto => "ABIERTO",
            TripStatus::Cerrado => "CERRADO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ABIERTO" => Some(TripStatus::Abierto),
            "CERRADO" => Some(TripStatus::Cerrado),
            _ => None,
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted trip record (the aggregate root).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Auto-assigned row id; None until first persisted
    pub id: Option<i64>,
    /// Business key (dispatch/manifest code), unique across all trips
    pub gret_number: String,
    pub driver_name: String,
    pub truck_plate: String,
    /// ISO calendar date (YYYY-MM-DD)
    pub date_start: String,
    /// Optional end date; None while the trip is still open-ended
    pub date_end: Option<String>,
    /// Travel allowance handed to the driver
    pub viatic_amount: f64,
    pub loading_cost: f64,
    pub unloading_cost: f64,
    pub weighing_cost: f64,
    pub parking_cost: f64,
    pub tolls_cost: f64,
    pub taxi_cost: f64,
    pub washing_cost: f64,
    pub copies_cost: f64,
    pub helper_cost: f64,
    pub security_cost: f64,
    pub other_cost: f64,
    /// Free-text detail for the "other" cost
    pub other_description: Option<String>,
    /// Cached totals, recomputed on every save for fast listing
    pub total_expenses: f64,
    pub total_fuel_calculated: f64,
    pub total_fuel_real: f64,
    pub balance: f64,
    pub balance_type: BalanceType,
    pub status: TripStatus,
    /// Epoch millis, immutable once set
    pub created_at: i64,
    /// Epoch millis, refreshed on every write
    pub updated_at: i64,
}

/// One fuel purchase owned by exactly one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEntry {
    /// Auto-assigned row id; None until persisted
    pub id: Option<i64>,
    pub trip_id: i64,
    /// Optional purchase date (YYYY-MM-DD)
    pub fuel_date: Option<String>,
    pub gallons: f64,
    pub price_per_gallon: f64,
    /// Derived: gallons * price_per_gallon
    pub calculated_amount: f64,
    /// Amount actually paid, entered independently
    pub real_paid_amount: f64,
}

/// A trip joined with its full fuel-entry set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripWithFuel {
    pub trip: Trip,
    pub fuel_entries: Vec<FuelEntry>,
}

/// One fuel row of the trip form. Numeric fields stay as the user typed
/// them; only the derived amount is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelEntryForm {
    pub fuel_date: String,
    pub gallons: String,
    pub price_per_gallon: String,
    pub calculated_amount: f64,
    pub real_paid_amount: String,
}

impl Default for FuelEntryForm {
    fn default() -> Self {
        Self {
            fuel_date: String::new(),
            gallons: "0".to_string(),
            price_per_gallon: "0".to_string(),
            calculated_amount: 0.0,
            real_paid_amount: "0".to_string(),
        }
    }
}

/// Full state of the trip form. Every user-editable numeric field is a
/// string so the live recalculation can stay lenient while save-time
/// validation stays strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripForm {
    pub id: Option<i64>,
    pub driver_name: String,
    pub truck_plate: String,
    pub gret_number: String,
    pub date_start: String,
    pub date_end: String,
    pub status: TripStatus,
    pub viatic_amount: String,
    pub loading_cost: String,
    pub unloading_cost: String,
    pub weighing_cost: String,
    pub parking_cost: String,
    pub tolls_cost: String,
    pub taxi_cost: String,
    pub washing_cost: String,
    pub copies_cost: String,
    pub helper_cost: String,
    pub security_cost: String,
    pub other_cost: String,
    pub other_description: String,
    pub fuel_entries: Vec<FuelEntryForm>,
    /// Derived totals, rewritten by every recalculation
    pub total_expenses: f64,
    pub total_fuel_calculated: f64,
    pub total_fuel_real: f64,
    pub balance: f64,
    pub balance_type: BalanceType,
    /// Write driver defaults to preferences after a successful save
    pub remember_defaults: bool,
    /// True when the trip is CERRADO; advisory for the edit surface
    pub is_read_only: bool,
    pub created_at: Option<i64>,
}

impl Default for TripForm {
    fn default() -> Self {
        Self {
            id: None,
            driver_name: String::new(),
            truck_plate: String::new(),
            gret_number: String::new(),
            date_start: String::new(),
            date_end: String::new(),
            status: TripStatus::Abierto,
            viatic_amount: "0".to_string(),
            loading_cost: "0".to_string(),
            unloading_cost: "0".to_string(),
            weighing_cost: "0".to_string(),
            parking_cost: "0".to_string(),
            tolls_cost: "0".to_string(),
            taxi_cost: "0".to_string(),
            washing_cost: "0".to_string(),
            copies_cost: "0".to_string(),
            helper_cost: "0".to_string(),
            security_cost: "0".to_string(),
            other_cost: "0".to_string(),
            other_description: String::new(),
            fuel_entries: Vec::new(),
            total_expenses: 0.0,
            total_fuel_calculated: 0.0,
            total_fuel_real: 0.0,
            balance: 0.0,
            balance_type: BalanceType::Neutro,
            remember_defaults: true,
            is_read_only: false,
            created_at: None,
        }
    }
}

/// Why a save attempt was rejected before touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripValidationError {
    /// Driver name, truck plate, GRET number or start date is blank
    MissingRequiredFields,
    /// Start date unparseable, end date unparseable, or end before start
    InvalidDates,
    /// Some cost or fuel field parses to a negative number
    NegativeValues,
}

/// Outcome of the save state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SaveTripOutcome {
    /// Persisted; for a new trip this carries the freshly assigned id
    Saved { trip_id: i64 },
    /// Another trip already owns this GRET number; nothing was persisted.
    /// The caller should redirect the user to the existing trip.
    DuplicateGret { existing_trip_id: i64 },
    /// Validation failed; nothing was persisted
    Rejected { error: TripValidationError },
}

/// Remembered driver defaults for pre-filling a new trip form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverDefaults {
    pub driver_name: String,
    pub truck_plate: String,
}

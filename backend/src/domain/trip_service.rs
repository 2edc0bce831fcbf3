//! Save/delete orchestration for trips.
//!
//! The save operation is a small state machine: required fields, then
//! dates, then the strict negative scan, then the duplicate-key check, and
//! only then one atomic write. Rejections and duplicates are values, not
//! errors; only storage failures surface as errors.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use shared::{
    DriverDefaults, FuelEntry, SaveTripOutcome, Trip, TripForm, TripValidationError,
};

use crate::domain::calculation::{self, FuelFigures};
use crate::domain::{dates, money, trip_form};
use crate::storage::{PreferenceStorage, TripStorage};

#[derive(Clone)]
pub struct TripService {
    trips: Arc<dyn TripStorage>,
    preferences: Arc<dyn PreferenceStorage>,
}

impl TripService {
    pub fn new(trips: Arc<dyn TripStorage>, preferences: Arc<dyn PreferenceStorage>) -> Self {
        Self { trips, preferences }
    }

    /// Form for a brand-new trip, pre-filled with the remembered driver
    /// defaults.
    pub async fn new_trip_form(&self) -> TripForm {
        let defaults = self.preferences.driver_defaults().await;
        trip_form::update_field(trip_form::new_form(), |form| {
            form.driver_name = defaults.driver_name;
            form.truck_plate = defaults.truck_plate;
        })
    }

    /// Load an existing trip into a form, or None when it no longer exists.
    pub async fn load_trip_form(&self, trip_id: i64) -> Result<Option<TripForm>> {
        let record = self.trips.get_trip_by_id(trip_id).await?;
        Ok(record.map(|record| trip_form::form_from_trip(&record)))
    }

    /// Run the save state machine over the current form state.
    pub async fn save_trip(&self, form: &TripForm) -> Result<SaveTripOutcome> {
        if has_blank_required_fields(form) {
            return Ok(SaveTripOutcome::Rejected {
                error: TripValidationError::MissingRequiredFields,
            });
        }
        if !dates::validate_date_range(&form.date_start, &form.date_end) {
            return Ok(SaveTripOutcome::Rejected {
                error: TripValidationError::InvalidDates,
            });
        }
        if has_negative_values(form) {
            return Ok(SaveTripOutcome::Rejected {
                error: TripValidationError::NegativeValues,
            });
        }

        // A different trip already owning this GRET number is a redirect,
        // not an error; saving a trip over itself passes through
        if let Some(existing) = self.trips.get_trip_by_gret(&form.gret_number).await? {
            if existing.id != form.id {
                if let Some(existing_trip_id) = existing.id {
                    info!(
                        gret = %form.gret_number,
                        existing_trip_id,
                        "duplicate gret number, redirecting"
                    );
                    return Ok(SaveTripOutcome::DuplicateGret { existing_trip_id });
                }
            }
        }

        let now = Utc::now().timestamp_millis();
        let trip = build_trip_record(form, now);
        let fuel_entries = build_fuel_records(form);

        let trip_id = match form.id {
            None => {
                self.trips
                    .insert_trip_with_fuel(&trip, &fuel_entries)
                    .await?
            }
            Some(trip_id) => {
                self.trips
                    .update_trip_with_fuel(&trip, &fuel_entries)
                    .await?;
                trip_id
            }
        };
        info!(trip_id, gret = %trip.gret_number, "trip saved");

        if form.remember_defaults {
            let defaults = DriverDefaults {
                driver_name: form.driver_name.clone(),
                truck_plate: form.truck_plate.clone(),
            };
            // Best effort only; the save already succeeded
            if let Err(error) = self.preferences.save_driver_defaults(&defaults).await {
                warn!(%error, "failed to remember driver defaults");
            }
        }

        Ok(SaveTripOutcome::Saved { trip_id })
    }

    /// Delete a trip and its fuel entries. An absent trip is a no-op
    /// returning false.
    pub async fn delete_trip(&self, trip_id: i64) -> Result<bool> {
        if self.trips.get_trip_by_id(trip_id).await?.is_none() {
            return Ok(false);
        }
        self.trips.delete_trip(trip_id).await?;
        info!(trip_id, "trip deleted");
        Ok(true)
    }
}

/// One short user-facing message per rejection.
pub fn validation_message(error: TripValidationError) -> &'static str {
    match error {
        TripValidationError::MissingRequiredFields => "Completa los datos obligatorios",
        TripValidationError::InvalidDates => "Verifica las fechas (formato YYYY-MM-DD)",
        TripValidationError::NegativeValues => "No se permiten montos negativos",
    }
}

/// Confirmation shown after a successful save.
pub fn save_confirmation_message() -> &'static str {
    "Viaje guardado correctamente"
}

fn has_blank_required_fields(form: &TripForm) -> bool {
    form.driver_name.trim().is_empty()
        || form.truck_plate.trim().is_empty()
        || form.gret_number.trim().is_empty()
        || form.date_start.trim().is_empty()
}

fn has_negative_values(form: &TripForm) -> bool {
    let amounts = [
        &form.viatic_amount,
        &form.loading_cost,
        &form.unloading_cost,
        &form.weighing_cost,
        &form.parking_cost,
        &form.tolls_cost,
        &form.taxi_cost,
        &form.washing_cost,
        &form.copies_cost,
        &form.helper_cost,
        &form.security_cost,
        &form.other_cost,
    ];
    if amounts.iter().any(|value| money::is_negative(value)) {
        return true;
    }
    form.fuel_entries.iter().any(|entry| {
        money::is_negative(&entry.gallons)
            || money::is_negative(&entry.price_per_gallon)
            || money::is_negative(&entry.real_paid_amount)
    })
}

/// Build the persisted trip from the form, recomputing every derived total
/// from scratch rather than trusting the form's cached figures.
fn build_trip_record(form: &TripForm, now: i64) -> Trip {
    let costs = trip_form::cost_breakdown(form);
    let fuel: Vec<FuelFigures> = form.fuel_entries.iter().map(trip_form::fuel_figures).collect();
    let totals = calculation::compute_totals(&costs, &fuel);

    Trip {
        id: form.id,
        gret_number: form.gret_number.clone(),
        driver_name: form.driver_name.clone(),
        truck_plate: form.truck_plate.clone(),
        date_start: form.date_start.clone(),
        date_end: blank_to_none(&form.date_end),
        viatic_amount: costs.viatic,
        loading_cost: costs.loading,
        unloading_cost: costs.unloading,
        weighing_cost: costs.weighing,
        parking_cost: costs.parking,
        tolls_cost: costs.tolls,
        taxi_cost: costs.taxi,
        washing_cost: costs.washing,
        copies_cost: costs.copies,
        helper_cost: costs.helper,
        security_cost: costs.security,
        other_cost: costs.other,
        other_description: blank_to_none(&form.other_description),
        total_expenses: totals.total_expenses,
        total_fuel_calculated: totals.fuel_calculated,
        total_fuel_real: totals.fuel_real,
        balance: totals.balance,
        balance_type: totals.balance_type,
        status: form.status,
        created_at: form.created_at.unwrap_or(now),
        updated_at: now,
    }
}

fn build_fuel_records(form: &TripForm) -> Vec<FuelEntry> {
    form.fuel_entries
        .iter()
        .map(|entry| {
            let figures = trip_form::fuel_figures(entry);
            FuelEntry {
                id: None,
                // The repository stamps the real owner id inside the write
                // transaction
                trip_id: form.id.unwrap_or(0),
                fuel_date: blank_to_none(&entry.fuel_date),
                gallons: figures.gallons,
                price_per_gallon: figures.price_per_gallon,
                calculated_amount: figures.calculated_amount(),
                real_paid_amount: figures.real_paid,
            }
        })
        .collect()
}

fn blank_to_none(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

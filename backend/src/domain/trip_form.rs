//! Trip form state transitions.
//!
//! The form is treated as an immutable value: each edit takes the old state
//! and returns a new one, and every transition ends in a full recalculation
//! of the derived totals. Nothing here touches storage.

use shared::{FuelEntryForm, TripForm, TripStatus, TripWithFuel};

use crate::domain::calculation::{self, CostBreakdown, FuelFigures};
use crate::domain::money;

/// Blank form for a new trip: zeroed cost fields and exactly one empty
/// fuel row.
pub fn new_form() -> TripForm {
    let form = TripForm {
        fuel_entries: vec![FuelEntryForm::default()],
        ..TripForm::default()
    };
    recalculate(form)
}

/// Populate a form from a persisted aggregate. An empty persisted fuel set
/// still yields one blank row so the edit surface always has a line to
/// type into.
pub fn form_from_trip(record: &TripWithFuel) -> TripForm {
    let trip = &record.trip;
    let mut fuel_entries: Vec<FuelEntryForm> = record
        .fuel_entries
        .iter()
        .map(|entry| FuelEntryForm {
            fuel_date: entry.fuel_date.clone().unwrap_or_default(),
            gallons: entry.gallons.to_string(),
            price_per_gallon: entry.price_per_gallon.to_string(),
            calculated_amount: entry.calculated_amount,
            real_paid_amount: entry.real_paid_amount.to_string(),
        })
        .collect();
    if fuel_entries.is_empty() {
        fuel_entries.push(FuelEntryForm::default());
    }

    TripForm {
        id: trip.id,
        driver_name: trip.driver_name.clone(),
        truck_plate: trip.truck_plate.clone(),
        gret_number: trip.gret_number.clone(),
        date_start: trip.date_start.clone(),
        date_end: trip.date_end.clone().unwrap_or_default(),
        status: trip.status,
        viatic_amount: trip.viatic_amount.to_string(),
        loading_cost: trip.loading_cost.to_string(),
        unloading_cost: trip.unloading_cost.to_string(),
        weighing_cost: trip.weighing_cost.to_string(),
        parking_cost: trip.parking_cost.to_string(),
        tolls_cost: trip.tolls_cost.to_string(),
        taxi_cost: trip.taxi_cost.to_string(),
        washing_cost: trip.washing_cost.to_string(),
        copies_cost: trip.copies_cost.to_string(),
        helper_cost: trip.helper_cost.to_string(),
        security_cost: trip.security_cost.to_string(),
        other_cost: trip.other_cost.to_string(),
        other_description: trip.other_description.clone().unwrap_or_default(),
        fuel_entries,
        total_expenses: trip.total_expenses,
        total_fuel_calculated: trip.total_fuel_calculated,
        total_fuel_real: trip.total_fuel_real,
        balance: trip.balance,
        balance_type: trip.balance_type,
        remember_defaults: false,
        is_read_only: trip.status == TripStatus::Cerrado,
        created_at: Some(trip.created_at),
    }
}

/// Apply an edit to the top-level fields, then recalculate.
pub fn update_field(mut form: TripForm, edit: impl FnOnce(&mut TripForm)) -> TripForm {
    edit(&mut form);
    recalculate(form)
}

/// Apply an edit to one fuel row, then recalculate. An out-of-range index
/// leaves the form unchanged.
pub fn update_fuel_entry(
    mut form: TripForm,
    index: usize,
    edit: impl FnOnce(&mut FuelEntryForm),
) -> TripForm {
    match form.fuel_entries.get_mut(index) {
        Some(entry) => {
            edit(entry);
            recalculate(form)
        }
        None => form,
    }
}

/// Append a blank fuel row.
pub fn add_fuel_entry(mut form: TripForm) -> TripForm {
    form.fuel_entries.push(FuelEntryForm::default());
    recalculate(form)
}

/// Remove one fuel row. The last remaining row always stays.
pub fn remove_fuel_entry(mut form: TripForm, index: usize) -> TripForm {
    if form.fuel_entries.len() > 1 && index < form.fuel_entries.len() {
        form.fuel_entries.remove(index);
        return recalculate(form);
    }
    form
}

/// Rewrite all five derived totals and each fuel row's calculated amount
/// from the current field text, using the lenient parser throughout.
pub fn recalculate(mut form: TripForm) -> TripForm {
    let costs = cost_breakdown(&form);
    let fuel: Vec<FuelFigures> = form.fuel_entries.iter().map(fuel_figures).collect();
    let totals = calculation::compute_totals(&costs, &fuel);

    for (entry, figures) in form.fuel_entries.iter_mut().zip(&fuel) {
        entry.calculated_amount = figures.calculated_amount();
    }
    form.total_expenses = totals.total_expenses;
    form.total_fuel_calculated = totals.fuel_calculated;
    form.total_fuel_real = totals.fuel_real;
    form.balance = totals.balance;
    form.balance_type = totals.balance_type;
    form
}

pub(crate) fn cost_breakdown(form: &TripForm) -> CostBreakdown {
    CostBreakdown {
        viatic: money::lenient_amount(&form.viatic_amount),
        loading: money::lenient_amount(&form.loading_cost),
        unloading: money::lenient_amount(&form.unloading_cost),
        weighing: money::lenient_amount(&form.weighing_cost),
        parking: money::lenient_amount(&form.parking_cost),
        tolls: money::lenient_amount(&form.tolls_cost),
        taxi: money::lenient_amount(&form.taxi_cost),
        washing: money::lenient_amount(&form.washing_cost),
        copies: money::lenient_amount(&form.copies_cost),
        helper: money::lenient_amount(&form.helper_cost),
        security: money::lenient_amount(&form.security_cost),
        other: money::lenient_amount(&form.other_cost),
    }
}

pub(crate) fn fuel_figures(entry: &FuelEntryForm) -> FuelFigures {
    FuelFigures {
        gallons: money::lenient_amount(&entry.gallons),
        price_per_gallon: money::lenient_amount(&entry.price_per_gallon),
        real_paid: money::lenient_amount(&entry.real_paid_amount),
    }
}

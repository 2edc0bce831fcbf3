//! Plain-text trip summary for sharing over messaging apps.

use shared::TripForm;

use crate::domain::calculation::{self, FuelFigures};
use crate::domain::trip_form;

const MISSING: &str = "N/D";

/// Render the form as the shareable Spanish summary. Entered amounts are
/// echoed as typed; derived totals are recomputed here and formatted to
/// two decimals.
pub fn build_share_text(form: &TripForm) -> String {
    let costs = trip_form::cost_breakdown(form);
    let fuel: Vec<FuelFigures> = form.fuel_entries.iter().map(trip_form::fuel_figures).collect();
    let totals = calculation::compute_totals(&costs, &fuel);

    let mut text = String::new();
    text.push_str("EUZIN INTERNACIONAL S.A.C. – Detalle de viaje\n");
    text.push('\n');
    text.push_str(&format!("Conductor: {}\n", form.driver_name));
    text.push_str(&format!("Placa: {}\n", form.truck_plate));
    text.push_str(&format!("GRET: {}\n", form.gret_number));
    text.push_str(&format!("Fecha inicio: {}\n", or_missing(&form.date_start)));
    text.push_str(&format!("Fecha fin: {}\n", or_missing(&form.date_end)));
    text.push('\n');
    text.push_str(&format!("Viáticos entregados: S/ {}\n", form.viatic_amount));
    text.push('\n');

    text.push_str("Gastos:\n");
    let cost_lines = [
        ("Carguío", &form.loading_cost),
        ("Descarguío", &form.unloading_cost),
        ("Toldeo", &form.weighing_cost),
        ("Cochera", &form.parking_cost),
        ("Peajes", &form.tolls_cost),
        ("Taxi", &form.taxi_cost),
        ("Lavado", &form.washing_cost),
        ("Copias", &form.copies_cost),
        ("Patero", &form.helper_cost),
        ("Vigilante", &form.security_cost),
    ];
    for (label, amount) in cost_lines {
        text.push_str(&format!("- {}: S/ {}\n", label, amount));
    }
    let other_detail = if form.other_description.trim().is_empty() {
        "Sin detalle"
    } else {
        form.other_description.trim()
    };
    text.push_str(&format!("- Otros: S/ {} ({})\n", form.other_cost, other_detail));
    text.push_str(&format!("Total gastos: S/ {:.2}\n", totals.total_expenses));
    text.push('\n');

    text.push_str("Combustible:\n");
    for entry in &form.fuel_entries {
        let figures = trip_form::fuel_figures(entry);
        text.push_str(&format!(
            "- Fecha: {} | Galones: {} | Precio/galón: S/ {} | Monto calculado: S/ {:.2} | Monto real: S/ {}\n",
            or_missing(&entry.fuel_date),
            entry.gallons,
            entry.price_per_gallon,
            figures.calculated_amount(),
            entry.real_paid_amount,
        ));
    }
    text.push_str(&format!(
        "Total combustible (cálculo): S/ {:.2}\n",
        totals.fuel_calculated
    ));
    text.push_str(&format!(
        "Total combustible (real): S/ {:.2}\n",
        totals.fuel_real
    ));
    text.push('\n');

    text.push_str(&format!(
        "Saldo de viáticos: {} S/ {:.2}\n",
        totals.balance_type.label(),
        totals.balance.abs()
    ));
    text.push_str("Enviado desde la app de viáticos EUZIN.\n");
    text
}

fn or_missing(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        MISSING
    } else {
        trimmed
    }
}

//! Pure totals engine for a trip.
//!
//! Every derived figure is recomputed together, from scratch, on each call.
//! There is no incremental patching and no hidden state: the same inputs
//! always produce the same totals.

use shared::BalanceType;

/// Parsed numeric inputs of one fuel row.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelFigures {
    pub gallons: f64,
    pub price_per_gallon: f64,
    pub real_paid: f64,
}

impl FuelFigures {
    /// The entry's own derived amount: gallons * price per gallon.
    pub fn calculated_amount(&self) -> f64 {
        self.gallons * self.price_per_gallon
    }
}

/// The eleven cost fields plus the viatic allowance, already parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CostBreakdown {
    pub viatic: f64,
    pub loading: f64,
    pub unloading: f64,
    pub weighing: f64,
    pub parking: f64,
    pub tolls: f64,
    pub taxi: f64,
    pub washing: f64,
    pub copies: f64,
    pub helper: f64,
    pub security: f64,
    pub other: f64,
}

impl CostBreakdown {
    /// Sum of the eleven cost fields (the viatic is not a cost).
    fn cost_sum(&self) -> f64 {
        self.loading
            + self.unloading
            + self.weighing
            + self.parking
            + self.tolls
            + self.taxi
            + self.washing
            + self.copies
            + self.helper
            + self.security
            + self.other
    }
}

/// The five derived figures of a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripTotals {
    pub total_expenses: f64,
    pub fuel_calculated: f64,
    pub fuel_real: f64,
    pub balance: f64,
    pub balance_type: BalanceType,
}

/// Classify a balance. Exact zero is NEUTRO; no epsilon tolerance.
pub fn classify_balance(balance: f64) -> BalanceType {
    if balance > 0.0 {
        BalanceType::AFavor
    } else if balance < 0.0 {
        BalanceType::EnContra
    } else {
        BalanceType::Neutro
    }
}

/// Recompute all trip totals. The *real* fuel total feeds the expense
/// total; the calculated fuel total is informational only.
pub fn compute_totals(costs: &CostBreakdown, fuel: &[FuelFigures]) -> TripTotals {
    let fuel_calculated = fuel.iter().map(FuelFigures::calculated_amount).sum::<f64>();
    let fuel_real = fuel.iter().map(|entry| entry.real_paid).sum::<f64>();
    let total_expenses = costs.cost_sum() + fuel_real;
    let balance = costs.viatic - total_expenses;
    TripTotals {
        total_expenses,
        fuel_calculated,
        fuel_real,
        balance,
        balance_type: classify_balance(balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_costs_with_allowance_is_in_favor() {
        // Viatic 100.00, no costs, no fuel
        let costs = CostBreakdown {
            viatic: 100.0,
            ..CostBreakdown::default()
        };
        let totals = compute_totals(&costs, &[]);
        assert_eq!(totals.total_expenses, 0.0);
        assert_eq!(totals.fuel_calculated, 0.0);
        assert_eq!(totals.fuel_real, 0.0);
        assert_eq!(totals.balance, 100.0);
        assert_eq!(totals.balance_type, BalanceType::AFavor);
    }

    #[test]
    fn real_fuel_feeds_expenses_not_calculated() {
        // loading 20 + tolls 10, one entry 10 gal * 4.00 but 42.00 paid,
        // viatic 50
        let costs = CostBreakdown {
            viatic: 50.0,
            loading: 20.0,
            tolls: 10.0,
            ..CostBreakdown::default()
        };
        let fuel = [FuelFigures {
            gallons: 10.0,
            price_per_gallon: 4.0,
            real_paid: 42.0,
        }];
        let totals = compute_totals(&costs, &fuel);
        assert_eq!(totals.fuel_calculated, 40.0);
        assert_eq!(totals.fuel_real, 42.0);
        assert_eq!(totals.total_expenses, 72.0);
        assert_eq!(totals.balance, -22.0);
        assert_eq!(totals.balance_type, BalanceType::EnContra);
    }

    #[test]
    fn exact_zero_balance_is_neutral() {
        let costs = CostBreakdown {
            viatic: 30.0,
            parking: 30.0,
            ..CostBreakdown::default()
        };
        let totals = compute_totals(&costs, &[]);
        assert_eq!(totals.balance, 0.0);
        assert_eq!(totals.balance_type, BalanceType::Neutro);
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(classify_balance(0.01), BalanceType::AFavor);
        assert_eq!(classify_balance(-0.01), BalanceType::EnContra);
        assert_eq!(classify_balance(0.0), BalanceType::Neutro);
    }

    #[test]
    fn recomputing_unchanged_input_is_idempotent() {
        let costs = CostBreakdown {
            viatic: 80.0,
            taxi: 12.5,
            helper: 7.5,
            ..CostBreakdown::default()
        };
        let fuel = [
            FuelFigures {
                gallons: 5.0,
                price_per_gallon: 3.8,
                real_paid: 19.0,
            },
            FuelFigures {
                gallons: 2.5,
                price_per_gallon: 4.2,
                real_paid: 10.5,
            },
        ];
        let first = compute_totals(&costs, &fuel);
        let second = compute_totals(&costs, &fuel);
        assert_eq!(first, second);
    }

    #[test]
    fn expenses_sum_all_eleven_fields() {
        let costs = CostBreakdown {
            viatic: 0.0,
            loading: 1.0,
            unloading: 2.0,
            weighing: 3.0,
            parking: 4.0,
            tolls: 5.0,
            taxi: 6.0,
            washing: 7.0,
            copies: 8.0,
            helper: 9.0,
            security: 10.0,
            other: 11.0,
        };
        let totals = compute_totals(&costs, &[]);
        assert_eq!(totals.total_expenses, 66.0);
        assert_eq!(totals.balance_type, BalanceType::EnContra);
    }
}

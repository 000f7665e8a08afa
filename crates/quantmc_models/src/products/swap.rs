//! Vanilla interest rate swap.

use quantmc_core::market_data::{FloatingIndex, Observable};
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;
use super::traits::{check_parallel, check_schedule, Product};

/// A fixed-for-floating swap paying the net coupon each period:
/// `direction * notional * (fixing - fixed_rate) * accrual_fraction`,
/// where direction is +1 when paying fixed (receiving float) and -1
/// otherwise. The fixing is observed on the period's reset date.
#[derive(Clone, Debug)]
pub struct InterestRateSwap {
    pay_fixed: bool,
    fixed_rate: f64,
    index: FloatingIndex,
    payment_dates: Vec<Date>,
    reset_dates: Vec<Date>,
    notionals: Vec<f64>,
    accrual_fractions: Vec<f64>,
}

impl InterestRateSwap {
    /// Creates a swap from parallel schedule arrays.
    pub fn new(
        pay_fixed: bool,
        fixed_rate: f64,
        index: FloatingIndex,
        payment_dates: Vec<Date>,
        reset_dates: Vec<Date>,
        notionals: Vec<f64>,
        accrual_fractions: Vec<f64>,
    ) -> Result<Self, ProductError> {
        check_schedule(&payment_dates)?;
        check_schedule(&reset_dates)?;
        check_parallel("reset_dates", payment_dates.len(), reset_dates.len())?;
        check_parallel("notionals", payment_dates.len(), notionals.len())?;
        check_parallel(
            "accrual_fractions",
            payment_dates.len(),
            accrual_fractions.len(),
        )?;
        Ok(Self {
            pay_fixed,
            fixed_rate,
            index,
            payment_dates,
            reset_dates,
            notionals,
            accrual_fractions,
        })
    }

    /// A swap with constant notional, quarterly-style flat accruals and
    /// resets at the period starts.
    ///
    /// `reset_dates[i]` is the previous payment date (the first reset is
    /// `start_date`).
    pub fn flat(
        pay_fixed: bool,
        fixed_rate: f64,
        index: FloatingIndex,
        start_date: Date,
        payment_dates: Vec<Date>,
        notional: f64,
        accrual_fraction: f64,
    ) -> Result<Self, ProductError> {
        let n = payment_dates.len();
        if n == 0 {
            return Err(ProductError::EmptySchedule);
        }
        let mut reset_dates = Vec::with_capacity(n);
        reset_dates.push(start_date);
        reset_dates.extend_from_slice(&payment_dates[..n - 1]);
        Self::new(
            pay_fixed,
            fixed_rate,
            index,
            payment_dates,
            reset_dates,
            vec![notional; n],
            vec![accrual_fraction; n],
        )
    }

    /// The fixed rate.
    pub fn fixed_rate(&self) -> f64 {
        self.fixed_rate
    }

    /// The floating index.
    pub fn index(&self) -> &FloatingIndex {
        &self.index
    }

    /// The swap restricted to periods whose reset date is on or after
    /// `date` — the underlying delivered by exercising into this swap at
    /// `date`.
    ///
    /// # Errors
    ///
    /// Returns `EmptySchedule` when no periods remain.
    pub fn truncated_from(&self, date: Date) -> Result<Self, ProductError> {
        let keep: Vec<usize> = (0..self.payment_dates.len())
            .filter(|&i| self.reset_dates[i] >= date)
            .collect();
        if keep.is_empty() {
            return Err(ProductError::EmptySchedule);
        }
        Self::new(
            self.pay_fixed,
            self.fixed_rate,
            self.index.clone(),
            keep.iter().map(|&i| self.payment_dates[i]).collect(),
            keep.iter().map(|&i| self.reset_dates[i]).collect(),
            keep.iter().map(|&i| self.notionals[i]).collect(),
            keep.iter().map(|&i| self.accrual_fractions[i]).collect(),
        )
    }
}

impl Product for InterestRateSwap {
    fn currency(&self) -> Currency {
        self.index.currency()
    }

    fn required_observables(&self) -> Vec<Observable> {
        vec![Observable::Index(self.index.clone())]
    }

    fn observation_dates(&self, observable: &Observable) -> Vec<Date> {
        if *observable == Observable::Index(self.index.clone()) {
            self.reset_dates.clone()
        } else {
            Vec::new()
        }
    }

    fn cashflow_dates(&self) -> Vec<Date> {
        self.payment_dates.clone()
    }

    fn last_date(&self) -> Date {
        *self.payment_dates.last().expect("schedule is non-empty")
    }

    fn cashflows(&self, fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError> {
        let observable = Observable::Index(self.index.clone());
        let direction = if self.pay_fixed { 1.0 } else { -1.0 };
        let mut flows = Vec::with_capacity(self.payment_dates.len());
        for (i, &date) in self.payment_dates.iter().enumerate() {
            let fixing = fixings.get(&observable, self.reset_dates[i])?;
            let amount = direction
                * self.notionals[i]
                * (fixing - self.fixed_rate)
                * self.accrual_fractions[i];
            flows.push(Cashflow::new(date, amount, self.currency()));
        }
        Ok(flows)
    }

    fn clone_box(&self) -> Box<dyn Product> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn swap(pay_fixed: bool) -> InterestRateSwap {
        InterestRateSwap::flat(
            pay_fixed,
            0.07,
            FloatingIndex::jibar_3m(),
            d(2020, 1, 1),
            vec![d(2020, 4, 1), d(2020, 7, 1)],
            1_000_000.0,
            0.25,
        )
        .unwrap()
    }

    fn fixings() -> Fixings {
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        let mut fixings = Fixings::new();
        fixings.insert(jibar.clone(), d(2020, 1, 1), 0.08);
        fixings.insert(jibar, d(2020, 4, 1), 0.06);
        fixings
    }

    #[test]
    fn test_net_coupons() {
        let flows = swap(true).cashflows(&fixings()).unwrap();
        // Pay fixed: receives (fixing - fixed) * notional * accrual.
        assert_relative_eq!(flows[0].amount, 1_000_000.0 * 0.01 * 0.25);
        assert_relative_eq!(flows[1].amount, -1_000_000.0 * 0.01 * 0.25);
    }

    #[test]
    fn test_direction_flips_sign() {
        let payer = swap(true).cashflows(&fixings()).unwrap();
        let receiver = swap(false).cashflows(&fixings()).unwrap();
        for (p, r) in payer.iter().zip(&receiver) {
            assert_relative_eq!(p.amount, -r.amount);
        }
    }

    #[test]
    fn test_truncated_from_keeps_remaining_periods() {
        let swap = swap(true);
        let truncated = swap.truncated_from(d(2020, 4, 1)).unwrap();
        assert_eq!(truncated.cashflow_dates(), vec![d(2020, 7, 1)]);
        assert!(swap.truncated_from(d(2021, 1, 1)).is_err());
    }

    #[test]
    fn test_resets_default_to_period_starts() {
        let swap = swap(true);
        let jibar = Observable::Index(FloatingIndex::jibar_3m());
        assert_eq!(swap.observation_dates(&jibar), vec![d(2020, 1, 1), d(2020, 4, 1)]);
    }
}

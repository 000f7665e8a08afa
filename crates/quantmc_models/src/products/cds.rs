//! Single-name credit default swap.

use quantmc_core::market_data::{Observable, ReferenceEntity};
use quantmc_core::types::{Currency, Date};

use super::cashflow::{Cashflow, Fixings};
use super::error::ProductError;
use super::traits::{check_parallel, check_schedule, Product};

/// A credit default swap on one reference entity.
///
/// While the entity survives, the premium
/// `notional * spread * accrual_fraction` is exchanged on each payment
/// date; on the first payment date on or after default, the protection
/// amount `(1 - recovery) * notional` is exchanged instead and the
/// contract terminates. Bought protection pays premiums and receives
/// protection; sold protection is the mirror image.
///
/// Default time and recovery are read from the simulated path via the
/// `DefaultTime` and `DefaultRecovery` observables, both observed at the
/// first payment date.
#[derive(Clone, Debug)]
pub struct Cds {
    entity: ReferenceEntity,
    currency: Currency,
    bought_protection: bool,
    payment_dates: Vec<Date>,
    notionals: Vec<f64>,
    spreads: Vec<f64>,
    accrual_fractions: Vec<f64>,
}

impl Cds {
    /// Creates a CDS from parallel schedule arrays.
    pub fn new(
        entity: ReferenceEntity,
        currency: Currency,
        bought_protection: bool,
        payment_dates: Vec<Date>,
        notionals: Vec<f64>,
        spreads: Vec<f64>,
        accrual_fractions: Vec<f64>,
    ) -> Result<Self, ProductError> {
        check_schedule(&payment_dates)?;
        check_parallel("notionals", payment_dates.len(), notionals.len())?;
        check_parallel("spreads", payment_dates.len(), spreads.len())?;
        check_parallel(
            "accrual_fractions",
            payment_dates.len(),
            accrual_fractions.len(),
        )?;
        Ok(Self {
            entity,
            currency,
            bought_protection,
            payment_dates,
            notionals,
            spreads,
            accrual_fractions,
        })
    }

    /// The reference entity.
    pub fn reference_entity(&self) -> &ReferenceEntity {
        &self.entity
    }

    fn observation_date(&self) -> Date {
        self.payment_dates[0]
    }
}

impl Product for Cds {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn required_observables(&self) -> Vec<Observable> {
        vec![
            Observable::DefaultTime(self.entity.clone()),
            Observable::DefaultRecovery(self.entity.clone()),
        ]
    }

    fn observation_dates(&self, observable: &Observable) -> Vec<Date> {
        match observable {
            Observable::DefaultTime(entity) | Observable::DefaultRecovery(entity)
                if *entity == self.entity =>
            {
                vec![self.observation_date()]
            }
            _ => Vec::new(),
        }
    }

    fn cashflow_dates(&self) -> Vec<Date> {
        self.payment_dates.clone()
    }

    fn last_date(&self) -> Date {
        *self.payment_dates.last().expect("schedule is non-empty")
    }

    fn cashflows(&self, fixings: &Fixings) -> Result<Vec<Cashflow>, ProductError> {
        let when = self.observation_date();
        let default_serial =
            fixings.get(&Observable::DefaultTime(self.entity.clone()), when)?;
        // Bought protection pays the premium.
        let premium_sign = if self.bought_protection { -1.0 } else { 1.0 };

        let mut flows = Vec::with_capacity(self.payment_dates.len());
        for (i, &date) in self.payment_dates.iter().enumerate() {
            if (date.serial() as f64) < default_serial {
                let amount = premium_sign
                    * self.notionals[i]
                    * self.spreads[i]
                    * self.accrual_fractions[i];
                flows.push(Cashflow::new(date, amount, self.currency));
            } else {
                let recovery =
                    fixings.get(&Observable::DefaultRecovery(self.entity.clone()), when)?;
                let amount = -premium_sign * (1.0 - recovery) * self.notionals[i];
                flows.push(Cashflow::new(date, amount, self.currency));
                break;
            }
        }
        Ok(flows)
    }

    fn clone_box(&self) -> Box<dyn Product> {
        Box::new(self.clone())
    }
}

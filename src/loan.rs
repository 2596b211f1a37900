use log::{debug, trace};
use std::fmt;

use crate::error::{LoanError, LoanResult};

// differentiated schedules are materialized, so their length is capped (1000 years of months)
const MAX_SCHEDULE_PERIODS: f64 = 12_000.;

/// One installment of a differentiated payment schedule.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DiffPayment {
    pub month: u32,
    pub amount: f64,
}

impl DiffPayment {
    pub fn new(month: u32, amount: f64) -> Self {
        Self { month, amount }
    }
}

impl fmt::Display for DiffPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Month {}: payment is {:.0}", self.month, self.amount)
    }
}

/// Converts an annual percentage rate (i.e., 7.8) to a monthly decimal rate.
pub fn monthly_interest_rate(annual_rate: f64) -> f64 {
    annual_rate / (12. * 100.)
}

/// Number of monthly payments needed to repay `principal` with a fixed `payment`.
///
/// Rounded up: a fractional result means one more, smaller, installment.
pub fn number_of_payments(principal: f64, payment: f64, annual_rate: f64) -> LoanResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_positive("payment", payment)?;
    let i = rate(annual_rate)?;
    if i == 0. {
        return months_no_interest(principal, payment);
    }

    let interest = i * principal;
    if payment <= interest {
        return Err(LoanError::Domain(format!(
            "monthly payment {payment:.0} never covers the accruing interest {interest:.0}"
        )));
    }

    let count = ((payment / (payment - interest)).ln() / (1. + i).ln()).ceil();
    trace!("principal {principal}, payment {payment}, rate {i} -> {count} payments");
    finite("number of payments", count)
}

/// Annuity payment for `principal` repaid over `pmt_count` months.
///
/// Always rounded up so the loan is fully repaid.
pub fn monthly_payment(principal: f64, pmt_count: f64, annual_rate: f64) -> LoanResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_positive("number of payments", pmt_count)?;
    let i = rate(annual_rate)?;
    if i == 0. {
        return monthly_payment_no_interest(principal, pmt_count);
    }

    let factor = (1. + i).powf(pmt_count);
    let payment = (principal * (i * factor) / (factor - 1.)).ceil();
    trace!("principal {principal}, {pmt_count} payments, rate {i} -> payment {payment}");
    finite("monthly payment", payment)
}

/// Principal that `pmt_count` annuity payments of `payment` repay.
///
/// Rounded down, never overstating what was lent.
pub fn loan_principal(payment: f64, pmt_count: f64, annual_rate: f64) -> LoanResult<f64> {
    ensure_positive("payment", payment)?;
    ensure_positive("number of payments", pmt_count)?;
    let i = rate(annual_rate)?;
    if i == 0. {
        return finite("principal", (payment * pmt_count).floor());
    }

    let factor = (1. + i).powf(pmt_count);
    let principal = (payment * (factor - 1.) / (i * factor)).floor();
    trace!("payment {payment}, {pmt_count} payments, rate {i} -> principal {principal}");
    finite("principal", principal)
}

/// What remains for the final installment after `pmt_count - 1` regular payments.
pub fn last_payment(principal: f64, payment: f64, pmt_count: f64) -> f64 {
    principal - payment * (pmt_count - 1.)
}

pub fn overpayment(total_paid: f64, principal: f64) -> f64 {
    total_paid - principal
}

/// Month-by-month differentiated payments: a constant principal share plus interest on
/// the scheduled outstanding balance, each rounded up.
///
/// Months `1..n-1` follow `ceil(P/n + i * (P - P*(m-1)/n))` exactly. The final installment
/// settles exactly what is still due, so the rounding carried by the earlier installments
/// comes back out of the last one.
pub fn differentiated_schedule(
    principal: f64,
    pmt_count: f64,
    annual_rate: f64,
) -> LoanResult<Vec<DiffPayment>> {
    ensure_positive("principal", principal)?;
    ensure_positive("number of payments", pmt_count)?;
    if pmt_count.fract() != 0. || pmt_count > MAX_SCHEDULE_PERIODS {
        return Err(LoanError::Domain(format!(
            "{pmt_count} is not a whole number of periods between 1 and {MAX_SCHEDULE_PERIODS}"
        )));
    }
    let i = rate(annual_rate)?;
    let periods = pmt_count as u32;

    let mut sched_pmt: Vec<DiffPayment> = Vec::with_capacity(periods as usize);
    let mut amount_due = principal; // principal plus interest accrued so far
    let mut paid = 0.;

    for month in 1..=periods {
        let balance = principal - principal * (month - 1) as f64 / pmt_count;
        amount_due += i * balance;

        let amount = if month < periods {
            (principal / pmt_count + i * balance).ceil()
        } else {
            (amount_due - paid).ceil().max(0.)
        };
        trace!("month {month}, balance {balance}, payment {amount}");

        paid += amount;
        sched_pmt.push(DiffPayment::new(month, finite("differentiated payment", amount)?));
    }
    debug!("{periods} differentiated payments totalling {paid}");
    Ok(sched_pmt)
}

pub fn total_paid(payments: &[DiffPayment]) -> f64 {
    payments.iter().map(|pmt| pmt.amount).sum()
}

/// Interest-free: months needed to repay `principal` with a fixed `payment`.
pub fn months_no_interest(principal: f64, payment: f64) -> LoanResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_positive("payment", payment)?;
    finite("number of months", (principal / payment).ceil())
}

/// Interest-free: the payment that repays `principal` within `months`.
pub fn monthly_payment_no_interest(principal: f64, months: f64) -> LoanResult<f64> {
    ensure_positive("principal", principal)?;
    ensure_positive("number of months", months)?;
    finite("monthly payment", (principal / months).ceil())
}

fn ensure_positive(name: &str, value: f64) -> LoanResult<()> {
    if value > 0. {
        Ok(())
    } else {
        Err(LoanError::Domain(format!("{name} must be positive, got {value}")))
    }
}

fn rate(annual_rate: f64) -> LoanResult<f64> {
    if annual_rate >= 0. {
        Ok(monthly_interest_rate(annual_rate))
    } else {
        Err(LoanError::Domain(format!(
            "interest must not be negative, got {annual_rate}"
        )))
    }
}

fn finite(what: &str, value: f64) -> LoanResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LoanError::Domain(format!("{what} is out of range")))
    }
}

use std::fmt;

use crate::request::Outcome;

/// Phrases a count of monthly payments as years and months, i.e. "8 years and 2 months".
pub fn format_duration(periods: u64) -> String {
    let years = periods / 12;
    let months = periods % 12;
    match (years, months) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{} and {}", plural(y, "year"), plural(m, "month")),
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overpayment = match self {
            Outcome::Periods {
                periods,
                overpayment,
            } => {
                write!(
                    f,
                    "It will take {} to repay the loan!",
                    format_duration(*periods as u64)
                )?;
                *overpayment
            }
            Outcome::Payment {
                payment,
                last_payment,
                overpayment,
            } => {
                if last_payment != payment {
                    write!(
                        f,
                        "Your monthly payment = {payment:.0} and the last payment = {last_payment:.0}."
                    )?;
                } else {
                    write!(f, "Your monthly payment = {payment:.0}!")?;
                }
                *overpayment
            }
            Outcome::Principal {
                principal,
                overpayment,
            } => {
                write!(f, "Your loan principal = {principal:.0}!")?;
                Some(*overpayment)
            }
            Outcome::Schedule {
                payments,
                overpayment,
            } => {
                for pmt in payments {
                    writeln!(f, "{}", pmt)?;
                }
                Some(*overpayment)
            }
        };

        match overpayment {
            Some(amount) => write!(f, "\nOverpayment = {amount:.0}"),
            None => Ok(()),
        }
    }
}

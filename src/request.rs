use log::debug;
use std::fmt;

use crate::error::{LoanError, LoanResult};
use crate::loan::{self, DiffPayment};

/// Which family of formulas a calculation belongs to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum CalculationType {
    #[default]
    Annuity,
    Differentiated,
    NoInterest,
}

/// The one quantity being solved for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Mode {
    NoInterestMonths,
    NoInterestPayment,
    AnnuityPayment,
    AnnuityPrincipal,
    AnnuityPayments,
    Differentiated,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::NoInterestMonths => "number of months without interest",
            Mode::NoInterestPayment => "monthly payment without interest",
            Mode::AnnuityPayment => "annuity payment",
            Mode::AnnuityPrincipal => "loan principal",
            Mode::AnnuityPayments => "number of annuity payments",
            Mode::Differentiated => "differentiated payments",
        };
        write!(f, "{}", name)
    }
}

/// Raw inputs as collected from flags or prompts. `None` marks the unknown.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct LoanParameters {
    pub calculation: CalculationType,
    pub principal: Option<f64>,
    pub monthly_payment: Option<f64>,
    pub number_of_payments: Option<f64>,
    pub annual_interest_percent: Option<f64>,
}

impl LoanParameters {
    pub fn new(calculation: CalculationType) -> Self {
        Self {
            calculation,
            ..Self::default()
        }
    }

    pub fn principal(self, principal: f64) -> Self {
        Self {
            principal: Some(principal),
            ..self
        }
    }

    pub fn monthly_payment(self, monthly_payment: f64) -> Self {
        Self {
            monthly_payment: Some(monthly_payment),
            ..self
        }
    }

    pub fn number_of_payments(self, number_of_payments: f64) -> Self {
        Self {
            number_of_payments: Some(number_of_payments),
            ..self
        }
    }

    pub fn annual_interest_percent(self, annual_interest_percent: f64) -> Self {
        Self {
            annual_interest_percent: Some(annual_interest_percent),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.principal.is_none()
            && self.monthly_payment.is_none()
            && self.number_of_payments.is_none()
            && self.annual_interest_percent.is_none()
    }

    pub fn monthly_interest_rate(&self) -> Option<f64> {
        self.annual_interest_percent.map(loan::monthly_interest_rate)
    }

    /// Validates the supplied fields and picks the calculation to run.
    ///
    /// Exactly one of principal, payment and number of payments must be absent (for the
    /// differentiated family that is always the payment). Supplied amounts must be strictly
    /// positive; interest may be zero. Interest is required except in the interest-free
    /// family, where it must be absent.
    pub fn classify(&self) -> LoanResult<LoanRequest> {
        let principal = positive("principal", self.principal)?;
        let payment = positive("payment", self.monthly_payment)?;
        let count = positive("number of payments", self.number_of_payments)?;
        let interest = match self.annual_interest_percent {
            Some(rate) if !rate.is_finite() || rate < 0. => {
                return Err(invalid(format!("interest {rate} must not be negative")))
            }
            rate => rate,
        };

        let request = match (self.calculation, interest) {
            (CalculationType::NoInterest, Some(_)) => {
                return Err(invalid("interest is not used without interest".into()))
            }
            (CalculationType::NoInterest, None) => match (principal, payment, count) {
                (Some(principal), Some(payment), None) => {
                    LoanRequest::NoInterestMonths { principal, payment }
                }
                (Some(principal), None, Some(months)) => {
                    LoanRequest::NoInterestPayment { principal, months }
                }
                _ => return Err(invalid(unknowns_message(self))),
            },
            (_, None) => return Err(invalid("interest is required".into())),
            (CalculationType::Annuity, Some(rate)) => match (principal, payment, count) {
                (Some(principal), Some(payment), None) => LoanRequest::AnnuityPayments {
                    principal,
                    payment,
                    rate,
                },
                (Some(principal), None, Some(count)) => LoanRequest::AnnuityPayment {
                    principal,
                    count,
                    rate,
                },
                (None, Some(payment), Some(count)) => LoanRequest::AnnuityPrincipal {
                    payment,
                    count,
                    rate,
                },
                _ => return Err(invalid(unknowns_message(self))),
            },
            (CalculationType::Differentiated, Some(rate)) => match (principal, payment, count) {
                (Some(principal), None, Some(count)) => LoanRequest::Differentiated {
                    principal,
                    count,
                    rate,
                },
                _ => {
                    return Err(invalid(
                        "differentiated payments need principal and periods, not payment".into(),
                    ))
                }
            },
        };
        debug!(
            "classified {:?} as {}, monthly rate {:?}",
            self,
            request.mode(),
            self.monthly_interest_rate()
        );
        Ok(request)
    }
}

/// A validated calculation, carrying only the inputs its formula needs.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LoanRequest {
    NoInterestMonths { principal: f64, payment: f64 },
    NoInterestPayment { principal: f64, months: f64 },
    AnnuityPayment { principal: f64, count: f64, rate: f64 },
    AnnuityPrincipal { payment: f64, count: f64, rate: f64 },
    AnnuityPayments { principal: f64, payment: f64, rate: f64 },
    Differentiated { principal: f64, count: f64, rate: f64 },
}

impl LoanRequest {
    pub fn mode(&self) -> Mode {
        match self {
            LoanRequest::NoInterestMonths { .. } => Mode::NoInterestMonths,
            LoanRequest::NoInterestPayment { .. } => Mode::NoInterestPayment,
            LoanRequest::AnnuityPayment { .. } => Mode::AnnuityPayment,
            LoanRequest::AnnuityPrincipal { .. } => Mode::AnnuityPrincipal,
            LoanRequest::AnnuityPayments { .. } => Mode::AnnuityPayments,
            LoanRequest::Differentiated { .. } => Mode::Differentiated,
        }
    }

    /// Runs the formula for this request.
    pub fn solve(&self) -> LoanResult<Outcome> {
        let outcome = match *self {
            LoanRequest::NoInterestMonths { principal, payment } => Outcome::Periods {
                periods: loan::months_no_interest(principal, payment)?,
                overpayment: None,
            },
            LoanRequest::NoInterestPayment { principal, months } => {
                let payment = loan::monthly_payment_no_interest(principal, months)?;
                let last_payment = loan::last_payment(principal, payment, months);
                if last_payment <= 0. {
                    let needed = loan::months_no_interest(principal, payment)?;
                    return Err(LoanError::Domain(format!(
                        "a payment of {payment:.0} repays the loan in {needed:.0} months, not {months}"
                    )));
                }
                Outcome::Payment {
                    payment,
                    last_payment,
                    overpayment: None,
                }
            }
            LoanRequest::AnnuityPayment {
                principal,
                count,
                rate,
            } => {
                let payment = loan::monthly_payment(principal, count, rate)?;
                Outcome::Payment {
                    payment,
                    last_payment: payment,
                    overpayment: Some(loan::overpayment(payment * count, principal)),
                }
            }
            LoanRequest::AnnuityPrincipal {
                payment,
                count,
                rate,
            } => {
                let principal = loan::loan_principal(payment, count, rate)?;
                Outcome::Principal {
                    principal,
                    overpayment: loan::overpayment(payment * count, principal),
                }
            }
            LoanRequest::AnnuityPayments {
                principal,
                payment,
                rate,
            } => {
                let periods = loan::number_of_payments(principal, payment, rate)?;
                Outcome::Periods {
                    periods,
                    overpayment: Some(loan::overpayment(payment * periods, principal)),
                }
            }
            LoanRequest::Differentiated {
                principal,
                count,
                rate,
            } => {
                let payments = loan::differentiated_schedule(principal, count, rate)?;
                let overpayment = loan::overpayment(loan::total_paid(&payments), principal);
                Outcome::Schedule {
                    payments,
                    overpayment,
                }
            }
        };
        Ok(outcome)
    }
}

/// The computed answer to a request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, PartialEq, Debug)]
pub enum Outcome {
    Periods {
        periods: f64,
        overpayment: Option<f64>,
    },
    Payment {
        payment: f64,
        last_payment: f64,
        overpayment: Option<f64>,
    },
    Principal {
        principal: f64,
        overpayment: f64,
    },
    Schedule {
        payments: Vec<DiffPayment>,
        overpayment: f64,
    },
}

/// Validates and solves in one step.
pub fn calculate(params: &LoanParameters) -> LoanResult<Outcome> {
    params.classify()?.solve()
}

fn positive(name: &str, value: Option<f64>) -> LoanResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v <= 0. => {
            Err(invalid(format!("{name} {v} must be a positive number")))
        }
        v => Ok(v),
    }
}

fn unknowns_message(params: &LoanParameters) -> String {
    let missing = [
        params.principal,
        params.monthly_payment,
        params.number_of_payments,
    ]
    .iter()
    .filter(|v| v.is_none())
    .count();
    format!("expected exactly one unknown value, found {missing}")
}

fn invalid(reason: String) -> LoanError {
    LoanError::InvalidParameters(reason)
}

#[cfg(test)]
mod tests {
    use super::{calculate, CalculationType, LoanParameters, LoanRequest, Mode, Outcome};
    use crate::error::LoanError;
    use test_log::test;

    fn annuity() -> LoanParameters {
        LoanParameters::new(CalculationType::Annuity)
    }

    #[test]
    fn test_classify_annuity() {
        let params = annuity()
            .principal(500000.)
            .number_of_payments(8.)
            .annual_interest_percent(7.8);
        assert_eq!(
            params.classify(),
            Ok(LoanRequest::AnnuityPayment {
                principal: 500000.,
                count: 8.,
                rate: 7.8
            })
        );
        assert_eq!(params.monthly_interest_rate(), Some(7.8 / 1200.));

        let params = annuity()
            .monthly_payment(8722.)
            .number_of_payments(120.)
            .annual_interest_percent(5.6);
        assert_eq!(params.classify().unwrap().mode(), Mode::AnnuityPrincipal);

        let params = annuity()
            .principal(1000000.)
            .monthly_payment(15000.)
            .annual_interest_percent(0.);
        assert_eq!(params.classify().unwrap().mode(), Mode::AnnuityPayments);
    }

    #[test]
    fn test_classify_other_families() {
        let params = LoanParameters::new(CalculationType::NoInterest)
            .principal(1000000.)
            .monthly_payment(104000.);
        assert_eq!(params.classify().unwrap().mode(), Mode::NoInterestMonths);

        let params = LoanParameters::new(CalculationType::NoInterest)
            .principal(1200.)
            .number_of_payments(12.);
        assert_eq!(params.classify().unwrap().mode(), Mode::NoInterestPayment);

        let params = LoanParameters::new(CalculationType::Differentiated)
            .principal(500000.)
            .number_of_payments(6.)
            .annual_interest_percent(0.);
        assert_eq!(params.classify().unwrap().mode(), Mode::Differentiated);
    }

    #[test]
    fn test_reject_wrong_unknown_count() {
        let rejected = [
            // two unknowns
            annuity().principal(1000.).annual_interest_percent(10.),
            // no unknown
            annuity()
                .principal(1000.)
                .monthly_payment(100.)
                .number_of_payments(12.)
                .annual_interest_percent(10.),
            // interest missing
            annuity().principal(1000.).number_of_payments(12.),
            // differentiated with a payment
            LoanParameters::new(CalculationType::Differentiated)
                .principal(1000.)
                .monthly_payment(100.)
                .annual_interest_percent(10.),
            // interest given without interest
            LoanParameters::new(CalculationType::NoInterest)
                .principal(1000.)
                .monthly_payment(100.)
                .annual_interest_percent(10.),
            LoanParameters::new(CalculationType::NoInterest).principal(1000.),
            annuity(),
        ];
        for params in rejected {
            assert!(
                matches!(params.classify(), Err(LoanError::InvalidParameters(_))),
                "{params:?} accepted"
            );
        }
    }

    #[test]
    fn test_reject_non_positive() {
        let rejected = [
            annuity()
                .principal(-1000.)
                .number_of_payments(12.)
                .annual_interest_percent(10.),
            annuity()
                .principal(1000.)
                .number_of_payments(0.)
                .annual_interest_percent(10.),
            annuity()
                .principal(1000.)
                .number_of_payments(12.)
                .annual_interest_percent(-1.),
            annuity()
                .principal(f64::NAN)
                .number_of_payments(12.)
                .annual_interest_percent(10.),
            annuity()
                .monthly_payment(f64::INFINITY)
                .number_of_payments(12.)
                .annual_interest_percent(10.),
        ];
        for params in rejected {
            assert!(
                matches!(calculate(&params), Err(LoanError::InvalidParameters(_))),
                "{params:?} accepted"
            );
        }
    }

    #[test]
    fn test_solve_annuity() {
        let params = annuity()
            .principal(1000000.)
            .number_of_payments(60.)
            .annual_interest_percent(10.);
        assert_eq!(
            calculate(&params),
            Ok(Outcome::Payment {
                payment: 21248.,
                last_payment: 21248.,
                overpayment: Some(274880.)
            })
        );

        let params = annuity()
            .principal(1000000.)
            .monthly_payment(15000.)
            .annual_interest_percent(10.);
        assert_eq!(
            calculate(&params),
            Ok(Outcome::Periods {
                periods: 98.,
                overpayment: Some(470000.)
            })
        );

        let params = annuity()
            .monthly_payment(8722.)
            .number_of_payments(120.)
            .annual_interest_percent(5.6);
        assert_eq!(
            calculate(&params),
            Ok(Outcome::Principal {
                principal: 800018.,
                overpayment: 246622.
            })
        );
    }

    #[test]
    fn test_solve_no_interest() {
        let params = LoanParameters::new(CalculationType::NoInterest)
            .principal(1000.)
            .number_of_payments(3.);
        assert_eq!(
            calculate(&params),
            Ok(Outcome::Payment {
                payment: 334.,
                last_payment: 332.,
                overpayment: None
            })
        );
    }

    #[test]
    fn test_no_interest_term_too_long() {
        for (principal, months) in [(100., 30.), (10., 7.), (10., 6.)] {
            let params = LoanParameters::new(CalculationType::NoInterest)
                .principal(principal)
                .number_of_payments(months);
            assert!(
                matches!(calculate(&params), Err(LoanError::Domain(_))),
                "{principal} over {months} months accepted"
            );
        }

        let params = LoanParameters::new(CalculationType::NoInterest)
            .principal(1200.)
            .number_of_payments(12.);
        assert_eq!(
            calculate(&params),
            Ok(Outcome::Payment {
                payment: 100.,
                last_payment: 100.,
                overpayment: None
            })
        );
    }

    #[test]
    fn test_solve_domain_error() {
        let params = annuity()
            .principal(1000000.)
            .monthly_payment(1000.)
            .annual_interest_percent(12.);
        assert!(matches!(calculate(&params), Err(LoanError::Domain(_))));

        let params = LoanParameters::new(CalculationType::Differentiated)
            .principal(1000.)
            .number_of_payments(2.5)
            .annual_interest_percent(10.);
        assert!(matches!(calculate(&params), Err(LoanError::Domain(_))));
    }

    #[test]
    fn test_solve_differentiated() {
        let params = LoanParameters::new(CalculationType::Differentiated)
            .principal(500000.)
            .number_of_payments(6.)
            .annual_interest_percent(0.);
        match calculate(&params) {
            Ok(Outcome::Schedule {
                payments,
                overpayment,
            }) => {
                assert_eq!(payments.len(), 6);
                assert_eq!(overpayment, 0.);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

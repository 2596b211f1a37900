use clap::{Parser, ValueEnum};
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;
use std::io;
use std::process;

use loan_calculator::error::LoanError;
use loan_calculator::prompt::{self, PromptError};
use loan_calculator::request::{calculate, CalculationType, LoanParameters};

/// Loan repayment calculator
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Calculation family
    #[arg(long = "type", value_enum)]
    loan_type: Option<LoanType>,

    /// Loan principal
    #[arg(long, allow_negative_numbers = true)]
    principal: Option<f64>,

    /// Monthly payment
    #[arg(long, allow_negative_numbers = true)]
    payment: Option<f64>,

    /// Number of monthly payments
    #[arg(long, allow_negative_numbers = true)]
    periods: Option<f64>,

    /// Annual interest rate in percent (i.e., 7.8)
    #[arg(long, allow_negative_numbers = true)]
    interest: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LoanType {
    Annuity,
    Diff,
    #[value(name = "none")]
    NoInterest,
}

impl From<LoanType> for CalculationType {
    fn from(loan_type: LoanType) -> Self {
        match loan_type {
            LoanType::Annuity => CalculationType::Annuity,
            LoanType::Diff => CalculationType::Differentiated,
            LoanType::NoInterest => CalculationType::NoInterest,
        }
    }
}

impl Cli {
    fn parameters(&self) -> LoanParameters {
        LoanParameters {
            calculation: self.loan_type.unwrap_or(LoanType::Annuity).into(),
            principal: self.principal,
            monthly_payment: self.payment,
            number_of_payments: self.periods,
            annual_interest_percent: self.interest,
        }
    }
}

fn main() {
    if let Err(e) = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("logger unavailable: {e}");
    }

    let cli = Cli::parse();
    let mut params = cli.parameters();

    if params.is_empty() && cli.loan_type.is_some() {
        fail(LoanError::InvalidParameters(
            "--type needs the loan values as flags".into(),
        ));
    }

    if params.is_empty() {
        let stdin = io::stdin();
        let stdout = io::stdout();
        params = match prompt::read_parameters(&mut stdin.lock(), &mut stdout.lock()) {
            Ok(params) => params,
            Err(PromptError::Loan(e)) => fail(e),
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        };
    }

    match calculate(&params) {
        Ok(outcome) => println!("{outcome}"),
        Err(e) => fail(e),
    }
}

fn fail(e: LoanError) -> ! {
    debug!("rejected: {}", e.reason());
    eprintln!("{e}");
    process::exit(1);
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanParameters>();
    is_normal::<loan_calculator::request::Outcome>();
}

use log::debug;
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::error::LoanError;
use crate::request::{CalculationType, LoanParameters};

const MENU: &str = "What do you want to calculate?
type \"n\" for number of monthly payments,
type \"a\" for annuity monthly payment amount,
type \"p\" for loan principal,
type \"d\" for differentiated payments:";

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Loan(#[from] LoanError),
}

/// Asks the user which quantity to solve for, then only for the inputs that calculation needs.
pub fn read_parameters<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<LoanParameters, PromptError> {
    writeln!(output, "{MENU}")?;
    let choice = read_answer(input)?;
    debug!("interactive choice {choice:?}");

    let (calculation, principal, payment, periods) = match choice.as_str() {
        "n" => (CalculationType::Annuity, true, true, false),
        "a" => (CalculationType::Annuity, true, false, true),
        "p" => (CalculationType::Annuity, false, true, true),
        "d" => (CalculationType::Differentiated, true, false, true),
        other => {
            return Err(LoanError::InvalidParameters(format!("unknown choice {other:?}")).into())
        }
    };

    let mut params = LoanParameters::new(calculation);
    if principal {
        params = params.principal(ask(input, output, "Enter the loan principal:")?);
    }
    if payment {
        params = params.monthly_payment(ask(input, output, "Enter the monthly payment:")?);
    }
    if periods {
        params = params.number_of_payments(ask(input, output, "Enter the number of periods:")?);
    }
    let interest = ask(input, output, "Enter the loan interest:")?;
    Ok(params.annual_interest_percent(interest))
}

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<f64, PromptError> {
    writeln!(output, "{question}")?;
    let answer = read_answer(input)?;
    answer.parse::<f64>().map_err(|_| {
        LoanError::InvalidParameters(format!("{answer:?} is not a number")).into()
    })
}

// next non-blank line, trimmed
fn read_answer<R: BufRead>(input: &mut R) -> Result<String, PromptError> {
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(LoanError::InvalidParameters("no answer given".into()).into());
        }
        let answer = line.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{read_parameters, PromptError};
    use crate::error::LoanError;
    use crate::request::{CalculationType, LoanParameters};
    use std::io::Cursor;
    use test_log::test;

    fn run(answers: &str) -> (Result<LoanParameters, PromptError>, String) {
        let mut input = Cursor::new(answers.as_bytes());
        let mut output = Vec::new();
        let result = read_parameters(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_read_payments_question() {
        let (result, asked) = run("n\n1000000\n15000\n10\n");
        assert_eq!(
            result.unwrap(),
            LoanParameters::new(CalculationType::Annuity)
                .principal(1000000.)
                .monthly_payment(15000.)
                .annual_interest_percent(10.)
        );
        assert!(asked.starts_with("What do you want to calculate?"));
        assert!(asked.contains("Enter the loan principal:"));
        assert!(asked.contains("Enter the monthly payment:"));
        assert!(!asked.contains("Enter the number of periods:"));
        assert!(asked.ends_with("Enter the loan interest:\n"));
    }

    #[test]
    fn test_read_differentiated() {
        let (result, _) = run("d\n\n500000\n  6 \n0\n");
        assert_eq!(
            result.unwrap(),
            LoanParameters::new(CalculationType::Differentiated)
                .principal(500000.)
                .number_of_payments(6.)
                .annual_interest_percent(0.)
        );
    }

    #[test]
    fn test_read_principal_question() {
        let (result, asked) = run("p\n8722\n120\n5.6\n");
        let params = result.unwrap();
        assert_eq!(params.principal, None);
        assert_eq!(params.monthly_payment, Some(8722.));
        assert_eq!(params.number_of_payments, Some(120.));
        assert!(!asked.contains("Enter the loan principal:"));
    }

    #[test]
    fn test_bad_answers() {
        for answers in ["x\n", "a\nlots\n", "a\n1000\n"] {
            let (result, _) = run(answers);
            assert!(
                matches!(result, Err(PromptError::Loan(LoanError::InvalidParameters(_)))),
                "{answers:?} accepted"
            );
        }
    }
}

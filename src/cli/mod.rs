// Operator shell - parses typed lines into workflow commands

pub mod shell;

use clap::{Parser, Subcommand};

use crate::model::{Department, RecordId};
use crate::workflow::{Command, ConsultForm, OrderTestForm, TopUpForm, VitalsForm};

pub use shell::run_shell;

/// One line typed at the `meditrack>` prompt
#[derive(Parser, Debug)]
#[command(name = "meditrack", no_binary_name = true, disable_help_flag = true, disable_help_subcommand = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// Register (or fetch) a patient by RFID tag
    Register {
        /// RFID tag identifier
        token: String,
        /// Patient display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Start a visit in a department (GENERAL, ER, CARDIOLOGY, ORTHOPEDICS, PEDIATRICS, NEUROLOGY)
    #[command(name = "start-visit")]
    StartVisit {
        #[arg(value_parser = parse_department)]
        department: Department,
    },
    /// Record vitals; omitted values are not measured
    Vitals {
        #[arg(long)]
        temp: Option<String>,
        #[arg(long)]
        sys: Option<String>,
        #[arg(long)]
        dia: Option<String>,
        #[arg(long)]
        hr: Option<String>,
    },
    /// Record the consultation
    Consult {
        #[arg(long)]
        diagnosis: Option<String>,
        #[arg(long)]
        meds: Option<String>,
        /// Flag that lab tests are needed
        #[arg(long)]
        tests: bool,
    },
    /// Order a lab test for the active visit
    #[command(name = "order-test")]
    OrderTest {
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },
    /// Complete the most recently ordered lab test
    #[command(name = "complete-test")]
    CompleteTest {
        /// Result text (defaults to "Normal")
        #[arg(long)]
        result: Option<String>,
    },
    /// List bills for the active visit
    Bills,
    /// Pay a bill from the patient's wallet
    Pay { billing_id: RecordId },
    /// Discharge the patient from the open visit
    Discharge,
    /// Show the active visit's summary
    Summary,
    /// Add money to the patient's wallet
    #[command(name = "top-up")]
    TopUp {
        amount: String,
        #[arg(long)]
        method: Option<String>,
    },
    /// Show the wallet balance
    Wallet,
    /// Show the session state
    Status,
    /// Show available commands
    Help,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn parse_department(value: &str) -> Result<Department, String> {
    value.parse()
}

impl ShellCommand {
    /// Workflow command for this line, or `None` for shell-only commands
    pub fn into_workflow(self) -> Option<Command> {
        let command = match self {
            ShellCommand::Register { token, name } => Command::Register {
                identity_token: token,
                full_name: name,
            },
            ShellCommand::StartVisit { department } => Command::StartVisit { department },
            ShellCommand::Vitals { temp, sys, dia, hr } => Command::RecordVitals(VitalsForm {
                temperature: temp.unwrap_or_default(),
                bp_systolic: sys.unwrap_or_default(),
                bp_diastolic: dia.unwrap_or_default(),
                heart_rate: hr.unwrap_or_default(),
            }),
            ShellCommand::Consult {
                diagnosis,
                meds,
                tests,
            } => Command::Consult(ConsultForm {
                diagnosis: diagnosis.unwrap_or_default(),
                medications: meds.unwrap_or_default(),
                tests_needed: tests,
            }),
            ShellCommand::OrderTest { name, price } => Command::OrderTest(OrderTestForm {
                test_name: name.unwrap_or_default(),
                price: price.unwrap_or_default(),
            }),
            ShellCommand::CompleteTest { result } => Command::CompleteTest { result_text: result },
            ShellCommand::Bills => Command::ListBills,
            ShellCommand::Pay { billing_id } => Command::PayBill { billing_id },
            ShellCommand::Discharge => Command::Discharge,
            ShellCommand::Summary => Command::VisitSummary,
            ShellCommand::TopUp { amount, method } => Command::TopUpWallet(TopUpForm {
                amount,
                payment_method: method,
            }),
            ShellCommand::Wallet => Command::WalletBalance,
            ShellCommand::Status | ShellCommand::Help | ShellCommand::Quit => return None,
        };
        Some(command)
    }
}

/// Split a shell line into words, honouring single and double quotes
pub fn tokenize(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("Unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse one shell line. `Ok(None)` means the line was blank.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let words = tokenize(line)?;
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.to_string().trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_respects_quotes() {
        assert_eq!(
            tokenize(r#"register TAG-1 --name "Jane Doe""#).unwrap(),
            vec!["register", "TAG-1", "--name", "Jane Doe"]
        );
        assert_eq!(tokenize("  ").unwrap(), Vec::<String>::new());
        assert_eq!(tokenize("consult --meds ''").unwrap(), vec!["consult", "--meds", ""]);
        assert!(tokenize("register 'TAG").is_err());
    }

    #[test]
    fn test_parse_register_line() {
        let command = parse_line(r#"register TAG-1 --name "Jane Doe""#).unwrap().unwrap();
        assert_eq!(
            command.into_workflow(),
            Some(Command::Register {
                identity_token: "TAG-1".to_string(),
                full_name: Some("Jane Doe".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_vitals_keeps_blank_fields() {
        let command = parse_line("vitals --temp 37.5 --sys 120").unwrap().unwrap();
        match command.into_workflow() {
            Some(Command::RecordVitals(form)) => {
                assert_eq!(form.temperature, "37.5");
                assert_eq!(form.heart_rate, "");
            }
            other => panic!("expected vitals, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_department_is_rejected() {
        assert!(parse_line("start-visit DENTAL").is_err());
        let command = parse_line("start-visit er").unwrap().unwrap();
        assert_eq!(command, ShellCommand::StartVisit { department: Department::Emergency });
    }

    #[test]
    fn test_shell_only_commands() {
        assert_eq!(parse_line("status").unwrap().unwrap().into_workflow(), None);
        assert_eq!(parse_line("exit").unwrap(), Some(ShellCommand::Quit));
        assert_eq!(parse_line("").unwrap(), None);
    }
}

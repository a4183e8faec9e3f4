use anyhow::Result;
use clap::CommandFactory;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::presentation;
use crate::workflow::SessionHandle;

use super::{parse_line, ShellCommand, ShellLine};

const PROMPT: &str = "meditrack> ";

async fn write_block<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    if !text.ends_with('\n') {
        output.write_all(b"\n").await?;
    }
    Ok(())
}

/// Read operator commands line by line and run them against one session.
///
/// Returns when the input ends or the operator types `quit`.
pub async fn run_shell<R, W>(handle: &SessionHandle, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    info!("Operator shell started");

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                write_block(&mut output, &message).await?;
                continue;
            }
        };
        debug!(?command, "Parsed shell command");

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                let help = ShellLine::command().render_help().to_string();
                write_block(&mut output, &help).await?;
            }
            ShellCommand::Status => {
                let session = handle.snapshot().await;
                write_block(&mut output, &presentation::render_session(&session)).await?;
            }
            other => {
                if let Some(workflow_command) = other.into_workflow() {
                    let report = handle.dispatch(workflow_command).await;
                    write_block(&mut output, &presentation::render(&report)).await?;
                }
            }
        }
    }

    output.flush().await?;
    info!("Operator shell closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::mocks::ScriptedTransport;
    use crate::workflow::ClinicWorkflow;
    use serde_json::json;
    use std::sync::Arc;

    async fn run_script(transport: ScriptedTransport, script: &str) -> String {
        let handle = SessionHandle::new(ClinicWorkflow::new(Arc::new(transport)));
        let mut output = Vec::new();
        run_shell(&handle, script.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_shell_reports_precondition_failure() {
        let output = run_script(ScriptedTransport::new(), "start-visit ER\nquit\n").await;
        assert!(output.contains("Error: Register first"));
    }

    #[tokio::test]
    async fn test_shell_runs_registration_and_visit() {
        let transport = ScriptedTransport::new()
            .respond("POST", "/api/registration", json!({"id": 1, "rfidUid": "TAG-1", "fullName": "Jane Doe"}))
            .respond("POST", "/api/visits/start", json!({"id": 10}))
            .respond("GET", "/api/billing/visit/10", json!([]));

        let output = run_script(
            transport,
            "register TAG-1 --name \"Jane Doe\"\nstart-visit ER\nbills\nstatus\n",
        )
        .await;

        assert!(output.contains("Registered patientId=1"));
        assert!(output.contains("Visit started id=10"));
        assert!(output.contains("No bills."));
        assert!(output.contains("visit: 10"));
    }

    #[tokio::test]
    async fn test_shell_reports_parse_errors_and_continues() {
        let output = run_script(ScriptedTransport::new(), "start-visit DENTAL\nhelp\n").await;
        assert!(output.contains("Unknown department"));
        assert!(output.contains("order-test"));
    }
}

//! Interactive console exposing the bridge's three operations.
//!
//! Slash verbs are console-local; anything else goes to the dispatcher as
//! a command string, exactly as a remote agent would send it.

use anyhow::Result;
use tiller_core::Bridge;
use tiller_runtime::TillerHandle;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Screen,          // /screen
    Actions,         // /actions
    Help,            // /help
    Quit,            // /quit or /exit
    Send(String),    // forwarded to the dispatcher
    Unknown(String), // unrecognized slash verb
}

pub fn parse_console_line(input: &str) -> Option<ConsoleCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match trimmed {
        "/screen" => ConsoleCommand::Screen,
        "/actions" => ConsoleCommand::Actions,
        "/help" => ConsoleCommand::Help,
        "/quit" | "/exit" => ConsoleCommand::Quit,
        other if other.starts_with('/') => ConsoleCommand::Unknown(other.to_string()),
        other => ConsoleCommand::Send(other.to_string()),
    })
}

const HELP: &str = "\
/screen            structured read of the current page
/actions           suggested commands for every interactive element
/help              this overview
/quit              close the session and exit
anything else is sent as a command string, e.g.:
  click #save-btn
  type #search \"hello world\"
  select #country \"fr\"
  check #opt1 | uncheck #opt1 | choose #opt-red
  navigate http://localhost:5173/admin";

fn read_line() -> Option<String> {
    let mut buf = String::new();
    match std::io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("could not render result: {err}"),
    }
}

/// Serve the console until `/quit`, EOF, or ctrl-c.
pub async fn run(bridge: &Bridge, handle: &TillerHandle) -> Result<()> {
    println!("tiller ready; /help lists commands");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!(target: "console", "interrupt received");
                break;
            }
            line = handle.run_blocking(read_line) => {
                let Some(line) = line? else {
                    debug!(target: "console", "stdin closed");
                    break;
                };
                match parse_console_line(&line) {
                    None => {}
                    Some(ConsoleCommand::Quit) => break,
                    Some(ConsoleCommand::Help) => println!("{HELP}"),
                    Some(ConsoleCommand::Unknown(verb)) => {
                        println!("unknown console verb {verb}; /help lists commands");
                    }
                    Some(ConsoleCommand::Screen) => print_json(&bridge.screen_data().await),
                    Some(ConsoleCommand::Actions) => print_json(&bridge.screen_actions().await),
                    Some(ConsoleCommand::Send(command)) => {
                        print_json(&bridge.send_command(&command).await)
                    }
                }
            }
        }
    }

    Ok(())
}

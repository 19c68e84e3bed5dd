use crossbeam::channel::{self, Receiver};
use crossbeam::select;
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::thread;

use super::OperatorCommand;
use crate::controller::ArmController;

/// Why the operator console stopped reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Command,
    EndOfInput,
    Signal,
}

/// Installs the SIGINT/SIGTERM handler. The returned channel yields once per signal.
pub fn shutdown_signal() -> Result<Receiver<()>, ctrlc::Error> {
    let (tx, rx) = channel::bounded(1);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        let _ = tx.try_send(());
    })?;
    Ok(rx)
}

/// Reads stdin on a helper thread. The channel hangs up on EOF.
pub fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (tx, rx) = channel::unbounded();
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Runs operator commands against `controller` until `exit`, end of input or a
/// shutdown signal. The caller still owns stopping the controller.
pub fn run_console(
    lines: &Receiver<String>,
    shutdown: &Receiver<()>,
    controller: &ArmController,
) -> io::Result<ConsoleExit> {
    loop {
        print!("> ");
        io::stdout().flush()?;

        // A hung-up shutdown channel counts as a signal too.
        let line = select! {
            recv(shutdown) -> _ => return Ok(ConsoleExit::Signal),
            recv(lines) -> line => line,
        };
        let Ok(line) = line else {
            return Ok(ConsoleExit::EndOfInput);
        };

        match OperatorCommand::parse(&line) {
            None => {}
            Some(OperatorCommand::Exit) => return Ok(ConsoleExit::Command),
            Some(OperatorCommand::Help) => println!("{}", OperatorCommand::help_text()),
            Some(OperatorCommand::Trigger(message_id)) => {
                if !controller.trigger_external_event(message_id) {
                    warn!("Trigger was not delivered; is the vision controller connected?");
                }
            }
            Some(OperatorCommand::Unknown(word)) => {
                println!("Unknown command '{}'. Type 'help' for the list.", word);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_ends_console() {
        let controller = ArmController::default();
        let (_line_tx, lines) = channel::unbounded::<String>();
        let (signal_tx, shutdown) = channel::bounded(1);
        signal_tx.send(()).unwrap();

        let exit = run_console(&lines, &shutdown, &controller).unwrap();
        assert_eq!(exit, ConsoleExit::Signal);
    }

    #[test]
    fn test_signal_interrupts_idle_prompt() {
        let controller = ArmController::default();
        let (_line_tx, lines) = channel::unbounded::<String>();
        let (signal_tx, shutdown) = channel::bounded(1);

        let sender = thread::spawn(move || {
            thread::sleep(std::time::Duration::from_millis(50));
            signal_tx.send(()).unwrap();
            signal_tx
        });
        let exit = run_console(&lines, &shutdown, &controller).unwrap();
        assert_eq!(exit, ConsoleExit::Signal);
        drop(sender.join().unwrap());
    }

    #[test]
    fn test_exit_command() {
        let controller = ArmController::default();
        let (line_tx, lines) = channel::unbounded();
        let (_signal_tx, shutdown) = channel::bounded::<()>(1);
        for line in ["help", "", "start", "bogus", "exit", "reset"] {
            line_tx.send(line.to_string()).unwrap();
        }

        let exit = run_console(&lines, &shutdown, &controller).unwrap();
        assert_eq!(exit, ConsoleExit::Command);
        assert_eq!(lines.recv().unwrap(), "reset");
    }

    #[test]
    fn test_end_of_input() {
        let controller = ArmController::default();
        let (line_tx, lines) = channel::unbounded();
        let (_signal_tx, shutdown) = channel::bounded::<()>(1);
        line_tx.send(String::from("mode")).unwrap();
        drop(line_tx);

        let exit = run_console(&lines, &shutdown, &controller).unwrap();
        assert_eq!(exit, ConsoleExit::EndOfInput);
    }
}

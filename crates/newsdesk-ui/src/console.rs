//! Interactive panel
//!
//! A line editor loop over `NewsModel`. Each command produces some text to
//! print; toasts raised by the command are printed after it.

use crate::commands::{ConsoleCommand, HELP};
use crate::model::NewsModel;
use crate::render;
use anyhow::Result;
use newsdesk_core::{DeleteOutcome, SubmitOutcome};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

const PROMPT: &str = "news> ";

/// What the loop should do after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Quit,
}

/// Apply one command to the model
pub fn handle(model: &mut NewsModel, command: ConsoleCommand) -> Step {
    let output = match command {
        ConsoleCommand::Title(text) => {
            model.set_title(text);
            String::new()
        }
        ConsoleCommand::Content(text) => {
            model.set_content(text);
            String::new()
        }
        ConsoleCommand::Submit => match model.submit() {
            SubmitOutcome::Created(_) => model.render(),
            SubmitOutcome::Rejected(field) => format!("The {} field is required", field.label()),
            SubmitOutcome::Failed(_) => String::new(),
        },
        ConsoleCommand::Delete(target) => match model.delete(&target) {
            Some(DeleteOutcome::Deleted) => model.render(),
            Some(DeleteOutcome::Failed(_)) => String::new(),
            None => format!("No item at position {}", target),
        },
        ConsoleCommand::Refresh => {
            model.refresh();
            model.render()
        }
        ConsoleCommand::List => model.render(),
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Quit => return Step::Quit,
        ConsoleCommand::Unknown(line) => format!("Unknown command: {} (try `help`)", line),
        ConsoleCommand::Empty => String::new(),
    };
    Step::Continue(output)
}

/// Run the panel until the user quits
pub fn run(mut model: NewsModel) -> Result<()> {
    let mut editor = DefaultEditor::new()?;

    model.mount();
    println!("{}", model.render());
    print_toasts(&model);
    println!("Type `help` for commands.");

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        let command = ConsoleCommand::parse(&line);
        debug!("Console command: {:?}", command);

        match handle(&mut model, command) {
            Step::Continue(output) => {
                if !output.is_empty() {
                    println!("{}", output.trim_end());
                }
                print_toasts(&model);
            }
            Step::Quit => break,
        }
    }

    info!("Panel closed");
    Ok(())
}

fn print_toasts(model: &NewsModel) {
    for toast in model.take_toasts() {
        println!("{}", render::render_toast(&toast));
    }
}

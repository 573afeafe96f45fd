//! Menu-driven session: the terminal stand-in for the search page.

use std::{fmt, io};

use inquire::{InquireError, Select, Text};
use nimbus_core::Controller;

use crate::render::TerminalPresenter;

#[derive(Debug, Clone, PartialEq)]
enum Action {
    Search,
    UseLocation,
    Revisit(String),
    ToggleTheme(&'static str),
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Search => f.write_str("🔍 Search a city"),
            Action::UseLocation => f.write_str("📍 Use my location"),
            Action::Revisit(city) => write!(f, "🕘 {city}"),
            Action::ToggleTheme(label) => f.write_str(label),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(controller: &Controller<TerminalPresenter>) -> Vec<Action> {
    let mut actions = vec![Action::Search, Action::UseLocation];
    actions.extend(controller.history().entries().iter().cloned().map(Action::Revisit));
    actions.push(Action::ToggleTheme(controller.theme().control_label()));
    actions.push(Action::Quit);
    actions
}

/// `Ok(None)` when the user cancels the prompt (Esc / Ctrl-C).
fn cancellable<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

pub async fn run(controller: &mut Controller<TerminalPresenter>) -> anyhow::Result<()> {
    loop {
        controller.presenter_mut().draw(&mut io::stdout().lock())?;

        let Some(action) = cancellable(Select::new("What next?", menu(controller)).prompt())?
        else {
            return Ok(());
        };

        match action {
            Action::Search => {
                // Enter submits; an empty answer is validated by the controller.
                if let Some(city) = cancellable(Text::new("City:").prompt())? {
                    controller.submit(&city).await;
                }
            }
            Action::UseLocation => {
                controller.use_location().await;
            }
            Action::Revisit(city) => {
                controller.select_history(&city).await;
            }
            Action::ToggleTheme(_) => {
                controller.toggle_theme();
            }
            Action::Quit => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_labels() {
        assert_eq!(Action::Revisit("Oslo".into()).to_string(), "🕘 Oslo");
        assert_eq!(Action::ToggleTheme("🌙 Dark Mode").to_string(), "🌙 Dark Mode");
    }

    #[test]
    fn cancelled_prompt_is_not_an_error() {
        let result: Result<String, InquireError> = Err(InquireError::OperationCanceled);
        assert!(matches!(cancellable(result), Ok(None)));
    }
}

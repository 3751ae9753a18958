//! Interactive search → pick → conditions loop.

use std::fmt;

use inquire::{InquireError, Select, Text};
use surf_core::{
    Action, Config, Location, Session,
    render::{SUBTITLE, TITLE, candidate_row},
};

enum Choice {
    Spot(Location),
    NewSearch,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Spot(location) => f.write_str(&candidate_row(location)),
            Choice::NewSearch => f.write_str("↩ New search"),
            Choice::Quit => f.write_str("✕ Quit"),
        }
    }
}

/// Esc and Ctrl-C end the loop instead of failing the command.
fn cancelled(err: &InquireError) -> bool {
    matches!(err, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let mut session = Session::from_config(config);

    println!("{TITLE}");
    println!("{SUBTITLE}");
    println!();

    loop {
        let query = match Text::new("Search locations...")
            .with_help_message("Esc to quit")
            .prompt()
        {
            Ok(query) => query,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        session.dispatch(Action::QueryChanged(query.trim().to_string()));
        session.run_until_idle().await;

        let candidates = session.state().search.candidates.clone();
        if candidates.is_empty() {
            print!("{}", session.search_area());
            continue;
        }

        let mut options: Vec<Choice> = candidates.into_iter().map(Choice::Spot).collect();
        options.push(Choice::NewSearch);
        options.push(Choice::Quit);

        let choice = match Select::new("Select a location", options).prompt() {
            Ok(choice) => choice,
            Err(err) if cancelled(&err) => break,
            Err(err) => return Err(err.into()),
        };

        match choice {
            Choice::Spot(location) => {
                session.dispatch(Action::CandidateSelected(location));
                session.run_until_idle().await;

                println!();
                print!("{}", session.detail_pane());
                println!();

                if session.state().detail.reading().is_none() {
                    eprintln!("(run with -v for details)");
                }
            }
            Choice::NewSearch => {}
            Choice::Quit => break,
        }

        session.dispatch(Action::ClearSelection);
    }

    Ok(())
}

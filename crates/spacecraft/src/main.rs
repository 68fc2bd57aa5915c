mod cli;
mod lessons;
mod paths;
mod run;

use anyhow::Result;
use cli::{Cli, Command, ConfigAction};

/// Process exit code for any setup or rendering failure.
const FAILURE_EXIT_CODE: i32 = -1;

fn main() {
    let cli = cli::parse();
    run::initialise_tracing();

    if let Err(err) = dispatch(cli) {
        tracing::error!("{err:#}");
        std::process::exit(FAILURE_EXIT_CODE);
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Lessons) => {
            run::print_lessons();
            Ok(())
        }
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::config_where(&cli.run),
            ConfigAction::Show => run::config_show(&cli.run),
        },
        None => run::run(cli.run),
    }
}

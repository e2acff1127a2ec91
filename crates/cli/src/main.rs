pub(crate) mod args;
pub(crate) mod error;
pub(crate) mod exec;
pub(crate) mod log_args;
pub(crate) mod output;

use args::{Arguments, Subcommands};
use clap::Parser;
use error::Error;
use exec::exec;
use output::print_report;

use ferret_config::{config, Configuration};

fn main() -> Result<(), Error> {
    let args = Arguments::parse();

    // setup logging, keeping the file writer alive until exit
    let _guard = args.logs.init_tracing()?;

    let configuration = Configuration::load()
        .map_err(|e| Error::Generic(format!("failed to load configuration: {}", e)))?;
    match args.sub {
        Subcommands::Exec(cmd) => {
            let report = exec(&cmd, &configuration)?;
            print_report(&report);
        }

        Subcommands::Config(cmd) => {
            config(cmd).map_err(|e| Error::Generic(format!("failed to configure: {}", e)))?;
        }
    }

    Ok(())
}

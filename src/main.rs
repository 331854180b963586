use clap::{Arg, Command};
use scroogecoin_lib::logging::{init_logging, LogFormat};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("scroogecoin")
        .about("ScroogeCoin ledger CLI tools.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Default log filter, overridden by RUST_LOG.")
                .takes_value(true)
                .global(true)
                .default_value("info"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("Log output format: pretty or json.")
                .takes_value(true)
                .global(true)
                .default_value("pretty"),
        )
        .subcommand(scroogecoin_lib::commands::keygen_command())
        .subcommand(scroogecoin_lib::commands::demo_command())
        .subcommand(scroogecoin_lib::commands::epoch_command())
        .get_matches();

    let log_format = matches.value_of_t::<LogFormat>("log-format")?;
    init_logging(matches.value_of("log-level").unwrap_or("info"), log_format);

    match matches.subcommand() {
        Some(("keygen", matches)) => scroogecoin_lib::commands::run_keygen_command(matches),
        Some(("demo", matches)) => scroogecoin_lib::commands::run_demo_command(matches),
        Some(("epoch", matches)) => scroogecoin_lib::commands::run_epoch_command(matches),
        _ => unreachable!("Subcommand is required."),
    }
}

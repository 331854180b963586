use crate::commands::epoch_file::{EpochFile, EpochReport};
use crate::{CandidateOrder, Ed25519Verifier, HandlerConfig, TxHandler};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

pub struct EpochCliOptions {
    input: PathBuf,
    config: HandlerConfig,
}

impl EpochCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let input = matches
            .value_of("input")
            .map(PathBuf::from)
            .ok_or("Missing required argument: input")?;
        let candidate_order = matches.value_of_t::<CandidateOrder>("order")?;
        Ok(Self {
            input,
            config: HandlerConfig { candidate_order },
        })
    }
}

pub fn epoch_command() -> Command<'static> {
    Command::new("epoch")
        .version("0.1")
        .about("Applies one epoch of proposed transactions to a pool snapshot.")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Epoch file with the pool snapshot and the candidate transactions.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("order")
                .long("order")
                .value_name("ORDER")
                .help("Order in which candidates are considered: submission or id.")
                .takes_value(true)
                .required(false)
                .default_value("submission"),
        )
}

pub fn run_epoch_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = EpochCliOptions::parse(matches)?;
    let epoch_file = EpochFile::read(&options.input)?;
    info!(
        input = %options.input.display(),
        pool_size = epoch_file.pool.len(),
        candidates = epoch_file.transactions.len(),
        "Loaded epoch file"
    );

    let pool = epoch_file.utxo_pool();
    let mut handler = TxHandler::with_config(&pool, options.config, Ed25519Verifier);
    let outcome = handler.handle_epoch(&epoch_file.transactions);

    let report = EpochReport::new(
        &outcome,
        options.config.candidate_order,
        handler.utxo_pool(),
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

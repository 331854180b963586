use crate::commands::epoch_file::EpochFile;
use crate::{Keypair, LedgerResult, Transaction, TransactionBuilder, TransactionOutput, UtxoPool};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

/// Builds a sample epoch: a genesis pool owned by alice and bob, and a batch of candidates
/// that exercises every way a transaction can be rejected.
pub fn demo_epoch() -> LedgerResult<EpochFile> {
    let alice = Keypair::generate();
    let bob = Keypair::generate();
    let carol = Keypair::generate();
    let mallory = Keypair::generate();

    let genesis = Transaction::new(
        vec![],
        vec![
            TransactionOutput::new(100.into(), alice.address()),
            TransactionOutput::new(50.into(), bob.address()),
        ],
    )?;
    let mut pool = UtxoPool::new();
    pool.add_transaction_outputs(&genesis);

    // Alice pays carol and keeps the change.
    let mut builder = TransactionBuilder::new();
    builder
        .add_input(*genesis.id(), 0)
        .add_output(60.into(), carol.address())
        .add_output(40.into(), alice.address());
    builder.sign_input(0, &alice)?;
    let payment = builder.build()?;

    // Alice tries to spend the same output again.
    let mut builder = TransactionBuilder::new();
    builder
        .add_input(*genesis.id(), 0)
        .add_output(100.into(), mallory.address());
    builder.sign_input(0, &alice)?;
    let double_spend = builder.build()?;

    // Bob pays out more than he owns.
    let mut builder = TransactionBuilder::new();
    builder
        .add_input(*genesis.id(), 1)
        .add_output(80.into(), carol.address());
    builder.sign_input(0, &bob)?;
    let overspend = builder.build()?;

    // Mallory signs for bob's output.
    let mut builder = TransactionBuilder::new();
    builder
        .add_input(*genesis.id(), 1)
        .add_output(50.into(), mallory.address());
    builder.sign_input(0, &mallory)?;
    let forged = builder.build()?;

    // Carol spends what she received earlier in the same epoch.
    let mut builder = TransactionBuilder::new();
    builder
        .add_input(*payment.id(), 0)
        .add_output(60.into(), bob.address());
    builder.sign_input(0, &carol)?;
    let chained = builder.build()?;

    Ok(EpochFile::new(
        &pool,
        vec![payment, double_spend, overspend, forged, chained],
    ))
}

pub fn demo_command() -> Command<'static> {
    Command::new("demo")
        .version("0.1")
        .about("Writes a sample epoch file with freshly generated keys.")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the epoch file to write.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_demo_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let output = matches
        .value_of("output")
        .map(PathBuf::from)
        .ok_or("Missing required argument: output")?;
    let epoch_file = demo_epoch()?;
    epoch_file.write(&output)?;
    info!(output = %output.display(), "Wrote demo epoch file");
    println!("{}", output.display());
    Ok(())
}

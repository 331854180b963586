use crate::Keypair;
use clap::{ArgMatches, Command};
use serde_json::json;
use std::error::Error;

pub fn keygen_command() -> Command<'static> {
    Command::new("keygen")
        .version("0.1")
        .about("Generates a new keypair and prints its secret key and address.")
}

pub fn run_keygen_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let keypair = Keypair::generate();
    let output = json!({
        "secret": keypair.secret_hex(),
        "address": keypair.address(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#![forbid(unsafe_code)]

mod args;
mod commands;
#[macro_use]
mod stdout;

use std::process;

use clap::Parser;
use uits::err::TAXONOMY;

use args::{Cli, Command};
use stdout::CliLogger;

fn main() {
    let cli = Cli::parse();

    CliLogger::setup(cli.common.verbose, cli.common.silent, cli.common.debug);

    let result = match &cli.command {
        Command::Create(args) => commands::create::run(args),
        Command::Verify(args) => commands::verify::run(args),
        Command::Extract(args) => commands::extract::run(args),
        Command::Hash(args) => commands::hash::run(args),
        Command::Key(args) => commands::key::run(args),
        Command::Errors => {
            print_taxonomy();
            Ok(())
        }
    };

    if let Err(err) = result {
        errorln!("{}", err);
        process::exit(err.exit_code());
    }
}

fn print_taxonomy() {
    print_header!("UITS error taxonomy");
    for (name, code) in TAXONOMY {
        print_entry!("{:<8}", name);
        println!("{}", code);
    }
}

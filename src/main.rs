use std::{io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use trade_ledger::{
    log::log_init,
    state::{StateError, StateFile},
    ContractService,
};

//==================== CLI ====================//

#[derive(Parser)]
#[command(name = "trade-ledger", version, about = "Trade contract ledger host")]
struct Cli {
    /// Ledger snapshot file; created on first write
    #[arg(long, global = true, default_value = "trade-ledger.json")]
    state: PathBuf,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the contract table
    Init,
    /// Mutating call: assign <contract> | updateDetails <key> <po> <invoice> <payment> <contract> <delivery>
    Invoke {
        function: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Read-only call: query <key>
    Query {
        function: String,
        /// Identity issuing the query
        #[arg(long)]
        caller: String,
        args: Vec<String>,
    },
    /// Print the ledger state root
    Root,
}

//==================== commands ====================//

fn run(cli: Cli) -> Result<(), StateError> {
    let state = StateFile::new(&cli.state);

    match cli.command {
        Command::Init => {
            state.mutate(|ledger| ContractService::new(ledger.clone()).init(&[]))?;
            println!("initialized {}", state.path().display());
        }
        Command::Invoke { function, args } => {
            state.mutate(|ledger| ContractService::new(ledger.clone()).invoke(&function, &args))?;
            println!("{function}: ok");
        }
        Command::Query {
            function,
            caller,
            args,
        } => {
            let bytes = state.read(|ledger| {
                ContractService::new(ledger.clone()).query(&function, &args, &caller)
            })?;
            let mut out = std::io::stdout().lock();
            out.write_all(&bytes)
                .and_then(|_| out.write_all(b"\n"))
                .map_err(|source| StateError::Io {
                    path: PathBuf::from("<stdout>"),
                    source,
                })?;
        }
        Command::Root => println!("{}", state.read(|ledger| ledger.state_root())?),
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    log_init(cli.verbose, cli.debug);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

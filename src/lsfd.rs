//! Helper utility to dump this process's open descriptors
use anyhow::{Context, Result};
use clap::Parser;

use closefrom::{listing, logging, Capabilities};

#[derive(Debug, Default, clap::Parser)]
struct Cli {
    /// also print what each descriptor refers to
    #[clap(short = 'l')]
    long: bool,
    /// log more; repeat for even more
    #[clap(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    logging::init(cli.verbose);

    let dir = Capabilities::detect().fd_dir
        .context("no descriptor listing on this system")?;
    for fd in listing::open_fds(dir).context("listing descriptors")? {
        if cli.long {
            let target = std::fs::read_link(dir.path().join(fd.to_string()))
                .map(|p| p.display().to_string())
                .unwrap_or_else(|e| format!("? ({})", e));
            println!("{}\t{}", fd, target);
        } else {
            println!("{}", fd);
        }
    }

    Ok(())
}

use std::{
    ffi::OsString,
    os::{fd::RawFd, unix::process::CommandExt},
    process::Command,
};

use anyhow::{Context, Result};
use clap::Parser;

use closefrom::{listing, logging, Capabilities, Reaper, Tier};

#[derive(Debug, clap::Parser)]
/// Close inherited file descriptors, then run a command
struct Cli {
    /// lowest descriptor to close
    #[clap(default_value_t = 3, short = 'l', long)]
    lowfd: RawFd,
    /// skip faster strategies: close-range, fd-dir or brute-force
    #[clap(short = 't', long)]
    tier: Option<Tier>,
    /// log more; repeat for even more
    #[clap(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
    /// command to run afterwards.  Without one, print the descriptors left open.
    #[clap(trailing_var_arg = true)]
    command: Vec<OsString>,
}

fn main() -> Result<()> {
    let cli: Cli = Cli::parse();
    logging::init(cli.verbose);

    let detected = Capabilities::detect();
    let caps = cli.tier.map_or(detected, |tier| detected.starting_at(tier));
    // No descriptor >= lowfd has an owner yet.
    unsafe { Reaper::new(caps).close_from(cli.lowfd) };

    if let Some((prog, args)) = cli.command.split_first() {
        let e = Command::new(prog).args(args).exec();
        return Err(e).with_context(|| format!("executing {}", prog.to_string_lossy()));
    }

    let dir = detected.fd_dir
        .context("no descriptor listing on this system")?;
    for fd in listing::open_fds(dir).context("listing descriptors")? {
        println!("{}", fd);
    }
    Ok(())
}

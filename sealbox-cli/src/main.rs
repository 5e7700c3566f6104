mod client;
mod edit;
mod list;
mod opts;
mod read;
mod redeem;
mod save;
mod share;
mod totp;
mod util;

use crate::opts::{Opts, Subcommand};
use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let opts = Opts::parse();

    match opts.subcmd {
        Subcommand::Save(o) => crate::save::exec(o).await,
        Subcommand::List(o) => crate::list::exec(o).await,
        Subcommand::Read(o) => crate::read::exec(o).await,
        Subcommand::Edit(o) => crate::edit::exec(o).await,
        Subcommand::Share(o) => crate::share::exec(o).await,
        Subcommand::Redeem(o) => crate::redeem::exec(o).await,
        Subcommand::Totp(o) => crate::totp::exec(o).await,
    }
}

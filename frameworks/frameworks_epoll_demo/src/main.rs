//! epoll Demo Binary Entry Point
//!
//! Runs one scenario and exits with a status describing the first failing
//! call: 1 for creation, 2 for `epoll_ctl`, 3 for `epoll_wait`.

use std::process;

use clap::Parser;
use frameworks_epoll_demo::{run, DemoArgs};

fn main() {
    env_logger::init();

    let args = DemoArgs::parse();
    match run(args.scenario) {
        Ok(report) => println!("{}", report),
        Err(e) => {
            log::error!("{}: {}", args.scenario.name(), e);
            process::exit(e.exit_code());
        }
    }
}

use anyhow::Result;
use clap::Parser;

use clipthat::commands::clip::{self, ClipArgs};

fn main() -> Result<()> {
    let args = ClipArgs::parse();
    clip::run(args)
}

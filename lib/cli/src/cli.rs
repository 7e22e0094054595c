//! The logic for the `sls-platform` CLI tool.

use clap::Parser;

use crate::commands::{CliCommand, CmdManifest, CmdPublish, CmdWhoami};

/// Command-line arguments for the `sls-platform` CLI.
#[derive(Parser, Debug)]
#[clap(
    name = "sls-platform",
    about = "Publish deployed Serverless services to the Serverless Platform.",
    version,
    author
)]
pub struct PlatformCmd {
    #[clap(flatten)]
    output: crate::logging::Output,
    #[clap(subcommand)]
    cmd: Cmd,
}

#[derive(clap::Subcommand, Debug)]
enum Cmd {
    /// Publish a deployed service
    Publish(CmdPublish),
    /// Print the manifest of a deployed service without publishing it
    Manifest(CmdManifest),
    /// Show the logged in user
    Whoami(CmdWhoami),
}

impl PlatformCmd {
    fn execute(self) -> Result<(), anyhow::Error> {
        let PlatformCmd { output, cmd } = self;

        output.initialize_logging();
        tracing::debug!(version = crate::VERSION, "Starting");

        match cmd {
            Cmd::Publish(publish) => publish.run(),
            Cmd::Manifest(manifest) => manifest.run(),
            Cmd::Whoami(whoami) => whoami.run(),
        }
    }
}

/// The main function for the `sls-platform` CLI tool.
pub fn platform_main() {
    let args = PlatformCmd::parse();

    if let Err(e) = args.execute() {
        eprintln!("error: {e:?}");
        std::process::exit(1);
    }
}

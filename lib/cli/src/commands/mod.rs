//! The commands available in the `sls-platform` binary.
mod manifest;
mod publish;
mod whoami;

pub use self::{manifest::CmdManifest, publish::CmdPublish, whoami::CmdWhoami};

/// An executable CLI command.
pub(crate) trait CliCommand {
    type Output;

    fn run(self) -> Result<Self::Output, anyhow::Error>;
}

/// An executable CLI command that runs in an async context.
///
/// An [`AsyncCliCommand`] automatically implements [`CliCommand`] by creating
/// a new tokio runtime and blocking.
#[async_trait::async_trait]
pub(crate) trait AsyncCliCommand: Send + Sync {
    type Output: Send + Sync;

    async fn run_async(self) -> Result<Self::Output, anyhow::Error>;
}

impl<O: Send + Sync, C: AsyncCliCommand<Output = O>> CliCommand for C {
    type Output = O;

    fn run(self) -> Result<O, anyhow::Error> {
        tokio::runtime::Runtime::new()?.block_on(AsyncCliCommand::run_async(self))
    }
}

pub mod idle;
pub mod report;

use super::args::Cli;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    idle::run(cli).await
}

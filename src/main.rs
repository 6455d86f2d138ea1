use clap::Parser;
use vpmatch::Opts;
use vpmatch::cli::SubCommandExtend;
use vpmatch::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Server(config) => config.run(&opts).await,
        SubCommand::Seed(config) => config.run(&opts).await,
        SubCommand::Show(config) => config.run(&opts).await,
    }
}

use crate::report::{run_listings_summary, ListingSummaryArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sira::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SIRA site backend",
    about = "Serve the SIRA listings and contact API or inspect the listings feed",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect the JustImmo listings feed
    Listings {
        #[command(subcommand)]
        command: ListingsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ListingsCommand {
    /// Drain the feed once and print catalog figures
    Summary(ListingSummaryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Listings {
            command: ListingsCommand::Summary(args),
        } => run_listings_summary(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["sira-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_listing_summary_filters() {
        let cli = Cli::try_parse_from([
            "sira-api",
            "listings",
            "summary",
            "--lang",
            "en",
            "--min-price",
            "200000",
            "--plz",
            "1190",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Listings {
                command: ListingsCommand::Summary(args),
            }) => {
                assert_eq!(args.lang.as_deref(), Some("en"));
                assert_eq!(args.min_price, Some(200_000.0));
                assert_eq!(args.plz.as_deref(), Some("1190"));
                assert_eq!(args.max_area, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

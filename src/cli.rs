use clap::Parser;

#[derive(Parser)]
#[command(
    version,
    about = "Convert proxy share links and Clash subscriptions into sing-box outbounds",
    long_about = None
)]
pub struct Args {
    #[arg(short, long, help = "Subscription to convert, accept file path or URL")]
    pub input: Option<String>,

    #[arg(short, long, help = "Converter config, accept file path or URL")]
    pub config: Option<String>,

    #[arg(short, long, help = "Outbounds output path, print to stdout if absent")]
    pub output: Option<String>,

    #[arg(short, long, help = "Emit debug log")]
    pub verbose: bool,
}

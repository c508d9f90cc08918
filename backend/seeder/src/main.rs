use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Seed the menu store with the reference catalog")]
struct Args {
    /// Month to seed, defaults to the configured month
    #[arg(long)]
    month: Option<String>,

    /// Year to seed, defaults to the configured year
    #[arg(long)]
    year: Option<i32>,

    /// Print what would be seeded without touching the store
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mess_server::init_tracing();

    let args = Args::parse();

    if args.dry_run {
        return seeder::preview();
    }

    seeder::seed(args.month, args.year).await
}

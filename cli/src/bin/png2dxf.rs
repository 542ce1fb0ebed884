use clap::{Parser, Subcommand};
use cli::{schema_json, ConvertArgs, SchemaTarget};
use color_eyre::eyre::Result;
use conversion::FsConversionService;
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trace an image and write its outlines to a DXF file
    Convert(ConvertArgs),
    /// Print a JSON schema
    Schema {
        #[arg(value_enum, default_value_t = SchemaTarget::Request)]
        target: SchemaTarget,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert(args) => convert(args).await?,
        Commands::Schema { target } => println!("{}", schema_json(*target)?),
    }

    Ok(())
}

async fn convert(args: &ConvertArgs) -> Result<()> {
    let config = args.service_config()?;
    let request = args.request(&config)?;
    let service = FsConversionService::from_config(&config)?;

    let job = service.submit(request).await?;
    let file = service.result(&job.id)?;
    info!("DXF written to {}", file.path.display());

    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

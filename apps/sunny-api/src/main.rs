use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = sunny_api::Args::parse();

	sunny_api::run(args).await
}

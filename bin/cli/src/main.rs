use anyhow::Context;
use clap::Parser;
use mitschau::{extractor::BASE_URL, MitschauExtractor};
use url::Url;

#[derive(Parser)]
#[clap(name = "mitschau", version)]
struct Args {
    /// Lecture page URL, e.g. https://videoonline.edu.lmu.de/en/node/8171
    url: String,

    /// Print the result as pretty JSON instead of a table
    #[clap(long)]
    json: bool,

    /// Pre-seed a cookie for the site (Set-Cookie syntax, repeatable),
    /// e.g. --cookie 'SSESSdeadbeef=token'
    #[clap(long = "cookie")]
    cookies: Vec<String>,

    /// Enable debug diagnostics
    #[clap(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        "mitschau=debug"
    } else {
        "mitschau=warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let extractor = MitschauExtractor::default();
    if !args.cookies.is_empty() {
        let base = Url::parse(BASE_URL).context("base URL")?;
        extractor.http().add_cookies(&args.cookies, &base);
    }

    let extraction = extractor
        .extract(&args.url)
        .await
        .map_err(|error| anyhow::anyhow!("[{:?}] {error}", error.kind()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    println!("{} ({})", extraction.title, extraction.id);
    if extraction.formats.is_empty() {
        println!("  no streams listed");
        return Ok(());
    }

    // worst-first, same order as the library returns
    for format in &extraction.formats {
        println!(
            "  {:>6} kbit/s  {:>5} px  {}",
            format.bitrate, format.width, format.url
        );
    }

    Ok(())
}

use std::error::Error;
use std::fs;

use log::info;
use structopt::StructOpt;

use lens_serve::{
    build_query, Config, LabelDetector, MockCommerce, ProductProvider, ProviderConfig,
};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "lens-search",
    about = "CLI app to search mock product listings from an image"
)]
struct CmdArgs {
    #[structopt(help = "Path to the image file")]
    image_path: String,

    #[structopt(long, help = "Remote label endpoint (defaults to mock detection)")]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = CmdArgs::from_args();

    let mut config = Config::from_env();
    if let Some(endpoint) = args.endpoint {
        config.provider = Some(ProviderConfig::new(&endpoint));
    }

    let detector = LabelDetector::from_config(&config);

    let image = fs::read(&args.image_path)?;
    let labels = detector.detect_labels(&image).await;

    if labels.is_empty() {
        return Err("could not detect any objects in the image".into());
    }

    let query = build_query(&labels);
    info!("searching products for: {}", query);

    let products = MockCommerce.search(&query);

    println!("{}", serde_json::to_string(&products)?);

    Ok(())
}

use argh::FromArgs;
use std::path::PathBuf;

mod messages;

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Detext client for scheduling detections and checking results
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "detect" or "results"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Detect(DetectCommand),
    Results(ResultsCommand),
}

#[derive(FromArgs)]
/// Run text detection on an image
#[argh(subcommand, name = "detect")]
struct DetectCommand {
    /// the path to the input image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// where the annotated image should be written
    #[argh(option, short = 'o')]
    output_path: PathBuf,
}

#[derive(FromArgs)]
/// Check detection results
#[argh(subcommand, name = "results")]
struct ResultsCommand {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    match args.command {
        ClientCommands::Detect(detect_command) => {
            let response = client
                .post(format!("http://{}/detections", addr))
                .json(&messages::DetectionRequest {
                    image_path: detect_command.image_path,
                    output_path: detect_command.output_path,
                })
                .send()
                .await?;

            let result = response.json::<serde_json::Value>().await?;
            println!("Result: {}", serde_json::to_string_pretty(&result)?);
        }
        ClientCommands::Results(_) => {
            let response = client
                .get(format!("http://{}/results", addr))
                .send()
                .await?;

            let result = response.json::<serde_json::Value>().await?;
            println!("Result: {}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use requesty::{Client, FilePart, LoggingHook, RequestOption, Response};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "requesty")]
#[command(about = "Send one HTTP request built from composable options")]
#[command(version)]
struct Cli {
    /// HTTP method to use (case-insensitive)
    #[arg(short = 'X', long, default_value = "get")]
    method: String,

    /// URL to request
    #[arg(value_name = "URL")]
    url: String,

    /// Request headers (format: "Name: Value")
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameters (format: key=value)
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,

    /// JSON body fields (format: key=value)
    #[arg(short = 'j', long = "json", conflicts_with = "form")]
    json: Vec<String>,

    /// Form fields (format: key=value)
    #[arg(short = 'd', long = "data")]
    form: Vec<String>,

    /// File parts (format: field=@path)
    #[arg(short = 'F', long = "file", conflicts_with = "json")]
    files: Vec<String>,

    /// Cookies (format: name=value)
    #[arg(short = 'b', long = "cookie")]
    cookies: Vec<String>,

    /// Gzip the request body
    #[arg(long)]
    gzip: bool,

    /// Timeout in seconds, 0 for none
    #[arg(short, long, default_value = "30")]
    timeout: u64,

    /// Maximum redirects to follow, 0 to disable
    #[arg(long, default_value = "10")]
    max_redirects: usize,

    /// Decode the body with this encoding label
    #[arg(short, long)]
    encoding: Option<String>,

    /// Show response headers
    #[arg(short = 'i', long)]
    show_headers: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Save the raw body to a file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log requests and responses (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone)]
enum OutputFormat {
    Text,
    Json,
    Headers,
}

fn key_value(arg: &str) -> anyhow::Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("expected key=value, got {:?}", arg),
    }
}

fn options(cli: &Cli) -> anyhow::Result<Vec<RequestOption>> {
    let mut options = Vec::new();

    for header in &cli.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("expected \"Name: Value\", got {:?}", header);
        };
        options.push(RequestOption::header(name.trim(), value.trim()));
    }

    let params = cli.params.iter().map(|p| key_value(p)).collect::<anyhow::Result<Vec<_>>>()?;
    if !params.is_empty() {
        options.push(RequestOption::params(params));
    }

    if !cli.json.is_empty() {
        let mut body = requesty::JsonMap::new();
        for field in &cli.json {
            let (key, value) = key_value(field)?;
            // Values that parse as JSON keep their type
            let value = serde_json::from_str(value)
                .unwrap_or_else(|_| requesty::JsonValue::String(value.to_string()));
            body.insert(key.to_string(), value);
        }
        options.push(RequestOption::Json(body));
    }

    let form = cli.form.iter().map(|f| key_value(f)).collect::<anyhow::Result<Vec<_>>>()?;
    if !form.is_empty() {
        options.push(RequestOption::form(form));
    }

    for file in &cli.files {
        let (field, path) = key_value(file)?;
        let Some(path) = path.strip_prefix('@') else {
            bail!("expected field=@path, got {:?}", file);
        };
        options.push(RequestOption::File(FilePart::with_path(field, path)));
    }

    let cookies = cli.cookies.iter().map(|c| key_value(c)).collect::<anyhow::Result<Vec<_>>>()?;
    if !cookies.is_empty() {
        options.push(RequestOption::cookies(cookies));
    }

    if cli.gzip {
        options.push(RequestOption::Gzip);
    }

    Ok(options)
}

fn status_line(response: &Response) -> String {
    let line = format!("{:?} {}", response.version(), response.status());
    if response.is_success() {
        line.green().bold().to_string()
    } else if response.is_redirect() {
        line.cyan().bold().to_string()
    } else if response.is_client_error() {
        line.yellow().bold().to_string()
    } else {
        line.red().bold().to_string()
    }
}

fn print_headers(response: &Response) {
    for (name, value) in response.headers() {
        println!("{}: {}", name.as_str().bold(), value.to_str().unwrap_or("<binary>"));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .hook(LoggingHook::new().include_headers(cli.verbose > 1));
    builder = if cli.max_redirects == 0 {
        builder.no_redirect()
    } else {
        builder.max_redirects(cli.max_redirects)
    };
    let client = builder.build().context("failed to build client")?;

    let options = options(&cli)?;
    let mut response = client
        .request(&cli.method, &cli.url, options)
        .await
        .with_context(|| format!("{} {} failed", cli.method.to_uppercase(), cli.url))?;

    if let Some(label) = &cli.encoding {
        response.set_encoding(label)?;
    }

    match cli.format {
        OutputFormat::Text => {
            eprintln!("{}", status_line(&response));
            if cli.show_headers {
                print_headers(&response);
                println!();
            }
        }
        OutputFormat::Headers => {
            println!("{}", status_line(&response));
            print_headers(&response);
            return Ok(());
        }
        OutputFormat::Json => {}
    }

    if let Some(path) = &cli.output {
        response
            .save_to_file(path)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("saved {} bytes to {}", response.bytes().len(), path.display());
        return Ok(());
    }

    match cli.format {
        OutputFormat::Json => {
            let headers = response
                .headers()
                .iter()
                .map(|(name, value)| {
                    (
                        name.to_string(),
                        requesty::JsonValue::String(value.to_str().unwrap_or("").to_string()),
                    )
                })
                .collect::<requesty::JsonMap<_, _>>();
            let body = response
                .json::<requesty::JsonValue>()
                .unwrap_or_else(|_| requesty::JsonValue::String(response.text().to_string()));

            let summary = serde_json::json!({
                "status": response.status().as_u16(),
                "url": response.url().as_str(),
                "headers": headers,
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        _ => println!("{}", response.text()),
    }

    Ok(())
}

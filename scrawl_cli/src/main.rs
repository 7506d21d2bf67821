use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use scrawl_backend::peer::{DrawingSurface, StrokeApplier, StrokeInput};
use scrawl_backend::protocol::{ClientEvent, LineCap, ServerEvent, StyleSettings};
use serde::Deserialize;
use spinners::{Spinner, Spinners};
use std::path::PathBuf;
use tokio_tungstenite::{connect_async, tungstenite::Message};

// Default endpoints of a locally running hub.
const HUB_WS_URL: &str = "ws://127.0.0.1:5000/ws";
const HUB_API_URL: &str = "http://127.0.0.1:5000";

/// A headless peer for the scrawl shared whiteboard.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw one stroke on the shared canvas.
    /// Example: scrawl draw --color "#FF0000" --width 3 10,10 20,25 30,30
    Draw {
        /// Stroke points as x,y pairs; the first is pointer down, the last
        /// is pointer up.
        #[arg(required = true)]
        points: Vec<String>,
        /// WebSocket URL of the hub.
        #[arg(long, default_value = HUB_WS_URL)]
        url: String,
        /// Stroke color as an RGB hex value.
        #[arg(long, default_value = "#000000")]
        color: String,
        /// Line width.
        #[arg(long, default_value_t = 1.0)]
        width: f64,
    },
    /// Publish an image file as a whole-canvas snapshot (snapshot-mode hubs).
    Send {
        /// Image file to publish.
        file: PathBuf,
        /// WebSocket URL of the hub.
        #[arg(long, default_value = HUB_WS_URL)]
        url: String,
    },
    /// Watch the shared canvas, printing every relayed event.
    Watch {
        /// WebSocket URL of the hub.
        #[arg(long, default_value = HUB_WS_URL)]
        url: String,
    },
    /// Show hub statistics.
    Stats {
        /// Base API URL of the hub.
        #[arg(long, default_value = HUB_API_URL)]
        url: String,
    },
}

// This struct is used to deserialize the JSON response from the hub.
#[derive(Deserialize, Debug)]
struct StatsResponse {
    peers_online: usize,
}

/// Terminal rendering sink: prints what a canvas would do.
struct TermSurface;

impl DrawingSurface for TermSurface {
    fn apply_settings(&mut self, settings: &StyleSettings) {
        println!(
            "style: {} at width {}",
            settings.stroke_style, settings.line_width
        );
    }
    fn begin_path(&mut self, x: f64, y: f64) {
        println!("stroke begins at ({x}, {y})");
    }
    fn line_to(&mut self, x: f64, y: f64) {
        println!("  segment to ({x}, {y})");
    }
    fn close_path(&mut self) {
        println!("stroke ends");
    }
    fn replace_image(&mut self, image: &str) {
        println!("canvas replaced ({} encoded bytes)", image.len());
    }
}

// Parse an "x,y" argument into coordinates.
fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("invalid point '{s}', expected x,y"))?;
    let x = x
        .trim()
        .parse()
        .map_err(|_| format!("invalid x coordinate in '{s}'"))?;
    let y = y
        .trim()
        .parse()
        .map_err(|_| format!("invalid y coordinate in '{s}'"))?;
    Ok((x, y))
}

// Map a file extension to the data-URI media type.
fn media_type(file: &PathBuf) -> &'static str {
    match file.extension().and_then(|e| e.to_str()) {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Draw {
            points,
            url,
            color,
            width,
        } => {
            let points = points
                .iter()
                .map(|p| parse_point(p))
                .collect::<Result<Vec<_>, _>>()?;
            if points.len() < 2 {
                return Err("a stroke needs at least two points".into());
            }

            let mut sp = Spinner::new(Spinners::Dots9, "Connecting to the hub...".into());
            let (mut socket, _) = connect_async(url.as_str()).await?;
            sp.stop_with_message("✓ Connected.".into());

            let settings = StyleSettings {
                line_cap: LineCap::Round,
                stroke_style: color,
                line_width: width,
            };
            let mut input = StrokeInput::new(settings);
            let mut surface = TermSurface;

            let (first, rest) = points.split_first().unwrap();
            let (last, middle) = rest.split_last().unwrap();

            let mut events = Vec::new();
            events.extend(input.pointer_down(first.0, first.1, &mut surface));
            for point in middle {
                events.extend(input.pointer_move(point.0, point.1, &mut surface));
            }
            events.extend(input.pointer_up(last.0, last.1, &mut surface));

            for event in &events {
                socket.send(Message::Text(event.encode())).await?;
            }
            socket.close(None).await?;
            println!("Sent a {}-point stroke.", points.len());
        }
        Commands::Send { file, url } => {
            let bytes = tokio::fs::read(&file).await?;
            let image = format!("data:{};base64,{}", media_type(&file), STANDARD.encode(&bytes));

            let mut sp = Spinner::new(Spinners::Dots9, "Publishing snapshot...".into());
            let (mut socket, _) = connect_async(url.as_str()).await?;
            socket
                .send(Message::Text(ClientEvent::Send { image }.encode()))
                .await?;
            socket.close(None).await?;
            sp.stop_with_message("✓ Snapshot published.".into());
        }
        Commands::Watch { url } => {
            let (mut socket, _) = connect_async(url.as_str()).await?;
            println!("Watching {url}, press Ctrl+C to stop.");

            let mut applier = StrokeApplier::new();
            let mut surface = TermSurface;
            while let Some(message) = socket.next().await {
                match message? {
                    Message::Text(text) => match ServerEvent::decode(&text) {
                        Ok(event) => applier.apply(&event, &mut surface),
                        Err(err) => eprintln!("Ignoring a bad event: {err}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
        Commands::Stats { url } => {
            let stats = reqwest::get(format!("{url}/api/stats"))
                .await?
                .json::<StatsResponse>()
                .await?;
            println!("Peers online: {}", stats.peers_online);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("10,20").unwrap(), (10.0, 20.0));
        assert_eq!(parse_point(" 1.5 , 2.5 ").unwrap(), (1.5, 2.5));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn picks_media_type_from_extension() {
        assert_eq!(media_type(&PathBuf::from("canvas.jpg")), "image/jpeg");
        assert_eq!(media_type(&PathBuf::from("canvas.png")), "image/png");
        assert_eq!(media_type(&PathBuf::from("canvas")), "image/png");
    }
}

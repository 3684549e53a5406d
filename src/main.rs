use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use emit_rs::util::hex::parse_hex_lenient;
use emit_rs::{
    init_logger, log_error, log_info, log_warn, pump, Emit250Decoder, EscanDecoder, FrameDecoder, FrameProtocol,
    Mtr4Decoder, SerialSettings,
};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;

const RECORD_CHANNEL_LEN: usize = 16;

#[derive(Parser)]
#[command(name = "emit-cli")]
#[command(about = "CLI tool for EMIT punch-card readers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Protocol {
    #[value(name = "emit250")]
    Emit250,
    Mtr4,
    Escan,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a capture from FILE or stdin and print one JSON object per record
    Decode {
        #[arg(short, long, value_enum)]
        protocol: Protocol,
        /// Emit 250 card headers before the full card
        #[arg(short, long)]
        metadata: bool,
        /// Input is hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
        file: Option<PathBuf>,
    },
    /// Decode live from a serial port until it closes
    Listen {
        #[arg(short, long, value_enum)]
        protocol: Protocol,
        #[arg(short, long)]
        metadata: bool,
        port: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let cli = Cli::parse();

    let result = execute(cli.command).await;
    if let Err(e) = &result {
        log_error(&format!("{e:#}"));
    }
    result
}

async fn execute(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Decode {
            protocol,
            metadata,
            hex,
            file,
        } => {
            let reader = open_input(file, hex).await?;
            decode(protocol, metadata, reader).await
        }
        Commands::Listen {
            protocol,
            metadata,
            port,
        } => {
            let settings = match protocol {
                Protocol::Emit250 => SerialSettings::EMIT_250,
                Protocol::Mtr4 => SerialSettings::MTR4,
                Protocol::Escan => anyhow::bail!("eScan units are read over USB, not a serial port"),
            };
            let stream = settings
                .open(&port)
                .with_context(|| format!("opening {port}"))?;
            log_info(&format!("Listening on {port}"));
            decode(protocol, metadata, Box::new(stream)).await
        }
    }
}

async fn open_input(
    file: Option<PathBuf>,
    hex: bool,
) -> anyhow::Result<Box<dyn AsyncRead + Unpin + Send>> {
    let mut reader: Box<dyn AsyncRead + Unpin + Send> = match &file {
        Some(path) => Box::new(
            tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    if !hex {
        return Ok(reader);
    }

    let mut text = String::new();
    reader.read_to_string(&mut text).await?;
    let bytes = parse_hex_lenient(&text).context("reading hex input")?;
    Ok(Box::new(std::io::Cursor::new(bytes)))
}

async fn decode(
    protocol: Protocol,
    metadata: bool,
    reader: Box<dyn AsyncRead + Unpin + Send>,
) -> anyhow::Result<()> {
    match protocol {
        Protocol::Emit250 => run(reader, Emit250Decoder::emit250(metadata)).await,
        Protocol::Mtr4 => run(reader, Mtr4Decoder::mtr4()).await,
        Protocol::Escan => run(reader, EscanDecoder::escan()).await,
    }
}

async fn run<P>(
    reader: Box<dyn AsyncRead + Unpin + Send>,
    mut decoder: FrameDecoder<P>,
) -> anyhow::Result<()>
where
    P: FrameProtocol,
    P::Record: Serialize,
{
    let (tx, mut rx) = mpsc::channel(RECORD_CHANNEL_LEN);

    let printer = async move {
        while let Some(record) = rx.recv().await {
            println!("{}", serde_json::to_string(&record)?);
        }
        Ok::<_, anyhow::Error>(())
    };

    let (pumped, printed) = tokio::join!(pump(reader, &mut decoder, tx), printer);
    printed?;
    let bytes = pumped?;

    log_info(&format!(
        "{}: {bytes} bytes, {:?}",
        decoder.protocol().name(),
        decoder.stats()
    ));
    let discarded = decoder.stats().frames_discarded;
    if discarded > 0 {
        log_warn(&format!(
            "{}: {discarded} frames discarded",
            decoder.protocol().name()
        ));
    }
    Ok(())
}

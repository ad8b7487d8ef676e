use clap::{Args, Parser, Subcommand, ValueEnum};
use qr_term::decoder::{BmpHeader, Converter};
use qr_term::{CharGrid, Config, ImageFormat, Pipeline, detector};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "qrterm", version, about = "Show a QR code image as terminal blocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the QR code as ANSI color blocks
    Render {
        #[command(flatten)]
        input: Input,
        /// Terminal columns per QR module
        #[arg(long)]
        module_width: Option<usize>,
    },
    /// Print the character grid, one symbol per module
    Grid {
        #[command(flatten)]
        input: Input,
        /// Print the decoded pixel grid without locating the QR code
        #[arg(long)]
        raw: bool,
    },
    /// Print BMP header fields and the inferred QR geometry
    Inspect {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Image file; standard input when omitted
    #[arg(long)]
    image: Option<PathBuf>,
    /// Input format; sniffed from the data when omitted
    #[arg(long)]
    format: Option<ImageFormat>,
    /// PNG converter; falls back to QR_CONVERTER, then PATH
    #[arg(long, value_enum)]
    converter: Option<ConverterArg>,
    /// Debug logging (same as QR_DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ConverterArg {
    Imagemagick,
    Sips,
    None,
}

impl Input {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(arg) = self.converter {
            config.converter = match arg {
                ConverterArg::Imagemagick => Some(Converter::imagemagick()),
                ConverterArg::Sips => Some(Converter::sips()),
                ConverterArg::None => None,
            };
        }
        config.debug |= self.verbose;
        config
    }

    fn read(&self) -> io::Result<Vec<u8>> {
        match &self.image {
            Some(path) => std::fs::read(path),
            None => {
                let mut bytes = Vec::new();
                io::stdin().lock().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    fn name(&self) -> String {
        self.image
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_owned())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Render {
            input,
            module_width,
        } => render_cmd(&input, module_width),
        Command::Grid { input, raw } => grid_cmd(&input, raw),
        Command::Inspect { input } => inspect_cmd(&input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("qrterm: {err}");
            ExitCode::FAILURE
        }
    }
}

fn setup(input: &Input) -> Config {
    let config = input.config();
    qr_term::debug::init_logging(config.debug);
    log::debug!("config: {config:?}");
    config
}

fn decode(pipeline: &Pipeline, input: &Input, bytes: &[u8]) -> qr_term::Result<CharGrid> {
    match input.format {
        Some(format) => pipeline.decode(format, bytes),
        None => pipeline.decode_bytes(bytes),
    }
}

type CmdResult = Result<(), Box<dyn std::error::Error>>;

fn render_cmd(input: &Input, module_width: Option<usize>) -> CmdResult {
    let mut config = setup(input);
    if let Some(width) = module_width {
        config = config.with_module_width(width);
    }
    let pipeline = Pipeline::new(config);

    let bytes = input.read()?;
    let grid = detector::trim(&decode(&pipeline, input, &bytes)?)?;
    let text = pipeline.render_grid(&grid);

    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn grid_cmd(input: &Input, raw: bool) -> CmdResult {
    let pipeline = Pipeline::new(setup(input));
    let bytes = input.read()?;
    let mut grid = decode(&pipeline, input, &bytes)?;
    if !raw {
        grid = detector::trim(&grid)?;
    }
    println!("{grid}");
    Ok(())
}

fn inspect_cmd(input: &Input) -> CmdResult {
    let pipeline = Pipeline::new(setup(input));
    let bytes = input.read()?;
    let format = match input.format {
        Some(format) => format,
        None => ImageFormat::sniff(&bytes)?,
    };

    println!("Image: {} ({:?}, {} bytes)", input.name(), format, bytes.len());
    if format == ImageFormat::Bmp {
        let header = BmpHeader::read(&mut bytes.as_slice())?;
        println!(
            "  size={}x{} order={:?} bpp={} compression={} planes={} pixel_offset={} dib_size={}",
            header.width(),
            header.height(),
            header.row_order(),
            header.bits_per_pixel,
            header.compression,
            header.planes,
            header.pixel_offset,
            header.dib_size
        );
    }

    let grid = pipeline.decode(format, bytes.as_slice())?;
    println!("Grid: {}x{}", grid.width(), grid.height());
    match detector::locate(&grid) {
        Ok(geometry) => println!(
            "QR: module_scale={} trim_offset={} region_length={} first_row={} modules={}",
            geometry.module_scale,
            geometry.trim_offset,
            geometry.region_length,
            geometry.first_row,
            geometry.modules()
        ),
        Err(err) => println!("QR: not found ({err})"),
    }
    Ok(())
}

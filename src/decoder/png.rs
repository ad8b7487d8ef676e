//! PNG input, delegated to an external converter.
//!
//! PNG itself is never parsed here. The bytes go to one of two converters:
//! - an ASCII-bitmap converter (ImageMagick `convert`) fed through stdin/stdout,
//!   whose plain PBM output goes to the PBM decoder;
//! - a BMP converter (`sips`), which refuses pipes, so input and output go
//!   through a private temporary directory that is removed on every exit path.

use super::GridDecoder;
use super::bmp::decode_bmp;
use super::pbm::parse_pbm;
use crate::error::{Error, Result};
use crate::models::CharGrid;
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// What a converter emits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterKind {
    /// Plain PBM (`P1`) on stdout
    AsciiBitmap,
    /// A BMP file written next to the input
    Bmp,
}

/// An external PNG converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converter {
    kind: ConverterKind,
    program: PathBuf,
}

impl Converter {
    /// Default program for the ASCII-bitmap path
    pub const IMAGEMAGICK: &'static str = "convert";
    /// Default program for the BMP path
    pub const SIPS: &'static str = "sips";

    /// A converter of `kind` run as `program`
    pub fn new(kind: ConverterKind, program: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            program: program.into(),
        }
    }

    /// ImageMagick `convert`, producing plain PBM
    pub fn imagemagick() -> Self {
        Self::new(ConverterKind::AsciiBitmap, Self::IMAGEMAGICK)
    }

    /// macOS `sips`, producing BMP
    pub fn sips() -> Self {
        Self::new(ConverterKind::Bmp, Self::SIPS)
    }

    /// Find an installed converter on `PATH`, preferring the ASCII-bitmap one
    pub fn detect() -> Option<Self> {
        Self::detect_in(&env::var_os("PATH")?)
    }

    /// [`Converter::detect`] over an explicit `PATH`-style search list
    pub fn detect_in(search_path: &OsStr) -> Option<Self> {
        let dirs: Vec<PathBuf> = env::split_paths(search_path).collect();
        [Self::imagemagick(), Self::sips()]
            .into_iter()
            .find(|c| dirs.iter().any(|d| is_executable(&d.join(&c.program))))
    }

    /// Output kind
    pub fn kind(&self) -> ConverterKind {
        self.kind
    }

    /// Program path or name
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn check(&self, output: &Output) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }
        log::debug!(
            "{} stderr: {}",
            self.program_name(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Err(Error::DecodeFailed {
            program: self.program_name(),
            status: output.status,
        })
    }

    /// PNG on stdin, plain PBM on stdout
    fn to_ascii_bitmap(&self, png: &[u8]) -> Result<Vec<u8>> {
        log::debug!("running {} for {} PNG bytes", self.program_name(), png.len());
        let mut child = Command::new(&self.program)
            .args(["png:-", "-compress", "none", "pbm:-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin gets its own thread: the converter may fill stdout before it
        // has drained its input.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "converter stdin unavailable")
        })?;
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(png));
            let output = child.wait_with_output();
            // A converter that exits early closes the pipe; its status says more.
            let _ = writer.join();
            output
        })?;

        self.check(&output)?;
        Ok(output.stdout)
    }

    /// PNG and BMP round trip through a private temporary directory
    fn to_bmp_grid(&self, png: &[u8]) -> Result<CharGrid> {
        let dir = tempfile::Builder::new().prefix("qrterm-").tempdir()?;
        let input = dir.path().join("code.png");
        let output = dir.path().join("code.bmp");
        fs::write(&input, png)?;

        log::debug!(
            "running {} in {}",
            self.program_name(),
            dir.path().display()
        );
        let result = Command::new(&self.program)
            .args(["-s", "format", "bmp"])
            .arg(&input)
            .arg("--out")
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()?;
        self.check(&result)?;

        let file = fs::File::open(&output)?;
        let grid = decode_bmp(std::io::BufReader::new(file))?;
        dir.close()?;
        Ok(grid)
    }
}

fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Decoder for PNG bytes via an optional converter
#[derive(Debug, Clone, Default)]
pub struct PngDecoder {
    converter: Option<Converter>,
}

impl PngDecoder {
    /// Decoder using `converter`, or failing when there is none
    pub fn new(converter: Option<Converter>) -> Self {
        Self { converter }
    }
}

impl GridDecoder for PngDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<CharGrid> {
        let mut png = Vec::new();
        reader.read_to_end(&mut png)?;
        decode_png(&png, self.converter.as_ref())
    }
}

/// Convert `png` with `converter` and decode the result.
pub fn decode_png(png: &[u8], converter: Option<&Converter>) -> Result<CharGrid> {
    let converter = converter.ok_or(Error::NoDecoderAvailable)?;
    match converter.kind {
        ConverterKind::AsciiBitmap => parse_pbm(&converter.to_ascii_bitmap(png)?),
        ConverterKind::Bmp => converter.to_bmp_grid(png),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_converter() {
        let err = decode_png(b"\x89PNG", None).unwrap_err();
        assert!(matches!(err, Error::NoDecoderAvailable));
    }

    #[test]
    fn test_converter_defaults() {
        assert_eq!(Converter::imagemagick().kind(), ConverterKind::AsciiBitmap);
        assert_eq!(Converter::sips().kind(), ConverterKind::Bmp);
        assert_eq!(Converter::sips().program(), Path::new("sips"));
    }

    #[test]
    fn test_missing_program_is_io_failure() {
        let converter = Converter::new(ConverterKind::AsciiBitmap, "/nonexistent/qrterm-convert");
        let err = decode_png(b"\x89PNG", Some(&converter)).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "{err:?}");

        let converter = Converter::new(ConverterKind::Bmp, "/nonexistent/qrterm-sips");
        let err = decode_png(b"\x89PNG", Some(&converter)).unwrap_err();
        assert!(matches!(err, Error::Io(_)), "{err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_in_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let search = env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(Converter::detect_in(&search), None);

        // present but not executable
        let convert = first.path().join("convert");
        fs::write(&convert, "").unwrap();
        assert_eq!(Converter::detect_in(&search), None);

        let sips = second.path().join("sips");
        fs::write(&sips, "").unwrap();
        fs::set_permissions(&sips, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(Converter::detect_in(&search), Some(Converter::sips()));

        fs::set_permissions(&convert, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(Converter::detect_in(&search), Some(Converter::imagemagick()));
    }
}

//! Headless driver for snapcrop.
//!
//! Replays one editing session: capture, pan/zoom, crop, export.
//!
//! Usage:
//!   cargo run -- sources                         List monitors and windows
//!   cargo run -- capture [options]               Capture the primary monitor
//!   cargo run -- capture --window Firefox ...    Capture a window by title
//!   cargo run -- capture --from shot.png ...     Use an image file as the frame

use snapcrop_lib::capture::{self, CaptureBackend, CaptureStream, XcapBackend};
use snapcrop_lib::export::DownloadDirSink;
use snapcrop_lib::{
    CaptureError, CaptureSource, CaptureTarget, CropRegion, Direction, DisplayLayout, EditorConfig,
    LayoutBox, Session,
};
use std::path::PathBuf;

const USAGE: &str = "\
Usage:
  snapcrop-cli sources
  snapcrop-cli capture [options]

Options:
  --monitor <name>     Capture the named monitor
  --window <title>     Capture the first visible window whose title contains <title>
  --from <image>       Load the frame from an image file instead of capturing
  --fit <WxH>          Lay the frame out inside a WxH container (default: natural size)
  --wheel <delta>      Apply a wheel event (repeatable)
  --scale <percent>    Set the scale slider
  --nudge <l|r|u|d>    Press a directional pan button (repeatable)
  --crop <X,Y,W,H>     Commit a crop selection, in layout pixels
  --rescale-pan        Scale the pan offset to capture resolution on export
  --out <dir>          Export directory (default: the download directory)";

#[derive(Debug, Default)]
struct Options {
    target: Option<CaptureTarget>,
    from: Option<PathBuf>,
    fit: Option<LayoutBox>,
    wheel: Vec<f32>,
    scale: Option<f32>,
    nudges: Vec<Direction>,
    crop: Option<CropRegion>,
    rescale_pan: bool,
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("sources") => run_sources(),
        Some("capture") => {
            let options = parse_options(&args[2..]).unwrap_or_else(|e| {
                eprintln!("{}\n\n{}", e, USAGE);
                std::process::exit(1);
            });
            if let Err(e) = run_capture(options).await {
                eprintln!("{}", e);
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

/// Prints capturable sources as JSON lines.
fn run_sources() {
    let sources = capture::list_sources().unwrap_or_else(|e| {
        eprintln!("Failed to list sources: {}", e);
        std::process::exit(1);
    });
    for source in sources {
        println!("{}", serde_json::to_string(&source).unwrap_or_default());
    }
}

async fn run_capture(options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EditorConfig::load()?;
    config.rescale_pan_offset |= options.rescale_pan;
    let mut session = Session::new(config);

    let layout = match options.fit {
        Some(container) => DisplayLayout::FitWithin(container),
        None => DisplayLayout::Natural,
    };
    let target = options.target.clone().unwrap_or(CaptureTarget::PrimaryMonitor);

    match &options.from {
        Some(path) => {
            let source = CaptureSource::new(FileBackend { path: path.clone() });
            session.capture(&source, target, layout).await?;
        }
        None => {
            let source = CaptureSource::new(XcapBackend);
            session.capture(&source, target, layout).await?;
        }
    }

    for delta in &options.wheel {
        session.on_wheel(*delta);
    }
    if let Some(scale) = options.scale {
        session.set_scale(scale);
    }
    for direction in &options.nudges {
        session.nudge(*direction);
    }
    if let Some(crop) = options.crop {
        session.crop_mut().complete(crop);
    }

    let t = session.transform();
    eprintln!(
        "scale {:.1}%  offset ({:.1}, {:.1})",
        t.scale, t.offset_x, t.offset_y
    );

    let mut sink = match options.out {
        Some(dir) => DownloadDirSink::new(dir),
        None => DownloadDirSink::user_downloads(),
    };
    let outcome = session.export(&mut sink)?;

    println!("{}", outcome.location);
    eprintln!(
        "--- {}x{} px, {} bytes ---",
        outcome.request.output_width, outcome.request.output_height, outcome.bytes
    );
    Ok(())
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        if flag == "--rescale-pan" {
            options.rescale_pan = true;
            continue;
        }
        let value = iter
            .next()
            .ok_or_else(|| format!("{} requires a value", flag))?;

        match flag.as_str() {
            "--monitor" => options.target = Some(CaptureTarget::Monitor(value.clone())),
            "--window" => options.target = Some(CaptureTarget::Window(value.clone())),
            "--from" => options.from = Some(PathBuf::from(value)),
            "--fit" => {
                let [w, h] = parse_numbers::<2>(value, 'x')?;
                options.fit = Some(LayoutBox::new(w, h));
            }
            "--wheel" => options.wheel.push(parse_number(value)?),
            "--scale" => options.scale = Some(parse_number(value)?),
            "--nudge" => options.nudges.push(parse_direction(value)?),
            "--crop" => {
                let [x, y, w, h] = parse_numbers::<4>(value, ',')?;
                options.crop = Some(CropRegion::new(x, y, w, h));
            }
            "--out" => options.out = Some(PathBuf::from(value)),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(options)
}

fn parse_number(value: &str) -> Result<f32, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Not a number: {}", value))
}

fn parse_numbers<const N: usize>(value: &str, separator: char) -> Result<[f32; N], String> {
    let parts: Vec<f32> = value
        .split(separator)
        .map(parse_number)
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| format!("Expected {} values separated by '{}': {}", N, separator, value))
}

fn parse_direction(value: &str) -> Result<Direction, String> {
    match value {
        "l" | "left" => Ok(Direction::Left),
        "r" | "right" => Ok(Direction::Right),
        "u" | "up" => Ok(Direction::Up),
        "d" | "down" => Ok(Direction::Down),
        _ => Err(format!("Unknown direction: {}", value)),
    }
}

/// Serves an image file as a one-frame capture stream.
struct FileBackend {
    path: PathBuf,
}

struct FileStream {
    path: Option<PathBuf>,
}

impl CaptureBackend for FileBackend {
    type Stream = FileStream;

    fn acquire(&self, _target: &CaptureTarget) -> Result<FileStream, CaptureError> {
        if !self.path.is_file() {
            return Err(CaptureError::Denied(format!(
                "no such file: {}",
                self.path.display()
            )));
        }
        Ok(FileStream {
            path: Some(self.path.clone()),
        })
    }
}

impl CaptureStream for FileStream {
    fn first_frame(&mut self) -> Result<image::RgbaImage, CaptureError> {
        let path = self.path.as_ref().ok_or(CaptureError::NoFrame)?;
        let image = image::open(path).map_err(|e| CaptureError::Failed(e.to_string()))?;
        Ok(image.to_rgba8())
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.path.is_some())
    }

    fn stop_all_tracks(&mut self) {
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn parses_full_session() {
        let options = parse_options(&args(
            "--window Term --fit 800x450 --wheel 50 --wheel -25 --nudge l --crop 40,20,400,225 --rescale-pan",
        ))
        .unwrap();
        assert_eq!(options.target, Some(CaptureTarget::Window("Term".into())));
        assert_eq!(options.fit, Some(LayoutBox::new(800.0, 450.0)));
        assert_eq!(options.wheel, vec![50.0, -25.0]);
        assert_eq!(options.nudges, vec![Direction::Left]);
        assert_eq!(options.crop, Some(CropRegion::new(40.0, 20.0, 400.0, 225.0)));
        assert!(options.rescale_pan);
    }

    #[test]
    fn rejects_malformed_crop() {
        assert!(parse_options(&args("--crop 1,2,3")).is_err());
        assert!(parse_options(&args("--crop")).is_err());
        assert!(parse_options(&args("--bogus 1")).is_err());
    }
}

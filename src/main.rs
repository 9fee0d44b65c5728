use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;

use watchqc::analysis::{AnalysisMode, AnalysisReport, CommandDelegate};
use watchqc::capture::ImageSource;
use watchqc::config::AppConfig;
use watchqc::domain::{HexColor, OverlayKind, Point, Size};
use watchqc::export::{DirectorySink, ExportFormat, default_download_dir};
use watchqc::gesture::events::parse_script;
use watchqc::session::{ControlMsg, Msg, Notice, Services, Session};

#[derive(Parser)]
#[command(name = "watchqc")]
#[command(version, about = "Align reference guides over watch photos, export and analyze", long_about = None)]
struct Cli {
    /// Photo of a watch face or timegrapher readout
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Reference guide: "indices" or "grid"
    #[arg(long, value_name = "KIND")]
    overlay: Option<OverlayKind>,

    /// Guide color
    #[arg(long, value_name = "#RRGGBB")]
    color: Option<HexColor>,

    /// Image rotation in degrees
    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    rotate: Option<f32>,

    /// Zoom factor (clamped to 0.1-10)
    #[arg(long, value_name = "FACTOR")]
    zoom: Option<f32>,

    /// Pan offset in viewport pixels
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true)]
    pan: Option<String>,

    /// JSON array of recorded input events to replay
    #[arg(long, value_name = "FILE")]
    gestures: Option<PathBuf>,

    /// Interaction surface size
    #[arg(long, value_name = "WxH")]
    viewport: Option<Size>,

    /// Export the composed view
    #[arg(short, long)]
    export: bool,

    /// Export format (png or jpeg)
    #[arg(long, value_name = "FORMAT")]
    format: Option<ExportFormat>,

    /// Output directory for exports
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Run analysis: "alignment" or "timegrapher"
    #[arg(long, value_name = "MODE")]
    analyze: Option<AnalysisMode>,

    /// Analysis command; reads the request JSON on stdin, prints the verdict JSON
    #[arg(long, value_name = "COMMAND")]
    delegate: Option<String>,

    /// Remember overlay, viewport and format choices as defaults
    #[arg(long)]
    save_defaults: bool,
}

fn parse_pan(value: &str) -> anyhow::Result<Point> {
    let (x, y) = value
        .split_once(',')
        .with_context(|| format!("expected X,Y, got '{value}'"))?;
    let x: f32 = x.trim().parse().with_context(|| format!("bad x offset '{x}'"))?;
    let y: f32 = y.trim().parse().with_context(|| format!("bad y offset '{y}'"))?;
    Ok(Point::new(x, y))
}

/// Apply a message and run whatever job it starts
async fn drive(session: &mut Session, services: &Services, msg: Msg) -> Option<Notice> {
    session.update(Msg::DismissNotice);
    if let Some(job) = session.update(msg) {
        log::debug!("running {:?}", job);
        let reply = job.run(services).await;
        session.update(reply);
    }
    session.notice().cloned()
}

fn print_report(report: &AnalysisReport) {
    match report {
        AnalysisReport::Alignment(verdict) => {
            println!("Grade: {:?}", verdict.grade);
            for issue in &verdict.issues {
                println!("  - {issue}");
            }
        }
        AnalysisReport::Timegrapher(reading) => {
            let (rate, amplitude, beat_error) = reading.bands();
            println!("Rate: {:+.1} s/d [{}]", reading.rate, rate.label());
            println!("Amplitude: {:.0} deg [{}]", reading.amplitude, amplitude.label());
            println!("Beat error: {:.1} ms [{}]", reading.beat_error, beat_error.label());
        }
    }
    if !report.summary().is_empty() {
        println!("{}", report.summary());
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(kind) = cli.overlay {
        config.overlay_kind = kind;
    }
    if let Some(color) = cli.color {
        config.overlay_color = color;
    }
    if let Some(viewport) = cli.viewport {
        config.viewport = viewport;
    }
    if let Some(format) = cli.format {
        config.export_format = format;
    }
    if cli.save_defaults {
        config.save();
    }

    let out_dir = cli
        .out
        .clone()
        .or_else(|| config.download_dir.clone())
        .or_else(default_download_dir)
        .context("no output directory; pass --out")?;
    let mut services = Services::new(Arc::new(DirectorySink::new(out_dir)));
    if let Some(line) = cli.delegate.as_deref() {
        let delegate = CommandDelegate::from_command_line(line).context("empty --delegate command")?;
        services = services.with_delegate(Arc::new(delegate));
    }

    let mut session = Session::new(config.session_settings());
    let source = ImageSource::Path(cli.image.clone());
    if let Some(notice) = drive(&mut session, &services, Msg::LoadImage(source)).await {
        bail!(notice.message);
    }

    if let Some(deg) = cli.rotate {
        session.update(Msg::Control(ControlMsg::SetRotation(deg)));
    }
    if let Some(scale) = cli.zoom {
        session.update(Msg::Control(ControlMsg::SetScale(scale)));
    }
    if let Some(pan) = cli.pan.as_deref() {
        session.update(Msg::Control(ControlMsg::SetTranslate(parse_pan(pan)?)));
    }
    if let Some(path) = &cli.gestures {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading gesture script {}", path.display()))?;
        let events = parse_script(&text)
            .with_context(|| format!("parsing gesture script {}", path.display()))?;
        log::info!("Replaying {} input events", events.len());
        for event in events {
            session.update(Msg::Input(event));
        }
    }

    let t = session.transform();
    println!(
        "Transform: rotation {:.2} deg, scale {:.2}, translate ({:.1}, {:.1})",
        t.rotation_deg(),
        t.scale(),
        t.translate().x,
        t.translate().y
    );

    let mut failed = false;
    if cli.export {
        match drive(&mut session, &services, Msg::Export).await {
            Some(notice) => {
                eprintln!("Export failed: {}", notice.message);
                failed = true;
            }
            None => {
                if let Some(artifact) = session.last_export() {
                    println!(
                        "Exported {}x{} to {}",
                        artifact.width,
                        artifact.height,
                        artifact.path.display()
                    );
                }
            }
        }
    }

    if let Some(mode) = cli.analyze {
        match drive(&mut session, &services, Msg::Analyze(mode)).await {
            Some(notice) => {
                eprintln!("Analysis failed: {}", notice.message);
                failed = true;
            }
            None => {
                if let Some(report) = session.analysis() {
                    print_report(report);
                }
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}

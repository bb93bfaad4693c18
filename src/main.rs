use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use log::info;

use hidlines::scene::LineColor;
use hidlines::{Engine, HiddenLineConfig, Projection, Scene, Transform};

#[derive(Parser, Debug)]
#[command(
    name = "hidlines",
    about = "Remove hidden lines from a polygonal OBJ scene and write the visible polylines"
)]
struct Args {
    /// Wavefront OBJ file to process
    input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also emit the hidden fragments as a dimmed second object
    #[arg(long)]
    hidden: bool,

    /// Drop polygons facing away from the viewer
    #[arg(long)]
    cull_back_faces: bool,

    /// Keep edges tagged internal
    #[arg(long)]
    internal_edges: bool,

    /// Emit only the first N edges of every polygon
    #[arg(long)]
    edges_per_polygon: Option<usize>,

    /// Reject edges entirely outside the unit screen square
    #[arg(long)]
    clip: bool,

    /// Number of Y buckets
    #[arg(long, default_value_t = hidlines::config::DEFAULT_HASH_BUCKETS)]
    buckets: usize,

    /// Longest polyline to emit, in vertices
    #[arg(long, default_value_t = hidlines::config::DEFAULT_MAX_POLYLINE_LEN)]
    max_polyline_len: usize,

    /// Classify fragments on all cores
    #[arg(long)]
    parallel: bool,

    /// Stroke width of visible lines
    #[arg(long)]
    width: Option<f64>,

    /// Stroke color as a palette index
    #[arg(long)]
    color: Option<u8>,

    /// Stroke color as "r,g,b"; wins over --color
    #[arg(long, value_parser = parse_rgb)]
    rgb: Option<[u8; 3]>,

    /// Color scale of the hidden object
    #[arg(long, default_value_t = 0.5)]
    hidden_color_ratio: f64,

    /// Width scale of the hidden object
    #[arg(long, default_value_t = 0.5)]
    hidden_width_ratio: f64,

    /// View rotation about X, in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rx: f64,

    /// View rotation about Y, in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    ry: f64,

    /// View rotation about Z, in degrees
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rz: f64,

    /// Uniform view scale
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// View translation along Z, applied after rotation and scale
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    distance: f64,

    /// Vertical field of view in degrees; enables perspective
    #[arg(long)]
    fov: Option<f64>,
}

fn parse_rgb(value: &str) -> Result<[u8; 3], String> {
    let channels = value
        .split(',')
        .map(|c| c.trim().parse::<u8>().map_err(|err| format!("bad channel {c:?}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;
    <[u8; 3]>::try_from(channels).map_err(|c| format!("expected 3 channels, got {}", c.len()))
}

fn main() -> hidlines::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let view = Transform::new()
        .rotated_degrees(args.rx, args.ry, args.rz)
        .scaled(args.scale)
        .translated(0.0, 0.0, args.distance);

    let mut scene = Scene::from_obj(&args.input, view.to_matrix())?;
    if let Some(fov) = args.fov {
        let projection = Projection::from_degrees(fov, 1.0, 0.1, 100.0);
        scene = scene.with_perspective(projection.matrix());
    }

    let mut config = HiddenLineConfig::new()
        .with_hidden(args.hidden)
        .with_back_face_culling(args.cull_back_faces)
        .with_internal_edges(args.internal_edges)
        .with_edges_per_polygon(args.edges_per_polygon)
        .with_screen_clipping(args.clip)
        .with_hash_buckets(args.buckets)
        .with_max_polyline_len(args.max_polyline_len)
        .with_parallel(args.parallel);
    config.line_width = args.width;
    config.color = args
        .rgb
        .map(LineColor::Rgb)
        .or(args.color.map(LineColor::Indexed));
    config.hidden_color_ratio = args.hidden_color_ratio;
    config.hidden_width_ratio = args.hidden_width_ratio;

    let output = Engine::new(config).run(&scene)?;
    info!(
        "{} visible polylines from {}",
        output.visible.polylines.len(),
        args.input.display()
    );

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            output.write_to(&mut out)?;
            out.flush()?;
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            output.write_to(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

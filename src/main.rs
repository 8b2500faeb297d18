use std::error::Error;
use std::io::Cursor;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgb};

use kai_report::engine::{ChatEngine, ScriptedEngine};
use kai_report::model::load_config;
use kai_report::sidecar::{find_matching_description_file, FieldDescriptions};
use kai_report::{
    Answer, DatasetSummary, ReportConfig, ReportRenderer, SessionEntry, TableData,
};

/// Renders demo analysis reports and manages dataset sidecar files.
///
/// Fonts must be present under `assets/fonts` relative to the crate or
/// provided via the `KAI_REPORT_FONTS_DIR` environment variable before
/// rendering.
#[derive(Parser)]
#[command(author, version, about = "Dataset analysis report tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a demo report with scripted text, chart and table answers.
    #[command(name = "report")]
    Report {
        /// Dataset label used in the banner and the output file name.
        #[arg(long, default_value = "demo.csv")]
        dataset_label: String,

        /// Directory receiving the generated PDF.
        #[arg(long, default_value = "results")]
        export_dir: PathBuf,

        /// Optional JSON report configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Optional font directory override.
        #[arg(long)]
        fonts_dir: Option<PathBuf>,
    },

    /// Write a column-description sidecar file for a dataset.
    #[command(name = "describe")]
    Describe {
        /// Dataset file name the sidecar belongs to.
        #[arg(long)]
        dataset: String,

        /// Directory the sidecar file is written to.
        #[arg(long, default_value = "datasources")]
        out_dir: PathBuf,

        /// Column descriptions as NAME=DESCRIPTION pairs.
        #[arg(long = "field", value_name = "NAME=DESCRIPTION")]
        fields: Vec<String>,
    },

    /// Look up the sidecar description file for a dataset.
    #[command(name = "find-descriptions", aliases = ["find_descriptions"])]
    FindDescriptions {
        /// Directory searched for sidecar files.
        #[arg(long, default_value = "datasources")]
        dir: PathBuf,

        /// Dataset file name to match against.
        #[arg(long)]
        dataset: String,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            dataset_label,
            export_dir,
            config,
            fonts_dir,
        } => run_report(dataset_label, export_dir, config, fonts_dir),
        Commands::Describe {
            dataset,
            out_dir,
            fields,
        } => run_describe(dataset, out_dir, fields),
        Commands::FindDescriptions { dir, dataset } => run_find_descriptions(dir, dataset),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run_report(
    dataset_label: String,
    export_dir: PathBuf,
    config_path: Option<PathBuf>,
    fonts_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => ReportConfig::default(),
    };
    config.export_dir = export_dir;
    if fonts_dir.is_some() {
        config.fonts_dir = fonts_dir;
    }

    // The demo ships no binary assets; generate the logo and chart imagery.
    let assets_dir = config.export_dir.join("demo-assets");
    std::fs::create_dir_all(&assets_dir)?;
    let logo_path = assets_dir.join("demo-logo.png");
    std::fs::write(
        &logo_path,
        generate_gradient_image(180, 90, [0, 0, 128], [120, 170, 220])?,
    )?;
    config.logo_path = logo_path;

    let chart_path = assets_dir.join("demo-chart.png");
    std::fs::write(
        &chart_path,
        generate_gradient_image(240, 140, [60, 92, 180], [228, 188, 152])?,
    )?;

    let mut engine = ScriptedEngine::new(vec![
        Answer::text(
            "The dataset covers 344 penguins across three species; Adelie is the most common.",
        ),
        Answer::chart(chart_path),
        Answer::table(TableData::new(
            vec![
                "species".to_owned(),
                "island".to_owned(),
                "bill_length_mm".to_owned(),
            ],
            vec![
                vec!["Adelie".to_owned(), "Torgersen".to_owned(), "39.1".to_owned()],
                vec!["Gentoo".to_owned(), "Biscoe".to_owned(), "47.5".to_owned()],
                vec!["Chinstrap".to_owned(), "Dream".to_owned(), "48.8".to_owned()],
            ],
        )),
    ]);

    let questions = [
        "What does the dataset contain?",
        "Plot the bill length distribution per species.",
        "Show one example row per species.",
    ];
    let mut entries = Vec::with_capacity(questions.len());
    for question in questions {
        let answer = engine.ask(question)?;
        entries.push(SessionEntry::new(question, answer));
    }

    let dataset = DatasetSummary::new(
        344,
        7,
        vec![
            "species".to_owned(),
            "island".to_owned(),
            "bill_length_mm".to_owned(),
            "bill_depth_mm".to_owned(),
            "flipper_length_mm".to_owned(),
            "body_mass_g".to_owned(),
            "sex".to_owned(),
        ],
    );

    let report = ReportRenderer::render(&config, &dataset_label, &entries, &dataset)?;
    println!("Generated {}", report.path.display());
    Ok(())
}

fn run_describe(
    dataset: String,
    out_dir: PathBuf,
    fields: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let mut descriptions = FieldDescriptions::new();
    for field in &fields {
        let (name, description) = field
            .split_once('=')
            .ok_or_else(|| format!("invalid --field value '{field}', expected NAME=DESCRIPTION"))?;
        descriptions.insert(name.trim(), description.trim());
    }

    if descriptions.is_empty() {
        return Err("at least one --field NAME=DESCRIPTION is required".into());
    }

    let path = descriptions.save(&out_dir, &dataset)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_find_descriptions(dir: PathBuf, dataset: String) -> Result<(), Box<dyn Error>> {
    match find_matching_description_file(&dir, &dataset)? {
        Some(path) => println!("Found {}", path.display()),
        None => println!("No description file matches {} in {}", dataset, dir.display()),
    }
    Ok(())
}

/// Renders a diagonal gradient between two anchor colours, used for the demo
/// logo and chart imagery.
fn generate_gradient_image(
    width: u32,
    height: u32,
    start: [u8; 3],
    end: [u8; 3],
) -> Result<Vec<u8>, image::ImageError> {
    let width_f = (width.saturating_sub(1)) as f32;
    let height_f = (height.saturating_sub(1)) as f32;
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        let xf = if width_f > 0.0 {
            x as f32 / width_f
        } else {
            0.0
        };
        let yf = if height_f > 0.0 {
            y as f32 / height_f
        } else {
            0.0
        };
        let mix = (0.65 * xf + 0.35 * yf).clamp(0.0, 1.0);
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            let from = start[index] as f32;
            let to = end[index] as f32;
            *channel = (from + (to - from) * mix).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(channels)
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

/*!
chartdeck Command Line Interface

Provides commands for inspecting datasets, printing chart manifests, and
rendering NVD3 payloads from CSV files with optional structure manifests.
*/

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chartdeck::reader::{CsvSource, RowSource, StructureFile, StructureSource};
use chartdeck::writer::{Nvd3Writer, Writer};
use chartdeck::{filter, schema, Dataset, DeckError, DEFAULT_PAGE_SIZE, VERSION};

#[derive(Parser)]
#[command(name = "chartdeck")]
#[command(about = "Dataset-to-chart aggregation for marketing dashboards")]
#[command(version = VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a dataset: structure, classification, and counts
    Inspect {
        /// Path to the CSV dataset
        data: PathBuf,

        /// Structure manifest path (inferred from the data when omitted)
        #[arg(long)]
        structure: Option<PathBuf>,

        /// Output format (pretty, json, debug)
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Show verbose output (load details)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the chart manifest derived from the dataset structure
    Manifest {
        /// Path to the CSV dataset
        data: PathBuf,

        /// Structure manifest path (inferred from the data when omitted)
        #[arg(long)]
        structure: Option<PathBuf>,

        /// Page to print (all charts when omitted)
        #[arg(long)]
        page: Option<usize>,

        /// Charts per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,

        /// Output format (pretty, json, debug)
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Show verbose output (load details)
        #[arg(short, long)]
        verbose: bool,
    },

    /// Aggregate charts and emit NVD3 payloads
    Render {
        /// Path to the CSV dataset
        data: PathBuf,

        /// Chart id to render (all charts when omitted)
        #[arg(long)]
        chart: Option<String>,

        /// Structure manifest path (inferred from the data when omitted)
        #[arg(long)]
        structure: Option<PathBuf>,

        /// Window start, inclusive (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Window end, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Output file path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Show verbose output (load details, filter statistics)
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { data, structure, format, verbose } => {
            cmd_inspect(data, structure, format, verbose);
        }

        Commands::Manifest { data, structure, page, page_size, format, verbose } => {
            cmd_manifest(data, structure, page, page_size, format, verbose);
        }

        Commands::Render { data, chart, structure, start, end, output, verbose } => {
            cmd_render(data, chart, structure, start, end, output, verbose);
        }
    }

    Ok(())
}

/// Load the dataset, reading the structure manifest or inferring one
fn load_dataset(data: &Path, structure: Option<&PathBuf>, verbose: bool) -> Dataset {
    let source = CsvSource::open(data);
    if let Err(e) = source {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let source = source.unwrap();

    let rows = source.rows();
    if let Err(e) = rows {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let rows = rows.unwrap();

    let descriptors = match structure {
        Some(path) => {
            let loaded = StructureFile::new(path).structure();
            if let Err(e) = loaded {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            loaded.unwrap()
        }
        None => {
            let names = source.column_names();
            if let Err(e) = names {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            if verbose {
                eprintln!("No structure manifest given, inferring from the data");
            }
            schema::infer_structure(&names.unwrap(), &rows)
        }
    };

    if verbose {
        eprintln!(
            "Loaded {} rows, {} columns from {}",
            rows.len(),
            descriptors.len(),
            data.display()
        );
    }

    let dataset = Dataset::load(descriptors, rows);
    if let Err(e) = dataset {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    dataset.unwrap()
}

fn cmd_inspect(data: PathBuf, structure: Option<PathBuf>, format: String, verbose: bool) {
    let dataset = load_dataset(&data, structure.as_ref(), verbose);

    match format.as_str() {
        "json" => {
            let summary = serde_json::json!({
                "rows": dataset.row_count(),
                "structure": dataset.structure(),
                "classified": dataset.columns(),
                "charts": dataset.manifest().len(),
            });
            match serde_json::to_string_pretty(&summary) {
                Ok(pretty) => println!("{}", pretty),
                Err(error) => eprintln!("{}", error),
            }
        }
        "debug" => {
            println!("{:#?}", dataset.structure());
            println!("{:#?}", dataset.columns());
        }
        "pretty" => {
            println!("Dataset: {}", data.display());
            println!("Rows: {}", dataset.row_count());
            println!("Columns: {}", dataset.structure().len());
            for descriptor in dataset.structure() {
                println!("  {}: {}", descriptor.name, descriptor.kind);
            }
            let columns = dataset.columns();
            match &columns.date {
                Some(name) => println!("Time dimension: {}", name),
                None => println!("Time dimension: none"),
            }
            println!("Measures: {}", columns.numeric.len());
            println!("Dimensions: {}", columns.categorical.len());
            println!("Charts: {}", dataset.manifest().len());
        }
        _ => {
            eprintln!("Unknown format: {}", format);
            std::process::exit(1);
        }
    }
}

fn cmd_manifest(
    data: PathBuf,
    structure: Option<PathBuf>,
    page: Option<usize>,
    page_size: usize,
    format: String,
    verbose: bool,
) {
    let dataset = load_dataset(&data, structure.as_ref(), verbose);

    let specs = match page {
        Some(p) => dataset.page(p, page_size),
        None => dataset.manifest(),
    };

    match format.as_str() {
        "json" => match serde_json::to_string_pretty(specs) {
            Ok(pretty) => println!("{}", pretty),
            Err(error) => eprintln!("{}", error),
        },
        "debug" => println!("{:#?}", specs),
        "pretty" => {
            println!(
                "Chart manifest: {} of {} charts, {} page(s) of {}",
                specs.len(),
                dataset.manifest().len(),
                dataset.page_count(page_size),
                page_size
            );
            for (i, spec) in specs.iter().enumerate() {
                println!("\nChart #{} ({:?}):", i + 1, spec.kind);
                println!("  Id: {}", spec.id);
                println!("  Title: {}", spec.title);
                println!("  Measure: {}", spec.measure);
                println!("  Dimension: {}", spec.dimension);
            }
        }
        _ => {
            eprintln!("Unknown format: {}", format);
            std::process::exit(1);
        }
    }
}

fn cmd_render(
    data: PathBuf,
    chart: Option<String>,
    structure: Option<PathBuf>,
    start: Option<String>,
    end: Option<String>,
    output: Option<PathBuf>,
    verbose: bool,
) {
    let range = filter::parse_range(start.as_deref(), end.as_deref());
    if let Err(e) = range {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let range = range.unwrap();

    let mut dataset = load_dataset(&data, structure.as_ref(), verbose);
    dataset.apply_filter(range);

    if verbose && !range.is_unbounded() {
        eprintln!(
            "Filtered view: {} of {} rows",
            dataset.filtered_rows().len(),
            dataset.row_count()
        );
    }

    let writer = Nvd3Writer::new();
    let rendered = match &chart {
        Some(id) => {
            let spec = dataset.find_chart(id);
            if let None = spec {
                eprintln!("Unknown chart id: {}", id);
                let known: Vec<&str> = dataset.manifest().iter().map(|s| s.id.as_str()).collect();
                eprintln!("Known ids: {}", known.join(", "));
                std::process::exit(1);
            }
            let spec = spec.unwrap();
            writer.write(spec, &dataset.aggregate(spec))
        }
        None => render_all(&dataset, &writer),
    };
    if let Err(e) = rendered {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    let rendered = rendered.unwrap();

    if let None = output {
        // Empty output location, write to stdout
        println!("{}", rendered);
        return ();
    }
    let output = output.unwrap();

    match std::fs::write(&output, &rendered) {
        Ok(_) => {
            if verbose {
                eprintln!("Payload written to: {}", output.display());
            }
        }
        Err(e) => {
            eprintln!("Failed to write to output file: {}", e);
            std::process::exit(1);
        }
    }
}

/// Render every chart of the manifest into one id-keyed payload object
fn render_all(dataset: &Dataset, writer: &Nvd3Writer) -> chartdeck::Result<String> {
    let mut payloads = serde_json::Map::new();
    for spec in dataset.manifest() {
        payloads.insert(spec.id.clone(), writer.payload(spec, &dataset.aggregate(spec))?);
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(payloads))
        .map_err(|e| DeckError::WriterError(format!("Failed to serialize payloads: {}", e)))
}

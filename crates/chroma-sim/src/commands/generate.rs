use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use chroma_core::{ChromaError, ErrorInfo};
use chroma_event::{Event, Vertex};
use chroma_gen::{GeneratorConfig, PhotonGenerator, ToyEngine};
use chroma_io::EventWriter;
use clap::Args;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// YAML generator configuration (material, seed, toy engine tuning).
    #[arg(long)]
    pub config: PathBuf,
    /// JSON array of primary vertices fired for every event.
    #[arg(long)]
    pub vertices: PathBuf,
    /// Output event file.
    #[arg(long)]
    pub out: PathBuf,
    /// Number of events to generate.
    #[arg(long, default_value_t = 1)]
    pub events: u64,
}

pub fn load_vertices(path: &Path) -> Result<Vec<Vertex>, ChromaError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        ChromaError::Config(
            ErrorInfo::new("vertices-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    serde_json::from_str(&contents).map_err(|err| {
        ChromaError::Config(
            ErrorInfo::new("vertices-parse", err.to_string())
                .with_context("path", path.display().to_string())
                .with_hint("expected a JSON array of vertex objects"),
        )
    })
}

pub fn run(args: &GenerateArgs) -> Result<(), Box<dyn Error>> {
    let config = GeneratorConfig::load(&args.config)?;
    let vertices = load_vertices(&args.vertices)?;
    let engine = ToyEngine::new(config.seed, config.toy.clone());
    let mut generator = PhotonGenerator::new(engine, &config.material, config.options())?;
    let mut writer = EventWriter::create(&args.out)?;

    for id in 0..args.events {
        let photons = generator.generate(&vertices)?;
        let mut event = Event::new(id);
        event.vertices = vertices.clone();
        log::info!("event {id}: {} photons", photons.len());
        if !photons.is_empty() {
            event.photons_beg = Some(photons);
        }
        writer.write(&event)?;
    }
    writer.close()?;
    log::info!(
        "wrote {} events to {}",
        writer.records_written(),
        args.out.display()
    );
    Ok(())
}

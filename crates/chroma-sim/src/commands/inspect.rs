use std::error::Error;
use std::path::PathBuf;

use chroma_event::{flags, Event};
use chroma_io::EventReader;
use clap::Args;
use serde_json::{json, Value};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Event file to read.
    #[arg(long)]
    pub input: PathBuf,
    /// Dump the full event at this index instead of per-event summaries.
    #[arg(long)]
    pub index: Option<usize>,
}

pub fn summary(event: &Event) -> Value {
    let photons = |bundle: &Option<chroma_event::Photons>| match bundle {
        Some(photons) => json!({
            "count": photons.len(),
            "detected": photons.count_with_flag(flags::SURFACE_DETECT),
        }),
        None => Value::Null,
    };
    let channels = event.channels.as_ref().map(|channels| {
        json!({
            "nchannels": channels.len(),
            "nhit": channels.hit_count(),
        })
    });
    json!({
        "id": event.id,
        "vertices": event
            .vertices
            .iter()
            .map(|vertex| json!({"particle": vertex.particle_name, "ke": vertex.ke}))
            .collect::<Vec<_>>(),
        "photons_beg": photons(&event.photons_beg),
        "photons_end": photons(&event.photons_end),
        "channels": channels,
    })
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let mut reader = EventReader::open(&args.input)?;
    match args.index {
        Some(index) => {
            let event = reader.seek(index)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        None => {
            for event in reader.iter() {
                println!("{}", serde_json::to_string(&summary(&event?))?);
            }
        }
    }
    Ok(())
}

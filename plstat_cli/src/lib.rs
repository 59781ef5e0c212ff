//! Reading persistence diagram series and label files for the `plstat` binary.
//!
//! Diagrams come as header-less CSV rows `time,birth,death`. A death of `-1`, `inf` or an empty
//! field marks an essential class. Labels come one per line, one line per time index.

use std::io;

use anyhow::{bail, Context, Result};
use plstat::{
    diagram::PersistencePair, Discretization, Landscape, LabelSequence, PersistenceDiagram,
};
use rustc_hash::FxHashMap;

pub fn read_diagrams<R: io::Read>(reader: R) -> Result<Vec<PersistenceDiagram>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut by_time: FxHashMap<usize, PersistenceDiagram> = FxHashMap::default();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Malformed diagram row {}", line + 1))?;
        if record.len() != 3 {
            bail!(
                "Diagram row {} has {} fields, expected time,birth,death",
                line + 1,
                record.len()
            );
        }
        let time: usize = record[0]
            .parse()
            .with_context(|| format!("Bad time index {:?} on row {}", &record[0], line + 1))?;
        let birth: f64 = record[1]
            .parse()
            .with_context(|| format!("Bad birth {:?} on row {}", &record[1], line + 1))?;
        let death = parse_death(&record[2])
            .with_context(|| format!("Bad death {:?} on row {}", &record[2], line + 1))?;
        let pair = PersistencePair::new(birth, death)
            .with_context(|| format!("Invalid pair on row {}", line + 1))?;
        by_time.entry(time).or_default().push(pair);
    }

    let num_times = by_time.keys().max().map_or(0, |max| max + 1);
    let mut diagrams = vec![PersistenceDiagram::default(); num_times];
    for (time, diagram) in by_time {
        diagrams[time] = diagram;
    }
    log::debug!("Read diagrams for {num_times} time indices");
    Ok(diagrams)
}

fn parse_death(field: &str) -> Result<f64> {
    match field {
        "" | "-1" | "inf" | "Inf" | "infinity" => Ok(f64::INFINITY),
        _ => Ok(field.parse()?),
    }
}

pub fn read_labels<R: io::Read>(reader: R) -> Result<LabelSequence> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let labels = rdr
        .records()
        .map(|record| {
            let record = record.context("Malformed label row")?;
            Ok(record.get(0).unwrap_or_default().to_owned())
        })
        .filter(|label: &Result<String>| !matches!(label, Ok(label) if label.is_empty()))
        .collect::<Result<LabelSequence>>()?;
    Ok(labels)
}

/// Builds one landscape per diagram, all on a single grid.
/// Bounds missing from `discretization` are inferred from the whole series.
pub fn build_landscapes(
    diagrams: &[PersistenceDiagram],
    hom_deg: usize,
    discretization: &Discretization,
) -> Result<Vec<Landscape>> {
    let pooled: PersistenceDiagram = diagrams
        .iter()
        .flat_map(|diagram| diagram.pairs().iter().copied())
        .collect();
    let grid = discretization
        .grid_for(&pooled)
        .context("Could not choose a grid for the landscapes")?;
    log::info!(
        "Building {} landscapes in degree {hom_deg} on [{}, {}] with {} steps",
        diagrams.len(),
        grid.start(),
        grid.stop(),
        grid.num_steps()
    );
    Ok(diagrams
        .iter()
        .map(|diagram| Landscape::from_diagram(diagram, hom_deg, grid))
        .collect())
}

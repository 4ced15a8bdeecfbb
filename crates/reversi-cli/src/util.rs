use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use reversi_engine::Snapshot;
use reversi_training::genome::Genome;
use serde::Deserialize;

use crate::model::tuning_report::TuningReport;

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush_output()
    }

    pub fn write_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.write_all(text.as_bytes())
            .with_context(|| format!("Failed to write text to {}", self.display_path()))?;
        self.flush_output()
    }

    fn flush_output(&mut self) -> anyhow::Result<()> {
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    tracing::debug!(kind = file_kind, path = %path.display(), "reading JSON file");
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PopulationFile {
    Genomes(Vec<Genome>),
    Report(TuningReport),
}

/// Read an initial population from a JSON file
///
/// Accepts either a plain array of genomes or a tuning report written by `train`,
/// in which case the report's final population is used.
pub fn read_population_file<P>(path: P) -> anyhow::Result<Vec<Genome>>
where
    P: AsRef<Path>,
{
    let population = match read_json_file("population", path)? {
        PopulationFile::Genomes(genomes) => genomes,
        PopulationFile::Report(report) => report.genomes(),
    };
    Ok(population)
}

/// Read a game snapshot in either its JSON or its text form
///
/// Files with a `.json` extension are parsed as JSON, everything else as text.
pub fn read_snapshot_file<P>(path: P) -> anyhow::Result<Snapshot>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        return read_json_file("snapshot", path);
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open snapshot file: {}", path.display()))?;
    text.parse()
        .with_context(|| format!("Failed to parse snapshot file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use reversi_stats::accumulator::Accumulator;
    use reversi_training::{evolution::RankedGenome, fitness::Score};

    use super::*;

    #[test]
    fn test_report_with_idle_survivor_reads_back_as_population() {
        let genome = Genome::combined(Genome::material(2.0), Genome::const_depth(0.5));
        let report = TuningReport {
            trained_at: Utc::now(),
            seed: 7,
            generations: 3,
            population: vec![RankedGenome {
                genome: genome.clone(),
                score: Score::from_accumulators(&Accumulator::new(), &Accumulator::new()),
                fitness: 0.0,
            }],
        };
        let json = serde_json::to_string_pretty(&report).unwrap();

        let PopulationFile::Report(back) = serde_json::from_str::<PopulationFile>(&json).unwrap()
        else {
            panic!("tuning report parsed as a plain genome list");
        };
        assert_eq!(back.genomes(), vec![genome]);
        assert!(back.population[0].score.time_dev.is_infinite());
    }

    #[test]
    fn test_plain_genome_list_is_a_population() {
        let json = r#"[{"kind": "material", "weight_ratio": 1.5}]"#;
        let PopulationFile::Genomes(genomes) = serde_json::from_str::<PopulationFile>(json).unwrap()
        else {
            panic!("genome list parsed as a tuning report");
        };
        assert_eq!(genomes, vec![Genome::material(1.5)]);
    }
}

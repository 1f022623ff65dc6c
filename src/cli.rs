use anyhow::Context;
use clap::Parser;
use jani_compose::{Assembler, JsonStatechart, JsonTranslator};
use jani_core::{ModelType, Property};
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

/// Assembles translated statecharts into a JANI model
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paths of the JSON files holding the translated statecharts
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    inputs: Vec<PathBuf>,
    /// Path of the JANI file to write; standard output if missing
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    output: Option<PathBuf>,
    /// Maximum number of elements of arrays, for each dimension
    #[arg(long, default_value = "100")]
    max_array_size: usize,
    /// Path of a JSON file holding a list of JANI properties
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    properties: Option<PathBuf>,
    /// Name of the model
    #[arg(long, default_value = "model")]
    model_name: String,
    /// Type of the model
    #[arg(long, default_value = "mdp")]
    model_type: ModelType,
}

impl Cli {
    pub fn run(&self) -> anyhow::Result<()> {
        let inputs = self
            .inputs
            .iter()
            .map(|path| JsonStatechart::load(path))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let properties = match &self.properties {
            Some(path) => load_properties(path)?,
            None => Vec::new(),
        };
        let model = Assembler::new(JsonTranslator)
            .with_model_name(self.model_name.as_str())
            .with_model_type(self.model_type)
            .convert(&inputs, self.max_array_size, properties)
            .with_context(|| format!("failed to build model '{}'", self.model_name))?;

        if let Some(path) = &self.output {
            info!("writing model to '{}'", path.display());
            let file = File::create(path)
                .with_context(|| format!("failed to create file '{}'", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &model)
                .with_context(|| format!("failed to write model to '{}'", path.display()))?;
            writer.flush()?;
        } else {
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, &model)
                .context("failed to write model to standard output")?;
            writeln!(stdout)?;
        }
        Ok(())
    }
}

fn load_properties(path: &Path) -> anyhow::Result<Vec<Property>> {
    info!(target: "parser", "parsing properties file '{}'", path.display());
    let reader = File::open(path)
        .with_context(|| format!("failed to create reader from file '{}'", path.display()))?;
    serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse properties in '{}'", path.display()))
}

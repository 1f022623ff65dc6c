use clap::Parser;
use scxml2jani::Cli;
use scxml2jani::jani_core::{Model, ModelType};
use std::path::PathBuf;

const MODELS: &str = "./jani_compose/tests/models";

fn output(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("scxml2jani-{}-{name}.jani", std::process::id()))
}

fn run(args: &[&str]) -> anyhow::Result<()> {
    let args = ["scxml2jani"].iter().chain(args);
    Cli::try_parse_from(args)?.run()
}

#[test]
fn convert_models() -> anyhow::Result<()> {
    let output = output("convert");
    let [client, server, logger, properties] =
        ["client", "server", "logger", "properties"].map(|name| format!("{MODELS}/{name}.json"));
    run(&[
        client.as_str(),
        server.as_str(),
        logger.as_str(),
        "--properties",
        properties.as_str(),
        "--model-name",
        "client_server",
        "--model-type",
        "DTMC",
        "--max-array-size",
        "4",
        "--output",
        output.to_str().unwrap(),
    ])?;
    let model: Model = serde_json::from_reader(std::fs::File::open(&output)?)?;
    std::fs::remove_file(&output)?;
    assert_eq!(model.name, "client_server");
    assert_eq!(model.model_type, ModelType::Dtmc);
    assert_eq!(model.automata.len(), 3);
    assert_eq!(model.properties.len(), 1);
    let server = model.automata.iter().find(|a| a.name == "Server").unwrap();
    let length = serde_json::to_value(server.variables.get("arr_length_1").unwrap())?;
    assert_eq!(length["type"]["upper-bound"], 4);
    Ok(())
}

#[test]
fn missing_input() {
    let err = run(&[format!("{MODELS}/missing.json").as_str()]).unwrap_err();
    assert!(format!("{err:#}").contains("missing.json"));
}

#[test]
fn bad_model_type() {
    assert!(Cli::try_parse_from(["scxml2jani", "a.json", "--model-type", "petri-net"]).is_err());
}

#[test]
fn inputs_are_required() {
    assert!(Cli::try_parse_from(["scxml2jani"]).is_err());
}

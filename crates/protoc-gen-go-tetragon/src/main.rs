//! protoc-gen-go-tetragon - protoc plugin generating Go helpers for the FGS API.
//!
//! protoc writes a serialized `CodeGeneratorRequest` to stdin and reads the
//! `CodeGeneratorResponse` from stdout. Logs go to stderr.

mod helpers;

use std::io::{Read, Write};

use anyhow::{Context, Result};
use prost::Message;
use tetragon_codegen::codegen::PLUGIN_NAME;
use tetragon_codegen::{init_tracing, Config, Plugin};

fn main() -> Result<()> {
    let config = Config::from_env()?;

    let mut input = Vec::new();
    std::io::stdin()
        .read_to_end(&mut input)
        .context("Failed to read request from stdin")?;

    let plugin = Plugin::decode(&input, config).context("Failed to parse code generator request")?;

    init_tracing(PLUGIN_NAME, &plugin.config().log_level);

    let response = plugin.run(helpers::generate);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&response.encode_to_vec())
        .context("Failed to write response to stdout")?;
    stdout.flush().context("Failed to flush stdout")?;

    Ok(())
}

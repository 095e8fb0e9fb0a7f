//! protoc plugin host.
//!
//! Turns a `CodeGeneratorRequest` into [`File`] views, hands each file that
//! protoc asked for to a generator and packs the output into a
//! `CodeGeneratorResponse`.

use prost::Message as _;
use prost_types::compiler::code_generator_response::{self, Feature};
use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
use prost_types::FileDescriptorProto;

use crate::codegen::GeneratedFile;
use crate::config::Config;
use crate::error::{CodegenError, Result};
use crate::schema::File;

pub struct Plugin {
    request: CodeGeneratorRequest,
    config: Config,
}

impl Plugin {
    /// Applies the request parameter on top of `config`.
    pub fn new(request: CodeGeneratorRequest, mut config: Config) -> Result<Self> {
        if let Some(parameter) = request.parameter.as_deref() {
            config.apply_parameter(parameter)?;
        }
        Ok(Self { request, config })
    }

    /// Decodes a serialized `CodeGeneratorRequest`, as read from stdin.
    pub fn decode(buf: &[u8], config: Config) -> Result<Self> {
        let request = CodeGeneratorRequest::decode(buf)?;
        Self::new(request, config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Descriptors of the files protoc asked to generate, in request order.
    fn files_to_generate(&self) -> Result<Vec<&FileDescriptorProto>> {
        self.request
            .file_to_generate
            .iter()
            .map(|name| {
                self.request
                    .proto_file
                    .iter()
                    .find(|f| f.name() == name)
                    .ok_or_else(|| CodegenError::UnknownFile(name.clone()))
            })
            .collect()
    }

    /// Runs `generator` over every file to generate.
    ///
    /// The first error aborts the run and is reported through the response
    /// `error` field, which is how protoc expects plugins to fail.
    pub fn run<F>(&self, mut generator: F) -> CodeGeneratorResponse
    where
        F: FnMut(&File<'_>, &Config) -> Result<Vec<GeneratedFile>>,
    {
        match self.generate(&mut generator) {
            Ok(files) => {
                tracing::info!(files = files.len(), "Generation complete");
                CodeGeneratorResponse {
                    supported_features: Some(Feature::Proto3Optional as u64),
                    file: files
                        .iter()
                        .map(|g| code_generator_response::File {
                            name: Some(g.filename().to_string()),
                            content: Some(g.content()),
                            ..Default::default()
                        })
                        .collect(),
                    ..Default::default()
                }
            }
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                CodeGeneratorResponse {
                    error: Some(e.to_string()),
                    supported_features: Some(Feature::Proto3Optional as u64),
                    ..Default::default()
                }
            }
        }
    }

    fn generate<F>(&self, generator: &mut F) -> Result<Vec<GeneratedFile>>
    where
        F: FnMut(&File<'_>, &Config) -> Result<Vec<GeneratedFile>>,
    {
        let mut generated = Vec::new();
        for desc in self.files_to_generate()? {
            let file = File::new(desc, &self.config)?;
            tracing::debug!(file = file.name(), "Generating");
            generated.extend(generator(&file, &self.config)?);
        }
        Ok(generated)
    }
}

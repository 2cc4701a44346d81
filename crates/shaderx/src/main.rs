mod config;

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use shader_cross::diagnostics::Severity;
use shader_cross::version::parse_version_flag;
use shader_cross::{
    stage, translate, Artifact, Diagnostics, Input, Request, ShaderCrossError, SourceLanguage,
    Stage, TargetLanguage, UsageError,
};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const STDIO: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "shaderx",
    about = "Translate GLSL or SPIR-V shaders to SPIR-V, GLSL, ESSL, HLSL or MSL."
)]
struct Args {
    /// Stage token (vs, tc, te, gs, fs, cs); inferred from the input extension when empty
    #[arg(short = 'S', long, default_value = "")]
    stage: String,

    /// Source files, or `-` for standard input
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,

    /// Destination file, or `-` for standard output
    #[arg(short, long, default_value = STDIO)]
    output: String,

    /// Source language: glsl or spirv
    #[arg(short = 'F', long, default_value = "glsl")]
    from: String,

    /// Target language: spirv, glsl, essl, hlsl or msl
    #[arg(short = 'T', long, default_value = "spirv")]
    target: String,

    /// Target version or shader model (e.g. 13, 450, 310, 60, 201); empty for the default
    #[arg(short = 'V', long, default_value = "")]
    version: String,

    /// Include search directory (repeatable)
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include: Vec<PathBuf>,
}

/// Where the artifact goes. A file is opened before translation starts and only written
/// once translation has succeeded.
enum Sink {
    Stdout,
    File {
        path: PathBuf,
        file: File,
        created: bool,
    },
}

impl Sink {
    fn open(name: &str) -> Result<Self, ShaderCrossError> {
        if name == STDIO {
            return Ok(Self::Stdout);
        }
        let path = PathBuf::from(name);
        let created = !path.exists();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| ShaderCrossError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(Self::File {
            path,
            file,
            created,
        })
    }

    fn write(self, artifact: &Artifact) -> anyhow::Result<()> {
        match self {
            Self::Stdout => {
                let bytes = artifact.stream_bytes()?;
                let mut stdout = io::stdout().lock();
                stdout.write_all(&bytes).context("write standard output")?;
                stdout.flush().context("write standard output")?;
            }
            Self::File { path, mut file, .. } => {
                file.set_len(0)
                    .and_then(|()| file.write_all(&artifact.file_bytes()))
                    .and_then(|()| file.flush())
                    .with_context(|| format!("write {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Removes a file this run created; a pre-existing file is left untouched.
    fn discard(self) {
        if let Self::File {
            path,
            file,
            created: true,
        } = self
        {
            drop(file);
            if let Err(err) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), %err, "failed to remove output");
            }
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut log = Diagnostics::new();
    match run(args, &mut log) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Error entries are already part of `err`.
            for entry in log.iter().filter(|d| d.severity == Severity::Warning) {
                eprintln!("{entry}");
            }
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args, log: &mut Diagnostics) -> anyhow::Result<()> {
    let from: SourceLanguage = args.from.parse()?;
    let target: TargetLanguage = args.target.parse()?;
    let version = parse_version_flag(&args.version)?;

    let names = if args.inputs.is_empty() {
        vec![STDIO.to_owned()]
    } else {
        args.inputs
    };
    if from == SourceLanguage::Glsl && stage::resolve(&args.stage, &names) == Stage::None {
        return Err(UsageError::UnresolvedStage.into());
    }
    if from == SourceLanguage::Spirv && names.len() != 1 {
        return Err(UsageError::TooManyBinaryInputs(names.len()).into());
    }

    let inputs = names
        .into_iter()
        .map(|name| {
            let bytes = read_input(&name)?;
            Ok(Input::new(name, bytes))
        })
        .collect::<Result<Vec<_>, ShaderCrossError>>()?;

    let config = Config::from_env();
    let request = Request {
        stage: args.stage,
        inputs,
        from,
        target,
        version,
        include_directories: config.include_directories(&args.include),
    };

    let sink = Sink::open(&args.output)?;
    let artifact = match translate(&request, log) {
        Ok(artifact) => artifact,
        Err(err) => {
            sink.discard();
            return Err(err.into());
        }
    };

    // Stdout carries the shader itself, so warnings go to stderr there.
    if !log.is_empty() {
        match sink {
            Sink::Stdout => eprintln!("{log}"),
            Sink::File { .. } => println!("{log}"),
        }
    }
    sink.write(&artifact)
}

fn read_input(name: &str) -> Result<Vec<u8>, ShaderCrossError> {
    let mut bytes = Vec::new();
    let result = if name == STDIO {
        io::stdin().lock().read_to_end(&mut bytes).map(|_| ())
    } else {
        File::open(Path::new(name)).and_then(|mut file| file.read_to_end(&mut bytes).map(|_| ()))
    };
    result.map_err(|source| ShaderCrossError::Io {
        path: PathBuf::from(name),
        source,
    })?;
    Ok(bytes)
}

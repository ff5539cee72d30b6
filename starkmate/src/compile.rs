use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use thiserror::Error;

use crate::bridge::{Bridge, Invocation};

pub const SIERRA_COMPILER: &str = "cairo-compile";
pub const CASM_COMPILER: &str = "cairo-compile-casm";
pub const SOURCE_EXTENSION: &str = "cairo";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{0} must have the .cairo extension")]
    WrongExtension(PathBuf),
    #[error("source file {0} does not exist")]
    SourceNotFound(PathBuf),
    #[error("{tool} is not available (install the Cairo toolchain{hint})")]
    ToolchainUnavailable { tool: &'static str, hint: &'static str },
    #[error("could not create output directory {path}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{stage} stage failed: `{command}` exited with {}", exit_description(.code))]
    StageFailed {
        stage: Stage,
        command: String,
        code: Option<i32>,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Sierra,
    Casm,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Sierra => write!(f, "sierra"),
            Stage::Casm => write!(f, "casm"),
        }
    }
}

/// Runs an [`Invocation`] to completion and returns its exit code, `None`
/// when the process was terminated by a signal.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if invocation.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }
        Ok(command.status()?.code())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub replace_ids: bool,
    pub allowed_libfuncs: Vec<String>,
    pub single_file: bool,
}

#[derive(Debug, Clone)]
pub struct CompilationRequest {
    pub source: PathBuf,
    pub out_dir: PathBuf,
    pub options: CompileOptions,
}

/// Output of the first stage; the only thing the second stage accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SierraArtifact {
    pub path: PathBuf,
    base_name: String,
    out_dir: PathBuf,
}

impl SierraArtifact {
    pub fn casm_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.casm.json", self.base_name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifactPair {
    pub sierra: PathBuf,
    pub casm: PathBuf,
}

pub struct Compiler<R = SystemRunner> {
    runner: R,
    bridge: Bridge,
}

impl Compiler {
    pub fn system() -> Self {
        Self::new(SystemRunner, Bridge::default())
    }
}

impl<R: CommandRunner> Compiler<R> {
    pub fn new(runner: R, bridge: Bridge) -> Self {
        Self { runner, bridge }
    }

    /// Validates the request, checks the toolchain and runs both stages.
    pub fn compile(&self, request: &CompilationRequest) -> Result<CompiledArtifactPair, CompileError> {
        validate_source(&request.source)?;
        self.check_toolchain()?;

        log::info!("compiling {} to sierra", request.source.display());
        let sierra = self.compile_sierra(&request.source, &request.out_dir, &request.options)?;
        log::info!("compiling {} to casm", sierra.path.display());
        self.compile_casm(sierra)
    }

    pub fn check_toolchain(&self) -> Result<(), CompileError> {
        let hint = match self.bridge {
            Bridge::Wsl => " inside WSL",
            Bridge::Native => "",
        };
        for tool in [SIERRA_COMPILER, CASM_COMPILER] {
            let version = self.bridge.invocation(tool, ["--version"]).quiet();
            log::debug!("checking `{version}`");
            match self.runner.run(&version) {
                Ok(Some(0)) => {}
                Ok(_) | Err(_) => return Err(CompileError::ToolchainUnavailable { tool, hint }),
            }
        }
        Ok(())
    }

    pub fn compile_sierra(
        &self,
        source: &Path,
        out_dir: &Path,
        options: &CompileOptions,
    ) -> Result<SierraArtifact, CompileError> {
        let base_name = validate_source(source)?;
        fs::create_dir_all(out_dir).map_err(|source| CompileError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let path = out_dir.join(format!("{base_name}.sierra.json"));
        let mut args = vec![
            self.bridge.translate(source),
            "--output".to_string(),
            self.bridge.translate(&path),
        ];
        if options.replace_ids {
            args.push("--replace-ids".to_string());
        }
        if !options.allowed_libfuncs.is_empty() {
            args.push("--allowed-libfuncs".to_string());
            args.push(options.allowed_libfuncs.join(","));
        }
        if options.single_file {
            args.push("--single-file".to_string());
        }

        self.run_stage(Stage::Sierra, self.bridge.invocation(SIERRA_COMPILER, args))?;
        Ok(SierraArtifact {
            path,
            base_name,
            out_dir: out_dir.to_path_buf(),
        })
    }

    pub fn compile_casm(&self, sierra: SierraArtifact) -> Result<CompiledArtifactPair, CompileError> {
        let casm = sierra.casm_path();
        let args = [
            self.bridge.translate(&sierra.path),
            "--output".to_string(),
            self.bridge.translate(&casm),
        ];
        self.run_stage(Stage::Casm, self.bridge.invocation(CASM_COMPILER, args))?;
        Ok(CompiledArtifactPair {
            sierra: sierra.path,
            casm,
        })
    }

    fn run_stage(&self, stage: Stage, invocation: Invocation) -> Result<(), CompileError> {
        log::debug!("running `{invocation}`");
        let command = invocation.to_string();
        match self.runner.run(&invocation) {
            Ok(Some(0)) => Ok(()),
            Ok(code) => Err(CompileError::StageFailed {
                stage,
                command,
                code,
            }),
            Err(source) => Err(CompileError::Spawn { command, source }),
        }
    }
}

/// Returns the file stem once the extension and existence checks pass.
fn validate_source(source: &Path) -> Result<String, CompileError> {
    if source.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
        return Err(CompileError::WrongExtension(source.to_path_buf()));
    }
    if !source.is_file() {
        return Err(CompileError::SourceNotFound(source.to_path_buf()));
    }
    source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| CompileError::WrongExtension(source.to_path_buf()))
}

use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::{
    compile::{CompilationRequest, CompileOptions, Compiler},
    config::Config,
    contracts::ArtifactPaths,
    deploy::deploy_contract,
    faucet::request_funds,
    scaffold::init_project,
};

/// StarkMate: your companion for working with StarkNet.
#[derive(Debug, Parser)]
#[clap(name = "starkmate", version, about)]
pub struct CommandLine {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Initialize a new StarkNet project in the current directory
    Init,

    /// Compile a Cairo contract to Sierra and Casm
    Compile(CompileArgs),

    /// Declare and deploy a compiled contract (<BASE_PATH>.sierra.json and <BASE_PATH>.casm.json)
    Deploy { base_path: PathBuf },

    /// Request test funds from the faucet
    Faucet { address: String },
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// Path to the .cairo source file
    source: PathBuf,

    #[clap(short, long, default_value = "out")]
    out_dir: PathBuf,

    #[clap(long)]
    replace_ids: bool,

    /// Comma separated list of allowed libfuncs
    #[clap(long, value_delimiter = ',')]
    allowed_libfuncs: Vec<String>,

    #[clap(long)]
    single_file: bool,
}

impl From<CompileArgs> for CompilationRequest {
    fn from(args: CompileArgs) -> Self {
        Self {
            source: args.source,
            out_dir: args.out_dir,
            options: CompileOptions {
                replace_ids: args.replace_ids,
                allowed_libfuncs: args.allowed_libfuncs,
                single_file: args.single_file,
            },
        }
    }
}

impl CommandLine {
    pub async fn execute(self, config: &Config) -> Result<()> {
        match self.command {
            Command::Init => {
                let base_dir = env::current_dir()?;
                init_project(&base_dir).context("failed to initialize project")?;
                println!("StarkNet project initialized, example files created.");
            }
            Command::Compile(args) => {
                let pair = Compiler::system()
                    .compile(&args.into())
                    .context("failed to compile contract")?;
                println!("contract compiled:");
                println!("  - Sierra: {}", pair.sierra.display());
                println!("  - Casm: {}", pair.casm.display());
            }
            Command::Deploy { base_path } => {
                let paths = ArtifactPaths::from_base(base_path);
                deploy_contract(config, &paths)
                    .await
                    .context("deployment failed")?;
            }
            Command::Faucet { address } => {
                let client = reqwest::Client::new();
                request_funds(&client, config.faucet_url(), &address)
                    .await
                    .context("failed to request funds")?;
                println!("funds requested for address: {address}");
            }
        }
        Ok(())
    }
}

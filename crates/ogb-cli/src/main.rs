use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use ogb_core::bundle::Bundle;
use ogb_core::bundle::naming::page_path;
use ogb_core::collate::{self, GroupKey};
use ogb_core::config::{self, CONFIG_FILE_NAME, OgbConfig};
use ogb_core::parse;
use ogb_core::parse::ref_resolve::{FsLoader, NoExternalRefs, RefLoader};
use ogb_core::parse::spec::ResolvedDocument;
use ogb_core::pipeline::{self, PipelineOptions};

#[derive(Parser)]
#[command(name = "ogb", about = "OpenAPI to GitBook documentation bundler", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a documentation bundle from an OpenAPI spec
    Build {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Archive path, or directory with --unpacked
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the bundle as a directory tree instead of an archive
        #[arg(long)]
        unpacked: bool,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show how operations are grouped into pages
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new ogb configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            unpacked,
        } => cmd_build(input, output, unpacked),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect { input, format } => cmd_inspect(input, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "ogb", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OgbConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn read_spec(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn loader_for(path: &Path, cfg: &OgbConfig) -> Box<dyn RefLoader> {
    if cfg.refs.external {
        Box::new(FsLoader::for_spec(path))
    } else {
        Box::new(NoExternalRefs)
    }
}

fn load_document(path: &Path, cfg: &OgbConfig) -> Result<ResolvedDocument> {
    let raw = read_spec(path)?;
    let loader = loader_for(path, cfg);
    let doc = parse::load(&raw, loader.as_ref())
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(doc)
}

/// Write the bundle's files under the given base directory.
fn write_files(base: &Path, bundle: &Bundle) -> Result<()> {
    for (name, contents) in bundle.files() {
        let path = base.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
    }
    Ok(())
}

fn cmd_build(input: Option<PathBuf>, output: Option<PathBuf>, unpacked: bool) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output = output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let raw = read_spec(&input)?;
    let loader = loader_for(&input, &cfg);
    let options = PipelineOptions::from(&cfg);

    eprintln!("Building {} → {}", input.display(), output.display());
    let bundle = pipeline::build_bundle(&raw, loader.as_ref(), &options)
        .with_context(|| format!("failed to build bundle from {}", input.display()))?;

    if unpacked {
        fs::create_dir_all(&output)
            .with_context(|| format!("failed to create output directory {}", output.display()))?;
        write_files(&output, &bundle)?;
    } else {
        let bytes = bundle.to_archive()?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&output, bytes)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    eprintln!("Bundled {} files into {}", bundle.len(), output.display());
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let doc = load_document(&input, &cfg)?;

    eprintln!("Valid OpenAPI {} spec: {}", doc.openapi, doc.info.title);
    eprintln!("  Version: {}", doc.info.version);
    eprintln!("  Paths: {}", doc.paths.len());
    eprintln!("  Operations: {}", doc.endpoints().count());
    eprintln!("  Tags: {}", doc.tags.len());

    // Also check that every operation lands on a page.
    collate::collate(&doc, cfg.tags.unknown)?;

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let doc = load_document(&input, &cfg)?;

    let summary = build_inspect_summary(&doc, &cfg)?;

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(doc: &ResolvedDocument, cfg: &OgbConfig) -> Result<serde_json::Value> {
    let groups = collate::collate(doc, cfg.tags.unknown)?;

    let pages = groups
        .iter()
        .map(|(key, group)| -> Result<serde_json::Value> {
            let page = page_path(&group.tag.name, cfg.pages.file_naming)?;
            let endpoints: Vec<String> = group
                .endpoints
                .iter()
                .map(|e| {
                    let line = format!("{} {}", e.method.as_str().to_uppercase(), e.path);
                    match &e.operation.operation_id {
                        Some(id) => format!("{line} ({id})"),
                        None => line,
                    }
                })
                .collect();
            Ok(serde_json::json!({
                "tag": group.tag.name,
                "untagged": *key == GroupKey::Untagged,
                "page": page,
                "endpoints": endpoints,
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(serde_json::json!({
        "info": {
            "title": doc.info.title,
            "version": doc.info.version,
            "description": doc.info.description,
        },
        "pages": pages,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogb_core::bundle::{README_PATH, SPEC_PATH, SUMMARY_PATH};

    const SPEC: &str = r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: 1.0.0
  description: Pets and their owners.
tags:
  - name: pets
paths:
  /pets:
    get:
      operationId: listPets
      tags: [pets]
  /owners:
    post: {}
"#;

    #[test]
    fn test_write_files_unpacked() {
        let dir = tempfile::tempdir().unwrap();
        let bundle =
            pipeline::build_bundle(SPEC, &NoExternalRefs, &PipelineOptions::default()).unwrap();
        write_files(dir.path(), &bundle).unwrap();

        for name in [SUMMARY_PATH, README_PATH, "pets.md", "__internal-untagged.md", SPEC_PATH] {
            assert!(dir.path().join(name).is_file(), "{name} missing");
        }
        let embedded = fs::read_to_string(dir.path().join(SPEC_PATH)).unwrap();
        assert_eq!(embedded, SPEC);
    }

    #[test]
    fn test_inspect_summary() {
        let doc = parse::load(SPEC, &NoExternalRefs).unwrap();
        let summary = build_inspect_summary(&doc, &OgbConfig::default()).unwrap();
        assert_eq!(summary["info"]["title"], "Pet Store");
        assert_eq!(summary["info"]["description"], "Pets and their owners.");

        let pages = summary["pages"].as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["page"], "pets.md");
        assert_eq!(pages[0]["endpoints"][0], "GET /pets (listPets)");
        assert_eq!(pages[1]["untagged"], true);
        assert_eq!(pages[1]["endpoints"][0], "POST /owners");
    }

    #[test]
    fn test_loader_follows_config() {
        let mut cfg = OgbConfig::default();
        cfg.refs.external = false;
        let loader = loader_for(Path::new("spec/openapi.yaml"), &cfg);
        assert!(loader.load("common.yaml").is_err());
    }
}

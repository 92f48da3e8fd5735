//! Command-line front end for SDF plant model import.
//!
//! Usage:
//!   sdf_import report plant/model.sdf
//!   sdf_import dump plant/model.sdf
//!   sdf_import place plant/model.sdf
//!   sdf_import import plant/model.sdf --content-root content --converter /usr/bin/blender-convert

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sdf_core::config::{ConfigError, ConverterConfig, ResolverSettings};
use sdf_core::mesh::{DirectoryStore, ExternalConverter, MeshContent, MeshResolver, NeverCancel};
use sdf_core::model::Model;
use sdf_core::placement::{link_placement, world_pose_of_joint_child};
use sdf_core::sdf::{load_sdf, report};
use sdf_math::TargetTransform;

#[derive(Parser)]
#[command(name = "sdf_import")]
#[command(about = "Import plant models described in SDF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary: counts, masses and required mesh files
    Report {
        /// SDF document to read
        sdf: PathBuf,
    },
    /// Print the parsed model as JSON
    Dump {
        /// SDF document to read
        sdf: PathBuf,
    },
    /// Print target-frame placement of every link and joint
    Place {
        /// SDF document to read
        sdf: PathBuf,
    },
    /// Convert and import every visual mesh
    Import {
        /// SDF document to read
        sdf: PathBuf,

        /// Directory the imported meshes are stored in
        #[arg(long)]
        content_root: PathBuf,

        /// Directory for converter output
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// Mesh converter program (defaults to $SDF_IMPORT_CONVERTER)
        #[arg(long)]
        converter: Option<PathBuf>,

        /// Argument passed to the converter before the source and output paths
        #[arg(long = "converter-arg", allow_hyphen_values = true)]
        converter_args: Vec<String>,

        /// Extension the converter produces
        #[arg(long)]
        target_ext: Option<String>,

        /// Directory searched for model:// URIs (repeatable)
        #[arg(long = "model-path")]
        model_paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report { sdf } => {
            let model = load(&sdf)?;
            print!("{}", report(&model));
            Ok(())
        }
        Commands::Dump { sdf } => {
            let model = load(&sdf)?;
            let json = serde_json::to_string_pretty(&model).context("Failed to serialize model")?;
            println!("{}", json);
            Ok(())
        }
        Commands::Place { sdf } => {
            let model = load(&sdf)?;
            print_placements(&model);
            Ok(())
        }
        Commands::Import {
            sdf,
            content_root,
            scratch_dir,
            converter,
            converter_args,
            target_ext,
            model_paths,
        } => {
            let mut settings = ResolverSettings::from_env();
            if let Some(dir) = scratch_dir {
                settings.scratch_dir = dir;
            }
            if let Some(base) = sdf.parent() {
                settings.base_dir = Some(base.to_path_buf());
            }
            // Paths from the command line are searched before the environment's
            let mut search = model_paths;
            search.append(&mut settings.model_paths);
            settings.model_paths = search;

            // Configuration problems are reported before any document work
            let config = converter_config(converter, converter_args, target_ext)
                .context("Mesh converter is not usable")?;
            import(&sdf, &content_root, config, settings)
        }
    }
}

fn load(path: &Path) -> Result<Model> {
    load_sdf(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn print_placements(model: &Model) {
    println!("Links:");
    for (name, link) in &model.links {
        println!("  {}: {}", name, format_transform(&link_placement(link).to_target()));
    }

    println!("Joints:");
    for (name, joint) in &model.joints {
        let pose = world_pose_of_joint_child(model, joint);
        println!("  {}: {}", name, format_transform(&pose.to_target()));
    }
}

fn format_transform(transform: &TargetTransform) -> String {
    // Adding zero turns -0.0 into 0.0 so negated zero angles print unsigned
    let v = |x: f64| x + 0.0;
    let l = transform.location;
    let r = transform.rotation;
    format!(
        "location ({:.3}, {:.3}, {:.3}) rotation (pitch {:.3}, yaw {:.3}, roll {:.3})",
        v(l.x),
        v(l.y),
        v(l.z),
        v(r.pitch),
        v(r.yaw),
        v(r.roll)
    )
}

/// Converter config from `--converter` or the environment, with the
/// `--converter-arg` and `--target-ext` flags applied on top.
fn converter_config(
    program: Option<PathBuf>,
    args: Vec<String>,
    target_ext: Option<String>,
) -> Result<ConverterConfig, ConfigError> {
    let mut config = match program {
        Some(program) => ConverterConfig::new(program),
        None => ConverterConfig::from_env()?,
    };
    if !args.is_empty() {
        config.args = args;
    }
    if let Some(ext) = target_ext {
        config.target_extension = ext.trim_start_matches('.').to_string();
    }
    Ok(config)
}

fn import(
    sdf: &Path,
    content_root: &Path,
    config: ConverterConfig,
    mut settings: ResolverSettings,
) -> Result<()> {
    let config = ConverterConfig::global(Some(config)).context("Mesh converter is not usable")?;
    let converter = ExternalConverter::new(config.clone())
        .with_context(|| format!("Invalid converter {}", config.program.display()))?;
    settings.target_extension = config.target_extension.clone();

    let model = load(sdf)?;
    log::info!(
        "Importing '{}' ({} links, {} joints)",
        model.name,
        model.link_count(),
        model.joint_count()
    );

    let store = DirectoryStore::new(content_root, settings.target_extension.clone());
    let resolver = MeshResolver::new(&converter, &store, settings);
    let (meshes, ctx) = resolver.resolve(&model, &NeverCancel);

    for (name, content) in &meshes {
        match content {
            MeshContent::Resolved(handle) => println!("{} -> {}", name, handle.path.display()),
            MeshContent::Fallback => println!("{} -> fallback", name),
        }
    }

    let stats = ctx.stats();
    println!(
        "{} meshes: {} converted, {} imported, {} reused, {} fallbacks",
        meshes.len(),
        stats.conversions,
        stats.imports,
        stats.reused,
        stats.fallbacks
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_flags_parse() {
        let cli = Cli::try_parse_from([
            "sdf_import",
            "import",
            "plant/model.sdf",
            "--content-root",
            "content",
            "--converter",
            "/bin/sh",
            "--converter-arg",
            "-c",
            "--converter-arg",
            "cp \"$0\" \"$1\"",
            "--model-path",
            "/models",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                content_root,
                converter,
                converter_args,
                model_paths,
                target_ext,
                ..
            } => {
                assert_eq!(content_root, PathBuf::from("content"));
                assert_eq!(converter, Some(PathBuf::from("/bin/sh")));
                assert_eq!(converter_args, vec!["-c", "cp \"$0\" \"$1\""]);
                assert_eq!(model_paths, vec![PathBuf::from("/models")]);
                assert_eq!(target_ext, None);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_flags_apply_over_environment_converter() {
        // The only test in this binary that touches the environment
        std::env::set_var(sdf_core::config::CONVERTER_ENV, "/bin/sh");
        std::env::set_var(sdf_core::config::CONVERTER_ARGS_ENV, "-x");

        let config = converter_config(None, vec!["-c".into(), "true".into()], Some("glb".into()))
            .unwrap();
        assert_eq!(config.program, PathBuf::from("/bin/sh"));
        assert_eq!(config.args, vec!["-c", "true"]);
        assert_eq!(config.target_extension, "glb");

        let config = converter_config(None, Vec::new(), None).unwrap();
        assert_eq!(config.args, vec!["-x"]);

        std::env::remove_var(sdf_core::config::CONVERTER_ENV);
        std::env::remove_var(sdf_core::config::CONVERTER_ARGS_ENV);
    }

    #[test]
    fn test_explicit_converter_takes_flags() {
        let config = converter_config(
            Some(PathBuf::from("/usr/bin/convert")),
            Vec::new(),
            Some(".obj".into()),
        )
        .unwrap();
        assert_eq!(config.program, PathBuf::from("/usr/bin/convert"));
        assert!(config.args.is_empty());
        assert_eq!(config.target_extension, "obj");
    }

    #[test]
    fn test_format_transform() {
        let pose = sdf_math::Pose::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0);
        assert_eq!(
            format_transform(&pose.to_target()),
            "location (100.000, -200.000, 300.000) rotation (pitch 0.000, yaw 0.000, roll 0.000)"
        );
    }
}

mod scene;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec4;
use rapidframe_render::stages::point_footprint;
use rapidframe_render::{DebugTextRenderer, Renderer, SoftwareRenderer};
use rapidframe_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::scene::Scene;

#[derive(Parser)]
#[command(name = "rapidframe", about = "Render tile maps and point sprites")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Software,
    Wgpu,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Compute a point sprite's footprint for a given clip-space w
    Footprint {
        /// Base point size
        #[arg(short, long, default_value = "10")]
        size: f32,
        /// Global size multiplier
        #[arg(short, long, default_value = "1")]
        mul: f32,
        /// Clip-space w
        #[arg(short, long, default_value = "1")]
        w: f32,
    },
    /// Describe a scene's draw passes and sprite footprints
    Inspect {
        /// Scene file (YAML)
        #[arg(short, long)]
        scene: PathBuf,
    },
    /// Render a scene to a PNG file
    Render {
        /// Scene file (YAML)
        #[arg(short, long)]
        scene: PathBuf,
        /// Output image
        #[arg(short, long, default_value = "frame.png")]
        out: PathBuf,
        #[arg(short, long, value_enum, default_value = "software")]
        backend: Backend,
        /// Print draw statistics as JSON (software backend only)
        #[arg(long)]
        stats: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("rapidframe v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", rapidframe_common::crate_info());
            println!("render: {}", rapidframe_render::crate_info());
        }
        Commands::Footprint { size, mul, w } => {
            let fp = point_footprint(Vec4::new(0.0, 0.0, 0.0, w), size, mul);
            println!("footprint: size={:.4} w={w}", fp.size);
            if fp.is_culled() {
                println!(
                    "culled: position forced to (*, *, {}, {})",
                    fp.clip.z, fp.clip.w
                );
            } else {
                println!("visible");
            }
        }
        Commands::Inspect { scene } => {
            let scene = Scene::load(&scene)
                .with_context(|| format!("loading scene {}", scene.display()))?;
            print!("{}", DebugTextRenderer::new().render(&scene.frame())?);
        }
        Commands::Render {
            scene,
            out,
            backend,
            stats,
        } => {
            let scene = Scene::load(&scene)
                .with_context(|| format!("loading scene {}", scene.display()))?;
            let frame = scene.frame();

            let image = match backend {
                Backend::Software => {
                    let rendered = SoftwareRenderer::new(scene.width, scene.height).render(&frame)?;
                    if stats {
                        println!("{}", serde_json::to_string_pretty(&rendered.stats)?);
                    }
                    rendered.target.to_image()
                }
                Backend::Wgpu => {
                    if stats {
                        tracing::warn!("--stats is only reported by the software backend");
                    }
                    let mut gpu = WgpuRenderer::new_headless(scene.width, scene.height)?;
                    gpu.render(&frame)?
                }
            };

            image
                .save(&out)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("wrote {}x{} to {}", image.width(), image.height(), out.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_is_a_named_flag() {
        let cli = Cli::try_parse_from(["rapidframe", "inspect", "--scene", "demo.yaml"]).unwrap();
        match cli.command {
            Commands::Inspect { scene } => assert_eq!(scene, PathBuf::from("demo.yaml")),
            _ => panic!("expected inspect command"),
        }

        let cli = Cli::try_parse_from([
            "rapidframe",
            "render",
            "-s",
            "demo.yaml",
            "--out",
            "f.png",
            "--backend",
            "wgpu",
        ])
        .unwrap();
        match cli.command {
            Commands::Render {
                scene,
                out,
                backend,
                stats,
            } => {
                assert_eq!(scene, PathBuf::from("demo.yaml"));
                assert_eq!(out, PathBuf::from("f.png"));
                assert!(matches!(backend, Backend::Wgpu));
                assert!(!stats);
            }
            _ => panic!("expected render command"),
        }

        assert!(Cli::try_parse_from(["rapidframe", "inspect", "demo.yaml"]).is_err());
    }
}

use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use tracing::info;

use validation::index;
use validation::render::Profile;
use validation::repo;
use validation::runner::{self, RunOptions, RunnerConfig};

#[derive(Parser)]
#[command(name = "pt-tools", about = "Scene index and renderer validation tasks")]
enum Cli {
    /// Generate the scene_index.js module for the viewer's scene picker
    Index {
        #[arg(default_value = "assets/scenes", help = "Asset directory to scan")]
        root: PathBuf,

        #[arg(
            short,
            long,
            help = "Output file (defaults to scene_index.js inside the scanned directory)"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Skip printing the mapping to stdout")]
        quiet: bool,
    },
    /// Render the reference suite and generate a comparison report
    Validate {
        #[arg(short, long, help = "A specific scenario to run")]
        scenario: Option<String>,

        #[arg(short, long, help = "A specific testcase to run")]
        testcase: Option<String>,

        #[arg(short, long, help = "Substring used to match scene files to render")]
        filter: Option<String>,

        #[arg(long, value_enum, default_value_t = CliProfile::Standard, help = "Render quality profile")]
        profile: CliProfile,

        #[arg(long, default_value = "pt-render", help = "Headless renderer binary")]
        renderer: PathBuf,

        #[arg(
            long,
            default_value = repo::DEFAULT_CHECKOUT_DIR,
            help = "Reference suite checkout directory"
        )]
        checkout_dir: PathBuf,

        #[arg(
            long,
            default_value = runner::DEFAULT_OUTPUT_DIR,
            help = "Directory collecting rendered images"
        )]
        output_dir: PathBuf,

        #[arg(
            long,
            default_value = runner::DEFAULT_REPORT_DIR,
            help = "Directory receiving the generated report"
        )]
        report_dir: PathBuf,
    },
    /// List all validation scenarios as JSON
    ListScenarios,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliProfile {
    Standard,
    HighQuality,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    match Cli::parse() {
        Cli::Index { root, output, quiet } => {
            let index = index::scan(&root)?;
            if !quiet {
                println!("{}", serde_json::to_string_pretty(&index)?);
            }

            let out_path = output.unwrap_or_else(|| root.join(index::INDEX_FILENAME));
            index::write_module(&index, &out_path)?;
            info!("indexed {} scene(s) into {}", index.len(), out_path.display());
            Ok(())
        }
        Cli::Validate {
            scenario,
            testcase,
            filter,
            profile,
            renderer,
            checkout_dir,
            output_dir,
            report_dir,
        } => {
            let config = RunnerConfig {
                renderer,
                checkout_dir,
                output_dir,
                report_dir,
                ..Default::default()
            };
            let options = RunOptions {
                scenario,
                testcase,
                filter,
                profile: match profile {
                    CliProfile::Standard => Profile::Standard,
                    CliProfile::HighQuality => Profile::HighQuality,
                },
            };

            let summary = runner::run(&config, &options)?;
            println!(
                "rendered {} scene(s), {} failure(s)",
                summary.rendered, summary.failed
            );
            if !summary.all_ok() {
                bail!("{} render(s) failed", summary.failed);
            }
            Ok(())
        }
        Cli::ListScenarios => {
            println!("{}", serde_json::to_string(&runner::SCENARIOS.to_vec())?);
            Ok(())
        }
    }
}

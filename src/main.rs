use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::{Context, anyhow, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use itertools::Itertools;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use wiz_vault::{
    NoteParser, NoteProperty, NoteType, ParsedNote, SyncRecord,
    config::Config,
    note::{
        images::{self, ImageRenamer},
        property, references,
    },
    parser_for,
};

#[derive(Parser)]
struct Opts {
    #[clap(short, long, env = "WIZ_VAULT_CONFIG")]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert raw note exports into Markdown files
    Convert {
        /// Note type tag: collaboration, lite/markdown, document
        #[clap(short = 't', long = "type", default_value = "collaboration")]
        note_type: String,
        /// Output directory; defaults to the directory of each input
        #[clap(short, long)]
        out: Option<PathBuf>,
        /// Copy images from `index_files/` into `images/` under timestamped names
        #[clap(long)]
        rename_images: bool,
        /// Input files or glob patterns
        #[clap(required = true)]
        inputs: Vec<String>,
    },
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let src = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read config from {}", path.display()))?;
    Config::parse(path, &src).with_context(|| format!("parse config from {}", path.display()))
}

fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern {pattern}"))?
            .filter_ok(|path| !property::is_sidecar(path))
            .collect::<Result<Vec<_>, _>>()?;
        if matched.is_empty() {
            warn!(pattern, "no input matched");
        }
        paths.extend(matched);
    }
    Ok(paths)
}

struct ConvertJob {
    parser: Box<dyn NoteParser>,
    out: Option<PathBuf>,
    renamer: Option<Mutex<ImageRenamer>>,
}

/// Front matter from the note's sync record sidecar, when there is one.
async fn load_property(path: &Path) -> anyhow::Result<Option<NoteProperty>> {
    let sidecar = property::sidecar_path(path);
    if !tokio::fs::try_exists(&sidecar).await? {
        debug!(sidecar = %sidecar.display(), "no sync record");
        return Ok(None);
    }
    let src = tokio::fs::read_to_string(&sidecar)
        .await
        .with_context(|| format!("read {}", sidecar.display()))?;
    let record: SyncRecord = serde_yaml::from_str(&src)
        .with_context(|| format!("parse sync record {}", sidecar.display()))?;
    Ok(Some(NoteProperty::from_sync_record(&record)?))
}

async fn copy_renamed_images(
    renamer: &Mutex<ImageRenamer>,
    source_dir: &Path,
    out_dir: &Path,
    note: &mut ParsedNote,
) -> anyhow::Result<()> {
    if note.need_upload_images.is_empty() {
        return Ok(());
    }
    let image_dir = out_dir.join(images::VAULT_IMAGE_DIR);
    tokio::fs::create_dir_all(&image_dir)
        .await
        .with_context(|| format!("create {}", image_dir.display()))?;
    let mut renamed = HashMap::new();
    for name in &note.need_upload_images {
        let source = source_dir.join(images::EXPORT_IMAGE_DIR).join(name);
        if !tokio::fs::try_exists(&source).await? {
            warn!(image = %source.display(), "image file not found");
            continue;
        }
        let new_name = renamer
            .lock()
            .map_err(|_| anyhow!("image renamer lock poisoned"))?
            .next_name(name, Local::now().naive_local());
        let target = image_dir.join(&new_name);
        tokio::fs::copy(&source, &target)
            .await
            .with_context(|| format!("copy {} to {}", source.display(), target.display()))?;
        info!(from = %source.display(), to = %target.display(), "image renamed");
        renamed.insert(name.clone(), images::image_url(&new_name));
    }
    note.replace_image_url(&renamed);
    Ok(())
}

async fn convert_file(job: Arc<ConvertJob>, path: PathBuf) -> anyhow::Result<(PathBuf, ParsedNote)> {
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("read {}", path.display()))?;
    let parsing = job.clone();
    let mut note =
        tokio::task::spawn_blocking(move || parsing.parser.process_content(&raw)).await??;

    let source_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let dir = job.out.clone().unwrap_or_else(|| source_dir.clone());
    if let Some(renamer) = &job.renamer {
        copy_renamed_images(renamer, &source_dir, &dir, &mut note).await?;
    }
    if let Some(property) = load_property(&path).await? {
        note.prepend_front_matter(&property)?;
    }

    let stem = path
        .file_stem()
        .ok_or_else(|| anyhow!("no file name in {}", path.display()))?;
    let target = dir.join(format!("{}.md", stem.to_string_lossy()));
    tokio::fs::write(&target, &note.content)
        .await
        .with_context(|| format!("write {}", target.display()))?;
    Ok((target, note))
}

async fn run(opts: Opts) -> anyhow::Result<()> {
    let config = load_config(opts.config.as_deref()).await?;
    match opts.command {
        Command::Convert {
            note_type,
            out,
            rename_images,
            inputs,
        } => {
            if let Some(out) = &out {
                tokio::fs::create_dir_all(out)
                    .await
                    .with_context(|| format!("create {}", out.display()))?;
            }
            let job = Arc::new(ConvertJob {
                parser: parser_for(NoteType::from_tag(&note_type), &config.convert),
                out,
                renamer: rename_images.then(|| Mutex::new(ImageRenamer::default())),
            });
            let mut tasks = JoinSet::new();
            for path in expand_inputs(&inputs)? {
                let job = job.clone();
                tasks.spawn(async move {
                    let result = convert_file(job, path.clone()).await;
                    (path, result)
                });
            }

            let mut failed = 0usize;
            while let Some(joined) = tasks.join_next().await {
                let (path, result) = joined?;
                match result {
                    Ok((target, note)) => {
                        for warning in &note.warnings {
                            warn!(path = %path.display(), warning, "conversion warning");
                        }
                        let attachments = references::extract_attachment_links(&note.content);
                        info!(
                            path = %path.display(),
                            target = %target.display(),
                            images = ?note.need_upload_images,
                            ?attachments,
                            "converted"
                        );
                        println!("{}\t{}", target.display(), note.need_upload_images.join(","));
                    }
                    Err(e) => {
                        failed += 1;
                        error!(path = %path.display(), ?e, "failed to convert note");
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} note(s) failed to convert");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match run(opts).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(?e, "critical error");
            ExitCode::FAILURE
        }
    }
}

//! cms-forms - process a form submission from the command line
//!
//! Loads a plugin table and a submission from JSON files, runs the
//! submission through the form pipeline with in-memory storage and prints
//! the outcome.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms_forms::storage::{
    HeaderImageInspector, MemoryMailer, MemoryPluginStore, MemorySubmissionStore,
};
use cms_forms::tree::{PluginId, PluginRecord};
use cms_forms::{
    ActionRegistry, FieldRegistry, FormDefinition, FormProcessor, FormsConfig, SubmissionData,
    UploadedFile,
};

/// Plugin table of one page
#[derive(Debug, Deserialize)]
struct TreeFile {
    root: PluginId,
    plugins: Vec<PluginRecord>,
}

#[derive(Debug, Deserialize)]
struct FileInput {
    path: PathBuf,
    #[serde(default = "default_content_type")]
    content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// A submission as posted by the visitor
#[derive(Debug, Deserialize)]
struct SubmissionFile {
    url: String,
    #[serde(default)]
    values: IndexMap<String, Vec<String>>,
    #[serde(default)]
    files: IndexMap<String, Vec<FileInput>>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn submission_data(input: SubmissionFile, base: &Path) -> Result<SubmissionData> {
    let mut data = SubmissionData {
        values: input.values,
        ..Default::default()
    };
    for (field, files) in input.files {
        for file in files {
            let path = base.join(&file.path);
            let content =
                std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
            let name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            data = data.with_file(&field, UploadedFile::new(&name, &file.content_type, content));
        }
    }
    Ok(data)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms_forms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [tree_path, submission_path] = args.as_slice() else {
        bail!("usage: cms-forms <tree.json> <submission.json>");
    };
    let tree_path = Path::new(tree_path);
    let submission_path = Path::new(submission_path);

    let config = FormsConfig::load()?;
    let backends = ActionRegistry::load(&config.action_backends())?.install()?;
    let registry = FieldRegistry::builtin();

    let tree: TreeFile = read_json(tree_path)?;
    let store = MemoryPluginStore::new(tree.plugins);
    let definition = FormDefinition::load(
        &store,
        &registry,
        backends,
        tree.root,
        config.max_tree_depth(),
    )
    .await?;

    let input: SubmissionFile = read_json(submission_path)?;
    let url = input.url.clone();
    let base = submission_path.parent().unwrap_or(Path::new("."));
    let data = submission_data(input, base)?;

    let submissions = MemorySubmissionStore::default();
    let mailer = MemoryMailer::default();
    let languages = config.languages();
    let processor = FormProcessor {
        registry: &registry,
        backends,
        submissions: &submissions,
        mailer: &mailer,
        images: &HeaderImageInspector,
        languages: &languages,
    };

    let outcome = processor.process(&definition, &data, &url).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    for submission in submissions.submissions() {
        tracing::info!("Submission {} created at {}", submission.id, submission.created_at);
    }
    Ok(())
}

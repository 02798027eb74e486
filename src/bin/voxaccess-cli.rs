use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_channel::Receiver;
use clap::Parser;

use voxaccess::{
    Config, ExportFormat, Outcome, SelectedFile, ServiceClient, Workflow, WorkflowEvent,
};

#[derive(Parser, Debug)]
#[command(name = "voxaccess-cli")]
#[command(about = "Upload an image or PDF, print its text, description and audio link, export it")]
struct Args {
    /// Image or PDF to process
    #[arg(value_name = "FILE", required_unless_present_any = ["check", "save_config"])]
    file: Option<PathBuf>,

    /// Service origin (overrides config and VOXACCESS_BACKEND_URL)
    #[arg(long, value_name = "URL")]
    backend: Option<String>,

    /// Export format to save after processing: txt or srt (repeatable)
    #[arg(long = "export", value_name = "FORMAT")]
    exports: Vec<ExportFormat>,

    /// Directory for exported files (default: Downloads)
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Only check that the service is reachable
    #[arg(long)]
    check: bool,

    /// Remember --backend and --out in the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.save_config {
        let mut stored = Config::load_from(&Config::file_path());
        if let Some(url) = &args.backend {
            stored.backend_url = url.clone();
        }
        if let Some(dir) = &args.out {
            stored.export_dir = Some(dir.clone());
        }
        // a malformed backend is rejected before it is stored
        ServiceClient::from_config(&stored)?;
        let path = stored.save().context("Failed to save config")?;
        println!("Saved config to {}", path.display());
        if args.file.is_none() && !args.check {
            return Ok(());
        }
    }

    let mut config = Config::load();
    if let Some(url) = args.backend {
        config.backend_url = url;
    }
    if let Some(dir) = args.out {
        config.export_dir = Some(dir);
    }
    let client = ServiceClient::from_config(&config)?;

    if args.check {
        client
            .health()
            .await
            .with_context(|| format!("Service at {} is not reachable", client.base_url()))?;
        println!("Service at {} is up", client.base_url());
        return Ok(());
    }

    let path = args.file.context("No input file given")?;
    let (sender, receiver) = async_channel::unbounded::<WorkflowEvent>();
    let mut workflow = Workflow::new(
        client,
        config.resolved_export_dir(),
        tokio::runtime::Handle::current(),
        sender,
    );

    let file = SelectedFile::from_path(&path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{} ({}, {})", file.name, file.kind_label(), file.size_label());
    workflow.select_file(file)?;

    if !workflow.upload() {
        bail!("Nothing to upload");
    }
    match next_outcome(&mut workflow, &receiver).await? {
        Outcome::Uploaded(handle) => println!("Uploaded as {}", handle.file_id),
        Outcome::Failed(e) => return Err(e.into()),
        other => bail!("Unexpected outcome while uploading: {other:?}"),
    }

    if !workflow.process() {
        bail!("Nothing to process");
    }
    match next_outcome(&mut workflow, &receiver).await? {
        Outcome::Processed => print_result(&workflow),
        Outcome::Failed(e) => return Err(e.into()),
        other => bail!("Unexpected outcome while processing: {other:?}"),
    }

    for format in args.exports {
        if !workflow.export(format)? {
            continue;
        }
        match next_outcome(&mut workflow, &receiver).await? {
            Outcome::Exported(path) => println!("Saved {format}: {}", path.display()),
            Outcome::Failed(e) => return Err(e.into()),
            other => bail!("Unexpected outcome while exporting: {other:?}"),
        }
    }

    Ok(())
}

/// Apply completions until one settles the pending operation.
async fn next_outcome(
    workflow: &mut Workflow,
    receiver: &Receiver<WorkflowEvent>,
) -> Result<Outcome> {
    loop {
        let event = receiver
            .recv()
            .await
            .context("Workflow event channel closed")?;
        match workflow.handle_event(event) {
            Outcome::Stale | Outcome::PreviewReady => continue,
            outcome => return Ok(outcome),
        }
    }
}

fn print_result(workflow: &Workflow) {
    let Some(result) = workflow.session().result() else {
        return;
    };

    if let Some(text) = &result.text {
        println!("\n== Extracted text ==\n{text}");
        if let Some(words) = result.word_count {
            println!("({words} words)");
        }
    }
    if let Some(description) = &result.description {
        println!("\n== Description ==\n{description}");
    }
    if let Some(url) = workflow.audio_url() {
        println!("\n== Audio ==\n{url}");
    }
    if !result.has_exportable_content() {
        println!("\nNo text or description was produced.");
    }
}
